use crate::config::Config;
use crate::traits::RecordingSource;
use crate::types::{DigestError, Result, RunDates};
use async_trait::async_trait;
use chrono::{Duration, Local, NaiveTime, TimeZone, Utc};
use native_tls::{Identity, TlsConnector, TlsStream};
use serde_json::{json, Value};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::PathBuf;
use tracing::{debug, info};
use uuid::Uuid;

const COLLABORATOR: &str = "device";
const SCHEMA_VERSION: u32 = 17;
const SEARCH_PAGE_SIZE: usize = 50;
const SEARCH_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MAX_PREAMBLE_LEN: usize = 64;
const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// One MRPC/2 request/response channel over any byte stream.
///
/// Frames are `MRPC/2 <header-len> <body-len>\r\n`, then CRLF-separated
/// headers ending in a blank line, then a JSON body.
pub struct MrpcConnection<S: Read + Write> {
    stream: S,
    session_id: u32,
    next_rpc_id: u32,
}

impl<S: Read + Write> MrpcConnection<S> {
    pub fn new(stream: S, session_id: u32) -> Self {
        Self {
            stream,
            session_id,
            next_rpc_id: 1,
        }
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    pub fn request(&mut self, body: &Value) -> Result<Value> {
        let request_type = body
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| DigestError::collaborator(COLLABORATOR, "request body has no type"))?;
        let rpc_id = self.next_rpc_id;
        self.next_rpc_id += 1;

        let frame = encode_request(rpc_id, self.session_id, request_type, body)?;
        debug!("MRPC request {} ({}), {} bytes", rpc_id, request_type, frame.len());
        self.stream.write_all(&frame)?;
        self.stream.flush()?;

        let response = self.read_response()?;
        if response.get("type").and_then(Value::as_str) == Some("error") {
            let text = response
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(DigestError::collaborator(
                COLLABORATOR,
                format!("{} rejected: {}", request_type, text),
            ));
        }
        Ok(response)
    }

    fn read_response(&mut self) -> Result<Value> {
        let preamble = self.read_preamble()?;
        let (header_len, body_len) = parse_preamble(&preamble)?;
        let frame_len = header_len
            .checked_add(body_len)
            .filter(|len| *len <= MAX_FRAME_LEN)
            .ok_or_else(|| {
                DigestError::collaborator(
                    COLLABORATOR,
                    format!("MRPC frame of {} + {} bytes exceeds {} bytes", header_len, body_len, MAX_FRAME_LEN),
                )
            })?;

        let mut payload = vec![0u8; frame_len];
        self.stream.read_exact(&mut payload)?;
        let body = &payload[header_len..];
        debug!("MRPC response, {} header and {} body bytes", header_len, body_len);

        serde_json::from_slice(body)
            .map_err(|e| DigestError::collaborator(COLLABORATOR, format!("response body is not JSON: {}", e)))
    }

    fn read_preamble(&mut self) -> Result<String> {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            self.stream.read_exact(&mut byte)?;
            if byte[0] == b'\n' {
                break;
            }
            line.push(byte[0]);
            if line.len() > MAX_PREAMBLE_LEN {
                return Err(DigestError::collaborator(COLLABORATOR, "MRPC preamble too long"));
            }
        }
        let line = String::from_utf8(line)
            .map_err(|_| DigestError::collaborator(COLLABORATOR, "MRPC preamble is not UTF-8"))?;
        Ok(line.trim_end_matches('\r').to_string())
    }
}

pub fn encode_request(rpc_id: u32, session_id: u32, request_type: &str, body: &Value) -> Result<Vec<u8>> {
    let body = serde_json::to_string(body)?;
    let headers = [
        "Type: request".to_string(),
        format!("RpcId: {}", rpc_id),
        format!("SchemaVersion: {}", SCHEMA_VERSION),
        "Content-Type: application/json".to_string(),
        format!("RequestType: {}", request_type),
        "ResponseCount: single".to_string(),
        "BodyId: ".to_string(),
        "X-ApplicationName: Quicksilver".to_string(),
        "X-ApplicationVersion: 1.2".to_string(),
        format!("X-ApplicationSessionId: 0x{:x}", session_id),
    ]
    .iter()
    .map(|header| format!("{}\r\n", header))
    .collect::<String>()
        + "\r\n";

    let mut frame = format!("MRPC/2 {} {}\r\n", headers.len(), body.len()).into_bytes();
    frame.extend_from_slice(headers.as_bytes());
    frame.extend_from_slice(body.as_bytes());
    Ok(frame)
}

pub fn parse_preamble(line: &str) -> Result<(usize, usize)> {
    let malformed = || DigestError::collaborator(COLLABORATOR, format!("bad MRPC preamble '{}'", line));
    let mut parts = line.split_whitespace();
    if parts.next() != Some("MRPC/2") {
        return Err(malformed());
    }
    let header_len = parts.next().and_then(|n| n.parse().ok()).ok_or_else(malformed)?;
    let body_len = parts.next().and_then(|n| n.parse().ok()).ok_or_else(malformed)?;
    Ok((header_len, body_len))
}

/// An authenticated conversation with the recorder.
pub struct MindSession<S: Read + Write> {
    connection: MrpcConnection<S>,
}

impl MindSession<TlsStream<TcpStream>> {
    pub fn connect(settings: &DeviceSettings) -> Result<Self> {
        info!("Connecting to device at {}:{}", settings.ip, settings.port);

        let mut builder = TlsConnector::builder();
        // The recorder presents a self-signed certificate.
        builder
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true);
        if let (Some(path), Some(password)) = (&settings.cert_path, &settings.cert_password) {
            debug!("Using client certificate at {}", path.display());
            let der = std::fs::read(path)?;
            builder.identity(Identity::from_pkcs12(&der, password)?);
        }
        let connector = builder.build()?;

        let tcp = TcpStream::connect((settings.ip.as_str(), settings.port))?;
        tcp.set_read_timeout(Some(std::time::Duration::from_secs(settings.timeout_seconds)))?;
        let stream = connector
            .connect(&settings.ip, tcp)
            .map_err(|e| DigestError::collaborator(COLLABORATOR, format!("TLS handshake failed: {}", e)))?;

        Ok(Self::over(stream, Uuid::new_v4().as_fields().0))
    }
}

impl<S: Read + Write> MindSession<S> {
    pub fn over(stream: S, session_id: u32) -> Self {
        Self {
            connection: MrpcConnection::new(stream, session_id),
        }
    }

    pub fn into_connection(self) -> MrpcConnection<S> {
        self.connection
    }

    pub fn authenticate(&mut self, mak: &str) -> Result<()> {
        let response = self.connection.request(&json!({
            "type": "bodyAuthenticate",
            "credential": { "type": "makCredential", "key": mak },
        }))?;

        match response.get("status").and_then(Value::as_str) {
            Some("success") => {
                info!("Authenticated with device");
                Ok(())
            }
            status => {
                let message = response
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("no message");
                Err(DigestError::collaborator(
                    COLLABORATOR,
                    format!("authentication failed ({}): {}", status.unwrap_or("no status"), message),
                ))
            }
        }
    }

    /// Scheduled recordings starting between the two UTC bounds, all pages.
    pub fn recording_search(&mut self, min_start: &str, max_start: &str) -> Result<Vec<Value>> {
        let mut recordings = Vec::new();
        loop {
            let mut response = self.connection.request(&json!({
                "type": "recordingSearch",
                "bodyId": "-",
                "state": ["scheduled"],
                "minStartTime": min_start,
                "maxStartTime": max_start,
                "levelOfDetail": "high",
                "count": SEARCH_PAGE_SIZE,
                "offset": recordings.len(),
            }))?;

            let page = match response.get_mut("recording").map(Value::take) {
                Some(Value::Array(page)) => page,
                None => Vec::new(),
                Some(_) => {
                    return Err(DigestError::collaborator(COLLABORATOR, "recording list is not an array"));
                }
            };
            let page_len = page.len();
            recordings.extend(page);

            let is_bottom = response.get("isBottom").and_then(Value::as_bool).unwrap_or(true);
            if is_bottom || page_len < SEARCH_PAGE_SIZE {
                break;
            }
        }
        info!("Device returned {} scheduled recordings", recordings.len());
        Ok(recordings)
    }
}

/// Local midnight of today up to the last microsecond of tomorrow, as UTC
/// device timestamps.
pub fn search_window<Tz: TimeZone>(dates: &RunDates, zone: &Tz) -> Result<(String, String)> {
    let start = zone
        .from_local_datetime(&dates.today.and_time(NaiveTime::MIN))
        .earliest()
        .ok_or_else(|| DigestError::collaborator(COLLABORATOR, format!("no local midnight on {}", dates.today)))?;
    let end = zone
        .from_local_datetime(&dates.tomorrow.and_time(NaiveTime::MIN))
        .earliest()
        .ok_or_else(|| DigestError::collaborator(COLLABORATOR, format!("no local midnight on {}", dates.tomorrow)))?
        + Duration::days(1)
        - Duration::microseconds(1);

    Ok((
        start.with_timezone(&Utc).format(SEARCH_TIME_FORMAT).to_string(),
        end.with_timezone(&Utc).format(SEARCH_TIME_FORMAT).to_string(),
    ))
}

/// Connection details for the recorder.
#[derive(Debug, Clone)]
pub struct DeviceSettings {
    pub ip: String,
    pub port: u16,
    pub mak: String,
    pub cert_path: Option<PathBuf>,
    pub cert_password: Option<String>,
    pub timeout_seconds: u64,
}

impl From<&Config> for DeviceSettings {
    fn from(config: &Config) -> Self {
        Self {
            ip: config.tivo_ip.clone(),
            port: config.tivo_port,
            mak: config.tivo_mak.clone(),
            cert_path: config.tivo_cert_path.clone(),
            cert_password: config.tivo_cert_password.clone(),
            timeout_seconds: config.fetch.timeout_seconds,
        }
    }
}

/// The recorder's to-do list, queried over a fresh session per run.
pub struct TivoSource {
    settings: DeviceSettings,
}

impl TivoSource {
    pub fn new(settings: DeviceSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl RecordingSource for TivoSource {
    fn source_name(&self) -> String {
        format!("TiVo ({}:{})", self.settings.ip, self.settings.port)
    }

    async fn scheduled_recordings(&self, dates: &RunDates) -> Result<Vec<Value>> {
        let (min_start, max_start) = search_window(dates, &Local)?;
        let settings = self.settings.clone();

        tokio::task::spawn_blocking(move || {
            let mut session = MindSession::connect(&settings)?;
            session.authenticate(&settings.mak)?;
            session.recording_search(&min_start, &max_start)
        })
        .await
        .map_err(|e| DigestError::collaborator(COLLABORATOR, format!("device task failed: {}", e)))?
    }
}
