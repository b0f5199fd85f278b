mod common;

use common::*;
use serde_json::{json, Value};
use std::io::{self, Cursor, Read, Write};
use tivo_todo::sources::tivo::{encode_request, parse_preamble, search_window};
use tivo_todo::sources::MindSession;
use tivo_todo::ErrorCategory;

/// Plays canned responses and records everything written to it.
struct FakeDevice {
    input: Cursor<Vec<u8>>,
    output: Vec<u8>,
}

impl FakeDevice {
    fn replying(responses: &[Value]) -> Self {
        let input = responses.iter().flat_map(response_frame).collect();
        Self {
            input: Cursor::new(input),
            output: Vec::new(),
        }
    }

    fn written(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl Read for FakeDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for FakeDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.output.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn response_frame(body: &Value) -> Vec<u8> {
    let body = body.to_string();
    let headers = "Type: response\r\nIsFinal: true\r\n\r\n";
    format!("MRPC/2 {} {}\r\n{}{}", headers.len(), body.len(), headers, body).into_bytes()
}

fn auth_ok() -> Value {
    json!({ "type": "bodyAuthenticateResponse", "status": "success" })
}

fn recordings(range: std::ops::Range<usize>) -> Vec<Value> {
    range
        .map(|i| device_record(&format!("Show {}", i), "Ep", "2024-05-01 20:00:00", "2024-05-01 20:30:00", true))
        .collect()
}

#[test]
fn test_request_frame_lengths_match_preamble() {
    let body = json!({ "type": "bodyAuthenticate", "credential": { "type": "makCredential", "key": "123" } });
    let frame = String::from_utf8(encode_request(7, 0xbeef, "bodyAuthenticate", &body).unwrap()).unwrap();

    let (preamble, rest) = frame.split_once("\r\n").unwrap();
    let (header_len, body_len) = parse_preamble(preamble).unwrap();
    assert_eq!(rest.len(), header_len + body_len);

    let (headers, json_body) = rest.split_at(header_len);
    assert!(headers.contains("RpcId: 7\r\n"));
    assert!(headers.contains("RequestType: bodyAuthenticate\r\n"));
    assert!(headers.contains("X-ApplicationSessionId: 0xbeef\r\n"));
    assert!(headers.ends_with("\r\n\r\n"));
    assert_eq!(serde_json::from_str::<Value>(json_body).unwrap(), body);
}

#[test]
fn test_bad_preamble_is_rejected() {
    assert!(parse_preamble("HTTP/1.1 200 OK").is_err());
    assert!(parse_preamble("MRPC/2 12").is_err());
    assert_eq!(parse_preamble("MRPC/2 12 34").unwrap(), (12, 34));
}

#[test]
fn test_authenticate_then_page_through_search() {
    init_tracing();

    let device = FakeDevice::replying(&[
        auth_ok(),
        json!({ "type": "recordingList", "recording": recordings(0..50), "isBottom": false }),
        json!({ "type": "recordingList", "recording": recordings(50..52), "isBottom": true }),
    ]);
    let mut session = MindSession::over(device, 42);

    session.authenticate("1234567890").unwrap();
    let found = session
        .recording_search("2024-05-01 04:00:00", "2024-05-03 03:59:59")
        .unwrap();

    assert_eq!(found.len(), 52);
    assert_eq!(found[51]["title"], "Show 51");

    let written = session.into_connection().into_inner().written();
    assert!(written.contains("\"makCredential\""));
    assert!(written.contains("\"key\":\"1234567890\""));
    assert_eq!(written.matches("RequestType: recordingSearch").count(), 2);
    assert!(written.contains("\"offset\":50"));
    assert!(written.contains("\"state\":[\"scheduled\"]"));
    assert!(written.contains("\"minStartTime\":\"2024-05-01 04:00:00\""));
}

#[test]
fn test_empty_recording_list() {
    let device = FakeDevice::replying(&[json!({ "type": "recordingList", "isBottom": true })]);
    let mut session = MindSession::over(device, 1);

    let found = session.recording_search("a", "b").unwrap();
    assert!(found.is_empty());
}

#[test]
fn test_failed_authentication_is_collaborator_error() {
    let device = FakeDevice::replying(&[json!({
        "type": "bodyAuthenticateResponse",
        "status": "failure",
        "message": "bad MAK",
    })]);
    let mut session = MindSession::over(device, 1);

    let err = session.authenticate("wrong").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Collaborator);
    assert!(err.to_string().contains("bad MAK"));
}

#[test]
fn test_error_response_is_collaborator_error() {
    let device = FakeDevice::replying(&[json!({ "type": "error", "code": "badArgument", "text": "bodyId invalid" })]);
    let mut session = MindSession::over(device, 1);

    let err = session.recording_search("a", "b").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Collaborator);
    assert!(err.to_string().contains("bodyId invalid"));
}

#[test]
fn test_truncated_response_is_an_error() {
    let mut device = FakeDevice::replying(&[]);
    device.input = Cursor::new(b"MRPC/2 10 500\r\nType: x\r\n\r\n{}".to_vec());
    let mut session = MindSession::over(device, 1);

    assert!(session.authenticate("123").is_err());
}

#[test]
fn test_oversized_frame_lengths_are_collaborator_errors() {
    let preambles: [&[u8]; 3] = [
        b"MRPC/2 18446744073709551615 1\r\n",
        b"MRPC/2 1 18446744073709551615\r\n",
        b"MRPC/2 1048576 1073741824\r\n",
    ];

    for preamble in preambles {
        let mut device = FakeDevice::replying(&[]);
        device.input = Cursor::new(preamble.to_vec());
        let mut session = MindSession::over(device, 1);

        let err = session.authenticate("123").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Collaborator);
        assert!(err.to_string().contains("exceeds"), "{}", err);
    }
}

#[test]
fn test_search_window_spans_both_local_days_in_utc() {
    let (min, max) = search_window(&run_dates("2024-05-01"), &zone()).unwrap();
    assert_eq!(min, "2024-05-01 04:00:00");
    assert_eq!(max, "2024-05-03 03:59:59");
}
