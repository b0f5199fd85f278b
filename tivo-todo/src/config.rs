use crate::types::{DeviceClock, DigestError, FetchConfig, Result, ShowId};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "TivoToDoList.conf";
const DEFAULT_SMTP_PORT: u16 = 587;

/// Everything the collaborators need, loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub tivo_ip: String,
    pub tivo_port: u16,
    pub tivo_mak: String,
    #[serde(default)]
    pub tivo_cert_path: Option<PathBuf>,
    #[serde(default)]
    pub tivo_cert_password: Option<String>,
    #[serde(default)]
    pub device_clock: DeviceClock,

    #[serde(default)]
    pub google_api_key: Option<String>,
    #[serde(default)]
    pub google_tvmaze_sheet_id: Option<String>,
    #[serde(default)]
    pub tvmaze_show_ids: Vec<ShowId>,

    pub smtp_name: String,
    pub smtp_user: String,
    pub smtp_password: String,
    pub smtp_host: String,
    pub smtp_server: String,
    pub to_emails: Vec<String>,

    #[serde(default)]
    pub fetch: FetchConfig,
}

/// Where the show subscription comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionConfig<'a> {
    Sheet { api_key: &'a str, sheet_id: &'a str },
    Inline(&'a [ShowId]),
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config file from {}", path.display());
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DigestError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(raw)
            .map_err(|e| DigestError::Config(format!("malformed config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.tivo_ip.trim().is_empty() {
            return Err(DigestError::Config("tivo_ip is empty".to_string()));
        }
        if self.tivo_mak.trim().is_empty() {
            return Err(DigestError::Config("tivo_mak is empty".to_string()));
        }
        if self.to_emails.is_empty() {
            return Err(DigestError::Config("to_emails has no recipients".to_string()));
        }
        if self.tivo_cert_path.is_some() && self.tivo_cert_password.is_none() {
            return Err(DigestError::Config(
                "tivo_cert_path is set but tivo_cert_password is missing".to_string(),
            ));
        }
        self.subscription()?;
        self.smtp_endpoint()?;
        Ok(())
    }

    /// A configured sheet wins over inline ids.
    pub fn subscription(&self) -> Result<SubscriptionConfig<'_>> {
        match (self.google_api_key.as_deref(), self.google_tvmaze_sheet_id.as_deref()) {
            (Some(api_key), Some(sheet_id)) if !sheet_id.is_empty() => {
                Ok(SubscriptionConfig::Sheet { api_key, sheet_id })
            }
            (None, Some(_)) => Err(DigestError::Config(
                "google_tvmaze_sheet_id is set but google_api_key is missing".to_string(),
            )),
            _ if !self.tvmaze_show_ids.is_empty() => Ok(SubscriptionConfig::Inline(&self.tvmaze_show_ids)),
            _ => Err(DigestError::Config(
                "no show subscription: set google_tvmaze_sheet_id or tvmaze_show_ids".to_string(),
            )),
        }
    }

    /// Splits `smtp_server` into host and port.
    pub fn smtp_endpoint(&self) -> Result<(String, u16)> {
        let server = self.smtp_server.trim();
        if server.is_empty() {
            return Err(DigestError::Config("smtp_server is empty".to_string()));
        }
        match server.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| DigestError::Config(format!("invalid smtp_server port in {}", server)))?;
                Ok((host.to_string(), port))
            }
            None => Ok((server.to_string(), DEFAULT_SMTP_PORT)),
        }
    }

    pub fn sender(&self) -> String {
        format!("{} <{}>", self.smtp_name, self.smtp_user)
    }
}
