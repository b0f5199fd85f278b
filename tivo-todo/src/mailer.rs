use crate::config::Config;
use crate::traits::Mailer;
use crate::types::{DigestError, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};
use std::fmt::Display;
use std::time::SystemTime;
use tracing::info;

pub const SUBJECT_PREFIX: &str = "To do list for ";

/// Builds the outgoing digest message.
pub struct DigestMail;

impl DigestMail {
    /// The subject and `Date` header come from `now`, never from the run date.
    pub fn compose<Tz>(config: &Config, digest: &str, now: &DateTime<Tz>) -> Result<Message>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let from: Mailbox = config.sender().parse()?;
        let mut builder = Message::builder()
            .from(from)
            .subject(Self::subject(now))
            .date(SystemTime::from(now.clone()))
            .header(ContentType::TEXT_HTML);

        for recipient in &config.to_emails {
            let to: Mailbox = recipient.parse()?;
            builder = builder.to(to);
        }

        Ok(builder.body(digest.to_string())?)
    }

    pub fn subject<Tz>(now: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        format!("{}{}", SUBJECT_PREFIX, now.format("%Y-%m-%d"))
    }
}

/// SMTP delivery with opportunistic STARTTLS and plain credentials.
pub struct SmtpMailer {
    transport: SmtpTransport,
    server: String,
}

impl SmtpMailer {
    pub fn from_config(config: &Config) -> Result<Self> {
        let (host, port) = config.smtp_endpoint()?;
        let tls = TlsParameters::new(config.smtp_host.clone())?;
        let transport = SmtpTransport::builder_dangerous(host.as_str())
            .port(port)
            .tls(Tls::Opportunistic(tls))
            .credentials(Credentials::new(config.smtp_user.clone(), config.smtp_password.clone()))
            .build();

        Ok(Self {
            transport,
            server: format!("{}:{}", host, port),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: Message) -> Result<()> {
        let transport = self.transport.clone();
        info!("Sending digest via {}", self.server);

        let response = tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| DigestError::Mail(format!("mail task failed: {}", e)))??;

        info!("Mail accepted: {}", response.code());
        Ok(())
    }
}
