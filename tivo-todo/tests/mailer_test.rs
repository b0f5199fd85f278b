mod common;

use chrono::TimeZone;
use common::*;
use tivo_todo::mailer::SUBJECT_PREFIX;
use tivo_todo::{Config, DigestMail, SmtpMailer};

#[test]
fn test_message_headers() {
    let config = Config::from_json(CONFIG_JSON).unwrap();
    let now = zone().with_ymd_and_hms(2024, 5, 3, 9, 15, 0).unwrap();

    let message = DigestMail::compose(&config, "Today's new episodes:<br/><br/>Tomorrow's new episodes", &now).unwrap();
    let formatted = String::from_utf8(message.formatted()).unwrap();

    assert!(formatted.contains("Subject: To do list for 2024-05-03"));
    assert!(formatted.contains("From: \"Digest Bot\" <bot@example.com>") || formatted.contains("From: Digest Bot <bot@example.com>"));
    assert!(formatted.contains("me@example.com"));
    assert!(formatted.contains("partner@example.com"));
    assert!(formatted.contains("Content-Type: text/html"));
    assert!(formatted.contains("Date: "));
    assert!(formatted.contains("3 May 2024") || formatted.contains("03 May 2024"));
}

#[test]
fn test_subject_uses_actual_date_not_run_date() {
    let config = Config::from_json(CONFIG_JSON).unwrap();
    let dates = run_dates("2024-05-01");
    let now = zone().with_ymd_and_hms(2024, 5, 3, 23, 30, 0).unwrap();

    assert_eq!(DigestMail::subject(&now), format!("{}2024-05-03", SUBJECT_PREFIX));

    let formatted = String::from_utf8(DigestMail::compose(&config, "digest", &now).unwrap().formatted()).unwrap();
    assert!(formatted.contains("Subject: To do list for 2024-05-03"));
    assert!(!formatted.contains(&format!("To do list for {}", dates.today)));
}

#[test]
fn test_invalid_recipient_is_mail_error() {
    let mut config = Config::from_json(CONFIG_JSON).unwrap();
    config.to_emails.push("not an address".to_string());
    let now = zone().with_ymd_and_hms(2024, 5, 3, 9, 0, 0).unwrap();

    let err = DigestMail::compose(&config, "digest", &now).unwrap_err();
    assert_eq!(err.category(), tivo_todo::ErrorCategory::Mail);
}

#[test]
fn test_smtp_mailer_builds_from_config() {
    let config = Config::from_json(CONFIG_JSON).unwrap();
    assert!(SmtpMailer::from_config(&config).is_ok());
}
