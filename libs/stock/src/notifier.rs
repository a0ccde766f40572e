use std::time::Duration;

use anyhow::{Error, ensure};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, instrument};

use crate::alert::AlertResult;
use crate::config::EmailSettings;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivers one summary for a batch of alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, settings: &EmailSettings, alerts: &[AlertResult]) -> Result<(), Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertDigest {
    pub subject: String,
    pub body: String,
}

pub fn digest(alerts: &[AlertResult], generated_at: DateTime<Local>) -> AlertDigest {
    let subject = format!("Portfolio Alert: {} stocks triggered", alerts.len());

    let mut body = String::from("The following stocks are below your alert threshold:\n\n");
    for alert in alerts {
        body.push_str(&format!(
            "• {}: ${:.2} ({:.1}% from ${:.2} high on {})\n",
            alert.symbol,
            alert.current_price,
            alert.pct_from_high,
            alert.recent_high,
            alert.date_of_high.format("%Y-%m-%d"),
        ));
    }
    body.push_str(&format!(
        "\nAlert generated at: {}",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    AlertDigest { subject, body }
}

/// Sends the digest over SMTP with STARTTLS.
#[derive(Debug, Clone, Default)]
pub struct EmailNotifier;

#[async_trait]
impl Notifier for EmailNotifier {
    #[instrument(name = "email_notify", skip_all, fields(alerts = alerts.len()))]
    async fn notify(&self, settings: &EmailSettings, alerts: &[AlertResult]) -> Result<(), Error> {
        ensure!(settings.enabled, "email notifications are disabled");
        ensure!(!settings.sender_email.is_empty(), "sender_email is not set");
        ensure!(!settings.sender_password.is_empty(), "sender_password is not set");
        ensure!(!settings.recipient_email.is_empty(), "recipient_email is not set");

        let AlertDigest { subject, body } = digest(alerts, Local::now());

        let message = Message::builder()
            .from(settings.sender_email.parse()?)
            .to(settings.recipient_email.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_server)?
            .port(settings.smtp_port)
            .credentials(Credentials::new(
                settings.sender_email.clone(),
                settings.sender_password.clone(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        mailer.send(message).await?;
        info!(to = %settings.recipient_email, "alert email sent");
        Ok(())
    }
}
