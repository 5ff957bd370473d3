//! Operator notifications.
//!
//! The engine only depends on the [`Notifier`] trait; the SMTP
//! transport behind [`EmailNotifier`] is replaceable wholesale.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::MailConfig;
use crate::error::{SyncError, SyncResult};

/// Capability to reach a human operator.
pub trait Notifier: Send + Sync {
    fn send(&self, subject: &str, body: &str) -> SyncResult<()>;
}

/// Notifier sending mail over implicit-TLS SMTP.
pub struct EmailNotifier {
    config: MailConfig,
}

impl EmailNotifier {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    /// Parse the comma-separated receiver list into mailboxes.
    pub(crate) fn recipients(receiver: &str) -> SyncResult<Vec<Mailbox>> {
        receiver
            .split(',')
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(|address| {
                address
                    .parse::<Mailbox>()
                    .map_err(|e| SyncError::Mail(format!("invalid recipient {address}: {e}")))
            })
            .collect()
    }
}

impl Notifier for EmailNotifier {
    fn send(&self, subject: &str, body: &str) -> SyncResult<()> {
        let from: Mailbox = self
            .config
            .user
            .parse()
            .map_err(|e| SyncError::Mail(format!("invalid sender {}: {e}", self.config.user)))?;

        let mut builder = Message::builder().from(from).subject(subject);
        for recipient in Self::recipients(&self.config.receiver)? {
            builder = builder.to(recipient);
        }
        let message = builder
            .body(body.to_string())
            .map_err(|e| SyncError::Mail(e.to_string()))?;

        let credentials =
            Credentials::new(self.config.user.clone(), self.config.password.clone());
        let mailer = SmtpTransport::relay(&self.config.server)
            .map_err(|e| SyncError::Mail(e.to_string()))?
            .port(self.config.port)
            .credentials(credentials)
            .build();

        mailer
            .send(&message)
            .map_err(|e| SyncError::Mail(e.to_string()))?;
        log::info!("Successfully sent mail: {subject}");
        Ok(())
    }
}

#[cfg(test)]
#[path = "notifier_tests.rs"]
mod tests;
