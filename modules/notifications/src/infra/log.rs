use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::ports::{Mailer, OutgoingEmail};

/// Development mailer: writes the message to the log instead of sending it.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn deliver(&self, email: &OutgoingEmail) -> Result<(), DomainError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.text,
            "email (log mode, not sent)"
        );
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "log"
    }
}
