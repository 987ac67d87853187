use async_trait::async_trait;

use crate::domain::error::DomainError;

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Delivery port. Implementations: SMTP relay, log-only.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn deliver(&self, email: &OutgoingEmail) -> Result<(), DomainError>;

    fn kind(&self) -> &'static str;
}
