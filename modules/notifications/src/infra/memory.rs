use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::error::DomainError;
use crate::domain::ports::{Mailer, OutgoingEmail};

/// Keeps every delivered message in memory. Used by tests across the
/// workspace to assert on outgoing mail.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail_with: Option<String>,
}

impl MemoryMailer {
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sent: Mutex::default(),
            fail_with: Some(message.into()),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn deliver(&self, email: &OutgoingEmail) -> Result<(), DomainError> {
        if let Some(msg) = &self.fail_with {
            return Err(DomainError::transport(msg.clone()));
        }
        self.sent.lock().push(email.clone());
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
