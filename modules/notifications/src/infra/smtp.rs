use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::NotificationsConfig;
use crate::domain::error::DomainError;
use crate::domain::ports::{Mailer, OutgoingEmail};

/// STARTTLS relay, e.g. `smtp.gmail.com:587` with an app password.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(cfg: &NotificationsConfig) -> anyhow::Result<Self> {
        let from: Mailbox = cfg
            .from
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid notifications.from '{}': {e}", cfg.from))?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.smtp_host)?
            .port(cfg.smtp_port)
            .timeout(Some(Duration::from_secs(cfg.timeout_secs)));
        if !cfg.username.is_empty() {
            builder =
                builder.credentials(Credentials::new(cfg.username.clone(), cfg.password.clone()));
        }
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn deliver(&self, email: &OutgoingEmail) -> Result<(), DomainError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|_| DomainError::invalid_address(email.to.clone()))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                email.text.clone(),
                email.html.clone(),
            ))
            .map_err(|e| DomainError::transport(e.to_string()))?;
        self.transport
            .send(message)
            .await
            .map_err(|e| DomainError::transport(e.to_string()))?;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_sender_is_a_config_error() {
        let cfg = NotificationsConfig {
            from: "not an address".into(),
            ..Default::default()
        };
        assert!(SmtpMailer::from_config(&cfg).is_err());
    }

    #[test]
    fn default_config_builds_a_transport() {
        let mailer = SmtpMailer::from_config(&NotificationsConfig::default()).unwrap();
        assert_eq!(mailer.kind(), "smtp");
    }
}
