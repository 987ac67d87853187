use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::contract::model::{
    GuestInvitation, OtpPurpose, PaymentReceived, RsvpReminder, VendorPaymentRecorded,
};
use crate::domain::error::DomainError;
use crate::domain::ports::{Mailer, OutgoingEmail};
use crate::domain::templates;

/// Renders templates and hands them to the configured mailer.
#[derive(Clone)]
pub struct Service {
    mailer: Arc<dyn Mailer>,
}

impl Service {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    pub fn mailer_kind(&self) -> &'static str {
        self.mailer.kind()
    }

    #[instrument(name = "notifications.service.send_otp", skip(self, code), fields(to = %to, ?purpose))]
    pub async fn send_otp(
        &self,
        to: &str,
        name: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<(), DomainError> {
        self.dispatch(templates::otp(to, name, code, purpose)).await
    }

    #[instrument(
        name = "notifications.service.send_payment_received",
        skip(self, msg),
        fields(to = %msg.vendor_email, booking_id = %msg.booking_id)
    )]
    pub async fn send_payment_received(&self, msg: &PaymentReceived) -> Result<(), DomainError> {
        self.dispatch(templates::payment_received(msg)).await
    }

    #[instrument(
        name = "notifications.service.send_vendor_payment_recorded",
        skip(self, msg),
        fields(to = %msg.vendor_email, booking_id = %msg.booking_id)
    )]
    pub async fn send_vendor_payment_recorded(
        &self,
        msg: &VendorPaymentRecorded,
    ) -> Result<(), DomainError> {
        self.dispatch(templates::vendor_payment_recorded(msg)).await
    }

    #[instrument(name = "notifications.service.send_guest_invitation", skip(self, msg), fields(to = %msg.guest_email))]
    pub async fn send_guest_invitation(&self, msg: &GuestInvitation) -> Result<(), DomainError> {
        self.dispatch(templates::guest_invitation(msg)).await
    }

    #[instrument(name = "notifications.service.send_rsvp_reminder", skip(self, msg), fields(to = %msg.guest_email))]
    pub async fn send_rsvp_reminder(&self, msg: &RsvpReminder) -> Result<(), DomainError> {
        self.dispatch(templates::rsvp_reminder(msg)).await
    }

    #[instrument(name = "notifications.service.send_test", skip(self))]
    pub async fn send_test(&self, to: &str) -> Result<(), DomainError> {
        self.dispatch(templates::test_message(to)).await
    }

    async fn dispatch(&self, email: OutgoingEmail) -> Result<(), DomainError> {
        if !plausible_address(&email.to) {
            warn!(to = %email.to, "refusing to send to malformed address");
            return Err(DomainError::invalid_address(email.to));
        }
        debug!(mailer = self.mailer.kind(), subject = %email.subject, "delivering email");
        self.mailer.deliver(&email).await?;
        info!(to = %email.to, subject = %email.subject, "email delivered");
        Ok(())
    }
}

/// `local@domain` with no whitespace. Full RFC 5322 parsing happens in the
/// SMTP mailer.
fn plausible_address(addr: &str) -> bool {
    match addr.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !addr.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
