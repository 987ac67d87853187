use async_trait::async_trait;

use crate::contract::{
    error::NotificationsError,
    model::{GuestInvitation, OtpPurpose, PaymentReceived, RsvpReminder, VendorPaymentRecorded},
};

/// Public API of the notifications module.
///
/// Callers decide whether a failure matters; most log it and continue.
#[async_trait]
pub trait NotificationsApi: Send + Sync {
    /// One-time code for login, registration or password reset.
    async fn send_otp(
        &self,
        email: &str,
        name: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<(), NotificationsError>;

    async fn send_payment_received(&self, msg: PaymentReceived) -> Result<(), NotificationsError>;

    async fn send_vendor_payment_recorded(
        &self,
        msg: VendorPaymentRecorded,
    ) -> Result<(), NotificationsError>;

    async fn send_guest_invitation(&self, msg: GuestInvitation) -> Result<(), NotificationsError>;

    async fn send_rsvp_reminder(&self, msg: RsvpReminder) -> Result<(), NotificationsError>;

    /// Connectivity check for operators.
    async fn send_test(&self, email: &str) -> Result<(), NotificationsError>;
}
