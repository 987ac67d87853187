use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::NotificationsApi,
    error::NotificationsError,
    model::{GuestInvitation, OtpPurpose, PaymentReceived, RsvpReminder, VendorPaymentRecorded},
};
use crate::domain::service::Service;

/// In-process client published to the client hub.
pub struct NotificationsLocalClient {
    service: Arc<Service>,
}

impl NotificationsLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl NotificationsApi for NotificationsLocalClient {
    async fn send_otp(
        &self,
        email: &str,
        name: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<(), NotificationsError> {
        Ok(self.service.send_otp(email, name, code, purpose).await?)
    }

    async fn send_payment_received(&self, msg: PaymentReceived) -> Result<(), NotificationsError> {
        Ok(self.service.send_payment_received(&msg).await?)
    }

    async fn send_vendor_payment_recorded(
        &self,
        msg: VendorPaymentRecorded,
    ) -> Result<(), NotificationsError> {
        Ok(self.service.send_vendor_payment_recorded(&msg).await?)
    }

    async fn send_guest_invitation(&self, msg: GuestInvitation) -> Result<(), NotificationsError> {
        Ok(self.service.send_guest_invitation(&msg).await?)
    }

    async fn send_rsvp_reminder(&self, msg: RsvpReminder) -> Result<(), NotificationsError> {
        Ok(self.service.send_rsvp_reminder(&msg).await?)
    }

    async fn send_test(&self, email: &str) -> Result<(), NotificationsError> {
        Ok(self.service.send_test(email).await?)
    }
}
