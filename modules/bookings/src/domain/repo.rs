use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::{Booking, BookingStatus, PaymentStatus, VendorPayment};

#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub event_id: Option<Uuid>,
}

#[async_trait]
pub trait BookingsRepository: Send + Sync {
    async fn find_booking(&self, id: Uuid) -> anyhow::Result<Option<Booking>>;
    /// Newest first.
    async fn bookings_of_user(
        &self,
        user_id: Uuid,
        filter: &BookingFilter,
    ) -> anyhow::Result<Vec<Booking>>;
    /// Newest first.
    async fn bookings_of_vendor(&self, vendor_id: Uuid) -> anyhow::Result<Vec<Booking>>;
    async fn insert_booking(&self, booking: Booking) -> anyhow::Result<()>;
    async fn update_booking(&self, booking: Booking) -> anyhow::Result<()>;
    /// Sum of `total_amount` over bookings with payment status paid or partially paid.
    async fn spent_by_user(&self, user_id: Uuid) -> anyhow::Result<f64>;
    /// Most recent completed booking of the user with the vendor.
    async fn completed_booking(&self, user_id: Uuid, vendor_id: Uuid)
        -> anyhow::Result<Option<Uuid>>;
}

#[async_trait]
pub trait PaymentsRepository: Send + Sync {
    async fn find_payment(&self, id: Uuid) -> anyhow::Result<Option<VendorPayment>>;
    /// Oldest first.
    async fn payments_of_booking(&self, booking_id: Uuid) -> anyhow::Result<Vec<VendorPayment>>;
    /// Newest first.
    async fn payments_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<VendorPayment>>;
    /// Newest first.
    async fn payments_to_vendor(&self, vendor_id: Uuid) -> anyhow::Result<Vec<VendorPayment>>;
    async fn insert_payment(&self, payment: VendorPayment) -> anyhow::Result<()>;
    async fn update_payment(&self, payment: VendorPayment) -> anyhow::Result<()>;
}

pub trait BookingStore: BookingsRepository + PaymentsRepository {}

impl<T> BookingStore for T where T: BookingsRepository + PaymentsRepository {}
