use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::contract::{
    error::VendorsError,
    model::{AvailabilityStatus, VendorProfile},
};

/// Public API of the vendors module.
#[async_trait]
pub trait VendorsApi: Send + Sync {
    async fn get_vendor(&self, id: Uuid) -> Result<VendorProfile, VendorsError>;

    /// Profile owned by a vendor user, if they created one.
    async fn vendor_of_user(&self, user_id: Uuid) -> Result<Option<VendorProfile>, VendorsError>;

    /// Upsert the calendar entry for `date`.
    async fn set_date_status(
        &self,
        vendor_id: Uuid,
        date: NaiveDate,
        status: AvailabilityStatus,
    ) -> Result<(), VendorsError>;
}

/// Implemented by the bookings module and published to the client hub.
/// A review is marked verified when this returns a booking.
#[async_trait]
pub trait ReviewEligibility: Send + Sync {
    async fn completed_booking(&self, user_id: Uuid, vendor_id: Uuid) -> Option<Uuid>;
}
