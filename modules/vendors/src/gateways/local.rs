use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::VendorsApi,
    error::VendorsError,
    model::{AvailabilityStatus, VendorProfile},
};
use crate::domain::service::Service;

pub struct VendorsLocalClient {
    service: Arc<Service>,
}

impl VendorsLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl VendorsApi for VendorsLocalClient {
    async fn get_vendor(&self, id: Uuid) -> Result<VendorProfile, VendorsError> {
        Ok(self.service.get_profile(id).await?)
    }

    async fn vendor_of_user(&self, user_id: Uuid) -> Result<Option<VendorProfile>, VendorsError> {
        Ok(self.service.profile_of_user(user_id).await?)
    }

    async fn set_date_status(
        &self,
        vendor_id: Uuid,
        date: NaiveDate,
        status: AvailabilityStatus,
    ) -> Result<(), VendorsError> {
        Ok(self.service.set_date_status(vendor_id, date, status).await?)
    }
}
