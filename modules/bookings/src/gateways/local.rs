use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;
use vendors::contract::ReviewEligibility;

use crate::domain::service::Service;

/// Lets the vendors module mark reviews backed by a completed booking.
pub struct BookingsReviewEligibility {
    service: Arc<Service>,
}

impl BookingsReviewEligibility {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ReviewEligibility for BookingsReviewEligibility {
    async fn completed_booking(&self, user_id: Uuid, vendor_id: Uuid) -> Option<Uuid> {
        self.service
            .completed_booking(user_id, vendor_id)
            .await
            .map_err(|e| tracing::warn!(error = %e, "review eligibility lookup failed"))
            .ok()
            .flatten()
    }
}
