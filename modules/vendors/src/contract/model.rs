//! Vendor profile model. Nested values are stored as JSON, so they carry
//! serde derives.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    pub address: String,
    pub city: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PricingTier {
    pub package_name: String,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub inclusions: Vec<String>,
}

pub fn default_currency() -> String {
    "INR".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    #[default]
    Available,
    Booked,
    Blocked,
}

impl AvailabilityStatus {
    /// Only explicit `booked`/`blocked` entries prevent a booking.
    pub fn blocks_booking(self) -> bool {
        matches!(self, Self::Booked | Self::Blocked)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub status: AvailabilityStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub booking_id: Option<Uuid>,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    pub is_verified_booking: bool,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VendorProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: Option<String>,
    pub service_type: String,
    pub description: Option<String>,
    pub location: Location,
    pub pricing_tiers: Vec<PricingTier>,
    pub availability: Vec<AvailabilityEntry>,
    pub portfolio: Vec<String>,
    pub reviews: Vec<Review>,
    pub average_rating: f64,
    pub total_reviews: u32,
    pub contact_phone: Option<String>,
    pub years_of_experience: u32,
    pub response_time: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VendorProfile {
    pub fn status_on(&self, date: NaiveDate) -> Option<AvailabilityStatus> {
        self.availability
            .iter()
            .find(|a| a.date == date)
            .map(|a| a.status)
    }

    pub fn tier(&self, package_name: &str) -> Option<&PricingTier> {
        self.pricing_tiers
            .iter()
            .find(|t| t.package_name.eq_ignore_ascii_case(package_name))
    }

    /// Label for emails and listings.
    pub fn display_name(&self) -> &str {
        self.business_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.service_type)
    }
}

/// Fields a vendor may set on their profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileInput {
    pub business_name: Option<String>,
    pub service_type: String,
    pub description: Option<String>,
    pub location: Location,
    pub pricing_tiers: Vec<PricingTier>,
    pub contact_phone: Option<String>,
    pub years_of_experience: u32,
    pub response_time: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    /// Validated to 1..=5 by the service.
    pub rating: i64,
    pub comment: Option<String>,
    pub booking_id: Option<Uuid>,
}
