use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::{AvailabilityEntry, Review, VendorProfile};

/// Case-insensitive substring filters evaluated by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextMatch {
    pub service_type: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// Writers below touch only the columns they name, so concurrent edits of
/// different parts of one profile do not overwrite each other.
#[async_trait]
pub trait VendorsRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<VendorProfile>>;
    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<VendorProfile>>;
    /// Active profiles passing `text`; the remaining search stages run in memory.
    async fn list_active(&self, text: &TextMatch) -> anyhow::Result<Vec<VendorProfile>>;
    async fn insert(&self, profile: VendorProfile) -> anyhow::Result<()>;
    /// Editable fields only: calendar, portfolio and reviews are left alone.
    async fn update_details(&self, profile: &VendorProfile) -> anyhow::Result<()>;
    async fn write_calendar(
        &self,
        id: Uuid,
        calendar: &[AvailabilityEntry],
        at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
    async fn write_portfolio(
        &self,
        id: Uuid,
        portfolio: &[String],
        at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
    /// Reviews together with the rating summary derived from them.
    async fn write_reviews(
        &self,
        id: Uuid,
        reviews: &[Review],
        average_rating: f64,
        total_reviews: u32,
        at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
}
