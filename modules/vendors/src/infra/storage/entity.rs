use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

use crate::contract::model::{AvailabilityEntry, PricingTier, Review};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct PricingTiers(pub Vec<PricingTier>);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Calendar(pub Vec<AvailabilityEntry>);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Portfolio(pub Vec<String>);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Reviews(pub Vec<Review>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vendor_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub business_name: Option<String>,
    pub service_type: String,
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub pricing_tiers: PricingTiers,
    pub availability: Calendar,
    pub portfolio: Portfolio,
    pub reviews: Reviews,
    pub average_rating: f64,
    pub total_reviews: i32,
    pub contact_phone: Option<String>,
    pub years_of_experience: i32,
    pub response_time: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
