use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

use crate::contract::model::{PaymentAttempt, PaymentRecord, ProgressUpdate, SelectedPackage};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Package(pub SelectedPackage);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Record(pub PaymentRecord);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct History(pub Vec<PaymentAttempt>);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Progress(pub Vec<ProgressUpdate>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub vendor_id: Uuid,
    pub event_id: Option<Uuid>,
    pub service_date: NaiveDate,
    pub service_type: String,
    pub selected_package: Package,
    pub base_amount: f64,
    pub tax_amount: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub currency: String,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub advance_payment: Option<Record>,
    pub final_payment: Option<Record>,
    pub payment_history: History,
    pub vendor_progress: String,
    pub progress_updates: Progress,
    pub booking_status: String,
    pub number_of_guests: Option<i32>,
    pub venue: Option<String>,
    pub special_requests: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<Uuid>,
    pub refund_amount: Option<f64>,
    pub work_progress: i16,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
