//! Bookings and manual vendor payments. Nested records are stored as JSON,
//! so they carry serde derives.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Due,
    Paid,
    PartiallyPaid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Counts toward the customer's spending.
    pub fn is_spent(self) -> bool {
        matches!(self, Self::Paid | Self::PartiallyPaid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    Disputed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VendorProgress {
    #[default]
    NotStarted,
    Confirmed,
    InPreparation,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Created,
    Attempted,
    Paid,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SelectedPackage {
    pub package_name: String,
    pub price: f64,
    #[serde(default)]
    pub inclusions: Vec<String>,
}

/// Money received through the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentRecord {
    pub amount: f64,
    pub paid_at: DateTime<Utc>,
    pub payment_id: String,
}

/// One entry of the append-only gateway history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentAttempt {
    pub amount: f64,
    pub order_id: String,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
    pub status: AttemptStatus,
    #[serde(default)]
    pub failure_reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProgressUpdate {
    pub status: VendorProgress,
    #[serde(default)]
    pub note: Option<String>,
    pub updated_by: Uuid,
    pub timestamp: DateTime<Utc>,
}

/// Booking request as submitted by a customer.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub vendor_id: Uuid,
    pub event_id: Option<Uuid>,
    pub service_date: NaiveDate,
    /// The vendor's own tier price wins when the package name matches one.
    pub selected_package: SelectedPackage,
    pub discount_amount: f64,
    pub number_of_guests: Option<u32>,
    pub venue: Option<String>,
    pub special_requests: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub vendor_id: Uuid,
    pub event_id: Option<Uuid>,
    pub service_date: NaiveDate,
    pub service_type: String,
    pub selected_package: SelectedPackage,
    pub base_amount: f64,
    pub tax_amount: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub currency: String,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub advance_payment: Option<PaymentRecord>,
    pub final_payment: Option<PaymentRecord>,
    pub payment_history: Vec<PaymentAttempt>,
    pub vendor_progress: VendorProgress,
    pub progress_updates: Vec<ProgressUpdate>,
    pub booking_status: BookingStatus,
    pub number_of_guests: Option<u32>,
    pub venue: Option<String>,
    pub special_requests: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<Uuid>,
    pub refund_amount: Option<f64>,
    pub work_progress: u8,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Gateway payment that settled this booking, if any.
    pub fn captured_payment_id(&self) -> Option<&str> {
        self.advance_payment
            .as_ref()
            .map(|p| p.payment_id.as_str())
            .or_else(|| {
                self.payment_history
                    .iter()
                    .rev()
                    .find(|a| a.status == AttemptStatus::Paid)
                    .and_then(|a| a.payment_id.as_deref())
            })
    }

    pub fn has_captured(&self, payment_id: &str) -> bool {
        self.payment_history
            .iter()
            .any(|a| a.status == AttemptStatus::Paid && a.payment_id.as_deref() == Some(payment_id))
    }

    pub fn knows_order(&self, order_id: &str) -> bool {
        self.payment_history.iter().any(|a| a.order_id == order_id)
    }

    /// Order id of the most recent gateway order.
    pub fn latest_order_id(&self) -> Option<&str> {
        self.payment_history
            .iter()
            .rev()
            .find(|a| a.status == AttemptStatus::Created)
            .map(|a| a.order_id.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Advance,
    Partial,
    Final,
    Full,
}

impl PaymentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Advance => "advance",
            Self::Partial => "partial",
            Self::Final => "final",
            Self::Full => "full",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    #[default]
    Online,
    Card,
    Upi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VendorPaymentStatus {
    Pending,
    #[default]
    Completed,
    Failed,
}

impl VendorPaymentStatus {
    /// Counts toward what has been paid on a booking.
    pub fn counts_as_paid(self) -> bool {
        matches!(self, Self::Pending | Self::Completed)
    }
}

/// A payment recorded by hand outside the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorPayment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub vendor_id: Uuid,
    pub amount: f64,
    pub payment_type: PaymentType,
    pub method: PaymentMethod,
    pub status: VendorPaymentStatus,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewVendorPayment {
    pub amount: f64,
    pub payment_type: PaymentType,
    pub method: PaymentMethod,
    pub status: VendorPaymentStatus,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
}
