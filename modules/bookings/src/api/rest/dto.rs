use chrono::{DateTime, NaiveDate, Utc};
use messages::contract::BudgetWarning;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::contract::model::{
    Booking, BookingStatus, NewBooking, NewVendorPayment, PaymentAttempt, PaymentMethod,
    PaymentRecord, PaymentStatus, PaymentType, ProgressUpdate, SelectedPackage, VendorPayment,
    VendorPaymentStatus, VendorProgress,
};
use crate::domain::budget_check::BudgetStatus;
use crate::domain::payments::{PaymentConfirmation, PaymentFailure, WebhookOutcome};
use crate::domain::repo::BookingFilter;
use crate::domain::service::{CheckoutOrder, CreatedBooking};
use crate::domain::vendor_payments::BookingPayments;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingDto {
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

impl From<Booking> for BookingDto {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            user_id: b.user_id,
            vendor_id: b.vendor_id,
            event_id: b.event_id,
            service_date: b.service_date,
            service_type: b.service_type,
            selected_package: b.selected_package,
            base_amount: b.base_amount,
            tax_amount: b.tax_amount,
            discount_amount: b.discount_amount,
            total_amount: b.total_amount,
            currency: b.currency,
            payment_status: b.payment_status,
            payment_method: b.payment_method,
            advance_payment: b.advance_payment,
            final_payment: b.final_payment,
            payment_history: b.payment_history,
            vendor_progress: b.vendor_progress,
            progress_updates: b.progress_updates,
            booking_status: b.booking_status,
            number_of_guests: b.number_of_guests,
            venue: b.venue,
            special_requests: b.special_requests,
            cancellation_reason: b.cancellation_reason,
            cancelled_at: b.cancelled_at,
            cancelled_by: b.cancelled_by,
            refund_amount: b.refund_amount,
            work_progress: b.work_progress,
            confirmed_at: b.confirmed_at,
            completed_at: b.completed_at,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PackageReq {
    pub package_name: String,
    /// Ignored when the vendor lists a tier with this name.
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub inclusions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateBookingReq {
    pub vendor_id: Uuid,
    #[serde(default)]
    pub event_id: Option<Uuid>,
    pub service_date: NaiveDate,
    pub selected_package: PackageReq,
    #[serde(default)]
    pub discount_amount: f64,
    #[serde(default)]
    pub number_of_guests: Option<u32>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub special_requests: Option<String>,
}

impl From<CreateBookingReq> for NewBooking {
    fn from(r: CreateBookingReq) -> Self {
        Self {
            vendor_id: r.vendor_id,
            event_id: r.event_id,
            service_date: r.service_date,
            selected_package: SelectedPackage {
                package_name: r.selected_package.package_name,
                price: r.selected_package.price,
                inclusions: r.selected_package.inclusions,
            },
            discount_amount: r.discount_amount,
            number_of_guests: r.number_of_guests,
            venue: r.venue,
            special_requests: r.special_requests,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderDto {
    pub id: String,
    /// Minor units, as the checkout expects.
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
}

impl From<CheckoutOrder> for OrderDto {
    fn from(o: CheckoutOrder) -> Self {
        Self {
            id: o.id,
            amount: o.amount,
            currency: o.currency,
            key_id: o.key_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BudgetCheckDto {
    pub total_budget: f64,
    pub total_spent: f64,
    pub remaining: f64,
    pub requested_amount: f64,
    pub projected_total: f64,
    pub percentage_used: f64,
    pub is_exceeding: bool,
    pub is_warning: bool,
    pub is_critical: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BudgetStatusDto {
    pub has_budget: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub message: Option<&'static str>,
    #[serde(flatten)]
    pub check: Option<BudgetCheckDto>,
}

impl From<&BudgetStatus> for BudgetStatusDto {
    fn from(s: &BudgetStatus) -> Self {
        match s {
            BudgetStatus::NoBudget => Self {
                has_budget: false,
                message: Some("No budget limit set"),
                check: None,
            },
            BudgetStatus::Unavailable => Self {
                has_budget: false,
                message: Some("Budget could not be checked"),
                check: None,
            },
            BudgetStatus::Checked(c) => Self {
                has_budget: true,
                message: None,
                check: Some(BudgetCheckDto {
                    total_budget: c.total_budget,
                    total_spent: c.total_spent,
                    remaining: c.remaining,
                    requested_amount: c.requested_amount,
                    projected_total: c.projected_total,
                    percentage_used: c.percentage_used,
                    is_exceeding: c.is_exceeding,
                    is_warning: c.is_warning,
                    is_critical: c.is_critical,
                }),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedBookingDto {
    pub booking: BookingDto,
    pub order: OrderDto,
    pub budget_status: BudgetStatusDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_alert: Option<BudgetWarning>,
}

impl From<CreatedBooking> for CreatedBookingDto {
    fn from(c: CreatedBooking) -> Self {
        Self {
            budget_status: (&c.budget).into(),
            budget_alert: c.budget.alert(),
            booking: c.booking.into(),
            order: c.order.into(),
        }
    }
}

/// Checkout callback fields; the `razorpay_` names are accepted as sent.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VerifyPaymentReq {
    pub booking_id: Uuid,
    #[serde(alias = "razorpay_order_id")]
    pub order_id: String,
    #[serde(alias = "razorpay_payment_id")]
    pub payment_id: String,
    #[serde(alias = "razorpay_signature")]
    pub signature: String,
}

impl From<VerifyPaymentReq> for PaymentConfirmation {
    fn from(r: VerifyPaymentReq) -> Self {
        Self {
            booking_id: r.booking_id,
            order_id: r.order_id,
            payment_id: r.payment_id,
            signature: r.signature,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VerifiedDto {
    #[schema(value_type = String)]
    pub message: &'static str,
    pub booking: BookingDto,
}

/// Gateway notification envelope; the handler reads the raw body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WebhookEventReq {
    pub event: String,
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WebhookAckDto {
    #[schema(value_type = String)]
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

impl From<WebhookOutcome> for WebhookAckDto {
    fn from(o: WebhookOutcome) -> Self {
        match o {
            WebhookOutcome::Captured { booking_id } => Self {
                status: "captured",
                booking_id: Some(booking_id),
                event: None,
            },
            WebhookOutcome::Failed { booking_id } => Self {
                status: "failed",
                booking_id: Some(booking_id),
                event: None,
            },
            WebhookOutcome::Ignored { event } => Self {
                status: "ignored",
                booking_id: None,
                event: Some(event),
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingListQuery {
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub event_id: Option<Uuid>,
}

impl From<BookingListQuery> for BookingFilter {
    fn from(q: BookingListQuery) -> Self {
        Self {
            status: q.status,
            payment_status: q.payment_status,
            event_id: q.event_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingListDto {
    pub count: usize,
    pub bookings: Vec<BookingDto>,
}

impl From<Vec<Booking>> for BookingListDto {
    fn from(bookings: Vec<Booking>) -> Self {
        Self {
            count: bookings.len(),
            bookings: bookings.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VendorProgressReq {
    pub status: VendorProgress,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CancelReq {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub refund_amount: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PaymentFailedReq {
    #[serde(default, alias = "razorpay_order_id")]
    pub order_id: Option<String>,
    #[serde(default, alias = "razorpay_payment_id")]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl From<PaymentFailedReq> for PaymentFailure {
    fn from(r: PaymentFailedReq) -> Self {
        Self {
            order_id: r.order_id,
            payment_id: r.payment_id,
            reason: r.reason,
        }
    }
}

// --- vendor payments ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VendorPaymentDto {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub vendor_id: Uuid,
    pub amount: f64,
    pub payment_type: PaymentType,
    pub payment_method: PaymentMethod,
    pub status: VendorPaymentStatus,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VendorPayment> for VendorPaymentDto {
    fn from(p: VendorPayment) -> Self {
        Self {
            id: p.id,
            booking_id: p.booking_id,
            user_id: p.user_id,
            vendor_id: p.vendor_id,
            amount: p.amount,
            payment_type: p.payment_type,
            payment_method: p.method,
            status: p.status,
            transaction_id: p.transaction_id,
            notes: p.notes,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecordPaymentReq {
    pub amount: f64,
    pub payment_type: PaymentType,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub status: VendorPaymentStatus,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<RecordPaymentReq> for NewVendorPayment {
    fn from(r: RecordPaymentReq) -> Self {
        Self {
            amount: r.amount,
            payment_type: r.payment_type,
            method: r.payment_method,
            status: r.status,
            transaction_id: r.transaction_id,
            notes: r.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecordedPaymentDto {
    pub payment: VendorPaymentDto,
    pub booking: BookingDto,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingPaymentsDto {
    pub payments: Vec<VendorPaymentDto>,
    pub total_amount: f64,
    pub total_paid: f64,
    pub remaining: f64,
}

impl From<BookingPayments> for BookingPaymentsDto {
    fn from(p: BookingPayments) -> Self {
        Self {
            payments: p.payments.into_iter().map(Into::into).collect(),
            total_amount: p.total_amount,
            total_paid: p.total_paid,
            remaining: p.remaining,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PaymentStatusReq {
    pub status: VendorPaymentStatus,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WorkProgressReq {
    pub progress: i64,
    #[serde(default)]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::budget_check::BudgetCheck;

    #[test]
    fn budget_status_flattens_the_check() {
        let v = serde_json::to_value(BudgetStatusDto::from(&BudgetStatus::Checked(
            BudgetCheck::evaluate(1000.0, 0.0, 850.0),
        )))
        .unwrap();
        assert_eq!(v["has_budget"], true);
        assert_eq!(v["is_warning"], true);
        assert!(v.get("message").is_none());

        let none = serde_json::to_value(BudgetStatusDto::from(&BudgetStatus::NoBudget)).unwrap();
        assert_eq!(none["has_budget"], false);
        assert_eq!(none["message"], "No budget limit set");
        assert!(none.get("total_budget").is_none());
    }

    #[test]
    fn checkout_field_names_are_accepted() {
        let req: VerifyPaymentReq = serde_json::from_value(serde_json::json!({
            "booking_id": Uuid::nil(),
            "razorpay_order_id": "order_1",
            "razorpay_payment_id": "pay_1",
            "razorpay_signature": "abc"
        }))
        .unwrap();
        assert_eq!(req.order_id, "order_1");
        assert_eq!(req.payment_id, "pay_1");
    }
}
