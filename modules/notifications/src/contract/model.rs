use chrono::NaiveDate;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    Registration,
    Login,
    PasswordReset,
}

/// Sent to a vendor once a booking payment is verified.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReceived {
    pub vendor_email: String,
    pub vendor_name: String,
    pub user_name: String,
    pub amount: f64,
    pub currency: String,
    pub service_date: NaiveDate,
    pub service_type: String,
    pub booking_id: Uuid,
}

/// Sent to a vendor when a customer records a manual payment.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorPaymentRecorded {
    pub vendor_email: String,
    pub vendor_name: String,
    pub user_name: String,
    pub amount: f64,
    pub payment_type: String,
    pub remaining: f64,
    pub booking_id: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuestInvitation {
    pub guest_email: String,
    pub guest_name: String,
    pub event_name: String,
    pub event_date: NaiveDate,
    pub event_location: String,
    pub organizer_name: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RsvpReminder {
    pub guest_email: String,
    pub guest_name: String,
    pub event_name: String,
    pub event_date: NaiveDate,
    pub event_location: String,
    pub organizer_name: String,
    pub days_until_event: i64,
}
