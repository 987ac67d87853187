pub mod booking;
pub mod vendor_payment;
