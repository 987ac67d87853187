pub mod model;

pub use model::{Booking, BookingStatus, PaymentStatus, VendorPayment, VendorProgress};
