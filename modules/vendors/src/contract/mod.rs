pub mod client;
pub mod error;
pub mod model;

pub use client::{ReviewEligibility, VendorsApi};
pub use error::VendorsError;
pub use model::{AvailabilityStatus, VendorProfile};
