//! Razorpay REST v1 adapter.

mod client;
pub mod signature;

pub use client::RazorpayGateway;
