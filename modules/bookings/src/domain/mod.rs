pub mod budget_check;
pub mod error;
pub mod payments;
pub mod ports;
pub mod pricing;
pub mod repo;
pub mod service;
pub mod vendor_payments;
