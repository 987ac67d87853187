// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::{client, error, model};

pub mod module;
pub use module::Events;

// Internal layers, public for integration tests only.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
