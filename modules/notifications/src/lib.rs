//! Transactional email.
//!
//! Other modules never talk to SMTP directly: they fetch
//! `dyn NotificationsApi` from the client hub and treat every send as best
//! effort.

pub mod contract;
pub use contract::{client, error, model};

pub mod module;
pub use module::Notifications;

#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
