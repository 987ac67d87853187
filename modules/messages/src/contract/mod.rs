pub mod client;
pub mod error;
pub mod model;

pub use client::MessagesApi;
pub use error::MessagesError;
pub use model::{AlertLevel, BudgetWarning, Message};
