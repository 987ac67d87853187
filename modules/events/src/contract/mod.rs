pub mod client;
pub mod error;
pub mod model;

pub use client::EventsApi;
pub use error::EventsError;
pub use model::Event;
