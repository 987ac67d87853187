pub mod budget;
pub mod error;
pub mod guests;
pub mod repo;
pub mod service;
