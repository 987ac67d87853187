pub mod budget;
pub mod event;
pub mod guest;
