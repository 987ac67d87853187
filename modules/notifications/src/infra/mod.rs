pub mod log;
pub mod memory;
pub mod smtp;
