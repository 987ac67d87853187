pub mod razorpay;
pub mod storage;
