use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum NotificationsError {
    #[error("invalid recipient address '{address}'")]
    InvalidAddress { address: String },

    #[error("delivery failed: {message}")]
    Delivery { message: String },
}

impl NotificationsError {
    pub fn invalid_address(address: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
        }
    }

    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }
}
