use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("invalid recipient address '{address}'")]
    InvalidAddress { address: String },

    #[error("mail transport error: {message}")]
    Transport { message: String },
}

impl DomainError {
    pub fn invalid_address(address: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

impl From<DomainError> for crate::contract::NotificationsError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidAddress { address } => Self::invalid_address(address),
            DomainError::Transport { message } => Self::delivery(message),
        }
    }
}
