use sdc_crypto::CryptoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Required input is empty: {0}")]
    EmptyInput(&'static str),

    #[error("Authentication failed")]
    InvalidAuthentication,

    #[error("Item not found in the collection")]
    NotFound,

    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("An item cannot be shared with its own owner")]
    SelfShare,

    #[error("Item has already been shared")]
    AlreadyShared,

    #[error("Item is already in the user's collection")]
    AlreadyInCollection,

    #[error("Decryption failed: wrong key or tampered data")]
    Decryption,

    #[error("Invalid size: {0}")]
    InvalidSize(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Crypto error: {0}")]
    Crypto(CryptoError),
}

impl From<CryptoError> for StoreError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::Decryption => StoreError::Decryption,
            CryptoError::InvalidSize(msg) => StoreError::InvalidSize(msg),
            CryptoError::EmptyInput(field) => StoreError::EmptyInput(field),
            other => StoreError::Crypto(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
