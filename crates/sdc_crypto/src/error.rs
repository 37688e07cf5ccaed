use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Required input is empty: {0}")]
    EmptyInput(&'static str),

    #[error("Invalid size: {0}")]
    InvalidSize(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("AEAD encryption failed")]
    Encryption,

    #[error("Decryption failed (authentication tag mismatch: wrong password or tampered data)")]
    Decryption,

    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}
