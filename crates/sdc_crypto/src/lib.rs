//! sdc_crypto: Secure Data Container cryptographic primitives
//!
//! # Design principles
//! - NO custom crypto; all primitives come from audited Rust crates.
//! - Zeroize derived keys and decrypted plaintext on drop.
//! - Every cost parameter has a floor; weaker settings are rejected, never
//!   silently accepted.
//!
//! # Module layout
//! - `params`   KDF cost parameters and their enforced minimums
//! - `kdf`      Argon2id key derivation + salt generation
//! - `password` salted password verifier (create / verify)
//! - `aead`     XChaCha20-Poly1305 encrypt/decrypt helpers
//! - `hash`     BLAKE3 content hashing (item identity)
//! - `codec`    per-item encryption codec (serialize, seal, open)
//! - `error`    unified error type

pub mod aead;
pub mod codec;
pub mod error;
pub mod hash;
pub mod kdf;
pub mod params;
pub mod password;

pub use codec::{CodecMetadata, ItemCodec, SealedValue};
pub use error::CryptoError;
pub use hash::ContentHash;
pub use params::KdfParams;
pub use password::PasswordVerifier;
