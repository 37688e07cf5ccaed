//! Per-item encryption codec.
//!
//! Values are serialized with `serde_json`, hashed for identity, and sealed
//! under a key derived from the owner's password and a salt unique to that
//! seal. Everything needed to re-derive the key (except the password) travels
//! in `CodecMetadata`.
//!
//! Two values that serialize to the same bytes are the same item as far as
//! the container is concerned. Types whose serialization is not stable
//! (e.g. `HashMap` with randomized iteration order) should not be stored.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use zeroize::Zeroizing;

use crate::aead::{self, NONCE_LEN};
use crate::error::CryptoError;
use crate::hash::{content_hash, ContentHash};
use crate::kdf::{derive_key, generate_salt};
use crate::params::KdfParams;

/// Everything except the password needed to decrypt a sealed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecMetadata {
    pub salt: Vec<u8>,
    pub nonce: [u8; NONCE_LEN],
    pub iterations: u32,
    pub memory_kib: u32,
    pub key_len: usize,
}

impl CodecMetadata {
    fn kdf_params(&self) -> KdfParams {
        KdfParams {
            iterations: self.iterations,
            memory_kib: self.memory_kib,
            key_len: self.key_len,
            salt_len: self.salt.len(),
        }
    }
}

/// Ciphertext plus its metadata.
#[derive(Clone)]
pub struct SealedValue {
    pub blob: Vec<u8>,
    pub metadata: CodecMetadata,
}

impl fmt::Debug for SealedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedValue")
            .field("blob_len", &self.blob.len())
            .field("metadata", &self.metadata)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ItemCodec {
    params: KdfParams,
}

impl ItemCodec {
    /// The AEAD key length is fixed by the cipher; only iterations, memory
    /// and salt length are taken from `params`.
    pub fn new(params: KdfParams) -> Result<Self, CryptoError> {
        params.validate()?;
        Ok(Self {
            params: KdfParams {
                key_len: aead::KEY_LEN,
                ..params
            },
        })
    }

    pub fn serialize<V: Serialize>(value: &V) -> Result<Vec<u8>, CryptoError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub fn deserialize<V: DeserializeOwned>(bytes: &[u8]) -> Result<V, CryptoError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Content hash of `value`'s serialized form.
    pub fn hash<V: Serialize>(value: &V) -> Result<ContentHash, CryptoError> {
        Ok(content_hash(&Self::serialize(value)?))
    }

    /// Seal `plaintext` under `password`. Each call draws a new salt and a
    /// new nonce. `aad` binds the ciphertext to its context.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        aad: &[u8],
        password: &str,
    ) -> Result<SealedValue, CryptoError> {
        if password.is_empty() {
            return Err(CryptoError::EmptyInput("password"));
        }
        let salt = generate_salt(self.params.salt_len);
        let key = derive_key(password.as_bytes(), &salt, &self.params, self.params.key_len)?;
        let nonce = aead::generate_nonce();
        let blob = aead::encrypt(&key, &nonce, plaintext, aad)?;
        Ok(SealedValue {
            blob,
            metadata: CodecMetadata {
                salt,
                nonce,
                iterations: self.params.iterations,
                memory_kib: self.params.memory_kib,
                key_len: self.params.key_len,
            },
        })
    }

    /// Re-derive the key from the stored metadata and open the blob.
    /// Wrong password, wrong `aad` and corrupted data all yield `Decryption`.
    pub fn decrypt(
        sealed: &SealedValue,
        aad: &[u8],
        password: &str,
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        if password.is_empty() {
            return Err(CryptoError::EmptyInput("password"));
        }
        let meta = &sealed.metadata;
        let key = derive_key(password.as_bytes(), &meta.salt, &meta.kdf_params(), meta.key_len)?;
        aead::decrypt(&key, &meta.nonce, &sealed.blob, aad)
    }
}
