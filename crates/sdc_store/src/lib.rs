//! sdc_store: authenticated, encrypted-at-rest item containers
//!
//! Every item belongs to one or more registered identities. Every operation
//! re-authenticates the caller, locates the item by the content hash of a
//! caller-supplied value, and hands back a decrypted copy.
//!
//! # Encryption strategy
//! - A freshly `put` item is Private: sealed with XChaCha20-Poly1305 under a
//!   key derived (Argon2id) from the owner's password and a per-item salt.
//! - Sharing an item makes it Public for good: it is decrypted once, the
//!   key material is dropped, and the plaintext is readable by every owner.
//!   No secret exists that all current and future owners hold, so there is
//!   no way back.
//!
//! # Variants
//! Two implementations of [`SecureDataContainer`]:
//! - [`ScanContainer`]: one append-only list, linear scan per call.
//! - [`IndexedContainer`]: hash map keyed by content hash + owner-or-shared,
//!   with per-identity key sets in the credential registry.

pub mod config;
pub mod container;
pub mod error;
pub mod indexed;
pub mod item;
pub mod registry;
pub mod scan;

pub use config::StoreConfig;
pub use container::{SecureDataContainer, Snapshot};
pub use error::{StoreError, StoreResult};
pub use indexed::{IndexKey, IndexedContainer, KeyScope};
pub use item::{ItemId, ItemState, SecureItem};
pub use registry::CredentialRegistry;
pub use scan::ScanContainer;
