//! One stored value, its owners, and its encryption state.

use std::collections::BTreeSet;
use std::fmt;

use sdc_crypto::{ContentHash, ItemCodec, SealedValue};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::StoreResult;

/// Opaque handle returned by `put`/`copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(Uuid);

impl ItemId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Private items carry ciphertext and codec metadata; Public items carry only
/// the serialized plaintext. There is no transition from Public back to
/// Private.
#[derive(Clone)]
pub enum ItemState {
    Private(SealedValue),
    Public { plaintext: Vec<u8> },
}

/// Payloads are reported by length only.
impl fmt::Debug for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemState::Private(sealed) => f
                .debug_struct("Private")
                .field("blob_len", &sealed.blob.len())
                .finish_non_exhaustive(),
            ItemState::Public { plaintext } => f
                .debug_struct("Public")
                .field("plaintext_len", &plaintext.len())
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SecureItem {
    id: ItemId,
    hash: ContentHash,
    owners: BTreeSet<String>,
    state: ItemState,
}

impl SecureItem {
    /// New Private item sealed under `password`. The content hash is bound
    /// into the ciphertext as associated data.
    pub(crate) fn new_private(
        codec: &ItemCodec,
        owner: &str,
        plaintext: &[u8],
        hash: ContentHash,
        password: &str,
    ) -> StoreResult<Self> {
        let sealed = codec.encrypt(plaintext, hash.as_bytes(), password)?;
        Ok(Self {
            id: ItemId::generate(),
            hash,
            owners: BTreeSet::from([owner.to_string()]),
            state: ItemState::Private(sealed),
        })
    }

    pub(crate) fn new_public(owner: &str, plaintext: Vec<u8>, hash: ContentHash) -> Self {
        Self {
            id: ItemId::generate(),
            hash,
            owners: BTreeSet::from([owner.to_string()]),
            state: ItemState::Public { plaintext },
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    pub fn state(&self) -> &ItemState {
        &self.state
    }

    pub fn is_public(&self) -> bool {
        matches!(self.state, ItemState::Public { .. })
    }

    pub fn owners(&self) -> impl Iterator<Item = &str> {
        self.owners.iter().map(String::as_str)
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    pub fn is_owned_by(&self, id: &str) -> bool {
        self.owners.contains(id)
    }

    pub(crate) fn add_owner(&mut self, owner: &str) {
        self.owners.insert(owner.to_string());
    }

    pub(crate) fn remove_owner(&mut self, owner: &str) -> bool {
        self.owners.remove(owner)
    }

    /// Serialized plaintext. Private items are decrypted with `password`;
    /// Public items ignore it.
    pub(crate) fn plaintext(&self, password: &str) -> StoreResult<Zeroizing<Vec<u8>>> {
        match &self.state {
            ItemState::Private(sealed) => {
                Ok(ItemCodec::decrypt(sealed, self.hash.as_bytes(), password)?)
            }
            ItemState::Public { plaintext } => Ok(Zeroizing::new(plaintext.clone())),
        }
    }

    pub(crate) fn value<V: DeserializeOwned>(&self, password: &str) -> StoreResult<V> {
        let plaintext = self.plaintext(password)?;
        Ok(ItemCodec::deserialize(&plaintext)?)
    }

    /// Irreversibly drop encryption. Decryption happens before the state is
    /// touched, so a failure leaves the item Private and unchanged. Public
    /// items are left as they are.
    pub(crate) fn make_public(&mut self, password: &str) -> StoreResult<()> {
        if let ItemState::Private(sealed) = &self.state {
            let plaintext = ItemCodec::decrypt(sealed, self.hash.as_bytes(), password)?;
            self.state = ItemState::Public {
                plaintext: plaintext.to_vec(),
            };
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn corrupt_ciphertext(&mut self) {
        if let ItemState::Private(sealed) = &mut self.state {
            sealed.blob[0] ^= 0xff;
        }
    }
}
