//! Indexed container: items live in a hash map keyed by content hash plus
//! an owner-or-shared scope; the credential registry records which keys each
//! identity may resolve.
//!
//! Key layout:
//! - `hash.<owner>`: Private item, reachable only by `owner`
//! - `hash.shared`: Public item, reachable by every identity granted it
//!
//! At most one shared entry exists per content hash.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use sdc_crypto::hash::content_hash;
use sdc_crypto::{ContentHash, ItemCodec};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::container::{require, require_credentials, SecureDataContainer, Snapshot};
use crate::error::{StoreError, StoreResult};
use crate::item::{ItemId, SecureItem};
use crate::registry::CredentialRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyScope {
    Owner(String),
    Shared,
}

/// Composite storage key: content hash + scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexKey {
    hash: ContentHash,
    scope: KeyScope,
}

impl IndexKey {
    pub fn new(hash: ContentHash, scope: KeyScope) -> Self {
        Self { hash, scope }
    }

    pub fn owned(hash: ContentHash, owner: &str) -> Self {
        Self::new(hash, KeyScope::Owner(owner.to_string()))
    }

    pub fn shared(hash: ContentHash) -> Self {
        Self::new(hash, KeyScope::Shared)
    }

    pub fn is_shared(&self) -> bool {
        self.scope == KeyScope::Shared
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            KeyScope::Owner(owner) => write!(f, "{}.{owner}", self.hash),
            KeyScope::Shared => write!(f, "{}.shared", self.hash),
        }
    }
}

pub struct IndexedContainer<V> {
    registry: CredentialRegistry,
    storage: HashMap<IndexKey, SecureItem>,
    codec: ItemCodec,
    _value: PhantomData<fn() -> V>,
}

impl<V> IndexedContainer<V> {
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        Ok(Self {
            registry: CredentialRegistry::new(config.kdf)?,
            storage: HashMap::new(),
            codec: ItemCodec::new(config.kdf)?,
            _value: PhantomData,
        })
    }

    /// Entries stored across all owners.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// The owner's own entry wins over the shared one.
    fn resolve(&self, owner: &str, hash: ContentHash) -> StoreResult<IndexKey> {
        let owned = IndexKey::owned(hash, owner);
        if self.registry.has_access(owner, &owned) {
            return Ok(owned);
        }
        let shared = IndexKey::shared(hash);
        if self.registry.has_access(owner, &shared) {
            return Ok(shared);
        }
        Err(StoreError::NotFound)
    }

    fn entry(&self, key: &IndexKey) -> StoreResult<&SecureItem> {
        self.storage.get(key).ok_or_else(|| {
            warn!(key = %key, "granted key has no stored item");
            StoreError::NotFound
        })
    }
}

impl<V> SecureDataContainer<V> for IndexedContainer<V>
where
    V: Serialize + DeserializeOwned,
{
    fn create_user(&mut self, id: &str, password: &str) -> StoreResult<()> {
        self.registry.register(id, password)?;
        info!(user = %id, "user registered");
        Ok(())
    }

    fn size(&self, owner: &str, password: &str) -> StoreResult<usize> {
        require_credentials(owner, password)?;
        self.registry.authorize(owner, password)?;
        Ok(self.registry.access_count(owner))
    }

    /// Fails `AlreadyInCollection` if `owner` already holds the same content
    /// privately; a second insert would otherwise overwrite the first.
    fn put(&mut self, owner: &str, password: &str, value: &V) -> StoreResult<ItemId> {
        require_credentials(owner, password)?;
        self.registry.authorize(owner, password)?;
        let plaintext = ItemCodec::serialize(value)?;
        let hash = content_hash(&plaintext);
        let key = IndexKey::owned(hash, owner);
        if self.registry.has_access(owner, &key) || self.storage.contains_key(&key) {
            return Err(StoreError::AlreadyInCollection);
        }

        let item = SecureItem::new_private(&self.codec, owner, &plaintext, hash, password)?;
        let id = item.id();
        self.registry.grant(owner, key.clone());
        debug!(owner = %owner, item = %id, key = %key, "item stored");
        self.storage.insert(key, item);
        Ok(id)
    }

    fn get(&self, owner: &str, password: &str, value: &V) -> StoreResult<V> {
        require_credentials(owner, password)?;
        self.registry.authorize(owner, password)?;
        let key = self.resolve(owner, ItemCodec::hash(value)?)?;
        self.entry(&key)?.value(password)
    }

    fn get_by_id(&self, owner: &str, password: &str, id: ItemId) -> StoreResult<V> {
        require_credentials(owner, password)?;
        self.registry.authorize(owner, password)?;
        self.registry
            .keys_of(owner)
            .filter_map(|key| self.storage.get(key))
            .find(|item| item.id() == id)
            .ok_or(StoreError::NotFound)?
            .value(password)
    }

    fn remove(&mut self, owner: &str, password: &str, value: &V) -> StoreResult<V> {
        require_credentials(owner, password)?;
        self.registry.authorize(owner, password)?;
        let key = self.resolve(owner, ItemCodec::hash(value)?)?;
        let item = self.entry(&key)?;
        let removed = item.value(password)?;

        self.registry.revoke(owner, &key);
        if key.is_shared() {
            if let Some(item) = self.storage.get_mut(&key) {
                item.remove_owner(owner);
            }
            if self.registry.is_held(&key) {
                debug!(owner = %owner, key = %key, "access to shared item dropped");
                return Ok(removed);
            }
        }
        self.storage.remove(&key);
        debug!(owner = %owner, key = %key, "item deleted");
        Ok(removed)
    }

    /// Only shared items can be copied; the copy is a new Private item
    /// sealed under `owner`'s password.
    fn copy(&mut self, owner: &str, password: &str, value: &V) -> StoreResult<ItemId> {
        require_credentials(owner, password)?;
        self.registry.authorize(owner, password)?;
        let hash = ItemCodec::hash(value)?;
        let owned = IndexKey::owned(hash, owner);
        if self.registry.has_access(owner, &owned) {
            return Err(StoreError::AlreadyInCollection);
        }
        let shared = IndexKey::shared(hash);
        if !self.registry.has_access(owner, &shared) {
            return Err(StoreError::NotFound);
        }

        let plaintext = self.entry(&shared)?.plaintext(password)?;
        let item = SecureItem::new_private(&self.codec, owner, &plaintext, hash, password)?;
        let id = item.id();
        self.registry.grant(owner, owned.clone());
        debug!(owner = %owner, item = %id, key = %owned, "shared item copied");
        self.storage.insert(owned, item);
        Ok(id)
    }

    /// Re-keys `hash.<owner>` to `hash.shared`. The only fallible step,
    /// decryption, happens in place before anything is moved, so a failure
    /// leaves both the map and the registry untouched.
    fn share(&mut self, owner: &str, password: &str, other: &str, value: &V) -> StoreResult<()> {
        require_credentials(owner, password)?;
        require("other", other)?;
        self.registry.authorize(owner, password)?;
        if !self.registry.contains(other) {
            return Err(StoreError::UserNotFound(other.to_string()));
        }
        if other == owner {
            return Err(StoreError::SelfShare);
        }
        let hash = ItemCodec::hash(value)?;
        let owned = IndexKey::owned(hash, owner);
        let shared = IndexKey::shared(hash);
        if self.storage.contains_key(&shared) {
            return Err(StoreError::AlreadyShared);
        }
        if !self.registry.has_access(owner, &owned) {
            return Err(StoreError::NotFound);
        }

        let item = self.storage.get_mut(&owned).ok_or(StoreError::NotFound)?;
        item.make_public(password)?;
        item.add_owner(other);

        if let Some(item) = self.storage.remove(&owned) {
            info!(owner = %owner, other = %other, item = %item.id(), "item shared");
            self.storage.insert(shared.clone(), item);
        }
        self.registry.revoke(owner, &owned);
        self.registry.grant(owner, shared.clone());
        self.registry.grant(other, shared);
        Ok(())
    }

    fn iter(&self, owner: &str, password: &str) -> StoreResult<Snapshot<V>> {
        require_credentials(owner, password)?;
        self.registry.authorize(owner, password)?;
        let values = self
            .registry
            .keys_of(owner)
            .map(|key| self.entry(key).and_then(|item| item.value(password)))
            .collect::<StoreResult<Vec<V>>>()?;
        Ok(Snapshot::new(values))
    }
}
