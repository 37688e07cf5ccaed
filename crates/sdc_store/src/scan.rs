//! Scan container: one append-only list of items, searched linearly by
//! content hash and owner membership on every call.

use std::marker::PhantomData;

use sdc_crypto::hash::content_hash;
use sdc_crypto::{ContentHash, ItemCodec};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::container::{require, require_credentials, SecureDataContainer, Snapshot};
use crate::error::{StoreError, StoreResult};
use crate::item::{ItemId, SecureItem};
use crate::registry::CredentialRegistry;

pub struct ScanContainer<V> {
    registry: CredentialRegistry,
    storage: Vec<SecureItem>,
    codec: ItemCodec,
    _value: PhantomData<fn() -> V>,
}

impl<V> ScanContainer<V> {
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        Ok(Self {
            registry: CredentialRegistry::new(config.kdf)?,
            storage: Vec::new(),
            codec: ItemCodec::new(config.kdf)?,
            _value: PhantomData,
        })
    }

    /// Items stored across all owners.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// First item with `hash` that `owner` belongs to.
    fn position(&self, owner: &str, hash: &ContentHash) -> StoreResult<usize> {
        self.storage
            .iter()
            .position(|item| item.hash() == hash && item.is_owned_by(owner))
            .ok_or(StoreError::NotFound)
    }
}

impl<V> SecureDataContainer<V> for ScanContainer<V>
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
        Ok(self
            .storage
            .iter()
            .filter(|item| item.is_owned_by(owner))
            .count())
    }

    fn put(&mut self, owner: &str, password: &str, value: &V) -> StoreResult<ItemId> {
        require_credentials(owner, password)?;
        self.registry.authorize(owner, password)?;
        let plaintext = ItemCodec::serialize(value)?;
        let hash = content_hash(&plaintext);
        let item = SecureItem::new_private(&self.codec, owner, &plaintext, hash, password)?;
        let id = item.id();
        self.storage.push(item);
        debug!(owner = %owner, item = %id, "item stored");
        Ok(id)
    }

    fn get(&self, owner: &str, password: &str, value: &V) -> StoreResult<V> {
        require_credentials(owner, password)?;
        self.registry.authorize(owner, password)?;
        let hash = ItemCodec::hash(value)?;
        let idx = self.position(owner, &hash)?;
        self.storage[idx].value(password)
    }

    fn get_by_id(&self, owner: &str, password: &str, id: ItemId) -> StoreResult<V> {
        require_credentials(owner, password)?;
        self.registry.authorize(owner, password)?;
        self.storage
            .iter()
            .find(|item| item.id() == id && item.is_owned_by(owner))
            .ok_or(StoreError::NotFound)?
            .value(password)
    }

    fn remove(&mut self, owner: &str, password: &str, value: &V) -> StoreResult<V> {
        require_credentials(owner, password)?;
        self.registry.authorize(owner, password)?;
        let hash = ItemCodec::hash(value)?;
        let idx = self.position(owner, &hash)?;

        let item = &mut self.storage[idx];
        let removed = item.value(password)?;
        if item.is_public() {
            item.remove_owner(owner);
            if item.owner_count() > 0 {
                debug!(owner = %owner, item = %item.id(), "access to shared item dropped");
                return Ok(removed);
            }
        }
        let item = self.storage.remove(idx);
        debug!(owner = %owner, item = %item.id(), "item deleted");
        Ok(removed)
    }

    fn copy(&mut self, owner: &str, password: &str, value: &V) -> StoreResult<ItemId> {
        require_credentials(owner, password)?;
        self.registry.authorize(owner, password)?;
        let hash = ItemCodec::hash(value)?;
        let idx = self.position(owner, &hash)?;

        let source = &self.storage[idx];
        let plaintext = source.plaintext(password)?;
        let duplicate = if source.is_public() {
            SecureItem::new_public(owner, plaintext.to_vec(), hash)
        } else {
            SecureItem::new_private(&self.codec, owner, &plaintext, hash, password)?
        };
        let id = duplicate.id();
        debug!(owner = %owner, source = %source.id(), item = %id, "item copied");
        self.storage.push(duplicate);
        Ok(id)
    }

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
        let idx = self.position(owner, &hash)?;

        let item = &mut self.storage[idx];
        item.make_public(password)?;
        item.add_owner(other);
        info!(owner = %owner, other = %other, item = %item.id(), "item shared");
        Ok(())
    }

    fn iter(&self, owner: &str, password: &str) -> StoreResult<Snapshot<V>> {
        require_credentials(owner, password)?;
        self.registry.authorize(owner, password)?;
        let values = self
            .storage
            .iter()
            .filter(|item| item.is_owned_by(owner))
            .map(|item| item.value(password))
            .collect::<StoreResult<Vec<V>>>()?;
        Ok(Snapshot::new(values))
    }
}
