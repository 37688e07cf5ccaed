//! The container contract shared by both storage strategies.

use crate::error::{StoreError, StoreResult};
use crate::item::ItemId;

/// Authenticated, encrypted-at-rest collection of values of type `V`.
///
/// Every method first rejects empty required arguments (`EmptyInput`), then
/// authenticates `(owner, password)` (`InvalidAuthentication`). Neither
/// failure mutates anything. Items are located by the content hash of the
/// supplied `value`; callers always receive a decrypted copy.
pub trait SecureDataContainer<V> {
    /// Register a new identity. Fails `UsernameTaken` if it exists.
    fn create_user(&mut self, id: &str, password: &str) -> StoreResult<()>;

    /// Number of items `owner` can currently access.
    fn size(&self, owner: &str, password: &str) -> StoreResult<usize>;

    /// Store `value` as a new Private item owned solely by `owner`.
    fn put(&mut self, owner: &str, password: &str, value: &V) -> StoreResult<ItemId>;

    /// Decrypted copy of the accessible item matching `value`. `NotFound`
    /// if `owner` cannot reach such an item.
    fn get(&self, owner: &str, password: &str, value: &V) -> StoreResult<V>;

    /// Like `get`, but by the handle returned from `put`/`copy`.
    fn get_by_id(&self, owner: &str, password: &str, id: ItemId) -> StoreResult<V>;

    /// Drop `owner`'s access to the matching item and return its value.
    /// Private items are deleted; Public items are deleted only once no
    /// identity can reach them any more.
    fn remove(&mut self, owner: &str, password: &str, value: &V) -> StoreResult<V>;

    /// Create an independent item from one `owner` can access.
    fn copy(&mut self, owner: &str, password: &str, value: &V) -> StoreResult<ItemId>;

    /// Disclose `owner`'s item to `other`. The item becomes Public for good.
    fn share(&mut self, owner: &str, password: &str, other: &str, value: &V) -> StoreResult<()>;

    /// Snapshot of every value `owner` can access, decrypted at call time.
    fn iter(&self, owner: &str, password: &str) -> StoreResult<Snapshot<V>>;
}

/// Read-only, single-pass view over values materialized when it was created.
/// Later container mutations are not reflected.
#[derive(Debug)]
pub struct Snapshot<V> {
    values: std::vec::IntoIter<V>,
}

impl<V> Snapshot<V> {
    pub(crate) fn new(values: Vec<V>) -> Self {
        Self {
            values: values.into_iter(),
        }
    }
}

impl<V> Iterator for Snapshot<V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        self.values.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.values.size_hint()
    }
}

impl<V> ExactSizeIterator for Snapshot<V> {}

pub(crate) fn require(field: &'static str, value: &str) -> StoreResult<()> {
    if value.is_empty() {
        Err(StoreError::EmptyInput(field))
    } else {
        Ok(())
    }
}

pub(crate) fn require_credentials(owner: &str, password: &str) -> StoreResult<()> {
    require("owner", owner)?;
    require("password", password)
}
