//! Credential registry: identity → password verifier, plus the set of index
//! keys each identity may resolve (used only by the indexed container).

use std::collections::{HashMap, HashSet};

use sdc_crypto::{KdfParams, PasswordVerifier};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::indexed::IndexKey;

/// Why a credential check failed. Logged, never returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthFailure {
    UnknownIdentity,
    WrongPassword,
}

#[derive(Debug)]
struct Credential {
    verifier: PasswordVerifier,
    keys: HashSet<IndexKey>,
}

const DECOY_PASSWORD: &str = "sdc-decoy-credential";

#[derive(Debug)]
pub struct CredentialRegistry {
    params: KdfParams,
    users: HashMap<String, Credential>,
    /// Checked against for unknown identities so that both failure paths
    /// run one full key derivation.
    decoy: PasswordVerifier,
    #[cfg(test)]
    verifications: std::cell::Cell<usize>,
}

impl CredentialRegistry {
    pub fn new(params: KdfParams) -> StoreResult<Self> {
        Ok(Self {
            params,
            users: HashMap::new(),
            decoy: PasswordVerifier::create(DECOY_PASSWORD, params)?,
            #[cfg(test)]
            verifications: std::cell::Cell::new(0),
        })
    }

    pub fn register(&mut self, id: &str, password: &str) -> StoreResult<()> {
        if id.is_empty() {
            return Err(StoreError::EmptyInput("id"));
        }
        if password.is_empty() {
            return Err(StoreError::EmptyInput("password"));
        }
        if self.users.contains_key(id) {
            return Err(StoreError::UsernameTaken(id.to_string()));
        }
        let verifier = PasswordVerifier::create(password, self.params)?;
        self.users.insert(
            id.to_string(),
            Credential {
                verifier,
                keys: HashSet::new(),
            },
        );
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.users.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn authenticate(&self, id: &str, password: &str) -> bool {
        self.check(id, password).is_ok()
    }

    pub(crate) fn check(&self, id: &str, password: &str) -> Result<(), AuthFailure> {
        let Some(credential) = self.users.get(id) else {
            self.verify(&self.decoy, password);
            return Err(AuthFailure::UnknownIdentity);
        };
        if self.verify(&credential.verifier, password) {
            Ok(())
        } else {
            Err(AuthFailure::WrongPassword)
        }
    }

    fn verify(&self, verifier: &PasswordVerifier, password: &str) -> bool {
        #[cfg(test)]
        self.verifications.set(self.verifications.get() + 1);
        verifier.verify(password)
    }

    /// Credential check for container operations: the specific failure is
    /// logged at debug level, the caller only sees `InvalidAuthentication`.
    pub(crate) fn authorize(&self, id: &str, password: &str) -> StoreResult<()> {
        self.check(id, password).map_err(|reason| {
            debug!(user = %id, ?reason, "authentication rejected");
            StoreError::InvalidAuthentication
        })
    }

    /// Returns `false` if `id` is unknown or already held `key`.
    pub fn grant(&mut self, id: &str, key: IndexKey) -> bool {
        self.users
            .get_mut(id)
            .map(|c| c.keys.insert(key))
            .unwrap_or(false)
    }

    pub fn revoke(&mut self, id: &str, key: &IndexKey) -> bool {
        self.users
            .get_mut(id)
            .map(|c| c.keys.remove(key))
            .unwrap_or(false)
    }

    pub fn has_access(&self, id: &str, key: &IndexKey) -> bool {
        self.users
            .get(id)
            .map(|c| c.keys.contains(key))
            .unwrap_or(false)
    }

    pub fn keys_of<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a IndexKey> + 'a {
        self.users.get(id).into_iter().flat_map(|c| c.keys.iter())
    }

    pub fn access_count(&self, id: &str) -> usize {
        self.users.get(id).map(|c| c.keys.len()).unwrap_or(0)
    }

    /// Identities currently granted `key`.
    pub fn holders<'a>(&'a self, key: &'a IndexKey) -> impl Iterator<Item = &'a str> + 'a {
        self.users
            .iter()
            .filter(move |(_, c)| c.keys.contains(key))
            .map(|(id, _)| id.as_str())
    }

    /// Whether any identity still holds `key`.
    pub fn is_held(&self, key: &IndexKey) -> bool {
        self.holders(key).next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexed::KeyScope;
    use sdc_crypto::ItemCodec;

    fn registry() -> CredentialRegistry {
        let mut registry = CredentialRegistry::new(KdfParams::minimum()).unwrap();
        registry.register("alice", "abc").unwrap();
        registry.register("bob", "123").unwrap();
        registry
    }

    fn key(scope: KeyScope) -> IndexKey {
        IndexKey::new(ItemCodec::hash(&"X").unwrap(), scope)
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = registry();
        assert!(matches!(
            registry.register("alice", "other"),
            Err(StoreError::UsernameTaken(id)) if id == "alice"
        ));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn empty_fields_are_rejected() {
        let mut registry = registry();
        assert!(matches!(registry.register("", "pw"), Err(StoreError::EmptyInput("id"))));
        assert!(matches!(
            registry.register("carol", ""),
            Err(StoreError::EmptyInput("password"))
        ));
    }

    #[test]
    fn check_distinguishes_failures() {
        let registry = registry();
        assert_eq!(registry.check("alice", "abc"), Ok(()));
        assert_eq!(registry.check("alice", "123"), Err(AuthFailure::WrongPassword));
        assert_eq!(registry.check("mallory", "abc"), Err(AuthFailure::UnknownIdentity));
    }

    #[test]
    fn unknown_identity_pays_for_a_derivation() {
        let registry = registry();
        assert_eq!(registry.verifications.get(), 0);
        assert_eq!(
            registry.check("mallory", "abc"),
            Err(AuthFailure::UnknownIdentity)
        );
        assert_eq!(registry.verifications.get(), 1);
        assert_eq!(registry.check("alice", "wrong"), Err(AuthFailure::WrongPassword));
        assert_eq!(registry.verifications.get(), 2);
    }

    #[test]
    fn decoy_password_does_not_authenticate_unknown_identity() {
        let registry = registry();
        assert!(!registry.authenticate("mallory", DECOY_PASSWORD));
    }

    #[test]
    fn authorize_hides_the_reason() {
        let registry = registry();
        assert!(matches!(
            registry.authorize("alice", "123"),
            Err(StoreError::InvalidAuthentication)
        ));
        assert!(matches!(
            registry.authorize("mallory", "abc"),
            Err(StoreError::InvalidAuthentication)
        ));
        assert!(registry.authenticate("bob", "123"));
    }

    #[test]
    fn grant_revoke_bookkeeping() {
        let mut registry = registry();
        let shared = key(KeyScope::Shared);
        assert!(registry.grant("alice", shared.clone()));
        assert!(!registry.grant("alice", shared.clone()));
        assert!(!registry.grant("mallory", shared.clone()));
        assert!(registry.has_access("alice", &shared));
        assert!(!registry.has_access("bob", &shared));
        assert_eq!(registry.access_count("alice"), 1);
        assert_eq!(registry.keys_of("alice").count(), 1);
        assert!(registry.is_held(&shared));
        assert_eq!(registry.holders(&shared).collect::<Vec<_>>(), vec!["alice"]);

        assert!(registry.revoke("alice", &shared));
        assert!(!registry.revoke("alice", &shared));
        assert!(!registry.is_held(&shared));
        assert_eq!(registry.keys_of("nobody").count(), 0);
    }
}
