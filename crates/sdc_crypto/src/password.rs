//! Salted password verifier.
//!
//! Stores only the Argon2id output, the salt and the parameters that produced
//! it. Verification re-derives with the stored salt and compares in constant
//! time.

use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::ZeroizeOnDrop;

use crate::error::CryptoError;
use crate::kdf::{derive_key, generate_salt};
use crate::params::KdfParams;

/// Hash and salt are wiped on drop.
#[derive(Clone, ZeroizeOnDrop)]
pub struct PasswordVerifier {
    hash: Vec<u8>,
    salt: Vec<u8>,
    #[zeroize(skip)]
    params: KdfParams,
}

impl PasswordVerifier {
    /// Hash `password` under a fresh random salt.
    pub fn create(password: &str, params: KdfParams) -> Result<Self, CryptoError> {
        if password.is_empty() {
            return Err(CryptoError::EmptyInput("password"));
        }
        params.validate()?;
        let salt = generate_salt(params.salt_len);
        let hash = derive_key(password.as_bytes(), &salt, &params, params.key_len)?;
        Ok(Self {
            hash: hash.to_vec(),
            salt,
            params,
        })
    }

    /// `true` iff `password` reproduces the stored hash. A mismatch, an empty
    /// password or a derivation failure all yield `false`.
    pub fn verify(&self, password: &str) -> bool {
        if password.is_empty() {
            return false;
        }
        match derive_key(password.as_bytes(), &self.salt, &self.params, self.params.key_len) {
            Ok(candidate) => candidate.as_slice().ct_eq(self.hash.as_slice()).into(),
            Err(_) => false,
        }
    }

    pub(crate) fn salt(&self) -> &[u8] {
        &self.salt
    }
}

impl fmt::Debug for PasswordVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordVerifier")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_correct_password() {
        let verifier = PasswordVerifier::create("abc", KdfParams::minimum()).unwrap();
        assert!(verifier.verify("abc"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let verifier = PasswordVerifier::create("abc", KdfParams::minimum()).unwrap();
        assert!(!verifier.verify("abd"));
        assert!(!verifier.verify(""));
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(matches!(
            PasswordVerifier::create("", KdfParams::minimum()),
            Err(CryptoError::EmptyInput("password"))
        ));
    }

    #[test]
    fn weak_params_are_rejected() {
        let weak = KdfParams {
            iterations: 10,
            ..KdfParams::minimum()
        };
        assert!(matches!(
            PasswordVerifier::create("abc", weak),
            Err(CryptoError::InvalidSize(_))
        ));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = PasswordVerifier::create("abc", KdfParams::minimum()).unwrap();
        let b = PasswordVerifier::create("abc", KdfParams::minimum()).unwrap();
        assert_ne!(a.salt(), b.salt());
        assert_eq!(a.salt().len(), KdfParams::minimum().salt_len);
    }

    #[test]
    fn secret_material_is_wiped_on_drop() {
        fn wiped_on_drop<T: ZeroizeOnDrop>() {}
        wiped_on_drop::<PasswordVerifier>();
    }

    #[test]
    fn debug_output_hides_hash() {
        let verifier = PasswordVerifier::create("abc", KdfParams::minimum()).unwrap();
        let rendered = format!("{verifier:?}");
        assert!(!rendered.contains("hash"));
    }
}
