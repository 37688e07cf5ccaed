//! Key derivation functions
//!
//! `derive_key`: Argon2id over a password and salt, with cost taken from
//!   `KdfParams`. Used both for password verification hashes and for the
//!   per-item encryption keys.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::params::{KdfParams, MAX_KEY_LEN, MIN_KEY_LEN};

/// Derive `out_len` bytes from `password` + `salt`. Output is zeroized on drop.
/// `params` and `out_len` are bounds-checked before anything is allocated.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    params: &KdfParams,
    out_len: usize,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    params.validate()?;
    if !(MIN_KEY_LEN..=MAX_KEY_LEN).contains(&out_len) {
        return Err(CryptoError::InvalidSize(format!(
            "output length must be within {MIN_KEY_LEN}..={MAX_KEY_LEN}, got {out_len}"
        )));
    }
    let argon_params = Params::new(params.memory_kib, params.iterations, 1, Some(out_len))
        .map_err(|e| CryptoError::KeyDerivation(format!("argon2 params: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);
    let mut output = Zeroizing::new(vec![0u8; out_len]);
    argon2
        .hash_password_into(password, salt, &mut output)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(output)
}

/// Generate a fresh random salt of `len` bytes.
pub fn generate_salt(len: usize) -> Vec<u8> {
    let mut salt = vec![0u8; len];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic_per_salt() {
        let params = KdfParams::minimum();
        let salt = generate_salt(params.salt_len);
        let a = derive_key(b"hunter2", &salt, &params, 32).unwrap();
        let b = derive_key(b"hunter2", &salt, &params, 32).unwrap();
        assert_eq!(*a, *b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn different_salt_gives_different_key() {
        let params = KdfParams::minimum();
        let a = derive_key(b"hunter2", &generate_salt(16), &params, 32).unwrap();
        let b = derive_key(b"hunter2", &generate_salt(16), &params, 32).unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn oversized_requests_fail_without_allocating() {
        let salt = generate_salt(16);
        assert!(matches!(
            derive_key(b"hunter2", &salt, &KdfParams::minimum(), usize::MAX),
            Err(CryptoError::InvalidSize(_))
        ));
        let huge = KdfParams {
            memory_kib: u32::MAX,
            ..KdfParams::minimum()
        };
        assert!(matches!(
            derive_key(b"hunter2", &salt, &huge, 32),
            Err(CryptoError::InvalidSize(_))
        ));
    }

    #[test]
    fn salts_are_fresh() {
        assert_ne!(generate_salt(16), generate_salt(16));
    }
}
