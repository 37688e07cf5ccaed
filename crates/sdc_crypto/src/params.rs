//! Key-derivation cost parameters.
//!
//! Shared by the password verifier and the item codec. Every field has a
//! floor and a ceiling; `validate` rejects anything outside them with
//! `InvalidSize` before Argon2 gets to allocate.

use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

pub const MIN_ITERATIONS: u32 = 1000;
pub const MAX_ITERATIONS: u32 = 100_000;
/// Argon2 needs at least 8 KiB per lane; we always run a single lane.
pub const MIN_MEMORY_KIB: u32 = 8;
/// 1 GiB.
pub const MAX_MEMORY_KIB: u32 = 1024 * 1024;
/// 128 bits.
pub const MIN_KEY_LEN: usize = 16;
pub const MAX_KEY_LEN: usize = 64;
pub const MIN_SALT_LEN: usize = 16;
pub const MAX_SALT_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfParams {
    /// Argon2id time cost (passes over memory).
    pub iterations: u32,
    /// Argon2id memory cost in KiB.
    pub memory_kib: u32,
    /// Derived output length in bytes.
    pub key_len: usize,
    /// Random salt length in bytes.
    pub salt_len: usize,
}

impl KdfParams {
    pub fn new(
        iterations: u32,
        memory_kib: u32,
        key_len: usize,
        salt_len: usize,
    ) -> Result<Self, CryptoError> {
        let params = Self {
            iterations,
            memory_kib,
            key_len,
            salt_len,
        };
        params.validate()?;
        Ok(params)
    }

    /// The cheapest settings that still pass validation.
    pub const fn minimum() -> Self {
        Self {
            iterations: MIN_ITERATIONS,
            memory_kib: MIN_MEMORY_KIB,
            key_len: MIN_KEY_LEN,
            salt_len: MIN_SALT_LEN,
        }
    }

    pub fn validate(&self) -> Result<(), CryptoError> {
        check_range("iterations", self.iterations, MIN_ITERATIONS, MAX_ITERATIONS)?;
        check_range("memory_kib", self.memory_kib, MIN_MEMORY_KIB, MAX_MEMORY_KIB)?;
        check_range("key_len", self.key_len, MIN_KEY_LEN, MAX_KEY_LEN)?;
        check_range("salt_len", self.salt_len, MIN_SALT_LEN, MAX_SALT_LEN)
    }
}

fn check_range<T>(field: &str, value: T, min: T, max: T) -> Result<(), CryptoError>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        return Err(CryptoError::InvalidSize(format!(
            "{field} must be within {min}..={max}, got {value}"
        )));
    }
    Ok(())
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: 2000,
            memory_kib: 32,
            key_len: 64,
            salt_len: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_minimum_are_valid() {
        assert!(KdfParams::default().validate().is_ok());
        assert!(KdfParams::minimum().validate().is_ok());
    }

    #[test]
    fn rejects_values_below_floor() {
        assert!(matches!(
            KdfParams::new(999, 8, 16, 16),
            Err(CryptoError::InvalidSize(_))
        ));
        assert!(matches!(
            KdfParams::new(1000, 4, 16, 16),
            Err(CryptoError::InvalidSize(_))
        ));
        assert!(matches!(
            KdfParams::new(1000, 8, 15, 16),
            Err(CryptoError::InvalidSize(_))
        ));
        assert!(matches!(
            KdfParams::new(1000, 8, 16, 8),
            Err(CryptoError::InvalidSize(_))
        ));
    }

    #[test]
    fn rejects_values_above_ceiling() {
        let too_big = [
            KdfParams { iterations: MAX_ITERATIONS + 1, ..KdfParams::minimum() },
            KdfParams { memory_kib: u32::MAX, ..KdfParams::minimum() },
            KdfParams { key_len: MAX_KEY_LEN + 1, ..KdfParams::minimum() },
            KdfParams { salt_len: usize::MAX, ..KdfParams::minimum() },
        ];
        for params in too_big {
            assert!(
                matches!(params.validate(), Err(CryptoError::InvalidSize(_))),
                "{params:?}"
            );
        }
    }

    #[test]
    fn ceilings_are_inclusive() {
        let params = KdfParams::new(MAX_ITERATIONS, MAX_MEMORY_KIB, MAX_KEY_LEN, MAX_SALT_LEN);
        assert!(params.is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let params: KdfParams = serde_json::from_str(r#"{"iterations": 4000}"#).unwrap();
        assert_eq!(params.iterations, 4000);
        assert_eq!(params.salt_len, KdfParams::default().salt_len);
    }
}
