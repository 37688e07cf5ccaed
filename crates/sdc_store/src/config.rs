use std::path::Path;

use sdc_crypto::KdfParams;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Cost settings for both password verification and item encryption.
    #[serde(default)]
    pub kdf: KdfParams,
}

impl StoreConfig {
    pub fn new(kdf: KdfParams) -> StoreResult<Self> {
        let config = Self { kdf };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> StoreResult<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| StoreError::Config(format!("parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            StoreError::Config(format!("read {}: {e}", path.as_ref().display()))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> StoreResult<()> {
        self.kdf.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_object_uses_defaults() {
        let config = StoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn below_floor_is_invalid_size() {
        let err = StoreConfig::from_json_str(r#"{"kdf": {"salt_len": 4}}"#).unwrap_err();
        assert!(matches!(err, StoreError::InvalidSize(_)));
    }

    #[test]
    fn above_ceiling_is_invalid_size() {
        for raw in [
            r#"{"kdf": {"memory_kib": 4294967295}}"#,
            r#"{"kdf": {"iterations": 4294967295}}"#,
            r#"{"kdf": {"key_len": 1048576}}"#,
            r#"{"kdf": {"salt_len": 1048576}}"#,
        ] {
            let err = StoreConfig::from_json_str(raw).unwrap_err();
            assert!(matches!(err, StoreError::InvalidSize(_)), "{raw}: {err}");
        }
    }

    #[test]
    fn oversized_config_never_reaches_a_container() {
        let config = StoreConfig {
            kdf: KdfParams {
                memory_kib: u32::MAX,
                ..KdfParams::minimum()
            },
        };
        assert!(matches!(
            crate::ScanContainer::<String>::new(&config),
            Err(StoreError::InvalidSize(_))
        ));
    }

    #[test]
    fn malformed_json_is_config_error() {
        let err = StoreConfig::from_json_str("{ kdf: ").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"kdf": {{"iterations": 1500, "memory_kib": 16}}}}"#).unwrap();
        let config = StoreConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.kdf.iterations, 1500);
        assert_eq!(config.kdf.memory_kib, 16);
        assert_eq!(config.kdf.key_len, KdfParams::default().key_len);
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = StoreConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }
}
