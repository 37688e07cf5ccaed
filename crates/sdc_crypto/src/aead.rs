//! Authenticated Encryption with Associated Data
//!
//! Uses XChaCha20-Poly1305 (192-bit nonce).
//! Key size: 32 bytes.  Nonce: 24 bytes (random).  Tag: 16 bytes.
//!
//! Unlike a self-describing wire format, the nonce is returned to the caller
//! and stored in the item's codec metadata next to the KDF salt.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::CryptoError;

pub const KEY_LEN: usize = 32;
pub const NONCE_LEN: usize = 24;

/// Encrypt `plaintext`; `aad` is authenticated but not encrypted.
pub fn encrypt(
    key: &[u8],
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = XChaCha20Poly1305::new_from_slice(key).map_err(|_| CryptoError::Encryption)?;
    cipher
        .encrypt(XNonce::from_slice(nonce), Payload { msg: plaintext, aad })
        .map_err(|_| CryptoError::Encryption)
}

/// Decrypt and authenticate. Any mismatch (key, nonce, aad, ciphertext)
/// surfaces as `CryptoError::Decryption`.
pub fn decrypt(
    key: &[u8],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let cipher = XChaCha20Poly1305::new_from_slice(key).map_err(|_| CryptoError::Decryption)?;
    let plaintext = cipher
        .decrypt(XNonce::from_slice(nonce), Payload { msg: ciphertext, aad })
        .map_err(|_| CryptoError::Decryption)?;
    Ok(Zeroizing::new(plaintext))
}

pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    nonce
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; KEY_LEN] = [7u8; KEY_LEN];

    #[test]
    fn encrypt_then_decrypt() {
        let nonce = generate_nonce();
        let ct = encrypt(&KEY, &nonce, b"secret", b"ctx").unwrap();
        assert_ne!(ct.as_slice(), b"secret");
        let pt = decrypt(&KEY, &nonce, &ct, b"ctx").unwrap();
        assert_eq!(pt.as_slice(), b"secret");
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let nonce = generate_nonce();
        let mut ct = encrypt(&KEY, &nonce, b"secret", b"ctx").unwrap();
        ct[0] ^= 0x01;
        assert!(matches!(
            decrypt(&KEY, &nonce, &ct, b"ctx"),
            Err(CryptoError::Decryption)
        ));
    }

    #[test]
    fn wrong_aad_fails() {
        let nonce = generate_nonce();
        let ct = encrypt(&KEY, &nonce, b"secret", b"ctx").unwrap();
        assert!(decrypt(&KEY, &nonce, &ct, b"other").is_err());
    }

    #[test]
    fn wrong_key_length_is_rejected() {
        let nonce = generate_nonce();
        assert!(matches!(
            encrypt(&[0u8; 16], &nonce, b"secret", b""),
            Err(CryptoError::Encryption)
        ));
    }
}
