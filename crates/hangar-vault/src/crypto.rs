// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM primitives. Each seal draws a fresh 96-bit nonce from the system CSPRNG.

use hangar_core::HangarError;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};

pub const KEY_LEN: usize = 32;

fn cipher(key: &[u8; KEY_LEN]) -> Result<LessSafeKey, HangarError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| HangarError::Vault("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Returns `nonce || ciphertext || tag`.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>, HangarError> {
    let key = cipher(key)?;
    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| HangarError::Vault("failed to generate nonce".to_string()))?;

    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(Nonce::assume_unique_for_key(nonce_bytes), Aad::empty(), &mut in_out)
        .map_err(|_| HangarError::Vault("encryption failed".to_string()))?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + in_out.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&in_out);
    Ok(sealed)
}

/// Inverse of [`seal`]. Fails on a wrong key or tampered input.
pub fn open(key: &[u8; KEY_LEN], sealed: &[u8]) -> Result<Vec<u8>, HangarError> {
    if sealed.len() < NONCE_LEN {
        return Err(HangarError::Vault("sealed value is too short".to_string()));
    }
    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
    let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
        .map_err(|_| HangarError::Vault("invalid nonce".to_string()))?;

    let key = cipher(key)?;
    let mut in_out = ciphertext.to_vec();
    let plaintext = key
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| HangarError::Vault("decryption failed: wrong key or corrupted data".to_string()))?;
    Ok(plaintext.to_vec())
}

pub fn generate_key() -> Result<[u8; KEY_LEN], HangarError> {
    let mut key = [0u8; KEY_LEN];
    SystemRandom::new()
        .fill(&mut key)
        .map_err(|_| HangarError::Vault("failed to generate key".to_string()))?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonces_differ_between_seals() {
        let key = generate_key().unwrap();
        let a = seal(&key, b"same input").unwrap();
        let b = seal(&key, b"same input").unwrap();
        assert_ne!(a[..NONCE_LEN], b[..NONCE_LEN]);
        assert_eq!(open(&key, &a).unwrap(), b"same input");
    }

    #[test]
    fn wrong_key_fails() {
        let sealed = seal(&generate_key().unwrap(), b"secret").unwrap();
        assert!(open(&generate_key().unwrap(), &sealed).is_err());
    }

    #[test]
    fn tampering_is_detected() {
        let key = generate_key().unwrap();
        let mut sealed = seal(&key, b"secret").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;
        assert!(matches!(open(&key, &sealed), Err(HangarError::Vault(_))));
    }

    #[test]
    fn short_input_is_rejected() {
        let key = generate_key().unwrap();
        assert!(open(&key, &[0u8; 4]).is_err());
    }
}
