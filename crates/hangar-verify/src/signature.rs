// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Detached ed25519 signatures over the checksum map.
//!
//! Verification always recomputes the checksums from the files on disk, so a
//! tampered file or a stale `checksums.json` both end up `untrusted`.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use hangar_core::{HangarError, SignatureStatus};

use crate::checksums::{CHECKSUMS_FILE, Checksums, SIGNATURE_FILE, compute_checksums};

/// Classify a plugin directory against the trusted key set.
pub fn verify_signature(
    plugin_dir: &Path,
    trusted_keys: &[VerifyingKey],
) -> Result<SignatureStatus, HangarError> {
    let Some(sig_path) = find_signature_file(plugin_dir)? else {
        return Ok(SignatureStatus::Unsigned);
    };
    let raw = std::fs::read(&sig_path)
        .map_err(|e| HangarError::Trust(format!("read {}: {e}", sig_path.display())))?;
    let Some(signature) = parse_signature(&raw) else {
        tracing::debug!(dir = %plugin_dir.display(), "signature artifact is not a valid ed25519 signature");
        return Ok(SignatureStatus::Untrusted);
    };

    let payload = compute_checksums(plugin_dir)?.to_bytes()?;
    let official = trusted_keys
        .iter()
        .any(|key| key.verify_strict(&payload, &signature).is_ok());
    Ok(if official {
        SignatureStatus::Official
    } else {
        SignatureStatus::Untrusted
    })
}

/// Write `checksums.json` and `signature.sig` for a plugin directory.
pub fn sign_plugin_dir(plugin_dir: &Path, key: &SigningKey) -> Result<Checksums, HangarError> {
    let checksums = compute_checksums(plugin_dir)?;
    let payload = checksums.to_bytes()?;
    let signature = key.sign(&payload);

    let write = |name: &str, bytes: &[u8]| {
        let path = plugin_dir.join(name);
        std::fs::write(&path, bytes)
            .map_err(|e| HangarError::Trust(format!("write {}: {e}", path.display())))
    };
    write(CHECKSUMS_FILE, &payload)?;
    write(SIGNATURE_FILE, &signature.to_bytes())?;
    Ok(checksums)
}

/// Locate the signature artifact at the top of the plugin directory, ignoring case.
fn find_signature_file(plugin_dir: &Path) -> Result<Option<PathBuf>, HangarError> {
    let entries = std::fs::read_dir(plugin_dir)
        .map_err(|e| HangarError::Trust(format!("read {}: {e}", plugin_dir.display())))?;
    for entry in entries.flatten() {
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file && entry.file_name().to_string_lossy().eq_ignore_ascii_case(SIGNATURE_FILE) {
            return Ok(Some(entry.path()));
        }
    }
    Ok(None)
}

/// Raw 64 bytes, or the same encoded as base64 text.
fn parse_signature(raw: &[u8]) -> Option<Signature> {
    if let Ok(bytes) = <[u8; 64]>::try_from(raw) {
        return Some(Signature::from_bytes(&bytes));
    }
    let text = std::str::from_utf8(raw).ok()?;
    let decoded = STANDARD.decode(text.trim()).ok()?;
    let bytes = <[u8; 64]>::try_from(decoded.as_slice()).ok()?;
    Some(Signature::from_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::SigningKeypair;

    fn plugin_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("manifest.json"), br#"{"plugin_id":"demo"}"#).unwrap();
        std::fs::create_dir_all(dir.path().join("bin")).unwrap();
        std::fs::write(dir.path().join("bin/demo"), b"\x7fELF").unwrap();
        dir
    }

    #[test]
    fn no_signature_is_unsigned() {
        let dir = plugin_tree();
        let kp = SigningKeypair::generate();
        assert_eq!(
            verify_signature(dir.path(), &[kp.verifying_key()]).unwrap(),
            SignatureStatus::Unsigned
        );
    }

    #[test]
    fn signed_with_trusted_key_is_official() {
        let dir = plugin_tree();
        let kp = SigningKeypair::generate();
        sign_plugin_dir(dir.path(), kp.signing_key()).unwrap();
        assert_eq!(
            verify_signature(dir.path(), &[kp.verifying_key()]).unwrap(),
            SignatureStatus::Official
        );
    }

    #[test]
    fn any_trusted_key_may_match() {
        let dir = plugin_tree();
        let signer = SigningKeypair::generate();
        let other = SigningKeypair::generate();
        sign_plugin_dir(dir.path(), signer.signing_key()).unwrap();
        assert_eq!(
            verify_signature(dir.path(), &[other.verifying_key(), signer.verifying_key()]).unwrap(),
            SignatureStatus::Official
        );
    }

    #[test]
    fn unknown_signer_is_untrusted() {
        let dir = plugin_tree();
        let signer = SigningKeypair::generate();
        let trusted = SigningKeypair::generate();
        sign_plugin_dir(dir.path(), signer.signing_key()).unwrap();
        assert_eq!(
            verify_signature(dir.path(), &[trusted.verifying_key()]).unwrap(),
            SignatureStatus::Untrusted
        );
        assert_eq!(
            verify_signature(dir.path(), &[]).unwrap(),
            SignatureStatus::Untrusted
        );
    }

    #[test]
    fn tampering_after_signing_is_untrusted() {
        let dir = plugin_tree();
        let kp = SigningKeypair::generate();
        sign_plugin_dir(dir.path(), kp.signing_key()).unwrap();
        std::fs::write(dir.path().join("bin/demo"), b"patched").unwrap();
        assert_eq!(
            verify_signature(dir.path(), &[kp.verifying_key()]).unwrap(),
            SignatureStatus::Untrusted
        );
    }

    #[test]
    fn added_file_after_signing_is_untrusted() {
        let dir = plugin_tree();
        let kp = SigningKeypair::generate();
        sign_plugin_dir(dir.path(), kp.signing_key()).unwrap();
        std::fs::write(dir.path().join("extra.txt"), b"surprise").unwrap();
        assert_eq!(
            verify_signature(dir.path(), &[kp.verifying_key()]).unwrap(),
            SignatureStatus::Untrusted
        );
    }

    #[test]
    fn garbage_signature_is_untrusted() {
        let dir = plugin_tree();
        let kp = SigningKeypair::generate();
        std::fs::write(dir.path().join(SIGNATURE_FILE), b"not a signature").unwrap();
        assert_eq!(
            verify_signature(dir.path(), &[kp.verifying_key()]).unwrap(),
            SignatureStatus::Untrusted
        );
    }

    #[test]
    fn base64_text_signature_is_accepted() {
        let dir = plugin_tree();
        let kp = SigningKeypair::generate();
        sign_plugin_dir(dir.path(), kp.signing_key()).unwrap();
        let raw = std::fs::read(dir.path().join(SIGNATURE_FILE)).unwrap();
        std::fs::write(dir.path().join(SIGNATURE_FILE), STANDARD.encode(raw)).unwrap();
        assert_eq!(
            verify_signature(dir.path(), &[kp.verifying_key()]).unwrap(),
            SignatureStatus::Official
        );
    }

    #[test]
    fn uppercase_signature_name_is_found() {
        let dir = plugin_tree();
        let kp = SigningKeypair::generate();
        sign_plugin_dir(dir.path(), kp.signing_key()).unwrap();
        std::fs::rename(
            dir.path().join(SIGNATURE_FILE),
            dir.path().join("SIGNATURE.SIG"),
        )
        .unwrap();
        assert_eq!(
            verify_signature(dir.path(), &[kp.verifying_key()]).unwrap(),
            SignatureStatus::Official
        );
    }
}
