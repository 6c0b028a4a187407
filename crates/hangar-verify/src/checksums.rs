// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic SHA-256 checksum map over a plugin directory.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use hangar_core::HangarError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

pub const CHECKSUMS_FILE: &str = "checksums.json";
pub const SIGNATURE_FILE: &str = "signature.sig";

/// Contents of `checksums.json`.
///
/// `files` is keyed by slash-separated relative path; the `BTreeMap` keeps the
/// serialized form path-sorted regardless of directory-listing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksums {
    pub algo: String,
    pub files: BTreeMap<String, String>,
}

impl Checksums {
    /// The exact bytes that get signed: two-space indented JSON.
    pub fn to_bytes(&self) -> Result<Vec<u8>, HangarError> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| HangarError::Internal(format!("serialize checksums: {e}")))
    }
}

/// Whether a file name is one of the trust artifacts excluded from hashing.
pub(crate) fn is_trust_artifact(name: &str) -> bool {
    name.eq_ignore_ascii_case(CHECKSUMS_FILE) || name.eq_ignore_ascii_case(SIGNATURE_FILE)
}

/// Hash every regular file under `dir` except the trust artifacts.
pub fn compute_checksums(dir: &Path) -> Result<Checksums, HangarError> {
    let mut files = BTreeMap::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|e| HangarError::Trust(format!("walk {}: {e}", dir.display())))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if is_trust_artifact(&entry.file_name().to_string_lossy()) {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| HangarError::Internal(format!("relative path: {e}")))?;
        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.insert(rel, hash_file(entry.path())?);
    }
    Ok(Checksums {
        algo: "sha256".to_string(),
        files,
    })
}

fn hash_file(path: &Path) -> Result<String, HangarError> {
    let mut file = File::open(path)
        .map_err(|e| HangarError::Trust(format!("open {}: {e}", path.display())))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)
        .map_err(|e| HangarError::Trust(format!("read {}: {e}", path.display())))?;
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifacts_are_excluded_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("manifest.json"), b"{}").unwrap();
        std::fs::write(dir.path().join("Signature.SIG"), b"sig").unwrap();
        std::fs::write(dir.path().join("CHECKSUMS.json"), b"{}").unwrap();
        std::fs::create_dir_all(dir.path().join("bin")).unwrap();
        std::fs::write(dir.path().join("bin/plugin"), b"binary").unwrap();

        let cs = compute_checksums(dir.path()).unwrap();
        let keys: Vec<_> = cs.files.keys().cloned().collect();
        assert_eq!(keys, vec!["bin/plugin".to_string(), "manifest.json".to_string()]);
    }

    #[test]
    fn digest_is_lowercase_sha256_hex() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"abc").unwrap();
        let cs = compute_checksums(dir.path()).unwrap();
        assert_eq!(
            cs.files["a.txt"],
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn serialized_form_is_indented_and_sorted() {
        let mut files = BTreeMap::new();
        files.insert("z".to_string(), "01".to_string());
        files.insert("a".to_string(), "02".to_string());
        let cs = Checksums {
            algo: "sha256".into(),
            files,
        };
        let text = String::from_utf8(cs.to_bytes().unwrap()).unwrap();
        assert_eq!(
            text,
            "{\n  \"algo\": \"sha256\",\n  \"files\": {\n    \"a\": \"02\",\n    \"z\": \"01\"\n  }\n}"
        );
    }
}
