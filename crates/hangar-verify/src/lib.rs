// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trust and manifest handling for on-disk plugins.
//!
//! Everything here is a pure function of directory contents (plus a trusted
//! key set for [`verify_signature`]). Nothing is cached.

pub mod checksums;
pub mod keys;
pub mod manifest;
pub mod signature;

pub use checksums::{CHECKSUMS_FILE, Checksums, SIGNATURE_FILE, compute_checksums};
pub use keys::{SigningKeypair, decode_trusted_keys, decode_verifying_key};
pub use manifest::{
    Capabilities, DiskManifest, EntryInfo, MANIFEST_FILE, current_platform, describe_entry,
    parse_manifest, read_manifest, resolve_entry,
};
pub use signature::{sign_plugin_dir, verify_signature};
