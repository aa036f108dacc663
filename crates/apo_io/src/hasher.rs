//! crates/apo_io/src/hasher.rs
//!
//! SHA-256 digests over raw bytes and canonical JSON.
//!
//! - Canonical JSON hashing: sorted object keys, array order preserved.
//! - Hex digests are lowercase.
//! - `seed_from_digest` turns an input digest into the default Monte Carlo seed,
//!   so identical payloads reproduce identical intervals without an explicit seed.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical_json::to_canonical_bytes;
use crate::{IoError, IoResult};

/// SHA-256 over raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 over the canonical JSON bytes of any serializable value.
pub fn sha256_canonical<T: Serialize>(value: &T) -> IoResult<String> {
    Ok(sha256_hex(&to_canonical_bytes(value)?))
}

/// First eight digest bytes, big-endian.
pub fn seed_from_digest(hex64: &str) -> IoResult<u64> {
    if hex64.len() != 64 || !hex64.bytes().all(|c| matches!(c, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(IoError::Hash(format!("expected lowercase 64-hex digest, got {hex64:?}")));
    }
    let bytes = hex::decode(&hex64[..16]).map_err(|e| IoError::Hash(e.to_string()))?;
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes);
    Ok(u64::from_be_bytes(word))
}
