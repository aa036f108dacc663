//! crates/apo_io/src/lib.rs
//! Boundary crate between untrusted JSON and the typed engine.
//!
//! - `validate`: strict item/category contract for LLM-produced payloads.
//! - `config`: resolve raw configuration JSON into an `EngineConfig`,
//!   falling back to documented defaults table by table.
//! - `loader`: read local JSON files with size limits (no network).
//! - `canonical_json` / `hasher`: deterministic bytes and SHA-256 digests.
//!
//! Shared error type (`IoError`) with `From` conversions used across modules.

#![forbid(unsafe_code)]

use thiserror::Error;

pub mod canonical_json;
pub mod config;
pub mod hasher;
pub mod loader;
pub mod validate;

pub use validate::ValidationError;

/// Unified error for apo_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors.
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON syntax / serialization errors with a JSON Pointer hint.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Input exceeded a configured size limit.
    #[error("limit exceeded: {0}")]
    Limit(String),

    /// Payload violates the item/category contract.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Hashing unavailable or failed.
    #[error("hash error: {0}")]
    Hash(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json doesn't keep a pointer; default to root.
        IoError::Json {
            pointer: "/".to_string(),
            msg: e.to_string(),
        }
    }
}

/// Returns true if `s` looks like a URL (any `<scheme>://`, including `file://`).
#[inline]
pub fn looks_like_url_strict(s: &str) -> bool {
    s.trim().contains("://")
}

pub mod prelude {
    pub use crate::{looks_like_url_strict, IoError, IoResult};

    pub use crate::canonical_json;
    pub use crate::config;
    pub use crate::hasher;
    pub use crate::loader;
    pub use crate::validate;

    pub use crate::canonical_json::{to_canonical_bytes, write_canonical_file};
    pub use crate::config::{resolve_config, ConfigIssue, ResolvedConfig};
    pub use crate::loader::{load_config, load_payload, load_signals, LoadedPayload};
    pub use crate::validate::{
        validate_payload, KeyFactors, MonteCarloRequest, ValidatedPayload, ValidationError,
    };
}
