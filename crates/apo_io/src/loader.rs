//! Loader: read local JSON artifacts (payload, optional config file, optional
//! external-signals file) with a size cap. No network I/O; URL-like paths are
//! refused before touching the filesystem.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use apo_core::ExternalSignalsInput;

use crate::hasher;
use crate::validate::{validate_external_signals, validate_payload, ValidatedPayload};
use crate::{looks_like_url_strict, IoError, IoResult};

/// Largest JSON document accepted from disk.
pub const MAX_JSON_BYTES: u64 = 8 * 1024 * 1024;

/// A validated payload plus the digest of its canonical form.
#[derive(Debug, Clone)]
pub struct LoadedPayload {
    pub payload: ValidatedPayload,
    /// SHA-256 of the canonical validated payload (defaults applied).
    pub input_sha256: String,
}

/// Read and parse a JSON file, rejecting URLs and documents over `MAX_JSON_BYTES`.
pub fn read_json_value_with_limits(path: &Path) -> IoResult<Value> {
    let shown = path.display().to_string();
    if looks_like_url_strict(&shown) {
        return Err(IoError::Path(format!("{shown}: URLs are not accepted; use a local file")));
    }
    let f = File::open(path).map_err(|e| IoError::Path(format!("{shown}: {e}")))?;
    let mut buf = Vec::new();
    f.take(MAX_JSON_BYTES + 1)
        .read_to_end(&mut buf)
        .map_err(|e| IoError::Path(format!("{shown}: {e}")))?;
    if buf.len() as u64 > MAX_JSON_BYTES {
        return Err(IoError::Limit(format!("{shown} exceeds {MAX_JSON_BYTES} bytes")));
    }
    debug!(path = %shown, bytes = buf.len(), "read json");
    serde_json::from_slice(&buf).map_err(|e| IoError::Json {
        pointer: "/".into(),
        msg: format!("{shown}: {e}"),
    })
}

/// Load and validate a scoring payload.
pub fn load_payload(path: &Path) -> IoResult<LoadedPayload> {
    let v = read_json_value_with_limits(path)?;
    let payload = validate_payload(&v)?;
    let input_sha256 = hasher::sha256_canonical(&payload)?;
    Ok(LoadedPayload { payload, input_sha256 })
}

/// Load a configuration document. Its content is not judged here: a malformed
/// table degrades during `config::resolve_config`.
pub fn load_config(path: &Path) -> IoResult<Value> {
    read_json_value_with_limits(path)
}

/// Load a standalone external-signals document.
pub fn load_signals(path: &Path) -> IoResult<ExternalSignalsInput> {
    let v = read_json_value_with_limits(path)?;
    Ok(validate_external_signals(&v, "")?)
}
