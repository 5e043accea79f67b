//! Reading governed documents from disk.

use crate::error::StoreError;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Read and parse one JSON document.
///
/// Typed decoding stays with the crate that owns the document kind;
/// this only gets the bytes into a [`Value`].
pub fn read_json_value(path: impl AsRef<Path>) -> Result<Value, StoreError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| StoreError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| StoreError::ParseJson {
        path: path.to_path_buf(),
        source,
    })
}
