//! Catalog locks: recorded digests over canonical document bytes.
//!
//! A lock pins the digest of a governed document at generation time.
//! Verification recomputes the digest from the current document and
//! reports drift without ever trusting the recorded value's shape.

use crate::error::StoreError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tollgate_kernel::witness::FailureKind;
use tollgate_kernel::{GateFailure, code, digest_hex, is_digest_hex};

pub const LOCK_KIND: &str = "tollgate.lock.v1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogLock {
    pub schema: u32,
    pub lock_kind: String,
    /// Logical name of the locked document, e.g. "token-catalog".
    pub canonical_source_name: String,
    /// Hex sha-256 over the canonical bytes of the locked document.
    pub digest_hex: String,
    pub generated_at_utc: String,
}

/// Lock the current state of `source`.
pub fn compute_lock(source: &Value, source_name: &str, now: DateTime<Utc>) -> CatalogLock {
    CatalogLock {
        schema: 1,
        lock_kind: LOCK_KIND.to_string(),
        canonical_source_name: source_name.to_string(),
        digest_hex: digest_hex(source),
        generated_at_utc: now.to_rfc3339_opts(SecondsFormat::Secs, true),
    }
}

pub fn decode_lock(value: &Value) -> Result<CatalogLock, StoreError> {
    let lock: CatalogLock =
        serde_json::from_value(value.clone()).map_err(|source| StoreError::Decode {
            doc: "catalog lock",
            source,
        })?;
    if lock.schema != 1 {
        return Err(StoreError::Contract(format!(
            "catalog lock schema must be 1, got {}",
            lock.schema
        )));
    }
    if lock.lock_kind != LOCK_KIND {
        return Err(StoreError::Contract(format!(
            "lockKind must be {LOCK_KIND:?}, got {:?}",
            lock.lock_kind
        )));
    }
    Ok(lock)
}

/// Check a lock against the current source document.
///
/// A malformed recorded digest is reported on its own; the drift
/// comparison only runs against a well-formed one.
pub fn verify_lock(lock: &CatalogLock, source: &Value) -> Vec<GateFailure> {
    let mut failures = Vec::new();

    if lock.canonical_source_name.trim().is_empty() {
        failures.push(GateFailure::new(
            code::LOCK_MALFORMED,
            FailureKind::Schema,
            "lock field canonicalSourceName must be non-empty",
            Some(json!({"field": "canonicalSourceName"})),
        ));
    }
    if DateTime::parse_from_rfc3339(&lock.generated_at_utc).is_err() {
        failures.push(GateFailure::new(
            code::LOCK_MALFORMED,
            FailureKind::Schema,
            format!(
                "generatedAtUtc must be an RFC 3339 timestamp, got '{}'",
                lock.generated_at_utc
            ),
            Some(json!({"field": "generatedAtUtc", "value": lock.generated_at_utc})),
        ));
    }

    if !is_digest_hex(&lock.digest_hex) {
        failures.push(GateFailure::new(
            code::LOCK_MALFORMED,
            FailureKind::Schema,
            format!(
                "digestHex must be 64 lowercase hex characters, got '{}'",
                lock.digest_hex
            ),
            Some(json!({"field": "digestHex", "value": lock.digest_hex})),
        ));
    } else {
        let expected = digest_hex(source);
        if expected != lock.digest_hex {
            failures.push(GateFailure::new(
                code::CATALOG_LOCK_MISMATCH,
                FailureKind::Drift,
                format!(
                    "locked document '{}' has changed since the lock was written",
                    lock.canonical_source_name
                ),
                Some(json!({
                    "canonicalSourceName": lock.canonical_source_name,
                    "expectedDigest": expected,
                    "recordedDigest": lock.digest_hex,
                })),
            ));
        }
    }

    failures.sort();
    failures
}
