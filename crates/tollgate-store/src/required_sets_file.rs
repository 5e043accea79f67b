//! The generated required-sets artifact and its staleness audit.
//!
//! The artifact commits the expanded tier sets together with provenance:
//! the digest of the execution profile it was generated from. The check
//! recomputes both; a digest mismatch means the artifact predates the
//! current profile, and membership diffs say exactly what changed.

use crate::error::StoreError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tollgate_kernel::witness::FailureKind;
use tollgate_kernel::{GateFailure, code, digest_hex};
use tollgate_policy::{ExecutionProfile, RequiredSets, audit_required_sets, generate_required_sets};

pub const REQUIRED_SETS_KIND: &str = "tollgate.required_sets.v1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequiredSetsDoc {
    pub schema: u32,
    pub sets_kind: String,
    /// Digest of the execution profile these sets were generated from.
    pub profile_digest: String,
    pub generated_at_utc: String,
    pub sets: RequiredSets,
}

/// Expand the profile's tier sets into a committable artifact.
///
/// `profile_value` is the raw document `profile` was decoded from; the
/// provenance digest covers its canonical bytes.
pub fn build_required_sets_doc(
    profile_value: &Value,
    profile: &ExecutionProfile,
    now: DateTime<Utc>,
) -> RequiredSetsDoc {
    RequiredSetsDoc {
        schema: 1,
        sets_kind: REQUIRED_SETS_KIND.to_string(),
        profile_digest: digest_hex(profile_value),
        generated_at_utc: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        sets: generate_required_sets(profile),
    }
}

pub fn decode_required_sets_doc(value: &Value) -> Result<RequiredSetsDoc, StoreError> {
    let doc: RequiredSetsDoc =
        serde_json::from_value(value.clone()).map_err(|source| StoreError::Decode {
            doc: "required-sets artifact",
            source,
        })?;
    if doc.schema != 1 {
        return Err(StoreError::Contract(format!(
            "required-sets artifact schema must be 1, got {}",
            doc.schema
        )));
    }
    if doc.sets_kind != REQUIRED_SETS_KIND {
        return Err(StoreError::Contract(format!(
            "setsKind must be {REQUIRED_SETS_KIND:?}, got {:?}",
            doc.sets_kind
        )));
    }
    Ok(doc)
}

/// Check a committed artifact against the current profile.
pub fn audit_required_sets_doc(
    doc: &RequiredSetsDoc,
    profile_value: &Value,
    profile: &ExecutionProfile,
) -> Vec<GateFailure> {
    let mut failures = Vec::new();

    let expected = digest_hex(profile_value);
    if doc.profile_digest != expected {
        failures.push(GateFailure::new(
            code::REQUIRED_SETS_STALE,
            FailureKind::Drift,
            "required-sets artifact was generated from a different execution profile",
            Some(json!({
                "expectedProfileDigest": expected,
                "recordedProfileDigest": doc.profile_digest,
            })),
        ));
    }

    failures.extend(audit_required_sets(profile, &doc.sets));
    failures.sort();
    failures
}
