//! Canon/alias resolution with sunset-aware dispositions.
//!
//! A canon document names the canonical id prefix, the deprecated
//! prefixes it supersedes, and an alias map with one sunset date. Ids
//! under the canonical prefix pass through. A deprecated id with no
//! alias entry never resolves, before or after sunset. A mapped alias
//! resolves through the sunset date; afterwards its use warns in review
//! tiers and blocks promotion. The evaluation date is always injected,
//! never read from a clock here.

use crate::error::PolicyError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tollgate_kernel::witness::FailureKind;
use tollgate_kernel::{Disposition, DisposedFailure, GateFailure, Tier, code};
use tollgate_catalog::SignalIndex;

pub const ALIAS_CANON_KIND: &str = "tollgate.alias_canon.v1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AliasCanon {
    pub schema: u32,
    pub canon_kind: String,
    pub canonical_prefix: String,
    #[serde(default)]
    pub deprecated_prefixes: Vec<String>,
    #[serde(default)]
    pub alias_map: BTreeMap<String, String>,
    /// Aliases resolve through this date and expire after it.
    pub sunset_date_utc: NaiveDate,
}

impl AliasCanon {
    fn matching_deprecated_prefix(&self, id: &str) -> Option<&str> {
        self.deprecated_prefixes
            .iter()
            .map(String::as_str)
            .find(|prefix| !prefix.is_empty() && id.starts_with(prefix))
    }
}

pub fn decode_alias_canon(value: &Value) -> Result<AliasCanon, PolicyError> {
    let canon: AliasCanon =
        serde_json::from_value(value.clone()).map_err(|source| PolicyError::Decode {
            doc: "alias canon",
            source,
        })?;
    if canon.schema != 1 {
        return Err(PolicyError::Contract(format!(
            "alias canon schema must be 1, got {}",
            canon.schema
        )));
    }
    if canon.canon_kind != ALIAS_CANON_KIND {
        return Err(PolicyError::Contract(format!(
            "canonKind must be {ALIAS_CANON_KIND:?}, got {:?}",
            canon.canon_kind
        )));
    }
    if canon.canonical_prefix.trim().is_empty() {
        return Err(PolicyError::Contract(
            "canonicalPrefix must be non-empty".to_string(),
        ));
    }
    Ok(canon)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AliasResolution {
    pub input_id: String,
    /// The id evaluation should proceed with. Stays the input when the
    /// canon has nothing to say about it.
    pub canonical_id: String,
    pub disposition: Disposition,
    pub warnings: Vec<String>,
    pub witnesses: Vec<DisposedFailure>,
}

impl AliasResolution {
    pub fn ok(&self) -> bool {
        self.disposition.is_ok()
    }

    fn untouched(id: &str) -> Self {
        Self {
            input_id: id.to_string(),
            canonical_id: id.to_string(),
            disposition: Disposition::Pass,
            warnings: vec![],
            witnesses: vec![],
        }
    }
}

/// Resolve `id` through the canon as of `today`.
pub fn resolve_alias(
    canon: &AliasCanon,
    id: &str,
    tier: Tier,
    today: NaiveDate,
    index: &SignalIndex,
) -> AliasResolution {
    if id.starts_with(&canon.canonical_prefix) {
        return AliasResolution::untouched(id);
    }

    let Some(prefix) = canon.matching_deprecated_prefix(id) else {
        // Not this canon's concern.
        return AliasResolution::untouched(id);
    };

    let Some(target) = canon.alias_map.get(id) else {
        // No mapping means no answer, regardless of the sunset date.
        let witness = index.dispose(
            GateFailure::new(
                code::ALIAS_UNKNOWN,
                FailureKind::Policy,
                format!("deprecated id '{id}' has no alias mapping"),
                Some(json!({"id": id, "deprecatedPrefix": prefix})),
            ),
            tier,
        );
        return AliasResolution {
            input_id: id.to_string(),
            canonical_id: id.to_string(),
            disposition: witness.disposition,
            warnings: vec![],
            witnesses: vec![witness],
        };
    };

    if today <= canon.sunset_date_utc {
        return AliasResolution {
            input_id: id.to_string(),
            canonical_id: target.clone(),
            disposition: Disposition::Pass,
            warnings: vec![format!(
                "'{id}' is a deprecated alias for '{target}'; it sunsets on {}",
                canon.sunset_date_utc
            )],
            witnesses: vec![],
        };
    }

    let witness = index.dispose(
        GateFailure::new(
            code::ALIAS_SUNSET_EXPIRED,
            FailureKind::Temporal,
            format!(
                "alias '{id}' expired at sunset {} (today is {today})",
                canon.sunset_date_utc
            ),
            Some(json!({
                "id": id,
                "canonicalId": target,
                "sunsetDateUtc": canon.sunset_date_utc,
                "today": today,
            })),
        ),
        tier,
    );
    let disposition = witness.disposition;
    AliasResolution {
        input_id: id.to_string(),
        canonical_id: target.clone(),
        disposition,
        warnings: vec![format!(
            "'{id}' resolved to '{target}' past its {} sunset",
            canon.sunset_date_utc
        )],
        witnesses: vec![witness],
    }
}
