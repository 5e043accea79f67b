//! Execution profiles: scope flags and per-tier set declarations.
//!
//! A profile declares the scope flags a deployment may toggle and, for
//! each named required set, the tokens that are always members plus the
//! tokens gated behind a flag. Overrides win over declared defaults;
//! flags nobody declared have no effective state.

use crate::error::PolicyError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const EXECUTION_PROFILE_KIND: &str = "tollgate.execution_profile.v1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScopeFlag {
    pub flag_id: String,
    pub default_enabled: bool,
}

/// A token whose set membership is gated behind a scope flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalGate {
    pub token_id: String,
    pub flag_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TierSetDecl {
    #[serde(default)]
    pub always: Vec<String>,
    #[serde(default)]
    pub conditional: Vec<ConditionalGate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TierSets {
    #[serde(default)]
    pub core: TierSetDecl,
    #[serde(default)]
    pub release: TierSetDecl,
    #[serde(default)]
    pub active: TierSetDecl,
    #[serde(default)]
    pub freeze_mode: TierSetDecl,
}

impl TierSets {
    /// Declarations with their wire names, in declaration order.
    pub fn named(&self) -> [(&'static str, &TierSetDecl); 4] {
        [
            ("core", &self.core),
            ("release", &self.release),
            ("active", &self.active),
            ("freezeMode", &self.freeze_mode),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionProfile {
    pub schema: u32,
    pub profile_kind: String,
    pub scope_flags: Vec<ScopeFlag>,
    #[serde(default)]
    pub flag_overrides: BTreeMap<String, bool>,
    pub tier_sets: TierSets,
}

impl ExecutionProfile {
    pub fn declares_flag(&self, flag_id: &str) -> bool {
        self.scope_flags.iter().any(|f| f.flag_id == flag_id)
    }

    /// Effective state of `flag_id`: the override when present, otherwise
    /// the declared default. Undeclared flags resolve to `None`.
    pub fn flag_enabled(&self, flag_id: &str) -> Option<bool> {
        let declared = self.scope_flags.iter().find(|f| f.flag_id == flag_id)?;
        Some(
            *self
                .flag_overrides
                .get(flag_id)
                .unwrap_or(&declared.default_enabled),
        )
    }
}

pub fn decode_execution_profile(value: &Value) -> Result<ExecutionProfile, PolicyError> {
    let profile: ExecutionProfile =
        serde_json::from_value(value.clone()).map_err(|source| PolicyError::Decode {
            doc: "execution profile",
            source,
        })?;
    if profile.schema != 1 {
        return Err(PolicyError::Contract(format!(
            "execution profile schema must be 1, got {}",
            profile.schema
        )));
    }
    if profile.profile_kind != EXECUTION_PROFILE_KIND {
        return Err(PolicyError::Contract(format!(
            "profileKind must be {EXECUTION_PROFILE_KIND:?}, got {:?}",
            profile.profile_kind
        )));
    }
    let mut seen = std::collections::BTreeSet::new();
    for flag in &profile.scope_flags {
        if flag.flag_id.trim().is_empty() {
            return Err(PolicyError::Contract(
                "scopeFlags entries must have a non-empty flagId".to_string(),
            ));
        }
        if !seen.insert(flag.flag_id.as_str()) {
            return Err(PolicyError::Contract(format!(
                "scope flag '{}' is declared more than once",
                flag.flag_id
            )));
        }
    }
    Ok(profile)
}
