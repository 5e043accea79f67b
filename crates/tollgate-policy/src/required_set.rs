//! Required-set generation and the conditional-gate audit.
//!
//! Generation is referentially transparent: the same profile always
//! produces the same four sets, and membership depends only on declared
//! flags and their effective state. The audit recomputes from the profile
//! and diffs a claimed copy, so a substituted generator that ignores
//! scope flags cannot go unnoticed.

use crate::profile::ExecutionProfile;
use crate::profile::TierSetDecl;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;
use tollgate_kernel::witness::FailureKind;
use tollgate_kernel::{GateFailure, code};

/// The four named required sets, each sorted and duplicate-free.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequiredSets {
    pub core: BTreeSet<String>,
    pub release: BTreeSet<String>,
    pub active: BTreeSet<String>,
    pub freeze_mode: BTreeSet<String>,
}

impl RequiredSets {
    /// Sets with their wire names, in declaration order.
    pub fn named(&self) -> [(&'static str, &BTreeSet<String>); 4] {
        [
            ("core", &self.core),
            ("release", &self.release),
            ("active", &self.active),
            ("freezeMode", &self.freeze_mode),
        ]
    }
}

fn expand(profile: &ExecutionProfile, decl: &TierSetDecl) -> BTreeSet<String> {
    let mut out: BTreeSet<String> = decl
        .always
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    for gate in &decl.conditional {
        if profile.flag_enabled(&gate.flag_id) == Some(true) {
            let token_id = gate.token_id.trim();
            if !token_id.is_empty() {
                out.insert(token_id.to_string());
            }
        }
    }
    out
}

/// Expand a profile into its four required sets.
///
/// A token is a member iff it is declared `always` or its conditional
/// gate's flag is effectively enabled. Conditional entries naming a flag
/// the profile never declared are excluded; the audit reports them.
pub fn generate_required_sets(profile: &ExecutionProfile) -> RequiredSets {
    RequiredSets {
        core: expand(profile, &profile.tier_sets.core),
        release: expand(profile, &profile.tier_sets.release),
        active: expand(profile, &profile.tier_sets.active),
        freeze_mode: expand(profile, &profile.tier_sets.freeze_mode),
    }
}

/// Diff claimed required sets against the sets the profile generates.
pub fn audit_required_sets(
    profile: &ExecutionProfile,
    claimed: &RequiredSets,
) -> Vec<GateFailure> {
    let mut failures = Vec::new();

    for (name, decl) in profile.tier_sets.named() {
        for gate in &decl.conditional {
            if !profile.declares_flag(&gate.flag_id) {
                failures.push(GateFailure::new(
                    code::CONDITIONAL_GATE_MISAPPLIED,
                    FailureKind::Drift,
                    format!(
                        "conditional gate '{}' in set '{name}' references undeclared scope flag '{}'",
                        gate.token_id, gate.flag_id
                    ),
                    Some(json!({
                        "set": name,
                        "tokenId": gate.token_id,
                        "flagId": gate.flag_id,
                    })),
                ));
            }
        }
    }

    let expected = generate_required_sets(profile);
    for ((name, expected_set), (_, claimed_set)) in expected.named().into_iter().zip(claimed.named())
    {
        let missing: Vec<&String> = expected_set.difference(claimed_set).collect();
        let unexpected: Vec<&String> = claimed_set.difference(expected_set).collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            failures.push(GateFailure::new(
                code::CONDITIONAL_GATE_MISAPPLIED,
                FailureKind::Drift,
                format!(
                    "required set '{name}' disagrees with the profile ({} missing, {} unexpected)",
                    missing.len(),
                    unexpected.len()
                ),
                Some(json!({
                    "set": name,
                    "missing": missing,
                    "unexpected": unexpected,
                })),
            ));
        }
    }

    failures.sort();
    failures
}
