//! Freeze-mode baseline evaluation.
//!
//! During a freeze window every baseline token must roll up green before
//! any change moves. The baseline is the profile's generated `freezeMode`
//! set, so runtime and documentation share one versioned source. With
//! freeze mode disabled the evaluator is a no-op that always succeeds.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use tollgate_kernel::witness::FailureKind;
use tollgate_kernel::{GateFailure, code, outcome_token};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FreezeOutcome {
    pub enabled: bool,
    /// Baseline tokens that did not roll up 1, sorted ascending.
    pub missing_tokens: Vec<String>,
}

impl FreezeOutcome {
    pub fn satisfied(&self) -> bool {
        self.missing_tokens.is_empty()
    }

    /// Value of the `FREEZE_MODE_STRICT_OK` token.
    pub fn token_value(&self) -> u8 {
        if self.satisfied() { 1 } else { 0 }
    }

    pub fn failures(&self) -> Vec<GateFailure> {
        if self.satisfied() {
            return vec![];
        }
        vec![GateFailure::new(
            code::FREEZE_BASELINE_INCOMPLETE,
            FailureKind::Policy,
            format!(
                "{} baseline token(s) are not green during the freeze window",
                self.missing_tokens.len()
            ),
            Some(json!({"missingTokens": self.missing_tokens})),
        )]
    }
}

/// Evaluate the freeze baseline over observed rollup values.
///
/// A baseline token counts as missing when it is absent from `rollups`
/// or rolled up 0. Disabled freeze mode succeeds regardless of rollups.
pub fn evaluate_freeze(
    rollups: &BTreeMap<String, u8>,
    freeze_enabled: bool,
    baseline: &BTreeSet<String>,
) -> FreezeOutcome {
    if !freeze_enabled {
        return FreezeOutcome {
            enabled: false,
            missing_tokens: vec![],
        };
    }

    let missing_tokens: Vec<String> = baseline
        .iter()
        .filter(|token| rollups.get(token.as_str()).copied().unwrap_or(0) != 1)
        .cloned()
        .collect();

    FreezeOutcome {
        enabled: true,
        missing_tokens,
    }
}

/// The outcome token key this evaluator reports under.
pub const FREEZE_TOKEN_KEY: &str = outcome_token::FREEZE_MODE_STRICT_OK;

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline(tokens: &[&str]) -> BTreeSet<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn rollups(values: &[(&str, u8)]) -> BTreeMap<String, u8> {
        values.iter().map(|(t, v)| (t.to_string(), *v)).collect()
    }

    #[test]
    fn disabled_freeze_is_a_no_op() {
        let outcome = evaluate_freeze(
            &rollups(&[("unit_tests_green", 0)]),
            false,
            &baseline(&["unit_tests_green", "lint_clean"]),
        );
        assert!(!outcome.enabled);
        assert!(outcome.satisfied());
        assert_eq!(outcome.token_value(), 1);
        assert!(outcome.failures().is_empty());
    }

    #[test]
    fn all_green_baseline_satisfies_the_freeze() {
        let outcome = evaluate_freeze(
            &rollups(&[("unit_tests_green", 1), ("lint_clean", 1), ("extra", 0)]),
            true,
            &baseline(&["unit_tests_green", "lint_clean"]),
        );
        assert!(outcome.satisfied());
        assert_eq!(outcome.token_value(), 1);
    }

    #[test]
    fn absent_and_zero_tokens_are_missing_sorted() {
        let outcome = evaluate_freeze(
            &rollups(&[("zulu_check", 0), ("alpha_check", 1)]),
            true,
            &baseline(&["zulu_check", "alpha_check", "mid_check"]),
        );
        assert!(!outcome.satisfied());
        assert_eq!(outcome.missing_tokens, ["mid_check", "zulu_check"]);
        assert_eq!(outcome.token_value(), 0);

        let failures = outcome.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].code, code::FREEZE_BASELINE_INCOMPLETE);
        assert_eq!(
            failures[0].context.as_ref().unwrap()["missingTokens"],
            json!(["mid_check", "zulu_check"])
        );
    }

    #[test]
    fn empty_baseline_is_trivially_satisfied() {
        let outcome = evaluate_freeze(&rollups(&[]), true, &baseline(&[]));
        assert!(outcome.satisfied());
        assert_eq!(outcome.token_value(), 1);
    }

    #[test]
    fn non_binary_rollup_values_count_as_not_green() {
        let outcome = evaluate_freeze(
            &rollups(&[("odd_check", 7)]),
            true,
            &baseline(&["odd_check"]),
        );
        assert_eq!(outcome.missing_tokens, ["odd_check"]);
    }
}
