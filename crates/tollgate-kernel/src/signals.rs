//! Builtin failure-signal table.
//!
//! This module is the single semantic authority for the codes the engine
//! itself emits: their taxonomy kind, per-tier mode matrix, and audit
//! precedence. Catalog-declared signals take priority at disposition time;
//! this table is the fallback for engine codes, and codes known to neither
//! side dispose fail-closed (blocking in every tier).

use crate::tier::{Mode, ModeMatrix};
use crate::witness::FailureKind;
use serde::Serialize;
use serde_json::{Value, json};

/// Failure code constants, `E_[A-Z0-9_]+`.
pub mod code {
    pub const TOKEN_ID_DUPLICATE: &str = "E_TOKEN_ID_DUPLICATE";
    pub const FAILSIGNAL_CODE_DUPLICATE: &str = "E_FAILSIGNAL_CODE_DUPLICATE";
    pub const FAILSIGNAL_CODE_MALFORMED: &str = "E_FAILSIGNAL_CODE_MALFORMED";
    pub const FAILSIGNAL_UNRESOLVED: &str = "E_FAILSIGNAL_UNRESOLVED";
    pub const PRECEDENCE_INVALID: &str = "E_PRECEDENCE_INVALID";
    pub const NEGATIVE_TEST_REF_MISSING: &str = "E_NEGATIVE_TEST_REF_MISSING";
    pub const CONDITIONAL_GATE_MISAPPLIED: &str = "E_CONDITIONAL_GATE_MISAPPLIED";
    pub const PROMOTION_RECORD_MALFORMED: &str = "E_PROMOTION_RECORD_MALFORMED";
    pub const PROMOTION_MODE_DISABLED: &str = "E_PROMOTION_MODE_DISABLED";
    pub const PROMOTION_STAGE_UNKNOWN: &str = "E_PROMOTION_STAGE_UNKNOWN";
    pub const PROMOTION_NOT_ADJACENT: &str = "E_PROMOTION_NOT_ADJACENT";
    pub const PROMOTION_BASE_MISMATCH: &str = "E_PROMOTION_BASE_MISMATCH";
    pub const PROMOTION_REQUIRED_METRIC_MISSING: &str = "E_PROMOTION_REQUIRED_METRIC_MISSING";
    pub const PROMOTION_METRIC_TYPE_MISMATCH: &str = "E_PROMOTION_METRIC_TYPE_MISMATCH";
    pub const PROMOTION_METRIC_NEGATIVE: &str = "E_PROMOTION_METRIC_NEGATIVE";
    pub const PROMOTION_METRIC_OUT_OF_RANGE: &str = "E_PROMOTION_METRIC_OUT_OF_RANGE";
    pub const PROMOTION_SCOPE_FLAG_UNKNOWN: &str = "E_PROMOTION_SCOPE_FLAG_UNKNOWN";
    pub const FREEZE_BASELINE_INCOMPLETE: &str = "E_FREEZE_BASELINE_INCOMPLETE";
    pub const CATALOG_LOCK_MISMATCH: &str = "E_CATALOG_LOCK_MISMATCH";
    pub const LOCK_MALFORMED: &str = "E_LOCK_MALFORMED";
    pub const REQUIRED_SETS_STALE: &str = "E_REQUIRED_SETS_STALE";
    pub const ALIAS_UNKNOWN: &str = "E_ALIAS_UNKNOWN";
    pub const ALIAS_SUNSET_EXPIRED: &str = "E_ALIAS_SUNSET_EXPIRED";
    pub const HOOK_SPAWN_FAILED: &str = "E_HOOK_SPAWN_FAILED";
    pub const HOOK_TIMEOUT: &str = "E_HOOK_TIMEOUT";
    pub const HOOK_EXIT_UNEXPECTED: &str = "E_HOOK_EXIT_UNEXPECTED";
    pub const HOOK_OUTPUT_UNPARSEABLE: &str = "E_HOOK_OUTPUT_UNPARSEABLE";
}

/// One builtin signal declaration.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuiltinSignal {
    pub code: &'static str,
    pub kind: FailureKind,
    pub mode_matrix: ModeMatrix,
    pub precedence: u32,
}

const BLOCKING_EVERYWHERE: ModeMatrix = ModeMatrix::uniform(Mode::Blocking);

/// Sunset expiry warns in review tiers and blocks promotion.
const SUNSET_MATRIX: ModeMatrix = ModeMatrix {
    pr_core: Mode::Advisory,
    release: Mode::Advisory,
    promotion: Mode::Blocking,
};

/// Canonical builtin signal table, grouped by taxonomy kind.
///
/// This symbol name is intentionally stable because the `signal-registry`
/// surface exports it as an authority document.
pub const BUILTIN_SIGNALS: &[BuiltinSignal] = &[
    // Schema: a document violates its own shape rules.
    BuiltinSignal {
        code: code::TOKEN_ID_DUPLICATE,
        kind: FailureKind::Schema,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 10,
    },
    BuiltinSignal {
        code: code::FAILSIGNAL_CODE_DUPLICATE,
        kind: FailureKind::Schema,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 11,
    },
    BuiltinSignal {
        code: code::FAILSIGNAL_CODE_MALFORMED,
        kind: FailureKind::Schema,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 12,
    },
    BuiltinSignal {
        code: code::FAILSIGNAL_UNRESOLVED,
        kind: FailureKind::Schema,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 13,
    },
    BuiltinSignal {
        code: code::PRECEDENCE_INVALID,
        kind: FailureKind::Schema,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 14,
    },
    BuiltinSignal {
        code: code::PROMOTION_RECORD_MALFORMED,
        kind: FailureKind::Schema,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 15,
    },
    BuiltinSignal {
        code: code::PROMOTION_METRIC_TYPE_MISMATCH,
        kind: FailureKind::Schema,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 16,
    },
    BuiltinSignal {
        code: code::PROMOTION_SCOPE_FLAG_UNKNOWN,
        kind: FailureKind::Schema,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 17,
    },
    BuiltinSignal {
        code: code::LOCK_MALFORMED,
        kind: FailureKind::Schema,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 18,
    },
    // Drift: recorded state disagrees with recomputed state.
    BuiltinSignal {
        code: code::CONDITIONAL_GATE_MISAPPLIED,
        kind: FailureKind::Drift,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 20,
    },
    BuiltinSignal {
        code: code::CATALOG_LOCK_MISMATCH,
        kind: FailureKind::Drift,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 21,
    },
    BuiltinSignal {
        code: code::REQUIRED_SETS_STALE,
        kind: FailureKind::Drift,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 22,
    },
    // Policy: a well-formed input violates a governance rule.
    BuiltinSignal {
        code: code::NEGATIVE_TEST_REF_MISSING,
        kind: FailureKind::Policy,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 30,
    },
    BuiltinSignal {
        code: code::PROMOTION_MODE_DISABLED,
        kind: FailureKind::Policy,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 31,
    },
    BuiltinSignal {
        code: code::PROMOTION_STAGE_UNKNOWN,
        kind: FailureKind::Policy,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 32,
    },
    BuiltinSignal {
        code: code::PROMOTION_NOT_ADJACENT,
        kind: FailureKind::Policy,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 33,
    },
    BuiltinSignal {
        code: code::PROMOTION_BASE_MISMATCH,
        kind: FailureKind::Policy,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 34,
    },
    BuiltinSignal {
        code: code::PROMOTION_REQUIRED_METRIC_MISSING,
        kind: FailureKind::Policy,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 35,
    },
    BuiltinSignal {
        code: code::PROMOTION_METRIC_NEGATIVE,
        kind: FailureKind::Policy,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 36,
    },
    BuiltinSignal {
        code: code::PROMOTION_METRIC_OUT_OF_RANGE,
        kind: FailureKind::Policy,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 37,
    },
    BuiltinSignal {
        code: code::FREEZE_BASELINE_INCOMPLETE,
        kind: FailureKind::Policy,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 38,
    },
    BuiltinSignal {
        code: code::ALIAS_UNKNOWN,
        kind: FailureKind::Policy,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 39,
    },
    // Temporal: a date-dependent rule is violated.
    BuiltinSignal {
        code: code::ALIAS_SUNSET_EXPIRED,
        kind: FailureKind::Temporal,
        mode_matrix: SUNSET_MATRIX,
        precedence: 40,
    },
    // Execution: an external proof hook failed to run or to answer.
    BuiltinSignal {
        code: code::HOOK_SPAWN_FAILED,
        kind: FailureKind::Execution,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 50,
    },
    BuiltinSignal {
        code: code::HOOK_TIMEOUT,
        kind: FailureKind::Execution,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 51,
    },
    BuiltinSignal {
        code: code::HOOK_EXIT_UNEXPECTED,
        kind: FailureKind::Execution,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 52,
    },
    BuiltinSignal {
        code: code::HOOK_OUTPUT_UNPARSEABLE,
        kind: FailureKind::Execution,
        mode_matrix: BLOCKING_EVERYWHERE,
        precedence: 53,
    },
];

pub fn builtin_signal(code: &str) -> Option<&'static BuiltinSignal> {
    BUILTIN_SIGNALS.iter().find(|signal| signal.code == code)
}

/// Authority export for the `signal-registry` surface: every builtin
/// signal exactly once, sorted by code.
pub fn builtin_registry_json() -> Value {
    let mut signals: Vec<&BuiltinSignal> = BUILTIN_SIGNALS.iter().collect();
    signals.sort_by_key(|signal| signal.code);
    json!({
        "schema": 1,
        "registryKind": "tollgate.builtin_signals.v1",
        "signals": signals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::Tier;
    use std::collections::BTreeSet;

    fn code_is_well_formed(code: &str) -> bool {
        code.strip_prefix("E_").is_some_and(|rest| {
            !rest.is_empty()
                && rest
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        })
    }

    #[test]
    fn builtin_codes_are_unique_and_well_formed() {
        let mut seen = BTreeSet::new();
        for signal in BUILTIN_SIGNALS {
            assert!(
                code_is_well_formed(signal.code),
                "malformed builtin code: {}",
                signal.code
            );
            assert!(seen.insert(signal.code), "duplicate code: {}", signal.code);
        }
    }

    #[test]
    fn lookup_finds_every_declared_code() {
        for signal in BUILTIN_SIGNALS {
            let found = builtin_signal(signal.code);
            assert_eq!(found.map(|s| s.precedence), Some(signal.precedence));
        }
        assert!(builtin_signal("E_NOT_A_BUILTIN").is_none());
    }

    #[test]
    fn sunset_expiry_blocks_only_promotion() {
        let signal = builtin_signal(code::ALIAS_SUNSET_EXPIRED).unwrap();
        assert_eq!(signal.mode_matrix.mode_for(Tier::PrCore), Mode::Advisory);
        assert_eq!(signal.mode_matrix.mode_for(Tier::Release), Mode::Advisory);
        assert_eq!(signal.mode_matrix.mode_for(Tier::Promotion), Mode::Blocking);
    }

    #[test]
    fn hook_failures_block_every_tier() {
        for hook_code in [
            code::HOOK_SPAWN_FAILED,
            code::HOOK_TIMEOUT,
            code::HOOK_EXIT_UNEXPECTED,
            code::HOOK_OUTPUT_UNPARSEABLE,
        ] {
            let signal = builtin_signal(hook_code).unwrap();
            assert_eq!(signal.kind, FailureKind::Execution);
            for tier in Tier::ALL {
                assert_eq!(signal.mode_matrix.mode_for(tier), Mode::Blocking);
            }
        }
    }

    #[test]
    fn registry_json_is_sorted_and_deterministic() {
        let first = builtin_registry_json();
        let second = builtin_registry_json();
        assert_eq!(first, second);
        assert_eq!(
            first.get("registryKind").and_then(Value::as_str),
            Some("tollgate.builtin_signals.v1")
        );

        let codes: Vec<&str> = first["signals"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["code"].as_str().unwrap())
            .collect();
        let mut sorted = codes.clone();
        sorted.sort();
        assert_eq!(codes, sorted);
        assert_eq!(codes.len(), BUILTIN_SIGNALS.len());
    }
}
