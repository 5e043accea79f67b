//! Catalog consistency validation.
//!
//! One pass collects every applicable failure; validation never stops at
//! the first finding, so a single run surfaces the complete repair list.
//! The returned failures are sorted.

use crate::doc::{FailSignalRegistry, TokenCatalog};
use regex::Regex;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tollgate_kernel::witness::FailureKind;
use tollgate_kernel::{GateFailure, code};

fn code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^E_[A-Z0-9_]+$").expect("failure-code regex must compile"))
}

/// Cross-check a token catalog against its fail-signal registry.
pub fn validate_catalog(
    catalog: &TokenCatalog,
    registry: &FailSignalRegistry,
) -> Vec<GateFailure> {
    let mut failures = Vec::new();

    let mut token_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for token in &catalog.tokens {
        *token_counts.entry(token.token_id.as_str()).or_default() += 1;
    }
    for (token_id, count) in &token_counts {
        if *count > 1 {
            failures.push(GateFailure::new(
                code::TOKEN_ID_DUPLICATE,
                FailureKind::Schema,
                format!("tokenId '{token_id}' is declared {count} times"),
                Some(json!({"tokenId": token_id, "count": count})),
            ));
        }
    }

    let mut code_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for signal in &registry.signals {
        *code_counts.entry(signal.code.as_str()).or_default() += 1;
    }
    for (signal_code, count) in &code_counts {
        if *count > 1 {
            failures.push(GateFailure::new(
                code::FAILSIGNAL_CODE_DUPLICATE,
                FailureKind::Schema,
                format!("failSignal code '{signal_code}' is declared {count} times"),
                Some(json!({"code": signal_code, "count": count})),
            ));
        }
    }

    for signal in &registry.signals {
        if !code_re().is_match(&signal.code) {
            failures.push(GateFailure::new(
                code::FAILSIGNAL_CODE_MALFORMED,
                FailureKind::Schema,
                format!("failSignal code '{}' does not match E_[A-Z0-9_]+", signal.code),
                Some(json!({"code": signal.code})),
            ));
        }
        if signal.blocking && !signal.has_negative_test_ref() {
            failures.push(GateFailure::new(
                code::NEGATIVE_TEST_REF_MISSING,
                FailureKind::Policy,
                format!(
                    "blocking signal '{}' has no negativeTestRef proving it can fire",
                    signal.code
                ),
                Some(json!({"code": signal.code})),
            ));
        }
        if signal.precedence_u32().is_none() {
            failures.push(GateFailure::new(
                code::PRECEDENCE_INVALID,
                FailureKind::Schema,
                format!(
                    "signal '{}' precedence must be a non-negative integer, got {}",
                    signal.code, signal.precedence
                ),
                Some(json!({"code": signal.code, "precedence": signal.precedence})),
            ));
        }
    }

    for token in &catalog.tokens {
        if registry.signal(&token.fail_signal_code).is_none() {
            failures.push(GateFailure::new(
                code::FAILSIGNAL_UNRESOLVED,
                FailureKind::Schema,
                format!(
                    "token '{}' references undeclared failSignal '{}'",
                    token.token_id, token.fail_signal_code
                ),
                Some(json!({
                    "tokenId": token.token_id,
                    "failSignalCode": token.fail_signal_code,
                })),
            ));
        }
    }

    failures.sort();
    failures
}
