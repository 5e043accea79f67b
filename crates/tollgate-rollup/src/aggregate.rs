//! Rollup aggregation: hook answers for a required set, disposed into
//! one gate report.

use crate::hook::run_hook;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tollgate_catalog::{SignalIndex, TokenCatalog};
use tollgate_kernel::witness::FailureKind;
use tollgate_kernel::{GateFailure, GateReport, Tier, code, outcome_token};
use tollgate_policy::{FREEZE_TOKEN_KEY, FreezeOutcome};

/// Hook answers for every required token, plus the execution failures
/// of the hooks that failed to answer.
#[derive(Debug, Clone, Default)]
pub struct CollectedRollups {
    pub values: BTreeMap<String, u8>,
    pub execution_failures: Vec<GateFailure>,
}

/// Run the hook of every required token, in sorted token order.
///
/// A token without a catalog entry or whose hook fails to answer rolls
/// up 0. Fail closed, never open.
pub fn collect_rollups(
    catalog: &TokenCatalog,
    required: &BTreeSet<String>,
    timeout: Duration,
) -> CollectedRollups {
    let mut collected = CollectedRollups::default();
    for token_id in required {
        let value = match catalog.token(token_id) {
            Some(token) => match run_hook(&token.proof_hook_ref, timeout) {
                Ok(value) => value,
                Err(failure) => {
                    collected.execution_failures.push(failure);
                    0
                }
            },
            None => 0,
        };
        collected.values.insert(token_id.clone(), value);
    }
    collected
}

/// Dispose rollup values for one tier.
///
/// Every required token that did not roll up 1 raises the failure
/// signal its catalog entry declares; a required token absent from the
/// catalog cannot resolve a signal and is reported as such. Execution
/// failures ride along under their own codes. The report echoes every
/// required token's value and sets `ROLLUP_GREEN_OK` only when nothing
/// at all went wrong, advisory or not.
pub fn evaluate_rollups(
    tier: Tier,
    catalog: &TokenCatalog,
    required: &BTreeSet<String>,
    rollups: &BTreeMap<String, u8>,
    execution_failures: Vec<GateFailure>,
    index: &SignalIndex,
) -> GateReport {
    let mut failures = execution_failures;

    for token_id in required {
        let value = rollups.get(token_id).copied().unwrap_or(0);
        if value == 1 {
            continue;
        }
        match catalog.token(token_id) {
            Some(token) => failures.push(GateFailure::new(
                token.fail_signal_code.clone(),
                FailureKind::Policy,
                format!("required token '{token_id}' did not roll up green"),
                Some(json!({"tokenId": token_id, "value": value})),
            )),
            None => failures.push(GateFailure::new(
                code::FAILSIGNAL_UNRESOLVED,
                FailureKind::Schema,
                format!("required token '{token_id}' is not declared in the token catalog"),
                Some(json!({"tokenId": token_id})),
            )),
        }
    }

    let witnesses = index.dispose_all(failures, tier);
    let mut report = GateReport::from_witnesses(tier, witnesses);
    let green = u8::from(report.witnesses.is_empty());
    for token_id in required {
        report
            .tokens
            .insert(token_id.clone(), rollups.get(token_id).copied().unwrap_or(0));
    }
    report
        .tokens
        .insert(outcome_token::ROLLUP_GREEN_OK.to_string(), green);
    report
}

/// Fold a freeze evaluation into a rollup report of the same tier.
pub fn fold_freeze(report: GateReport, outcome: &FreezeOutcome, index: &SignalIndex) -> GateReport {
    let tier = report.tier;
    let witnesses = index.dispose_all(outcome.failures(), tier);
    let freeze_report = GateReport::from_witnesses(tier, witnesses)
        .with_token(FREEZE_TOKEN_KEY, outcome.token_value());
    report.merge(freeze_report)
}
