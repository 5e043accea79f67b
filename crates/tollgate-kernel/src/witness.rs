//! Failure witnesses and deterministic gate reports.
//!
//! Every evaluation collects ALL applicable failures rather than stopping
//! at the first, so one run surfaces the complete repair list. Two runs
//! over the same inputs MUST produce identical reports: witnesses sort by
//! (code, message, context) and `failures` is the sorted set of distinct
//! codes.

use crate::tier::{Disposition, Mode, Tier};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Taxonomy of failure causes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// A document is malformed or violates its own shape rules.
    Schema,
    /// Recorded state disagrees with recomputed state.
    Drift,
    /// A well-formed input violates a governance rule.
    Policy,
    /// A date-dependent rule (e.g. sunset) is violated.
    Temporal,
    /// An external proof hook failed to run or to answer.
    Execution,
}

/// A single detected failure, before tier disposition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GateFailure {
    /// Stable failure code, `E_[A-Z0-9_]+`.
    pub code: String,

    /// Taxonomy classification.
    pub kind: FailureKind,

    /// Human-readable description.
    pub message: String,

    /// Machine-readable detail map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl GateFailure {
    pub fn new(
        code: impl Into<String>,
        kind: FailureKind,
        message: impl Into<String>,
        context: Option<Value>,
    ) -> Self {
        Self {
            code: code.into(),
            kind,
            message: message.into(),
            context,
        }
    }

    fn sort_key(&self) -> (&str, &str, String) {
        (
            &self.code,
            &self.message,
            self.context
                .as_ref()
                .map(|c| serde_json::to_string(c).unwrap_or_default())
                .unwrap_or_default(),
        )
    }
}

impl PartialOrd for GateFailure {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GateFailure {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// A detected failure after tier disposition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DisposedFailure {
    pub code: String,
    pub kind: FailureKind,
    /// Severity mode the signal's matrix assigned in the evaluated tier.
    pub mode: Mode,
    pub disposition: Disposition,
    /// Audit ordering weight from the signal declaration.
    pub precedence: u32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl DisposedFailure {
    /// Dispose a detected failure under the mode its matrix assigns.
    pub fn new(failure: GateFailure, mode: Mode, precedence: u32) -> Self {
        Self {
            code: failure.code,
            kind: failure.kind,
            mode,
            disposition: mode.dispose(),
            precedence,
            message: failure.message,
            context: failure.context,
        }
    }

    fn sort_key(&self) -> (&str, &str, String) {
        (
            &self.code,
            &self.message,
            self.context
                .as_ref()
                .map(|c| serde_json::to_string(c).unwrap_or_default())
                .unwrap_or_default(),
        )
    }
}

impl PartialOrd for DisposedFailure {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DisposedFailure {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// The result of one evaluation in one tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GateReport {
    /// Schema version (always 1).
    pub schema: u32,

    /// Tier the evaluation ran under.
    pub tier: Tier,

    /// Worst disposition across all witnesses.
    pub disposition: Disposition,

    /// Distinct failure codes, lexicographically sorted.
    pub failures: Vec<String>,

    /// Every failure occurrence, sorted.
    pub witnesses: Vec<DisposedFailure>,

    /// Named outcome tokens (1 = satisfied), e.g. `FREEZE_MODE_STRICT_OK`.
    pub tokens: BTreeMap<String, u8>,
}

impl GateReport {
    /// A report with no failures.
    pub fn passing(tier: Tier) -> Self {
        Self {
            schema: 1,
            tier,
            disposition: Disposition::Pass,
            failures: vec![],
            witnesses: vec![],
            tokens: BTreeMap::new(),
        }
    }

    /// Build a report from disposed witnesses.
    ///
    /// Witnesses are sorted, `failures` is derived as the sorted distinct
    /// codes, and the report disposition is the worst witness disposition.
    pub fn from_witnesses(tier: Tier, mut witnesses: Vec<DisposedFailure>) -> Self {
        witnesses.sort();
        let failures: Vec<String> = witnesses
            .iter()
            .map(|w| w.code.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let disposition = witnesses
            .iter()
            .fold(Disposition::Pass, |acc, w| acc.combine(w.disposition));
        Self {
            schema: 1,
            tier,
            disposition,
            failures,
            witnesses,
            tokens: BTreeMap::new(),
        }
    }

    /// WARN does not block: the report is ok unless it disposes FAIL.
    pub fn ok(&self) -> bool {
        self.disposition.is_ok()
    }

    /// Set a named outcome token.
    pub fn with_token(mut self, key: impl Into<String>, value: u8) -> Self {
        self.tokens.insert(key.into(), value);
        self
    }

    /// Fold another report of the same tier into this one.
    ///
    /// Witnesses and tokens union; disposition and `failures` are
    /// recomputed over the merged witness list.
    pub fn merge(self, other: GateReport) -> Self {
        let tier = self.tier;
        let mut tokens = self.tokens;
        tokens.extend(other.tokens);
        let mut witnesses = self.witnesses;
        witnesses.extend(other.witnesses);
        let mut merged = GateReport::from_witnesses(tier, witnesses);
        merged.tokens = tokens;
        merged
    }
}

/// Outcome token keys surfaced in [`GateReport::tokens`].
pub mod outcome_token {
    pub const CATALOG_CONSISTENT_OK: &str = "CATALOG_CONSISTENT_OK";
    pub const REQUIRED_SETS_ALIGNED_OK: &str = "REQUIRED_SETS_ALIGNED_OK";
    pub const PROMOTION_RECORD_VALID_OK: &str = "PROMOTION_RECORD_VALID_OK";
    pub const FREEZE_MODE_STRICT_OK: &str = "FREEZE_MODE_STRICT_OK";
    pub const CATALOG_LOCK_INTACT_OK: &str = "CATALOG_LOCK_INTACT_OK";
    pub const ALIAS_RESOLVED_OK: &str = "ALIAS_RESOLVED_OK";
    pub const ROLLUP_GREEN_OK: &str = "ROLLUP_GREEN_OK";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warn_witness(code: &str, message: &str) -> DisposedFailure {
        DisposedFailure::new(
            GateFailure::new(code, FailureKind::Policy, message, None),
            Mode::Advisory,
            50,
        )
    }

    fn fail_witness(code: &str, message: &str) -> DisposedFailure {
        DisposedFailure::new(
            GateFailure::new(code, FailureKind::Policy, message, None),
            Mode::Blocking,
            50,
        )
    }

    #[test]
    fn report_sorts_witnesses_and_dedups_codes() {
        let report = GateReport::from_witnesses(
            Tier::Release,
            vec![
                fail_witness("E_ZULU", "second"),
                fail_witness("E_ALPHA", "first"),
                fail_witness("E_ALPHA", "another occurrence"),
            ],
        );
        assert_eq!(report.failures, vec!["E_ALPHA", "E_ZULU"]);
        assert_eq!(report.witnesses.len(), 3);
        assert_eq!(report.witnesses[0].code, "E_ALPHA");
        assert_eq!(report.disposition, Disposition::Fail);
        assert!(!report.ok());
    }

    #[test]
    fn warn_only_report_is_ok() {
        let report =
            GateReport::from_witnesses(Tier::PrCore, vec![warn_witness("E_SOFT", "advisory hit")]);
        assert_eq!(report.disposition, Disposition::Warn);
        assert!(report.ok());
        assert_eq!(report.failures, vec!["E_SOFT"]);
    }

    #[test]
    fn empty_witnesses_dispose_pass() {
        let report = GateReport::from_witnesses(Tier::PrCore, vec![]);
        assert_eq!(report.disposition, Disposition::Pass);
        assert!(report.ok());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn merge_recomputes_disposition_and_unions_tokens() {
        let a = GateReport::passing(Tier::Promotion).with_token(outcome_token::ROLLUP_GREEN_OK, 1);
        let b = GateReport::from_witnesses(
            Tier::Promotion,
            vec![fail_witness("E_LATE", "missing baseline")],
        )
        .with_token(outcome_token::FREEZE_MODE_STRICT_OK, 0);

        let merged = a.merge(b);
        assert_eq!(merged.disposition, Disposition::Fail);
        assert_eq!(merged.failures, vec!["E_LATE"]);
        assert_eq!(
            merged.tokens.get(outcome_token::ROLLUP_GREEN_OK),
            Some(&1u8)
        );
        assert_eq!(
            merged.tokens.get(outcome_token::FREEZE_MODE_STRICT_OK),
            Some(&0u8)
        );
    }

    #[test]
    fn report_serializes_camel_case() {
        let report = GateReport::from_witnesses(Tier::PrCore, vec![warn_witness("E_X", "x")]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["schema"], 1);
        assert_eq!(json["tier"], "prCore");
        assert_eq!(json["disposition"], "warn");
        assert_eq!(json["witnesses"][0]["mode"], "advisory");
        assert_eq!(json["witnesses"][0]["kind"], "policy");
    }

    #[test]
    fn witness_ordering_is_total_over_context() {
        let mut witnesses = vec![
            DisposedFailure::new(
                GateFailure::new(
                    "E_SAME",
                    FailureKind::Schema,
                    "same",
                    Some(serde_json::json!({"n": 2})),
                ),
                Mode::Blocking,
                10,
            ),
            DisposedFailure::new(
                GateFailure::new(
                    "E_SAME",
                    FailureKind::Schema,
                    "same",
                    Some(serde_json::json!({"n": 1})),
                ),
                Mode::Blocking,
                10,
            ),
        ];
        witnesses.sort();
        assert_eq!(witnesses[0].context, Some(serde_json::json!({"n": 1})));
    }
}
