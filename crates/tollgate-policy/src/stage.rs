//! Stage rollout: ordered maturity stages and promotion validation.
//!
//! A stage plan fixes the stage order, the currently active stage, and
//! the metric evidence each stage demands on entry. Promotion records
//! move the plan forward exactly one stage at a time. Structural problems
//! in the plan itself are decode contract errors; every rule violation by
//! an active record is collected, so one evaluation surfaces the full
//! repair list. Inactive records are templates and always valid.

use crate::error::PolicyError;
use crate::profile::ExecutionProfile;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tollgate_kernel::witness::FailureKind;
use tollgate_kernel::{GateFailure, code};

pub const STAGE_PLAN_KIND: &str = "tollgate.stage_plan.v1";
pub const PROMOTION_RECORD_KIND: &str = "tollgate.promotion_record.v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricType {
    Number,
    Percent,
    Boolean,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricSchema {
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
}

impl MetricSchema {
    /// Declared bounds merged with the bounds inherent to the type.
    /// Percent values always live in [0, 100].
    pub fn effective_bounds(&self) -> (Option<f64>, Option<f64>) {
        match self.metric_type {
            MetricType::Percent => (
                Some(self.minimum.unwrap_or(0.0).max(0.0)),
                Some(self.maximum.unwrap_or(100.0).min(100.0)),
            ),
            _ => (self.minimum, self.maximum),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StagePlan {
    pub schema: u32,
    pub plan_kind: String,
    /// Maturity stages in promotion order.
    pub stages: Vec<String>,
    pub active_stage_id: String,
    /// Scope flag that gates each stage's conditional tokens.
    pub stage_to_scope_flag: BTreeMap<String, String>,
    pub promotion_mode_allowed: bool,
    #[serde(default)]
    pub metrics: BTreeMap<String, MetricSchema>,
    #[serde(default)]
    pub required_metrics_by_stage: BTreeMap<String, Vec<String>>,
}

impl StagePlan {
    pub fn stage_index(&self, stage_id: &str) -> Option<usize> {
        self.stages.iter().position(|s| s == stage_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PromotionRecord {
    pub schema: u32,
    pub record_kind: String,
    pub promotion_id: String,
    pub from_stage_id: String,
    pub to_stage_id: String,
    /// Inactive records are templates; they are never validated.
    pub is_active: bool,
    pub approved_by: String,
    pub approved_at_utc: String,
    #[serde(default)]
    pub evidence: BTreeMap<String, Value>,
}

pub fn decode_stage_plan(value: &Value) -> Result<StagePlan, PolicyError> {
    let plan: StagePlan =
        serde_json::from_value(value.clone()).map_err(|source| PolicyError::Decode {
            doc: "stage plan",
            source,
        })?;
    if plan.schema != 1 {
        return Err(PolicyError::Contract(format!(
            "stage plan schema must be 1, got {}",
            plan.schema
        )));
    }
    if plan.plan_kind != STAGE_PLAN_KIND {
        return Err(PolicyError::Contract(format!(
            "planKind must be {STAGE_PLAN_KIND:?}, got {:?}",
            plan.plan_kind
        )));
    }
    if plan.stages.is_empty() {
        return Err(PolicyError::Contract(
            "stage plan must declare at least one stage".to_string(),
        ));
    }
    let mut seen = std::collections::BTreeSet::new();
    for stage in &plan.stages {
        if stage.trim().is_empty() {
            return Err(PolicyError::Contract(
                "stage ids must be non-empty".to_string(),
            ));
        }
        if !seen.insert(stage.as_str()) {
            return Err(PolicyError::Contract(format!(
                "stage '{stage}' is declared more than once"
            )));
        }
    }
    if plan.stage_index(&plan.active_stage_id).is_none() {
        return Err(PolicyError::Contract(format!(
            "activeStageId '{}' is not a declared stage",
            plan.active_stage_id
        )));
    }
    for stage in plan.stage_to_scope_flag.keys() {
        if plan.stage_index(stage).is_none() {
            return Err(PolicyError::Contract(format!(
                "stageToScopeFlag names unknown stage '{stage}'"
            )));
        }
    }
    for (stage, metric_names) in &plan.required_metrics_by_stage {
        if plan.stage_index(stage).is_none() {
            return Err(PolicyError::Contract(format!(
                "requiredMetricsByStage names unknown stage '{stage}'"
            )));
        }
        for name in metric_names {
            if !plan.metrics.contains_key(name) {
                return Err(PolicyError::Contract(format!(
                    "stage '{stage}' requires undeclared metric '{name}'"
                )));
            }
        }
    }
    for (name, schema) in &plan.metrics {
        if let (Some(min), Some(max)) = (schema.minimum, schema.maximum)
            && min > max
        {
            return Err(PolicyError::Contract(format!(
                "metric '{name}' has minimum {min} above maximum {max}"
            )));
        }
        if schema.metric_type == MetricType::Percent {
            for bound in [schema.minimum, schema.maximum].into_iter().flatten() {
                if !(0.0..=100.0).contains(&bound) {
                    return Err(PolicyError::Contract(format!(
                        "percent metric '{name}' declares bound {bound} outside [0, 100]"
                    )));
                }
            }
        }
    }
    Ok(plan)
}

pub fn decode_promotion_record(value: &Value) -> Result<PromotionRecord, PolicyError> {
    let record: PromotionRecord =
        serde_json::from_value(value.clone()).map_err(|source| PolicyError::Decode {
            doc: "promotion record",
            source,
        })?;
    if record.schema != 1 {
        return Err(PolicyError::Contract(format!(
            "promotion record schema must be 1, got {}",
            record.schema
        )));
    }
    if record.record_kind != PROMOTION_RECORD_KIND {
        return Err(PolicyError::Contract(format!(
            "recordKind must be {PROMOTION_RECORD_KIND:?}, got {:?}",
            record.record_kind
        )));
    }
    Ok(record)
}

fn check_metric(name: &str, schema: &MetricSchema, value: &Value) -> Vec<GateFailure> {
    match schema.metric_type {
        MetricType::Boolean => {
            if value.is_boolean() {
                vec![]
            } else {
                vec![GateFailure::new(
                    code::PROMOTION_METRIC_TYPE_MISMATCH,
                    FailureKind::Schema,
                    format!("metric '{name}' must be a JSON boolean, got {value}"),
                    Some(json!({"metric": name, "value": value})),
                )]
            }
        }
        MetricType::Number | MetricType::Percent => {
            let Some(number) = value.as_f64() else {
                return vec![GateFailure::new(
                    code::PROMOTION_METRIC_TYPE_MISMATCH,
                    FailureKind::Schema,
                    format!("metric '{name}' must be a JSON number, got {value}"),
                    Some(json!({"metric": name, "value": value})),
                )];
            };
            let mut out = Vec::new();
            if number < 0.0 {
                out.push(GateFailure::new(
                    code::PROMOTION_METRIC_NEGATIVE,
                    FailureKind::Policy,
                    format!("metric '{name}' must not be negative, got {number}"),
                    Some(json!({"metric": name, "value": number})),
                ));
            }
            let (minimum, maximum) = schema.effective_bounds();
            let below = minimum.is_some_and(|min| number < min);
            let above = maximum.is_some_and(|max| number > max);
            if below || above {
                out.push(GateFailure::new(
                    code::PROMOTION_METRIC_OUT_OF_RANGE,
                    FailureKind::Policy,
                    format!("metric '{name}' value {number} is outside its allowed range"),
                    Some(json!({
                        "metric": name,
                        "value": number,
                        "minimum": minimum,
                        "maximum": maximum,
                    })),
                ));
            }
            out
        }
    }
}

/// Validate an active promotion record against its plan and profile.
pub fn validate_promotion(
    plan: &StagePlan,
    record: &PromotionRecord,
    profile: &ExecutionProfile,
) -> Vec<GateFailure> {
    if !record.is_active {
        return vec![];
    }

    let mut failures = Vec::new();

    for (label, value) in [
        ("promotionId", &record.promotion_id),
        ("fromStageId", &record.from_stage_id),
        ("toStageId", &record.to_stage_id),
        ("approvedBy", &record.approved_by),
    ] {
        if value.trim().is_empty() {
            failures.push(GateFailure::new(
                code::PROMOTION_RECORD_MALFORMED,
                FailureKind::Schema,
                format!("active promotion record field {label} must be non-empty"),
                Some(json!({"field": label})),
            ));
        }
    }
    if chrono::DateTime::parse_from_rfc3339(&record.approved_at_utc).is_err() {
        failures.push(GateFailure::new(
            code::PROMOTION_RECORD_MALFORMED,
            FailureKind::Schema,
            format!(
                "approvedAtUtc must be an RFC 3339 timestamp, got '{}'",
                record.approved_at_utc
            ),
            Some(json!({"field": "approvedAtUtc", "value": record.approved_at_utc})),
        ));
    }

    if !plan.promotion_mode_allowed {
        failures.push(GateFailure::new(
            code::PROMOTION_MODE_DISABLED,
            FailureKind::Policy,
            "stage plan does not allow promotions",
            Some(json!({"activeStageId": plan.active_stage_id})),
        ));
    }

    let from_idx = plan.stage_index(&record.from_stage_id);
    let to_idx = plan.stage_index(&record.to_stage_id);
    for (label, stage_id, idx) in [
        ("fromStageId", &record.from_stage_id, from_idx),
        ("toStageId", &record.to_stage_id, to_idx),
    ] {
        if idx.is_none() && !stage_id.trim().is_empty() {
            failures.push(GateFailure::new(
                code::PROMOTION_STAGE_UNKNOWN,
                FailureKind::Policy,
                format!("{label} '{stage_id}' is not a declared stage"),
                Some(json!({"field": label, "stageId": stage_id})),
            ));
        }
    }

    if let Some(from) = from_idx {
        if record.from_stage_id != plan.active_stage_id {
            failures.push(GateFailure::new(
                code::PROMOTION_BASE_MISMATCH,
                FailureKind::Policy,
                format!(
                    "promotion starts from '{}' but the active stage is '{}'",
                    record.from_stage_id, plan.active_stage_id
                ),
                Some(json!({
                    "fromStageId": record.from_stage_id,
                    "activeStageId": plan.active_stage_id,
                })),
            ));
        }
        if let Some(to) = to_idx
            && to != from + 1
        {
            failures.push(GateFailure::new(
                code::PROMOTION_NOT_ADJACENT,
                FailureKind::Policy,
                format!(
                    "promotion must advance exactly one stage ('{}' -> '{}')",
                    record.from_stage_id, record.to_stage_id
                ),
                Some(json!({
                    "fromStageId": record.from_stage_id,
                    "toStageId": record.to_stage_id,
                    "fromIndex": from,
                    "toIndex": to,
                })),
            ));
        }
    }

    if to_idx.is_some() {
        let required = plan
            .required_metrics_by_stage
            .get(&record.to_stage_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        for name in required {
            // Decode guarantees every required metric has a schema.
            let Some(schema) = plan.metrics.get(name) else {
                continue;
            };
            match record.evidence.get(name) {
                None => failures.push(GateFailure::new(
                    code::PROMOTION_REQUIRED_METRIC_MISSING,
                    FailureKind::Policy,
                    format!(
                        "promotion into '{}' requires metric '{name}'",
                        record.to_stage_id
                    ),
                    Some(json!({"metric": name, "toStageId": record.to_stage_id})),
                )),
                Some(value) => failures.extend(check_metric(name, schema, value)),
            }
        }

        match plan.stage_to_scope_flag.get(&record.to_stage_id) {
            None => failures.push(GateFailure::new(
                code::PROMOTION_SCOPE_FLAG_UNKNOWN,
                FailureKind::Schema,
                format!(
                    "stage '{}' has no scope flag mapping",
                    record.to_stage_id
                ),
                Some(json!({"toStageId": record.to_stage_id})),
            )),
            Some(flag_id) if !profile.declares_flag(flag_id) => {
                failures.push(GateFailure::new(
                    code::PROMOTION_SCOPE_FLAG_UNKNOWN,
                    FailureKind::Schema,
                    format!(
                        "stage '{}' maps to undeclared scope flag '{flag_id}'",
                        record.to_stage_id
                    ),
                    Some(json!({"toStageId": record.to_stage_id, "flagId": flag_id})),
                ));
            }
            Some(_) => {}
        }
    }

    failures.sort();
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::decode_execution_profile;

    fn plan() -> StagePlan {
        decode_stage_plan(&serde_json::json!({
            "schema": 1,
            "planKind": "tollgate.stage_plan.v1",
            "stages": ["shadow", "canary", "general"],
            "activeStageId": "shadow",
            "stageToScopeFlag": {
                "shadow": "shadow_rollout",
                "canary": "canary_rollout",
                "general": "general_rollout"
            },
            "promotionModeAllowed": true,
            "metrics": {
                "errorRatePercent": {"type": "percent", "maximum": 1.0},
                "latencyP99Ms": {"type": "number", "minimum": 0.0, "maximum": 500.0},
                "alarmsQuiet": {"type": "boolean"}
            },
            "requiredMetricsByStage": {
                "canary": ["errorRatePercent", "alarmsQuiet"],
                "general": ["errorRatePercent", "latencyP99Ms", "alarmsQuiet"]
            }
        }))
        .unwrap()
    }

    fn profile() -> ExecutionProfile {
        decode_execution_profile(&serde_json::json!({
            "schema": 1,
            "profileKind": "tollgate.execution_profile.v1",
            "scopeFlags": [
                {"flagId": "shadow_rollout", "defaultEnabled": true},
                {"flagId": "canary_rollout", "defaultEnabled": false},
                {"flagId": "general_rollout", "defaultEnabled": false}
            ],
            "tierSets": {}
        }))
        .unwrap()
    }

    fn record() -> PromotionRecord {
        decode_promotion_record(&serde_json::json!({
            "schema": 1,
            "recordKind": "tollgate.promotion_record.v1",
            "promotionId": "promo-0042",
            "fromStageId": "shadow",
            "toStageId": "canary",
            "isActive": true,
            "approvedBy": "release-captain",
            "approvedAtUtc": "2025-11-03T17:20:00Z",
            "evidence": {
                "errorRatePercent": 0.4,
                "alarmsQuiet": true
            }
        }))
        .unwrap()
    }

    fn codes(failures: &[GateFailure]) -> Vec<&str> {
        failures.iter().map(|f| f.code.as_str()).collect()
    }

    #[test]
    fn valid_one_step_promotion_passes() {
        let failures = validate_promotion(&plan(), &record(), &profile());
        assert!(failures.is_empty(), "unexpected failures: {failures:?}");
    }

    #[test]
    fn inactive_record_is_always_valid() {
        let mut r = record();
        r.is_active = false;
        r.promotion_id = String::new();
        r.to_stage_id = "nowhere".to_string();
        r.approved_at_utc = "not a timestamp".to_string();
        assert!(validate_promotion(&plan(), &r, &profile()).is_empty());
    }

    #[test]
    fn promotion_mode_disabled_blocks_active_records() {
        let mut p = plan();
        p.promotion_mode_allowed = false;
        let failures = validate_promotion(&p, &record(), &profile());
        assert_eq!(codes(&failures), [code::PROMOTION_MODE_DISABLED]);
    }

    #[test]
    fn base_mismatch_is_reported() {
        let mut p = plan();
        p.active_stage_id = "canary".to_string();
        // Record still promotes shadow -> canary while canary is active.
        let failures = validate_promotion(&p, &record(), &profile());
        assert_eq!(codes(&failures), [code::PROMOTION_BASE_MISMATCH]);
    }

    #[test]
    fn skipping_a_stage_is_not_adjacent() {
        let mut r = record();
        r.to_stage_id = "general".to_string();
        r.evidence.insert("latencyP99Ms".to_string(), json!(120.0));
        let failures = validate_promotion(&plan(), &r, &profile());
        assert_eq!(codes(&failures), [code::PROMOTION_NOT_ADJACENT]);
    }

    #[test]
    fn backward_and_self_promotions_are_not_adjacent() {
        let mut p = plan();
        p.active_stage_id = "canary".to_string();

        let mut backward = record();
        backward.from_stage_id = "canary".to_string();
        backward.to_stage_id = "shadow".to_string();
        let failures = validate_promotion(&p, &backward, &profile());
        assert!(codes(&failures).contains(&code::PROMOTION_NOT_ADJACENT));

        let mut stay = record();
        stay.from_stage_id = "canary".to_string();
        stay.to_stage_id = "canary".to_string();
        let failures = validate_promotion(&p, &stay, &profile());
        assert!(codes(&failures).contains(&code::PROMOTION_NOT_ADJACENT));
    }

    #[test]
    fn unknown_stages_are_reported() {
        let mut r = record();
        r.to_stage_id = "hypercare".to_string();
        let failures = validate_promotion(&plan(), &r, &profile());
        assert_eq!(codes(&failures), [code::PROMOTION_STAGE_UNKNOWN]);
    }

    #[test]
    fn missing_required_metric_is_reported() {
        let mut r = record();
        r.evidence.remove("alarmsQuiet");
        let failures = validate_promotion(&plan(), &r, &profile());
        assert_eq!(codes(&failures), [code::PROMOTION_REQUIRED_METRIC_MISSING]);
        assert_eq!(
            failures[0].context.as_ref().unwrap()["metric"],
            "alarmsQuiet"
        );
    }

    #[test]
    fn metric_type_mismatches_are_reported() {
        let mut r = record();
        r.evidence
            .insert("errorRatePercent".to_string(), json!("0.4"));
        r.evidence.insert("alarmsQuiet".to_string(), json!(1));
        let failures = validate_promotion(&plan(), &r, &profile());
        assert_eq!(
            codes(&failures),
            [
                code::PROMOTION_METRIC_TYPE_MISMATCH,
                code::PROMOTION_METRIC_TYPE_MISMATCH
            ]
        );
    }

    #[test]
    fn negative_percent_raises_both_negative_and_range() {
        let mut r = record();
        r.evidence
            .insert("errorRatePercent".to_string(), json!(-0.5));
        let failures = validate_promotion(&plan(), &r, &profile());
        assert_eq!(
            codes(&failures),
            [
                code::PROMOTION_METRIC_NEGATIVE,
                code::PROMOTION_METRIC_OUT_OF_RANGE
            ]
        );
    }

    #[test]
    fn percent_above_hundred_is_out_of_range_even_unbounded() {
        let mut p = plan();
        p.metrics.insert(
            "coveragePercent".to_string(),
            MetricSchema {
                metric_type: MetricType::Percent,
                minimum: None,
                maximum: None,
            },
        );
        p.required_metrics_by_stage
            .get_mut("canary")
            .unwrap()
            .push("coveragePercent".to_string());
        let mut r = record();
        r.evidence.insert("coveragePercent".to_string(), json!(104.0));
        let failures = validate_promotion(&p, &r, &profile());
        assert_eq!(codes(&failures), [code::PROMOTION_METRIC_OUT_OF_RANGE]);
    }

    #[test]
    fn out_of_declared_range_is_reported() {
        let mut r = record();
        r.evidence.insert("errorRatePercent".to_string(), json!(3.2));
        let failures = validate_promotion(&plan(), &r, &profile());
        assert_eq!(codes(&failures), [code::PROMOTION_METRIC_OUT_OF_RANGE]);
        let context = failures[0].context.as_ref().unwrap();
        assert_eq!(context["maximum"], 1.0);
    }

    #[test]
    fn scope_flag_mapping_is_checked_for_the_target_stage() {
        let mut p = plan();
        p.stage_to_scope_flag.remove("canary");
        let failures = validate_promotion(&p, &record(), &profile());
        assert_eq!(codes(&failures), [code::PROMOTION_SCOPE_FLAG_UNKNOWN]);

        let mut p = plan();
        p.stage_to_scope_flag
            .insert("canary".to_string(), "flag_nobody_declared".to_string());
        let failures = validate_promotion(&p, &record(), &profile());
        assert_eq!(codes(&failures), [code::PROMOTION_SCOPE_FLAG_UNKNOWN]);
    }

    #[test]
    fn malformed_record_fields_are_collected_together() {
        let mut r = record();
        r.promotion_id = "  ".to_string();
        r.approved_by = String::new();
        r.approved_at_utc = "yesterday".to_string();
        let failures = validate_promotion(&plan(), &r, &profile());
        let malformed: Vec<_> = failures
            .iter()
            .filter(|f| f.code == code::PROMOTION_RECORD_MALFORMED)
            .collect();
        assert_eq!(malformed.len(), 3);
    }

    #[test]
    fn every_failure_surfaces_in_one_pass() {
        let mut p = plan();
        p.promotion_mode_allowed = false;
        p.active_stage_id = "canary".to_string();
        let mut r = record();
        r.evidence.remove("alarmsQuiet");
        r.evidence.insert("errorRatePercent".to_string(), json!(2.0));

        let failures = validate_promotion(&p, &r, &profile());
        let got = codes(&failures);
        for expected in [
            code::PROMOTION_MODE_DISABLED,
            code::PROMOTION_BASE_MISMATCH,
            code::PROMOTION_REQUIRED_METRIC_MISSING,
            code::PROMOTION_METRIC_OUT_OF_RANGE,
        ] {
            assert!(got.contains(&expected), "missing {expected} in {got:?}");
        }
        let mut sorted = got.clone();
        sorted.sort();
        assert_eq!(got, sorted, "failures must come back sorted");
    }

    #[test]
    fn plan_decode_rejects_structural_problems() {
        let base = serde_json::json!({
            "schema": 1,
            "planKind": "tollgate.stage_plan.v1",
            "stages": ["shadow", "shadow"],
            "activeStageId": "shadow",
            "stageToScopeFlag": {},
            "promotionModeAllowed": true
        });
        assert!(decode_stage_plan(&base).is_err());

        let unknown_active = serde_json::json!({
            "schema": 1,
            "planKind": "tollgate.stage_plan.v1",
            "stages": ["shadow"],
            "activeStageId": "canary",
            "stageToScopeFlag": {},
            "promotionModeAllowed": true
        });
        assert!(decode_stage_plan(&unknown_active).is_err());

        let ghost_metric = serde_json::json!({
            "schema": 1,
            "planKind": "tollgate.stage_plan.v1",
            "stages": ["shadow"],
            "activeStageId": "shadow",
            "stageToScopeFlag": {},
            "promotionModeAllowed": true,
            "requiredMetricsByStage": {"shadow": ["undeclared"]}
        });
        assert!(decode_stage_plan(&ghost_metric).is_err());

        let bad_percent = serde_json::json!({
            "schema": 1,
            "planKind": "tollgate.stage_plan.v1",
            "stages": ["shadow"],
            "activeStageId": "shadow",
            "stageToScopeFlag": {},
            "promotionModeAllowed": true,
            "metrics": {"p": {"type": "percent", "maximum": 140.0}}
        });
        assert!(decode_stage_plan(&bad_percent).is_err());
    }
}
