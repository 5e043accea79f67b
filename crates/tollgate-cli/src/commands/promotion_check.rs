use crate::config::{
    DEFAULT_PLAN_PATH, DEFAULT_PROFILE_PATH, DEFAULT_RECORD_PATH, load_config, resolve_path,
};
use crate::support::{finish_with_report, ok_or_exit, parse_tier_or_exit, read_document_or_exit};
use serde_json::json;
use tollgate_catalog::SignalIndex;
use tollgate_kernel::{GateReport, outcome_token};
use tollgate_policy::{
    decode_execution_profile, decode_promotion_record, decode_stage_plan, validate_promotion,
};

pub fn run(
    plan: Option<String>,
    record: Option<String>,
    profile: Option<String>,
    tier: String,
    config: Option<String>,
    json_output: bool,
) {
    let cfg = load_config(config.as_deref());
    let tier = parse_tier_or_exit(&tier);
    let plan_path = resolve_path(plan, cfg.documents.plan.as_ref(), DEFAULT_PLAN_PATH);
    let record_path = resolve_path(record, cfg.documents.record.as_ref(), DEFAULT_RECORD_PATH);
    let profile_path = resolve_path(profile, cfg.documents.profile.as_ref(), DEFAULT_PROFILE_PATH);

    let plan_value = read_document_or_exit(&plan_path, "stage plan");
    let plan = ok_or_exit(decode_stage_plan(&plan_value));
    let record_value = read_document_or_exit(&record_path, "promotion record");
    let record = ok_or_exit(decode_promotion_record(&record_value));
    let profile_value = read_document_or_exit(&profile_path, "execution profile");
    let profile = ok_or_exit(decode_execution_profile(&profile_value));

    let failures = validate_promotion(&plan, &record, &profile);
    let index = SignalIndex::builtin_only();
    let witnesses = index.dispose_all(failures, tier);
    let report = GateReport::from_witnesses(tier, witnesses);
    let ok = report.ok();
    let report = report.with_token(outcome_token::PROMOTION_RECORD_VALID_OK, u8::from(ok));

    finish_with_report(
        "promotion-check",
        report,
        vec![
            ("planPath", json!(plan_path)),
            ("recordPath", json!(record_path)),
            ("profilePath", json!(profile_path)),
            ("promotionId", json!(record.promotion_id)),
            ("fromStageId", json!(record.from_stage_id)),
            ("toStageId", json!(record.to_stage_id)),
            ("isActive", json!(record.is_active)),
        ],
        json_output,
    );
}
