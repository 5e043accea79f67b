use std::collections::BTreeMap;

use crate::config::{DEFAULT_PROFILE_PATH, DEFAULT_ROLLUPS_PATH, load_config, resolve_path};
use crate::support::{
    FREEZE_FLAG_ID, emit_error, finish_with_report, ok_or_exit, parse_tier_or_exit,
    read_document_or_exit,
};
use serde_json::json;
use tollgate_catalog::SignalIndex;
use tollgate_kernel::GateReport;
use tollgate_policy::{
    FREEZE_TOKEN_KEY, decode_execution_profile, evaluate_freeze, generate_required_sets,
};

/// Audit recorded rollup values against the freeze-mode baseline.
///
/// This reads a rollup snapshot from disk and never executes hooks; use
/// `rollup-run` to produce fresh values.
pub fn run(
    profile: Option<String>,
    rollups: Option<String>,
    freeze: bool,
    tier: String,
    config: Option<String>,
    json_output: bool,
) {
    let cfg = load_config(config.as_deref());
    let tier = parse_tier_or_exit(&tier);
    let profile_path = resolve_path(profile, cfg.documents.profile.as_ref(), DEFAULT_PROFILE_PATH);
    let rollups_path = resolve_path(rollups, cfg.documents.rollups.as_ref(), DEFAULT_ROLLUPS_PATH);

    let profile_value = read_document_or_exit(&profile_path, "execution profile");
    let profile = ok_or_exit(decode_execution_profile(&profile_value));
    let rollups_value = read_document_or_exit(&rollups_path, "rollup snapshot");
    let recorded: BTreeMap<String, u8> = serde_json::from_value(rollups_value)
        .unwrap_or_else(|err| {
            emit_error(format!(
                "rollup snapshot must map token ids to 0 or 1: {err}"
            ))
        });
    for (token_id, value) in &recorded {
        if *value > 1 {
            emit_error(format!(
                "rollup value for '{token_id}' must be 0 or 1, got {value}"
            ));
        }
    }

    let baseline = generate_required_sets(&profile).freeze_mode;
    let enabled = freeze || profile.flag_enabled(FREEZE_FLAG_ID).unwrap_or(false);
    let outcome = evaluate_freeze(&recorded, enabled, &baseline);

    let index = SignalIndex::builtin_only();
    let witnesses = index.dispose_all(outcome.failures(), tier);
    let report = GateReport::from_witnesses(tier, witnesses)
        .with_token(FREEZE_TOKEN_KEY, outcome.token_value());

    finish_with_report(
        "freeze-check",
        report,
        vec![
            ("profilePath", json!(profile_path)),
            ("rollupsPath", json!(rollups_path)),
            ("freezeEnabled", json!(outcome.enabled)),
            ("baselineCount", json!(baseline.len())),
            ("missingTokens", json!(outcome.missing_tokens)),
        ],
        json_output,
    );
}
