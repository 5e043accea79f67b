use crate::config::{DEFAULT_CANON_PATH, load_config, resolve_path};
use crate::support::{
    exit_for, ok_or_exit, parse_date_or_exit, parse_tier_or_exit, print_human_report, print_json,
    read_document_or_exit, report_payload,
};
use chrono::Utc;
use serde_json::json;
use tollgate_catalog::SignalIndex;
use tollgate_kernel::{GateReport, outcome_token};
use tollgate_policy::{decode_alias_canon, resolve_alias};

pub fn run(
    id: String,
    canon: Option<String>,
    tier: String,
    today: Option<String>,
    config: Option<String>,
    json_output: bool,
) {
    let cfg = load_config(config.as_deref());
    let tier = parse_tier_or_exit(&tier);
    let today = today
        .as_deref()
        .map(parse_date_or_exit)
        .unwrap_or_else(|| Utc::now().date_naive());
    let canon_path = resolve_path(canon, cfg.documents.canon.as_ref(), DEFAULT_CANON_PATH);

    let canon_value = read_document_or_exit(&canon_path, "alias canon");
    let canon = ok_or_exit(decode_alias_canon(&canon_value));

    let index = SignalIndex::builtin_only();
    let resolution = resolve_alias(&canon, &id, tier, today, &index);
    let report = GateReport::from_witnesses(tier, resolution.witnesses.clone())
        .with_token(outcome_token::ALIAS_RESOLVED_OK, u8::from(resolution.ok()));

    if json_output {
        let payload = report_payload(
            "alias-resolve",
            &report,
            vec![
                ("inputId", json!(resolution.input_id)),
                ("canonicalId", json!(resolution.canonical_id)),
                ("warnings", json!(resolution.warnings)),
                ("canonPath", json!(canon_path)),
                ("today", json!(today.to_string())),
            ],
        );
        print_json(&payload);
    } else {
        print_human_report("alias-resolve", &report);
        println!("  Input: {}", resolution.input_id);
        println!("  Canonical: {}", resolution.canonical_id);
        for warning in &resolution.warnings {
            println!("  warning: {warning}");
        }
    }
    exit_for(&report);
}
