use crate::config::{
    DEFAULT_CLAIMED_PATH, DEFAULT_PROFILE_PATH, load_config, resolve_path,
};
use crate::support::{
    emit_error, finish_with_report, ok_or_exit, parse_tier_or_exit, print_json,
    read_document_or_exit,
};
use chrono::Utc;
use serde_json::{Value, json};
use tollgate_catalog::SignalIndex;
use tollgate_kernel::{GateReport, outcome_token};
use tollgate_policy::decode_execution_profile;
use tollgate_store::{
    audit_required_sets_doc, build_required_sets_doc, decode_required_sets_doc, write_json_atomic,
};

pub fn run_generate(
    profile: Option<String>,
    out: Option<String>,
    config: Option<String>,
    json_output: bool,
) {
    let cfg = load_config(config.as_deref());
    let profile_path = resolve_path(profile, cfg.documents.profile.as_ref(), DEFAULT_PROFILE_PATH);

    let profile_value = read_document_or_exit(&profile_path, "execution profile");
    let profile = ok_or_exit(decode_execution_profile(&profile_value));

    let doc = build_required_sets_doc(&profile_value, &profile, Utc::now());
    let document = serde_json::to_value(&doc)
        .unwrap_or_else(|err| emit_error(format!("failed to render sets: {err}")));

    if let Some(out_path) = &out {
        ok_or_exit(write_json_atomic(out_path, &document));
    }

    if json_output {
        print_json(&json!({
            "action": "required-set",
            "ok": true,
            "profilePath": profile_path,
            "outPath": out,
            "document": document,
        }));
        return;
    }

    println!("tollgate required-set");
    println!("  Profile: {profile_path}");
    println!("  Profile digest: {}", doc.profile_digest);
    for (name, set) in doc.sets.named() {
        println!("  {name}: {} token(s)", set.len());
    }
    if let Some(out_path) = &out {
        println!("  Wrote: {out_path}");
    }
}

pub fn run_check(
    profile: Option<String>,
    claimed: Option<String>,
    tier: String,
    config: Option<String>,
    json_output: bool,
) {
    let cfg = load_config(config.as_deref());
    let tier = parse_tier_or_exit(&tier);
    let profile_path = resolve_path(profile, cfg.documents.profile.as_ref(), DEFAULT_PROFILE_PATH);
    let claimed_path = resolve_path(claimed, cfg.documents.claimed.as_ref(), DEFAULT_CLAIMED_PATH);

    let profile_value = read_document_or_exit(&profile_path, "execution profile");
    let profile = ok_or_exit(decode_execution_profile(&profile_value));
    let claimed_value = read_document_or_exit(&claimed_path, "required-set artifact");
    let doc = ok_or_exit(decode_required_sets_doc(&claimed_value));

    let failures = audit_required_sets_doc(&doc, &profile_value, &profile);
    let index = SignalIndex::builtin_only();
    let witnesses = index.dispose_all(failures, tier);
    let report = GateReport::from_witnesses(tier, witnesses);
    let ok = report.ok();
    let report = report.with_token(outcome_token::REQUIRED_SETS_ALIGNED_OK, u8::from(ok));

    finish_with_report(
        "required-set-check",
        report,
        vec![
            ("profilePath", json!(profile_path)),
            ("claimedPath", json!(claimed_path)),
            ("recordedProfileDigest", Value::String(doc.profile_digest)),
        ],
        json_output,
    );
}
