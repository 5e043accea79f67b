use crate::config::{DEFAULT_CATALOG_PATH, DEFAULT_LOCK_PATH, load_config, resolve_path};
use crate::support::{
    emit_error, finish_with_report, ok_or_exit, parse_tier_or_exit, print_json,
    read_document_or_exit,
};
use chrono::Utc;
use serde_json::json;
use tollgate_catalog::SignalIndex;
use tollgate_kernel::{GateReport, outcome_token};
use tollgate_store::{compute_lock, decode_lock, verify_lock, write_json_atomic};

/// Digest a catalog declaration and write the lock beside it.
pub fn run_write(
    declaration: Option<String>,
    name: String,
    out: Option<String>,
    config: Option<String>,
    json_output: bool,
) {
    let cfg = load_config(config.as_deref());
    let declaration_path = resolve_path(
        declaration,
        cfg.documents.declaration.as_ref(),
        DEFAULT_CATALOG_PATH,
    );
    let out_path = resolve_path(out, cfg.documents.lock.as_ref(), DEFAULT_LOCK_PATH);

    let source = read_document_or_exit(&declaration_path, "catalog declaration");
    let lock = compute_lock(&source, &name, Utc::now());
    let lock_value = serde_json::to_value(&lock)
        .unwrap_or_else(|err| emit_error(format!("failed to render lock: {err}")));
    ok_or_exit(write_json_atomic(&out_path, &lock_value));

    if json_output {
        print_json(&json!({
            "action": "lock-write",
            "ok": true,
            "declarationPath": declaration_path,
            "outPath": out_path,
            "lock": lock_value,
        }));
    } else {
        println!("tollgate lock-write");
        println!("  Source: {declaration_path}");
        println!("  Canonical name: {}", lock.canonical_source_name);
        println!("  Digest: {}", lock.digest_hex);
        println!("  Wrote: {out_path}");
    }
}

/// Recompute the declaration digest and compare it to the recorded lock.
pub fn run_verify(
    declaration: Option<String>,
    lock: Option<String>,
    tier: String,
    config: Option<String>,
    json_output: bool,
) {
    let cfg = load_config(config.as_deref());
    let tier = parse_tier_or_exit(&tier);
    let declaration_path = resolve_path(
        declaration,
        cfg.documents.declaration.as_ref(),
        DEFAULT_CATALOG_PATH,
    );
    let lock_path = resolve_path(lock, cfg.documents.lock.as_ref(), DEFAULT_LOCK_PATH);

    let source = read_document_or_exit(&declaration_path, "catalog declaration");
    let lock_value = read_document_or_exit(&lock_path, "catalog lock");
    let lock = ok_or_exit(decode_lock(&lock_value));

    let failures = verify_lock(&lock, &source);
    let index = SignalIndex::builtin_only();
    let witnesses = index.dispose_all(failures, tier);
    let report = GateReport::from_witnesses(tier, witnesses);
    let ok = report.ok();
    let report = report.with_token(outcome_token::CATALOG_LOCK_INTACT_OK, u8::from(ok));

    finish_with_report(
        "lock-verify",
        report,
        vec![
            ("declarationPath", json!(declaration_path)),
            ("lockPath", json!(lock_path)),
            ("canonicalSourceName", json!(lock.canonical_source_name)),
            ("recordedDigest", json!(lock.digest_hex)),
        ],
        json_output,
    );
}
