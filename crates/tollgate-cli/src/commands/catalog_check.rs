use crate::config::{DEFAULT_CATALOG_PATH, DEFAULT_REGISTRY_PATH, load_config, resolve_path};
use crate::support::{
    finish_with_report, ok_or_exit, parse_tier_or_exit, read_document_or_exit,
};
use serde_json::json;
use tollgate_catalog::{
    SignalIndex, decode_failsignal_registry, decode_token_catalog, validate_catalog,
};
use tollgate_kernel::{GateReport, outcome_token};

pub fn run(
    catalog: Option<String>,
    registry: Option<String>,
    tier: String,
    config: Option<String>,
    json_output: bool,
) {
    let cfg = load_config(config.as_deref());
    let tier = parse_tier_or_exit(&tier);
    let catalog_path = resolve_path(catalog, cfg.documents.catalog.as_ref(), DEFAULT_CATALOG_PATH);
    let registry_path = resolve_path(
        registry,
        cfg.documents.registry.as_ref(),
        DEFAULT_REGISTRY_PATH,
    );

    let catalog_value = read_document_or_exit(&catalog_path, "token catalog");
    let catalog = ok_or_exit(decode_token_catalog(&catalog_value));
    let registry_value = read_document_or_exit(&registry_path, "fail-signal registry");
    let registry = ok_or_exit(decode_failsignal_registry(&registry_value));

    let failures = validate_catalog(&catalog, &registry);
    // Self-checks dispose through builtin schedules so a registry cannot
    // soften its own validation.
    let index = SignalIndex::builtin_only();
    let witnesses = index.dispose_all(failures, tier);
    let report = GateReport::from_witnesses(tier, witnesses);
    let ok = report.ok();
    let report = report.with_token(outcome_token::CATALOG_CONSISTENT_OK, u8::from(ok));

    finish_with_report(
        "catalog-check",
        report,
        vec![
            ("catalogPath", json!(catalog_path)),
            ("registryPath", json!(registry_path)),
            ("tokenCount", json!(catalog.tokens.len())),
            ("signalCount", json!(registry.signals.len())),
        ],
        json_output,
    );
}
