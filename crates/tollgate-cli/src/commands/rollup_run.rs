use std::time::Duration;

use crate::cli::SetArg;
use crate::config::{
    DEFAULT_CATALOG_PATH, DEFAULT_PROFILE_PATH, DEFAULT_REGISTRY_PATH, load_config, resolve_path,
};
use crate::support::{
    FREEZE_FLAG_ID, finish_with_report, ok_or_exit, parse_tier_or_exit, read_document_or_exit,
};
use serde_json::json;
use tollgate_catalog::{SignalIndex, decode_failsignal_registry, decode_token_catalog};
use tollgate_policy::{decode_execution_profile, evaluate_freeze, generate_required_sets};
use tollgate_rollup::{collect_rollups, evaluate_rollups, fold_freeze};

pub fn run(
    set: SetArg,
    catalog: Option<String>,
    registry: Option<String>,
    profile: Option<String>,
    tier: String,
    timeout_ms: Option<u64>,
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
    let profile_path = resolve_path(profile, cfg.documents.profile.as_ref(), DEFAULT_PROFILE_PATH);

    let catalog_value = read_document_or_exit(&catalog_path, "token catalog");
    let catalog = ok_or_exit(decode_token_catalog(&catalog_value));
    let registry_value = read_document_or_exit(&registry_path, "fail-signal registry");
    let registry = ok_or_exit(decode_failsignal_registry(&registry_value));
    let profile_value = read_document_or_exit(&profile_path, "execution profile");
    let profile = ok_or_exit(decode_execution_profile(&profile_value));

    let index = SignalIndex::from_registry(&registry);
    let sets = generate_required_sets(&profile);
    let required = match set {
        SetArg::Core => &sets.core,
        SetArg::Release => &sets.release,
        SetArg::Active => &sets.active,
        SetArg::FreezeMode => &sets.freeze_mode,
    };
    let timeout = Duration::from_millis(timeout_ms.unwrap_or(cfg.hooks.timeout_ms));
    let freeze_enabled = profile.flag_enabled(FREEZE_FLAG_ID).unwrap_or(false);

    // During a freeze the baseline hooks run as well, so the strict audit
    // sees real values instead of absent ones.
    let mut to_collect = required.clone();
    if freeze_enabled {
        to_collect.extend(sets.freeze_mode.iter().cloned());
    }
    let collected = collect_rollups(&catalog, &to_collect, timeout);

    let report = evaluate_rollups(
        tier,
        &catalog,
        required,
        &collected.values,
        collected.execution_failures,
        &index,
    );
    let report = if freeze_enabled {
        let outcome = evaluate_freeze(&collected.values, true, &sets.freeze_mode);
        fold_freeze(report, &outcome, &index)
    } else {
        report
    };

    finish_with_report(
        "rollup-run",
        report,
        vec![
            ("set", json!(set.as_str())),
            ("catalogPath", json!(catalog_path)),
            ("registryPath", json!(registry_path)),
            ("profilePath", json!(profile_path)),
            ("requiredCount", json!(required.len())),
            ("timeoutMs", json!(timeout.as_millis() as u64)),
            ("freezeEnabled", json!(freeze_enabled)),
        ],
        json_output,
    );
}
