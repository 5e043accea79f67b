use crate::config::{DEFAULT_REGISTRY_PATH, load_config, resolve_path};
use crate::support::{ok_or_exit, parse_tier_or_exit, print_json, read_document_or_exit};
use serde_json::json;
use tollgate_catalog::{SignalIndex, decode_failsignal_registry};
use tollgate_kernel::Mode;

/// Look up how one failure code disposes at one tier.
///
/// A declared registry participates only when named explicitly; otherwise
/// the lookup answers from the builtin schedule. This is informational and
/// never exits nonzero.
pub fn run(
    code: String,
    tier: String,
    registry: Option<String>,
    config: Option<String>,
    json_output: bool,
) {
    let cfg = load_config(config.as_deref());
    let tier = parse_tier_or_exit(&tier);

    let index = if registry.is_some() || cfg.documents.registry.is_some() {
        let registry_path = resolve_path(
            registry,
            cfg.documents.registry.as_ref(),
            DEFAULT_REGISTRY_PATH,
        );
        let registry_value = read_document_or_exit(&registry_path, "fail-signal registry");
        let registry = ok_or_exit(decode_failsignal_registry(&registry_value));
        SignalIndex::from_registry(&registry)
    } else {
        SignalIndex::builtin_only()
    };

    let (matrix, precedence) = index.resolve(&code);
    let mode = matrix.mode_for(tier);
    let disposition = mode.dispose();
    let mode_label = match mode {
        Mode::Advisory => "advisory",
        Mode::Blocking => "blocking",
    };

    if json_output {
        print_json(&json!({
            "action": "disposition",
            "code": code,
            "tier": tier,
            "mode": mode,
            "disposition": disposition,
            "precedence": precedence,
        }));
    } else {
        println!("tollgate disposition");
        println!("  Code: {code}");
        println!("  Tier: {}", tier.as_str());
        println!("  Mode: {mode_label}");
        println!("  Disposition: {}", disposition.label());
        println!("  Precedence: {precedence}");
    }
}
