use crate::support::print_json;
use tollgate_kernel::builtin_registry_json;

/// Print the builtin fail-signal registry in declaration form.
pub fn run(json_output: bool) {
    let payload = builtin_registry_json();
    if json_output {
        print_json(&payload);
        return;
    }
    let count = payload["signals"].as_array().map_or(0, Vec::len);
    println!("tollgate signal-registry");
    println!("  Schema: 1");
    println!("  Registry kind: tollgate.builtin_signals.v1");
    println!("  Signals: {count}");
}
