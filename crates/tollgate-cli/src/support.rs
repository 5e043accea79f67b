use serde_json::Value;
use std::error::Error;
use tollgate_kernel::{GateReport, Tier};
use tollgate_store::read_json_value;

/// Scope flag that turns the freeze window on for a deployment.
pub const FREEZE_FLAG_ID: &str = "freeze_mode";

/// Unreadable or unparseable input. Gate verdicts never exit through
/// here; FAIL maps to exit 1 in [`exit_for`].
pub fn emit_error(message: impl AsRef<str>) -> ! {
    eprintln!("error: {}", message.as_ref());
    std::process::exit(2);
}

pub fn parse_tier_or_exit(raw: &str) -> Tier {
    raw.parse().unwrap_or_else(|err: String| emit_error(err))
}

pub fn parse_date_or_exit(raw: &str) -> chrono::NaiveDate {
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .unwrap_or_else(|err| emit_error(format!("dates must be YYYY-MM-DD, got '{raw}': {err}")))
}

fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    if let Some(source) = err.source() {
        message.push_str(": ");
        message.push_str(&source.to_string());
    }
    message
}

pub fn ok_or_exit<T, E: Error>(result: Result<T, E>) -> T {
    result.unwrap_or_else(|err| emit_error(error_chain(&err)))
}

pub fn read_document_or_exit(path: &str, label: &str) -> Value {
    match read_json_value(path) {
        Ok(value) => value,
        Err(err) => emit_error(format!("{label}: {}", error_chain(&err))),
    }
}

/// Report JSON with the shared `action`/`ok` fields plus any
/// command-specific extras.
pub fn report_payload(action: &str, report: &GateReport, extra: Vec<(&str, Value)>) -> Value {
    let mut payload = serde_json::to_value(report)
        .unwrap_or_else(|err| emit_error(format!("failed to render report json: {err}")));
    if let Value::Object(ref mut map) = payload {
        map.insert("action".to_string(), Value::String(action.to_string()));
        map.insert("ok".to_string(), Value::Bool(report.ok()));
        for (key, value) in extra {
            map.insert(key.to_string(), value);
        }
    }
    payload
}

pub fn print_json(payload: &Value) {
    let rendered = serde_json::to_string_pretty(payload)
        .unwrap_or_else(|err| emit_error(format!("failed to render output json: {err}")));
    println!("{rendered}");
}

pub fn print_human_report(action: &str, report: &GateReport) {
    println!("tollgate {action}: {}", report.disposition.label());
    for code in &report.failures {
        println!("  - {code}");
    }
}

/// Exit 0 for PASS and WARN, 1 for FAIL.
pub fn exit_for(report: &GateReport) -> ! {
    std::process::exit(if report.disposition.is_ok() { 0 } else { 1 });
}

pub fn finish_with_report(
    action: &str,
    report: GateReport,
    extra: Vec<(&str, Value)>,
    json_output: bool,
) -> ! {
    if json_output {
        print_json(&report_payload(action, &report, extra));
    } else {
        print_human_report(action, &report);
    }
    exit_for(&report)
}
