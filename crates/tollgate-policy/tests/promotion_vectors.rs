//! Integration tests: golden promotion vectors.
//!
//! Each fixture in tests/fixtures/ has:
//! - case.json: tier, stage plan, execution profile, promotion record
//! - expect.json: the expected gate report
//!
//! These tests decode the documents, validate the promotion, dispose the
//! failures under the builtin signal table, and compare the serialized
//! report to the expected one, down to witness ordering and contexts.

use serde_json::Value;
use std::path::PathBuf;
use tollgate_catalog::SignalIndex;
use tollgate_kernel::{GateReport, Tier, outcome_token};
use tollgate_policy::{
    decode_execution_profile, decode_promotion_record, decode_stage_plan, validate_promotion,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn run_fixture(name: &str) {
    let dir = fixtures_dir().join(name);

    let case_path = dir.join("case.json");
    let expect_path = dir.join("expect.json");

    let case_str = std::fs::read_to_string(&case_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", case_path.display()));
    let expect_str = std::fs::read_to_string(&expect_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", expect_path.display()));

    let case: Value = serde_json::from_str(&case_str)
        .unwrap_or_else(|e| panic!("failed to parse {}: {e}", case_path.display()));
    let expected: Value = serde_json::from_str(&expect_str)
        .unwrap_or_else(|e| panic!("failed to parse {}: {e}", expect_path.display()));

    let tier: Tier = case["tier"]
        .as_str()
        .expect("missing tier field")
        .parse()
        .unwrap_or_else(|e| panic!("bad tier in {name}: {e}"));
    let plan = decode_stage_plan(&case["plan"])
        .unwrap_or_else(|e| panic!("bad stage plan in {name}: {e}"));
    let profile = decode_execution_profile(&case["profile"])
        .unwrap_or_else(|e| panic!("bad execution profile in {name}: {e}"));
    let record = decode_promotion_record(&case["record"])
        .unwrap_or_else(|e| panic!("bad promotion record in {name}: {e}"));

    let index = SignalIndex::builtin_only();
    let witnesses = index.dispose_all(validate_promotion(&plan, &record, &profile), tier);
    let report = GateReport::from_witnesses(tier, witnesses);
    let ok = report.ok();
    let report = report.with_token(outcome_token::PROMOTION_RECORD_VALID_OK, u8::from(ok));

    let result_json = serde_json::to_value(&report).expect("failed to serialize report");

    assert_eq!(
        result_json,
        expected,
        "\n\nFixture: {name}\n\nGot:\n{}\n\nExpected:\n{}\n",
        serde_json::to_string_pretty(&result_json).unwrap(),
        serde_json::to_string_pretty(&expected).unwrap(),
    );
}

#[test]
fn golden_adjacent_promotion() {
    run_fixture("golden_adjacent_promotion");
}

#[test]
fn golden_inactive_record_template() {
    run_fixture("golden_inactive_record_template");
}

#[test]
fn adversarial_promotion_stage_skip() {
    run_fixture("adversarial_promotion_stage_skip");
}

#[test]
fn adversarial_promotion_missing_metric() {
    run_fixture("adversarial_promotion_missing_metric");
}

#[test]
fn adversarial_promotion_compound_drift() {
    run_fixture("adversarial_promotion_compound_drift");
}

#[test]
fn adversarial_promotion_wrong_metric_types() {
    run_fixture("adversarial_promotion_wrong_metric_types");
}
