use std::io::{self, Write};

use retrieval_ask_cli::commands::{overrides, price};
use retrieval_ask_core::{Ask, ClientId, OverridePolicy, OverrideTable, TokenAmount};
use serde_json::Value;

const PEER2_REQUEST: &str = r#"{
    "PayloadCID": {"/": "bafk2bzacedpayload"},
    "PieceCID": {"/": "baga6ea4seaqpiece"},
    "PieceSize": 8323072,
    "Client": "peerid2",
    "VerifiedDeal": false,
    "Unsealed": true,
    "CurrentAsk": {
        "PricePerByte": "5",
        "UnsealPrice": "0",
        "PaymentInterval": 1048576,
        "PaymentIntervalIncrease": 1048576
    }
}"#;

struct Outcome {
    exit_code: u8,
    stdout: String,
    stderr: String,
}

fn run_price(input: &str, table: OverrideTable) -> Outcome {
    let policy = OverridePolicy::new(table);
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit_code = price::run(input.as_bytes(), &mut stdout, &mut stderr, &policy);

    Outcome {
        exit_code,
        stdout: String::from_utf8(stdout).expect("stdout should be utf8"),
        stderr: String::from_utf8(stderr).expect("stderr should be utf8"),
    }
}

struct ClosedStdout;

impl Write for ClosedStdout {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn parse_ask(output: &str) -> Value {
    serde_json::from_str(output).expect("price output should be valid JSON")
}

fn request_for(client: &str) -> String {
    PEER2_REQUEST.replace("\"peerid2\"", &format!("{client:?}"))
}

#[test]
fn listed_client_receives_override_regardless_of_current_ask() {
    let input = request_for("peerid1").replace("\"5\"", "\"123456789\"");
    let outcome = run_price(&input, OverrideTable::builtin());

    assert_eq!(outcome.exit_code, 0);
    assert!(outcome.stderr.is_empty());
    assert_eq!(
        outcome.stdout,
        "{\"PricePerByte\":\"300000000000000\",\"UnsealPrice\":\"0\",\"PaymentInterval\":0,\"PaymentIntervalIncrease\":0}\n"
    );
}

#[test]
fn unlisted_client_receives_current_ask() {
    let outcome = run_price(PEER2_REQUEST, OverrideTable::builtin());

    assert_eq!(outcome.exit_code, 0);
    let ask = parse_ask(&outcome.stdout);
    assert_eq!(ask["PricePerByte"], "5");
    assert_eq!(ask["UnsealPrice"], "0");
    assert_eq!(ask["PaymentInterval"], 1_048_576);
    assert_eq!(ask["PaymentIntervalIncrease"], 1_048_576);
}

#[test]
fn empty_client_falls_back_without_error() {
    let outcome = run_price(&request_for(""), OverrideTable::builtin());

    assert_eq!(outcome.exit_code, 0);
    assert!(outcome.stderr.is_empty());
    assert_eq!(parse_ask(&outcome.stdout)["PricePerByte"], "5");
}

#[test]
fn invalid_json_fails_with_diagnostics_only() {
    let outcome = run_price("this is not json", OverrideTable::builtin());

    assert_ne!(outcome.exit_code, 0);
    assert!(outcome.stdout.is_empty());
    assert!(outcome.stderr.starts_with("failed to decode input as PricingInput json"));
}

#[test]
fn truncated_record_is_rejected() {
    let truncated = &PEER2_REQUEST[..PEER2_REQUEST.len() / 2];
    let outcome = run_price(truncated, OverrideTable::builtin());

    assert_ne!(outcome.exit_code, 0);
    assert!(outcome.stdout.is_empty());
    assert!(!outcome.stderr.is_empty());
}

#[test]
fn type_mismatched_record_is_rejected() {
    let mismatched = PEER2_REQUEST.replace("\"PieceSize\": 8323072", "\"PieceSize\": \"huge\"");
    let outcome = run_price(&mismatched, OverrideTable::builtin());

    assert_ne!(outcome.exit_code, 0);
    assert!(outcome.stdout.is_empty());
    assert!(!outcome.stderr.is_empty());
}

#[test]
fn large_amounts_pass_through_exactly() {
    let huge = "115792089237316195423570985008687907853269984665640564039457584007913129639936";
    let input =
        PEER2_REQUEST.replace("\"UnsealPrice\": \"0\"", &format!("\"UnsealPrice\": \"{huge}\""));
    let outcome = run_price(&input, OverrideTable::builtin());

    assert_eq!(outcome.exit_code, 0);
    assert_eq!(parse_ask(&outcome.stdout)["UnsealPrice"], huge);
}

#[test]
fn identical_input_yields_identical_bytes() {
    let first = run_price(PEER2_REQUEST, OverrideTable::builtin());
    let second = run_price(PEER2_REQUEST, OverrideTable::builtin());

    assert_eq!(first.exit_code, second.exit_code);
    assert_eq!(first.stdout, second.stdout);

    let first = run_price(&request_for("peerid1"), OverrideTable::builtin());
    let second = run_price(&request_for("peerid1"), OverrideTable::builtin());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn configured_override_applies_to_matching_client_only() {
    let operator_ask = Ask {
        price_per_byte: TokenAmount::from(0),
        unseal_price: TokenAmount::from(0),
        payment_interval: 0,
        payment_interval_increase: 0,
    };
    let table: OverrideTable =
        [(ClientId::new("peerid2"), operator_ask)].into_iter().collect();

    let matched = run_price(PEER2_REQUEST, table.clone());
    assert_eq!(
        matched.stdout,
        "{\"PricePerByte\":\"0\",\"UnsealPrice\":\"0\",\"PaymentInterval\":0,\"PaymentIntervalIncrease\":0}\n"
    );

    let unmatched = run_price(&request_for("peerid1"), table);
    assert_eq!(parse_ask(&unmatched.stdout)["PricePerByte"], "5");
}

#[test]
fn overrides_command_lists_table_as_json() {
    let result = overrides::run(&OverrideTable::builtin(), true);
    assert_eq!(result.exit_code, 0);

    let payload: Value = serde_json::from_str(&result.output).expect("overrides json");
    assert_eq!(payload[0]["client"], "peerid1");
    assert_eq!(payload[0]["ask"]["PricePerByte"], "300000000000000");
    assert_eq!(payload[0]["ask"]["UnsealPrice"], "0");
}

#[test]
fn field_names_are_matched_ignoring_case() {
    let input = r#"{"client":"peerid1","currentask":{"PricePerByte":"5","UnsealPrice":"0"}}"#;
    let outcome = run_price(input, OverrideTable::builtin());

    assert_eq!(outcome.exit_code, 0);
    assert_eq!(parse_ask(&outcome.stdout)["PricePerByte"], "300000000000000");
}

#[test]
fn repeated_client_key_uses_the_last_value() {
    let input = r#"{"Client":"x","Client":"peerid1","CurrentAsk":{"PricePerByte":"5"}}"#;
    let outcome = run_price(input, OverrideTable::builtin());

    assert_eq!(outcome.exit_code, 0);
    assert!(outcome.stderr.is_empty());
    assert_eq!(parse_ask(&outcome.stdout)["PricePerByte"], "300000000000000");
}

#[test]
fn unwritable_output_reports_failure_and_rendered_ask() {
    let policy = OverridePolicy::new(OverrideTable::builtin());
    let mut stderr = Vec::new();
    let exit_code = price::run(PEER2_REQUEST.as_bytes(), ClosedStdout, &mut stderr, &policy);
    let stderr = String::from_utf8(stderr).expect("stderr should be utf8");

    assert_eq!(exit_code, 1);
    assert!(stderr.starts_with("failed to encode output as Ask json: stdout closed"));
    assert!(stderr.contains("computed Ask was: "));
    assert!(stderr.contains("price_per_byte: 5"));
    assert!(stderr.contains("payment_interval: 1048576"));
}
