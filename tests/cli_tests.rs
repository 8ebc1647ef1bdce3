//! `stakepool` binary integration tests.

use std::str::FromStr;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use tempfile::TempDir;

const OPENED: &str = "2026-01-01T00:00:00Z";
const EXPIRES: &str = "2026-01-01T01:00:00Z";
const AFTER: &str = "2026-01-01T02:00:00Z";

/// A throwaway ledger database plus a working directory with no config file.
struct Ledger {
    dir: TempDir,
}

impl Ledger {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn cmd(&self, at: &str) -> Command {
        let mut cmd = cargo_bin_cmd!("stakepool");
        cmd.current_dir(self.dir.path())
            .env_remove("STAKEPOOL_DATABASE")
            .env_remove("RUST_LOG")
            .arg("--database")
            .arg(self.dir.path().join("ledger.db"))
            .args(["--at", at, "--color", "never"]);
        cmd
    }

    fn json(&self, at: &str, args: &[&str]) -> Value {
        let output = self
            .cmd(at)
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).unwrap()
    }

    fn open(&self, market: &str) {
        self.cmd(OPENED)
            .args(["market", "open", market, "-Q", "Will it rain?", "--expires", EXPIRES])
            .assert()
            .success();
    }

    fn stake(&self, market: &str, side: &str, amount: &str, user: &str) {
        self.cmd(OPENED)
            .args(["stake", "place", market, side, amount, "--user", user])
            .assert()
            .success();
    }
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).unwrap(),
        other => panic!("not a decimal: {other}"),
    }
}

#[test]
fn test_help() {
    cargo_bin_cmd!("stakepool")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("stakepool"))
        .stdout(predicate::str::contains("market"))
        .stdout(predicate::str::contains("stake"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("audit"));
}

#[test]
fn test_version() {
    cargo_bin_cmd!("stakepool")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stakepool"));
}

#[test]
fn test_full_market_lifecycle() {
    let ledger = Ledger::new();
    ledger.open("rain");

    ledger
        .cmd(OPENED)
        .args(["stake", "place", "rain", "yes", "100", "--user", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Staked 100 on YES in rain"));
    ledger.stake("rain", "no", "100", "bob");

    ledger
        .cmd(AFTER)
        .args(["resolve", "rain", "YES"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolved rain as YES"));

    ledger
        .cmd(AFTER)
        .args(["audit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rain: consistent"));
}

#[test]
fn test_json_resolution_matches_worked_example() {
    let ledger = Ledger::new();
    ledger.open("rain");

    let placed = ledger.json(
        OPENED,
        &["stake", "place", "rain", "yes", "100", "--user", "alice"],
    );
    assert_eq!(placed["command"], "stake.place");
    assert_eq!(decimal(&placed["stake"]["odds"]), dec!(1));
    assert_eq!(decimal(&placed["stake"]["potential_win"]), dec!(100));
    ledger.stake("rain", "no", "100", "bob");

    let resolved = ledger.json(AFTER, &["resolve", "rain", "yes"]);
    assert_eq!(resolved["command"], "resolve");
    let resolution = &resolved["resolution"];
    assert_eq!(decimal(&resolution["resolution_fee"]), dec!(4));
    assert_eq!(decimal(&resolution["total_paid"]), dec!(200));
    assert_eq!(resolution["winning_count"], 1);
    assert_eq!(resolution["losing_count"], 1);
    assert_eq!(resolution["market"]["status"], "resolved_yes");

    let stakes = ledger.json(AFTER, &["stake", "list", "--market", "rain"]);
    let stakes = stakes["stakes"].as_array().unwrap();
    assert_eq!(stakes.len(), 2);
    assert_eq!(stakes[0]["status"], "won");
    assert_eq!(stakes[1]["status"], "lost");

    let audit = ledger.json(AFTER, &["audit", "rain"]);
    assert_eq!(audit["clean"], true);
}

#[test]
fn test_quote_does_not_move_the_pool() {
    let ledger = Ledger::new();
    ledger.open("rain");
    ledger.stake("rain", "no", "60", "carol");

    let quote = ledger.json(OPENED, &["stake", "quote", "rain", "no", "10"]);
    assert_eq!(decimal(&quote["quote"]["odds"]), dec!(7));
    assert_eq!(decimal(&quote["quote"]["potential_win"]), dec!(70));

    let shown = ledger.json(OPENED, &["market", "show", "rain"]);
    assert_eq!(decimal(&shown["market"]["total_pool"]), dec!(60));
    assert_eq!(shown["market"]["stake_count"], 1);
    assert!(shown["odds"]["yes"].is_string() || shown["odds"]["yes"].is_number());
}

#[test]
fn test_market_list_json() {
    let ledger = Ledger::new();
    ledger.open("first");
    ledger.open("second");

    let listed = ledger.json(OPENED, &["market", "list"]);
    let ids: Vec<&str> = listed["markets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["first", "second"]);
}

#[test]
fn test_user_stakes_listing() {
    let ledger = Ledger::new();
    ledger.open("first");
    ledger.open("second");
    ledger.stake("first", "yes", "1", "alice");
    ledger.stake("second", "no", "2", "alice");
    ledger.stake("second", "yes", "3", "bob");

    let listed = ledger.json(OPENED, &["stake", "list", "--user", "alice"]);
    assert_eq!(listed["stakes"].as_array().unwrap().len(), 2);
}

#[test]
fn test_unknown_market_exits_not_found() {
    let ledger = Ledger::new();
    ledger
        .cmd(OPENED)
        .args(["stake", "place", "ghost", "yes", "1", "--user", "alice"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("market not found: ghost"));
}

#[test]
fn test_invalid_outcome_exits_invalid_input() {
    let ledger = Ledger::new();
    ledger.open("rain");
    ledger
        .cmd(AFTER)
        .args(["resolve", "rain", "MAYBE"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("MAYBE"));
}

#[test]
fn test_invalid_amount_exits_invalid_input() {
    let ledger = Ledger::new();
    ledger.open("rain");
    ledger
        .cmd(OPENED)
        .args(["stake", "place", "rain", "yes", "-5", "--user", "alice"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid stake amount"));
}

#[test]
fn test_expired_market_exits_invalid_state() {
    let ledger = Ledger::new();
    ledger.open("rain");
    ledger
        .cmd(AFTER)
        .args(["stake", "place", "rain", "yes", "1", "--user", "alice"])
        .assert()
        .code(4);
}

#[test]
fn test_second_resolution_exits_invalid_state() {
    let ledger = Ledger::new();
    ledger.open("rain");
    ledger.cmd(AFTER).args(["resolve", "rain", "no"]).assert().success();
    ledger
        .cmd(AFTER)
        .args(["resolve", "rain", "yes"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("already resolved"));
}

#[test]
fn test_json_errors_go_to_stderr() {
    let ledger = Ledger::new();
    let output = ledger
        .cmd(OPENED)
        .args(["--json", "market", "show", "ghost"])
        .assert()
        .code(3)
        .get_output()
        .clone();
    assert!(output.stdout.is_empty());

    let err: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(err["error"]["kind"], "not_found");
    assert!(err["error"]["message"]
        .as_str()
        .unwrap()
        .contains("ghost"));
}

#[test]
fn test_quiet_suppresses_human_output() {
    let ledger = Ledger::new();
    ledger
        .cmd(OPENED)
        .args(["--quiet", "market", "open", "rain", "-Q", "Will it rain?"])
        .args(["--expires", EXPIRES])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_stake_list_requires_an_owner() {
    let ledger = Ledger::new();
    ledger
        .cmd(OPENED)
        .args(["stake", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--market"));
}

#[test]
fn test_config_file_sets_the_fee() {
    let ledger = Ledger::new();
    let config = ledger.dir.path().join("custom.toml");
    std::fs::write(&config, "[ledger]\nfee_rate = \"0.05\"\nfee_mode = \"deducted\"\n").unwrap();
    let config = config.to_string_lossy().into_owned();

    ledger.open("rain");
    ledger.stake("rain", "yes", "100", "alice");
    ledger.stake("rain", "no", "100", "bob");

    let output = ledger
        .cmd(AFTER)
        .args(["--config", &config, "--json", "resolve", "rain", "yes"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let resolved: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(decimal(&resolved["resolution"]["resolution_fee"]), dec!(10));
    assert_eq!(decimal(&resolved["resolution"]["total_paid"]), dec!(190));
}
