//! Loading configuration files from disk.

use std::io::Write;

use rust_decimal_macros::dec;
use stakepool::domain::{FeeMode, RemainderPolicy};
use stakepool::error::{ConfigError, Error};
use stakepool::infrastructure::config::settings::{Config, DATABASE_ENV};
use tempfile::NamedTempFile;

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn full_file_is_loaded() {
    let file = config_file(
        r#"
[logging]
level = "info"
format = "json"

[ledger]
money_scale = 4
odds_scale = 6
fee_rate = "0.01"
fee_mode = "deducted"
remainder = "leave_in_pool"
"#,
    );

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, "json");

    let policy = config.policy();
    assert_eq!(policy.precision.money_scale, 4);
    assert_eq!(policy.precision.odds_scale, 6);
    assert_eq!(policy.settlement.fee_rate, dec!(0.01));
    assert_eq!(policy.settlement.fee_mode, FeeMode::Deducted);
    assert_eq!(policy.settlement.remainder, RemainderPolicy::LeaveInPool);
}

#[test]
fn explicit_path_wins_over_defaults() {
    let file = config_file("[ledger]\nfee_rate = \"0\"\n");
    let config = Config::load_or_default(Some(file.path())).unwrap();
    assert_eq!(config.policy().settlement.fee_rate, dec!(0));
}

#[test]
fn fee_rate_of_one_is_rejected() {
    let file = config_file("[ledger]\nfee_rate = \"1\"\n");
    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidValue {
            field: "fee_rate",
            ..
        })
    ));
}

#[test]
fn negative_fee_rate_is_rejected() {
    let file = config_file("[ledger]\nfee_rate = \"-0.01\"\n");
    assert!(matches!(
        Config::load(file.path()).unwrap_err(),
        Error::Config(ConfigError::InvalidValue {
            field: "fee_rate",
            ..
        })
    ));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let file = config_file("[ledger\nfee_rate = ");
    assert!(matches!(
        Config::load(file.path()).unwrap_err(),
        Error::Config(ConfigError::Parse(_))
    ));
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))));
}

#[test]
fn environment_overrides_database() {
    let file = config_file("database = \"from-file.db\"\n");
    std::env::set_var(DATABASE_ENV, "from-env.db");
    let config = Config::load(file.path());
    std::env::remove_var(DATABASE_ENV);

    assert_eq!(config.unwrap().database, "from-env.db");
}
