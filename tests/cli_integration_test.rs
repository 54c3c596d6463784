//! CLI integration tests.
//!
//! Tests cover:
//! - Argument parsing for every subcommand
//! - Settings resolution from real INI files on disk
//! - Notification delivery through a recording transport

mod common;

use clap::Parser;
use common::*;
use etfbalance::cli::{self, Cli, Command};
use etfbalance::domain::error::EtfBalanceError;
use etfbalance::domain::notifier::{
    NotifierConfig, MISSING_CONFIG_STATUS, TRANSPORT_FAILURE_STATUS,
};
use etfbalance::domain::rebalance::ZeroValuePolicy;
use etfbalance::domain::settings::load_settings;
use etfbalance::domain::updater::MalformedPolicy;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const FULL_INI: &str = r#"
[paths]
price_history = /srv/etf/prices.csv
ledger = /srv/etf/ledger.csv
signals = /srv/etf/signals.csv
update_log = /var/log/etf/update.log
signal_log = /var/log/etf/signal.log

[market]
ticker = 006208
timeout_secs = 20
on_malformed = skip

[strategy]
target_ratio = 0.8
band = 0.05
on_zero_total_value = reject

[notify]
endpoint = http://localhost:9999/push
timeout_secs = 5

[log]
level = debug
"#;

fn config(token: Option<&str>, recipient: Option<&str>) -> NotifierConfig {
    NotifierConfig {
        endpoint: "http://localhost:9999/push".to_string(),
        access_token: token.map(String::from),
        default_recipient: recipient.map(String::from),
    }
}

mod arguments {
    use super::*;

    #[test]
    fn update_with_month() {
        let cli = Cli::try_parse_from(["etfbalance", "update", "--month", "2025-08"]).unwrap();
        match cli.command {
            Command::Update { month } => assert_eq!(month, Some(date(2025, 8, 1))),
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(cli.config.is_none());
    }

    #[test]
    fn update_rejects_bad_month() {
        assert!(Cli::try_parse_from(["etfbalance", "update", "--month", "2025-13"]).is_err());
        assert!(Cli::try_parse_from(["etfbalance", "update", "--month", "Aug"]).is_err());
    }

    #[test]
    fn signal_flags_and_global_config() {
        let cli = Cli::try_parse_from([
            "etfbalance",
            "signal",
            "--dry-run",
            "--notify",
            "--config",
            "etf.ini",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("etf.ini")));
        match cli.command {
            Command::Signal { dry_run, notify } => {
                assert!(dry_run);
                assert!(notify);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn notify_message_and_recipient() {
        let cli =
            Cli::try_parse_from(["etfbalance", "notify", "hello there", "--to", "U123"]).unwrap();
        match cli.command {
            Command::Notify { message, to } => {
                assert_eq!(message, "hello there");
                assert_eq!(to.as_deref(), Some("U123"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn notify_requires_message() {
        assert!(Cli::try_parse_from(["etfbalance", "notify"]).is_err());
    }

    #[test]
    fn parse_month_trims_input() {
        assert_eq!(cli::parse_month(" 2024-12 ").unwrap(), date(2024, 12, 1));
        assert!(cli::parse_month("2024-12-05").is_err());
    }
}

mod settings {
    use super::*;

    #[test]
    fn no_config_file_uses_defaults() {
        let settings = cli::resolve_settings(None).unwrap();
        assert_eq!(settings.paths.ledger, PathBuf::from("data/rebalance_trades_manual.csv"));
        assert_eq!(settings.paths.signals, PathBuf::from("data/rebalance_signals.csv"));
        assert_eq!(settings.paths.update_log, PathBuf::from("logs/update.log"));
        assert_eq!(settings.policy.target_ratio, 0.9);
        assert_eq!(settings.policy.band, 0.01);
        assert_eq!(settings.market.on_malformed, MalformedPolicy::Abort);
        assert_eq!(settings.log_level, log::LevelFilter::Info);
    }

    #[test]
    fn full_file_overrides_every_section() {
        let file = write_temp_ini(FULL_INI);
        let config = cli::load_config(Some(&file.path().to_path_buf())).unwrap();
        let settings = load_settings(&config).unwrap();

        assert_eq!(settings.paths.price_history, PathBuf::from("/srv/etf/prices.csv"));
        assert_eq!(settings.paths.signal_log, PathBuf::from("/var/log/etf/signal.log"));
        assert_eq!(settings.market.ticker, "006208");
        assert_eq!(settings.market.timeout, Duration::from_secs(20));
        assert_eq!(settings.market.on_malformed, MalformedPolicy::Skip);
        assert_eq!(settings.policy.target_ratio, 0.8);
        assert_eq!(settings.policy.band, 0.05);
        assert_eq!(settings.policy.on_zero_total_value, ZeroValuePolicy::Reject);
        assert_eq!(settings.notify.endpoint, "http://localhost:9999/push");
        assert_eq!(settings.notify.timeout, Duration::from_secs(5));
        assert_eq!(settings.log_level, log::LevelFilter::Debug);
    }

    #[test]
    fn missing_file_is_config_parse_error() {
        let path = PathBuf::from("/nonexistent/etfbalance.ini");
        let err = cli::load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, EtfBalanceError::ConfigParse { .. }));
        assert_eq!(err.exit_status(), 2);
    }

    #[test]
    fn band_not_below_target_is_rejected() {
        let file = write_temp_ini("[strategy]\ntarget_ratio = 0.5\nband = 0.5\n");
        assert!(cli::resolve_settings(Some(&file.path().to_path_buf())).is_err());

        let config = cli::load_config(Some(&file.path().to_path_buf())).unwrap();
        let err = load_settings(&config).unwrap_err();
        assert_eq!(err.exit_status(), 2);
        assert!(err.to_string().contains("band"));
    }

    #[test]
    fn unparsable_numbers_are_rejected() {
        let file = write_temp_ini(
            "[strategy]\ntarget_ratio = 0.6O\nband = 5%\n[market]\ntimeout_secs = ten\n",
        );
        let config = cli::load_config(Some(&file.path().to_path_buf())).unwrap();
        let err = load_settings(&config).unwrap_err();
        assert_eq!(err.exit_status(), 2);
        assert!(matches!(
            err,
            EtfBalanceError::ConfigInvalid { ref key, .. } if key == "timeout_secs"
        ));

        for (ini, bad_key) in [
            ("[strategy]\ntarget_ratio = 0.6O\n", "target_ratio"),
            ("[strategy]\nband = 5%\n", "band"),
            ("[notify]\ntimeout_secs = 1e3\n", "timeout_secs"),
        ] {
            let file = write_temp_ini(ini);
            let config = cli::load_config(Some(&file.path().to_path_buf())).unwrap();
            let err = load_settings(&config).unwrap_err();
            assert!(
                matches!(err, EtfBalanceError::ConfigInvalid { ref key, .. } if key == bad_key),
                "{ini}: {err}"
            );
        }
    }

    #[test]
    fn unknown_zero_value_policy_is_rejected() {
        let file = write_temp_ini("[strategy]\non_zero_total_value = buy\n");
        let config = cli::load_config(Some(&file.path().to_path_buf())).unwrap();
        let err = load_settings(&config).unwrap_err();
        assert!(matches!(
            err,
            EtfBalanceError::ConfigInvalid { ref key, .. } if key == "on_zero_total_value"
        ));
    }
}

mod notification {
    use super::*;

    #[test]
    fn delivers_to_default_recipient() {
        let push = RecordingPush::new(PushReply::Status(200, "{}".into()));
        let delivery = cli::send_message(&config(Some("tok"), Some("U1")), &push, "hi", None);

        assert!(delivery.is_success());
        assert_eq!(cli::delivery_exit_status(&delivery), 0);
        let calls = push.calls.borrow();
        assert_eq!(calls.len(), 1);
        let (url, token, body) = &calls[0];
        assert_eq!(url, "http://localhost:9999/push");
        assert_eq!(token, "tok");
        assert_eq!(body["to"], "U1");
        assert_eq!(body["messages"][0]["type"], "text");
        assert_eq!(body["messages"][0]["text"], "hi");
    }

    #[test]
    fn explicit_recipient_overrides_default() {
        let push = RecordingPush::new(PushReply::Status(200, "{}".into()));
        cli::send_message(&config(Some("tok"), Some("U1")), &push, "hi", Some("U2"));
        assert_eq!(push.calls.borrow()[0].2["to"], "U2");
    }

    #[test]
    fn explicit_recipient_without_default() {
        let push = RecordingPush::new(PushReply::Status(200, "{}".into()));
        let delivery = cli::send_message(&config(Some("tok"), None), &push, "hi", Some("U2"));
        assert!(delivery.is_success());
    }

    #[test]
    fn missing_token_makes_no_request() {
        let push = RecordingPush::new(PushReply::Status(200, "{}".into()));
        let delivery = cli::send_message(&config(None, Some("U1")), &push, "hi", None);

        assert_eq!(cli::delivery_exit_status(&delivery), 2);

        assert_eq!(delivery.status, MISSING_CONFIG_STATUS);
        assert!(delivery.body.contains("LINE_CHANNEL_TOKEN"));
        assert!(push.calls.borrow().is_empty());
    }

    #[test]
    fn missing_recipient_makes_no_request() {
        let push = RecordingPush::new(PushReply::Status(200, "{}".into()));
        let delivery = cli::send_message(&config(Some("tok"), None), &push, "hi", None);

        assert_eq!(delivery.status, MISSING_CONFIG_STATUS);
        assert!(delivery.body.contains("LINE_USER_ID"));
        assert!(push.calls.borrow().is_empty());
    }

    #[test]
    fn rejected_push_passes_status_through() {
        let push = RecordingPush::new(PushReply::Status(401, "invalid token".into()));
        let delivery = cli::send_message(&config(Some("bad"), Some("U1")), &push, "hi", None);

        assert_eq!(delivery.status, 401);
        assert_eq!(delivery.body, "invalid token");
        assert!(!delivery.is_success());
        assert_eq!(cli::delivery_exit_status(&delivery), 3);
    }

    #[test]
    fn transport_failure_reports_status_zero() {
        let push = RecordingPush::new(PushReply::Transport("connection refused".into()));
        let delivery = cli::send_message(&config(Some("tok"), Some("U1")), &push, "hi", None);

        assert_eq!(delivery.status, TRANSPORT_FAILURE_STATUS);
        assert_eq!(cli::delivery_exit_status(&delivery), 3);
        assert!(delivery.body.contains("connection refused"));
    }
}
