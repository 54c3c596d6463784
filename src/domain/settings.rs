//! Resolved runtime settings and their validation.
//!
//! Every key has a default, so an empty configuration is valid.

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::error::EtfBalanceError;
use crate::domain::rebalance::{RebalancePolicy, ZeroValuePolicy, DEFAULT_BAND, DEFAULT_TARGET_RATIO};
use crate::domain::updater::MalformedPolicy;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_TICKER: &str = "0050";
pub const DEFAULT_MARKET_ENDPOINT: &str = "https://www.twse.com.tw/exchangeReport/STOCK_DAY";
pub const DEFAULT_PUSH_ENDPOINT: &str = "https://api.line.me/v2/bot/message/push";
pub const DEFAULT_TIMEOUT_SECS: i64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Paths {
    pub price_history: PathBuf,
    pub ledger: PathBuf,
    pub signals: PathBuf,
    pub update_log: PathBuf,
    pub signal_log: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketSettings {
    pub ticker: String,
    pub endpoint: String,
    pub timeout: Duration,
    pub on_malformed: MalformedPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotifySettings {
    pub endpoint: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub paths: Paths,
    pub market: MarketSettings,
    pub policy: RebalancePolicy,
    pub notify: NotifySettings,
    pub log_level: log::LevelFilter,
}

pub fn load_settings(config: &dyn ConfigPort) -> Result<Settings, EtfBalanceError> {
    Ok(Settings {
        paths: load_paths(config),
        market: load_market(config)?,
        policy: load_policy(config)?,
        notify: NotifySettings {
            endpoint: config.get_string_or("notify", "endpoint", DEFAULT_PUSH_ENDPOINT),
            timeout: load_timeout(config, "notify")?,
        },
        log_level: load_log_level(config)?,
    })
}

fn load_paths(config: &dyn ConfigPort) -> Paths {
    let path =
        |key: &str, default: &str| PathBuf::from(config.get_string_or("paths", key, default));
    Paths {
        price_history: path("price_history", "data/0050_twse.csv"),
        ledger: path("ledger", "data/rebalance_trades_manual.csv"),
        signals: path("signals", "data/rebalance_signals.csv"),
        update_log: path("update_log", "logs/update.log"),
        signal_log: path("signal_log", "log/log_trade_msg.log"),
    }
}

fn load_market(config: &dyn ConfigPort) -> Result<MarketSettings, EtfBalanceError> {
    let ticker = config.get_string_or("market", "ticker", DEFAULT_TICKER);
    if !ticker.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid("market", "ticker", "ticker must be alphanumeric"));
    }

    let on_malformed = config
        .get_string_or("market", "on_malformed", "abort")
        .parse::<MalformedPolicy>()
        .map_err(|reason| invalid("market", "on_malformed", &reason))?;

    Ok(MarketSettings {
        ticker,
        endpoint: config.get_string_or("market", "endpoint", DEFAULT_MARKET_ENDPOINT),
        timeout: load_timeout(config, "market")?,
        on_malformed,
    })
}

fn load_policy(config: &dyn ConfigPort) -> Result<RebalancePolicy, EtfBalanceError> {
    let target_ratio = number(
        config.get_double("strategy", "target_ratio"),
        "strategy",
        "target_ratio",
        DEFAULT_TARGET_RATIO,
    )?;
    if !(target_ratio > 0.0 && target_ratio <= 1.0) {
        return Err(invalid(
            "strategy",
            "target_ratio",
            "target_ratio must be in (0, 1]",
        ));
    }

    let band = number(
        config.get_double("strategy", "band"),
        "strategy",
        "band",
        DEFAULT_BAND,
    )?;
    if !(band >= 0.0 && band < target_ratio) {
        return Err(invalid(
            "strategy",
            "band",
            "band must be non-negative and below target_ratio",
        ));
    }

    let on_zero_total_value = config
        .get_string_or("strategy", "on_zero_total_value", "hold")
        .parse::<ZeroValuePolicy>()
        .map_err(|reason| invalid("strategy", "on_zero_total_value", &reason))?;

    Ok(RebalancePolicy {
        target_ratio,
        band,
        on_zero_total_value,
    })
}

fn load_timeout(config: &dyn ConfigPort, section: &str) -> Result<Duration, EtfBalanceError> {
    let secs = number(
        config.get_int(section, "timeout_secs"),
        section,
        "timeout_secs",
        DEFAULT_TIMEOUT_SECS,
    )?;
    if secs <= 0 {
        return Err(invalid(section, "timeout_secs", "timeout_secs must be positive"));
    }
    Ok(Duration::from_secs(secs as u64))
}

fn load_log_level(config: &dyn ConfigPort) -> Result<log::LevelFilter, EtfBalanceError> {
    config
        .get_string_or("log", "level", "info")
        .parse::<log::LevelFilter>()
        .map_err(|_| invalid("log", "level", "expected off, error, warn, info, debug or trace"))
}

/// A present but unparsable value is an error, never the default.
fn number<T>(
    found: Result<Option<T>, String>,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, EtfBalanceError> {
    match found {
        Ok(value) => Ok(value.unwrap_or(default)),
        Err(reason) => Err(invalid(section, key, &format!("not a number: {reason}"))),
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> EtfBalanceError {
    EtfBalanceError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
