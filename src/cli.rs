//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{CsvLedger, CsvPriceStore, CsvSignalStore};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::line_push_adapter::LinePushAdapter;
use crate::adapters::twse_adapter::TwseAdapter;
use crate::domain::engine;
use crate::domain::error::EtfBalanceError;
use crate::domain::notifier::{
    Delivery, Notifier, NotifierConfig, MISSING_CONFIG_STATUS, RECIPIENT_VAR, TOKEN_VAR,
};
use crate::domain::rebalance::RebalancePolicy;
use crate::domain::settings::{load_settings, Settings};
use crate::domain::signal::SignalRecord;
use crate::domain::updater::{self, UpdateOutcome};
use crate::logging::{init_file_logger, LogGuard};
use crate::ports::data_port::{LedgerPort, PriceHistoryPort};
use crate::ports::push_port::PushPort;
use crate::ports::signal_port::SignalPort;

#[derive(Parser, Debug)]
#[command(name = "etfbalance", about = "Single-ETF band rebalancing helper")]
pub struct Cli {
    /// INI file overriding the built-in defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch one month of daily prices and merge it into the price history
    Update {
        /// Month to fetch as YYYY-MM (default: current month)
        #[arg(long, value_parser = parse_month)]
        month: Option<NaiveDate>,
    },
    /// Compute today's rebalancing signal and append it to the signal history
    Signal {
        /// Print the signal without appending it
        #[arg(long)]
        dry_run: bool,
        /// Push the signal message after computing it
        #[arg(long)]
        notify: bool,
    },
    /// Push a text message
    Notify {
        message: String,
        /// Recipient id (default: LINE_USER_ID)
        #[arg(long)]
        to: Option<String>,
    },
    /// Validate configuration and print the resolved settings
    Check,
}

pub fn parse_month(input: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(&format!("{}-01", input.trim()), "%Y-%m-%d")
        .map_err(|_| format!("invalid month '{}', expected YYYY-MM", input))
}

pub fn run(cli: Cli) -> ExitCode {
    dotenv::dotenv().ok();

    let settings = match resolve_settings(cli.config.as_ref()) {
        Ok(s) => s,
        Err(code) => return code,
    };

    match cli.command {
        Command::Update { month } => run_update(&settings, month),
        Command::Signal { dry_run, notify } => run_signal(&settings, dry_run, notify),
        Command::Notify { message, to } => run_notify(&settings, &message, to.as_deref()),
        Command::Check => run_check(&settings),
    }
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, EtfBalanceError> {
    match path {
        None => Ok(FileConfigAdapter::empty()),
        Some(p) => FileConfigAdapter::from_file(p).map_err(|e| EtfBalanceError::ConfigParse {
            file: p.display().to_string(),
            reason: e.to_string(),
        }),
    }
}

pub fn resolve_settings(path: Option<&PathBuf>) -> Result<Settings, ExitCode> {
    load_config(path)
        .and_then(|config| load_settings(&config))
        .map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        })
}

fn start_logging(path: &Path, settings: &Settings) -> Result<LogGuard, ExitCode> {
    init_file_logger(path, settings.log_level).map_err(|e| {
        eprintln!("error: cannot open log file {}: {e}", path.display());
        ExitCode::from(&e)
    })
}

fn fail(err: EtfBalanceError) -> ExitCode {
    error!("{err}");
    eprintln!("error: {err}");
    ExitCode::from(&err)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn run_update(settings: &Settings, month: Option<NaiveDate>) -> ExitCode {
    let _guard = match start_logging(&settings.paths.update_log, settings) {
        Ok(g) => g,
        Err(code) => return code,
    };

    let market = match TwseAdapter::new(&settings.market.endpoint, settings.market.timeout) {
        Ok(m) => m,
        Err(e) => return fail(e),
    };
    let store = CsvPriceStore::new(settings.paths.price_history.clone());
    let month_start = updater::month_start(month.unwrap_or_else(today));

    match updater::update_price_history(
        &market,
        &store,
        &settings.market.ticker,
        month_start,
        settings.market.on_malformed,
    ) {
        Ok(outcome) => {
            eprintln!("{}", describe_outcome(&outcome, &settings.paths.price_history));
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

pub fn describe_outcome(outcome: &UpdateOutcome, path: &Path) -> String {
    match outcome {
        UpdateOutcome::Created { rows } => {
            format!("created {} with {} rows", path.display(), rows)
        }
        UpdateOutcome::Merged { fetched, total } => format!(
            "merged {} fetched rows into {} ({} rows total)",
            fetched,
            path.display(),
            total
        ),
        UpdateOutcome::Skipped => "no new data; price history unchanged".to_string(),
    }
}

/// Evaluate and, unless `dry_run`, append the resulting signal.
pub fn run_signal_pipeline(
    prices: &dyn PriceHistoryPort,
    ledger: &dyn LedgerPort,
    signals: &dyn SignalPort,
    policy: &RebalancePolicy,
    today: NaiveDate,
    dry_run: bool,
) -> Result<SignalRecord, EtfBalanceError> {
    let record = engine::evaluate(prices, ledger, policy, today)?;
    info!("{}", record.message());
    info!("{}", record.outlook());
    if !dry_run {
        signals.append_signal(&record)?;
    }
    Ok(record)
}

fn run_signal(settings: &Settings, dry_run: bool, notify: bool) -> ExitCode {
    let _guard = match start_logging(&settings.paths.signal_log, settings) {
        Ok(g) => g,
        Err(code) => return code,
    };

    let prices = CsvPriceStore::new(settings.paths.price_history.clone());
    let ledger = CsvLedger::new(settings.paths.ledger.clone());
    let signals = CsvSignalStore::new(settings.paths.signals.clone());

    let record = match run_signal_pipeline(
        &prices,
        &ledger,
        &signals,
        &settings.policy,
        today(),
        dry_run,
    ) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    println!("{}", record.message());
    println!("{}", record.outlook());
    if dry_run {
        eprintln!("dry run: signal not saved");
    } else {
        println!("signal saved to {}", settings.paths.signals.display());
    }

    if notify {
        let text = format!("{}\n{}", record.message(), record.outlook());
        return deliver(settings, &text, None);
    }
    ExitCode::SUCCESS
}

fn run_notify(settings: &Settings, message: &str, to: Option<&str>) -> ExitCode {
    let _guard = match start_logging(&settings.paths.signal_log, settings) {
        Ok(g) => g,
        Err(code) => return code,
    };
    deliver(settings, message, to)
}

/// Send through the configured push endpoint and report the delivery.
pub fn send_message(
    config: &NotifierConfig,
    transport: &dyn PushPort,
    message: &str,
    to: Option<&str>,
) -> Delivery {
    Notifier::new(config, transport).send(message, to)
}

fn deliver(settings: &Settings, message: &str, to: Option<&str>) -> ExitCode {
    let config = NotifierConfig::from_env(&settings.notify.endpoint);
    let transport = match LinePushAdapter::new(settings.notify.timeout) {
        Ok(t) => t,
        Err(e) => return fail(e),
    };

    let delivery = send_message(&config, &transport, message, to);
    if delivery.is_success() {
        eprintln!("notification sent");
    } else {
        eprintln!(
            "error: notification failed ({}): {}",
            delivery.status, delivery.body
        );
    }
    ExitCode::from(delivery_exit_status(&delivery))
}

/// 0 on success, 2 when credentials are missing, 3 for any other failure.
pub fn delivery_exit_status(delivery: &Delivery) -> u8 {
    match delivery.status {
        200 => 0,
        MISSING_CONFIG_STATUS => 2,
        _ => 3,
    }
}

/// Row count and latest entry of the signal history.
pub fn summarize_signals(signals: &dyn SignalPort) -> Result<String, EtfBalanceError> {
    let rows = signals.load_signals()?;
    Ok(match rows.last() {
        None => "no rows".to_string(),
        Some(last) => format!(
            "{} rows, last {} {} {}",
            rows.len(),
            last.date.format("%Y/%m/%d"),
            last.action,
            last.shares
        ),
    })
}

fn run_check(settings: &Settings) -> ExitCode {
    let credentials = NotifierConfig::from_env(&settings.notify.endpoint);
    let status = |value: &Option<String>| if value.is_some() { "set" } else { "missing" };

    println!("[paths]");
    println!("  price_history = {}", settings.paths.price_history.display());
    println!("  ledger        = {}", settings.paths.ledger.display());
    println!("  signals       = {}", settings.paths.signals.display());
    println!("  update_log    = {}", settings.paths.update_log.display());
    println!("  signal_log    = {}", settings.paths.signal_log.display());
    println!("[market]");
    println!("  ticker        = {}", settings.market.ticker);
    println!("  endpoint      = {}", settings.market.endpoint);
    println!("  timeout       = {}s", settings.market.timeout.as_secs());
    println!("  on_malformed  = {:?}", settings.market.on_malformed);
    println!("[strategy]");
    println!("  target_ratio  = {}", settings.policy.target_ratio);
    println!("  band          = {}", settings.policy.band);
    println!(
        "  on_zero_total_value = {:?}",
        settings.policy.on_zero_total_value
    );
    println!("[notify]");
    println!("  endpoint      = {}", settings.notify.endpoint);
    println!("  timeout       = {}s", settings.notify.timeout.as_secs());
    println!("  {}  {}", TOKEN_VAR, status(&credentials.access_token));
    println!("  {}        {}", RECIPIENT_VAR, status(&credentials.default_recipient));
    println!("[log]");
    println!("  level         = {}", settings.log_level);
    println!("[history]");
    let signals = CsvSignalStore::new(settings.paths.signals.clone());
    match summarize_signals(&signals) {
        Ok(summary) => println!("  signals       = {summary}"),
        Err(e) => eprintln!("warning: cannot read signal history: {e}"),
    }

    eprintln!("\nConfiguration is valid.");
    if let Err(e) = credentials.validate() {
        eprintln!("warning: notifications disabled: {e}");
    }
    ExitCode::SUCCESS
}
