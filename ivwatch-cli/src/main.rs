//! ivwatch CLI — run alert cycles for NIFTY and BANKNIFTY.
//!
//! Commands:
//! - `run` — one analysis cycle, then deliver the composed message
//! - `watch` — repeated cycles on an interval, keeping the IV window in memory
//! - `history` — show the persisted IV window per index

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ivwatch_core::alert::{compose_message, AlertEngine};
use ivwatch_core::config::WatchConfig;
use ivwatch_core::data::{NseOptionChain, Retrying, YahooPrices};
use ivwatch_core::domain::IndexSymbol;
use ivwatch_core::notify::{deliver, ConsoleNotifier, Notifier, TelegramNotifier};
use ivwatch_core::signals::{percentile_rank, HistoryFile, IvHistory, WINDOW_CAPACITY};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ivwatch",
    about = "ivwatch — NIFTY & BANKNIFTY IV percentile and move alerts"
)]
struct Cli {
    /// Path to a TOML config file. Missing file means defaults.
    #[arg(long, global = true, default_value = "ivwatch.toml")]
    config: PathBuf,

    /// Debug-level logging (RUST_LOG takes precedence when set).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one analysis cycle and deliver the result.
    Run {
        /// Print the message instead of sending it; the IV history file is not updated.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Run a cycle every interval until interrupted.
    Watch {
        /// Seconds between cycles.
        #[arg(long, default_value_t = 900)]
        interval_secs: u64,

        /// Print messages instead of sending them; the IV history file is not updated.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Show the persisted IV window for each index.
    History,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = WatchConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?
        .with_env_overrides(|key| std::env::var(key).ok());

    match cli.command {
        Commands::Run { dry_run } => run_once(&config, dry_run),
        Commands::Watch {
            interval_secs,
            dry_run,
        } => run_watch(&config, Duration::from_secs(interval_secs), dry_run),
        Commands::History => show_history(&config.history.path),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

/// Live sources and notifier built from config.
struct Runtime {
    chains: Retrying<NseOptionChain>,
    prices: Retrying<YahooPrices>,
    notifier: Box<dyn Notifier>,
}

impl Runtime {
    fn build(config: &WatchConfig, dry_run: bool) -> Result<Self> {
        let timeout = config.fetch.timeout();
        let policy = config.fetch.retry_policy();
        let chains = Retrying::new(NseOptionChain::new(timeout)?, policy);
        let prices = Retrying::new(YahooPrices::new(timeout)?, policy);

        let notifier: Box<dyn Notifier> = match (dry_run, config.telegram.credentials()) {
            (false, Some((token, chat))) => {
                Box::new(TelegramNotifier::new(token.to_string(), chat.to_string(), timeout)?)
            }
            (false, None) => {
                warn!("Telegram bot token or chat id not set; printing message instead of sending");
                Box::new(ConsoleNotifier::stdout())
            }
            (true, _) => Box::new(ConsoleNotifier::stdout()),
        };

        Ok(Self {
            chains,
            prices,
            notifier,
        })
    }

    /// One cycle: analyse, compose, deliver. Returns the updated history.
    fn tick(&self, config: &WatchConfig, history: IvHistory) -> IvHistory {
        let engine = AlertEngine::new(&self.chains, &self.prices).with_lookback(config.fetch.lookback());
        let outcome = engine.run_cycle(history);
        let message = compose_message(&outcome.blocks);
        deliver(self.notifier.as_ref(), &message);
        outcome.history
    }
}

fn load_history(config: &WatchConfig) -> IvHistory {
    if !config.history.loads_file() {
        return IvHistory::new();
    }
    HistoryFile::new(&config.history.path).load_or_quarantine()
}

fn save_history(config: &WatchConfig, history: &IvHistory, dry_run: bool) {
    if !config.history.writes_file(dry_run) {
        return;
    }
    if let Err(e) = HistoryFile::new(&config.history.path).save(history) {
        warn!(error = %e, "IV window not persisted");
    }
}

fn run_once(config: &WatchConfig, dry_run: bool) -> Result<()> {
    let runtime = Runtime::build(config, dry_run)?;
    let history = runtime.tick(config, load_history(config));
    save_history(config, &history, dry_run);
    Ok(())
}

fn run_watch(config: &WatchConfig, interval: Duration, dry_run: bool) -> Result<()> {
    let runtime = Runtime::build(config, dry_run)?;
    let mut history = load_history(config);
    info!(interval_secs = interval.as_secs(), mode = ?config.history.mode, "watching");

    loop {
        history = runtime.tick(config, history);
        save_history(config, &history, dry_run);
        std::thread::sleep(interval);
    }
}

fn show_history(path: &Path) -> Result<()> {
    let history = HistoryFile::new(path)
        .load()
        .with_context(|| format!("reading IV history from {}", path.display()))?;

    println!("IV history: {}", path.display());
    for symbol in IndexSymbol::ALL {
        let window = history.window(symbol);
        match window.last() {
            Some(&latest) => {
                let rank = percentile_rank(&window, latest).unwrap_or(0.0);
                println!(
                    "  {symbol:<10} {:>2}/{WINDOW_CAPACITY} readings, latest {latest:.2}, percentile {rank:.2}",
                    window.len()
                );
            }
            None => println!("  {symbol:<10} no readings"),
        }
    }
    Ok(())
}
