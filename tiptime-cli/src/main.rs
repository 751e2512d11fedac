//! # tiptime - Tip calculator for the terminal
//!
//! ## Usage
//! ```bash
//! # Interactive: prompts for the bill, the percentage and round-up
//! tiptime
//!
//! # One-shot
//! tiptime --amount 59.99 --tip 20
//! tiptime --amount 42 --tip 18 --round-up --locale de-DE --json
//!
//! # Supported locales and a sample amount in each
//! tiptime locales
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use rust_decimal::Decimal;
use std::env;
use tiptime::prelude::*;
use tracing::{debug, info, warn};

mod config_loader;
mod session;

use config_loader::CliConfig;

/// Tip calculator
#[derive(Parser, Debug)]
#[command(name = "tiptime")]
#[command(version)]
#[command(about = "Calculate a tip, optionally rounded up, in your local currency", long_about = None)]
struct Args {
    /// Bill amount. Text that is not a number counts as 0
    #[arg(long, allow_hyphen_values = true)]
    amount: Option<String>,

    /// Tip percentage. Blank or non-numeric text follows --blank-tip
    #[arg(long, allow_hyphen_values = true)]
    tip: Option<String>,

    /// Round the tip up to a whole currency unit
    #[arg(long, default_value = "false")]
    round_up: bool,

    /// Locale for formatting and labels (e.g. en-US, de-DE). Defaults to the host locale
    #[arg(long)]
    locale: Option<String>,

    /// Meaning of a blank tip field: "default-percent" or "zero"
    #[arg(long)]
    blank_tip: Option<String>,

    /// Output the calculation as JSON (one-shot mode only)
    #[arg(long, default_value = "false")]
    json: bool,

    /// Print the step-by-step calculation table
    #[arg(long, default_value = "false")]
    trace: bool,

    /// Enable file logging to logs/ directory
    #[arg(long, default_value = "false")]
    log: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List supported locales with a sample amount
    Locales,
    /// Write a sample config file to the user config directory
    InitConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let file_read = CliConfig::read();
    let file_logging = matches!(&file_read, Ok(Some(c)) if c.enable_logging == Some(true));

    let interactive = args.command.is_none() && args.amount.is_none();
    let _file_guard = init_tracing(args.log || file_logging, interactive)?;

    let file_config = match file_read {
        Ok(Some(config)) => {
            debug!(path = ?CliConfig::config_path(), "loaded configuration file");
            config
        }
        Ok(None) => CliConfig::default(),
        Err(e) => {
            warn!("{}", e);
            CliConfig::default()
        }
    };

    match &args.command {
        Some(Commands::Locales) => return run_locales(),
        Some(Commands::InitConfig) => {
            let path = CliConfig::sample().save()?;
            println!("Wrote sample configuration to {}", path.display());
            return Ok(());
        }
        None => {}
    }

    let config = resolve_config(&args, &file_config)?;
    debug!(?config, "resolved configuration");
    let translator = Translator::new();

    match &args.amount {
        Some(amount) => run_once(&args, amount, config, &translator),
        None => session::run_interactive(config, &translator, args.trace),
    }
}

/// Logs go to stderr (warnings only by default) so stdout stays clean for
/// results and JSON. With `--log`, a daily-rolling file under `logs/` is added;
/// in interactive mode the file is then the only sink so debug lines do not
/// interleave with the prompts.
fn init_tracing(
    to_file: bool,
    interactive: bool,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>, Box<dyn std::error::Error>> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(if to_file { "tiptime=debug" } else { "tiptime=warn" }));
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if !to_file {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
        return Ok(None);
    }

    std::fs::create_dir_all("logs")?;
    let file_appender = tracing_appender::rolling::daily("logs", "tiptime.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = console_logging(to_file, interactive).then_some(stderr_layer);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    info!("--- Tip Session Started [{}] ---", chrono::Utc::now());
    Ok(Some(guard))
}

/// Whether log lines are written to stderr as well.
fn console_logging(to_file: bool, interactive: bool) -> bool {
    !(to_file && interactive)
}

/// Host defaults, then the config file, then `TIPTIME_*` variables, then flags.
fn resolve_config(args: &Args, file_config: &CliConfig) -> Result<TipConfig, TipError> {
    let mut config = file_config
        .apply_or_default(TipConfig::for_host())
        .with_env_overrides(|key| env::var(key).ok())?;

    if let Some(locale) = &args.locale {
        config.locale = locale.parse()?;
    }
    if let Some(policy) = &args.blank_tip {
        config.blank_tip = policy.parse()?;
    }
    Ok(config)
}

fn run_once(args: &Args, amount: &str, config: TipConfig, translator: &Translator) -> Result<(), Box<dyn std::error::Error>> {
    let mut form = TipForm::new(config);
    form.on_amount_change(amount);
    form.on_tip_change(args.tip.clone().unwrap_or_default());
    form.on_round_up_changed(args.round_up);

    if args.json {
        let details = form.details()?;
        println!("{}", serde_json::to_string_pretty(&details)?);
        return Ok(());
    }

    let screen = form.screen(translator);
    println!("{}", screen.result.bright_green().bold());
    if args.trace {
        println!("{}", session::breakdown_table(&form.details()?));
    }
    Ok(())
}

fn run_locales() -> Result<(), Box<dyn std::error::Error>> {
    let sample = Decimal::new(123456, 2);
    let host = TipLocale::host();

    for locale in TipLocale::all() {
        let marker = if locale == host { " (host)" } else { "" };
        println!(
            "{:<6} {}  {}{}",
            locale.as_str(),
            locale.currency_code(),
            locale.format_currency(sample),
            marker.dimmed()
        );
    }
    Ok(())
}
