//! OrbLab CLI — run opening range breakout backtests.
//!
//! Commands:
//! - `run`: evaluate a bar history (CSV or synthetic) under a TOML config
//! - `config`: print the default configuration as TOML

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use orblab_core::domain::ExitReason;
use orblab_runner::export::RunSummary;
use orblab_runner::{
    load_csv, load_synthetic, run_backtest, save_artifacts, BacktestConfig, BacktestResult,
    LoadOptions,
};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "orblab",
    about = "OrbLab CLI — opening range breakout backtesting"
)]
struct Cli {
    /// Enable debug logging (per-session decisions).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a backtest over a CSV bar file or synthetic sessions.
    Run {
        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// CSV bar file with header timestamp,open,high,low,close,volume.
        #[arg(long, conflicts_with = "synthetic")]
        data: Option<PathBuf>,

        /// Generate this many synthetic weekday sessions instead of reading data.
        #[arg(long)]
        synthetic: Option<usize>,

        /// First date for synthetic sessions (YYYY-MM-DD).
        #[arg(long, default_value = "2024-01-02")]
        synthetic_start: String,

        /// Override the config's symbol.
        #[arg(long)]
        symbol: Option<String>,

        /// Evaluate sessions in parallel.
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Skip writing artifacts.
        #[arg(long, default_value_t = false)]
        no_save: bool,

        /// Print the run summary as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the default configuration as TOML.
    Config {
        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            data,
            synthetic,
            synthetic_start,
            symbol,
            parallel,
            output_dir,
            no_save,
            json,
        } => run_backtest_cmd(RunArgs {
            config_path: config,
            data_path: data,
            synthetic_days: synthetic,
            synthetic_start,
            symbol,
            parallel,
            output_dir,
            save: !no_save,
            json,
        }),
        Commands::Config { output } => run_config(output),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug,orblab_core=debug,orblab_runner=debug")
    } else {
        EnvFilter::new("info,orblab_core=info,orblab_runner=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

struct RunArgs {
    config_path: Option<PathBuf>,
    data_path: Option<PathBuf>,
    synthetic_days: Option<usize>,
    synthetic_start: String,
    symbol: Option<String>,
    parallel: bool,
    output_dir: PathBuf,
    save: bool,
    json: bool,
}

fn run_backtest_cmd(args: RunArgs) -> Result<()> {
    let mut config = match &args.config_path {
        Some(path) => BacktestConfig::from_file(path)?,
        None => BacktestConfig::default(),
    };
    if let Some(symbol) = args.symbol {
        config.backtest.symbol = symbol;
    }
    if args.parallel {
        config.backtest.parallel = true;
    }
    // Fail on a bad config before touching any data.
    config.to_params()?;

    let opts = LoadOptions::from_config(&config);
    let symbol = config.backtest.symbol.clone();
    let data = match (args.data_path, args.synthetic_days) {
        (Some(path), _) => load_csv(&symbol, &path, &opts)
            .with_context(|| format!("failed to load bars from {}", path.display()))?,
        (None, Some(days)) => {
            let start = NaiveDate::parse_from_str(&args.synthetic_start, "%Y-%m-%d")
                .with_context(|| format!("invalid --synthetic-start '{}'", args.synthetic_start))?;
            load_synthetic(&symbol, start, days, &opts)?
        }
        (None, None) => bail!("one of --data or --synthetic is required"),
    };

    let result = run_backtest(&config, &data)?;

    if args.json {
        let summary = RunSummary::from_result(&result);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&result);
    }

    if args.save {
        let run_dir = save_artifacts(&result, &args.output_dir)?;
        info!(path = %run_dir.display(), "artifacts saved");
        if !args.json {
            println!("Artifacts saved to: {}", run_dir.display());
        }
    }

    Ok(())
}

fn run_config(output: Option<PathBuf>) -> Result<()> {
    let text = BacktestConfig::default().to_toml_string()?;
    match output {
        Some(path) => std::fs::write(&path, text)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{text}"),
    }
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    let s = &result.summary;
    let f = &result.funnel;
    println!();
    println!("=== Backtest Result ===");
    println!("Symbol:         {}", result.symbol);
    println!("Run ID:         {}", &result.run_id[..12.min(result.run_id.len())]);
    println!("Exit rule:      {}", result.exit_rule);
    println!(
        "Sessions:       {} ({} bars)",
        result.session_count, result.bar_count
    );
    println!();
    println!("--- Funnel ---");
    println!("Windows:        {}", f.has_windows);
    println!("ATR defined:    {}", f.has_atr);
    println!("Gates passed:   {}", f.passed_gates);
    println!("Breakouts:      {}", f.breakouts);
    println!("Entries:        {}", f.entries);
    for (reason, count) in result.rejections.iter().filter(|(_, c)| **c > 0) {
        println!("  {:<26}{}", reason.as_str(), count);
    }
    println!();
    println!("--- Performance ---");
    println!("Trades:         {} ({} long, {} short)", s.trade_count, s.long_count, s.short_count);
    println!("Wins / Losses:  {} / {}", s.wins, s.losses);
    println!("Win Rate:       {:.1}%", s.win_rate * 100.0);
    println!("Total P&L:      {:.2}", s.total_pnl);
    println!("Profit Factor:  {:.2}", s.profit_factor);
    println!("Avg R:          {:.3}", s.avg_r);
    for reason in [
        ExitReason::StopLoss,
        ExitReason::TargetR2,
        ExitReason::TrailingStop,
        ExitReason::EodFlatten,
    ] {
        let count = s.by_exit_reason.get(&reason).copied().unwrap_or(0);
        if count > 0 {
            println!("  {:<26}{}", reason.as_str(), count);
        }
    }
    if result.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}
