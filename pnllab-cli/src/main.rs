//! PnL Lab CLI: analyse strategy ledgers from the terminal.
//!
//! Commands:
//! - `analyze`: full analysis of one strategy; prints KPIs and saves artifacts
//! - `day`: legs traded on one date, with slippage-adjusted net PnL
//! - `batch`: analyse several strategies in parallel, one summary line each

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use pnllab_core::domain::TRADE_DATE_FORMAT;
use pnllab_core::{AnalysisMode, TradeTypePolicy};
use pnllab_runner::{
    analyze_strategies, export_json, format_day, init_logging, run_analysis, run_day,
    format_kpi, save_artifacts, AnalysisConfig, AnalysisReport, LogFormat, SourceKind,
};

#[derive(Parser)]
#[command(name = "pnllab", about = "PnL Lab CLI: trade ledger analytics", version)]
struct Cli {
    /// Log filter (e.g. info, debug, pnllab_core=trace). Overrides the config file.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format: pretty, json or compact. Overrides the config file.
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse one strategy's ledger.
    Analyze {
        /// Strategy name (required without --config).
        #[arg(long)]
        strategy: Option<String>,

        #[command(flatten)]
        source: SourceArgs,

        /// Output directory for artifacts. Overrides the config file.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the report manifest as JSON instead of the summary.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Do not write artifacts.
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
    /// Show every leg traded on one date.
    Day {
        /// Trading date (YYYY-MM-DD).
        #[arg(long)]
        date: String,

        /// Strategy name (required without --config).
        #[arg(long)]
        strategy: Option<String>,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Analyse several strategies in parallel.
    Batch {
        /// Strategy names; repeat the flag for each.
        #[arg(long = "strategy", required = true)]
        strategies: Vec<String>,

        #[command(flatten)]
        source: SourceArgs,

        /// Save artifacts for every successful strategy.
        #[arg(long, default_value_t = false)]
        save: bool,

        /// Output directory for artifacts. Overrides the config file.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

/// Where ledgers come from and how to read them.
#[derive(Args)]
struct SourceArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the ledgers. Overrides the config file.
    #[arg(long)]
    ledger_dir: Option<PathBuf>,

    /// Ledger file format. Overrides the config file.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Record shape. Inferred from the strategy when omitted.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Adverse entry slippage in percent. Overrides the config file.
    #[arg(long)]
    slippage_pct: Option<f64>,

    /// Treat unknown trade types as LONG instead of rejecting them.
    #[arg(long, default_value_t = false)]
    lenient_trade_type: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    PerLeg,
    PerSignal,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            strategy,
            source,
            output_dir,
            json,
            no_save,
        } => {
            let mut config = build_config(&source, strategy.as_deref())?;
            if let Some(dir) = output_dir {
                config.output.dir = dir;
            }
            setup_logging(&config, cli.log_level, cli.log_format)?;
            run_analyze_cmd(&config, json, no_save)
        }
        Commands::Day {
            date,
            strategy,
            source,
        } => {
            let config = build_config(&source, strategy.as_deref())?;
            setup_logging(&config, cli.log_level, cli.log_format)?;
            run_day_cmd(&config, &date)
        }
        Commands::Batch {
            strategies,
            source,
            save,
            output_dir,
        } => {
            let first = strategies.first().map(String::as_str);
            let mut config = build_config(&source, first)?;
            if let Some(dir) = output_dir {
                config.output.dir = dir;
            }
            setup_logging(&config, cli.log_level, cli.log_format)?;
            run_batch_cmd(&config, &strategies, save)
        }
    }
}

/// Config file (if any) with command-line overrides applied.
fn build_config(args: &SourceArgs, strategy: Option<&str>) -> Result<AnalysisConfig> {
    let mut config = match (&args.config, strategy) {
        (Some(path), _) => AnalysisConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        (None, Some(name)) => AnalysisConfig::new(name),
        (None, None) => bail!("one of --config or --strategy is required"),
    };

    if let Some(name) = strategy {
        config.analysis.strategy = name.to_string();
    }
    if let Some(dir) = &args.ledger_dir {
        config.source.path = dir.clone();
    } else if args.config.is_none() {
        bail!("--ledger-dir is required without --config");
    }
    if let Some(format) = args.format {
        config.source.kind = match format {
            FormatArg::Csv => SourceKind::Csv,
            FormatArg::Json => SourceKind::Json,
        };
    }
    if let Some(mode) = args.mode {
        config.analysis.mode = Some(match mode {
            ModeArg::PerLeg => AnalysisMode::PerLeg,
            ModeArg::PerSignal => AnalysisMode::PerSignal,
        });
    }
    if let Some(pct) = args.slippage_pct {
        config.analysis.slippage_pct = pct;
    }
    if args.lenient_trade_type {
        config.analysis.trade_type_policy = TradeTypePolicy::LenientLong;
    }

    config.validate()?;
    Ok(config)
}

fn setup_logging(
    config: &AnalysisConfig,
    level: Option<String>,
    format: Option<LogFormat>,
) -> Result<()> {
    let mut log = config.logging.clone();
    if let Some(level) = level {
        log.level = level;
    }
    if let Some(format) = format {
        log.format = format;
    }
    init_logging(&log)?;
    tracing::debug!(
        strategy = config.strategy(),
        mode = %config.mode(),
        ledgers = %config.source.path.display(),
        "config resolved"
    );
    Ok(())
}

fn run_analyze_cmd(config: &AnalysisConfig, json: bool, no_save: bool) -> Result<()> {
    let source = config.source.build();
    let report = run_analysis(config, source.as_ref())?;

    if json {
        println!("{}", export_json(&report)?);
    } else {
        print_summary(&report);
    }

    if !no_save {
        let run_dir = save_artifacts(&report, &config.output.dir)?;
        eprintln!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn run_day_cmd(config: &AnalysisConfig, date: &str) -> Result<()> {
    let date = NaiveDate::parse_from_str(date, TRADE_DATE_FORMAT)
        .with_context(|| format!("invalid date '{date}', expected YYYY-MM-DD"))?;
    let source = config.source.build();
    let detail = run_day(config, source.as_ref(), date)?;
    print!("{}", format_day(&detail));
    Ok(())
}

fn run_batch_cmd(config: &AnalysisConfig, strategies: &[String], save: bool) -> Result<()> {
    let source = config.source.build();
    let outcomes = analyze_strategies(config, source.as_ref(), strategies);

    println!(
        "{:<24} {:<10} {:>8} {:>12} {:>12} {:>12}",
        "strategy", "mode", "periods", "win %", "net profit", "max dd"
    );
    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => {
                let k = &report.analysis.kpis;
                println!(
                    "{:<24} {:<10} {:>8} {:>12.2} {:>12.2} {:>12.2}",
                    outcome.strategy,
                    report.mode.as_str(),
                    k.total_periods,
                    k.win_ratio,
                    k.net_profit,
                    k.max_drawdown
                );
                if save {
                    save_artifacts(report, &config.output.dir)?;
                }
            }
            Err(e) => {
                failed += 1;
                println!("{:<24} FAILED: {e}", outcome.strategy);
            }
        }
    }

    if failed > 0 {
        eprintln!("{failed} of {} strategies failed", outcomes.len());
        std::process::exit(1);
    }
    Ok(())
}

fn print_summary(report: &AnalysisReport) {
    let k = &report.analysis.kpis;
    println!();
    println!("=== PnL Analysis ===");
    println!("Strategy:       {}", report.strategy);
    println!("Collection:     {}", report.collection);
    println!("Mode:           {}", report.mode);
    println!("Slippage:       {:.2}%", report.slippage_pct);
    println!("Records:        {}", report.record_count);
    if let (Some(first), Some(last)) = (report.analysis.rows.first(), report.analysis.rows.last()) {
        println!(
            "Period:         {} to {}",
            first.trade_date, last.trade_date
        );
    }
    println!("Ledger Hash:    {}", report.ledger_hash);
    println!();
    println!("--- Headline ---");
    println!("Win %:             {:.2}", k.win_ratio);
    println!("Net Profit:        {:.2}", k.net_profit);
    println!("Avg. daily profit: {:.2}", k.avg_profit_per_day);
    println!();
    println!("--- Statistics ---");
    for (label, value) in k.labeled() {
        println!("{label:<28}{:>12}", format_kpi(value));
    }
    if let Some(cal) = &report.analysis.calendar {
        println!();
        println!("--- Monthly ---");
        for b in &cal.monthly {
            println!("{:<12}{:>12.2}", b.label, b.net_pnl);
        }
        println!();
        println!("--- Weekday ---");
        for b in &cal.weekday {
            println!("{:<12}{:>12.2}", b.label, b.net_pnl);
        }
    }
    println!();
}
