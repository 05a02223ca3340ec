//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_export_adapter::CsvTableWriter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{StrategyResult, run_backtest};
use crate::domain::error::{BarsignalError, ParseError};
use crate::domain::indicator::{IndicatorType, heikin_ashi};
use crate::domain::indicator_helpers::compute_indicators;
use crate::domain::kind_parser::{parse_indicator_list, parse_signal_list};
use crate::domain::ohlcv::BarSeries;
use crate::domain::signal::{Signal, SignalSpec, detect_signals};
use crate::domain::strategy::StrategyKind;
use crate::domain::table::build_table;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "barsignal", about = "Technical indicators, signals and backtests over daily bars")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute indicators and write them as CSV
    Indicators {
        #[arg(short, long)]
        config: PathBuf,
        /// Output file; defaults to [output] csv, then stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Transform bars to Heikin-Ashi candles first
        #[arg(long)]
        heikin_ashi: bool,
    },
    /// Print detected signal events
    Signals {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Backtest a strategy and print its statistics
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Strategy text such as EMA_CROSS(12,26); overrides [backtest] strategy
        #[arg(short, long)]
        strategy: Option<String>,
    },
    /// Parse a configuration without loading data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Everything one invocation needs, resolved from the INI file.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub data_dir: PathBuf,
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub invert: bool,
    pub heikin_ashi: bool,
    pub indicators: Vec<IndicatorType>,
    pub signals: Vec<SignalSpec>,
    pub strategy: StrategyKind,
    pub output_csv: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Indicators {
            config,
            output,
            heikin_ashi,
        } => run_indicators(&config, output.as_deref(), heikin_ashi),
        Command::Signals { config } => run_signals(&config),
        Command::Backtest { config, strategy } => run_backtest_command(&config, strategy.as_deref()),
        Command::Validate { config } => run_validate(&config),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, BarsignalError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

fn required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, BarsignalError> {
    config
        .get_string(section, key)
        .ok_or_else(|| BarsignalError::ConfigMissing {
            section: section.into(),
            key: key.into(),
        })
}

fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<NaiveDate, BarsignalError> {
    let text = required(config, "data", key)?;
    NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(|_| BarsignalError::ConfigInvalid {
        section: "data".into(),
        key: key.into(),
        reason: "invalid date format (expected YYYY-MM-DD)".into(),
    })
}

/// Parse an optional kind setting, printing a caret diagnostic on failure.
fn parse_setting<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    parse: impl Fn(&str) -> Result<T, ParseError>,
) -> Result<Option<T>, BarsignalError> {
    let Some(text) = config.get_string(section, key) else {
        return Ok(None);
    };
    parse(&text).map(Some).map_err(|e| {
        eprintln!(
            "error: failed to parse [{}] {}:\n{}",
            section,
            key,
            e.display_with_context(&text)
        );
        BarsignalError::from(e)
    })
}

pub fn build_run_config(config: &dyn ConfigPort) -> Result<RunConfig, BarsignalError> {
    let symbol = required(config, "data", "symbol")?;
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;
    if start_date > end_date {
        return Err(BarsignalError::ConfigInvalid {
            section: "data".into(),
            key: "end_date".into(),
            reason: format!("end_date {} is before start_date {}", end_date, start_date),
        });
    }

    let indicators = parse_setting(config, "indicators", "list", parse_indicator_list)?
        .unwrap_or_else(|| vec![IndicatorType::Ema(20)]);
    let signals = parse_setting(config, "signals", "list", parse_signal_list)?.unwrap_or_default();
    let strategy = parse_setting(config, "backtest", "strategy", str::parse::<StrategyKind>)?
        .unwrap_or(StrategyKind::AlwaysLong);

    Ok(RunConfig {
        data_dir: config
            .get_string("data", "dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
        symbol: symbol.to_uppercase(),
        start_date,
        end_date,
        invert: config.get_bool("data", "invert", false),
        heikin_ashi: config.get_bool("data", "heikin_ashi", false),
        indicators,
        signals,
        strategy,
        output_csv: config.get_string("output", "csv").map(PathBuf::from),
    })
}

fn load_run_config(path: &Path) -> Result<RunConfig, BarsignalError> {
    let adapter = load_config(path)?;
    build_run_config(&adapter)
}

fn data_port_for(run: &RunConfig) -> CsvAdapter {
    CsvAdapter::new(run.data_dir.clone()).with_inversion(run.invert)
}

/// Fetch the configured bars, applying the Heikin-Ashi transform if asked.
pub fn load_bars(data_port: &dyn DataPort, run: &RunConfig) -> Result<BarSeries, BarsignalError> {
    let bars = data_port.fetch_bars(&run.symbol, run.start_date, run.end_date)?;
    if bars.is_empty() {
        warn!(
            symbol = %run.symbol,
            start = %run.start_date,
            end = %run.end_date,
            "no bars in range"
        );
    }
    if run.heikin_ashi {
        debug!("applying heikin-ashi transform");
        Ok(heikin_ashi(&bars))
    } else {
        Ok(bars)
    }
}

/// Write the bars joined with `indicators` as CSV. Returns the row count.
pub fn write_indicator_table<W: Write>(
    bars: &BarSeries,
    indicators: &[IndicatorType],
    sink: W,
) -> Result<usize, BarsignalError> {
    let mut map = compute_indicators(bars, indicators);
    // Configured order; a repeated kind keeps its first position.
    let ordered: Vec<_> = indicators.iter().filter_map(|ty| map.remove(ty)).collect();
    let table = build_table(bars, &ordered);
    let mut writer = CsvTableWriter::new(sink);
    writer.write_table(&table)
}

/// Every signal from every spec, ordered by bar index then spec order.
pub fn collect_signals(bars: &BarSeries, specs: &[SignalSpec]) -> Vec<(String, Signal)> {
    let required: Vec<IndicatorType> = specs
        .iter()
        .flat_map(SignalSpec::required_indicators)
        .collect();
    let map = compute_indicators(bars, &required);
    let mut events: Vec<(usize, String, Signal)> = specs
        .iter()
        .enumerate()
        .flat_map(|(order, spec)| {
            let label = spec.to_string();
            detect_signals(bars, &map, spec)
                .into_iter()
                .map(move |s| (order, label.clone(), s))
        })
        .collect();
    events.sort_by_key(|(order, _, s)| (s.index, *order));
    events
        .into_iter()
        .map(|(_, label, signal)| (label, signal))
        .collect()
}

pub fn format_signal(label: &str, signal: &Signal) -> String {
    let direction = signal
        .direction
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!("{}  {}  {}", signal.date, label, direction)
}

pub fn format_result(result: &StrategyResult) -> String {
    let m = &result.metrics;
    let mut out = String::new();
    out.push_str(&format!("Strategy:         {}\n", result.strategy));
    out.push_str(&format!("Bars:             {}\n", result.equity_curve.len()));
    out.push_str(&format!("Total Return:     {:.2}%\n", m.total_return * 100.0));
    out.push_str(&format!("Volatility:       {:.2}%\n", m.volatility * 100.0));
    out.push_str(&format!("Sharpe Ratio:     {:.2}\n", m.sharpe_ratio));
    out.push_str(&format!("Max Drawdown:     -{:.1}%\n", m.max_drawdown * 100.0));
    out.push_str(&format!("Trades:           {}\n", m.trades));
    out.push_str(&format!("Exposure:         {:.1}%\n", m.exposure * 100.0));
    out
}

fn run_indicators(
    config_path: &Path,
    output: Option<&Path>,
    force_heikin_ashi: bool,
) -> Result<(), BarsignalError> {
    // Stage 1: Load config
    let mut run = load_run_config(config_path)?;
    run.heikin_ashi |= force_heikin_ashi;

    // Stage 2: Load bars
    let bars = load_bars(&data_port_for(&run), &run)?;

    // Stage 3: Compute and export
    let output = output.map(Path::to_path_buf).or_else(|| run.output_csv.clone());
    let rows = match &output {
        Some(path) => {
            let file = File::create(path)?;
            let rows = write_indicator_table(&bars, &run.indicators, BufWriter::new(file))?;
            info!(path = %path.display(), rows, "indicator table written");
            rows
        }
        None => write_indicator_table(&bars, &run.indicators, io::stdout().lock())?,
    };
    debug!(rows, indicators = run.indicators.len(), "indicators done");
    Ok(())
}

fn run_signals(config_path: &Path) -> Result<(), BarsignalError> {
    let run = load_run_config(config_path)?;
    if run.signals.is_empty() {
        warn!("no signals configured under [signals] list");
    }
    let bars = load_bars(&data_port_for(&run), &run)?;

    let events = collect_signals(&bars, &run.signals);
    info!(signals = events.len(), "signal detection complete");

    let mut out = io::stdout().lock();
    for (label, signal) in &events {
        writeln!(out, "{}", format_signal(label, signal))?;
    }
    Ok(())
}

fn run_backtest_command(config_path: &Path, strategy: Option<&str>) -> Result<(), BarsignalError> {
    let mut run = load_run_config(config_path)?;
    if let Some(text) = strategy {
        run.strategy = text.parse().map_err(|e: ParseError| {
            eprintln!("error: failed to parse --strategy:\n{}", e.display_with_context(text));
            BarsignalError::from(e)
        })?;
    }

    let bars = load_bars(&data_port_for(&run), &run)?;
    info!(strategy = %run.strategy, bars = bars.len(), "running backtest");
    let result = run_backtest(&bars, &run.strategy);

    print!("{}", format_result(&result));
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), BarsignalError> {
    let run = load_run_config(config_path)?;

    println!("Data:");
    println!("  symbol:      {}", run.symbol);
    println!("  range:       {} to {}", run.start_date, run.end_date);
    println!("  dir:         {}", run.data_dir.display());
    println!("  invert:      {}", run.invert);
    println!("  heikin_ashi: {}", run.heikin_ashi);

    println!("\nIndicators:");
    for ty in &run.indicators {
        println!("  {}", ty);
    }

    println!("\nSignals:");
    for spec in &run.signals {
        println!("  {}", spec);
    }

    println!("\nStrategy:\n  {}", run.strategy);
    println!("\nConfiguration is valid.");
    Ok(())
}
