//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_history_adapter::CsvHistoryAdapter;
use crate::adapters::csv_symbol_adapter::CsvSymbolAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::series_export::write_series_csv;
use crate::domain::config_validation::{validate_analysis_config, validate_data_config};
use crate::domain::error::StopsimError;
use crate::domain::instrument::SymbolTable;
use crate::domain::report::SimulationReport;
use crate::domain::series::PriceSeries;
use crate::domain::simulation::{run_simulation, SimulationWindow, StopLossConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::history_port::HistoryPort;
use crate::ports::reference_port::ReferencePort;

#[derive(Parser, Debug)]
#[command(name = "stopsim", about = "Stop-loss trigger-rate backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a stop-loss analysis
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        /// Override the configured symbol
        #[arg(long)]
        symbol: Option<String>,
        /// Write the cleaned, window-filtered series to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List instruments from the symbol reference table
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the available data range for a symbol
    Info {
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze {
            config,
            symbol,
            export,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config, symbol.as_deref())
            } else {
                run_analyze(&config, symbol.as_deref(), export.as_ref())
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Info { symbol, config } => run_info(symbol.as_deref(), &config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = StopsimError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Inclusive date range the analysis runs over: day-precision, or the
/// coarse whole-year variant.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeSelection {
    Dates { start: NaiveDate, end: NaiveDate },
    Years { from: i32, to: i32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub symbol: String,
    pub selection: RangeSelection,
    pub holding_period_days: i64,
    pub loss_threshold_pct: f64,
}

pub fn build_analysis_config(adapter: &dyn ConfigPort) -> Result<AnalysisConfig, StopsimError> {
    let symbol = adapter
        .get_string("analysis", "symbol")
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| StopsimError::ConfigMissing {
            section: "analysis".into(),
            key: "symbol".into(),
        })?;

    let selection = build_range_selection(adapter)?;

    let holding_period_days = adapter.get_int("analysis", "holding_period_days", 0);
    if holding_period_days < 1 {
        return Err(StopsimError::ConfigInvalid {
            section: "analysis".into(),
            key: "holding_period_days".into(),
            reason: "holding_period_days must be a positive integer".into(),
        });
    }

    let loss_threshold_pct = adapter.get_float("analysis", "stop_loss_pct", -1.0);
    if !(0.0..=100.0).contains(&loss_threshold_pct) {
        return Err(StopsimError::ConfigInvalid {
            section: "analysis".into(),
            key: "stop_loss_pct".into(),
            reason: "stop_loss_pct must be between 0 and 100".into(),
        });
    }

    Ok(AnalysisConfig {
        symbol,
        selection,
        holding_period_days,
        loss_threshold_pct,
    })
}

fn build_range_selection(adapter: &dyn ConfigPort) -> Result<RangeSelection, StopsimError> {
    let start_str = adapter.get_string("analysis", "start_date");
    let end_str = adapter.get_string("analysis", "end_date");

    if start_str.is_some() || end_str.is_some() {
        let start = parse_config_date(start_str.as_deref(), "start_date")?;
        let end = parse_config_date(end_str.as_deref(), "end_date")?;
        return Ok(RangeSelection::Dates { start, end });
    }

    let from = adapter.get_int("analysis", "start_year", 0) as i32;
    let to = adapter.get_int("analysis", "end_year", 0) as i32;
    if from == 0 && to == 0 {
        return Err(StopsimError::ConfigMissing {
            section: "analysis".into(),
            key: "start_date".into(),
        });
    }
    Ok(RangeSelection::Years { from, to })
}

fn parse_config_date(value: Option<&str>, key: &str) -> Result<NaiveDate, StopsimError> {
    let s = value.ok_or_else(|| StopsimError::ConfigMissing {
        section: "analysis".into(),
        key: key.into(),
    })?;
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| StopsimError::ConfigInvalid {
        section: "analysis".into(),
        key: key.into(),
        reason: "invalid date format (expected YYYY-MM-DD)".into(),
    })
}

/// Window-filter the cleaned series and derive the simulation window from
/// the configured range.
pub fn select_analysis_window(
    series: &PriceSeries,
    config: &AnalysisConfig,
) -> Result<(PriceSeries, SimulationWindow), StopsimError> {
    match config.selection {
        RangeSelection::Dates { start, end } => Ok((
            series.select_window(start, end),
            SimulationWindow {
                start_date: start,
                end_date: end,
                holding_period_days: config.holding_period_days,
            },
        )),
        RangeSelection::Years { from, to } => {
            let start = NaiveDate::from_ymd_opt(from, 1, 1).ok_or_else(|| {
                StopsimError::ConfigInvalid {
                    section: "analysis".into(),
                    key: "start_year".into(),
                    reason: "not a valid calendar year".into(),
                }
            })?;
            let end = NaiveDate::from_ymd_opt(to, 12, 31).ok_or_else(|| {
                StopsimError::ConfigInvalid {
                    section: "analysis".into(),
                    key: "end_year".into(),
                    reason: "not a valid calendar year".into(),
                }
            })?;
            Ok((
                series.select_years(from, to),
                SimulationWindow {
                    start_date: start,
                    end_date: end,
                    holding_period_days: config.holding_period_days,
                },
            ))
        }
    }
}

/// Optional reference table: absent config key means an empty table, a
/// configured-but-unreadable file is a warning rather than a failure.
fn load_symbol_table(adapter: &dyn ConfigPort) -> SymbolTable {
    match adapter.get_string("data", "symbols_path") {
        Some(path) => {
            let reference = CsvSymbolAdapter::new(PathBuf::from(&path));
            match reference.load_symbol_table() {
                Ok(table) => table,
                Err(e) => {
                    eprintln!("warning: symbol table unavailable ({e})");
                    SymbolTable::default()
                }
            }
        }
        None => SymbolTable::default(),
    }
}

fn run_analyze(
    config_path: &PathBuf,
    symbol_override: Option<&str>,
    export_path: Option<&PathBuf>,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Validate
    if let Err(e) = validate_data_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_analysis_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 3: Build analysis parameters
    let mut analysis = match build_analysis_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Some(symbol) = symbol_override {
        analysis.symbol = symbol.trim().to_uppercase();
    }

    // Stage 4: Reference table (loaded once, read-only afterwards)
    let symbol_table = load_symbol_table(&adapter);
    let label = symbol_table.display_label(&analysis.symbol);

    // Stage 5: Fetch price history
    let history = match CsvHistoryAdapter::from_config(&adapter) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Loading price history for {}", analysis.symbol);
    let raw_bars = match history.fetch_history(&analysis.symbol) {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 6: Clean and window-filter
    let series = PriceSeries::normalize(&raw_bars);
    eprintln!(
        "  {} raw bars, {} after cleaning",
        raw_bars.len(),
        series.bar_count()
    );

    let (selected, window) = match select_analysis_window(&series, &analysis) {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 7: Simulate
    let stop_config = StopLossConfig {
        loss_threshold_pct: analysis.loss_threshold_pct,
    };
    eprintln!(
        "Simulating: {} to {}, holding {} days, stop at {}%",
        window.start_date, window.end_date, window.holding_period_days, stop_config.loss_threshold_pct
    );
    let outcome = run_simulation(&selected, &window, &stop_config);
    let report = SimulationReport::from_outcome(&outcome);

    // Stage 8: Print report
    println!("=== Stop-Loss Analysis: {} ===", label);
    println!(
        "Window:                  {} to {}",
        window.start_date, window.end_date
    );
    println!(
        "Trials:                  {} ({} skipped on data gaps)",
        report.trial_count, report.skipped_count
    );
    if let (Some(rate), Some(no_stop), Some(with_stop)) = (
        report.trigger_rate_pct,
        report.mean_return_no_stop_pct,
        report.mean_return_with_stop_pct,
    ) {
        println!("Trigger rate:            {:.1}%", rate);
        println!("Avg return, no stop:     {:+.2}%", no_stop);
        println!("Avg return, with stop:   {:+.2}%", with_stop);
    }
    println!();
    println!("{}", report.summary_sentence(analysis.loss_threshold_pct));

    // Stage 9: Export cleaned series for charting
    if let Some(path) = export_path {
        match write_series_csv(path, &selected) {
            Ok(()) => eprintln!("\nSeries written to: {}", path.display()),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }

    ExitCode::SUCCESS
}

pub fn run_dry_run(config_path: &PathBuf, symbol_override: Option<&str>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_data_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_analysis_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let mut analysis = match build_analysis_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Some(symbol) = symbol_override {
        analysis.symbol = symbol.trim().to_uppercase();
    }

    eprintln!("\nResolved analysis:");
    eprintln!("  symbol:         {}", analysis.symbol);
    match analysis.selection {
        RangeSelection::Dates { start, end } => {
            eprintln!("  window:         {} to {}", start, end)
        }
        RangeSelection::Years { from, to } => {
            eprintln!("  window:         years {} to {}", from, to)
        }
    }
    eprintln!("  holding period: {} days", analysis.holding_period_days);
    eprintln!("  stop-loss:      {}%", analysis.loss_threshold_pct);

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_data_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_analysis_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!("Configuration is valid.");
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let table = load_symbol_table(&adapter);
    if !table.is_empty() {
        for instrument in table.instruments() {
            println!("{}   {}", instrument.symbol, instrument.name);
        }
        eprintln!("{} instruments listed", table.len());
        return ExitCode::SUCCESS;
    }

    // No reference table configured: fall back to the history directory
    let history = match CsvHistoryAdapter::from_config(&adapter) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    match history.list_symbols() {
        Ok(symbols) => {
            if symbols.is_empty() {
                eprintln!("No symbols found");
            } else {
                for symbol in &symbols {
                    println!("{}", symbol);
                }
                eprintln!("{} symbols found", symbols.len());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_info(symbol: Option<&str>, config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let symbol = match symbol
        .map(str::to_string)
        .or_else(|| adapter.get_string("analysis", "symbol"))
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
    {
        Some(s) => s,
        None => {
            eprintln!("error: symbol is required (use --symbol or set in config)");
            return ExitCode::from(2);
        }
    };

    let history = match CsvHistoryAdapter::from_config(&adapter) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match history.data_range(&symbol) {
        Ok(Some((min_date, max_date, count))) => {
            println!("{}: {} bars, {} to {}", symbol, count, min_date, max_date);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("{}: no data found", symbol);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
