//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_trade_exporter::CsvTradeExporter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_exporter::JsonReportExporter;
use crate::domain::backtest::{BacktestConfig, run_backtest};
use crate::domain::config_validation::{
    BacktestSettings, validate_all, validate_backtest_config, validate_codes, validate_exchange,
    validate_indicator_config, validate_report_config, validate_signal_config,
};
use crate::domain::error::TrendscoreError;
use crate::domain::indicator_helpers::compute_indicator_sets;
use crate::domain::metrics::{PerformanceReport, PortfolioSummary, SymbolResult, summarize};
use crate::domain::position::Trade;
use crate::domain::scorer::{ScoreResult, score};
use crate::domain::universe::{parse_codes, validate_universe};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_OUTPUT_DIR: &str = "reports";
const TRADES_SHOWN: usize = 3;

#[derive(Parser, Debug)]
#[command(
    name = "trendscore",
    about = "Indicator-driven signal scoring and backtesting"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score the latest bar of each symbol
    Score {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        exchange: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Run a walk-forward backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        exchange: Option<String>,
        /// Write trades CSV and report JSON to [report] output_dir
        #[arg(long)]
        save: bool,
        #[arg(long)]
        json: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List available symbols on an exchange
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        exchange: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn execute(command: Command) -> Result<(), TrendscoreError> {
    match command {
        Command::Score {
            config,
            code,
            exchange,
            json,
        } => run_score(&config, code.as_deref(), exchange.as_deref(), json),
        Command::Backtest {
            config,
            code,
            exchange,
            save,
            json,
        } => run_backtest_command(&config, code.as_deref(), exchange.as_deref(), save, json),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config, exchange } => {
            run_list_symbols(&config, exchange.as_deref())
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TrendscoreError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

/// Everything a backtest needs out of the config file.
pub fn build_backtest_config(
    config: &dyn ConfigPort,
) -> Result<(BacktestConfig, BacktestSettings), TrendscoreError> {
    let settings = validate_backtest_config(config)?;
    let bt = BacktestConfig {
        indicators: validate_indicator_config(config)?,
        thresholds: validate_signal_config(config)?,
        warmup: settings.warmup,
        simulator: settings.simulator,
    };
    Ok((bt, settings))
}

/// `--code` overrides the configured code list.
pub fn resolve_codes(
    code_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, TrendscoreError> {
    match code_override {
        Some(c) => Ok(parse_codes(c)?),
        None => validate_codes(config),
    }
}

pub fn resolve_exchange(
    exchange_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<String, TrendscoreError> {
    match exchange_override {
        Some(e) if !e.trim().is_empty() => Ok(e.trim().to_uppercase()),
        _ => validate_exchange(config),
    }
}

pub fn data_adapter(config: &dyn ConfigPort) -> CsvAdapter {
    let dir = config
        .get_string("backtest", "data_dir")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
    CsvAdapter::new(PathBuf::from(dir))
}

#[derive(Serialize)]
struct ScoredSymbol<'a> {
    symbol: &'a str,
    date: chrono::NaiveDate,
    close: f64,
    result: &'a ScoreResult,
}

fn run_score(
    config_path: &Path,
    code_override: Option<&str>,
    exchange_override: Option<&str>,
    json: bool,
) -> Result<(), TrendscoreError> {
    let config = load_config(config_path)?;
    let thresholds = validate_signal_config(&config)?;
    let indicators = validate_indicator_config(&config)?;
    let settings = validate_backtest_config(&config)?;
    let exchange = resolve_exchange(exchange_override, &config)?;
    let codes = resolve_codes(code_override, &config)?;
    let data_port = data_adapter(&config);

    let mut scored = Vec::new();
    for code in &codes {
        let bars = match data_port.fetch_ohlcv(code, &exchange, settings.start_date, settings.end_date)
        {
            Ok(bars) => bars,
            Err(e) => {
                warn!(%code, error = %e, "skipping code");
                continue;
            }
        };
        let Some(last) = bars.last() else {
            warn!(%code, %exchange, "skipping code: no data found");
            continue;
        };
        let sets = compute_indicator_sets(&bars, &indicators);
        let result = score(&sets[sets.len() - 1], &thresholds);
        scored.push((code.as_str(), last.date, last.close, result));
    }

    if scored.is_empty() {
        return Err(TrendscoreError::NoData {
            code: codes.join(","),
            exchange,
        });
    }

    if json {
        let out: Vec<ScoredSymbol> = scored
            .iter()
            .map(|(symbol, date, close, result)| ScoredSymbol {
                symbol,
                date: *date,
                close: *close,
                result,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for (symbol, date, close, result) in &scored {
            print!("{}", format_score(symbol, *date, *close, result));
        }
    }
    Ok(())
}

pub fn format_score(symbol: &str, date: chrono::NaiveDate, close: f64, result: &ScoreResult) -> String {
    let mut s = String::new();
    let _ = writeln!(
        s,
        "{symbol} {date} close={close:.2}  {}  score={:.1}  confidence={:.0}%",
        result.signal,
        result.score,
        result.confidence * 100.0
    );
    for reason in &result.reasons {
        let _ = writeln!(s, "  - {reason}");
    }
    if let Some(pct) = result.metadata.stop_loss_pct {
        let _ = writeln!(s, "  stop distance: {pct:.2}%");
    }
    s
}

#[derive(Serialize)]
struct BacktestOutput<'a> {
    results: Vec<SymbolOutput<'a>>,
    summary: &'a PortfolioSummary,
}

#[derive(Serialize)]
struct SymbolOutput<'a> {
    symbol: &'a str,
    report: &'a PerformanceReport,
    trades: &'a [Trade],
}

fn run_backtest_command(
    config_path: &Path,
    code_override: Option<&str>,
    exchange_override: Option<&str>,
    save: bool,
    json: bool,
) -> Result<(), TrendscoreError> {
    let config = load_config(config_path)?;
    let (bt_config, settings) = build_backtest_config(&config)?;
    let readiness = validate_report_config(&config)?;
    let exchange = resolve_exchange(exchange_override, &config)?;
    let codes = resolve_codes(code_override, &config)?;
    let data_port = data_adapter(&config);

    info!(codes = codes.len(), %exchange, "validating universe");
    let validation = validate_universe(
        &data_port,
        codes,
        &exchange,
        settings.start_date,
        settings.end_date,
    )?;

    let mut runs: Vec<(SymbolResult, Vec<Trade>)> = Vec::new();
    for code in &validation.universe.codes {
        let bars = data_port.fetch_ohlcv(code, &exchange, settings.start_date, settings.end_date)?;
        info!(%code, bars = bars.len(), warmup = bt_config.warmup, "running backtest");
        let trades = run_backtest(&bars, &bt_config);
        let report = summarize(&trades, &readiness);
        runs.push((
            SymbolResult {
                symbol: code.clone(),
                report,
            },
            trades,
        ));
    }

    let results: Vec<SymbolResult> = runs.iter().map(|(r, _)| r.clone()).collect();
    let summary = PortfolioSummary::from_results(&results);

    if save {
        let output_dir = config
            .get_string("report", "output_dir")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());
        let exporters: [&dyn ReportPort; 2] = [&CsvTradeExporter, &JsonReportExporter];
        for (result, trades) in &runs {
            for exporter in exporters {
                let path = exporter.write(
                    &result.symbol,
                    trades,
                    &result.report,
                    Path::new(&output_dir),
                )?;
                info!(path = %path.display(), "exported");
            }
        }
    }

    if json {
        let out = BacktestOutput {
            results: runs
                .iter()
                .map(|(r, trades)| SymbolOutput {
                    symbol: &r.symbol,
                    report: &r.report,
                    trades,
                })
                .collect(),
            summary: &summary,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for (result, trades) in &runs {
            print!("{}", format_report(&result.symbol, &result.report, trades));
        }
        print!("{}", format_summary(&summary));
    }
    Ok(())
}

pub fn format_report(symbol: &str, report: &PerformanceReport, trades: &[Trade]) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "\n=== {symbol} ===");
    if let Some(message) = &report.message {
        let _ = writeln!(s, "{message}");
        return s;
    }
    let _ = writeln!(
        s,
        "Trades:           {} ({} wins, {} losses)",
        report.total_trades, report.wins, report.losses
    );
    let _ = writeln!(s, "Win Rate:         {:.2}%", report.win_rate * 100.0);
    let _ = writeln!(s, "Avg Return:       {:.2}%", report.avg_return_pct);
    let _ = writeln!(s, "Total Return:     {:.2}%", report.total_profit_pct);
    let _ = writeln!(
        s,
        "Best / Worst:     {:.2}% / {:.2}%",
        report.max_gain_pct, report.max_loss_pct
    );
    let _ = writeln!(s, "Sharpe Ratio:     {:.2}", report.sharpe_ratio);
    let _ = writeln!(s, "Max Drawdown:     {:.2}%", report.max_drawdown_pct);
    let _ = writeln!(s, "Recovery Factor:  {:.2}", report.recovery_factor);
    let _ = writeln!(s, "Profit Factor:    {:.2}", report.profit_factor);
    let _ = writeln!(s, "Max Loss Streak:  {}", report.max_consecutive_losses);
    let _ = writeln!(s, "Expectancy:       {:.2}%", report.expectancy);
    let _ = writeln!(
        s,
        "Institution Ready: {}",
        if report.institution_ready { "yes" } else { "no" }
    );
    if !trades.is_empty() {
        let _ = writeln!(s, "First trades:");
        for t in trades.iter().take(TRADES_SHOWN) {
            let _ = writeln!(
                s,
                "  {} {} @ {:.2} -> {} @ {:.2}  {:+.2}% ({})",
                t.direction, t.entry_date, t.entry_price, t.exit_date, t.exit_price, t.return_pct,
                t.exit_reason
            );
        }
    }
    s
}

pub fn format_summary(summary: &PortfolioSummary) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "\n=== Summary ===");
    let _ = writeln!(s, "Symbols with trades: {}", summary.symbols_tested);
    let _ = writeln!(
        s,
        "Total trades:        {} ({} wins, {} losses)",
        summary.total_trades, summary.total_wins, summary.total_losses
    );
    let _ = writeln!(s, "Avg win rate:        {:.2}%", summary.avg_win_rate * 100.0);
    let _ = writeln!(s, "Avg Sharpe:          {:.2}", summary.avg_sharpe_ratio);
    let _ = writeln!(s, "Avg recovery:        {:.2}", summary.avg_recovery_factor);
    let _ = writeln!(s, "Total return:        {:.2}%", summary.total_return_pct);
    let ready = if summary.institution_ready.is_empty() {
        "none".to_string()
    } else {
        summary.institution_ready.join(", ")
    };
    let _ = writeln!(s, "Institution ready:   {ready}");
    s
}

fn run_validate(config_path: &Path) -> Result<(), TrendscoreError> {
    let config = load_config(config_path)?;
    let v = validate_all(&config)?;

    println!("Configuration is valid: {}", config_path.display());
    println!(
        "  thresholds: buy >= {:.2}, sell <= {:.2}, short <= {:.2}",
        v.thresholds.buy, v.thresholds.sell, v.thresholds.short
    );
    println!(
        "  exits: stop loss {:.2}%, take profit {:.2}%, shorting {}",
        v.backtest.simulator.stop_loss * 100.0,
        v.backtest.simulator.take_profit * 100.0,
        if v.backtest.simulator.allow_shorting { "on" } else { "off" }
    );
    println!("  warmup: {} bars", v.backtest.warmup);
    println!("  universe: {} on {}", v.codes.join(", "), v.exchange);
    println!(
        "  readiness: win rate >= {:.2}, recovery factor >= {:.2}",
        v.readiness.min_win_rate, v.readiness.min_recovery_factor
    );
    Ok(())
}

fn run_list_symbols(config_path: &Path, exchange_override: Option<&str>) -> Result<(), TrendscoreError> {
    let config = load_config(config_path)?;
    let exchange = resolve_exchange(exchange_override, &config)?;
    let symbols = data_adapter(&config).list_symbols(&exchange)?;

    if symbols.is_empty() {
        eprintln!("No symbols found for exchange {}", exchange);
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}
