//! Trade-level performance statistics.
//!
//! Everything is computed over each trade's `return_pct`, in trade order.
//! Drawdown lives in return space: the equity curve is the running sum of
//! trade returns starting at zero, not a capital balance.

use serde::{Deserialize, Serialize};

use super::position::{Trade, round2};

pub const NO_TRADES_MESSAGE: &str = "No trades generated";

/// Gate for [`PerformanceReport::institution_ready`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadinessThresholds {
    pub min_win_rate: f64,
    pub min_recovery_factor: f64,
}

impl Default for ReadinessThresholds {
    fn default() -> Self {
        ReadinessThresholds {
            min_win_rate: 0.55,
            min_recovery_factor: 2.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    /// Fraction in [0, 1].
    pub win_rate: f64,
    pub avg_return_pct: f64,
    pub max_gain_pct: f64,
    pub max_loss_pct: f64,
    pub avg_win_pct: f64,
    pub avg_loss_pct: f64,
    pub total_profit_pct: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_pct: f64,
    pub recovery_factor: f64,
    pub profit_factor: f64,
    pub max_consecutive_losses: usize,
    pub expectancy: f64,
    pub institution_ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PerformanceReport {
    pub fn empty() -> Self {
        PerformanceReport {
            message: Some(NO_TRADES_MESSAGE.to_string()),
            ..Default::default()
        }
    }
}

pub fn summarize(trades: &[Trade], readiness: &ReadinessThresholds) -> PerformanceReport {
    if trades.is_empty() {
        return PerformanceReport::empty();
    }

    let returns: Vec<f64> = trades.iter().map(|t| t.return_pct).collect();
    let total_trades = returns.len();

    let gains: Vec<f64> = returns.iter().copied().filter(|r| *r > 0.0).collect();
    let losses: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    let win_rate = gains.len() as f64 / total_trades as f64;

    let total_profit: f64 = returns.iter().sum();
    let avg_return = total_profit / total_trades as f64;
    let max_gain = returns.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let max_loss = returns.iter().copied().fold(f64::INFINITY, f64::min);

    let sharpe_ratio = match sample_stdev(&returns) {
        Some(sd) if sd > 0.0 => avg_return / sd,
        _ => 0.0,
    };

    let (max_drawdown, max_drawdown_pct) = compute_drawdown(&returns);

    let recovery_factor = if max_drawdown != 0.0 {
        total_profit / max_drawdown.abs()
    } else {
        0.0
    };

    let gross_profit: f64 = gains.iter().sum();
    let gross_loss: f64 = losses.iter().sum::<f64>().abs();
    let profit_factor = if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else {
        0.0
    };

    let avg_win = mean(&gains);
    let avg_loss = mean(&losses);
    let expectancy = win_rate * avg_win + (1.0 - win_rate) * avg_loss;

    let institution_ready =
        win_rate >= readiness.min_win_rate && recovery_factor >= readiness.min_recovery_factor;

    PerformanceReport {
        total_trades,
        wins: gains.len(),
        losses: losses.len(),
        win_rate: round4(win_rate),
        avg_return_pct: round2(avg_return),
        max_gain_pct: round2(max_gain),
        max_loss_pct: round2(max_loss),
        avg_win_pct: round2(avg_win),
        avg_loss_pct: round2(avg_loss),
        total_profit_pct: round2(total_profit),
        sharpe_ratio: round2(sharpe_ratio),
        max_drawdown: round2(max_drawdown),
        max_drawdown_pct: round2(max_drawdown_pct),
        recovery_factor: round2(recovery_factor),
        profit_factor: round2(profit_factor),
        max_consecutive_losses: max_consecutive_losses(&returns),
        expectancy: round2(expectancy),
        institution_ready,
        message: None,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Sample standard deviation (n - 1). `None` below two values.
fn sample_stdev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Returns (max_drawdown, max_drawdown_pct). The pct is relative to the final
/// running peak, zero when that peak is zero.
fn compute_drawdown(returns: &[f64]) -> (f64, f64) {
    let mut cumulative = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;

    for r in returns {
        cumulative += r;
        peak = peak.max(cumulative);
        max_dd = max_dd.min(cumulative - peak);
    }

    let pct = if peak != 0.0 { max_dd / peak * 100.0 } else { 0.0 };
    (max_dd, pct)
}

fn max_consecutive_losses(returns: &[f64]) -> usize {
    let mut run = 0usize;
    let mut longest = 0usize;
    for r in returns {
        if *r < 0.0 {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round_ties_even() / 10_000.0
}

/// One symbol's backtest outcome, as fed to [`PortfolioSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolResult {
    pub symbol: String,
    pub report: PerformanceReport,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub symbols_tested: usize,
    pub total_trades: usize,
    pub total_wins: usize,
    pub total_losses: usize,
    pub avg_win_rate: f64,
    pub avg_sharpe_ratio: f64,
    pub avg_recovery_factor: f64,
    pub total_return_pct: f64,
    pub institution_ready: Vec<String>,
}

impl PortfolioSummary {
    /// Aggregates symbols with at least one trade; others are ignored.
    pub fn from_results(results: &[SymbolResult]) -> Self {
        let traded: Vec<&SymbolResult> = results
            .iter()
            .filter(|r| r.report.total_trades > 0)
            .collect();
        if traded.is_empty() {
            return PortfolioSummary::default();
        }

        let n = traded.len() as f64;
        let avg = |f: fn(&PerformanceReport) -> f64| {
            traded.iter().map(|r| f(&r.report)).sum::<f64>() / n
        };

        PortfolioSummary {
            symbols_tested: traded.len(),
            total_trades: traded.iter().map(|r| r.report.total_trades).sum(),
            total_wins: traded.iter().map(|r| r.report.wins).sum(),
            total_losses: traded.iter().map(|r| r.report.losses).sum(),
            avg_win_rate: round4(avg(|r| r.win_rate)),
            avg_sharpe_ratio: round2(avg(|r| r.sharpe_ratio)),
            avg_recovery_factor: round2(avg(|r| r.recovery_factor)),
            total_return_pct: round2(traded.iter().map(|r| r.report.total_profit_pct).sum()),
            institution_ready: traded
                .iter()
                .filter(|r| r.report.institution_ready)
                .map(|r| r.symbol.clone())
                .collect(),
        }
    }
}
