//! Signal-driven position simulator and walk-forward signal preparation.
//!
//! The simulator holds at most one position. It is long-only unless
//! [`SimulatorConfig::allow_shorting`] is set, in which case SHORT opens a
//! short from flat and BUY covers it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::indicator_helpers::{IndicatorParams, compute_indicator_sets};
use super::indicator_set::IndicatorSet;
use super::ohlcv::OhlcvBar;
use super::position::{Direction, ExitReason, OpenPosition, Trade};
use super::scorer::{Signal, SignalThresholds, score};

pub const DEFAULT_WARMUP: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Fraction, 0.05 = 5%.
    pub stop_loss: f64,
    /// Fraction, 0.10 = 10%.
    pub take_profit: f64,
    pub allow_shorting: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            stop_loss: 0.05,
            take_profit: 0.10,
            allow_shorting: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub signal: Option<Signal>,
}

/// Everything needed to turn one symbol's bars into trades.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub indicators: IndicatorParams,
    pub thresholds: SignalThresholds,
    pub warmup: usize,
    pub simulator: SimulatorConfig,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            indicators: IndicatorParams::default(),
            thresholds: SignalThresholds::default(),
            warmup: DEFAULT_WARMUP,
            simulator: SimulatorConfig::default(),
        }
    }
}

/// Score every bar from its own indicator set. Bars before `warmup` carry no
/// signal. Indicators are causal, so each set equals what a prefix-only
/// computation would produce.
pub fn prepare_signals(
    bars: &[OhlcvBar],
    sets: &[IndicatorSet],
    thresholds: &SignalThresholds,
    warmup: usize,
) -> Vec<SignalPoint> {
    bars.iter()
        .zip(sets)
        .enumerate()
        .map(|(i, (bar, set))| SignalPoint {
            date: bar.date,
            close: bar.close,
            signal: (i >= warmup).then(|| score(set, thresholds).signal),
        })
        .collect()
}

pub fn simulate(series: &[SignalPoint], config: &SimulatorConfig) -> Vec<Trade> {
    let mut trades = Vec::new();
    let mut position: Option<OpenPosition> = None;

    for point in series {
        let Some(signal) = point.signal else {
            continue;
        };

        match position {
            None => {
                position = match signal {
                    Signal::Buy => Some(OpenPosition::long(point.date, point.close)),
                    Signal::Short if config.allow_shorting => {
                        Some(OpenPosition::short(point.date, point.close))
                    }
                    _ => None,
                };
            }
            Some(open) => {
                let closing_signal = match open.direction {
                    Direction::Long => Signal::Sell,
                    Direction::Short => Signal::Buy,
                };
                let exit = open
                    .risk_exit(point.close, config.stop_loss, config.take_profit)
                    .or((signal == closing_signal).then_some(ExitReason::Signal));
                if let Some(reason) = exit {
                    trades.push(open.close(point.date, point.close, reason));
                    position = None;
                }
            }
        }
    }

    trades
}

/// Indicators, walk-forward signals and simulation for one symbol.
pub fn run_backtest(bars: &[OhlcvBar], config: &BacktestConfig) -> Vec<Trade> {
    let sets = compute_indicator_sets(bars, &config.indicators);
    let series = prepare_signals(bars, &sets, &config.thresholds, config.warmup);
    simulate(&series, &config.simulator)
}
