//! Configuration validation.
//!
//! Each section validator reads its keys through [`ConfigPort`], rejects bad
//! values with a `ConfigInvalid`/`ConfigMissing` error naming the key, and
//! returns the typed value the rest of the crate runs on.

use crate::domain::backtest::{DEFAULT_WARMUP, SimulatorConfig};
use crate::domain::error::TrendscoreError;
use crate::domain::indicator_helpers::IndicatorParams;
use crate::domain::metrics::ReadinessThresholds;
use crate::domain::scorer::{SCORE_MAX, SCORE_MIN, SignalThresholds};
use crate::domain::universe::parse_codes;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

/// Date window, warmup and exit rules from `[backtest]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSettings {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub warmup: usize,
    pub simulator: SimulatorConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    pub thresholds: SignalThresholds,
    pub indicators: IndicatorParams,
    pub backtest: BacktestSettings,
    pub exchange: String,
    pub codes: Vec<String>,
    pub readiness: ReadinessThresholds,
}

/// Every section, including the exchange and code list a backtest needs.
pub fn validate_all(config: &dyn ConfigPort) -> Result<ValidatedConfig, TrendscoreError> {
    Ok(ValidatedConfig {
        thresholds: validate_signal_config(config)?,
        indicators: validate_indicator_config(config)?,
        backtest: validate_backtest_config(config)?,
        exchange: validate_exchange(config)?,
        codes: validate_codes(config)?,
        readiness: validate_report_config(config)?,
    })
}

pub fn validate_signal_config(config: &dyn ConfigPort) -> Result<SignalThresholds, TrendscoreError> {
    let defaults = SignalThresholds::default();
    let thresholds = SignalThresholds {
        buy: config.get_double("signal", "buy_threshold", defaults.buy),
        sell: config.get_double("signal", "sell_threshold", defaults.sell),
        short: config.get_double("signal", "short_threshold", defaults.short),
    };

    for (key, value) in [
        ("buy_threshold", thresholds.buy),
        ("sell_threshold", thresholds.sell),
        ("short_threshold", thresholds.short),
    ] {
        if !(SCORE_MIN..=SCORE_MAX).contains(&value) {
            return Err(TrendscoreError::config_invalid(
                "signal",
                key,
                format!("{key} must be between {SCORE_MIN} and {SCORE_MAX}"),
            ));
        }
    }
    if thresholds.sell >= thresholds.buy {
        return Err(TrendscoreError::config_invalid(
            "signal",
            "sell_threshold",
            "sell_threshold must be below buy_threshold",
        ));
    }
    if thresholds.short > thresholds.sell {
        return Err(TrendscoreError::config_invalid(
            "signal",
            "short_threshold",
            "short_threshold must not exceed sell_threshold",
        ));
    }
    Ok(thresholds)
}

pub fn validate_indicator_config(
    config: &dyn ConfigPort,
) -> Result<IndicatorParams, TrendscoreError> {
    let d = IndicatorParams::default();
    let params = IndicatorParams {
        ema_fast: period(config, "ema_fast", d.ema_fast)?,
        ema_medium: period(config, "ema_medium", d.ema_medium)?,
        ema_slow: period(config, "ema_slow", d.ema_slow)?,
        rsi_period: period(config, "rsi_period", d.rsi_period)?,
        macd_fast: period(config, "macd_fast", d.macd_fast)?,
        macd_slow: period(config, "macd_slow", d.macd_slow)?,
        macd_signal: period(config, "macd_signal", d.macd_signal)?,
        bb_period: period(config, "bb_period", d.bb_period)?,
        bb_stddev: config.get_double("indicators", "bb_stddev", d.bb_stddev),
        atr_period: period(config, "atr_period", d.atr_period)?,
        volume_ma_period: period(config, "volume_ma_period", d.volume_ma_period)?,
    };

    if params.bb_stddev <= 0.0 {
        return Err(TrendscoreError::config_invalid(
            "indicators",
            "bb_stddev",
            "bb_stddev must be positive",
        ));
    }
    Ok(params)
}

fn period(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, TrendscoreError> {
    let value = config.get_int("indicators", key, default as i64);
    if value < 1 {
        return Err(TrendscoreError::config_invalid(
            "indicators",
            key,
            format!("{key} must be at least 1"),
        ));
    }
    Ok(value as usize)
}

/// `stop_loss` and `take_profit` are configured in percent and returned as
/// fractions.
pub fn validate_backtest_config(
    config: &dyn ConfigPort,
) -> Result<BacktestSettings, TrendscoreError> {
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start >= end {
            return Err(TrendscoreError::config_invalid(
                "backtest",
                "start_date",
                "start_date must be before end_date",
            ));
        }
    }

    let warmup = config.get_int("backtest", "warmup", DEFAULT_WARMUP as i64);
    if warmup < 0 {
        return Err(TrendscoreError::config_invalid(
            "backtest",
            "warmup",
            "warmup must be non-negative",
        ));
    }

    let stop_loss = config.get_double("backtest", "stop_loss", 5.0);
    if stop_loss <= 0.0 || stop_loss >= 100.0 {
        return Err(TrendscoreError::config_invalid(
            "backtest",
            "stop_loss",
            "stop_loss must be between 0 and 100 percent",
        ));
    }
    let take_profit = config.get_double("backtest", "take_profit", 10.0);
    if take_profit <= 0.0 {
        return Err(TrendscoreError::config_invalid(
            "backtest",
            "take_profit",
            "take_profit must be positive",
        ));
    }

    Ok(BacktestSettings {
        start_date,
        end_date,
        warmup: warmup as usize,
        simulator: SimulatorConfig {
            stop_loss: stop_loss / 100.0,
            take_profit: take_profit / 100.0,
            allow_shorting: config.get_bool("backtest", "allow_shorting", false),
        },
    })
}

fn parse_date(config: &dyn ConfigPort, field: &str) -> Result<Option<NaiveDate>, TrendscoreError> {
    match config.get_string("backtest", field) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                TrendscoreError::config_invalid(
                    "backtest",
                    field,
                    format!("invalid {field} format, expected YYYY-MM-DD"),
                )
            }),
    }
}

pub fn validate_exchange(config: &dyn ConfigPort) -> Result<String, TrendscoreError> {
    match config.get_string("backtest", "exchange") {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_uppercase()),
        _ => Err(TrendscoreError::ConfigMissing {
            section: "backtest".to_string(),
            key: "exchange".to_string(),
        }),
    }
}

/// `codes` wins over `code` when both are set.
pub fn validate_codes(config: &dyn ConfigPort) -> Result<Vec<String>, TrendscoreError> {
    let codes = config.get_string("backtest", "codes");
    let code = config.get_string("backtest", "code");

    match (codes, code) {
        (Some(c), _) if !c.trim().is_empty() => Ok(parse_codes(&c)?),
        (_, Some(c)) if !c.trim().is_empty() => Ok(parse_codes(&c)?),
        _ => Err(TrendscoreError::ConfigMissing {
            section: "backtest".to_string(),
            key: "codes".to_string(),
        }),
    }
}

pub fn validate_report_config(
    config: &dyn ConfigPort,
) -> Result<ReadinessThresholds, TrendscoreError> {
    let defaults = ReadinessThresholds::default();
    let min_win_rate = config.get_double("report", "min_win_rate", defaults.min_win_rate);
    if !(0.0..=1.0).contains(&min_win_rate) {
        return Err(TrendscoreError::config_invalid(
            "report",
            "min_win_rate",
            "min_win_rate must be between 0 and 1",
        ));
    }
    let min_recovery_factor =
        config.get_double("report", "min_recovery_factor", defaults.min_recovery_factor);
    if min_recovery_factor < 0.0 {
        return Err(TrendscoreError::config_invalid(
            "report",
            "min_recovery_factor",
            "min_recovery_factor must be non-negative",
        ));
    }
    Ok(ReadinessThresholds {
        min_win_rate,
        min_recovery_factor,
    })
}
