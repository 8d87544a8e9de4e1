//! Signal scoring engine.
//!
//! Five rules run in a fixed order over one bar's [`IndicatorSet`]. Each rule
//! adds points and a reason when all of its inputs are present; a rule with
//! any missing input is skipped. The summed score is clamped to
//! [`SCORE_MIN`, `SCORE_MAX`] and classified against [`SignalThresholds`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::indicator_set::IndicatorSet;
use super::position::round2;

pub const SCORE_MIN: f64 = -10.0;
pub const SCORE_MAX: f64 = 10.0;

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

pub const VOLUME_HIGH: f64 = 1.5;
pub const VOLUME_ABOVE_AVG: f64 = 1.2;
pub const VOLUME_LOW: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
    Short,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
            Signal::Short => "SHORT",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Signal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(Signal::Buy),
            "SELL" => Ok(Signal::Sell),
            "HOLD" => Ok(Signal::Hold),
            "SHORT" => Ok(Signal::Short),
            other => Err(format!("unknown signal: {other}")),
        }
    }
}

/// Classification thresholds. `short` must not exceed `sell`; config
/// validation enforces this, classification does not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalThresholds {
    pub buy: f64,
    pub sell: f64,
    pub short: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        SignalThresholds {
            buy: 4.0,
            sell: -0.5,
            short: -7.0,
        }
    }
}

impl SignalThresholds {
    /// BUY, then SHORT, then SELL, else HOLD.
    pub fn classify(&self, score: f64) -> Signal {
        if score >= self.buy {
            Signal::Buy
        } else if score <= self.short {
            Signal::Short
        } else if score <= self.sell {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStrength {
    StrongUp,
    ModerateUp,
    WeakUp,
    StrongDown,
    ModerateDown,
    WeakDown,
    Mixed,
}

impl TrendStrength {
    pub fn points(&self) -> f64 {
        match self {
            TrendStrength::StrongUp => 3.0,
            TrendStrength::ModerateUp => 2.0,
            TrendStrength::WeakUp => 1.0,
            TrendStrength::StrongDown => -3.0,
            TrendStrength::ModerateDown => -2.0,
            TrendStrength::WeakDown => -1.0,
            TrendStrength::Mixed => 0.0,
        }
    }

    fn reason(&self) -> Option<&'static str> {
        match self {
            TrendStrength::StrongUp => Some("STRONG_UPTREND: close > EMA20 > EMA50 > EMA200"),
            TrendStrength::ModerateUp => Some("UPTREND: close > EMA20 > EMA50"),
            TrendStrength::WeakUp => Some("WEAK_UPTREND: close > EMA50"),
            TrendStrength::StrongDown => Some("STRONG_DOWNTREND: close < EMA20 < EMA50 < EMA200"),
            TrendStrength::ModerateDown => Some("DOWNTREND: close < EMA20 < EMA50"),
            TrendStrength::WeakDown => Some("WEAK_DOWNTREND: close < EMA50"),
            TrendStrength::Mixed => None,
        }
    }
}

/// EMA alignment cascade; the first matching branch wins.
pub fn classify_trend(close: f64, ema20: f64, ema50: f64, ema200: f64) -> TrendStrength {
    if close > ema20 && ema20 > ema50 && ema50 > ema200 {
        TrendStrength::StrongUp
    } else if close > ema20 && ema20 > ema50 {
        TrendStrength::ModerateUp
    } else if close > ema50 {
        TrendStrength::WeakUp
    } else if close < ema20 && ema20 < ema50 && ema50 < ema200 {
        TrendStrength::StrongDown
    } else if close < ema20 && ema20 < ema50 {
        TrendStrength::ModerateDown
    } else if close < ema50 {
        TrendStrength::WeakDown
    } else {
        TrendStrength::Mixed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiState {
    Neutral,
    Overbought,
    Oversold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdState {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BollingerState {
    AboveUpper,
    BelowLower,
    InRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeState {
    High,
    AboveAvg,
    Low,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    UptrendEntry,
    DowntrendEntry,
    ExitOrAvoid,
    Wait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionDirection {
    Long,
    Short,
    Neutral,
}

impl From<Signal> for (SignalType, PositionDirection) {
    fn from(signal: Signal) -> Self {
        match signal {
            Signal::Buy => (SignalType::UptrendEntry, PositionDirection::Long),
            Signal::Short => (SignalType::DowntrendEntry, PositionDirection::Short),
            Signal::Sell => (SignalType::ExitOrAvoid, PositionDirection::Neutral),
            Signal::Hold => (SignalType::Wait, PositionDirection::Neutral),
        }
    }
}

/// Audit trail for one score: the inputs read and each rule's classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreMetadata {
    pub inputs: IndicatorSet,
    pub trend_strength: Option<TrendStrength>,
    pub rsi_state: Option<RsiState>,
    pub macd_state: Option<MacdState>,
    pub bb_state: Option<BollingerState>,
    pub volume_state: Option<VolumeState>,
    pub stop_loss_distance: Option<f64>,
    pub stop_loss_pct: Option<f64>,
    pub signal_type: SignalType,
    pub position_direction: PositionDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub signal: Signal,
    pub score: f64,
    pub confidence: f64,
    pub reasons: Vec<String>,
    pub metadata: ScoreMetadata,
}

/// Confidence in [0, 1]: (score + 10) / 20.
pub fn confidence_for(score: f64) -> f64 {
    (score - SCORE_MIN) / (SCORE_MAX - SCORE_MIN)
}

#[derive(Default)]
struct Tally {
    score: f64,
    reasons: Vec<String>,
}

impl Tally {
    fn add(&mut self, points: f64, reason: impl Into<String>) {
        self.score += points;
        self.reasons.push(reason.into());
    }
}

pub fn score(indicators: &IndicatorSet, thresholds: &SignalThresholds) -> ScoreResult {
    let mut tally = Tally::default();
    let ind = indicators;

    let trend_strength = match (ind.close, ind.ema20, ind.ema50, ind.ema200) {
        (Some(close), Some(e20), Some(e50), Some(e200)) => {
            let trend = classify_trend(close, e20, e50, e200);
            if let Some(reason) = trend.reason() {
                tally.add(trend.points(), reason);
            }
            Some(trend)
        }
        _ => None,
    };

    let rsi_state = ind.rsi.and_then(|rsi| {
        if rsi > RSI_OVERSOLD && rsi < RSI_OVERBOUGHT {
            tally.add(1.0, "RSI_NEUTRAL: 30-70 range, no extremes");
            Some(RsiState::Neutral)
        } else if rsi >= RSI_OVERBOUGHT {
            tally.add(-1.0, "RSI_OVERBOUGHT: >= 70, potential reversal");
            Some(RsiState::Overbought)
        } else if rsi <= RSI_OVERSOLD {
            // oversold is a bounce setup, scored like neutral
            tally.add(1.0, "RSI_OVERSOLD: <= 30, potential bounce");
            Some(RsiState::Oversold)
        } else {
            None
        }
    });

    let macd_state = match (ind.macd, ind.macd_signal) {
        (Some(macd), Some(signal)) => {
            let diff = macd - signal;
            if macd > signal && diff > 0.0 {
                tally.add(2.0, "MACD_BULLISH: MACD above signal line");
                Some(MacdState::Bullish)
            } else if macd < signal && diff < 0.0 {
                tally.add(-2.0, "MACD_BEARISH: MACD below signal line");
                Some(MacdState::Bearish)
            } else {
                tally.add(0.0, "MACD_NEUTRAL: transitioning");
                Some(MacdState::Neutral)
            }
        }
        _ => None,
    };

    let bb_state = match (ind.bb_upper, ind.bb_lower, ind.close) {
        (Some(upper), Some(lower), Some(close)) => {
            if close > upper {
                tally.add(0.5, "BREAKOUT_UP: close above upper Bollinger Band");
                Some(BollingerState::AboveUpper)
            } else if close < lower {
                tally.add(0.5, "OVERSOLD_BB: close below lower Bollinger Band");
                Some(BollingerState::BelowLower)
            } else {
                Some(BollingerState::InRange)
            }
        }
        _ => None,
    };

    let volume_state = ind.volume_ratio.map(|ratio| {
        if ratio > VOLUME_HIGH {
            tally.add(1.5, format!("HIGH_VOLUME: {ratio:.2}x avg, strong conviction"));
            VolumeState::High
        } else if ratio > VOLUME_ABOVE_AVG {
            tally.add(0.5, format!("ABOVE_AVG_VOLUME: {ratio:.2}x avg"));
            VolumeState::AboveAvg
        } else if ratio < VOLUME_LOW {
            tally.add(-0.5, format!("LOW_VOLUME: {ratio:.2}x avg, weak signal"));
            VolumeState::Low
        } else {
            VolumeState::Normal
        }
    });

    let stop_loss_pct = match (ind.atr, ind.close) {
        (Some(atr), Some(close)) if close > 0.0 => Some(round2(100.0 * atr / close)),
        _ => None,
    };

    let score = tally.score.clamp(SCORE_MIN, SCORE_MAX);
    let signal = thresholds.classify(score);
    if signal == Signal::Short {
        tally
            .reasons
            .push(format!("SHORT_SIGNAL: extreme downtrend (score {score:.1})"));
    }
    let (signal_type, position_direction) = signal.into();

    ScoreResult {
        signal,
        score,
        confidence: confidence_for(score),
        reasons: tally.reasons,
        metadata: ScoreMetadata {
            inputs: *indicators,
            trend_strength,
            rsi_state,
            macd_state,
            bb_state,
            volume_state,
            stop_loss_distance: ind.atr,
            stop_loss_pct,
            signal_type,
            position_direction,
        },
    }
}
