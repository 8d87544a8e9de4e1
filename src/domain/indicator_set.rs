//! Per-bar indicator values consumed by the scorer.
//!
//! Every field is optional: a value is absent while its indicator is still
//! warming up. External producers that key values by name go through
//! [`IndicatorName`], which only accepts the exact names the scorer reads.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub close: Option<f64>,
    pub ema20: Option<f64>,
    pub ema50: Option<f64>,
    pub ema200: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_diff: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub atr: Option<f64>,
    pub volume_ratio: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorName {
    Close,
    Ema20,
    Ema50,
    Ema200,
    Rsi,
    Macd,
    MacdSignal,
    MacdDiff,
    BbUpper,
    BbMiddle,
    BbLower,
    Atr,
    VolumeRatio,
}

impl IndicatorName {
    pub const ALL: [IndicatorName; 13] = [
        IndicatorName::Close,
        IndicatorName::Ema20,
        IndicatorName::Ema50,
        IndicatorName::Ema200,
        IndicatorName::Rsi,
        IndicatorName::Macd,
        IndicatorName::MacdSignal,
        IndicatorName::MacdDiff,
        IndicatorName::BbUpper,
        IndicatorName::BbMiddle,
        IndicatorName::BbLower,
        IndicatorName::Atr,
        IndicatorName::VolumeRatio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorName::Close => "close",
            IndicatorName::Ema20 => "ema20",
            IndicatorName::Ema50 => "ema50",
            IndicatorName::Ema200 => "ema200",
            IndicatorName::Rsi => "rsi",
            IndicatorName::Macd => "macd",
            IndicatorName::MacdSignal => "macd_signal",
            IndicatorName::MacdDiff => "macd_diff",
            IndicatorName::BbUpper => "bb_upper",
            IndicatorName::BbMiddle => "bb_middle",
            IndicatorName::BbLower => "bb_lower",
            IndicatorName::Atr => "atr",
            IndicatorName::VolumeRatio => "volume_ratio",
        }
    }
}

impl fmt::Display for IndicatorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown indicator name: {0}")]
pub struct UnknownIndicator(pub String);

impl FromStr for IndicatorName {
    type Err = UnknownIndicator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IndicatorName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownIndicator(s.to_string()))
    }
}

impl IndicatorSet {
    pub fn get(&self, name: IndicatorName) -> Option<f64> {
        *self.slot(name)
    }

    pub fn set(&mut self, name: IndicatorName, value: Option<f64>) {
        *self.slot_mut(name) = value;
    }

    /// Build a set from a name → optional value mapping. Unknown names are rejected.
    pub fn from_map(map: &HashMap<String, Option<f64>>) -> Result<Self, UnknownIndicator> {
        let mut set = IndicatorSet::default();
        for (key, value) in map {
            let name: IndicatorName = key.parse()?;
            set.set(name, *value);
        }
        Ok(set)
    }

    /// Name → value mapping of every indicator, absent ones included.
    pub fn to_map(&self) -> HashMap<String, Option<f64>> {
        IndicatorName::ALL
            .into_iter()
            .map(|name| (name.as_str().to_string(), self.get(name)))
            .collect()
    }

    fn slot(&self, name: IndicatorName) -> &Option<f64> {
        match name {
            IndicatorName::Close => &self.close,
            IndicatorName::Ema20 => &self.ema20,
            IndicatorName::Ema50 => &self.ema50,
            IndicatorName::Ema200 => &self.ema200,
            IndicatorName::Rsi => &self.rsi,
            IndicatorName::Macd => &self.macd,
            IndicatorName::MacdSignal => &self.macd_signal,
            IndicatorName::MacdDiff => &self.macd_diff,
            IndicatorName::BbUpper => &self.bb_upper,
            IndicatorName::BbMiddle => &self.bb_middle,
            IndicatorName::BbLower => &self.bb_lower,
            IndicatorName::Atr => &self.atr,
            IndicatorName::VolumeRatio => &self.volume_ratio,
        }
    }

    fn slot_mut(&mut self, name: IndicatorName) -> &mut Option<f64> {
        match name {
            IndicatorName::Close => &mut self.close,
            IndicatorName::Ema20 => &mut self.ema20,
            IndicatorName::Ema50 => &mut self.ema50,
            IndicatorName::Ema200 => &mut self.ema200,
            IndicatorName::Rsi => &mut self.rsi,
            IndicatorName::Macd => &mut self.macd,
            IndicatorName::MacdSignal => &mut self.macd_signal,
            IndicatorName::MacdDiff => &mut self.macd_diff,
            IndicatorName::BbUpper => &mut self.bb_upper,
            IndicatorName::BbMiddle => &mut self.bb_middle,
            IndicatorName::BbLower => &mut self.bb_lower,
            IndicatorName::Atr => &mut self.atr,
            IndicatorName::VolumeRatio => &mut self.volume_ratio,
        }
    }
}
