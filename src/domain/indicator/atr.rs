//! Average True Range with Wilder's smoothing.
//!
//! The first bar's true range is high - low. Seed is the mean of the first n
//! true ranges, then ATR[i] = (ATR[i-1] * (n-1) + TR[i]) / n.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_atr(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries::empty(IndicatorType::Atr(period));
    }

    let tr_values: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| match i {
            0 => bar.high - bar.low,
            _ => bar.true_range(bars[i - 1].close),
        })
        .collect();

    let mut values = Vec::with_capacity(bars.len());
    let mut atr = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        let value = if i + 1 < period {
            None
        } else if i + 1 == period {
            atr = tr_values[..=i].iter().sum::<f64>() / period as f64;
            Some(atr)
        } else {
            atr = (atr * (period - 1) as f64 + tr_values[i]) / period as f64;
            Some(atr)
        };
        values.push(IndicatorPoint {
            date: bar.date,
            value: value.map(IndicatorValue::Simple),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    }
}
