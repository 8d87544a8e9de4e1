//! Volume ratio: current volume / SMA(volume, n).
//!
//! No value during the first (n-1) bars or when the average volume is zero.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 20;

pub fn calculate_volume_ratio(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries::empty(IndicatorType::VolumeRatio(period));
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut window_sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        window_sum += bar.volume;
        if i >= period {
            window_sum -= bars[i - period].volume;
        }

        let value = if i + 1 >= period {
            let avg = window_sum / period as f64;
            (avg > 0.0).then(|| IndicatorValue::Simple(bar.volume / avg))
        } else {
            None
        };

        values.push(IndicatorPoint {
            date: bar.date,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::VolumeRatio(period),
        values,
    }
}
