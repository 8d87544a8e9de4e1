//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the SMA of the first n closes, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k). The first (n-1) bars have no value.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_ema(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries::empty(IndicatorType::Ema(period));
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let values = ema_over(&closes, period)
        .into_iter()
        .zip(bars)
        .map(|(v, bar)| IndicatorPoint {
            date: bar.date,
            value: v.map(IndicatorValue::Simple),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}

/// SMA-seeded EMA over an arbitrary slice; `None` until `period` inputs are seen.
pub(crate) fn ema_over(inputs: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(inputs.len());
    if period == 0 {
        out.resize(inputs.len(), None);
        return out;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &x) in inputs.iter().enumerate() {
        if i + 1 < period {
            sum += x;
            out.push(None);
        } else if i + 1 == period {
            sum += x;
            ema = sum / period as f64;
            out.push(Some(ema));
        } else {
            ema = x * k + ema * (1.0 - k);
            out.push(Some(ema));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::make_close_bars;

    #[test]
    fn ema_warmup() {
        let bars = make_close_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_ema(&bars, 3);

        assert!(series.values[0].value.is_none());
        assert!(series.values[1].value.is_none());
        assert!(series.values[2].value.is_some());
        assert!(series.values[4].value.is_some());
    }

    #[test]
    fn ema_period_1_tracks_close() {
        let bars = make_close_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_ema(&bars, 1);

        assert_eq!(series.simple_at(0), Some(10.0));
        assert_eq!(series.simple_at(1), Some(20.0));
        assert_eq!(series.simple_at(2), Some(30.0));
    }

    #[test]
    fn ema_seed_is_sma() {
        let bars = make_close_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_ema(&bars, 3);
        let seed = series.simple_at(2).expect("seeded");
        assert!((seed - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_recursive_calculation() {
        let bars = make_close_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_ema(&bars, 3);

        let k = 0.5;
        let ema_3 = 40.0 * k + 20.0 * (1.0 - k);
        let ema_4 = 50.0 * k + ema_3 * (1.0 - k);

        assert!((series.simple_at(3).unwrap() - ema_3).abs() < f64::EPSILON);
        assert!((series.simple_at(4).unwrap() - ema_4).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_equal_prices() {
        let bars = make_close_bars(&[100.0; 5]);
        let series = calculate_ema(&bars, 3);
        for i in 2..5 {
            assert!((series.simple_at(i).unwrap() - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn ema_not_enough_bars() {
        let bars = make_close_bars(&[10.0, 20.0]);
        let series = calculate_ema(&bars, 200);
        assert_eq!(series.values.len(), 2);
        assert!(series.first_valid().is_none());
    }

    #[test]
    fn ema_empty_or_zero_period() {
        assert!(calculate_ema(&[], 3).values.is_empty());
        let bars = make_close_bars(&[10.0, 20.0]);
        assert!(calculate_ema(&bars, 0).values.is_empty());
    }
}
