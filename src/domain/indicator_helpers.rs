//! Builds the per-bar [`IndicatorSet`] table from raw OHLCV bars.

use crate::domain::indicator::{
    calculate_atr, calculate_bollinger, calculate_ema, calculate_macd, calculate_rsi,
    calculate_volume_ratio, IndicatorValue,
};
use crate::domain::indicator_set::IndicatorSet;
use crate::domain::ohlcv::OhlcvBar;

/// Indicator periods. The EMA fields keep their `ema20/50/200` names in the
/// indicator set regardless of the configured periods.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    pub ema_fast: usize,
    pub ema_medium: usize,
    pub ema_slow: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bb_period: usize,
    pub bb_stddev: f64,
    pub atr_period: usize,
    pub volume_ma_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        IndicatorParams {
            ema_fast: 20,
            ema_medium: 50,
            ema_slow: 200,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bb_period: 20,
            bb_stddev: 2.0,
            atr_period: 14,
            volume_ma_period: 20,
        }
    }
}

/// One `IndicatorSet` per bar, index-aligned with `bars`.
pub fn compute_indicator_sets(bars: &[OhlcvBar], params: &IndicatorParams) -> Vec<IndicatorSet> {
    let ema_fast = calculate_ema(bars, params.ema_fast);
    let ema_medium = calculate_ema(bars, params.ema_medium);
    let ema_slow = calculate_ema(bars, params.ema_slow);
    let rsi = calculate_rsi(bars, params.rsi_period);
    let macd = calculate_macd(bars, params.macd_fast, params.macd_slow, params.macd_signal);
    let bollinger = calculate_bollinger(
        bars,
        params.bb_period,
        (params.bb_stddev * 100.0).round() as u32,
    );
    let atr = calculate_atr(bars, params.atr_period);
    let volume_ratio = calculate_volume_ratio(bars, params.volume_ma_period);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let mut set = IndicatorSet {
                close: Some(bar.close),
                ema20: ema_fast.simple_at(i),
                ema50: ema_medium.simple_at(i),
                ema200: ema_slow.simple_at(i),
                rsi: rsi.simple_at(i),
                atr: atr.simple_at(i),
                volume_ratio: volume_ratio.simple_at(i),
                ..Default::default()
            };
            if let Some(IndicatorValue::Macd {
                line,
                signal,
                histogram,
            }) = macd.value_at(i)
            {
                set.macd = Some(line);
                set.macd_signal = Some(signal);
                set.macd_diff = Some(histogram);
            }
            if let Some(IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            }) = bollinger.value_at(i)
            {
                set.bb_upper = Some(upper);
                set.bb_middle = Some(middle);
                set.bb_lower = Some(lower);
            }
            set
        })
        .collect()
}
