//! Property tests for scorer, simulator and report invariants.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use trendscore::domain::backtest::{SignalPoint, SimulatorConfig, simulate};
use trendscore::domain::indicator_set::IndicatorSet;
use trendscore::domain::metrics::{ReadinessThresholds, summarize};
use trendscore::domain::position::{Direction, ExitReason, Trade};
use trendscore::domain::scorer::{Signal, SignalThresholds, TrendStrength, classify_trend, score};

// ── Strategies ───────────────────────────────────────────────────────

fn arb_opt(range: std::ops::Range<f64>) -> impl Strategy<Value = Option<f64>> {
    prop::option::of(range)
}

fn arb_indicator_set() -> impl Strategy<Value = IndicatorSet> {
    (
        (
            arb_opt(1.0..500.0),
            arb_opt(1.0..500.0),
            arb_opt(1.0..500.0),
            arb_opt(1.0..500.0),
            arb_opt(0.0..100.0),
        ),
        (
            arb_opt(-20.0..20.0),
            arb_opt(-20.0..20.0),
            arb_opt(1.0..500.0),
            arb_opt(1.0..500.0),
            arb_opt(0.0..50.0),
            arb_opt(0.0..5.0),
        ),
    )
        .prop_map(
            |((close, ema20, ema50, ema200, rsi), (macd, macd_signal, bb_upper, bb_lower, atr, volume_ratio))| {
                IndicatorSet {
                    close,
                    ema20,
                    ema50,
                    ema200,
                    rsi,
                    macd,
                    macd_signal,
                    bb_upper,
                    bb_lower,
                    atr,
                    volume_ratio,
                    ..IndicatorSet::default()
                }
            },
        )
}

fn arb_signal() -> impl Strategy<Value = Option<Signal>> {
    prop::option::of(prop_oneof![
        Just(Signal::Buy),
        Just(Signal::Sell),
        Just(Signal::Hold),
        Just(Signal::Short),
    ])
}

fn arb_series() -> impl Strategy<Value = Vec<SignalPoint>> {
    prop::collection::vec((50.0..150.0_f64, arb_signal()), 0..120).prop_map(|points| {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        points
            .into_iter()
            .enumerate()
            .map(|(i, (close, signal))| SignalPoint {
                date: start + Duration::days(i as i64),
                close,
                signal,
            })
            .collect()
    })
}

fn trades_from(returns: &[f64]) -> Vec<Trade> {
    let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    returns
        .iter()
        .map(|&r| Trade {
            entry_date: d,
            exit_date: d,
            entry_price: 100.0,
            exit_price: 100.0 + r,
            return_pct: r,
            direction: Direction::Long,
            exit_reason: ExitReason::Signal,
        })
        .collect()
}

// ── Scorer ───────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn score_and_confidence_bounded(set in arb_indicator_set()) {
        let result = score(&set, &SignalThresholds::default());
        prop_assert!((-10.0..=10.0).contains(&result.score));
        prop_assert!((0.0..=1.0).contains(&result.confidence));
    }

    #[test]
    fn signal_matches_threshold_priority(set in arb_indicator_set()) {
        let t = SignalThresholds::default();
        let result = score(&set, &t);
        let expected = if result.score >= t.buy {
            Signal::Buy
        } else if result.score <= t.short {
            Signal::Short
        } else if result.score <= t.sell {
            Signal::Sell
        } else {
            Signal::Hold
        };
        prop_assert_eq!(result.signal, expected);
    }

    #[test]
    fn at_most_one_trend_reason(set in arb_indicator_set()) {
        let result = score(&set, &SignalThresholds::default());
        let trend_reasons = result.reasons.iter().filter(|r| r.contains("TREND")).count();
        prop_assert!(trend_reasons <= 1);
    }

    #[test]
    fn trend_branches_are_exclusive(
        close in 1.0..500.0_f64,
        e20 in 1.0..500.0_f64,
        e50 in 1.0..500.0_f64,
        e200 in 1.0..500.0_f64,
    ) {
        let trend = classify_trend(close, e20, e50, e200);
        let strong_up = close > e20 && e20 > e50 && e50 > e200;
        let strong_down = close < e20 && e20 < e50 && e50 < e200;
        prop_assert_eq!(trend == TrendStrength::StrongUp, strong_up);
        if !strong_up && !(close > e20 && e20 > e50) && close <= e50 {
            prop_assert!(trend.points() <= 0.0);
            prop_assert_eq!(trend == TrendStrength::StrongDown, strong_down);
        }
    }

    #[test]
    fn scoring_is_deterministic(set in arb_indicator_set()) {
        let t = SignalThresholds::default();
        prop_assert_eq!(score(&set, &t), score(&set, &t));
    }
}

// ── Simulator ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn positions_never_overlap(series in arb_series(), allow_shorting in any::<bool>()) {
        let config = SimulatorConfig { allow_shorting, ..SimulatorConfig::default() };
        let trades = simulate(&series, &config);

        for t in &trades {
            prop_assert!(t.entry_date < t.exit_date);
            if !allow_shorting {
                prop_assert_eq!(t.direction, Direction::Long);
            }
        }
        for pair in trades.windows(2) {
            prop_assert!(pair[0].exit_date <= pair[1].entry_date);
        }
    }

    #[test]
    fn returns_follow_direction(series in arb_series()) {
        let config = SimulatorConfig { allow_shorting: true, ..SimulatorConfig::default() };
        for t in simulate(&series, &config) {
            let raw = match t.direction {
                Direction::Long => (t.exit_price - t.entry_price) / t.entry_price,
                Direction::Short => (t.entry_price - t.exit_price) / t.entry_price,
            };
            prop_assert_eq!(t.return_pct, (raw * 100.0 * 100.0).round_ties_even() / 100.0);
        }
    }
}

// ── Report ───────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn report_counts_are_consistent(returns in prop::collection::vec(-20.0..20.0_f64, 0..60)) {
        let report = summarize(&trades_from(&returns), &ReadinessThresholds::default());
        prop_assert_eq!(report.total_trades, returns.len());
        prop_assert!(report.wins + report.losses <= report.total_trades);
        prop_assert!((0.0..=1.0).contains(&report.win_rate));
        prop_assert!(report.max_drawdown <= 0.0);
        prop_assert!(report.max_consecutive_losses <= report.losses);
        if !returns.is_empty() {
            prop_assert!(report.max_loss_pct <= report.avg_return_pct + 0.01);
            prop_assert!(report.avg_return_pct <= report.max_gain_pct + 0.01);
        }
    }
}
