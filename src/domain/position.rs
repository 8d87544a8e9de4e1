//! Open positions and realized trades.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => f.write_str("long"),
            Direction::Short => f.write_str("short"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    Signal,
    StopLoss,
    TakeProfit,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Signal => f.write_str("signal"),
            ExitReason::StopLoss => f.write_str("stop_loss"),
            ExitReason::TakeProfit => f.write_str("take_profit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenPosition {
    pub direction: Direction,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
}

impl OpenPosition {
    pub fn long(entry_date: NaiveDate, entry_price: f64) -> Self {
        OpenPosition {
            direction: Direction::Long,
            entry_date,
            entry_price,
        }
    }

    pub fn short(entry_date: NaiveDate, entry_price: f64) -> Self {
        OpenPosition {
            direction: Direction::Short,
            entry_date,
            entry_price,
        }
    }

    /// Fractional gain in the position's favour. Zero when the entry price is zero.
    pub fn change_pct(&self, price: f64) -> f64 {
        if self.entry_price == 0.0 {
            return 0.0;
        }
        match self.direction {
            Direction::Long => (price - self.entry_price) / self.entry_price,
            Direction::Short => (self.entry_price - price) / self.entry_price,
        }
    }

    /// Stop and target check against fractional thresholds (0.05 = 5%).
    pub fn risk_exit(&self, price: f64, stop_loss: f64, take_profit: f64) -> Option<ExitReason> {
        let change = self.change_pct(price);
        if change <= -stop_loss {
            Some(ExitReason::StopLoss)
        } else if change >= take_profit {
            Some(ExitReason::TakeProfit)
        } else {
            None
        }
    }

    pub fn close(self, exit_date: NaiveDate, exit_price: f64, exit_reason: ExitReason) -> Trade {
        Trade {
            entry_date: self.entry_date,
            exit_date,
            entry_price: self.entry_price,
            exit_price,
            return_pct: round2(self.change_pct(exit_price) * 100.0),
            direction: self.direction,
            exit_reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Percent, rounded to 2 decimals.
    pub return_pct: f64,
    pub direction: Direction,
    pub exit_reason: ExitReason,
}

/// Two decimals, ties to even.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
