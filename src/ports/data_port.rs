//! Market data port trait.

use crate::domain::error::TrendscoreError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for one symbol, ascending by date, optionally clipped to an
    /// inclusive date range.
    fn fetch_ohlcv(
        &self,
        code: &str,
        exchange: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, TrendscoreError>;

    fn list_symbols(&self, exchange: &str) -> Result<Vec<String>, TrendscoreError>;
}
