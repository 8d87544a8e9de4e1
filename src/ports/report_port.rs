//! Backtest export port trait.

use crate::domain::error::TrendscoreError;
use crate::domain::metrics::PerformanceReport;
use crate::domain::position::Trade;
use std::path::{Path, PathBuf};

/// Writes one symbol's backtest output under `output_dir` and returns the
/// path of the file written.
pub trait ReportPort {
    fn write(
        &self,
        symbol: &str,
        trades: &[Trade],
        report: &PerformanceReport,
        output_dir: &Path,
    ) -> Result<PathBuf, TrendscoreError>;
}
