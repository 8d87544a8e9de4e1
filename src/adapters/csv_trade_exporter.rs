//! Trade list export as CSV.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::error::TrendscoreError;
use crate::domain::metrics::PerformanceReport;
use crate::domain::position::Trade;
use crate::ports::report_port::ReportPort;

/// Writes `trades_<SYMBOL>.csv`, one row per realized trade.
pub struct CsvTradeExporter;

fn export_err(path: &Path, e: impl std::fmt::Display) -> TrendscoreError {
    TrendscoreError::Export {
        reason: format!("{}: {}", path.display(), e),
    }
}

impl ReportPort for CsvTradeExporter {
    fn write(
        &self,
        symbol: &str,
        trades: &[Trade],
        _report: &PerformanceReport,
        output_dir: &Path,
    ) -> Result<PathBuf, TrendscoreError> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(format!("trades_{}.csv", symbol));

        let mut wtr = csv::Writer::from_path(&path).map_err(|e| export_err(&path, e))?;
        if trades.is_empty() {
            wtr.write_record([
                "entry_date",
                "exit_date",
                "entry_price",
                "exit_price",
                "return_pct",
                "direction",
                "exit_reason",
            ])
            .map_err(|e| export_err(&path, e))?;
        }
        for trade in trades {
            wtr.serialize(trade).map_err(|e| export_err(&path, e))?;
        }
        wtr.flush()?;

        Ok(path)
    }
}
