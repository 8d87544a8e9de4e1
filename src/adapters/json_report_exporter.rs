//! Performance report export as JSON.

use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::error::TrendscoreError;
use crate::domain::metrics::PerformanceReport;
use crate::domain::position::Trade;
use crate::ports::report_port::ReportPort;

/// Writes `report_<SYMBOL>.json` holding the report and its trades.
pub struct JsonReportExporter;

#[derive(Serialize)]
struct ReportDocument<'a> {
    symbol: &'a str,
    report: &'a PerformanceReport,
    trades: &'a [Trade],
}

impl ReportPort for JsonReportExporter {
    fn write(
        &self,
        symbol: &str,
        trades: &[Trade],
        report: &PerformanceReport,
        output_dir: &Path,
    ) -> Result<PathBuf, TrendscoreError> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(format!("report_{}.json", symbol));

        let mut out = BufWriter::new(File::create(&path)?);
        let doc = ReportDocument {
            symbol,
            report,
            trades,
        };
        serde_json::to_writer_pretty(&mut out, &doc)?;
        out.write_all(b"\n")?;
        out.flush()?;

        Ok(path)
    }
}
