//! Symbol universe for multi-code runs.
//!
//! Parses code lists from configuration and checks that each code has enough
//! bars to be worth scoring.

use crate::domain::error::TrendscoreError;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{info, warn};

pub const MIN_OHLCV_BARS: usize = 30;

#[derive(Debug, Clone)]
pub struct Universe {
    pub codes: Vec<String>,
    pub exchange: String,
}

impl Universe {
    pub fn count(&self) -> usize {
        self.codes.len()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),
}

impl From<UniverseError> for TrendscoreError {
    fn from(err: UniverseError) -> Self {
        TrendscoreError::config_invalid("backtest", "codes", err.to_string())
    }
}

/// Comma-separated, trimmed, uppercased; empty tokens and duplicates rejected.
pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

#[derive(Debug, Clone)]
pub struct UniverseValidationResult {
    pub universe: Universe,
    pub skipped: Vec<SkippedCode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedCode {
    pub code: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    InsufficientBars { bars: usize },
}

/// Keeps codes that load with at least `MIN_OHLCV_BARS` bars. Fails only when
/// every code is skipped.
pub fn validate_universe(
    data_port: &dyn DataPort,
    codes: Vec<String>,
    exchange: &str,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<UniverseValidationResult, TrendscoreError> {
    let mut valid_codes = Vec::new();
    let mut skipped = Vec::new();

    for code in codes {
        let bars = match data_port.fetch_ohlcv(&code, exchange, start_date, end_date) {
            Ok(data) => data.len(),
            Err(e) => {
                warn!(%code, %exchange, error = %e, "skipping code");
                skipped.push(SkippedCode {
                    code,
                    reason: SkipReason::NoData,
                });
                continue;
            }
        };

        if bars == 0 {
            warn!(%code, %exchange, "skipping code: no data found");
            skipped.push(SkippedCode {
                code,
                reason: SkipReason::NoData,
            });
            continue;
        }

        if bars < MIN_OHLCV_BARS {
            warn!(%code, %exchange, bars, minimum = MIN_OHLCV_BARS, "skipping code: too few bars");
            skipped.push(SkippedCode {
                code,
                reason: SkipReason::InsufficientBars { bars },
            });
            continue;
        }

        info!(%code, bars, "code ok");
        valid_codes.push(code);
    }

    if valid_codes.is_empty() {
        return Err(TrendscoreError::InsufficientData {
            code: "all".to_string(),
            exchange: exchange.to_string(),
            bars: 0,
            minimum: MIN_OHLCV_BARS,
        });
    }

    if !skipped.is_empty() {
        info!(
            kept = valid_codes.len(),
            total = valid_codes.len() + skipped.len(),
            %exchange,
            "universe reduced"
        );
    }

    Ok(UniverseValidationResult {
        universe: Universe {
            codes: valid_codes,
            exchange: exchange.to_string(),
        },
        skipped,
    })
}
