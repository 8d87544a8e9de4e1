//! Domain error types.

/// Top-level error type for trendscore.
#[derive(Debug, thiserror::Error)]
pub enum TrendscoreError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {code} on {exchange}")]
    NoData { code: String, exchange: String },

    #[error("insufficient data for {code} on {exchange}: have {bars} bars, need {minimum}")]
    InsufficientData {
        code: String,
        exchange: String,
        bars: usize,
        minimum: usize,
    },

    #[error("export error: {reason}")]
    Export { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl TrendscoreError {
    pub fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        TrendscoreError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&TrendscoreError> for std::process::ExitCode {
    fn from(err: &TrendscoreError) -> Self {
        let code: u8 = match err {
            TrendscoreError::Io(_) => 1,
            TrendscoreError::ConfigParse { .. }
            | TrendscoreError::ConfigMissing { .. }
            | TrendscoreError::ConfigInvalid { .. } => 2,
            TrendscoreError::Data { .. } => 3,
            TrendscoreError::NoData { .. } | TrendscoreError::InsufficientData { .. } => 5,
            TrendscoreError::Export { .. } | TrendscoreError::Json(_) => 6,
        };
        std::process::ExitCode::from(code)
    }
}
