//! Domain error types.

/// Top-level error type for stopsim.
///
/// Lookups that can merely come up empty (the trading-day resolver) return
/// `Option` instead; errors are reserved for configuration and data access.
#[derive(Debug, thiserror::Error)]
pub enum StopsimError {
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

    #[error("no price history for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StopsimError> for std::process::ExitCode {
    fn from(err: &StopsimError) -> Self {
        let code: u8 = match err {
            StopsimError::Io(_) => 1,
            StopsimError::ConfigParse { .. }
            | StopsimError::ConfigMissing { .. }
            | StopsimError::ConfigInvalid { .. } => 2,
            StopsimError::Data { .. } => 3,
            StopsimError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
