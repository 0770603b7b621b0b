//! Domain error types.

/// Top-level error type for tickerlens.
#[derive(Debug, thiserror::Error)]
pub enum TickerlensError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// No row survived cleaning. `required` is the strategy's minimum bar
    /// count; `reason` says why the rows were dropped.
    #[error("insufficient history for {strategy} ({bars} bars): {reason}")]
    InsufficientHistory {
        strategy: String,
        bars: usize,
        required: usize,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

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

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl TickerlensError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        TickerlensError::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl From<&TickerlensError> for std::process::ExitCode {
    fn from(err: &TickerlensError) -> Self {
        let code: u8 = match err {
            TickerlensError::Io { .. } => 1,
            TickerlensError::ConfigParse { .. }
            | TickerlensError::ConfigMissing { .. }
            | TickerlensError::ConfigInvalid { .. } => 2,
            TickerlensError::Data { .. } => 3,
            TickerlensError::InvalidInput { .. } => 4,
            TickerlensError::NoData { .. } | TickerlensError::InsufficientHistory { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
