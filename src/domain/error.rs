//! Domain error types.

/// A parse error with position information for indicator, signal and
/// strategy kind strings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Top-level error type for barsignal.
#[derive(Debug, thiserror::Error)]
pub enum BarsignalError {
    #[error("malformed bar data at index {index}: missing or non-finite {field}")]
    MalformedBarData { index: usize, field: &'static str },

    #[error("bars out of order at index {index}: dates must be strictly ascending")]
    UnorderedBars { index: usize },

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

    #[error(transparent)]
    KindParse(#[from] ParseError),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&BarsignalError> for std::process::ExitCode {
    fn from(err: &BarsignalError) -> Self {
        let code: u8 = match err {
            BarsignalError::Io(_) | BarsignalError::Csv(_) => 1,
            BarsignalError::ConfigParse { .. }
            | BarsignalError::ConfigMissing { .. }
            | BarsignalError::ConfigInvalid { .. } => 2,
            BarsignalError::Data { .. } => 3,
            BarsignalError::KindParse(_) => 4,
            BarsignalError::MalformedBarData { .. } | BarsignalError::UnorderedBars { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
