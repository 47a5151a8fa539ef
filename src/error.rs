use thiserror::Error;

/// Failure modes of an analysis run.
///
/// Everything here is fatal: once a raw line fails to parse the time axis is
/// broken and partial results would be silently wrong, and a bad circuit
/// parameter makes the model formulae undefined. The caller sees either a
/// complete pair of series or one of these.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed input line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },
    #[error("invalid circuit configuration: {0}")]
    Configuration(String),
    #[error("failed to read data source: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedLine {
            line,
            reason: reason.into(),
        }
    }
}
