pub type LissajousResult<T> = Result<T, LissajousError>;

#[derive(thiserror::Error, Debug)]
pub enum LissajousError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("render cancelled")]
    Cancelled,

    #[error("sink write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LissajousError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// `true` when the failure came from the output side (client gone, pipe closed).
    pub fn is_sink_failure(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

impl From<gif::EncodingError> for LissajousError {
    fn from(err: gif::EncodingError) -> Self {
        match err {
            gif::EncodingError::Io(e) => Self::Io(e),
            other => Self::encode(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            LissajousError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            LissajousError::encode("x")
                .to_string()
                .contains("encode error:")
        );
        assert_eq!(LissajousError::Cancelled.to_string(), "render cancelled");
    }

    #[test]
    fn gif_io_errors_become_sink_failures() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err = LissajousError::from(gif::EncodingError::Io(io));
        assert!(err.is_sink_failure());
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn gif_format_errors_become_encode_errors() {
        let err = LissajousError::from(gif::EncodingError::Format(
            gif::EncodingFormatError::MissingColorPalette,
        ));
        assert!(matches!(err, LissajousError::Encode(_)));
        assert!(!err.is_sink_failure());
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = LissajousError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
        assert!(!err.is_sink_failure());
    }
}
