//! Error taxonomy shared by the library and the CLI.

/// Errors surfaced by token handling, format resolution and synthesis.
#[derive(Debug, thiserror::Error)]
pub enum SpeakError {
    /// The trial page was unreachable or did not carry a credential
    #[error("{message} (HTTP {status})")]
    TokenRetrieval {
        /// HTTP status of the trial page response
        status: u16,
        message: String,
    },

    /// The credential payload was not base64url JSON with `region` and `exp`
    #[error("failed to decode token: {0}")]
    TokenDecode(String),

    /// Invalid container/quality pair, unknown format name or conflicting options
    #[error("{0}")]
    Validation(String),

    /// HTTP transport or connection error
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The default audio device could not play the synthesized audio
    #[error("playback failed: {0}")]
    Playback(String),
}

pub type Result<T> = std::result::Result<T, SpeakError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_retrieval_message_carries_status() {
        let err = SpeakError::TokenRetrieval {
            status: 503,
            message: "Failed to retrieve token".into(),
        };
        assert_eq!(err.to_string(), "Failed to retrieve token (HTTP 503)");
    }

    #[test]
    fn io_errors_convert() {
        let err: SpeakError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, SpeakError::Io(_)));
    }
}
