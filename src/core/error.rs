use thiserror::Error;

/// Failures reported by an audio output while loading or playing a source.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlaybackError {
    /// The request was superseded by a newer play or pause.
    #[error("playback interrupted by a newer request")]
    Interrupted,

    #[error("failed to fetch audio from {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("failed to decode audio from {url}: {message}")]
    Decode { url: String, message: String },
}

impl PlaybackError {
    pub fn is_interrupted(&self) -> bool {
        matches!(self, PlaybackError::Interrupted)
    }
}

/// Result type for REST API calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by the Quran and prayer-times API clients
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {reason} ({code})")]
    Status { code: u16, reason: String },

    #[error("{0}")]
    Api(String),

    #[error("reciter data ({0}) is not available for this surah")]
    MissingEdition(String),

    #[error("failed to fetch any tafsir data")]
    NoTafsir,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_interrupted_is_interrupted() {
        assert!(PlaybackError::Interrupted.is_interrupted());
        assert!(
            !PlaybackError::Decode { url: "u".into(), message: "m".into() }.is_interrupted()
        );
        assert!(
            !PlaybackError::Fetch { url: "u".into(), message: "m".into() }.is_interrupted()
        );
    }

    #[test]
    fn status_error_message_carries_reason() {
        let err = ApiError::Status { code: 404, reason: "Not Found".into() };
        assert_eq!(err.to_string(), "API error: Not Found (404)");
    }
}
