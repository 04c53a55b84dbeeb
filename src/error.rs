use thiserror::Error;

/// Result type alias using the crate-wide [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the contrast engine, the analysis session and report export.
#[derive(Error, Debug)]
pub enum Error {
    /// Color input was not `#rrggbb` / `rrggbb`.
    #[error("invalid color format: {0:?} (expected 6 hex digits)")]
    InvalidColorFormat(String),

    #[error("unknown vision type: {0:?}")]
    InvalidVisionType(String),

    /// Submission attempted before an image was selected.
    #[error("no image selected")]
    NoImageSelected,

    #[error("analysis request failed: {0}")]
    AnalysisRequestFailed(#[from] RequestFailure),

    /// A newer submission or image selection replaced this one before it resolved.
    #[error("analysis superseded by a newer submission")]
    Superseded,

    #[error("image read failed: {0}")]
    ImageReadFailed(#[source] std::io::Error),

    #[error("report rendering failed: {0}")]
    Render(String),

    #[error("report write failed: {0}")]
    ReportWrite(#[source] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Ways a round trip to the remote analysis service can fail.
#[derive(Error, Debug)]
pub enum RequestFailure {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl Error {
    /// True for errors caused by caller input rather than the environment.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidColorFormat(_) | Error::InvalidVisionType(_) | Error::NoImageSelected
        )
    }
}

impl From<Error> for napi::Error {
    fn from(err: Error) -> Self {
        let status = if err.is_validation() {
            napi::Status::InvalidArg
        } else {
            napi::Status::GenericFailure
        };
        napi::Error::new(status, err.to_string())
    }
}
