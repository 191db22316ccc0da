use thiserror::Error;

/// Failures a download request can surface. Everything here is converted to
/// a user-displayable string at the controller boundary; nothing is fatal to
/// the process.
#[derive(Debug, Error)]
pub enum NasError {
    #[error("the NAS address is not configured")]
    ConfigIncomplete,
    #[error("the URL is not valid")]
    InvalidUrl,
    #[error("could not log in to the NAS")]
    LoginFailed,
    #[error("HTTP {status}: {status_text}")]
    HttpError { status: u16, status_text: String },
    #[error("the server rejected the download: {0}")]
    DownloadRejected(String),
    #[error("could not parse the server response: {0}")]
    UnparseableResponse(String),
    #[error("no success marker in the server response: {0}")]
    UnrecognizedResponse(String),
    #[error("network failure: {0}")]
    NetworkFailure(String),
}

pub type Result<T> = std::result::Result<T, NasError>;
