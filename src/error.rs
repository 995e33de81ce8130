use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server URL / auth token parameters are missing or unusable.
    /// Raised before any network I/O happens.
    #[error("cannot connect to Frappe server: {0}")]
    Configuration(String),

    /// The server answered, but the decoded body carried an `exception`
    /// or lacked the expected `data` field.
    #[error("Frappe server error: {0}")]
    Remote(String),

    /// The request is invalid before it is ever sent.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Transport(#[from] ureq::Error),

    #[error(transparent)]
    Http(#[from] ureq::http::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
