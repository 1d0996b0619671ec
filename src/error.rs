use thiserror::Error;

/// Failure to obtain any HTTP response at all.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

/// Why a geocoding call produced no result.
///
/// `geocode()` and `reverse_geocode()` collapse all of these into `None`;
/// the `try_*` variants surface them for callers that need diagnostics.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("geocoding service returned HTTP status {0}")]
    HttpStatus(u16),
    #[error("response body is not valid JSON: {0}")]
    MalformedBody(#[from] serde_json::Error),
    #[error("response JSON is not an object")]
    NotAnObject,
    #[error("response has no string status field")]
    MissingStatus,
    #[error("geocoding service returned status {0}")]
    Status(String),
}

pub type Result<T> = std::result::Result<T, GeocodeError>;
