use serde_json::{Value, json};
use thiserror::Error;

/// Message returned to clients for every failure that is our fault or the
/// transport's. The real cause only goes to the log.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Errors produced while serving a geocoding or weather query.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("City name is required.")]
    MissingCity,

    #[error("City name or lat/lon is required.")]
    MissingLocation,

    #[error("Fields lat and lon are required.")]
    MissingCoordinates,

    #[error("Field '{field}' must be a number.")]
    InvalidCoordinate { field: &'static str, value: String },

    /// The query string itself could not be read.
    #[error("{0}")]
    InvalidQuery(String),

    #[error("No location found for '{0}'.")]
    CityNotFound(String),

    /// Upstream answered with a non-success status; status and body are
    /// handed back to the caller untouched.
    #[error("Upstream responded with status {status}")]
    UpstreamStatus { status: u16, body: Value },

    /// Built through `From`, which strips the request URL: it carries the
    /// API key.
    #[error("Upstream request failed: {0}")]
    Transport(reqwest::Error),

    #[error("Upstream returned a malformed payload: {0}")]
    Malformed(String),
}

impl WeatherError {
    /// HTTP status code this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingCity
            | Self::MissingLocation
            | Self::MissingCoordinates
            | Self::InvalidCoordinate { .. }
            | Self::InvalidQuery(_) => 400,
            Self::CityNotFound(_) => 404,
            Self::UpstreamStatus { status, .. } => *status,
            Self::Transport(_) | Self::Malformed(_) => 500,
        }
    }

    /// Whether the error detail must stay out of the client response.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Malformed(_))
    }

    /// JSON body sent to the client.
    pub fn client_body(&self) -> Value {
        match self {
            Self::UpstreamStatus { body, .. } => body.clone(),
            err if err.is_internal() => json!({ "message": INTERNAL_ERROR_MESSAGE }),
            err => json!({ "message": err.to_string() }),
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url())
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}
