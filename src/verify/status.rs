use serde::Serialize;
use std::fmt;

/// Outcome of a link liveness check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkStatus {
    /// HTTP 200
    Ok,
    /// HTTP 3xx, recorded separately from plain success
    Redirected(u16),
    /// HTTP 404
    NotFound,
    /// Any other HTTP status
    HttpError(u16),
    /// TLS/certificate failure
    SslError,
    /// Connection refused, DNS failure, or similar transport error
    ConnectionError,
    /// The check timed out
    Timeout,
    /// The target domain's circuit was open; no network call was made
    CircuitOpen,
}

impl LinkStatus {
    /// Classifies an HTTP status code
    pub fn from_code(code: u16) -> Self {
        match code {
            200 => Self::Ok,
            300..=399 => Self::Redirected(code),
            404 => Self::NotFound,
            other => Self::HttpError(other),
        }
    }

    /// The observed HTTP status code, when there was a response
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Ok => Some(200),
            Self::Redirected(code) | Self::HttpError(code) => Some(*code),
            Self::NotFound => Some(404),
            Self::SslError | Self::ConnectionError | Self::Timeout | Self::CircuitOpen => None,
        }
    }

    /// Returns true when the target is reachable (status below 400)
    ///
    /// Healthy targets reset their domain's failure counter and may be
    /// re-enqueued by admission; unhealthy ones count toward opening the
    /// circuit.
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Ok | Self::Redirected(_))
    }

    /// Display label used in records and reports
    pub fn label(&self) -> String {
        match self {
            Self::Ok => "OK".to_string(),
            Self::Redirected(_) => "Redirigido".to_string(),
            Self::NotFound => "No encontrado".to_string(),
            Self::HttpError(code) => format!("Error ({})", code),
            Self::SslError => "Error SSL".to_string(),
            Self::ConnectionError => "Error de conexión".to_string(),
            Self::Timeout => "Timeout".to_string(),
            Self::CircuitOpen => "Circuito abierto".to_string(),
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
