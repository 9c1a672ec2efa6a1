//! Transport-level failure of a single probe.

use thiserror::Error;

/// Why a probe produced no status code. Rendered to a string and reported in
/// place of the response; never propagated past the runner.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported URL scheme {0:?} (expected http or https)")]
    UnsupportedScheme(String),
    /// Timeout, DNS, TLS, connection reset: curl's own description.
    #[error("{0}")]
    Curl(#[from] curl::Error),
    #[error("server closed the connection without a status line")]
    NoStatus,
}

impl ProbeError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProbeError::Curl(e) if e.is_operation_timedout())
    }
}
