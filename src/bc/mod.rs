//! Business Central client stack: typed errors, token seam, OData filter
//! construction, per-endpoint row schemas, the paginated fetcher, and the
//! row normalizer.

use thiserror::Error;

pub mod client;
pub mod endpoints;
pub mod filter;
pub mod normalize;
pub mod schema;
pub mod token;

/// Error taxonomy at the ERP fetcher boundary.
///
/// Callers branch on the variant, never on message text: `NotFound` drives
/// endpoint fallback, `Transient` is retried inside the client, `Malformed`
/// and `Auth` abort immediately.
#[derive(Error, Debug)]
pub enum BcError {
    /// The endpoint or filtered resource does not exist on the remote side.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Network failure or retryable HTTP status.
    #[error("transient ERP error: {0}")]
    Transient(String),

    /// Response body unparsable or missing the expected collection field.
    #[error("malformed ERP response: {0}")]
    Malformed(String),

    /// Access token acquisition failed; fatal for the whole fetch.
    #[error("token acquisition failed: {0}")]
    Auth(String),

    /// Retry budget exhausted; carries the last underlying cause.
    #[error("fetch failed after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: Box<BcError>,
    },

    #[error("client configuration error: {0}")]
    Config(String),
}

pub type BcResult<T> = Result<T, BcError>;

impl BcError {
    pub fn is_transient(&self) -> bool {
        matches!(self, BcError::Transient(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BcError::NotFound(_))
    }
}

impl From<reqwest::Error> for BcError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BcError::Malformed(err.to_string())
        } else {
            BcError::Transient(err.to_string())
        }
    }
}
