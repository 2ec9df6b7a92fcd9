use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that can occur while reading or writing registry membership
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Authentication failed - invalid or missing control-plane token
    #[error("authentication failed: control plane rejected credentials")]
    Unauthorized,

    /// Request rate exceeded on the control plane
    #[error("rate limit exceeded, retry after {retry_after:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying
        retry_after: Option<u64>,
    },

    /// A concurrent change to the same zone is still being applied
    #[error("conflicting change in progress: {0}")]
    Conflict(String),

    /// Zone or record set not found
    #[error("resource not found: {resource}")]
    NotFound {
        /// Description of the resource that wasn't found
        resource: String,
    },

    /// The control plane rejected a change batch
    #[error("invalid change batch: {0}")]
    InvalidChangeBatch(String),

    /// Control plane returned an error response
    #[error("API error ({code}): {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message from the API
        message: String,
    },

    /// The control plane answered with something that cannot be followed
    #[error("invalid control-plane response: {0}")]
    InvalidResponse(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection failed
    #[error("connection failed: {0}")]
    Connection(String),

    /// Every attempt of a retried operation failed
    #[error("{operation} failed after {attempts} attempts: {source}")]
    RetryBudgetExhausted {
        /// Name of the store operation that was retried
        operation: &'static str,
        /// Number of attempts made
        attempts: u32,
        /// The error observed on the final attempt
        source: Box<RegistryError>,
    },

    /// A stored record value could not be interpreted as a member address
    #[error("invalid record value {value:?} in {set_identifier}")]
    InvalidRecord {
        /// Set identifier of the offending record set
        set_identifier: String,
        /// The raw value
        value: String,
    },

    /// Invalid IPv4 address
    #[error("invalid IPv4 address: {0}")]
    InvalidAddress(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl RegistryError {
    /// Returns true if the failure is transient and the operation may be retried
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. }
            | Self::Conflict(_)
            | Self::Timeout(_)
            | Self::Connection(_)
            | Self::Http(_) => true,
            Self::Api { code, .. } => *code >= 500,
            _ => false,
        }
    }

    /// Returns true if the error is due to authentication
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Returns true if a retry budget ran out
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self, Self::RetryBudgetExhausted { .. })
    }

    /// Returns the HTTP status code if this error maps to one
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::InvalidChangeBatch(_) => Some(400),
            Self::NotFound { .. } => Some(404),
            Self::Conflict(_) => Some(409),
            Self::RateLimited { .. } => Some(429),
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}
