//! Error handling for the bytekit library
//!
//! Every fallible operation in the crate returns one value from a closed
//! error taxonomy. Errors carry enough detail for diagnostics but no
//! global state: the returned value is the only observation of failure.

use thiserror::Error;

/// Main error type for the bytekit library
#[derive(Error, Debug)]
pub enum BytekitError {
    /// A requested key, token, or escape was not found
    #[error("Not found: {what}")]
    NotFound {
        /// Description of the missing item
        what: String,
    },

    /// An iteration callback halted the traversal
    #[error("Interrupted: iteration halted by callback")]
    Interrupted,

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Memory allocation failures
    #[error("Memory allocation failed: requested {size} bytes")]
    OutOfMemory {
        /// Number of bytes requested
        size: usize,
    },

    /// A key was already present where uniqueness is required
    #[error("Already exists: {what}")]
    AlreadyExists {
        /// Description of the duplicate item
        what: String,
    },

    /// Invalid or malformed input at a public boundary
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message describing the issue
        message: String,
    },

    /// A value was outside the mathematical domain of an operation
    #[error("Domain error: {message}")]
    DomainError {
        /// Error message describing the issue
        message: String,
    },

    /// An index, depth, or magnitude exceeded its bound
    #[error("Out of range: {what} is {value}, limit {limit}")]
    OutOfRange {
        /// Which quantity overflowed
        what: &'static str,
        /// The offending value
        value: usize,
        /// The inclusive limit
        limit: usize,
    },

    /// Feature not supported or not implemented
    #[error("Not implemented: {feature}")]
    NotImplemented {
        /// Description of the unsupported feature
        feature: String,
    },

    /// No data was available to consume
    #[error("No data available: {what}")]
    NoData {
        /// Description of the exhausted source
        what: String,
    },
}

impl BytekitError {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(what: S) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create an out of memory error
    pub fn out_of_memory(size: usize) -> Self {
        Self::OutOfMemory { size }
    }

    /// Create an already exists error
    pub fn already_exists<S: Into<String>>(what: S) -> Self {
        Self::AlreadyExists { what: what.into() }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a domain error
    pub fn domain_error<S: Into<String>>(message: S) -> Self {
        Self::DomainError {
            message: message.into(),
        }
    }

    /// Create an out of range error
    pub fn out_of_range(what: &'static str, value: usize, limit: usize) -> Self {
        Self::OutOfRange { what, value, limit }
    }

    /// Create a not implemented error
    pub fn not_implemented<S: Into<String>>(feature: S) -> Self {
        Self::NotImplemented {
            feature: feature.into(),
        }
    }

    /// Create a no data error
    pub fn no_data<S: Into<String>>(what: S) -> Self {
        Self::NoData { what: what.into() }
    }

    /// Create an I/O error from a message
    pub fn io_error<S: Into<String>>(message: S) -> Self {
        Self::Io(std::io::Error::new(std::io::ErrorKind::Other, message.into()))
    }

    /// Numeric code for this error: negated POSIX errno magnitudes.
    ///
    /// These exist for diagnostics and FFI logs only; match on the enum
    /// variants, not on these numbers.
    pub fn code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => -2,
            Self::Interrupted => -4,
            Self::Io(_) => -5,
            Self::OutOfMemory { .. } => -12,
            Self::AlreadyExists { .. } => -17,
            Self::InvalidArgument { .. } => -22,
            Self::DomainError { .. } => -33,
            Self::OutOfRange { .. } => -34,
            Self::NotImplemented { .. } => -38,
            Self::NoData { .. } => -61,
        }
    }

    /// Get the error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Interrupted => "interrupted",
            Self::Io(_) => "io",
            Self::OutOfMemory { .. } => "memory",
            Self::AlreadyExists { .. } => "exists",
            Self::InvalidArgument { .. } => "invalid",
            Self::DomainError { .. } => "domain",
            Self::OutOfRange { .. } => "range",
            Self::NotImplemented { .. } => "unsupported",
            Self::NoData { .. } => "no_data",
        }
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::OutOfMemory { .. } => true,
            Self::Interrupted => true,
            Self::NoData { .. } => true,
            Self::NotFound { .. } => false,
            Self::AlreadyExists { .. } => false,
            Self::InvalidArgument { .. } => false,
            Self::DomainError { .. } => false,
            Self::OutOfRange { .. } => false,
            Self::NotImplemented { .. } => false,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, BytekitError>;
