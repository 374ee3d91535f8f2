//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rudder
///
/// The taxonomy follows three tiers: configuration errors are fatal and
/// never retried, resolution errors surface to the screen-creation caller
/// unmodified, and handler errors may be isolated per interception policy.
#[derive(Error, Debug)]
pub enum Error {
    /// Screen type or routing setup violates a shape invariant
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Dependency resolution failed or was ambiguous
    #[error("Resolution error: {message}")]
    Resolution {
        /// Description of the resolution error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A routed controller handler failed during interception
    #[error("Handler error in `{method}`: {message}")]
    Handler {
        /// The intercepted method name
        method: String,
        /// Description of the handler failure
        message: String,
    },

    /// Invalid argument provided at a public API boundary
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// A type-erased value did not hold the expected type
    #[error("Type mismatch: expected `{expected}`, got `{actual}`")]
    TypeMismatch {
        /// The expected type name
        expected: String,
        /// The actual type name
        actual: String,
    },

    /// Resource not found
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// A pending operation was canceled
    #[error("Canceled: {operation}")]
    Canceled {
        /// The canceled operation
        operation: String,
    },

    /// Internal invariant violation
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

// Configuration and resolution error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a resolution error
    pub fn resolution<S: Into<String>>(message: S) -> Self {
        Self::Resolution {
            message: message.into(),
            source: None,
        }
    }

    /// Create a resolution error with source
    pub fn resolution_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Resolution {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Remaining error creation methods
impl Error {
    /// Create a handler error for an intercepted method
    pub fn handler<M: Into<String>, S: Into<String>>(method: M, message: S) -> Self {
        Self::Handler {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch<E: Into<String>, A: Into<String>>(expected: E, actual: A) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a cancellation error
    pub fn canceled<S: Into<String>>(operation: S) -> Self {
        Self::Canceled {
            operation: operation.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_display() {
        let err = Error::configuration("screen type is sealed");
        assert_eq!(err.to_string(), "Configuration error: screen type is sealed");
    }

    #[test]
    fn handler_error_carries_method() {
        let err = Error::handler("on_activate", "boom");
        assert!(err.to_string().contains("on_activate"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn type_mismatch_names_both_types() {
        let err = Error::type_mismatch("bool", "i32");
        assert_eq!(err.to_string(), "Type mismatch: expected `bool`, got `i32`");
    }
}
