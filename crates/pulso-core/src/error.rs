//! Unified application error types for Pulso.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The user declined the platform notification prompt. Terminal, never retried.
    PermissionDenied,
    /// Push transport registration is unavailable.
    SubscriptionUnavailable,
    /// A transient delivery failure (network, timeout). Retried per backoff policy.
    TransientDelivery,
    /// The transport reported the endpoint permanently gone. Not retried.
    PermanentDelivery,
    /// Outbound content failed the personal-data scan.
    Validation,
    /// No affirmative consent on record for the user.
    ConsentMissing,
    /// The record store failed or is unreachable.
    Storage,
    /// The requested record was not found.
    NotFound,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// A configuration error occurred.
    Configuration,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "PERMISSION_DENIED"),
            Self::SubscriptionUnavailable => write!(f, "SUBSCRIPTION_UNAVAILABLE"),
            Self::TransientDelivery => write!(f, "TRANSIENT_DELIVERY"),
            Self::PermanentDelivery => write!(f, "PERMANENT_DELIVERY"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::ConsentMissing => write!(f, "CONSENT_MISSING"),
            Self::Storage => write!(f, "STORAGE"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Pulso.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire engine boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a permission-denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, message)
    }

    /// Create a subscription-unavailable error.
    pub fn subscription_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SubscriptionUnavailable, message)
    }

    /// Create a transient-delivery error.
    pub fn transient_delivery(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransientDelivery, message)
    }

    /// Create a permanent-delivery error.
    pub fn permanent_delivery(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermanentDelivery, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a consent-missing error.
    pub fn consent_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConsentMissing, message)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
