//! Error types for the BPA reconciler.
//!
//! Every failure that can occur while handling a lifecycle event is one of the
//! variants of [`BpaError`]. The dispatch boundary turns them into a `FAILED`
//! response via [`BpaError::reason`], so the variants also decide what the
//! stack operator sees in the CloudFormation console.

/// Provider error codes that denote missing IAM permissions.
const ACCESS_DENIED_CODES: &[&str] = &["AccessDenied", "AccessDeniedException"];

/// Reconciliation error.
#[derive(Debug, thiserror::Error)]
pub enum BpaError {
    /// The caller identity could not be resolved.
    #[error("failed to resolve caller identity: {message}")]
    Auth {
        /// Provider message.
        message: String,
    },

    /// A read or write of the public access block configuration failed.
    #[error("AWS API error: {code} - {message}")]
    Api {
        /// Provider error code (e.g. `AccessDenied`).
        code: String,
        /// Provider message.
        message: String,
    },

    /// The lifecycle event carried an unknown request type.
    #[error("Unsupported request type: {0}")]
    UnsupportedRequestType(String),

    /// The identity service returned something that is not an account id.
    #[error("invalid AWS account ID: {0} (must be 12-digit numeric string)")]
    InvalidAccountId(String),

    /// Internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience result type for reconciler operations.
pub type BpaResult<T> = Result<T, BpaError>;

impl BpaError {
    /// Create an [`BpaError::Auth`] error.
    #[must_use]
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an [`BpaError::Api`] error.
    #[must_use]
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Whether this error is a provider permission failure.
    #[must_use]
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::Api { code, .. } if ACCESS_DENIED_CODES.contains(&code.as_str()))
    }

    /// The provider error code, for API failures.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Human-readable reason reported in a `FAILED` response.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Api { .. } if self.is_access_denied() => {
                "Insufficient permissions to modify S3 Block Public Access settings".to_owned()
            }
            Self::Api { code, .. } => format!("AWS API error: {code}"),
            Self::Auth { message } => {
                format!("Unable to resolve AWS account identity: {message}")
            }
            Self::UnsupportedRequestType(_) | Self::InvalidAccountId(_) | Self::Internal(_) => {
                format!("Internal error: {self}")
            }
        }
    }
}
