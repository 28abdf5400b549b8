//! SNS notification payloads.
//!
//! Notifications are informational only; the message body is the
//! pretty-printed JSON form of one of these structs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::response::ResponseStatus;
use crate::types::PublicAccessBlockConfig;

/// Subject used after a successful `Create`.
pub const SUBJECT_APPLIED: &str = "S3 Block Public Access - Configuration Applied";

/// Subject used when an S3 Control call fails.
pub const SUBJECT_FAILED: &str = "S3 Block Public Access - Configuration Failed";

/// Subject used for every other failure.
pub const SUBJECT_INTERNAL_ERROR: &str = "S3 Block Public Access - Internal Error";

/// Sent after the configuration was verified or applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppliedNotification {
    /// Always `SUCCESS`.
    pub status: ResponseStatus,
    /// Same text as the response reason.
    pub message: String,
    /// Account the configuration belongs to.
    pub account_id: String,
    /// Configuration in effect now.
    pub configuration: PublicAccessBlockConfig,
    /// Configuration found before the handler ran; `null` if none was set.
    pub previous_configuration: Option<PublicAccessBlockConfig>,
    /// Whether a write was issued.
    pub configuration_changed: bool,
    /// Same timestamp as in the response data.
    pub timestamp: DateTime<Utc>,
}

/// Sent when handling failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FailureNotification {
    /// Always `FAILED`.
    pub status: ResponseStatus,
    /// Same text as the response reason.
    pub error: String,
    /// Provider error code, for API failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// When the failure was observed.
    pub timestamp: DateTime<Utc>,
}

impl FailureNotification {
    /// Subject line matching the kind of failure.
    #[must_use]
    pub fn subject(&self) -> &'static str {
        if self.error_code.is_some() {
            SUBJECT_FAILED
        } else {
            SUBJECT_INTERNAL_ERROR
        }
    }
}
