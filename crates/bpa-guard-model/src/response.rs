//! Custom-resource response document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::CustomResourceEvent;
use crate::types::PublicAccessBlockConfig;

/// Outcome reported to CloudFormation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseStatus {
    /// The operation succeeded.
    #[serde(rename = "SUCCESS")]
    Success,
    /// The operation failed; the stack operation rolls back.
    #[serde(rename = "FAILED")]
    Failed,
}

impl ResponseStatus {
    /// Returns the wire-format string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a `Create`, exposed through `Fn::GetAtt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppliedData {
    /// The configuration in effect after the operation.
    #[serde(flatten)]
    pub configuration: PublicAccessBlockConfig,
    /// Whether the handler had to write the configuration.
    pub configuration_changed: bool,
    /// When the operation completed.
    pub timestamp: DateTime<Utc>,
}

/// Result of an `Update`/`Delete`, which never touch the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NoOpData {
    /// Description of the (absent) action.
    pub message: String,
    /// When the operation completed.
    pub timestamp: DateTime<Utc>,
}

/// Structured `Data` attached to a successful response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    /// `Create` result.
    Applied(AppliedData),
    /// `Update`/`Delete` result.
    NoOp(NoOpData),
}

/// Response PUT to the event's `ResponseURL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    /// `SUCCESS` or `FAILED`.
    pub status: ResponseStatus,
    /// Human-readable explanation shown in the stack events.
    pub reason: String,
    /// Identifier of the real-world side effect.
    pub physical_resource_id: String,
    /// Echoed from the request.
    pub stack_id: String,
    /// Echoed from the request.
    pub request_id: String,
    /// Echoed from the request.
    pub logical_resource_id: String,
    /// Optional attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl CustomResourceResponse {
    /// Build a `SUCCESS` response for `event`.
    #[must_use]
    pub fn success(
        event: &CustomResourceEvent,
        physical_resource_id: impl Into<String>,
        reason: impl Into<String>,
        data: ResponseData,
    ) -> Self {
        Self::new(
            event,
            ResponseStatus::Success,
            physical_resource_id,
            reason,
            Some(data),
        )
    }

    /// Build a `FAILED` response for `event`.
    #[must_use]
    pub fn failed(
        event: &CustomResourceEvent,
        physical_resource_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(
            event,
            ResponseStatus::Failed,
            physical_resource_id,
            reason,
            None,
        )
    }

    fn new(
        event: &CustomResourceEvent,
        status: ResponseStatus,
        physical_resource_id: impl Into<String>,
        reason: impl Into<String>,
        data: Option<ResponseData>,
    ) -> Self {
        Self {
            status,
            reason: reason.into(),
            physical_resource_id: physical_resource_id.into(),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            data,
        }
    }

    /// The applied configuration data, when this is a `Create` success.
    #[must_use]
    pub fn applied(&self) -> Option<&AppliedData> {
        match &self.data {
            Some(ResponseData::Applied(data)) => Some(data),
            _ => None,
        }
    }
}
