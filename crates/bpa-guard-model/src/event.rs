//! CloudFormation custom-resource request event.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle verb of a custom-resource request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestType {
    /// The resource is being created.
    Create,
    /// The resource properties changed.
    Update,
    /// The resource (or its stack) is being deleted.
    Delete,
}

impl RequestType {
    /// Returns the wire-format string for this request type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request type outside `Create`/`Update`/`Delete`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported request type: {0}")]
pub struct UnsupportedRequestType(pub String);

impl FromStr for RequestType {
    type Err = UnsupportedRequestType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Create" => Ok(Self::Create),
            "Update" => Ok(Self::Update),
            "Delete" => Ok(Self::Delete),
            other => Err(UnsupportedRequestType(other.to_owned())),
        }
    }
}

/// Properties declared on the custom resource in the template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceProperties {
    /// SNS topic that receives configuration notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_topic_arn: Option<String>,

    /// Every other property, including the `ServiceToken` CloudFormation
    /// copies into the properties map.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ResourceProperties {
    /// The configured notification topic, ignoring empty strings (a template
    /// condition that resolves to `""` means "no topic").
    #[must_use]
    pub fn notification_topic(&self) -> Option<&str> {
        self.notification_topic_arn
            .as_deref()
            .map(str::trim)
            .filter(|arn| !arn.is_empty())
    }
}

/// A custom-resource request as delivered to the Lambda function.
///
/// `RequestType` is kept as the raw wire string so an unknown verb still
/// deserializes and can be answered with a `FAILED` response; use
/// [`CustomResourceEvent::request_type`] to obtain the typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    /// `Create`, `Update` or `Delete`.
    #[serde(rename = "RequestType")]
    pub raw_request_type: String,

    /// Pre-signed URL the response must be PUT to.
    #[serde(rename = "ResponseURL")]
    pub response_url: String,

    /// ARN of the stack that owns the resource.
    pub stack_id: String,

    /// Unique id of this request.
    pub request_id: String,

    /// Template logical id of the resource.
    pub logical_resource_id: String,

    /// Physical id previously reported by the handler (`Update`/`Delete` only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,

    /// ARN of the function CloudFormation invoked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_token: Option<String>,

    /// Resource type as written in the template (e.g. `Custom::AccountBPA`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    /// Properties declared on the resource.
    #[serde(default)]
    pub resource_properties: ResourceProperties,

    /// Previous properties (`Update` only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<ResourceProperties>,
}

/// A request body that does not deserialize into a [`CustomResourceEvent`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid custom resource request: {message}")]
pub struct InvalidEvent {
    /// Deserialization error.
    pub message: String,
    /// The identifying fields that could still be read, present only when the
    /// body carries a string `ResponseURL` to answer on.
    pub envelope: Option<Box<CustomResourceEvent>>,
}

impl CustomResourceEvent {
    /// Deserialize a raw request body.
    ///
    /// On failure the error keeps whatever string fields were readable so the
    /// request can still be answered with a `FAILED` response.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, InvalidEvent> {
        Self::deserialize(value).map_err(|e| InvalidEvent {
            message: e.to_string(),
            envelope: Self::envelope(value).map(Box::new),
        })
    }

    fn envelope(value: &serde_json::Value) -> Option<Self> {
        let field = |pointer: &str| {
            value
                .pointer(pointer)
                .and_then(serde_json::Value::as_str)
                .map(ToOwned::to_owned)
        };

        Some(Self {
            raw_request_type: field("/RequestType").unwrap_or_default(),
            response_url: field("/ResponseURL")?,
            stack_id: field("/StackId").unwrap_or_default(),
            request_id: field("/RequestId").unwrap_or_default(),
            logical_resource_id: field("/LogicalResourceId").unwrap_or_default(),
            physical_resource_id: field("/PhysicalResourceId"),
            service_token: field("/ServiceToken"),
            resource_type: field("/ResourceType"),
            resource_properties: ResourceProperties {
                notification_topic_arn: field("/ResourceProperties/NotificationTopicArn"),
                extra: serde_json::Map::new(),
            },
            old_resource_properties: None,
        })
    }

    /// Parse the request type.
    pub fn request_type(&self) -> Result<RequestType, UnsupportedRequestType> {
        self.raw_request_type.parse()
    }

    /// The configured notification topic, if any.
    #[must_use]
    pub fn notification_topic(&self) -> Option<&str> {
        self.resource_properties.notification_topic()
    }
}
