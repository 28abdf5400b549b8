//! Wire types for BPA Guard.
//!
//! - [`event`]: the CloudFormation custom-resource request delivered to the Lambda.
//! - [`response`]: the document PUT back to the pre-signed `ResponseURL`.
//! - [`types`]: the account-level S3 public access block configuration.
//! - [`notification`]: SNS notification payloads.
//!
//! All structs use `PascalCase` JSON field naming to match the CloudFormation
//! custom resource protocol.

pub mod event;
pub mod notification;
pub mod response;
pub mod types;

pub use event::{
    CustomResourceEvent, InvalidEvent, RequestType, ResourceProperties, UnsupportedRequestType,
};
pub use response::{CustomResourceResponse, ResponseData, ResponseStatus};
pub use types::PublicAccessBlockConfig;
