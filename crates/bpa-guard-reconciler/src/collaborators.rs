//! External collaborators of the reconciler.
//!
//! Each trait wraps exactly one remote dependency. Reads and writes of the
//! account configuration report [`BpaError`](bpa_guard_core::BpaError)s,
//! which decide the outcome of the request. Notification and callback
//! delivery return [`anyhow::Result`]; their failures are only ever logged.

use async_trait::async_trait;
use bpa_guard_core::{AccountId, BpaResult};
use bpa_guard_model::{CustomResourceResponse, PublicAccessBlockConfig};

/// Resolves the AWS account the handler runs in.
#[async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug {
    /// Return the caller's account id.
    ///
    /// Fails with [`BpaError::Auth`](bpa_guard_core::BpaError::Auth) when the
    /// credentials are rejected.
    async fn caller_account_id(&self) -> BpaResult<AccountId>;
}

/// Account-level public access block storage.
#[async_trait]
pub trait PublicAccessBlockStore: Send + Sync + std::fmt::Debug {
    /// Read the configuration for `account`.
    ///
    /// Returns `Ok(None)` when the account has never been configured.
    async fn get(&self, account: &AccountId) -> BpaResult<Option<PublicAccessBlockConfig>>;

    /// Replace the configuration for `account`.
    async fn put(&self, account: &AccountId, config: &PublicAccessBlockConfig) -> BpaResult<()>;
}

/// Best-effort notification channel.
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Publish `message` with `subject` to `topic`.
    async fn publish(&self, topic: &str, subject: &str, message: &str) -> anyhow::Result<()>;
}

/// Delivers the custom-resource response to CloudFormation.
#[async_trait]
pub trait ResponseSink: Send + Sync + std::fmt::Debug {
    /// Send `response` to the pre-signed `url`.
    async fn deliver(&self, url: &str, response: &CustomResourceResponse) -> anyhow::Result<()>;
}
