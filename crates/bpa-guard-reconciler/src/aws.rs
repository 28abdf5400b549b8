//! AWS SDK backed collaborators: STS for identity, S3 Control for the public
//! access block, SNS for notifications.

use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_s3control::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3control::types::PublicAccessBlockConfiguration;
use tracing::debug;

use bpa_guard_core::{AccountId, BpaError, BpaResult};
use bpa_guard_model::PublicAccessBlockConfig;

use crate::collaborators::{IdentityProvider, Notifier, PublicAccessBlockStore};

/// Error code S3 Control returns for an account that was never configured.
const NOT_CONFIGURED_CODE: &str = "NoSuchPublicAccessBlockConfiguration";

/// Convert an SDK error into an [`BpaError::Api`], keeping the provider code.
fn api_error<E>(err: E) -> BpaError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let code = err.code().unwrap_or("Unknown").to_owned();
    let message = err
        .message()
        .map_or_else(|| DisplayErrorContext(&err).to_string(), ToOwned::to_owned);
    BpaError::api(code, message)
}

/// Resolves the account through STS `GetCallerIdentity`.
#[derive(Debug, Clone)]
pub struct StsIdentityProvider {
    client: aws_sdk_sts::Client,
}

impl StsIdentityProvider {
    /// Wrap an STS client.
    #[must_use]
    pub fn new(client: aws_sdk_sts::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentityProvider for StsIdentityProvider {
    async fn caller_account_id(&self) -> BpaResult<AccountId> {
        let output = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| {
                let message = e
                    .message()
                    .map_or_else(|| DisplayErrorContext(&e).to_string(), ToOwned::to_owned);
                BpaError::auth(message)
            })?;

        let account = output
            .account()
            .ok_or_else(|| BpaError::auth("GetCallerIdentity returned no account"))?;
        AccountId::new(account)
    }
}

/// Reads and writes the account-level public access block through S3 Control.
#[derive(Debug, Clone)]
pub struct S3ControlStore {
    client: aws_sdk_s3control::Client,
}

impl S3ControlStore {
    /// Wrap an S3 Control client.
    #[must_use]
    pub fn new(client: aws_sdk_s3control::Client) -> Self {
        Self { client }
    }
}

/// Flags absent from the response are read as enabled, as is a successful
/// response that carries no configuration at all.
fn from_sdk(config: &PublicAccessBlockConfiguration) -> PublicAccessBlockConfig {
    PublicAccessBlockConfig {
        block_public_acls: config.block_public_acls().unwrap_or(true),
        ignore_public_acls: config.ignore_public_acls().unwrap_or(true),
        block_public_policy: config.block_public_policy().unwrap_or(true),
        restrict_public_buckets: config.restrict_public_buckets().unwrap_or(true),
    }
}

fn to_sdk(config: &PublicAccessBlockConfig) -> PublicAccessBlockConfiguration {
    PublicAccessBlockConfiguration::builder()
        .block_public_acls(config.block_public_acls)
        .ignore_public_acls(config.ignore_public_acls)
        .block_public_policy(config.block_public_policy)
        .restrict_public_buckets(config.restrict_public_buckets)
        .build()
}

#[async_trait]
impl PublicAccessBlockStore for S3ControlStore {
    async fn get(&self, account: &AccountId) -> BpaResult<Option<PublicAccessBlockConfig>> {
        match self
            .client
            .get_public_access_block()
            .account_id(account.as_str())
            .send()
            .await
        {
            Ok(output) => Ok(Some(
                output
                    .public_access_block_configuration()
                    .map_or(PublicAccessBlockConfig::FULLY_RESTRICTED, from_sdk),
            )),
            Err(err)
                if err.as_service_error().is_some_and(|e| {
                    e.is_no_such_public_access_block_configuration()
                }) || err.code() == Some(NOT_CONFIGURED_CODE) =>
            {
                debug!(account_id = %account, "no public access block configured");
                Ok(None)
            }
            Err(err) => Err(api_error(err)),
        }
    }

    async fn put(&self, account: &AccountId, config: &PublicAccessBlockConfig) -> BpaResult<()> {
        self.client
            .put_public_access_block()
            .account_id(account.as_str())
            .public_access_block_configuration(to_sdk(config))
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }
}

/// Publishes notifications to SNS.
#[derive(Debug, Clone)]
pub struct SnsNotifier {
    client: aws_sdk_sns::Client,
}

impl SnsNotifier {
    /// Wrap an SNS client.
    #[must_use]
    pub fn new(client: aws_sdk_sns::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn publish(&self, topic: &str, subject: &str, message: &str) -> anyhow::Result<()> {
        let output = self
            .client
            .publish()
            .topic_arn(topic)
            .subject(subject)
            .message(message)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!(DisplayErrorContext(&e).to_string()))
            .with_context(|| format!("failed to publish to {topic}"))?;
        debug!(message_id = ?output.message_id(), "SNS publish accepted");
        Ok(())
    }
}
