//! Common AWS identifiers used across the reconciler.

use std::fmt;

/// AWS Account ID (12-digit string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create a new account ID from a string.
    ///
    /// # Errors
    /// Returns an error if the account ID is not a 12-digit numeric string.
    pub fn new(id: impl Into<String>) -> Result<Self, crate::BpaError> {
        let id = id.into();
        if !is_account_id(&id) {
            return Err(crate::BpaError::InvalidAccountId(id));
        }
        Ok(Self(id))
    }

    /// Extract the account ID embedded in an ARN such as a CloudFormation
    /// stack id (`arn:aws:cloudformation:<region>:<account>:stack/<name>/<id>`).
    #[must_use]
    pub fn from_arn(arn: &str) -> Option<Self> {
        let mut parts = arn.splitn(6, ':');
        if parts.next() != Some("arn") {
            return None;
        }
        let account = parts.nth(3)?;
        is_account_id(account).then(|| Self(account.to_owned()))
    }

    /// Get the account ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_account_id(id: &str) -> bool {
    id.len() == 12 && id.chars().all(|c| c.is_ascii_digit())
}

/// Physical resource id reported back to CloudFormation.
///
/// The id is derived from the account so that it stays stable across stack
/// updates: `account-bpa-<accountId>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PhysicalResourceId(String);

impl PhysicalResourceId {
    /// Prefix shared by every id this handler issues.
    pub const PREFIX: &str = "account-bpa-";

    /// Build the id for an account.
    #[must_use]
    pub fn for_account(account: &AccountId) -> Self {
        Self(format!("{}{account}", Self::PREFIX))
    }

    /// Build a fallback id from an arbitrary suffix (used when no account
    /// could be determined).
    #[must_use]
    pub fn with_suffix(suffix: &str) -> Self {
        Self(format!("{}{suffix}", Self::PREFIX))
    }

    /// Wrap an id received from CloudFormation verbatim.
    #[must_use]
    pub fn existing(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhysicalResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PhysicalResourceId> for String {
    fn from(id: PhysicalResourceId) -> Self {
        id.0
    }
}
