//! Account-level S3 Block Public Access configuration.

use serde::{Deserialize, Serialize};

/// The four independent Block Public Access flags.
///
/// Field names serialize as `BlockPublicAcls`, `IgnorePublicAcls`,
/// `BlockPublicPolicy` and `RestrictPublicBuckets`, which is both the S3
/// Control wire shape and the shape reported in response `Data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublicAccessBlockConfig {
    /// Reject PUT requests that carry public ACLs.
    pub block_public_acls: bool,
    /// Ignore all public ACLs on buckets and objects.
    pub ignore_public_acls: bool,
    /// Reject bucket policies that grant public access.
    pub block_public_policy: bool,
    /// Restrict access to buckets with public policies to AWS principals.
    pub restrict_public_buckets: bool,
}

impl PublicAccessBlockConfig {
    /// Every flag enabled.
    pub const FULLY_RESTRICTED: Self = Self {
        block_public_acls: true,
        ignore_public_acls: true,
        block_public_policy: true,
        restrict_public_buckets: true,
    };

    /// Whether all four flags are enabled.
    #[must_use]
    pub fn is_fully_restricted(&self) -> bool {
        *self == Self::FULLY_RESTRICTED
    }
}
