//! Account-level S3 Block Public Access reconciler.
//!
//! [`BpaReconciler`] answers CloudFormation custom-resource requests: on
//! `Create` it makes sure every Block Public Access flag is enabled for the
//! account, on `Update`/`Delete` it reports success without touching the
//! account. The AWS services it talks to sit behind the traits in
//! [`collaborators`]; [`aws`] and [`callback`] provide the production
//! implementations.

pub mod aws;
pub mod callback;
pub mod collaborators;
pub mod provider;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use callback::HttpResponseSink;
pub use collaborators::{IdentityProvider, Notifier, PublicAccessBlockStore, ResponseSink};
pub use provider::BpaReconciler;
