//! In-memory collaborators for exercising [`BpaReconciler`](crate::BpaReconciler)
//! without AWS.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use parking_lot::Mutex;

use bpa_guard_core::{AccountId, BpaError, BpaResult};
use bpa_guard_model::{CustomResourceResponse, PublicAccessBlockConfig};

use crate::collaborators::{IdentityProvider, Notifier, PublicAccessBlockStore, ResponseSink};

/// Identity provider that always returns the same account or the same error.
#[derive(Debug)]
pub struct StaticIdentity {
    result: Result<AccountId, String>,
}

impl StaticIdentity {
    /// Always resolve to `account`.
    ///
    /// # Panics
    /// Panics if `account` is not a valid account id.
    #[must_use]
    pub fn account(account: &str) -> Self {
        Self {
            result: Ok(AccountId::new(account).expect("valid test account id")),
        }
    }

    /// Always fail with an auth error carrying `message`.
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_owned()),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn caller_account_id(&self) -> BpaResult<AccountId> {
        self.result.clone().map_err(BpaError::auth)
    }
}

/// Public access block store backed by a map, with injectable failures and
/// call counters.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    configs: Mutex<HashMap<AccountId, PublicAccessBlockConfig>>,
    get_failure: Option<(String, String)>,
    put_failure: Option<(String, String)>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl InMemoryStore {
    /// Seed the configuration of `account`.
    #[must_use]
    pub fn with_config(self, account: AccountId, config: PublicAccessBlockConfig) -> Self {
        self.configs.lock().insert(account, config);
        self
    }

    /// Make every read fail with the given provider code.
    #[must_use]
    pub fn fail_get_with(mut self, code: &str, message: &str) -> Self {
        self.get_failure = Some((code.to_owned(), message.to_owned()));
        self
    }

    /// Make every write fail with the given provider code.
    #[must_use]
    pub fn fail_put_with(mut self, code: &str, message: &str) -> Self {
        self.put_failure = Some((code.to_owned(), message.to_owned()));
        self
    }

    /// Current configuration of `account`.
    #[must_use]
    pub fn config_for(&self, account: &AccountId) -> Option<PublicAccessBlockConfig> {
        self.configs.lock().get(account).copied()
    }

    /// Number of reads attempted.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of writes attempted.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PublicAccessBlockStore for InMemoryStore {
    async fn get(&self, account: &AccountId) -> BpaResult<Option<PublicAccessBlockConfig>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some((code, message)) = &self.get_failure {
            return Err(BpaError::api(code, message));
        }
        Ok(self.config_for(account))
    }

    async fn put(&self, account: &AccountId, config: &PublicAccessBlockConfig) -> BpaResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if let Some((code, message)) = &self.put_failure {
            return Err(BpaError::api(code, message));
        }
        self.configs.lock().insert(account.clone(), *config);
        Ok(())
    }
}

/// A notification captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    /// Target topic.
    pub topic: String,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub message: String,
}

/// Notifier that records successful publishes.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentNotification>>,
    failure: Mutex<Option<String>>,
    attempts: AtomicUsize,
}

impl RecordingNotifier {
    /// Make every subsequent publish fail.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock() = Some(message.to_owned());
    }

    /// Notifications published so far.
    #[must_use]
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().clone()
    }

    /// Number of publish attempts, including failed ones.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, topic: &str, subject: &str, message: &str) -> anyhow::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.failure.lock().clone() {
            return Err(anyhow!(failure));
        }
        self.sent.lock().push(SentNotification {
            topic: topic.to_owned(),
            subject: subject.to_owned(),
            message: message.to_owned(),
        });
        Ok(())
    }
}

/// Response sink that records deliveries instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<(String, CustomResourceResponse)>>,
    failure: Mutex<Option<String>>,
    attempts: AtomicUsize,
}

impl RecordingSink {
    /// Make every subsequent delivery fail.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock() = Some(message.to_owned());
    }

    /// `(url, response)` pairs delivered so far.
    #[must_use]
    pub fn delivered(&self) -> Vec<(String, CustomResourceResponse)> {
        self.delivered.lock().clone()
    }

    /// Number of delivery attempts, including failed ones.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResponseSink for RecordingSink {
    async fn deliver(&self, url: &str, response: &CustomResourceResponse) -> anyhow::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.failure.lock().clone() {
            return Err(anyhow!(failure));
        }
        self.delivered.lock().push((url.to_owned(), response.clone()));
        Ok(())
    }
}
