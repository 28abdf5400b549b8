//! The Block Public Access reconciler.
//!
//! Request flow for `Create`:
//!
//! ```text
//! resolve_account_id -> fetch_current_config -> configs_equal
//!     -> apply_config (only when different) -> notify -> SUCCESS
//! ```
//!
//! `Update` and `Delete` answer `SUCCESS` without any AWS call. Any error is
//! turned into a `FAILED` response at [`BpaReconciler::dispatch`], after a
//! best-effort failure notification.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use bpa_guard_core::{AccountId, BpaError, BpaResult, PhysicalResourceId};
use bpa_guard_model::notification::{AppliedNotification, FailureNotification, SUBJECT_APPLIED};
use bpa_guard_model::response::{AppliedData, NoOpData};
use bpa_guard_model::{
    CustomResourceEvent, CustomResourceResponse, InvalidEvent, PublicAccessBlockConfig,
    RequestType, ResponseData, ResponseStatus,
};

use crate::collaborators::{IdentityProvider, Notifier, PublicAccessBlockStore, ResponseSink};

const MSG_ALREADY_ENABLED: &str = "S3 Block Public Access already fully enabled at account level";
const MSG_ENABLED: &str = "S3 Block Public Access fully enabled at account level";

/// Reconciles the account's S3 Block Public Access settings in response to
/// custom-resource lifecycle events.
#[derive(Debug, Clone)]
pub struct BpaReconciler {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn PublicAccessBlockStore>,
    notifier: Arc<dyn Notifier>,
    sink: Arc<dyn ResponseSink>,
}

impl BpaReconciler {
    /// Create a reconciler from its collaborators.
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn PublicAccessBlockStore>,
        notifier: Arc<dyn Notifier>,
        sink: Arc<dyn ResponseSink>,
    ) -> Self {
        Self {
            identity,
            store,
            notifier,
            sink,
        }
    }

    /// The configuration every account is driven to: all four flags enabled.
    #[must_use]
    pub fn desired_config() -> PublicAccessBlockConfig {
        PublicAccessBlockConfig::FULLY_RESTRICTED
    }

    /// Compare the current configuration with the desired one.
    ///
    /// An absent configuration never equals anything.
    #[must_use]
    pub fn configs_equal(
        current: Option<&PublicAccessBlockConfig>,
        desired: &PublicAccessBlockConfig,
    ) -> bool {
        current.is_some_and(|current| current == desired)
    }

    /// Resolve the account the handler runs in.
    pub async fn resolve_account_id(&self) -> BpaResult<AccountId> {
        let account = self.identity.caller_account_id().await?;
        debug!(account_id = %account, "resolved caller account");
        Ok(account)
    }

    /// Fetch the account-level configuration; `None` if it was never set.
    pub async fn fetch_current_config(
        &self,
        account: &AccountId,
    ) -> BpaResult<Option<PublicAccessBlockConfig>> {
        let current = self.store.get(account).await?;
        debug!(account_id = %account, ?current, "fetched current public access block");
        Ok(current)
    }

    /// Write `config` for `account` and return the applied value.
    pub async fn apply_config(
        &self,
        config: PublicAccessBlockConfig,
        account: &AccountId,
    ) -> BpaResult<PublicAccessBlockConfig> {
        self.store.put(account, &config).await?;
        info!(account_id = %account, ?config, "applied public access block");
        Ok(config)
    }

    /// Handle a `Create` request.
    pub async fn handle_create(
        &self,
        event: &CustomResourceEvent,
    ) -> BpaResult<CustomResourceResponse> {
        info!("handling Create: applying full S3 Block Public Access");

        let account = self.resolve_account_id().await?;
        let desired = Self::desired_config();
        let current = self.fetch_current_config(&account).await?;

        let (configuration, changed, message) = if Self::configs_equal(current.as_ref(), &desired)
        {
            info!("S3 Block Public Access already fully enabled");
            (desired, false, MSG_ALREADY_ENABLED)
        } else {
            info!(previous = ?current, "enabling full S3 Block Public Access protection");
            let applied = self.apply_config(desired, &account).await?;
            (applied, true, MSG_ENABLED)
        };

        let timestamp = Utc::now();
        let notification = AppliedNotification {
            status: ResponseStatus::Success,
            message: message.to_owned(),
            account_id: account.to_string(),
            configuration,
            previous_configuration: current,
            configuration_changed: changed,
            timestamp,
        };
        self.notify_json(event.notification_topic(), SUBJECT_APPLIED, &notification)
            .await;

        let data = ResponseData::Applied(AppliedData {
            configuration,
            configuration_changed: changed,
            timestamp,
        });
        Ok(CustomResourceResponse::success(
            event,
            PhysicalResourceId::for_account(&account),
            message,
            data,
        ))
    }

    /// Handle an `Update` or `Delete` request.
    ///
    /// The account configuration is never read, reconciled or reverted here.
    #[must_use]
    pub fn handle_update_or_delete(
        event: &CustomResourceEvent,
        request_type: RequestType,
    ) -> CustomResourceResponse {
        info!(%request_type, "no action needed, returning success");
        let data = ResponseData::NoOp(NoOpData {
            message: format!("{request_type} operation completed - no changes made"),
            timestamp: Utc::now(),
        });
        CustomResourceResponse::success(
            event,
            fallback_physical_id(event),
            format!("{request_type} operation completed"),
            data,
        )
    }

    /// Route `event` by request type and turn every failure into a `FAILED`
    /// response.
    pub async fn dispatch(&self, event: &CustomResourceEvent) -> CustomResourceResponse {
        let result = match event.request_type() {
            Ok(RequestType::Create) => self.handle_create(event).await,
            Ok(request_type @ (RequestType::Update | RequestType::Delete)) => {
                Ok(Self::handle_update_or_delete(event, request_type))
            }
            Err(unsupported) => Err(BpaError::UnsupportedRequestType(unsupported.0)),
        };

        match result {
            Ok(response) => response,
            Err(err) => self.fail(event, &err).await,
        }
    }

    /// Dispatch `event` and deliver the response to CloudFormation.
    ///
    /// The response is also returned so the Lambda invocation output mirrors
    /// what was sent.
    #[instrument(
        skip_all,
        fields(
            request_type = %event.raw_request_type,
            request_id = %event.request_id,
            stack_id = %event.stack_id,
            logical_resource_id = %event.logical_resource_id,
        )
    )]
    pub async fn handle(&self, event: &CustomResourceEvent) -> CustomResourceResponse {
        info!("received custom resource request");
        let response = self.dispatch(event).await;
        self.deliver_response(event, &response).await;
        response
    }

    /// Deserialize a raw request body and handle it.
    ///
    /// A body that does not deserialize is still answered with `FAILED` when
    /// its `ResponseURL` is readable. Without one there is nothing to answer
    /// and the parse error is returned.
    pub async fn handle_raw(
        &self,
        payload: &serde_json::Value,
    ) -> BpaResult<CustomResourceResponse> {
        match CustomResourceEvent::from_json(payload) {
            Ok(event) => Ok(self.handle(&event).await),
            Err(mut invalid) => match invalid.envelope.take() {
                Some(event) => Ok(self.reject(&event, invalid).await),
                None => {
                    error!(error = %invalid, "request has no response URL to report on");
                    Err(BpaError::Internal(invalid.into()))
                }
            },
        }
    }

    #[instrument(
        skip_all,
        fields(
            request_type = %event.raw_request_type,
            request_id = %event.request_id,
            stack_id = %event.stack_id,
            logical_resource_id = %event.logical_resource_id,
        )
    )]
    async fn reject(
        &self,
        event: &CustomResourceEvent,
        invalid: InvalidEvent,
    ) -> CustomResourceResponse {
        warn!(error = %invalid, "received malformed custom resource request");
        let response = self.fail(event, &BpaError::Internal(invalid.into())).await;
        self.deliver_response(event, &response).await;
        response
    }

    /// Publish a notification. A missing topic is a no-op and delivery
    /// failures are logged and swallowed.
    pub async fn notify(&self, target: Option<&str>, subject: &str, message: &str) {
        let Some(topic) = target.filter(|topic| !topic.is_empty()) else {
            return;
        };
        match self.notifier.publish(topic, subject, message).await {
            Ok(()) => info!(topic_arn = topic, "notification sent"),
            Err(e) => error!(
                topic_arn = topic,
                error = %format!("{e:#}"),
                "failed to send notification"
            ),
        }
    }

    /// PUT `response` to the event's `ResponseURL`. Failures are logged only;
    /// there is no other channel to report them on.
    pub async fn deliver_response(
        &self,
        event: &CustomResourceEvent,
        response: &CustomResourceResponse,
    ) {
        match self.sink.deliver(&event.response_url, response).await {
            Ok(()) => info!(status = %response.status, "response sent"),
            Err(e) => error!(
                status = %response.status,
                error = %format!("{e:#}"),
                "failed to send response"
            ),
        }
    }

    async fn notify_json<T: Serialize>(&self, target: Option<&str>, subject: &str, payload: &T) {
        if target.is_none() {
            return;
        }
        match serde_json::to_string_pretty(payload) {
            Ok(message) => self.notify(target, subject, &message).await,
            Err(e) => warn!(error = %e, "failed to serialize notification"),
        }
    }

    async fn fail(&self, event: &CustomResourceEvent, err: &BpaError) -> CustomResourceResponse {
        match err.code() {
            Some(code) => error!(error_code = code, error = %err, "AWS API error"),
            None => error!(error = %err, "request handling failed"),
        }

        let reason = err.reason();
        let notification = FailureNotification {
            status: ResponseStatus::Failed,
            error: reason.clone(),
            error_code: err.code().map(ToOwned::to_owned),
            timestamp: Utc::now(),
        };
        self.notify_json(
            event.notification_topic(),
            notification.subject(),
            &notification,
        )
        .await;

        CustomResourceResponse::failed(event, fallback_physical_id(event), reason)
    }
}

/// Physical id for responses that have no resolved account: the id
/// CloudFormation already knows, else one derived from the stack's account,
/// else one derived from the request id.
fn fallback_physical_id(event: &CustomResourceEvent) -> PhysicalResourceId {
    if let Some(id) = event.physical_resource_id.as_deref().filter(|id| !id.is_empty()) {
        return PhysicalResourceId::existing(id);
    }
    AccountId::from_arn(&event.stack_id).map_or_else(
        || PhysicalResourceId::with_suffix(&event.request_id),
        |account| PhysicalResourceId::for_account(&account),
    )
}
