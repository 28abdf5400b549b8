//! Full custom-resource lifecycle: dispatch, notify, and respond over HTTP.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use bpa_guard_core::AccountId;
    use bpa_guard_model::notification::SUBJECT_FAILED;
    use bpa_guard_model::{
        CustomResourceEvent, CustomResourceResponse, PublicAccessBlockConfig, ResponseStatus,
    };
    use bpa_guard_reconciler::testing::{InMemoryStore, RecordingNotifier, StaticIdentity};
    use bpa_guard_reconciler::{BpaReconciler, HttpResponseSink};
    use http::StatusCode;

    use crate::{CaptureServer, closed_url};

    const ACCOUNT: &str = "123456789012";
    const TOPIC: &str = "arn:aws:sns:us-east-1:123456789012:bpa-alerts";

    fn reconciler(store: Arc<InMemoryStore>, notifier: Arc<RecordingNotifier>) -> BpaReconciler {
        BpaReconciler::new(
            Arc::new(StaticIdentity::account(ACCOUNT)),
            store,
            notifier,
            Arc::new(HttpResponseSink::new(Duration::from_secs(5)).expect("http sink")),
        )
    }

    fn event(
        request_type: &str,
        response_url: &str,
        props: serde_json::Value,
    ) -> CustomResourceEvent {
        serde_json::from_value(serde_json::json!({
            "RequestType": request_type,
            "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:bpa-guard",
            "ResponseURL": response_url,
            "StackId": format!("arn:aws:cloudformation:us-east-1:{ACCOUNT}:stack/x/y"),
            "RequestId": "5d478e5b-7d44-4b39-b6b6-1e4ac7e4d3c1",
            "LogicalResourceId": "AccountBPA",
            "PhysicalResourceId": if request_type == "Create" {
                serde_json::Value::Null
            } else {
                serde_json::json!(format!("account-bpa-{ACCOUNT}"))
            },
            "ResourceType": "Custom::AccountBPA",
            "ResourceProperties": props,
        }))
        .expect("valid event")
    }

    async fn delivered(server: &mut CaptureServer) -> serde_json::Value {
        let request = server.next_request().await;
        serde_json::from_slice(&request.body).expect("response body is JSON")
    }

    #[tokio::test]
    async fn test_should_enable_bpa_and_report_change() {
        let mut server = CaptureServer::start(StatusCode::OK).await;
        let store = Arc::new(InMemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let reconciler = reconciler(store.clone(), notifier.clone());

        reconciler
            .handle(&event("Create", &server.url("/response"), serde_json::json!({})))
            .await;

        let body = delivered(&mut server).await;
        assert_eq!(body["Status"], "SUCCESS");
        assert_eq!(body["PhysicalResourceId"], "account-bpa-123456789012");
        assert_eq!(body["Data"]["ConfigurationChanged"], true);
        for flag in [
            "BlockPublicAcls",
            "IgnorePublicAcls",
            "BlockPublicPolicy",
            "RestrictPublicBuckets",
        ] {
            assert_eq!(body["Data"][flag], true, "{flag}");
        }
        assert!(body["Data"]["Timestamp"].is_string());
        assert_eq!(
            store.config_for(&AccountId::new(ACCOUNT).unwrap()),
            Some(PublicAccessBlockConfig::FULLY_RESTRICTED)
        );
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_should_report_unchanged_when_already_enabled() {
        let mut server = CaptureServer::start(StatusCode::OK).await;
        let store = Arc::new(InMemoryStore::default().with_config(
            AccountId::new(ACCOUNT).unwrap(),
            PublicAccessBlockConfig::FULLY_RESTRICTED,
        ));
        let reconciler = reconciler(store.clone(), Arc::new(RecordingNotifier::default()));

        reconciler
            .handle(&event("Create", &server.url("/response"), serde_json::json!({})))
            .await;

        let body = delivered(&mut server).await;
        assert_eq!(body["Status"], "SUCCESS");
        assert_eq!(body["Data"]["ConfigurationChanged"], false);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_should_answer_delete_without_touching_account() {
        let mut server = CaptureServer::start(StatusCode::OK).await;
        let store = Arc::new(InMemoryStore::default());
        let reconciler = reconciler(store.clone(), Arc::new(RecordingNotifier::default()));

        reconciler
            .handle(&event(
                "Delete",
                &server.url("/response"),
                serde_json::json!({ "NotificationTopicArn": TOPIC }),
            ))
            .await;

        let body = delivered(&mut server).await;
        assert_eq!(body["Status"], "SUCCESS");
        assert_eq!(body["Reason"], "Delete operation completed");
        assert_eq!(body["PhysicalResourceId"], "account-bpa-123456789012");
        assert_eq!(store.reads(), 0);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_should_report_permission_failure_and_notify_once() {
        let mut server = CaptureServer::start(StatusCode::OK).await;
        let store =
            Arc::new(InMemoryStore::default().fail_put_with("AccessDenied", "Access Denied"));
        let notifier = Arc::new(RecordingNotifier::default());
        let reconciler = reconciler(store, notifier.clone());

        let response = reconciler
            .handle(&event(
                "Create",
                &server.url("/response"),
                serde_json::json!({ "NotificationTopicArn": TOPIC }),
            ))
            .await;

        let body = delivered(&mut server).await;
        assert_eq!(body["Status"], "FAILED");
        assert_eq!(
            body["Reason"],
            "Insufficient permissions to modify S3 Block Public Access settings"
        );
        assert!(body.get("Data").is_none());
        assert_eq!(response.status, ResponseStatus::Failed);
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, SUBJECT_FAILED);
        assert_eq!(server.pending(), 0);
    }

    #[tokio::test]
    async fn test_should_answer_unsupported_request_type_with_failure() {
        let mut server = CaptureServer::start(StatusCode::OK).await;
        let reconciler = reconciler(
            Arc::new(InMemoryStore::default()),
            Arc::new(RecordingNotifier::default()),
        );

        reconciler
            .handle(&event("Replace", &server.url("/response"), serde_json::json!({})))
            .await;

        let body = delivered(&mut server).await;
        assert_eq!(body["Status"], "FAILED");
        assert!(
            body["Reason"]
                .as_str()
                .unwrap()
                .contains("Unsupported request type")
        );
    }

    #[tokio::test]
    async fn test_should_complete_when_response_url_unreachable() {
        let store = Arc::new(InMemoryStore::default());
        let reconciler = reconciler(store.clone(), Arc::new(RecordingNotifier::default()));

        let response: CustomResourceResponse = reconciler
            .handle(&event("Create", &closed_url().await, serde_json::json!({})))
            .await;

        assert_eq!(response.status, ResponseStatus::Success);
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_should_answer_malformed_topic_over_http() {
        let mut server = CaptureServer::start(StatusCode::OK).await;
        let store = Arc::new(InMemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let reconciler = reconciler(store.clone(), notifier.clone());
        let mut payload = serde_json::to_value(event(
            "Create",
            &server.url("/response"),
            serde_json::json!({}),
        ))
        .unwrap();
        payload["ResourceProperties"]["NotificationTopicArn"] = serde_json::json!([TOPIC]);

        let response = reconciler.handle_raw(&payload).await.expect("answered");

        let body = delivered(&mut server).await;
        assert_eq!(body["Status"], "FAILED");
        assert_eq!(body["RequestId"], "5d478e5b-7d44-4b39-b6b6-1e4ac7e4d3c1");
        assert_eq!(body["LogicalResourceId"], "AccountBPA");
        assert!(
            body["Reason"]
                .as_str()
                .unwrap()
                .starts_with("Internal error: invalid custom resource request")
        );
        assert_eq!(response.status, ResponseStatus::Failed);
        assert_eq!(store.writes(), 0);
        assert!(notifier.sent().is_empty());
    }
}
