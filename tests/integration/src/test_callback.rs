//! Response delivery over HTTP.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bpa_guard_model::response::NoOpData;
    use bpa_guard_model::{
        CustomResourceEvent, CustomResourceResponse, ResourceProperties, ResponseData,
    };
    use bpa_guard_reconciler::{HttpResponseSink, ResponseSink};
    use http::{Method, StatusCode};

    use crate::{CaptureServer, closed_url};

    fn response() -> CustomResourceResponse {
        let event = CustomResourceEvent {
            raw_request_type: "Delete".to_owned(),
            response_url: String::new(),
            stack_id: "arn:aws:cloudformation:us-east-1:123456789012:stack/x/y".to_owned(),
            request_id: "req-1".to_owned(),
            logical_resource_id: "AccountBPA".to_owned(),
            physical_resource_id: Some("account-bpa-123456789012".to_owned()),
            service_token: None,
            resource_type: None,
            resource_properties: ResourceProperties::default(),
            old_resource_properties: None,
        };
        CustomResourceResponse::success(
            &event,
            "account-bpa-123456789012",
            "Delete operation completed",
            ResponseData::NoOp(NoOpData {
                message: "Delete operation completed - no changes made".to_owned(),
                timestamp: chrono::Utc::now(),
            }),
        )
    }

    fn sink() -> HttpResponseSink {
        HttpResponseSink::new(Duration::from_secs(5)).expect("http sink")
    }

    #[tokio::test]
    async fn test_should_put_response_json_to_presigned_url() {
        let mut server = CaptureServer::start(StatusCode::OK).await;
        let url = server.url("/bucket/key?X-Amz-Signature=abc");
        let response = response();

        sink().deliver(&url, &response).await.expect("deliver");

        let request = server.next_request().await;
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.path, "/bucket/key?X-Amz-Signature=abc");
        assert_eq!(request.content_type.as_deref(), Some(""));
        let body: CustomResourceResponse = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body, response);
    }

    #[tokio::test]
    async fn test_should_fail_on_error_status() {
        let mut server = CaptureServer::start(StatusCode::FORBIDDEN).await;

        let result = sink().deliver(&server.url("/response"), &response()).await;

        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("403"));
        server.next_request().await;
    }

    #[tokio::test]
    async fn test_should_fail_when_endpoint_unreachable() {
        let result = sink().deliver(&closed_url().await, &response()).await;
        assert!(result.is_err());
    }
}
