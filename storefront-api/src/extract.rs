/// Request body extraction
///
/// [`ApiJson`] is `axum::Json` with its rejection routed through
/// [`ApiError`], so a body that cannot be read answers with the usual
/// error envelope (400, `errors.body`) instead of axum's plain-text reply.

use crate::error::ApiError;
use axum::extract::FromRequest;

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::post,
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Named {
        name: String,
    }

    async fn echo(ApiJson(body): ApiJson<Named>) -> String {
        body.name
    }

    async fn call(content_type: Option<&str>, body: &str) -> (StatusCode, serde_json::Value) {
        let app = Router::new().route("/", post(echo));

        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }

        let response = app
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn test_valid_body_passes_through() {
        let (status, _) = call(Some("application/json"), r#"{"name":"kettle"}"#).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rejections_use_error_envelope() {
        for (content_type, body) in [
            (Some("application/json"), r#"{"name":5}"#),
            (Some("application/json"), r#"{"name":"#),
            (None, r#"{"name":"kettle"}"#),
        ] {
            let (status, json) = call(content_type, body).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
            assert_eq!(json["error"], "validation_error");
            assert!(json["errors"]["body"][0].is_string());
        }
    }
}
