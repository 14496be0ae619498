// ============================================================================
// HTTP adapter
// ============================================================================
//
// Thin JSON front door for the Messages service:
//   POST /api/messages   form fields `type`, `message-content`
//   GET  /api/messages   all messages of the caller
//
// The caller's own `Authorization: Bearer` token is forwarded to the gRPC
// service; the adapter never substitutes a credential of its own.
//
// ============================================================================

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, State},
    http::{header, request::Parts, StatusCode},
    response::IntoResponse,
    routing::get,
    Form, Json, Router,
};
use chrono::Utc;
use msgstore_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::clients::MessagesClient;
use crate::grpc::proto;
use crate::service::DATETIME_FORMAT;

pub struct HttpState {
    pub client: MessagesClient,
}

/// Bearer token taken from the `Authorization` header
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::auth("missing bearer token"))?;

        Ok(BearerToken(token.to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct SendMessageForm {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(rename = "message-content", default)]
    pub content: String,
}

/// JSON view of a stored message
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageView {
    pub id: i64,
    pub content: String,
    pub owner_id: i64,
    #[serde(rename = "type")]
    pub message_type: i32,
    pub datetime: String,
}

impl From<proto::GetMessageResponse> for MessageView {
    fn from(message: proto::GetMessageResponse) -> Self {
        MessageView {
            id: message.id,
            content: message.content,
            owner_id: message.owner_id,
            message_type: message.r#type,
            datetime: message.datetime,
        }
    }
}

pub fn create_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/messages", get(list_messages).post(send_message))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

async fn send_message(
    State(state): State<Arc<HttpState>>,
    BearerToken(token): BearerToken,
    Form(form): Form<SendMessageForm>,
) -> AppResult<Json<Value>> {
    let message_type: i32 = form
        .message_type
        .trim()
        .parse()
        .map_err(|_| AppError::validation("type must be an integer"))?;
    let datetime = Utc::now().format(DATETIME_FORMAT).to_string();

    let message_id = state
        .client
        .send_message(&token, &form.content, message_type, &datetime)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "message_id": message_id,
        "datetime": datetime,
    })))
}

async fn list_messages(
    State(state): State<Arc<HttpState>>,
    BearerToken(token): BearerToken,
) -> AppResult<Json<Value>> {
    let messages: Vec<MessageView> = state
        .client
        .list_messages(&token)
        .await?
        .into_iter()
        .map(MessageView::from)
        .collect();

    Ok(Json(json!({
        "status": "success",
        "count": messages.len(),
        "messages": messages,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use msgstore_config::CrudClientConfig;
    use tower::ServiceExt;

    fn router() -> Router {
        // Never contacted: every request below is rejected before the RPC call
        let client = MessagesClient::new(&CrudClientConfig::for_endpoint("http://127.0.0.1:9"))
            .unwrap();
        create_router(Arc::new(HttpState { client }))
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_bearer_token_is_unauthorized() {
        let response = router()
            .oneshot(Request::get("/api/messages").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router()
            .oneshot(
                Request::get("/api/messages")
                    .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_numeric_type_is_bad_request() {
        let response = router()
            .oneshot(
                Request::post("/api/messages")
                    .header(header::AUTHORIZATION, "Bearer abc")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("type=note&message-content=hi"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_other_methods_are_not_allowed() {
        let response = router()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/api/messages")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_message_view_uses_type_key() {
        let view = MessageView::from(proto::GetMessageResponse {
            id: 1,
            content: "hi".to_string(),
            r#type: 1,
            owner_id: 9,
            datetime: "2024-01-01 10:00".to_string(),
        });
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["type"], 1);
        assert_eq!(json["owner_id"], 9);
    }
}
