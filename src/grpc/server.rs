// ============================================================================
// Messages gRPC server
// ============================================================================
//
// Per call: authenticate -> dispatch to the domain service -> translate.
// The owner id always comes from the validated token, never from the request
// body. The server keeps no per-call state and never retries.
//
// ============================================================================

use std::sync::Arc;

use tonic::metadata::MetadataMap;
use tonic::{Request, Response, Status};

use super::proto;
use super::status::{auth_status, Operation, StatusMapping};
use super::Messages;
use crate::auth::TokenValidator;
use crate::service::MessageService;
use crate::store::StoreError;

const AUTHORIZATION: &str = "authorization";

#[derive(Clone)]
pub struct MessagesGrpcService {
    service: Arc<MessageService>,
    validator: Arc<TokenValidator>,
    statuses: StatusMapping,
}

impl MessagesGrpcService {
    pub fn new(
        service: Arc<MessageService>,
        validator: Arc<TokenValidator>,
        statuses: StatusMapping,
    ) -> Self {
        Self {
            service,
            validator,
            statuses,
        }
    }

    /// Resolve the caller's owner id, or fail before any domain logic runs
    fn authenticate(
        &self,
        op: Operation,
        metadata: &MetadataMap,
        token_field: &str,
    ) -> Result<i64, Status> {
        let token = request_token(metadata, token_field);
        self.validator
            .owner_id(token)
            .map_err(|e| auth_status(op, &e))
    }
}

/// The `token` field wins; an `authorization: Bearer` entry is the fallback
fn request_token<'a>(metadata: &'a MetadataMap, token_field: &'a str) -> &'a str {
    if !token_field.is_empty() {
        return token_field;
    }
    metadata
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .unwrap_or_default()
}

#[tonic::async_trait]
impl Messages for MessagesGrpcService {
    async fn send_message(
        &self,
        request: Request<proto::SendMessageRequest>,
    ) -> Result<Response<proto::SendMessageResponse>, Status> {
        let op = Operation::Send;
        let owner_id = self.authenticate(op, request.metadata(), &request.get_ref().token)?;
        let req = request.into_inner();

        let id = self
            .service
            .send_message(owner_id, &req.content, req.r#type, &req.datetime)
            .await
            .map_err(|e| self.statuses.status_for(op, &e))?;

        Ok(Response::new(proto::SendMessageResponse { id }))
    }

    async fn get_message(
        &self,
        request: Request<proto::GetMessageRequest>,
    ) -> Result<Response<proto::GetMessageResponse>, Status> {
        let op = Operation::Get;
        let owner_id = self.authenticate(op, request.metadata(), &request.get_ref().token)?;
        let req = request.into_inner();

        let message = self
            .service
            .get_message(owner_id, req.id)
            .await
            .map_err(|e| self.statuses.status_for(op, &e))?;

        Ok(Response::new(message.into()))
    }

    async fn update_message(
        &self,
        request: Request<proto::UpdateMessageRequest>,
    ) -> Result<Response<proto::UpdateMessageResponse>, Status> {
        let op = Operation::Update;
        let owner_id = self.authenticate(op, request.metadata(), &request.get_ref().token)?;
        let req = request.into_inner();

        let applied = self
            .service
            .update_message(owner_id, req.id, &req.new_content)
            .await
            .map_err(|e| self.statuses.status_for(op, &e))?;

        Ok(Response::new(proto::UpdateMessageResponse { applied }))
    }

    async fn delete_message(
        &self,
        request: Request<proto::DeleteMessageRequest>,
    ) -> Result<Response<proto::DeleteMessageResponse>, Status> {
        let op = Operation::Delete;
        let owner_id = self.authenticate(op, request.metadata(), &request.get_ref().token)?;
        let req = request.into_inner();

        let applied = self
            .service
            .delete_message(owner_id, req.id)
            .await
            .map_err(|e| self.statuses.status_for(op, &e))?;

        Ok(Response::new(proto::DeleteMessageResponse { applied }))
    }

    async fn list_messages(
        &self,
        request: Request<proto::ListMessagesRequest>,
    ) -> Result<Response<proto::ListMessagesResponse>, Status> {
        let op = Operation::List;
        let owner_id = self.authenticate(op, request.metadata(), &request.get_ref().token)?;

        let messages = match self.service.list_messages(owner_id).await {
            Ok(messages) => messages,
            // An owner without messages is a successful, empty listing
            Err(StoreError::NoResults) => Vec::new(),
            Err(e) => return Err(self.statuses.status_for(op, &e)),
        };

        tracing::debug!(owner_id = %owner_id, count = messages.len(), "Listed messages");

        Ok(Response::new(proto::ListMessagesResponse {
            messages: messages.into_iter().map(Into::into).collect(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{TokenClaims, TokenIssuer};
    use crate::service::OwnershipPolicy;
    use crate::store::{MemoryMessageStore, MessageStore};
    use tonic::Code;

    const SECRET: &[u8] = b"grpc-test-secret";

    fn grpc_service(store: Arc<MemoryMessageStore>) -> MessagesGrpcService {
        MessagesGrpcService::new(
            Arc::new(MessageService::new(store, OwnershipPolicy::Enforce)),
            Arc::new(TokenValidator::new(SECRET)),
            StatusMapping::legacy(),
        )
    }

    fn token_for(user_id: i64) -> String {
        TokenIssuer::new(SECRET, 1).issue(user_id, 1, None).unwrap()
    }

    fn expired_token_for(user_id: i64) -> String {
        TokenIssuer::new(SECRET, 1)
            .sign(&TokenClaims {
                user_id,
                app_id: 1,
                email: None,
                exp: chrono::Utc::now().timestamp() - 30,
            })
            .unwrap()
    }

    async fn send(svc: &MessagesGrpcService, token: &str, content: &str) -> Result<i64, Status> {
        svc.send_message(Request::new(proto::SendMessageRequest {
            token: token.to_string(),
            content: content.to_string(),
            r#type: 1,
            datetime: "2024-01-01 10:00".to_string(),
        }))
        .await
        .map(|r| r.into_inner().id)
    }

    async fn get(svc: &MessagesGrpcService, token: &str, id: i64) -> Result<proto::GetMessageResponse, Status> {
        svc.get_message(Request::new(proto::GetMessageRequest {
            token: token.to_string(),
            id,
        }))
        .await
        .map(Response::into_inner)
    }

    async fn list(svc: &MessagesGrpcService, token: &str) -> Result<Vec<proto::GetMessageResponse>, Status> {
        svc.list_messages(Request::new(proto::ListMessagesRequest {
            token: token.to_string(),
        }))
        .await
        .map(|r| r.into_inner().messages)
    }

    #[tokio::test]
    async fn test_owner_nine_scenario() {
        let svc = grpc_service(Arc::new(MemoryMessageStore::new()));
        let token = token_for(9);

        let id = send(&svc, &token, "hi").await.unwrap();
        assert_eq!(id, 1);

        let message = get(&svc, &token, 1).await.unwrap();
        assert_eq!(message.id, 1);
        assert_eq!(message.owner_id, 9);
        assert_eq!(message.content, "hi");
        assert_eq!(message.r#type, 1);
        assert_eq!(message.datetime, "2024-01-01 10:00");

        let listed = list(&svc, &token).await.unwrap();
        assert_eq!(listed, vec![message]);
    }

    #[tokio::test]
    async fn test_bad_tokens_store_nothing() {
        let store = Arc::new(MemoryMessageStore::new());
        let svc = grpc_service(store.clone());

        let forged = TokenIssuer::new(b"wrong-secret", 1).issue(9, 1, None).unwrap();
        for token in [expired_token_for(9), forged, "garbage".to_string(), String::new()] {
            assert_eq!(send(&svc, &token, "hi").await.unwrap_err().code(), Code::Unauthenticated);
            assert_eq!(get(&svc, &token, 1).await.unwrap_err().code(), Code::Unauthenticated);
            assert_eq!(list(&svc, &token).await.unwrap_err().code(), Code::Unauthenticated);

            let update = svc
                .update_message(Request::new(proto::UpdateMessageRequest {
                    token: token.clone(),
                    id: 1,
                    new_content: "x".to_string(),
                }))
                .await;
            assert_eq!(update.unwrap_err().code(), Code::Unauthenticated);

            let delete = svc
                .delete_message(Request::new(proto::DeleteMessageRequest {
                    token: token.clone(),
                    id: 1,
                }))
                .await;
            assert_eq!(delete.unwrap_err().code(), Code::Unauthenticated);
        }

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_owner_comes_from_token() {
        let store = Arc::new(MemoryMessageStore::new());
        let svc = grpc_service(store.clone());

        let id = send(&svc, &token_for(42), "hi").await.unwrap();
        assert_eq!(store.get(id).await.unwrap().owner_id, 42);

        assert!(list(&svc, &token_for(9)).await.unwrap().is_empty());
        assert_eq!(list(&svc, &token_for(42)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_foreign_and_missing_ids_are_permission_denied() {
        let svc = grpc_service(Arc::new(MemoryMessageStore::new()));

        let id = send(&svc, &token_for(9), "hi").await.unwrap();

        let foreign = get(&svc, &token_for(10), id).await.unwrap_err();
        let missing = get(&svc, &token_for(10), id + 100).await.unwrap_err();
        assert_eq!(foreign.code(), Code::PermissionDenied);
        assert_eq!(missing.code(), Code::PermissionDenied);
        assert_eq!(foreign.message(), missing.message());
    }

    #[tokio::test]
    async fn test_update_and_delete_lifecycle() {
        let svc = grpc_service(Arc::new(MemoryMessageStore::new()));
        let token = token_for(9);
        let id = send(&svc, &token, "hi").await.unwrap();

        let applied = svc
            .update_message(Request::new(proto::UpdateMessageRequest {
                token: token.clone(),
                id,
                new_content: "edited".to_string(),
            }))
            .await
            .unwrap()
            .into_inner()
            .applied;
        assert!(applied);
        assert_eq!(get(&svc, &token, id).await.unwrap().content, "edited");

        let delete = || {
            svc.delete_message(Request::new(proto::DeleteMessageRequest {
                token: token.clone(),
                id,
            }))
        };
        assert!(delete().await.unwrap().into_inner().applied);
        assert_eq!(delete().await.unwrap_err().code(), Code::PermissionDenied);
        assert_eq!(get(&svc, &token, id).await.unwrap_err().code(), Code::PermissionDenied);

        let update_missing = svc
            .update_message(Request::new(proto::UpdateMessageRequest {
                token: token.clone(),
                id,
                new_content: "again".to_string(),
            }))
            .await;
        assert_eq!(update_missing.unwrap_err().code(), Code::PermissionDenied);
    }

    #[tokio::test]
    async fn test_token_from_metadata() {
        let svc = grpc_service(Arc::new(MemoryMessageStore::new()));

        let mut request = Request::new(proto::ListMessagesRequest::default());
        let bearer = format!("Bearer {}", token_for(9));
        request
            .metadata_mut()
            .insert(AUTHORIZATION, bearer.parse().unwrap());

        assert!(svc.list_messages(request).await.is_ok());
    }

    #[test]
    fn test_token_field_wins_over_metadata() {
        let mut metadata = MetadataMap::new();
        metadata.insert(AUTHORIZATION, "Bearer from-header".parse().unwrap());

        assert_eq!(request_token(&metadata, "from-field"), "from-field");
        assert_eq!(request_token(&metadata, ""), "from-header");
        assert_eq!(request_token(&MetadataMap::new(), ""), "");
    }
}
