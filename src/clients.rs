//! Client for the Messages gRPC service, used by the HTTP adapter.

use std::future::Future;
use std::time::Duration;

use msgstore_config::CrudClientConfig;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Response, Status};

use crate::grpc::proto;
use crate::grpc::MessagesGrpcClient;

const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// A configured gRPC client for the Messages service.
///
/// Transient transport failures are retried here; the server never retries.
#[derive(Clone)]
pub struct MessagesClient {
    inner: MessagesGrpcClient<Channel>,
    retries: u32,
}

impl MessagesClient {
    /// Creates a client for the configured endpoint. The connection is
    /// established lazily on the first call.
    pub fn new(config: &CrudClientConfig) -> Result<Self, tonic::transport::Error> {
        let channel = Endpoint::from_shared(config.addr.clone())?
            .connect_timeout(config.timeout())
            .timeout(config.timeout())
            .connect_lazy();

        Ok(Self {
            inner: MessagesGrpcClient::new(channel),
            retries: config.retries,
        })
    }

    pub async fn send_message(
        &self,
        token: &str,
        content: &str,
        message_type: i32,
        datetime: &str,
    ) -> Result<i64, Status> {
        let request = proto::SendMessageRequest {
            token: token.to_string(),
            content: content.to_string(),
            r#type: message_type,
            datetime: datetime.to_string(),
        };
        let response = self
            .call("SendMessage", |mut client| {
                let request = request.clone();
                async move { client.send_message(request).await }
            })
            .await?;
        Ok(response.id)
    }

    pub async fn get_message(
        &self,
        token: &str,
        id: i64,
    ) -> Result<proto::GetMessageResponse, Status> {
        let request = proto::GetMessageRequest {
            token: token.to_string(),
            id,
        };
        self.call("GetMessage", |mut client| {
            let request = request.clone();
            async move { client.get_message(request).await }
        })
        .await
    }

    pub async fn update_message(
        &self,
        token: &str,
        id: i64,
        new_content: &str,
    ) -> Result<bool, Status> {
        let request = proto::UpdateMessageRequest {
            token: token.to_string(),
            id,
            new_content: new_content.to_string(),
        };
        let response = self
            .call("UpdateMessage", |mut client| {
                let request = request.clone();
                async move { client.update_message(request).await }
            })
            .await?;
        Ok(response.applied)
    }

    pub async fn delete_message(&self, token: &str, id: i64) -> Result<bool, Status> {
        let request = proto::DeleteMessageRequest {
            token: token.to_string(),
            id,
        };
        let response = self
            .call("DeleteMessage", |mut client| {
                let request = request.clone();
                async move { client.delete_message(request).await }
            })
            .await?;
        Ok(response.applied)
    }

    pub async fn list_messages(
        &self,
        token: &str,
    ) -> Result<Vec<proto::GetMessageResponse>, Status> {
        let request = proto::ListMessagesRequest {
            token: token.to_string(),
        };
        let response = self
            .call("ListMessages", |mut client| {
                let request = request.clone();
                async move { client.list_messages(request).await }
            })
            .await?;
        Ok(response.messages)
    }

    async fn call<T, F, Fut>(&self, method: &'static str, mut rpc: F) -> Result<T, Status>
    where
        F: FnMut(MessagesGrpcClient<Channel>) -> Fut,
        Fut: Future<Output = Result<Response<T>, Status>>,
    {
        let mut attempt = 0;
        loop {
            match rpc(self.inner.clone()).await {
                Ok(response) => return Ok(response.into_inner()),
                Err(status) if attempt < self.retries && is_transient(&status) => {
                    attempt += 1;
                    tracing::warn!(
                        method = method,
                        attempt = attempt,
                        code = ?status.code(),
                        "Retrying Messages call"
                    );
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                Err(status) => return Err(status),
            }
        }
    }
}

/// Failures worth another attempt; domain outcomes are never retried
fn is_transient(status: &Status) -> bool {
    matches!(
        status.code(),
        Code::Unavailable | Code::DeadlineExceeded | Code::Unknown
    )
}
