// ============================================================================
// gRPC Messages service
// ============================================================================
//
// Wraps the service glue generated by build.rs together with the hand-written
// prost messages in `proto`.
// ============================================================================

pub mod proto;
pub mod server;
pub mod status;

mod generated {
    include!(concat!(env!("OUT_DIR"), "/msgstore.v1.Messages.rs"));
}

// Re-export with clear naming to avoid conflicts
pub use generated::messages_client::MessagesClient as MessagesGrpcClient;
pub use generated::messages_server::{Messages, MessagesServer};
pub use server::MessagesGrpcService;
pub use status::{Operation, StatusMapping};

use crate::store::Message;

impl From<Message> for proto::GetMessageResponse {
    fn from(message: Message) -> Self {
        proto::GetMessageResponse {
            id: message.id,
            content: message.content,
            r#type: message.message_type,
            owner_id: message.owner_id,
            datetime: message.datetime,
        }
    }
}
