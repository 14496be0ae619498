// Build script to generate the gRPC service stubs for the Messages service.
//
// The request/response messages are plain prost structs in src/grpc/proto.rs,
// so only the service glue is generated here and no protoc is needed.

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let method = |name: &str, route: &str, input: &str, output: &str| {
        tonic_build::manual::Method::builder()
            .name(name)
            .route_name(route)
            .input_type(format!("crate::grpc::proto::{}", input))
            .output_type(format!("crate::grpc::proto::{}", output))
            .codec_path("tonic_prost::ProstCodec")
            .build()
    };

    let messages = tonic_build::manual::Service::builder()
        .name("Messages")
        .package("msgstore.v1")
        .method(method(
            "send_message",
            "SendMessage",
            "SendMessageRequest",
            "SendMessageResponse",
        ))
        .method(method(
            "get_message",
            "GetMessage",
            "GetMessageRequest",
            "GetMessageResponse",
        ))
        .method(method(
            "update_message",
            "UpdateMessage",
            "UpdateMessageRequest",
            "UpdateMessageResponse",
        ))
        .method(method(
            "delete_message",
            "DeleteMessage",
            "DeleteMessageRequest",
            "DeleteMessageResponse",
        ))
        .method(method(
            "list_messages",
            "ListMessages",
            "ListMessagesRequest",
            "ListMessagesResponse",
        ))
        .build();

    tonic_build::manual::Builder::new().compile(&[messages]);
}
