use axum::{Extension, Router};
use modkit::api::{Missing, OpenApiRegistry, OperationBuilder};
use std::sync::Arc;

use modkit::api::response::Ack;

use crate::api::rest::dto::{
    ConversationDto, DeliveredDto, LiveEventDto, MessageDto, SendMessageReq, TypingReq,
};
use crate::api::rest::handlers;
use crate::api::rest::sse_adapter::SseLiveChannels;
use crate::domain::service::Service;

pub fn register_routes(
    mut router: Router,
    openapi: &dyn OpenApiRegistry,
    service: Arc<Service>,
    live: Arc<SseLiveChannels>,
) -> anyhow::Result<Router> {
    router = OperationBuilder::<Missing, Missing, ()>::post("/api/messages")
        .operation_id("messages.send")
        .summary("Send a direct message")
        .tag("messages")
        .bearer_auth()
        .json_request::<SendMessageReq>(openapi, "Recipient and text")
        .handler(handlers::send_message)
        .json_response_with_schema::<MessageDto>(openapi, 201, "Stored message")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/messages/conversations")
        .operation_id("messages.conversations")
        .summary("Latest message with each partner")
        .tag("messages")
        .bearer_auth()
        .handler(handlers::conversations)
        .json_list_response::<ConversationDto>(openapi, 200, "Conversations, most recent first")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/messages/stream")
        .operation_id("messages.stream")
        .summary("Live channel (SSE)")
        .description("Emits new-message, user-typing and budget-warning events")
        .tag("messages")
        .bearer_auth()
        .query_param("token", false, "Bearer token for clients that cannot set headers")
        .handler(handlers::stream)
        .sse_json::<LiveEventDto>(openapi, "Server-Sent Events stream")
        .problem_response(openapi, 401, "Unauthorized")
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::post("/api/messages/typing")
        .operation_id("messages.typing")
        .summary("Typing indicator")
        .tag("messages")
        .bearer_auth()
        .json_request::<TypingReq>(openapi, "Recipient and whether the caller is typing")
        .handler(handlers::typing)
        .json_response_with_schema::<DeliveredDto>(openapi, 200, "Number of streams notified")
        .problem_response(openapi, 401, "Unauthorized")
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/messages/{id}")
        .operation_id("messages.thread")
        .summary("Thread with another user")
        .description("Oldest first. Marks the partner's messages as read.")
        .tag("messages")
        .bearer_auth()
        .path_param("id", "Partner user UUID")
        .handler(handlers::thread)
        .json_list_response::<MessageDto>(openapi, 200, "Messages")
        .standard_errors(openapi)
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::delete("/api/messages/{id}")
        .operation_id("messages.delete")
        .summary("Delete a sent message")
        .tag("messages")
        .bearer_auth()
        .path_param("id", "Message UUID")
        .handler(handlers::delete_message)
        .json_response_with_schema::<Ack>(openapi, 200, "Deleted")
        .problem_response(openapi, 403, "Only the sender may delete")
        .standard_errors(openapi)
        .register(router, openapi);

    router = router.layer(Extension(service)).layer(Extension(live));
    Ok(router)
}
