use actix_web::{get, post, web};

use crate::{
    api::{error, success},
    modules::chat::{
        model::{
            AuditLogBody, AuditLogResponse, ConversationQuery, ConversationResponse,
            MessageDetailResponse, NewAuditLog, OutgoingMessage, SendMessageBody,
            SendMessageResponse, TypingBody,
        },
        service::ChatService,
    },
    utils::{ValidatedJson, ValidatedQuery},
};

#[post("/send")]
pub async fn send_message(
    chat_service: web::Data<ChatService>,
    body: ValidatedJson<SendMessageBody>,
) -> Result<success::Success<SendMessageResponse>, error::Error> {
    let outgoing = OutgoingMessage::try_from(body.0)?;
    let message = chat_service.send_message(outgoing).await?;
    Ok(success::Success::ok(Some(SendMessageResponse { message })))
}

#[post("/typing")]
pub async fn notify_typing(
    chat_service: web::Data<ChatService>,
    body: ValidatedJson<TypingBody>,
) -> Result<success::Success<()>, error::Error> {
    let TypingBody { sender_id, recipient_id, status } = body.0;
    chat_service.notify_typing(sender_id, recipient_id, status)?;
    Ok(success::Success::ok(None))
}

#[post("/log")]
pub async fn append_log(
    chat_service: web::Data<ChatService>,
    body: ValidatedJson<AuditLogBody>,
) -> Result<success::Success<AuditLogResponse>, error::Error> {
    let entry = NewAuditLog::try_from(body.0)?;
    let insert_id = chat_service.append_log(entry).await?;
    Ok(success::Success::ok(Some(AuditLogResponse { insert_id })))
}

#[get("/messages/{id}")]
pub async fn get_message(
    chat_service: web::Data<ChatService>,
    id: web::Path<i64>,
) -> Result<success::Success<MessageDetailResponse>, error::Error> {
    let detail = chat_service.get_message(id.into_inner()).await?;
    Ok(success::Success::ok(Some(detail)))
}

#[get("/messages")]
pub async fn get_conversation(
    chat_service: web::Data<ChatService>,
    query: ValidatedQuery<ConversationQuery>,
) -> Result<success::Success<ConversationResponse>, error::Error> {
    let page = chat_service.get_conversation(&query.0).await?;
    Ok(success::Success::ok(Some(page)))
}
