use crate::{
    auth::AuthUser,
    db::{messages::MessageRepository, users::UserRepository},
    handlers::{conversations::joined_conversation, required},
    models::{MarkReadRequest, Message, MessageView, SendMessageRequest, UserSummary},
    state::AppState,
    utils::{db_error, validate_request, ApiError, ApiJson, ApiPath, ApiResult, Envelope},
};
use axum::{extract::State, Extension};
use sqlx::SqliteConnection;

async fn view(conn: &mut SqliteConnection, message: Message) -> ApiResult<MessageView> {
    let sender = UserRepository::find_by_id(conn, message.sender_id).await?;
    Ok(MessageView {
        message,
        sender: sender.as_ref().map(UserSummary::from),
    })
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(request): ApiJson<SendMessageRequest>,
) -> ApiResult<Envelope<Vec<MessageView>>> {
    validate_request(&request, "Unable to send message due to validation error(s)")?;
    let conversation_id = required(request.conversation_id, "conversationId")?;
    let content = required(request.content, "content")?;

    let mut tx = state.db.begin().await?;
    joined_conversation(&mut tx, conversation_id, &auth_user).await?;
    let id = MessageRepository::insert(&mut tx, conversation_id, auth_user.user_id, &content)
        .await
        .map_err(db_error("Unable to send message"))?;
    let message = MessageRepository::find_by_id(&mut tx, id)
        .await?
        .ok_or_else(|| ApiError::internal_error("Unable to send message"))?;
    let sent = view(&mut tx, message).await?;
    tx.commit().await.map_err(db_error("Unable to send message"))?;

    Ok(Envelope::created("Message sent successfully", vec![sent]))
}

/// Messages of a conversation, oldest first
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(conversation_id): ApiPath<i64>,
) -> ApiResult<Envelope<Vec<MessageView>>> {
    let mut conn = state.db.acquire().await?;
    joined_conversation(&mut conn, conversation_id, &auth_user).await?;
    let messages = MessageRepository::list_for_conversation(&mut conn, conversation_id)
        .await
        .map_err(db_error("Unable to fetch messages"))?;

    let mut views = Vec::with_capacity(messages.len());
    for message in messages {
        views.push(view(&mut conn, message).await?);
    }

    Ok(Envelope::ok(format!("{} messages found", views.len()), views))
}

/// Record that the caller has read a message
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(request): ApiJson<MarkReadRequest>,
) -> ApiResult<Envelope<Vec<Message>>> {
    validate_request(&request, "Unable to mark message as read due to validation error(s)")?;
    let message_id = required(request.message_id, "messageId")?;

    let mut tx = state.db.begin().await?;
    let mut message = MessageRepository::find_by_id(&mut tx, message_id)
        .await?
        .ok_or_else(|| ApiError::not_found_error(format!("Message {message_id} not found")))?;
    joined_conversation(&mut tx, message.conversation_id, &auth_user).await?;

    if !message.read_by.contains(&auth_user.user_id) {
        message.read_by.push(auth_user.user_id);
        MessageRepository::set_read_by(&mut tx, message_id, &message.read_by)
            .await
            .map_err(db_error("Unable to update message"))?;
    }
    tx.commit().await.map_err(db_error("Unable to update message"))?;

    Ok(Envelope::ok("Message marked as read", vec![message]))
}
