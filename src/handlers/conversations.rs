use crate::{
    auth::AuthUser,
    db::conversations::ConversationRepository,
    handlers::{existing_group, existing_user, non_empty, required},
    models::{
        Conversation, ConversationKind, ConversationView, CreateDmRequest, CreateGroupChatRequest,
        Participant, ParticipantRequest, ParticipantRole,
    },
    state::AppState,
    utils::{db_error, validate_request, ApiError, ApiJson, ApiPath, ApiResult, Empty, Envelope},
};
use axum::{extract::State, Extension};
use sqlx::SqliteConnection;

async fn existing_conversation(conn: &mut SqliteConnection, id: i64) -> ApiResult<Conversation> {
    ConversationRepository::find_by_id(conn, id)
        .await?
        .ok_or_else(|| ApiError::not_found_error(format!("Conversation {id} not found")))
}

/// Conversation `id` if the caller takes part in it; admins reach every conversation
pub(crate) async fn joined_conversation(
    conn: &mut SqliteConnection,
    id: i64,
    auth_user: &AuthUser,
) -> ApiResult<Conversation> {
    let conversation = existing_conversation(conn, id).await?;
    if !auth_user.is_admin()
        && ConversationRepository::find_participant(conn, id, auth_user.user_id)
            .await?
            .is_none()
    {
        return Err(ApiError::authorization_error("Access denied")
            .with_error("You are not a participant in this conversation"));
    }
    Ok(conversation)
}

async fn view(conn: &mut SqliteConnection, conversation: Conversation) -> ApiResult<ConversationView> {
    let participants = ConversationRepository::participants(conn, conversation.id).await?;
    Ok(ConversationView {
        conversation,
        participants,
    })
}

/// Conversations of a group the caller takes part in
pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(group_id): ApiPath<i64>,
) -> ApiResult<Envelope<Vec<Conversation>>> {
    let mut conn = state.db.acquire().await?;
    let conversations = ConversationRepository::list_for_member(&mut conn, group_id, auth_user.user_id)
        .await
        .map_err(db_error("Unable to list conversations"))?;
    let conversations = non_empty(conversations, "No conversations found for this group")?;

    Ok(Envelope::ok(
        format!("{} conversation(s) found", conversations.len()),
        conversations,
    ))
}

pub async fn get_conversation(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Envelope<Vec<ConversationView>>> {
    let mut conn = state.db.acquire().await?;
    let conversation = joined_conversation(&mut conn, id, &auth_user).await?;

    Ok(Envelope::ok("Conversation found", vec![view(&mut conn, conversation).await?]))
}

/// Open a direct conversation between the caller and another group member
pub async fn create_dm(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreateDmRequest>,
) -> ApiResult<Envelope<Vec<ConversationView>>> {
    validate_request(&request, "Unable to create DM due to validation error(s)")?;
    let other_id = required(request.user_id, "userId")?;
    let group_id = required(request.group_id, "groupId")?;

    if other_id == auth_user.user_id {
        return Err(ApiError::validation_error("Cannot create DM with yourself"));
    }

    let mut tx = state.db.begin().await?;
    existing_group(&mut tx, group_id).await?;
    let other = existing_user(&mut tx, other_id).await?;

    if ConversationRepository::find_dm(&mut tx, group_id, auth_user.user_id, other_id)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict_error("DM conversation already exists"));
    }

    let conversation_id = ConversationRepository::insert(
        &mut tx,
        group_id,
        ConversationKind::Dm,
        &format!("DM-{}-{}", auth_user.user_id, other_id),
    )
    .await
    .map_err(db_error("Unable to create DM"))?;
    ConversationRepository::add_participant(&mut tx, conversation_id, auth_user.user_id, auth_user.role.into())
        .await
        .map_err(db_error("Unable to create DM"))?;
    ConversationRepository::add_participant(&mut tx, conversation_id, other_id, other.role.into())
        .await
        .map_err(db_error("Unable to create DM"))?;

    let conversation = existing_conversation(&mut tx, conversation_id).await?;
    let created = view(&mut tx, conversation).await?;
    tx.commit().await.map_err(db_error("Unable to create DM"))?;

    Ok(Envelope::created("DM conversation created", vec![created]))
}

/// Open a named group chat; the caller is always a member
pub async fn create_group_chat(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreateGroupChatRequest>,
) -> ApiResult<Envelope<Vec<ConversationView>>> {
    validate_request(&request, "Unable to create group conversation due to validation error(s)")?;
    let name = required(request.name, "name")?;
    let group_id = required(request.group_id, "groupId")?;

    let mut member_ids = request.participant_ids;
    member_ids.retain(|id| *id != auth_user.user_id);
    member_ids.sort_unstable();
    member_ids.dedup();

    let mut tx = state.db.begin().await?;
    existing_group(&mut tx, group_id).await?;

    let mut members = Vec::with_capacity(member_ids.len());
    for id in member_ids {
        members.push(existing_user(&mut tx, id).await?);
    }

    let conversation_id = ConversationRepository::insert(&mut tx, group_id, ConversationKind::Group, &name)
        .await
        .map_err(db_error("Unable to create group conversation"))?;
    ConversationRepository::add_participant(&mut tx, conversation_id, auth_user.user_id, auth_user.role.into())
        .await
        .map_err(db_error("Unable to create group conversation"))?;
    for member in &members {
        ConversationRepository::add_participant(&mut tx, conversation_id, member.id, member.role.into())
            .await
            .map_err(db_error("Unable to create group conversation"))?;
    }

    let conversation = existing_conversation(&mut tx, conversation_id).await?;
    let created = view(&mut tx, conversation).await?;
    tx.commit().await.map_err(db_error("Unable to create group conversation"))?;

    Ok(Envelope::created("Group conversation created", vec![created]))
}

pub async fn add_participant(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ParticipantRequest>,
) -> ApiResult<Envelope<Vec<Participant>>> {
    validate_request(&request, "Unable to add participant due to validation error(s)")?;
    let conversation_id = required(request.conversation_id, "conversationId")?;
    let user_id = required(request.user_id, "userId")?;

    let mut tx = state.db.begin().await?;
    existing_conversation(&mut tx, conversation_id).await?;
    let user = existing_user(&mut tx, user_id).await?;

    if ConversationRepository::find_participant(&mut tx, conversation_id, user_id)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict_error("User is already a participant"));
    }

    let role: ParticipantRole = user.role.into();
    ConversationRepository::add_participant(&mut tx, conversation_id, user_id, role)
        .await
        .map_err(db_error("Unable to add participant"))?;
    let participant = ConversationRepository::find_participant(&mut tx, conversation_id, user_id)
        .await?
        .ok_or_else(|| ApiError::internal_error("Unable to add participant"))?;
    tx.commit().await.map_err(db_error("Unable to add participant"))?;

    Ok(Envelope::ok("Participant added successfully", vec![participant]))
}

pub async fn remove_participant(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ParticipantRequest>,
) -> ApiResult<Empty> {
    validate_request(&request, "Unable to remove participant due to validation error(s)")?;
    let conversation_id = required(request.conversation_id, "conversationId")?;
    let user_id = required(request.user_id, "userId")?;

    let mut tx = state.db.begin().await?;
    let participant = ConversationRepository::find_participant(&mut tx, conversation_id, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found_error("Participant not found"))?;
    ConversationRepository::remove_participant(&mut tx, participant.id)
        .await
        .map_err(db_error("Unable to remove participant"))?;
    tx.commit().await.map_err(db_error("Unable to remove participant"))?;

    Ok(Empty::done("Participant removed successfully"))
}
