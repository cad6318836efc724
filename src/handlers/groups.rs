use crate::{
    auth::AuthUser,
    db::{
        conversations::ConversationRepository, groups::GroupRepository,
        properties::PropertyRepository, users::UserRepository,
    },
    handlers::{existing_group, non_empty, required},
    models::{
        ConversationKind, CreateGroupRequest, Group, LandlordGroupView, ParticipantRole,
        PropertyCard, PropertyDetails, TenantGroupView, UpdateGroupRequest, UserContact,
    },
    state::AppState,
    utils::{db_error, validate_request, ApiError, ApiJson, ApiPath, ApiResult, Empty, Envelope},
};
use axum::{extract::State, Extension};
use sqlx::SqliteConnection;

/// Group `id` if the caller is its landlord; admins reach every group
async fn owned_group(conn: &mut SqliteConnection, id: i64, auth_user: &AuthUser) -> ApiResult<Group> {
    let group = if auth_user.is_admin() {
        GroupRepository::find_by_id(conn, id).await?
    } else {
        GroupRepository::find_owned(conn, id, auth_user.user_id).await?
    };
    group.ok_or_else(|| ApiError::not_found_error("Group not found or does not belong to you"))
}

/// Group `id` if the caller is its landlord or one of its tenants
pub(crate) async fn member_group(conn: &mut SqliteConnection, id: i64, auth_user: &AuthUser) -> ApiResult<Group> {
    let group = existing_group(&mut *conn, id).await?;

    if !auth_user.is_admin() && !GroupRepository::is_member(conn, id, auth_user.user_id).await? {
        return Err(ApiError::authorization_error("Access denied").with_error("You do not have access to this group"));
    }
    Ok(group)
}

async fn property_card(conn: &mut SqliteConnection, group: &Group) -> ApiResult<Option<PropertyCard>> {
    let Some(property_id) = group.property_id else {
        return Ok(None);
    };
    Ok(PropertyRepository::find_by_id(conn, property_id).await?.map(PropertyCard::from))
}

async fn landlord_view(conn: &mut SqliteConnection, group: Group) -> ApiResult<LandlordGroupView> {
    let property = property_card(&mut *conn, &group).await?;
    let participants = GroupRepository::participants(conn, group.id).await?;

    Ok(LandlordGroupView {
        id: group.id,
        name: group.name,
        property,
        participants: participants.iter().map(UserContact::from).collect(),
    })
}

/// Groups owned by the calling landlord
pub async fn landlord_groups(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Envelope<Vec<LandlordGroupView>>> {
    let mut conn = state.db.acquire().await?;
    let groups = GroupRepository::list_by_landlord(&mut conn, auth_user.user_id).await?;
    let groups = non_empty(groups, "No groups found")?;

    let mut views = Vec::with_capacity(groups.len());
    for group in groups {
        views.push(landlord_view(&mut conn, group).await?);
    }

    Ok(Envelope::ok(format!("{} group(s) found", views.len()), views))
}

/// Groups the calling tenant belongs to
pub async fn tenant_groups(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Envelope<Vec<TenantGroupView>>> {
    let mut conn = state.db.acquire().await?;
    let groups = GroupRepository::list_for_tenant(&mut conn, auth_user.user_id).await?;
    let groups = non_empty(groups, "No groups found")?;

    let mut views = Vec::with_capacity(groups.len());
    for group in groups {
        let property = property_card(&mut conn, &group).await?;
        let landlord = UserRepository::find_by_id(&mut conn, group.landlord_id).await?;
        views.push(TenantGroupView {
            id: group.id,
            name: group.name,
            property,
            landlord: landlord.as_ref().map(UserContact::from),
        });
    }

    Ok(Envelope::ok(format!("{} group(s) found", views.len()), views))
}

pub async fn get_group(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Envelope<Vec<LandlordGroupView>>> {
    let mut conn = state.db.acquire().await?;
    let group = owned_group(&mut conn, id, &auth_user).await?;

    Ok(Envelope::ok("Group found", vec![landlord_view(&mut conn, group).await?]))
}

pub async fn group_landlord(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Envelope<Vec<UserContact>>> {
    let mut conn = state.db.acquire().await?;
    let group = member_group(&mut conn, id, &auth_user).await?;
    let landlord = UserRepository::find_by_id(&mut conn, group.landlord_id)
        .await?
        .ok_or_else(|| ApiError::not_found_error("Landlord not found"))?;

    Ok(Envelope::ok("Landlord found", vec![UserContact::from(&landlord)]))
}

pub async fn group_property(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Envelope<Vec<PropertyDetails>>> {
    let mut conn = state.db.acquire().await?;
    let group = member_group(&mut conn, id, &auth_user).await?;
    let property = match group.property_id {
        Some(property_id) => PropertyRepository::find_by_id(&mut conn, property_id).await?,
        None => None,
    }
    .ok_or_else(|| ApiError::not_found_error("Property not found"))?;

    Ok(Envelope::ok("Property found", vec![PropertyDetails::from(property)]))
}

pub async fn group_participants(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Envelope<Vec<UserContact>>> {
    let mut conn = state.db.acquire().await?;
    member_group(&mut conn, id, &auth_user).await?;
    let participants = GroupRepository::participants(&mut conn, id).await?;
    let participants = non_empty(participants, "No participants found")?;

    Ok(Envelope::ok(
        format!("{} participant(s) found", participants.len()),
        participants.iter().map(UserContact::from).collect(),
    ))
}

/// Create a group for one of the landlord's properties, with its group chat
pub async fn create_group(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreateGroupRequest>,
) -> ApiResult<Envelope<Vec<LandlordGroupView>>> {
    validate_request(&request, "Unable to create group due to validation error(s)")?;
    let name = required(request.name, "Name")?;
    let property_id = required(request.property_id, "propertyId")?;

    let mut tenant_ids = request.tenant_ids;
    tenant_ids.sort_unstable();
    tenant_ids.dedup();

    let mut tx = state.db.begin().await?;

    let property = PropertyRepository::find_by_id(&mut tx, property_id).await?;
    if !property.is_some_and(|p| auth_user.is_admin() || p.landlord_id == auth_user.user_id) {
        return Err(ApiError::not_found_error("Property not found or does not belong to you"));
    }

    let mut missing = Vec::new();
    for tenant_id in &tenant_ids {
        if !UserRepository::exists(&mut tx, *tenant_id).await? {
            missing.push(format!("Tenant {tenant_id} not found"));
        }
    }
    if !missing.is_empty() {
        return Err(ApiError::not_found_error("One or more tenants do not exist").with_errors(missing));
    }

    let group_id = GroupRepository::insert(&mut tx, &name, auth_user.user_id, property_id)
        .await
        .map_err(db_error("Unable to create group"))?;
    for tenant_id in &tenant_ids {
        GroupRepository::add_participant(&mut tx, group_id, *tenant_id)
            .await
            .map_err(db_error("Unable to add tenant to group"))?;
    }

    let conversation_id = ConversationRepository::insert(
        &mut tx,
        group_id,
        ConversationKind::Group,
        &format!("{name} - Group Chat"),
    )
    .await
    .map_err(db_error("Unable to create group conversation"))?;
    ConversationRepository::add_participant(&mut tx, conversation_id, auth_user.user_id, ParticipantRole::Landlord)
        .await
        .map_err(db_error("Unable to create group conversation"))?;
    for tenant_id in tenant_ids.iter().filter(|id| **id != auth_user.user_id) {
        ConversationRepository::add_participant(&mut tx, conversation_id, *tenant_id, ParticipantRole::Tenant)
            .await
            .map_err(db_error("Unable to create group conversation"))?;
    }

    let group = GroupRepository::find_by_id(&mut tx, group_id)
        .await?
        .ok_or_else(|| ApiError::internal_error("Unable to create group"))?;
    let view = landlord_view(&mut tx, group).await?;
    tx.commit().await.map_err(db_error("Unable to create group"))?;

    tracing::info!("Landlord {} created group {}", auth_user.user_id, group_id);
    Ok(Envelope::created("Group created successfully", vec![view]))
}

pub async fn update_group(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateGroupRequest>,
) -> ApiResult<Envelope<Vec<Group>>> {
    validate_request(&request, "Unable to update group due to validation error(s)")?;

    let mut tx = state.db.begin().await?;
    owned_group(&mut tx, id, &auth_user).await?;
    if let Some(name) = &request.name {
        GroupRepository::rename(&mut tx, id, name)
            .await
            .map_err(db_error("Unable to update group"))?;
    }
    let group = GroupRepository::find_by_id(&mut tx, id)
        .await?
        .ok_or_else(|| ApiError::not_found_error("Group not found or does not belong to you"))?;
    tx.commit().await.map_err(db_error("Unable to update group"))?;

    Ok(Envelope::ok("Group updated successfully", vec![group]))
}

/// Remove a group along with its memberships and conversations
pub async fn delete_group(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Empty> {
    let mut tx = state.db.begin().await?;
    owned_group(&mut tx, id, &auth_user).await?;
    GroupRepository::delete(&mut tx, id)
        .await
        .map_err(db_error("Unable to delete group"))?;
    tx.commit().await.map_err(db_error("Unable to delete group"))?;

    Ok(Empty::done("Group deleted successfully"))
}
