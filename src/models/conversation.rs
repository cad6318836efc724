use crate::{auth::Role, models::UserSummary};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ConversationKind {
    Dm,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ParticipantRole {
    Tenant,
    Landlord,
}

impl From<Role> for ParticipantRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Landlord => ParticipantRole::Landlord,
            Role::Tenant | Role::Admin => ParticipantRole::Tenant,
        }
    }
}

/// Database conversation record, always scoped to a group
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: i64,
    pub group_id: i64,
    #[serde(rename = "type")]
    pub kind: ConversationKind,
    pub name: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database conversation membership record
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: i64,
    pub conversation_id: i64,
    pub user_id: i64,
    pub role: ParticipantRole,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Conversation with its members
#[derive(Debug, Serialize)]
pub struct ConversationView {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub participants: Vec<Participant>,
}

/// Database message record
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub content: String,
    /// Ids of users who have read the message
    pub read_by: Json<Vec<i64>>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Message with its sender resolved
#[derive(Debug, Serialize)]
pub struct MessageView {
    #[serde(flatten)]
    pub message: Message,
    pub sender: Option<UserSummary>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateDmRequest {
    #[validate(required(message = "userId is required"))]
    pub user_id: Option<i64>,
    #[validate(required(message = "groupId is required"))]
    pub group_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateGroupChatRequest {
    #[validate(
        required(message = "name is required"),
        length(min = 1, message = "name is required")
    )]
    pub name: Option<String>,
    #[validate(required(message = "groupId is required"))]
    pub group_id: Option<i64>,
    pub participant_ids: Vec<i64>,
}

/// Add or remove one member of a conversation
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticipantRequest {
    #[validate(required(message = "conversationId is required"))]
    pub conversation_id: Option<i64>,
    #[validate(required(message = "userId is required"))]
    pub user_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SendMessageRequest {
    #[validate(required(message = "conversationId is required"))]
    pub conversation_id: Option<i64>,
    #[validate(
        required(message = "content is required"),
        length(min = 1, message = "content is required")
    )]
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkReadRequest {
    #[validate(required(message = "messageId is required"))]
    pub message_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_kind_serializes_as_type() {
        let stamp = chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let conversation = Conversation {
            id: 1,
            group_id: 2,
            kind: ConversationKind::Dm,
            name: None,
            created_at: stamp,
            updated_at: stamp,
        };
        let json = serde_json::to_value(&conversation).unwrap();
        assert_eq!(json["type"], "dm");
        assert_eq!(json["groupId"], 2);
    }

    #[test]
    fn admins_join_conversations_as_tenants() {
        assert_eq!(ParticipantRole::from(Role::Landlord), ParticipantRole::Landlord);
        assert_eq!(ParticipantRole::from(Role::Admin), ParticipantRole::Tenant);
    }
}
