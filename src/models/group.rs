use crate::models::{PropertyCard, UserContact};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Database group record: one landlord, one property, many tenants
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub landlord_id: i64,
    pub property_id: Option<i64>,
    #[serde(skip)]
    pub created_at: NaiveDateTime,
    #[serde(skip)]
    pub updated_at: NaiveDateTime,
}

/// Database tenant membership record
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupParticipant {
    pub id: i64,
    pub group_id: i64,
    pub tenant_id: i64,
    pub joined_at: NaiveDateTime,
}

/// Group as its landlord sees it
#[derive(Debug, Serialize)]
pub struct LandlordGroupView {
    pub id: i64,
    pub name: String,
    pub property: Option<PropertyCard>,
    pub participants: Vec<UserContact>,
}

/// Group as a tenant sees it
#[derive(Debug, Serialize)]
pub struct TenantGroupView {
    pub id: i64,
    pub name: String,
    pub property: Option<PropertyCard>,
    pub landlord: Option<UserContact>,
}

/// Group creation request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateGroupRequest {
    #[validate(
        required(message = "Name is required"),
        length(min = 1, message = "Name is required")
    )]
    pub name: Option<String>,
    #[validate(required(message = "propertyId is required"))]
    pub property_id: Option<i64>,
    #[validate(length(min = 1, message = "At least one tenantId is required"))]
    pub tenant_ids: Vec<i64>,
}

/// Group rename request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateGroupRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
}
