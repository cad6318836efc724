use crate::{auth::Role, utils::validation::password_policy};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Database user record
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub verified: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// User without credentials or timestamps
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub verified: bool,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            verified: user.verified,
        }
    }
}

/// Contact card embedded in other resources
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContact {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
}

impl From<&User> for UserContact {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
        }
    }
}

/// Fields written when an account is created
#[derive(Debug)]
pub struct NewUser<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
}

fn registrable_role(role: &str) -> Result<(), ValidationError> {
    match role {
        "tenant" | "landlord" => Ok(()),
        _ => {
            let mut err = ValidationError::new("role");
            err.message = Some("Role must be one of the following: tenant, landlord".into());
            Err(err)
        }
    }
}

/// Registration request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUserRequest {
    #[validate(length(min = 2, message = "First name must be at least 2 characters long"))]
    pub first_name: String,
    #[validate(length(min = 2, message = "Last name must be at least 2 characters long"))]
    pub last_name: String,
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Username must be at least 6 characters long"))]
    pub username: String,
    #[validate(custom(function = "password_policy"))]
    pub password: String,
    #[validate(custom(function = "registrable_role"))]
    pub role: String,
}

impl CreateUserRequest {
    /// Strips surrounding whitespace from everything but the password
    pub fn trimmed(self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            username: self.username.trim().to_string(),
            password: self.password,
            role: self.role.trim().to_string(),
        }
    }

    pub fn role(&self) -> Role {
        if self.role == "landlord" {
            Role::Landlord
        } else {
            Role::Tenant
        }
    }
}

/// Login request; either username or email identifies the account
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn missing_fields(&self) -> Vec<String> {
        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        let mut errors = Vec::new();
        if !present(&self.username) && !present(&self.email) {
            errors.push("Missing username or email".to_string());
        }
        if !present(&self.password) {
            errors.push("Missing password".to_string());
        }
        errors
    }
}

/// Login response payload
#[derive(Debug, Serialize)]
pub struct LoginToken {
    pub token: String,
}

/// Equality filters for listing users; email and password are never filterable
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserFilter {
    pub id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub role: Option<Role>,
    pub verified: Option<bool>,
}

/// Query string of the verification link
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::collect_messages;

    #[test]
    fn registration_reports_every_problem() {
        let request = CreateUserRequest {
            first_name: "A".into(),
            last_name: "B".into(),
            email: "not-an-email".into(),
            username: "abc".into(),
            password: "weak".into(),
            role: "admin".into(),
        };
        let errors = collect_messages(&request.validate().unwrap_err());
        assert_eq!(errors.len(), 6);
        assert!(errors.contains(&"Role must be one of the following: tenant, landlord".to_string()));
    }

    #[test]
    fn trimmed_keeps_password_verbatim() {
        let request = CreateUserRequest {
            first_name: "  Jane ".into(),
            password: " Pa ss ".into(),
            ..Default::default()
        }
        .trimmed();
        assert_eq!(request.first_name, "Jane");
        assert_eq!(request.password, " Pa ss ");
    }

    #[test]
    fn login_lists_missing_fields() {
        assert_eq!(LoginRequest::default().missing_fields().len(), 2);
        let request = LoginRequest {
            email: Some("a@b.co".into()),
            ..Default::default()
        };
        assert_eq!(request.missing_fields(), vec!["Missing password"]);
    }

    fn stamp() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn summary_hides_password_and_timestamps() {
        let user = User {
            id: 1,
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            username: "janedoe".into(),
            email: "jane@example.com".into(),
            password: "hash".into(),
            role: Role::Tenant,
            verified: true,
            created_at: stamp(),
            updated_at: stamp(),
        };
        let full = serde_json::to_value(&user).unwrap();
        assert!(full.get("password").is_none());
        assert!(full.get("createdAt").is_some());

        let summary = serde_json::to_value(UserSummary::from(&user)).unwrap();
        assert!(summary.get("createdAt").is_none());
        assert_eq!(summary["firstName"], "Jane");
    }
}
