use crate::models::UserSummary;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Database expense record
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    pub expense_name: String,
    pub group_id: i64,
    pub amount: f64,
    pub paid_by: i64,
    pub owed_to: i64,
    pub completed: bool,
    pub created_at: NaiveDateTime,
}

/// Expense with both parties resolved
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseView {
    #[serde(flatten)]
    pub expense: Expense,
    pub owed_to_user: Option<UserSummary>,
    pub paid_by_user: Option<UserSummary>,
}

/// Expense listing filters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpenseFilter {
    pub owed_to: Option<i64>,
    pub paid_by: Option<i64>,
}

/// Expense creation request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateExpenseRequest {
    #[validate(
        required(message = "expenseName is required"),
        length(min = 1, message = "expenseName is required")
    )]
    pub expense_name: Option<String>,
    #[validate(required(message = "groupId is required"))]
    pub group_id: Option<i64>,
    #[validate(
        required(message = "amount is required"),
        range(exclusive_min = 0.0, message = "amount must be greater than zero")
    )]
    pub amount: Option<f64>,
    #[validate(required(message = "owedTo is required"))]
    pub owed_to: Option<i64>,
    #[validate(required(message = "paidBy is required"))]
    pub paid_by: Option<i64>,
}
