use crate::{
    db::{
        expenses::{ExpenseRepository, NewExpense},
        users::UserRepository,
    },
    handlers::{existing_group, existing_user, non_empty, required},
    models::{CreateExpenseRequest, Expense, ExpenseFilter, ExpenseView, UserSummary},
    state::AppState,
    utils::{db_error, validate_request, ApiError, ApiJson, ApiPath, ApiQuery, ApiResult, Envelope},
};
use axum::extract::State;
use sqlx::SqliteConnection;

async fn view(conn: &mut SqliteConnection, expense: Expense) -> ApiResult<ExpenseView> {
    let owed_to = UserRepository::find_by_id(&mut *conn, expense.owed_to).await?;
    let paid_by = UserRepository::find_by_id(conn, expense.paid_by).await?;
    Ok(ExpenseView {
        expense,
        owed_to_user: owed_to.as_ref().map(UserSummary::from),
        paid_by_user: paid_by.as_ref().map(UserSummary::from),
    })
}

pub async fn create_expense(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateExpenseRequest>,
) -> ApiResult<Envelope<Vec<ExpenseView>>> {
    validate_request(&request, "Unable to create expense due to validation error(s)")?;
    let expense_name = required(request.expense_name, "expenseName")?;
    let group_id = required(request.group_id, "groupId")?;
    let owed_to = required(request.owed_to, "owedTo")?;
    let paid_by = required(request.paid_by, "paidBy")?;

    let mut tx = state.db.begin().await?;
    existing_group(&mut tx, group_id).await?;
    existing_user(&mut tx, owed_to).await?;
    existing_user(&mut tx, paid_by).await?;

    let id = ExpenseRepository::insert(
        &mut tx,
        &NewExpense {
            expense_name: &expense_name,
            group_id,
            amount: required(request.amount, "amount")?,
            paid_by,
            owed_to,
        },
    )
    .await
    .map_err(db_error("Unable to create expense"))?;

    let expense = ExpenseRepository::find_by_id(&mut tx, id)
        .await?
        .ok_or_else(|| ApiError::internal_error("Unable to create expense"))?;
    let created = view(&mut tx, expense).await?;
    tx.commit().await.map_err(db_error("Unable to create expense"))?;

    Ok(Envelope::created("Expense added successfully", vec![created]))
}

pub async fn list_expenses(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<i64>,
    ApiQuery(filter): ApiQuery<ExpenseFilter>,
) -> ApiResult<Envelope<Vec<ExpenseView>>> {
    let mut conn = state.db.acquire().await?;
    let expenses = ExpenseRepository::list_for_group(&mut conn, group_id, &filter)
        .await
        .map_err(db_error("Unable to list expenses"))?;
    let expenses = non_empty(expenses, "No expenses found matching the provided criteria")?;

    let mut views = Vec::with_capacity(expenses.len());
    for expense in expenses {
        views.push(view(&mut conn, expense).await?);
    }

    Ok(Envelope::ok(format!("{} expense(s) found", views.len()), views))
}

pub async fn complete_expense(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Envelope<Vec<Expense>>> {
    let mut tx = state.db.begin().await?;
    ExpenseRepository::find_by_id(&mut tx, id)
        .await?
        .ok_or_else(|| ApiError::not_found_error(format!("Expense {id} not found")))?;
    ExpenseRepository::mark_completed(&mut tx, id)
        .await
        .map_err(db_error("Unable to update expense"))?;
    let expense = ExpenseRepository::find_by_id(&mut tx, id)
        .await?
        .ok_or_else(|| ApiError::not_found_error(format!("Expense {id} not found")))?;
    tx.commit().await.map_err(db_error("Unable to update expense"))?;

    Ok(Envelope::ok("Expense marked as completed", vec![expense]))
}
