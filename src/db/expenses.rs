use crate::models::{Expense, ExpenseFilter};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

const COLUMNS: &str = "id, expense_name, group_id, amount, paid_by, owed_to, completed, created_at";

#[derive(Debug)]
pub struct NewExpense<'a> {
    pub expense_name: &'a str,
    pub group_id: i64,
    pub amount: f64,
    pub paid_by: i64,
    pub owed_to: i64,
}

/// Shared expense queries
pub struct ExpenseRepository;

impl ExpenseRepository {
    pub async fn insert(conn: &mut SqliteConnection, expense: &NewExpense<'_>) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO expenses (expense_name, group_id, amount, paid_by, owed_to) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(expense.expense_name)
        .bind(expense.group_id)
        .bind(expense.amount)
        .bind(expense.paid_by)
        .bind(expense.owed_to)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<Expense>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM expenses WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn list_for_group(
        conn: &mut SqliteConnection,
        group_id: i64,
        filter: &ExpenseFilter,
    ) -> Result<Vec<Expense>, sqlx::Error> {
        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM expenses WHERE group_id = "));
        query.push_bind(group_id);
        if let Some(owed_to) = filter.owed_to {
            query.push(" AND owed_to = ").push_bind(owed_to);
        }
        if let Some(paid_by) = filter.paid_by {
            query.push(" AND paid_by = ").push_bind(paid_by);
        }
        query.push(" ORDER BY id");

        query.build_query_as::<Expense>().fetch_all(&mut *conn).await
    }

    pub async fn mark_completed(conn: &mut SqliteConnection, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE expenses SET completed = 1 WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}
