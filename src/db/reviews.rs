use crate::models::{Review, ReviewFilter, ReviewType};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

const COLUMNS: &str = "review_id, review_type, reviewed_item_id, reviewer_id, score, description, created_at";

#[derive(Debug)]
pub struct NewReview<'a> {
    pub review_type: ReviewType,
    pub reviewed_item_id: i64,
    pub reviewer_id: i64,
    pub score: i64,
    pub description: Option<&'a str>,
}

/// Review queries
pub struct ReviewRepository;

impl ReviewRepository {
    pub async fn insert(conn: &mut SqliteConnection, review: &NewReview<'_>) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"INSERT INTO reviews (review_type, reviewed_item_id, reviewer_id, score, description)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(review.review_type)
        .bind(review.reviewed_item_id)
        .bind(review.reviewer_id)
        .bind(review.score)
        .bind(review.description)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(conn: &mut SqliteConnection, review_id: i64) -> Result<Option<Review>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM reviews WHERE review_id = ?"))
            .bind(review_id)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn search(conn: &mut SqliteConnection, filter: &ReviewFilter) -> Result<Vec<Review>, sqlx::Error> {
        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM reviews WHERE 1 = 1"));
        if let Some(review_type) = filter.review_type {
            query.push(" AND review_type = ").push_bind(review_type);
        }
        if let Some(item_id) = filter.reviewed_item_id {
            query.push(" AND reviewed_item_id = ").push_bind(item_id);
        }
        if let Some(reviewer_id) = filter.reviewer_id {
            query.push(" AND reviewer_id = ").push_bind(reviewer_id);
        }
        query.push(" ORDER BY review_id");

        query.build_query_as::<Review>().fetch_all(&mut *conn).await
    }

    /// Whether the reviewer already reviewed this item
    pub async fn exists(
        conn: &mut SqliteConnection,
        review_type: ReviewType,
        reviewed_item_id: i64,
        reviewer_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT review_id FROM reviews WHERE review_type = ? AND reviewed_item_id = ? AND reviewer_id = ?",
        )
        .bind(review_type)
        .bind(reviewed_item_id)
        .bind(reviewer_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.is_some())
    }
}
