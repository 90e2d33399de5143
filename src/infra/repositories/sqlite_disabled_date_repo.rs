use crate::domain::{models::disabled_date::DisabledDate, ports::DisabledDateRepository};
use crate::error::{is_unique_violation, AppError};
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::NaiveDate;

pub struct SqliteDisabledDateRepo {
    pool: SqlitePool,
}

impl SqliteDisabledDateRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl DisabledDateRepository for SqliteDisabledDateRepo {
    async fn create(&self, entity: &DisabledDate) -> Result<DisabledDate, AppError> {
        sqlx::query_as::<_, DisabledDate>(
            r#"INSERT INTO disabled_dates (id, date, reason, created_at)
               VALUES (?, ?, ?, ?)
               RETURNING *"#
        )
            .bind(&entity.id)
            .bind(entity.date)
            .bind(&entity.reason)
            .bind(entity.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| if is_unique_violation(&e) {
                AppError::Conflict(format!("{} is already disabled", entity.date))
            } else {
                AppError::Database(e)
            })
    }

    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<DisabledDate>, AppError> {
        sqlx::query_as::<_, DisabledDate>(
            "SELECT * FROM disabled_dates WHERE date = ?"
        )
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DisabledDate>, AppError> {
        sqlx::query_as::<_, DisabledDate>(
            "SELECT * FROM disabled_dates WHERE date >= ? AND date <= ? ORDER BY date ASC"
        )
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, date: NaiveDate) -> Result<(), AppError> {
        let res = sqlx::query("DELETE FROM disabled_dates WHERE date = ?")
            .bind(date)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Date is not disabled".into()));
        }
        Ok(())
    }
}
