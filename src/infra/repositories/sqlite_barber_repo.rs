use crate::domain::{models::barber::Barber, ports::BarberRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteBarberRepo {
    pool: SqlitePool,
}

impl SqliteBarberRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl BarberRepository for SqliteBarberRepo {
    async fn list(&self) -> Result<Vec<Barber>, AppError> {
        sqlx::query_as::<_, Barber>("SELECT * FROM barbers ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Barber>, AppError> {
        sqlx::query_as::<_, Barber>("SELECT * FROM barbers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
