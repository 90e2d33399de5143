use crate::domain::{models::barber::Barber, ports::BarberRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresBarberRepo {
    pool: PgPool,
}

impl PostgresBarberRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl BarberRepository for PostgresBarberRepo {
    async fn list(&self) -> Result<Vec<Barber>, AppError> {
        sqlx::query_as::<_, Barber>("SELECT * FROM barbers ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Barber>, AppError> {
        sqlx::query_as::<_, Barber>("SELECT * FROM barbers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
