use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use argon2::{password_hash::SaltString, Argon2, PasswordHasher};
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::{info, warn};
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::models::admin::Admin;
use crate::domain::services::auth_service::AuthService;
use crate::domain::services::booking_service::BookingService;
use crate::domain::services::schedule::ShopCalendar;
use crate::error::AppError;
use crate::infra::repositories::{
    postgres_admin_repo::PostgresAdminRepo,
    postgres_barber_repo::PostgresBarberRepo, postgres_booking_repo::PostgresBookingRepo,
    postgres_disabled_date_repo::PostgresDisabledDateRepo, postgres_service_repo::PostgresServiceRepo,
    sqlite_admin_repo::SqliteAdminRepo,
    sqlite_barber_repo::SqliteBarberRepo, sqlite_booking_repo::SqliteBookingRepo,
    sqlite_disabled_date_repo::SqliteDisabledDateRepo, sqlite_service_repo::SqliteServiceRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let state = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;
        postgres_state(pool, config.clone())
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;
        sqlite_state(pool, config.clone())
    };

    if let Err(e) = seed_admin(&state).await {
        warn!("Could not seed admin account: {}", e);
    }
    state
}

pub fn sqlite_state(pool: SqlitePool, config: Config) -> AppState {
    let calendar = ShopCalendar::from_timezone_name(&config.shop_timezone);
    let booking_service = BookingService::new(
        calendar,
        Arc::new(SqliteBarberRepo::new(pool.clone())),
        Arc::new(SqliteServiceRepo::new(pool.clone())),
        Arc::new(SqliteBookingRepo::new(pool.clone())),
        Arc::new(SqliteDisabledDateRepo::new(pool.clone())),
    );

    let admin_repo = Arc::new(SqliteAdminRepo::new(pool));
    let auth_service = Arc::new(AuthService::new(admin_repo.clone(), config.clone()));

    AppState {
        config,
        admin_repo,
        auth_service,
        booking_service: Arc::new(booking_service),
    }
}

pub fn postgres_state(pool: PgPool, config: Config) -> AppState {
    let calendar = ShopCalendar::from_timezone_name(&config.shop_timezone);
    let booking_service = BookingService::new(
        calendar,
        Arc::new(PostgresBarberRepo::new(pool.clone())),
        Arc::new(PostgresServiceRepo::new(pool.clone())),
        Arc::new(PostgresBookingRepo::new(pool.clone())),
        Arc::new(PostgresDisabledDateRepo::new(pool.clone())),
    );

    let admin_repo = Arc::new(PostgresAdminRepo::new(pool));
    let auth_service = Arc::new(AuthService::new(admin_repo.clone(), config.clone()));

    AppState {
        config,
        admin_repo,
        auth_service,
        booking_service: Arc::new(booking_service),
    }
}

/// Creates the configured admin account when the admins table is empty.
pub async fn seed_admin(state: &AppState) -> Result<(), AppError> {
    if state.admin_repo.count().await? > 0 {
        return Ok(());
    }

    let Some(password) = state.config.admin_password.as_deref() else {
        warn!("No admin account exists and ADMIN_PASSWORD is not set; admin endpoints are unusable");
        return Ok(());
    };

    let salt = SaltString::generate(&mut rand::thread_rng());
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::InternalWithMsg(format!("Password hashing failed: {e}")))?
        .to_string();

    let admin = state.admin_repo.create(&Admin::new(state.config.admin_username.clone(), password_hash)).await?;
    info!("Seeded admin account '{}'", admin.username);
    Ok(())
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
