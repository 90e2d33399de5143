use barbershop_booking::{
    api::router::create_router,
    state::AppState,
    config::Config,
    infra::factory::{seed_admin, sqlite_state},
};
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, Response, header},
    Router,
};
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use std::str::FromStr;
use tower::ServiceExt;
use serde_json::Value;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "barber-admin-pass";

pub const CLASSIC_CUT: &str = "svc-classic-cut";
pub const PREMIUM_CUT_SHAVE: &str = "svc-premium-cut-shave";
pub const BARBER_HAJ: &str = "barber-haj";
pub const BARBER_KARIM: &str = "barber-karim";

pub struct AuthHeaders {
    pub access_token: String,
    pub csrf_token: String,
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(StdDuration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            shop_timezone: "Africa/Tunis".to_string(),
            jwt_secret_key: priv_key_pem.to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
            admin_username: ADMIN_USERNAME.to_string(),
            admin_password: Some(ADMIN_PASSWORD.to_string()),
        };

        let state = sqlite_state(pool.clone(), config);
        seed_admin(&state).await.expect("Failed to seed admin");
        let state = Arc::new(state);

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn login(&self) -> AuthHeaders {
        let payload = serde_json::json!({
            "username": ADMIN_USERNAME,
            "password": ADMIN_PASSWORD
        });

        let response = self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap()
        ).await.unwrap();

        if !response.status().is_success() {
            panic!("Login failed in test helper: status {}", response.status());
        }

        let access_token = cookie_value(&response, "access_token").expect("No access_token cookie returned");

        let body_json = parse_body(response).await;
        let csrf_token = body_json["csrf_token"].as_str().expect("No csrf_token in body").to_string();

        AuthHeaders {
            access_token,
            csrf_token
        }
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.router.clone().oneshot(
            Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
        ).await.unwrap()
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response<Body> {
        self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap()
        ).await.unwrap()
    }

    pub async fn admin_request(&self, auth: &AuthHeaders, method: &str, uri: &str, body: Option<Value>) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token);

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    pub async fn book(&self, barber_id: &str, service_id: &str, date: NaiveDate, time: &str, phone: &str) -> Response<Body> {
        self.post_json("/api/v1/bookings", serde_json::json!({
            "service_id": service_id,
            "barber_id": barber_id,
            "date": date.to_string(),
            "time": time,
            "customer_name": "Test Customer",
            "customer_phone": phone,
        })).await
    }

    pub async fn slots(&self, barber_id: &str, service_id: &str, date: NaiveDate) -> Vec<String> {
        let response = self.get(&format!(
            "/api/v1/availability/slots?barber_id={}&service_id={}&date={}",
            barber_id, service_id, date
        )).await;
        let body = parse_body(response).await;
        body["slots"].as_array()
            .map(|slots| slots.iter().filter_map(|s| s.as_str().map(str::to_string)).collect())
            .unwrap_or_default()
    }

    pub async fn confirmed_count(&self, barber_id: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE barber_id = ? AND status = 'confirmed'")
            .bind(barber_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

#[allow(dead_code)]
pub async fn parse_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

#[allow(dead_code)]
pub fn cookie_value(response: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    response.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find(|c| c.starts_with(&prefix))
        .map(|c| c[prefix.len()..].split(';').next().unwrap_or("").to_string())
}

/// The first `weekday` at least a week ahead, so slots are never in the past.
#[allow(dead_code)]
pub fn upcoming(weekday: Weekday) -> NaiveDate {
    let mut date = Utc::now().date_naive() + Duration::days(7);
    while date.weekday() != weekday {
        date += Duration::days(1);
    }
    date
}
