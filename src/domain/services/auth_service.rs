use std::sync::Arc;
use crate::domain::{
    models::{admin::Admin, auth::{Claims, RefreshTokenRecord}},
    ports::AdminRepository
};
use crate::error::AppError;
use crate::config::Config;
use jsonwebtoken::{encode, EncodingKey, Header, Algorithm};
use uuid::Uuid;
use chrono::{Utc, Duration};
use rand::{distributions::Alphanumeric, Rng};
use sha2::{Sha256, Digest};
use tracing::warn;

pub const ACCESS_TOKEN_AUDIENCE: &str = "barbershop-admin";
pub const ACCESS_TOKEN_MINUTES: i64 = 15;
pub const REFRESH_TOKEN_DAYS: i64 = 7;

/// Access token, refresh token and CSRF token of one admin session.
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub csrf_token: String,
}

pub struct AuthService {
    repo: Arc<dyn AdminRepository>,
    config: Config,
    encoding_key: EncodingKey,
}

impl AuthService {
    pub fn new(repo: Arc<dyn AdminRepository>, config: Config) -> Self {
        let encoding_key = EncodingKey::from_ed_pem(config.jwt_secret_key.as_bytes())
            .expect("Invalid JWT Private Key PEM");

        Self { repo, config, encoding_key }
    }

    pub async fn login(&self, admin: &Admin) -> Result<TokenPair, AppError> {
        self.issue_token_pair(admin, Uuid::new_v4(), 1).await
    }

    /// Rotates `raw_refresh_token`: the presented token is consumed and a new pair of the
    /// same family is issued for its admin. Of two concurrent refreshes only one finds the
    /// token. An expired token revokes its whole family.
    pub async fn refresh(&self, raw_refresh_token: &str) -> Result<(Admin, TokenPair), AppError> {
        let record = self.repo.take_refresh_token(&self.hash_token(raw_refresh_token)).await?
            .ok_or(AppError::Unauthorized)?;

        if record.expires_at < Utc::now() {
            warn!("Expired refresh token presented for admin {}", record.admin_id);
            self.repo.revoke_refresh_family(record.family_id).await?;
            return Err(AppError::Unauthorized);
        }

        let admin = self.repo.find_by_id(&record.admin_id).await?
            .ok_or(AppError::Unauthorized)?;

        let tokens = self.issue_token_pair(&admin, record.family_id, record.generation_id + 1).await?;
        Ok((admin, tokens))
    }

    pub async fn logout(&self, raw_refresh_token: &str) -> Result<(), AppError> {
        match self.repo.take_refresh_token(&self.hash_token(raw_refresh_token)).await? {
            Some(record) => self.repo.revoke_refresh_family(record.family_id).await,
            None => Ok(()),
        }
    }

    async fn issue_token_pair(&self, admin: &Admin, family_id: Uuid, generation_id: i32) -> Result<TokenPair, AppError> {
        let csrf_token: String = rand::thread_rng().sample_iter(&Alphanumeric).take(32).map(char::from).collect();
        let now = Utc::now();
        let exp = (now + Duration::minutes(ACCESS_TOKEN_MINUTES)).timestamp() as usize;

        let claims = Claims {
            iss: self.config.auth_issuer.clone(),
            sub: admin.id.clone(),
            aud: ACCESS_TOKEN_AUDIENCE.to_string(),
            exp,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
            csrf_token: csrf_token.clone(),
        };

        let access_token = encode(&Header::new(Algorithm::EdDSA), &claims, &self.encoding_key)
            .map_err(|e| {
                tracing::error!("JWT encoding failed: {}", e);
                AppError::Internal
            })?;

        let refresh_token: String = rand::thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect();

        let record = RefreshTokenRecord {
            token_hash: self.hash_token(&refresh_token),
            admin_id: admin.id.clone(),
            family_id,
            generation_id,
            expires_at: now + Duration::days(REFRESH_TOKEN_DAYS),
            created_at: now,
        };

        self.repo.store_refresh_token(&record).await?;
        Ok(TokenPair { access_token, refresh_token, csrf_token })
    }

    fn hash_token(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}
