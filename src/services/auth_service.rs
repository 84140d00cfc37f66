use chrono::Duration;
use sqlx::PgPool;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{is_unique_violation, Error, Result};
use crate::models::user::User;
use crate::utils::crypto::{hash_password_blocking, verify_password_blocking};
use crate::utils::token::{decode_session, encode_session, Claims};

const USER_COLUMNS: &str = "id, email, hashed_password, is_active, created_at";

#[derive(Debug, Clone)]
pub struct SessionToken {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
    jwt_secret: String,
    token_ttl: Duration,
    admin_email: String,
    admin_password: String,
}

impl AuthService {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            token_ttl: Duration::minutes(config.access_token_expire_minutes),
            admin_email: config.admin_email.clone(),
            admin_password: config.admin_password.clone(),
        }
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<User> {
        if self.get_by_email(email).await?.is_some() {
            return Err(Error::DuplicateEmail);
        }

        let hashed = hash_password_blocking(password.to_string()).await?;
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, hashed_password, is_active)
             VALUES ($1, $2, TRUE)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(hashed)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::DuplicateEmail
            } else {
                e.into()
            }
        })?;

        info!(user_id = user.id, email = %user.email, "user registered");
        Ok(user)
    }

    /// Every failure surfaces as `InvalidCredentials`; only the log says which check failed.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let Some(user) = self.get_by_email(email).await? else {
            warn!(email = %email, "login rejected: unknown email");
            return Err(Error::InvalidCredentials);
        };

        let matches =
            verify_password_blocking(password.to_string(), user.hashed_password.clone()).await?;
        if !matches {
            warn!(email = %email, "login rejected: password mismatch");
            return Err(Error::InvalidCredentials);
        }
        if !user.is_active {
            warn!(email = %email, "login rejected: account inactive");
            return Err(Error::InvalidCredentials);
        }

        info!(user_id = user.id, "login succeeded");
        Ok(user)
    }

    pub fn issue_session_token(&self, user: &User) -> Result<SessionToken> {
        let (access_token, _) = encode_session(&user.email, self.token_ttl, &self.jwt_secret)?;
        Ok(SessionToken {
            access_token,
            expires_in: self.token_ttl.num_seconds(),
        })
    }

    pub fn verify_session_token(&self, token: &str) -> Result<Claims> {
        decode_session(token, &self.jwt_secret)
            .map_err(|_| Error::Unauthorized("invalid_token".into()))
    }

    pub fn verify_admin(&self, username: &str, password: &str) -> bool {
        let user_ok = username.as_bytes().ct_eq(self.admin_email.as_bytes());
        let password_ok = password.as_bytes().ct_eq(self.admin_password.as_bytes());
        (user_ok & password_ok).into()
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn list_users(&self, offset: i64, limit: i64) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}
