use chrono::{Duration, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::config::DbPool;
use crate::modules::auth::model::{PasswordReset, Role, User};
use crate::services::{hashing, jwt::JwtService};

const VERIFICATION_TTL_HOURS: i64 = 24;
const RESET_OTP_TTL_MINUTES: i64 = 15;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already exists")]
    EmailTaken,

    // Client-visible markers the mobile app matches on.
    #[error("EMAIL_NOT_VERIFIED")]
    EmailNotVerified,

    #[error("PENDING_APPROVAL")]
    PendingApproval,

    #[error("Email already verified")]
    AlreadyVerified,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid or expired reset code")]
    InvalidOtp,

    #[error("Cannot delete admin user")]
    CannotDeleteAdmin,

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AuthError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::UsernameTaken | Self::EmailTaken => StatusCode::CONFLICT,
            Self::EmailNotVerified | Self::PendingApproval => StatusCode::FORBIDDEN,
            Self::AlreadyVerified | Self::InvalidToken | Self::InvalidOtp => StatusCode::BAD_REQUEST,
            Self::CannotDeleteAdmin => StatusCode::FORBIDDEN,
            Self::Hashing(_) | Self::Token(_) | Self::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub struct LoginResult {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

pub struct AuthCrud<'a> {
    pool: DbPool,
    jwt_service: &'a JwtService,
}

impl<'a> AuthCrud<'a> {
    pub fn new(pool: DbPool, jwt_service: &'a JwtService) -> Self {
        Self { pool, jwt_service }
    }

    // =========================================================================
    // USERS
    // =========================================================================

    pub async fn create(&self, user: &User) -> Result<(), AuthError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, username, name, email, phone, password_hash, role,
                               level, current_video_index, email_verified, approved)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.level)
        .bind(user.current_video_index)
        .bind(user.email_verified)
        .bind(user.approved)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                let msg = e.to_string();
                if msg.contains("uq_users_email") {
                    Err(AuthError::EmailTaken)
                } else {
                    Err(AuthError::UsernameTaken)
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool, AuthError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 > 0)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 > 0)
    }

    // =========================================================================
    // LOGIN / TOKENS
    // =========================================================================

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let user = self
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let is_valid = hashing::verify_password(password, &user.password_hash)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.email_verified {
            return Err(AuthError::EmailNotVerified);
        }
        if !user.approved {
            return Err(AuthError::PendingApproval);
        }

        let access_token = self
            .jwt_service
            .create_access_token(&user.username, user.role.as_str())?;
        let refresh_token = self.jwt_service.create_refresh_token(&user.username)?;

        self.store_refresh_token(&user.id, &refresh_token).await?;

        Ok(LoginResult {
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_duration_secs(),
            user,
        })
    }

    async fn store_refresh_token(&self, user_id: &str, refresh_token: &str) -> Result<(), AuthError> {
        let expires_at = Utc::now() + self.jwt_service.refresh_token_ttl();
        sqlx::query(
            "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(hashing::sha256_hex(refresh_token))
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let data = self
            .jwt_service
            .verify_refresh_token(refresh_token)
            .map_err(|_| AuthError::InvalidToken)?;

        let token_hash = hashing::sha256_hex(refresh_token);
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE token_hash = ? AND revoked = FALSE AND expires_at > NOW()
            "#,
        )
        .bind(&token_hash)
        .execute(&self.pool)
        .await?;

        // Rotation: the old token must have been live exactly once.
        if result.rows_affected() == 0 {
            return Err(AuthError::InvalidToken);
        }

        let user = self
            .find_by_username(&data.claims.sub)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let access_token = self
            .jwt_service
            .create_access_token(&user.username, user.role.as_str())?;
        let new_refresh = self.jwt_service.create_refresh_token(&user.username)?;
        self.store_refresh_token(&user.id, &new_refresh).await?;

        Ok(TokenPair {
            access_token,
            refresh_token: new_refresh,
            expires_in: self.jwt_service.get_access_token_duration_secs(),
        })
    }

    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE token_hash = ?")
            .bind(hashing::sha256_hex(refresh_token))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn revoke_all_refresh_tokens(&self, user_id: &str) -> Result<(), AuthError> {
        sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // =========================================================================
    // EMAIL VERIFICATION
    // =========================================================================

    pub async fn create_verification(&self, user_id: &str) -> Result<String, AuthError> {
        sqlx::query("DELETE FROM email_verifications WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + Duration::hours(VERIFICATION_TTL_HOURS);
        sqlx::query(
            "INSERT INTO email_verifications (id, user_id, token, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(&token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(token)
    }

    pub async fn verify_email(&self, token: &str) -> Result<(), AuthError> {
        let row: Option<(String, chrono::DateTime<Utc>)> = sqlx::query_as(
            "SELECT user_id, expires_at FROM email_verifications WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let (user_id, expires_at) = row.ok_or(AuthError::InvalidToken)?;
        if expires_at < Utc::now() {
            return Err(AuthError::InvalidToken);
        }

        sqlx::query("UPDATE users SET email_verified = TRUE WHERE id = ?")
            .bind(&user_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM email_verifications WHERE user_id = ?")
            .bind(&user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn resend_verification(&self, email: &str) -> Result<(User, String), AuthError> {
        let user = self.find_by_email(email).await?.ok_or(AuthError::UserNotFound)?;
        if user.email_verified {
            return Err(AuthError::AlreadyVerified);
        }
        let token = self.create_verification(&user.id).await?;
        Ok((user, token))
    }

    // =========================================================================
    // PASSWORD RESET (6-digit OTP, single use)
    // =========================================================================

    pub async fn initiate_password_reset(&self, email: &str) -> Result<(User, String), AuthError> {
        let user = self.find_by_email(email).await?.ok_or(AuthError::UserNotFound)?;

        // New request invalidates any outstanding codes.
        sqlx::query("DELETE FROM password_resets WHERE user_id = ?")
            .bind(&user.id)
            .execute(&self.pool)
            .await?;

        let otp = format!("{:06}", rand::rng().random_range(0..1_000_000u32));
        let expires_at = Utc::now() + Duration::minutes(RESET_OTP_TTL_MINUTES);
        sqlx::query(
            "INSERT INTO password_resets (id, user_id, otp_hash, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&user.id)
        .bind(hashing::sha256_hex(&otp))
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok((user, otp))
    }

    pub async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self.find_by_email(email).await?.ok_or(AuthError::InvalidOtp)?;

        let reset = sqlx::query_as::<_, PasswordReset>(
            r#"
            SELECT * FROM password_resets
            WHERE user_id = ? AND otp_hash = ? AND used = FALSE
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(&user.id)
        .bind(hashing::sha256_hex(otp))
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AuthError::InvalidOtp)?;

        if reset.expires_at < Utc::now() {
            sqlx::query("DELETE FROM password_resets WHERE id = ?")
                .bind(&reset.id)
                .execute(&self.pool)
                .await?;
            return Err(AuthError::InvalidOtp);
        }

        let password_hash = hashing::hash_password(new_password)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(&password_hash)
            .bind(&user.id)
            .execute(&self.pool)
            .await?;
        sqlx::query("UPDATE password_resets SET used = TRUE WHERE id = ?")
            .bind(&reset.id)
            .execute(&self.pool)
            .await?;

        // A password change logs out every device.
        self.revoke_all_refresh_tokens(&user.id).await?;

        Ok(())
    }

    // =========================================================================
    // ADMIN: USER MANAGEMENT
    // =========================================================================

    pub async fn pending_users(&self) -> Result<Vec<User>, AuthError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE approved = FALSE ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn approve_user(&self, username: &str) -> Result<(), AuthError> {
        let result = sqlx::query("UPDATE users SET approved = TRUE WHERE username = ?")
            .bind(username)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    pub async fn delete_user(&self, username: &str) -> Result<(), AuthError> {
        let user = self
            .find_by_username(username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.role == Role::Admin {
            return Err(AuthError::CannotDeleteAdmin);
        }

        let mut tx = self.pool.begin().await?;
        // daily_progress is keyed by username, not by user id, so the FK
        // cascade on users does not reach it.
        sqlx::query("DELETE FROM daily_progress WHERE username = ?")
            .bind(username)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(&user.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(())
    }
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
