use std::env;

/// Environment configuration
/// Loads and validates environment variables
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub admin_username: String,
    pub mail_webhook_url: Option<String>,
}

impl Config {
    /// Reads the process environment; `.env` loading is the caller's
    /// responsibility and happens once at startup.
    pub fn from_env() -> Result<Self, String> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set".to_string())?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET must be set".to_string())?;

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        // The system admin account participates in auth but is excluded
        // from attendance analytics.
        let admin_username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());

        let mail_webhook_url = env::var("MAIL_WEBHOOK_URL").ok().filter(|v| !v.is_empty());

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            admin_username,
            mail_webhook_url,
        })
    }
}
