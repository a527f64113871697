pub mod hashing;
pub mod jwt;
pub mod mailer;
pub mod progression;
pub mod rate_limit;
pub mod sanitize;
pub mod security;
pub mod session;
