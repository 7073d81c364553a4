//! Password accounts: validation, hashing, lookup, and email verification.
//!
//! DESIGN
//! ======
//! Emails are stored case-folded and unique; usernames are optional, trimmed,
//! and unique when present. Passwords are Argon2 PHC strings. Uniqueness is
//! enforced by the database and mapped back from constraint names, so two
//! racing signups cannot both win.
//!
//! Verification tokens are stored as SHA-256 hashes; the raw token only ever
//! exists in the emailed link.

use std::sync::LazyLock;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::Rng;
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::session::{bytes_to_hex, generate_token};

pub const MIN_PASSWORD_LEN: usize = 6;
const VERIFICATION_TOKEN_TTL_DAYS: i32 = 3;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("User must have an email")]
    MissingEmail,
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,
    #[error("Email already exists.")]
    EmailTaken,
    #[error("Username already exists.")]
    UsernameTaken,
    #[error("Signups forbidden")]
    SignupsForbidden,
    #[error("User not found")]
    UserNotFound,
    #[error("Incorrect password")]
    IncorrectPassword,
    #[error("Verify email link expired")]
    InvalidVerificationToken,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

// =============================================================================
// VALIDATION
// =============================================================================

/// A signup request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub username: Option<String>,
}

/// Trim and case-fold an email address.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Validate and normalize signup input.
///
/// # Errors
///
/// Returns the first rule the input breaks.
pub fn validate_new_user(email: &str, password: &str, username: Option<&str>) -> Result<NewUser, AccountError> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(AccountError::MissingEmail);
    }
    if !is_valid_email(&email) {
        return Err(AccountError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AccountError::PasswordTooShort);
    }
    let username = username.map(str::trim).filter(|u| !u.is_empty()).map(str::to_owned);
    Ok(NewUser { email, password: password.to_owned(), username })
}

// =============================================================================
// PASSWORDS
// =============================================================================

/// Hash a password into an Argon2 PHC string with a random salt.
///
/// # Errors
///
/// Returns `AccountError::Hash` if salt encoding or hashing fails.
pub fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt_bytes: [u8; 16] = rand::rng().random();
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AccountError::Hash(e.to_string()))?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AccountError::Hash(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// Check a password against a stored PHC string. Malformed hashes never match.
#[must_use]
pub fn verify_password(password: &str, phc: &str) -> bool {
    PasswordHash::new(phc).is_ok_and(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

/// Hex SHA-256 of a verification token.
#[must_use]
pub fn hash_token(token: &str) -> String {
    bytes_to_hex(&Sha256::digest(token.as_bytes()))
}

// =============================================================================
// USER DATA
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserEmail {
    pub address: String,
    pub verified: bool,
}

/// The fields a user may see about their own account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserData {
    pub id: Uuid,
    pub username: Option<String>,
    pub emails: Vec<UserEmail>,
    /// RFC 3339, UTC.
    pub created_at: String,
    pub profile: Option<serde_json::Value>,
}

const USER_DATA_COLUMNS: &str = r#"id, username, email, email_verified, profile,
    to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at"#;

fn user_data_from_row(row: &sqlx::postgres::PgRow) -> UserData {
    UserData {
        id: row.get("id"),
        username: row.get("username"),
        emails: vec![UserEmail { address: row.get("email"), verified: row.get("email_verified") }],
        created_at: row.get("created_at"),
        profile: row.get("profile"),
    }
}

fn map_unique_violation(err: sqlx::Error) -> AccountError {
    if let sqlx::Error::Database(db) = &err {
        match db.constraint() {
            Some("users_email_key") => return AccountError::EmailTaken,
            Some("users_username_key") => return AccountError::UsernameTaken,
            _ => {}
        }
    }
    AccountError::Db(err)
}

/// Insert a validated user.
///
/// # Errors
///
/// Returns `EmailTaken`/`UsernameTaken` on conflicts, or a hashing/database error.
pub async fn create_user(pool: &PgPool, new_user: &NewUser) -> Result<UserData, AccountError> {
    let password = new_user.password.clone();
    let phc = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AccountError::Hash(e.to_string()))??;

    let sql = format!(
        "INSERT INTO users (email, username, password_hash) VALUES ($1, $2, $3) RETURNING {USER_DATA_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(&new_user.email)
        .bind(&new_user.username)
        .bind(phc)
        .fetch_one(pool)
        .await
        .map_err(map_unique_violation)?;
    Ok(user_data_from_row(&row))
}

/// Check credentials, returning the user id.
///
/// # Errors
///
/// Returns `UserNotFound` or `IncorrectPassword` for bad credentials.
pub async fn authenticate(pool: &PgPool, email: &str, password: &str) -> Result<Uuid, AccountError> {
    let row = sqlx::query("SELECT id, password_hash FROM users WHERE email = $1")
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?
        .ok_or(AccountError::UserNotFound)?;

    let phc: String = row.get("password_hash");
    let candidate = password.to_owned();
    let matches = tokio::task::spawn_blocking(move || verify_password(&candidate, &phc))
        .await
        .unwrap_or(false);
    if !matches {
        return Err(AccountError::IncorrectPassword);
    }
    Ok(row.get("id"))
}

/// Load the publishable fields of one user.
pub async fn load_user_data(pool: &PgPool, user_id: Uuid) -> Result<Option<UserData>, sqlx::Error> {
    let sql = format!("SELECT {USER_DATA_COLUMNS} FROM users WHERE id = $1");
    let row = sqlx::query(&sql).bind(user_id).fetch_optional(pool).await?;
    Ok(row.as_ref().map(user_data_from_row))
}

// =============================================================================
// EMAIL VERIFICATION
// =============================================================================

/// Issue a verification token for `email`, returning the raw token.
pub async fn create_verification_token(pool: &PgPool, user_id: Uuid, email: &str) -> Result<String, sqlx::Error> {
    let token = generate_token();
    sqlx::query(
        "INSERT INTO email_verification_tokens (token_hash, user_id, email, expires_at)
         VALUES ($1, $2, $3, now() + make_interval(days => $4))",
    )
    .bind(hash_token(&token))
    .bind(user_id)
    .bind(email)
    .bind(VERIFICATION_TOKEN_TTL_DAYS)
    .execute(pool)
    .await?;
    Ok(token)
}

/// Consume a verification token and mark its address verified.
///
/// # Errors
///
/// Returns `InvalidVerificationToken` for unknown, used, or expired tokens.
pub async fn verify_email_token(pool: &PgPool, token: &str) -> Result<Uuid, AccountError> {
    let row = sqlx::query(
        "UPDATE email_verification_tokens
         SET consumed_at = now()
         WHERE token_hash = $1 AND consumed_at IS NULL AND expires_at > now()
         RETURNING user_id, email",
    )
    .bind(hash_token(token.trim()))
    .fetch_optional(pool)
    .await?
    .ok_or(AccountError::InvalidVerificationToken)?;

    let user_id: Uuid = row.get("user_id");
    let email: String = row.get("email");
    sqlx::query("UPDATE users SET email_verified = true WHERE id = $1 AND email = $2")
        .bind(user_id)
        .bind(email)
        .execute(pool)
        .await?;
    Ok(user_id)
}

#[cfg(test)]
#[path = "account_test.rs"]
mod tests;
