//! Shared JSON DTOs for the client/server boundary.
//!
//! DESIGN
//! ======
//! These types mirror the server's auth and publication payloads so serde
//! round-trips stay lossless. Optional fields default so older payloads and
//! anonymous responses still decode.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// An email address attached to an account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEmail {
    pub address: String,
    #[serde(default)]
    pub verified: bool,
}

/// The signed-in user's own record, as published by `/api/users/me/data`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier (UUID string).
    pub id: String,
    /// Optional display handle chosen at signup.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub emails: Vec<UserEmail>,
    /// Account creation time (RFC 3339, UTC).
    #[serde(default)]
    pub created_at: Option<String>,
    /// Free-form profile document.
    #[serde(default)]
    pub profile: Option<serde_json::Value>,
}

impl User {
    /// First email on the account, which is the login address.
    #[must_use]
    pub fn primary_email(&self) -> Option<&UserEmail> {
        self.emails.first()
    }

    /// Name to greet the user with: username, else the email local part.
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(name) = self.username.as_deref().filter(|n| !n.is_empty()) {
            return name.to_owned();
        }
        self.primary_email()
            .and_then(|e| e.address.split('@').next())
            .filter(|local| !local.is_empty())
            .unwrap_or("there")
            .to_owned()
    }

    /// Creation date (`YYYY-MM-DD`) for display.
    #[must_use]
    pub fn created_date(&self) -> Option<&str> {
        self.created_at
            .as_deref()
            .map(|ts| ts.split('T').next().unwrap_or(ts))
    }
}

/// Fields submitted by the signup form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupFields {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Login request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Error body returned by the auth endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
