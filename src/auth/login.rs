//! Mock login that accepts any well-formed credentials.

use serde::{Deserialize, Serialize};

use crate::errors::LoginError;
use crate::registration::schema::is_email;

/// Token issued by every successful mock login
pub const MOCK_TOKEN: &str = "mock_jwt_token";

/// Email and password as submitted by the login form
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// A user record without its password
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    pub phone_number: String,
    pub email_verified: bool,
    pub phone_number_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// The single user known to the harness.
pub fn mock_user() -> UserProfile {
    UserProfile {
        given_name: "John".to_string(),
        family_name: "Doe".to_string(),
        email: "john@example.com".to_string(),
        phone_number: "+15555555555".to_string(),
        email_verified: true,
        phone_number_verified: false,
    }
}

/// Log in without checking the password against anything.
///
/// The email must be well-formed and the password non-empty. The returned
/// profile is the mock user carrying the submitted email.
pub fn mock_login(credentials: &LoginCredentials) -> Result<AuthResponse, LoginError> {
    let email = credentials.email.trim();
    if !is_email(email) || credentials.password.is_empty() {
        return Err(LoginError::InvalidCredentials);
    }

    tracing::debug!(email, "mock login accepted");

    Ok(AuthResponse {
        token: MOCK_TOKEN.to_string(),
        user: UserProfile {
            email: email.to_string(),
            ..mock_user()
        },
    })
}
