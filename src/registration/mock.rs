//! Mock OpenID Connect dynamic client registration responses.
//!
//! Produces RFC 7591 shaped registration output for a validated payload.
//! Identifiers and secrets are random-looking only; nothing here is suitable
//! for real credential issuance.

use base64::prelude::*;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::endpoints::endpoint_origin;
use super::schema::RegistrationPayload;
use crate::errors::RegistrationError;

/// Scope advertised on every mock client
pub const MOCK_SCOPE: &str = "openid profile email phone";

/// Mock client registration response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockClientCredentials {
    /// Client ID
    pub client_id: String,
    /// Client secret
    pub client_secret: String,
    /// Client name, from the registered given and family names
    pub client_name: String,
    /// Registration access token
    pub registration_access_token: String,
    /// Registration client URI
    pub registration_client_uri: String,
    /// Client ID issued at
    pub client_id_issued_at: i64,
    /// Client secret expires at, 0 for never
    pub client_secret_expires_at: i64,
    pub token_endpoint_auth_method: String,
    pub grant_types: Vec<String>,
    pub response_types: Vec<String>,
    pub scope: String,
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    pub jwks_uri: String,
}

/// Generate a mock registration response using the thread-local RNG.
pub fn generate(
    payload: &RegistrationPayload,
    now: DateTime<Utc>,
) -> Result<MockClientCredentials, RegistrationError> {
    generate_with_rng(payload, &mut rand::thread_rng(), now)
}

/// Generate a mock registration response from a caller-supplied RNG.
///
/// Endpoint fields depend only on the payload's endpoint origin; the
/// identifiers and secrets depend only on `rng`.
pub fn generate_with_rng<R: Rng + ?Sized>(
    payload: &RegistrationPayload,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<MockClientCredentials, RegistrationError> {
    let origin = endpoint_origin(&payload.endpoint)?;

    let client_id = generate_client_id(rng);
    let client_secret = generate_token(rng);
    let registration_access_token = generate_token(rng);

    let client_name = format!(
        "{} {}",
        payload.claims.given_name, payload.claims.family_name
    );

    tracing::debug!(%client_id, %origin, "generated mock client registration");

    Ok(MockClientCredentials {
        registration_client_uri: format!("{origin}/register/{client_id}"),
        client_id,
        client_secret,
        client_name,
        registration_access_token,
        client_id_issued_at: now.timestamp(),
        client_secret_expires_at: 0,
        token_endpoint_auth_method: "client_secret_basic".to_string(),
        grant_types: vec!["authorization_code".to_string(), "refresh_token".to_string()],
        response_types: vec!["code".to_string()],
        scope: MOCK_SCOPE.to_string(),
        issuer: origin.clone(),
        authorization_endpoint: format!("{origin}/oauth/authorize"),
        token_endpoint: format!("{origin}/oauth/token"),
        userinfo_endpoint: format!("{origin}/oauth/userinfo"),
        jwks_uri: format!("{origin}/.well-known/jwks.json"),
    })
}

/// Generate a random-looking token
fn generate_token<R: Rng + ?Sized>(rng: &mut R) -> String {
    let bytes: [u8; 32] = rng.r#gen();
    BASE64_URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a client ID
fn generate_client_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let bytes: [u8; 16] = rng.r#gen();
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .to_string()
}
