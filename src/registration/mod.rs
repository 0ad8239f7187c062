//! OpenID Connect style registration: schema, mock client credentials, and
//! the display strings shown after a successful submission.

pub mod endpoints;
pub mod mock;
pub mod presentation;
pub mod schema;

pub use endpoints::{ENDPOINTS, EndpointChoice, default_endpoint, endpoint_origin};
pub use mock::{MockClientCredentials, generate, generate_with_rng};
pub use presentation::{PseudoJwtHeader, curl_command, decode_pseudo_jwt, pseudo_jwt};
pub use schema::{
    Field, FieldErrors, IdentityClaims, RegistrationDefaults, RegistrationForm,
    RegistrationPayload, validate,
};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::RegistrationError;

/// Everything the display panels render for one validated submission.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationPreview {
    pub payload: RegistrationPayload,
    pub pseudo_jwt: String,
    pub curl_command: String,
    pub mock_response: MockClientCredentials,
}

impl RegistrationPreview {
    /// Build the preview of a payload that already passed validation.
    pub fn build(
        payload: RegistrationPayload,
        bearer_token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, RegistrationError> {
        let pseudo_jwt = pseudo_jwt(&payload.claims)?;
        let curl_command = curl_command(&payload.endpoint, &payload.claims, bearer_token)?;
        let mock_response = generate(&payload, now)?;

        Ok(Self {
            payload,
            pseudo_jwt,
            curl_command,
            mock_response,
        })
    }

    /// Validate raw input and build its preview in one step.
    pub fn from_form(
        form: &RegistrationForm,
        defaults: &RegistrationDefaults,
        bearer_token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, RegistrationError> {
        let payload = validate(form, defaults, now).map_err(RegistrationError::InvalidPayload)?;
        Self::build(payload, bearer_token, now)
    }

    /// The request payload as the panel shows it, endpoint included.
    pub fn payload_json(&self) -> Result<String, RegistrationError> {
        serde_json::to_string_pretty(&self.payload)
            .map_err(|e| RegistrationError::EncodingFailed(e.to_string()))
    }

    pub fn mock_response_json(&self) -> Result<String, RegistrationError> {
        serde_json::to_string_pretty(&self.mock_response)
            .map_err(|e| RegistrationError::EncodingFailed(e.to_string()))
    }
}
