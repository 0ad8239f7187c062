//! Registration endpoint choices and origin derivation.

use serde::Serialize;
use url::Url;

use crate::errors::RegistrationError;

/// Issuer applied when the form leaves `iss` empty
pub const DEFAULT_ISSUER: &str = "https://testharness.com";

/// Audience applied when the form leaves `aud` empty
pub const DEFAULT_AUDIENCE: &str = "trua_headless";

/// A selectable registration target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EndpointChoice {
    pub label: &'static str,
    pub value: &'static str,
}

/// The endpoints offered by the registration form, first is the default
pub const ENDPOINTS: [EndpointChoice; 3] = [
    EndpointChoice {
        label: "Local Development",
        value: "http://localhost:5000/register",
    },
    EndpointChoice {
        label: "Staging",
        value: "https://staging.testharness.com/register",
    },
    EndpointChoice {
        label: "Production",
        value: "https://testharness.com/register",
    },
];

pub fn default_endpoint() -> &'static str {
    ENDPOINTS[0].value
}

/// Look up a choice by its URL
pub fn find_choice(value: &str) -> Option<&'static EndpointChoice> {
    ENDPOINTS.iter().find(|choice| choice.value == value)
}

/// Serialized origin (`scheme://host[:port]`) of an endpoint URL.
pub fn endpoint_origin(endpoint: &str) -> Result<String, RegistrationError> {
    let url = Url::parse(endpoint)
        .map_err(|e| RegistrationError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(RegistrationError::InvalidEndpoint(format!(
            "{endpoint}: no origin"
        )));
    }
    Ok(origin.ascii_serialization())
}
