//! Display strings for a registration: an unsigned JWT-shaped token and a curl command.
//!
//! The token carries no verifiable signature; its third segment is a fixed
//! placeholder.

use base64::Engine;
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use super::schema::IdentityClaims;
use crate::errors::RegistrationError;

/// Placeholder standing in for the signature segment
pub const MOCK_SIGNATURE: &str = "mock_signature";

/// Header object encoded as the first segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PseudoJwtHeader {
    pub alg: String,
    pub typ: String,
}

impl Default for PseudoJwtHeader {
    fn default() -> Self {
        Self {
            alg: "none".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Build `base64url(header).base64url(claims).MOCK_SIGNATURE`.
pub fn pseudo_jwt(claims: &IdentityClaims) -> Result<String, RegistrationError> {
    let header_encoded = BASE64_URL_SAFE_NO_PAD.encode(
        serde_json::to_string(&PseudoJwtHeader::default()).map_err(|e| {
            RegistrationError::EncodingFailed(format!("Failed to encode header: {}", e))
        })?,
    );

    let claims_encoded = BASE64_URL_SAFE_NO_PAD.encode(
        serde_json::to_string(claims).map_err(|e| {
            RegistrationError::EncodingFailed(format!("Failed to encode claims: {}", e))
        })?,
    );

    Ok(format!(
        "{}.{}.{}",
        header_encoded, claims_encoded, MOCK_SIGNATURE
    ))
}

/// Split a pseudo-JWT and decode its header and claims segments.
///
/// The signature segment is not inspected.
pub fn decode_pseudo_jwt(
    token: &str,
) -> Result<(PseudoJwtHeader, IdentityClaims), RegistrationError> {
    let mut segments = token.trim().split('.');
    let (Some(header), Some(claims), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(RegistrationError::MalformedToken(
            "expected three dot-separated segments".to_string(),
        ));
    };

    Ok((decode_segment(header)?, decode_segment(claims)?))
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, RegistrationError> {
    let bytes = BASE64_URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| RegistrationError::MalformedToken(format!("invalid base64: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| RegistrationError::MalformedToken(format!("invalid JSON: {}", e)))
}

/// Render a POST command line that sends `claims` as JSON to `endpoint`.
///
/// The body sits inside single quotes, so any single quote in it is written
/// as `'\''`. An endpoint with shell metacharacters is quoted the same way.
pub fn curl_command(
    endpoint: &str,
    claims: &IdentityClaims,
    bearer_token: Option<&str>,
) -> Result<String, RegistrationError> {
    let body = serde_json::to_string_pretty(claims).map_err(|e| {
        RegistrationError::EncodingFailed(format!("Failed to encode claims: {}", e))
    })?;

    let mut command = format!("curl -X POST {} \\\n", shell_word(endpoint));
    command.push_str("     -H \"Content-Type: application/json\" \\\n");
    if let Some(token) = bearer_token {
        command.push_str(&format!("     -H \"Authorization: Bearer {token}\" \\\n"));
    }
    command.push_str(&format!("     -d '{}'", shell_single_quote_escape(&body)));
    Ok(command)
}

fn shell_single_quote_escape(value: &str) -> String {
    value.replace('\'', r"'\''")
}

/// Leave plain URLs bare and single-quote anything the shell would reinterpret.
fn shell_word(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:%+,@~".contains(c));
    if plain {
        value.to_string()
    } else {
        format!("'{}'", shell_single_quote_escape(value))
    }
}
