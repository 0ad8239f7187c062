//! JSON API for registration previews and endpoint choices

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;

use super::context::AppState;
use crate::auth::extract_session_token;
use crate::errors::Result;
use crate::registration::{ENDPOINTS, RegistrationForm, RegistrationPreview, validate};

/// Handle POST /api/registration/preview
///
/// A bearer header or session cookie becomes the curl command's bearer token.
pub async fn preview_registration_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<RegistrationForm>,
) -> Result<Response> {
    let now = Utc::now();
    let payload = match validate(&form, &state.config.registration_defaults(), now) {
        Ok(payload) => payload,
        Err(errors) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_payload",
                    "error_description": errors.to_string(),
                    "fields": errors,
                })),
            )
                .into_response());
        }
    };

    let bearer_token = extract_session_token(&headers);
    let preview = RegistrationPreview::build(payload, bearer_token.as_deref(), now)?;
    Ok(Json(preview).into_response())
}

/// Handle GET /api/endpoints
pub async fn endpoints_handler() -> impl IntoResponse {
    Json(ENDPOINTS)
}
