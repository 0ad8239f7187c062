//! Handles GET/POST /register - OIDC registration form and display panels

use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use axum_template::RenderHtml;
use chrono::Utc;
use minijinja::context;

use super::{context::AppState, utils_toast::Toast};
use crate::auth::extract_session_token;
use crate::errors::Result;
use crate::registration::{
    ENDPOINTS, FieldErrors, RegistrationForm, RegistrationPreview, validate,
};

pub async fn handle_register_form(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let defaults = state.config.registration_defaults();
    Ok(RenderHtml(
        "register.html",
        state.template_env.clone(),
        context! {
            title => "Register Client",
            endpoints => ENDPOINTS,
            form => RegistrationForm::prefilled(&defaults),
            errors => FieldErrors::new(),
        },
    ))
}

/// Validate the submission and render the panels, or the form with inline errors.
///
/// A session token, when present, is shown as the curl command's bearer.
pub async fn handle_register_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RegistrationForm>,
) -> Result<Response> {
    let now = Utc::now();
    let defaults = state.config.registration_defaults();

    let payload = match validate(&form, &defaults, now) {
        Ok(payload) => payload,
        Err(errors) => {
            tracing::debug!(%errors, "registration form rejected");
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                RenderHtml(
                    "register.html",
                    state.template_env.clone(),
                    context! {
                        title => "Register Client",
                        endpoints => ENDPOINTS,
                        form => form,
                        errors => errors,
                    },
                ),
            )
                .into_response());
        }
    };

    let bearer_token = extract_session_token(&headers);
    let preview = RegistrationPreview::build(payload, bearer_token.as_deref(), now)?;
    let payload_json = preview.payload_json()?;
    let mock_response_json = preview.mock_response_json()?;

    tracing::info!(
        sub = %preview.payload.claims.sub,
        endpoint = %preview.payload.endpoint,
        "registration submitted"
    );

    Ok(RenderHtml(
        "register.html",
        state.template_env.clone(),
        context! {
            title => "Register Client",
            endpoints => ENDPOINTS,
            form => form,
            errors => FieldErrors::new(),
            preview => preview,
            payload_json => payload_json,
            mock_response_json => mock_response_json,
            toast => Toast::success(
                "Registration Submitted",
                "Your registration details have been received.",
            ),
        },
    )
    .into_response())
}
