//! Handles GET/POST /login and POST /logout - Mock login backed by a session cookie

use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use axum_template::RenderHtml;
use minijinja::context;

use super::{context::AppState, utils_toast::Toast};
use crate::auth::{LoginCredentials, clear_session_cookie, mock_login, session_cookie};
use crate::errors::{HttpError, Result};

pub async fn handle_login_form(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(RenderHtml(
        "login.html",
        state.template_env.clone(),
        context! {
            title => "Login",
        },
    ))
}

/// Set the session cookie and continue to the federation page.
pub async fn handle_login_submit(
    State(state): State<AppState>,
    Form(credentials): Form<LoginCredentials>,
) -> Result<Response> {
    let response = match mock_login(&credentials) {
        Ok(response) => response,
        Err(err) => {
            tracing::debug!(error = %err, "login rejected");
            return Ok((
                StatusCode::UNAUTHORIZED,
                RenderHtml(
                    "login.html",
                    state.template_env.clone(),
                    context! {
                        title => "Login",
                        email => credentials.email,
                        toast => Toast::error("Invalid credentials"),
                    },
                ),
            )
                .into_response());
        }
    };

    let cookie = session_cookie(&response.token, *state.config.session_cookie_secure.as_ref())
        .map_err(|e| HttpError::RequestProcessingFailed(e.to_string()))?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    Ok((headers, Redirect::to("/federation?login=success")).into_response())
}

/// Clear the session cookie and return to the login page.
pub async fn handle_logout(State(state): State<AppState>) -> Result<Response> {
    let cookie = clear_session_cookie(*state.config.session_cookie_secure.as_ref())
        .map_err(|e| HttpError::RequestProcessingFailed(e.to_string()))?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    Ok((headers, Redirect::to("/login")).into_response())
}
