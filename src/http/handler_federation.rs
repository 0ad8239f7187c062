//! Handles GET/POST /federation - Profile card and federation URL

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::IntoResponse,
};
use axum_template::RenderHtml;
use minijinja::context;
use serde::Deserialize;

use super::{context::AppState, utils_toast::Toast};
use crate::auth::{extract_session_token, federation_url, mock_user};
use crate::errors::Result;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FederationQuery {
    login: Option<String>,
}

pub async fn handle_federation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FederationQuery>,
) -> Result<impl IntoResponse> {
    let toast = (query.login.as_deref() == Some("success"))
        .then(|| Toast::success("Success", "Login successful!"));

    Ok(RenderHtml(
        "federation.html",
        state.template_env.clone(),
        context! {
            title => "Identity Federation",
            user => mock_user(),
            signed_in => extract_session_token(&headers).is_some(),
            toast => toast,
        },
    ))
}

/// Build the federation URL from the session token, which may be missing.
pub async fn handle_federate(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let token = extract_session_token(&headers);
    let url = federation_url(
        &state.config.federation_base,
        &state.config.federation_client_id,
        token.as_deref(),
    );

    tracing::info!(%url, "federation url generated");

    Ok(RenderHtml(
        "federation.html",
        state.template_env.clone(),
        context! {
            title => "Identity Federation",
            user => mock_user(),
            signed_in => token.is_some(),
            federation_url => url.as_str(),
            toast => Toast::success("Federation URL Generated", url.as_str()),
        },
    ))
}
