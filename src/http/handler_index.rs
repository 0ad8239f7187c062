//! Handles GET / - Renders the page index

use axum::{extract::State, response::IntoResponse};
use axum_template::RenderHtml;
use minijinja::context;

use super::context::AppState;
use crate::errors::Result;

/// Handle requests to the index page
pub async fn handle_index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(RenderHtml(
        "index.html",
        state.template_env.clone(),
        context! {
            title => "OIDC Registration Harness",
        },
    ))
}
