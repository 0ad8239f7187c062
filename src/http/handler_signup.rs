//! Handles GET/POST /signup - Simple registration posted to the register API

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_template::RenderHtml;
use minijinja::context;

use super::{context::AppState, utils_toast::Toast};
use crate::auth::SignupForm;
use crate::auth::signup::{SIGNUP_FAILURE_MESSAGE, SIGNUP_SUCCESS_MESSAGE};
use crate::errors::Result;
use crate::registration::FieldErrors;

pub async fn handle_signup_form(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(RenderHtml(
        "signup.html",
        state.template_env.clone(),
        context! {
            title => "Register",
            form => SignupForm::default(),
            errors => FieldErrors::new(),
        },
    ))
}

pub async fn handle_signup_submit(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    let request = match form.validate() {
        Ok(request) => request,
        Err(errors) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                RenderHtml(
                    "signup.html",
                    state.template_env.clone(),
                    context! {
                        title => "Register",
                        form => form,
                        errors => errors,
                    },
                ),
            )
                .into_response());
        }
    };

    let toast = match state.signup_client.send(&request).await {
        Ok(()) => Toast::success("Success", SIGNUP_SUCCESS_MESSAGE),
        Err(err) => {
            tracing::error!(error = ?err, url = %state.signup_client.url(), "simple registration failed");
            Toast::error(SIGNUP_FAILURE_MESSAGE)
        }
    };

    Ok(RenderHtml(
        "signup.html",
        state.template_env.clone(),
        context! {
            title => "Register",
            form => form,
            errors => FieldErrors::new(),
            toast => toast,
        },
    )
    .into_response())
}
