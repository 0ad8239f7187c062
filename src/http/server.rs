//! Main router configuration assembling the page and API routes.

use axum::{
    Router,
    http::{Method, header},
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::{
    context::AppState,
    handler_api::{endpoints_handler, preview_registration_handler},
    handler_federation::{handle_federate, handle_federation},
    handler_index::handle_index,
    handler_login::{handle_login_form, handle_login_submit, handle_logout},
    handler_register::{handle_register_form, handle_register_submit},
    handler_signup::{handle_signup_form, handle_signup_submit},
};

/// Build the application router
pub fn build_router(ctx: AppState) -> Router {
    // JSON API is open to browser clients on other origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    let api_routes = Router::new()
        .route(
            "/registration/preview",
            post(preview_registration_handler),
        )
        .route("/endpoints", get(endpoints_handler))
        .layer(cors);

    Router::new()
        .route("/", get(handle_index))
        .route(
            "/register",
            get(handle_register_form).post(handle_register_submit),
        )
        .route("/signup", get(handle_signup_form).post(handle_signup_submit))
        .route("/login", get(handle_login_form).post(handle_login_submit))
        .route("/logout", post(handle_logout))
        .route(
            "/federation",
            get(handle_federation).post(handle_federate),
        )
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new(&ctx.config.http_static_path))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
