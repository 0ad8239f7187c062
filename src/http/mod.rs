//! Axum HTTP server: router, handlers, and shared state.

pub mod context;
mod handler_api;
mod handler_federation;
mod handler_index;
mod handler_login;
mod handler_register;
mod handler_signup;
pub mod server;
mod utils_toast;

pub use context::{AppEngine, AppState, build_engine};
pub use server::build_router;
pub use utils_toast::{Toast, ToastVariant};
