//! OIDC registration harness library crate.
//!
//! Validates registration payloads, fabricates mock client credentials, and
//! formats the pseudo-JWT and curl command shown for a submission. Also
//! carries the mock login, federation, and simple registration flows served
//! by the HTTP front end.

pub mod auth;
pub mod config;
pub mod errors;
pub mod http;
pub mod registration;
pub mod templates;
