//! Application state shared by every handler.

use axum_template::engine::Engine;
use std::sync::Arc;

use crate::auth::SignupClient;
use crate::config::Config;

#[cfg(feature = "reload")]
use minijinja_autoreload::AutoReloader;

#[cfg(feature = "reload")]
/// Template engine with auto-reloading support for development.
pub type AppEngine = Engine<AutoReloader>;

#[cfg(feature = "embed")]
use minijinja::Environment;

#[cfg(feature = "embed")]
pub type AppEngine = Engine<Environment<'static>>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Template engine for rendering HTML responses.
    pub template_env: AppEngine,
    /// Client for the simple registration API
    pub signup_client: SignupClient,
}

impl AppState {
    pub fn new(config: Config, http_client: reqwest::Client, template_env: AppEngine) -> Self {
        let signup_client = SignupClient::new(http_client, config.signup_api_url.clone());
        Self {
            config: Arc::new(config),
            template_env,
            signup_client,
        }
    }
}

/// Build the template engine for the enabled template feature.
pub fn build_engine(config: &Config) -> AppEngine {
    #[cfg(feature = "embed")]
    {
        AppEngine::from(crate::templates::build_env(
            config.external_base.clone(),
            config.version.clone(),
        ))
    }

    #[cfg(feature = "reload")]
    {
        AppEngine::from(crate::templates::build_env(
            config.http_templates_path.clone(),
            config.external_base.clone(),
            config.version.clone(),
        ))
    }
}
