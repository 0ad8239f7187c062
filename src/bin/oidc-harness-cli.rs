//! OIDC registration harness command-line tool.
//!
//! Builds the same registration preview the web form shows, without a
//! browser, and can send the claims to a registration endpoint.
//!
//! ## Usage Examples
//!
//! ### Preview a registration
//! ```bash
//! oidc-harness-cli --format json-pretty preview \
//!   --sub user123 \
//!   --given-name John \
//!   --family-name Doe \
//!   --email john@example.com \
//!   --phone-number +15555555555 \
//!   --endpoint https://staging.testharness.com/register
//! ```
//!
//! ### Send a registration
//! ```bash
//! oidc-harness-cli register --sub user123 --given-name John --family-name Doe \
//!   --email john@example.com --phone-number +15555555555 --bearer mock_jwt_token
//! ```
//!
//! ### Decode a pseudo-JWT
//! ```bash
//! oidc-harness-cli decode eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.e30.mock_signature
//! ```
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error (network, configuration, encoding)
//! - 2: Validation failure or rejected request

use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use oidc_harness::{
    config::Config,
    errors::RegistrationError,
    registration::{
        ENDPOINTS, FieldErrors, RegistrationForm, RegistrationPayload, RegistrationPreview,
        decode_pseudo_jwt, validate,
    },
};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::{Value, json};
use std::process;
use thiserror::Error;

/// Main CLI application structure
#[derive(Parser)]
#[command(
    name = "oidc-harness-cli",
    about = "OIDC registration harness CLI",
    long_about = "Validate registration payloads, preview the pseudo-JWT, curl command and mock \
                  client credentials, and send registrations to a test endpoint.",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, help = "Enable verbose output for debugging")]
    verbose: bool,

    /// Output format
    #[arg(
        long,
        value_enum,
        default_value = "json",
        help = "Output format for responses"
    )]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    /// JSON formatted output
    Json,
    /// Pretty-printed JSON output
    JsonPretty,
    /// Human-readable table format
    Table,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a registration and print its preview
    Preview(PayloadArgs),
    /// Validate a registration and POST its claims to the endpoint
    Register(RegisterArgs),
    /// Decode a pseudo-JWT into its header and claims
    Decode(DecodeArgs),
    /// List the known registration endpoints
    Endpoints,
}

/// Registration fields, mirroring the web form
#[derive(Args)]
struct PayloadArgs {
    /// Registration endpoint URL
    #[arg(long, help = "Endpoint to send the registration to (defaults to local development)")]
    endpoint: Option<String>,

    #[arg(long, help = "Unique identifier for the user")]
    sub: Option<String>,

    #[arg(long)]
    given_name: Option<String>,

    #[arg(long)]
    family_name: Option<String>,

    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    email_verified: bool,

    #[arg(long, help = "Phone number in E.164 format (e.g., +15555555555)")]
    phone_number: Option<String>,

    #[arg(long)]
    phone_number_verified: bool,

    #[arg(long, help = "Issuer URL")]
    iss: Option<String>,

    #[arg(long, help = "Audience")]
    aud: Option<String>,

    #[arg(long, help = "Issued-at time in unix seconds (defaults to now)")]
    iat: Option<i64>,

    #[arg(long, help = "Expiry time in unix seconds (defaults to iat plus the token lifetime)")]
    exp: Option<i64>,
}

#[derive(Args)]
struct RegisterArgs {
    #[command(flatten)]
    payload: PayloadArgs,

    /// Bearer token sent in the Authorization header
    #[arg(long, help = "Bearer token for the Authorization header")]
    bearer: Option<String>,
}

#[derive(Args)]
struct DecodeArgs {
    /// Token to decode
    token: String,
}

impl From<&PayloadArgs> for RegistrationForm {
    fn from(args: &PayloadArgs) -> Self {
        RegistrationForm {
            sub: args.sub.clone(),
            given_name: args.given_name.clone(),
            family_name: args.family_name.clone(),
            email: args.email.clone(),
            email_verified: args.email_verified,
            phone_number: args.phone_number.clone(),
            phone_number_verified: args.phone_number_verified,
            iss: args.iss.clone(),
            aud: args.aud.clone(),
            iat: args.iat,
            exp: args.exp,
            endpoint: args.endpoint.clone(),
        }
    }
}

/// Application errors
#[derive(Debug, Error)]
enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(anyhow::Error),

    #[error("Invalid registration payload: {0}")]
    InvalidPayload(FieldErrors),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("Registration rejected with status {0}: {1}")]
    Rejected(StatusCode, String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::InvalidPayload(_) | AppError::Rejected(..) => 2,
            AppError::Registration(RegistrationError::EncodingFailed(_)) => 1,
            AppError::Registration(_) => 2,
            AppError::Network(_) | AppError::Json(_) | AppError::Config(_) => 1,
        }
    }
}

/// Main application entry point
#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Preview(args) => preview(&cli, args),
        Commands::Register(args) => register(&cli, args).await,
        Commands::Decode(args) => decode(&cli, args),
        Commands::Endpoints => output_response(&cli.format, &ENDPOINTS),
    };

    if let Err(err) = result {
        if let AppError::InvalidPayload(errors) = &err {
            eprintln!("Error: invalid registration payload");
            for (field, messages) in errors.iter() {
                for message in messages {
                    eprintln!("  {field}: {message}");
                }
            }
        } else {
            eprintln!("Error: {err}");
        }
        process::exit(err.exit_code());
    }
}

/// Validate the arguments against the configured defaults
fn validated_payload(
    cli: &Cli,
    args: &PayloadArgs,
) -> Result<(Config, RegistrationPayload), AppError> {
    let config = Config::new().map_err(AppError::Config)?;
    let form = RegistrationForm::from(args);

    if cli.verbose {
        eprintln!("Registration form: {}", serde_json::to_string_pretty(&form)?);
    }

    let payload = validate(&form, &config.registration_defaults(), Utc::now())
        .map_err(AppError::InvalidPayload)?;
    Ok((config, payload))
}

fn preview(cli: &Cli, args: &PayloadArgs) -> Result<(), AppError> {
    let (_, payload) = validated_payload(cli, args)?;
    let preview = RegistrationPreview::build(payload, None, Utc::now())?;
    output_response(&cli.format, &preview)
}

/// Send the claims, without the endpoint, to the endpoint
async fn register(cli: &Cli, args: &RegisterArgs) -> Result<(), AppError> {
    let (config, payload) = validated_payload(cli, &args.payload)?;

    if cli.verbose {
        eprintln!("Sending registration to {}", payload.endpoint);
    }

    let client = Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(*config.http_client_timeout.as_ref())
        .build()?;

    let mut request = client.post(&payload.endpoint).json(&payload.claims);
    if let Some(token) = &args.bearer {
        request = request.bearer_auth(token);
    }
    let response = request.send().await?;
    let status = response.status();

    if cli.verbose {
        eprintln!("Response status: {status}");
    }

    let body = response.text().await?;
    if !status.is_success() {
        return Err(AppError::Rejected(status, body));
    }

    let body = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));
    output_response(
        &cli.format,
        &json!({
            "status": status.as_u16(),
            "body": body,
        }),
    )
}

fn decode(cli: &Cli, args: &DecodeArgs) -> Result<(), AppError> {
    let (header, claims) = decode_pseudo_jwt(&args.token)?;
    output_response(
        &cli.format,
        &json!({
            "header": header,
            "claims": claims,
        }),
    )
}

/// Output response data in the requested format
fn output_response<T: Serialize>(format: &OutputFormat, data: &T) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(data)?);
        }
        OutputFormat::JsonPretty => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Table => {
            let json_value: Value = serde_json::to_value(data)?;
            print_table(&json_value, 0);
        }
    }
    Ok(())
}

/// Print data in table format (recursive for nested objects)
fn print_table(value: &Value, indent: usize) {
    let prefix = "  ".repeat(indent);

    match value {
        Value::Object(map) => {
            for (key, val) in map {
                match val {
                    Value::Object(_) => {
                        println!("{prefix}{key}:");
                        print_table(val, indent + 1);
                    }
                    Value::Array(arr) => {
                        println!("{prefix}{key}:");
                        for item in arr {
                            print_table(item, indent + 1);
                        }
                    }
                    Value::String(s) if s.contains('\n') => {
                        println!("{prefix}{key}:");
                        for line in s.lines() {
                            println!("{prefix}  {line}");
                        }
                    }
                    _ => {
                        println!("{prefix}{key}: {}", format_value(val));
                    }
                }
            }
        }
        Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                println!("{prefix}[{i}]:");
                print_table(item, indent + 1);
            }
        }
        _ => {
            println!("{prefix}{}", format_value(value));
        }
    }
}

/// Format a JSON value for display
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_else(|_| "invalid".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_for_validation_and_rejection() {
        assert_eq!(AppError::InvalidPayload(FieldErrors::new()).exit_code(), 2);
        assert_eq!(
            AppError::Rejected(StatusCode::CONFLICT, "duplicate".to_string()).exit_code(),
            2
        );
        assert_eq!(
            AppError::Registration(RegistrationError::MalformedToken("a.b".to_string()))
                .exit_code(),
            2
        );
    }

    #[test]
    fn test_exit_code_for_general_errors() {
        let network = Client::new().get("not a url").build().unwrap_err();
        assert_eq!(AppError::Network(network).exit_code(), 1);

        let json = serde_json::from_str::<Value>("{").unwrap_err();
        assert_eq!(AppError::Json(json).exit_code(), 1);

        assert_eq!(
            AppError::Config(anyhow::anyhow!("bad port")).exit_code(),
            1
        );
        assert_eq!(
            AppError::Registration(RegistrationError::EncodingFailed("claims".to_string()))
                .exit_code(),
            1
        );
    }
}
