//! Simple registration: a five-field form posted as JSON to a register API.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::SignupError;
use crate::registration::schema::{
    Field, FieldErrors, REQUIRED_MESSAGE, check_email,
};

/// Minimum name length, in characters
pub const MIN_SIGNUP_NAME_LENGTH: usize = 2;

/// Minimum password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

pub const SIGNUP_SUCCESS_MESSAGE: &str = "Registration successful! Please login.";
pub const SIGNUP_FAILURE_MESSAGE: &str = "Registration failed. Please try again.";

/// Raw signup input
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupForm {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
}

/// Validated body sent to the register API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
}

impl SignupForm {
    /// Check every field and return the request body or all collected errors.
    pub fn validate(&self) -> Result<SignupRequest, FieldErrors> {
        let mut errors = FieldErrors::new();

        let given_name = check_min_length(
            &mut errors,
            Field::GivenName,
            self.given_name.as_deref(),
            MIN_SIGNUP_NAME_LENGTH,
        );
        let family_name = check_min_length(
            &mut errors,
            Field::FamilyName,
            self.family_name.as_deref(),
            MIN_SIGNUP_NAME_LENGTH,
        );
        let email = check_email(&mut errors, Field::Email, present(self.email.as_deref()));
        let password = check_min_length(
            &mut errors,
            Field::Password,
            self.password.as_deref(),
            MIN_PASSWORD_LENGTH,
        );
        let phone_number = match present(self.phone_number.as_deref()) {
            Some(value) => value,
            None => {
                errors.add(Field::PhoneNumber, REQUIRED_MESSAGE);
                ""
            }
        };

        errors.into_result(|| SignupRequest {
            given_name: given_name.to_string(),
            family_name: family_name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            phone_number: phone_number.to_string(),
        })
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

fn check_min_length<'a>(
    errors: &mut FieldErrors,
    field: Field,
    value: Option<&'a str>,
    min: usize,
) -> &'a str {
    let Some(value) = present(value) else {
        errors.add(field, REQUIRED_MESSAGE);
        return "";
    };
    if value.chars().count() < min {
        errors.add(field, format!("String must contain at least {min} character(s)"));
    }
    value
}

/// Posts signup requests to the configured register API.
#[derive(Clone)]
pub struct SignupClient {
    http_client: Client,
    url: Url,
}

impl SignupClient {
    pub fn new(http_client: Client, url: Url) -> Self {
        Self { http_client, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Validate the form and POST it. Any non-2xx answer is a rejection.
    pub async fn submit(&self, form: &SignupForm) -> Result<(), SignupError> {
        let request = form.validate().map_err(SignupError::InvalidForm)?;
        self.send(&request).await
    }

    pub async fn send(&self, request: &SignupRequest) -> Result<(), SignupError> {
        let response = self
            .http_client
            .post(self.url.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %self.url, %status, "registration rejected");
            return Err(SignupError::Rejected(status));
        }

        tracing::info!(url = %self.url, %status, "registration accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::post};
    use tokio::net::TcpListener;

    fn valid_form() -> SignupForm {
        SignupForm {
            given_name: Some("John".to_string()),
            family_name: Some("Doe".to_string()),
            email: Some("john@example.com".to_string()),
            password: Some("password123".to_string()),
            phone_number: Some("+15555555555".to_string()),
        }
    }

    async fn spawn_register_api(status: StatusCode) -> Url {
        let app = Router::new().route(
            "/api/register",
            post(move |Json(body): Json<SignupRequest>| async move {
                assert_eq!(body.email, "john@example.com");
                status
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/api/register")).unwrap()
    }

    #[test]
    fn test_validate_accepts_valid_form() {
        let request = valid_form().validate().unwrap();
        assert_eq!(request.given_name, "John");
        assert_eq!(request.password, "password123");

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["phoneNumber"], "+15555555555");
        assert_eq!(value["familyName"], "Doe");
    }

    #[test]
    fn test_validate_collects_every_error() {
        let form = SignupForm {
            given_name: Some("J".to_string()),
            family_name: None,
            email: Some("john@".to_string()),
            password: Some("short".to_string()),
            phone_number: Some(String::new()),
        };
        let errors = form.validate().unwrap_err();

        assert_eq!(
            errors.get(Field::GivenName).unwrap(),
            ["String must contain at least 2 character(s)"]
        );
        assert_eq!(errors.get(Field::FamilyName).unwrap(), [REQUIRED_MESSAGE]);
        assert_eq!(errors.get(Field::Email).unwrap(), ["Invalid email"]);
        assert_eq!(
            errors.get(Field::Password).unwrap(),
            ["String must contain at least 8 character(s)"]
        );
        assert_eq!(errors.get(Field::PhoneNumber).unwrap(), [REQUIRED_MESSAGE]);
    }

    #[tokio::test]
    async fn test_submit_success() {
        let url = spawn_register_api(StatusCode::CREATED).await;
        let client = SignupClient::new(Client::new(), url);
        client.submit(&valid_form()).await.unwrap();
    }

    #[tokio::test]
    async fn test_submit_rejected() {
        let url = spawn_register_api(StatusCode::CONFLICT).await;
        let client = SignupClient::new(Client::new(), url);
        let result = client.submit(&valid_form()).await;
        assert!(matches!(
            result,
            Err(SignupError::Rejected(StatusCode::CONFLICT))
        ));
    }

    #[tokio::test]
    async fn test_submit_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{addr}/api/register")).unwrap();
        let client = SignupClient::new(Client::new(), url);
        let result = client.submit(&valid_form()).await;
        assert!(matches!(result, Err(SignupError::RequestFailed(_))));
    }

    #[tokio::test]
    async fn test_submit_invalid_form_sends_nothing() {
        let url = Url::parse("http://127.0.0.1:9/api/register").unwrap();
        let client = SignupClient::new(Client::new(), url);
        let result = client.submit(&SignupForm::default()).await;
        assert!(matches!(result, Err(SignupError::InvalidForm(_))));
    }
}
