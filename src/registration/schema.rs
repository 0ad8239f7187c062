//! Registration form schema and field validation.
//!
//! Binds raw form input to the registration payload rules: bounded names,
//! email and E.164 phone syntax, absolute URLs, and defaulted flags and
//! timestamps. Validation is all-or-nothing; a payload only exists once every
//! field has passed.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;
use url::Url;

use super::endpoints::{DEFAULT_AUDIENCE, DEFAULT_ISSUER, default_endpoint};

/// Minimum length of subject and name fields, in characters
pub const MIN_NAME_LENGTH: usize = 2;

/// Maximum length of subject and name fields, in characters
pub const MAX_NAME_LENGTH: usize = 50;

/// Default lifetime added to `iat` when `exp` is not supplied
pub const DEFAULT_TOKEN_LIFETIME_SECONDS: i64 = 3600;

pub const REQUIRED_MESSAGE: &str = "Required";
pub const INVALID_EMAIL_MESSAGE: &str = "Invalid email";
pub const INVALID_URL_MESSAGE: &str = "Invalid url";
pub const TIMESTAMP_RANGE_MESSAGE: &str = "Timestamp out of range";
pub const PHONE_FORMAT_MESSAGE: &str =
    "Phone number must be in E.164 format (e.g., +15555555555)";

static E164_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^\+[1-9][0-9]{1,14}$"));

static EMAIL_PATTERN: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+\-]@(?:[A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$")
});

/// Check a phone number against E.164: `+`, a non-zero first digit, 2 to 15 digits.
pub fn is_e164(value: &str) -> bool {
    E164_PATTERN
        .as_ref()
        .is_ok_and(|pattern| pattern.is_match(value))
}

/// Check an email address against standard `local@domain.tld` syntax.
pub fn is_email(value: &str) -> bool {
    if value.starts_with('.') || value.contains("..") {
        return false;
    }
    EMAIL_PATTERN
        .as_ref()
        .is_ok_and(|pattern| pattern.is_match(value))
}

/// Form fields that can carry validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Sub,
    GivenName,
    FamilyName,
    Email,
    Password,
    PhoneNumber,
    Iss,
    Aud,
    Iat,
    Endpoint,
}

impl Field {
    /// Wire name of the field, as used by forms and JSON bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Sub => "sub",
            Field::GivenName => "givenName",
            Field::FamilyName => "familyName",
            Field::Email => "email",
            Field::Password => "password",
            Field::PhoneNumber => "phoneNumber",
            Field::Iss => "iss",
            Field::Aud => "aud",
            Field::Iat => "iat",
            Field::Endpoint => "endpoint",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-keyed validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    /// Messages recorded for a field, if any
    pub fn get(&self, field: Field) -> Option<&[String]> {
        self.0.get(&field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one message
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &[String])> {
        self.0.iter().map(|(field, messages)| (*field, messages.as_slice()))
    }

    /// `Ok(value)` when nothing was recorded, otherwise the collected errors
    pub(crate) fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Values applied when the corresponding form field is absent or empty.
#[derive(Debug, Clone)]
pub struct RegistrationDefaults {
    pub issuer: String,
    pub audience: String,
    pub endpoint: String,
    pub token_lifetime: chrono::Duration,
}

impl Default for RegistrationDefaults {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            endpoint: default_endpoint().to_string(),
            token_lifetime: chrono::Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECONDS),
        }
    }
}

/// Raw, unvalidated registration input as submitted by a form or JSON body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationForm {
    pub sub: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub email: Option<String>,
    #[serde(deserialize_with = "deserialize_flag")]
    pub email_verified: bool,
    pub phone_number: Option<String>,
    #[serde(deserialize_with = "deserialize_flag")]
    pub phone_number_verified: bool,
    pub iss: Option<String>,
    pub aud: Option<String>,
    pub iat: Option<i64>,
    pub exp: Option<i64>,
    pub endpoint: Option<String>,
}

impl RegistrationForm {
    /// An empty form with the defaulted fields filled in, for first render
    pub fn prefilled(defaults: &RegistrationDefaults) -> Self {
        Self {
            iss: Some(defaults.issuer.clone()),
            aud: Some(defaults.audience.clone()),
            endpoint: Some(defaults.endpoint.clone()),
            ..Default::default()
        }
    }
}

/// Identity claims of a validated registration; the payload minus its endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityClaims {
    pub sub: String,
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    pub email_verified: bool,
    pub phone_number: String,
    pub phone_number_verified: bool,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// A registration payload that passed every field rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationPayload {
    #[serde(flatten)]
    pub claims: IdentityClaims,
    pub endpoint: String,
}

/// Validate a candidate registration.
///
/// Every field is checked before returning so that the caller gets the full
/// set of messages at once. `now` seeds the `iat` default.
pub fn validate(
    form: &RegistrationForm,
    defaults: &RegistrationDefaults,
    now: DateTime<Utc>,
) -> Result<RegistrationPayload, FieldErrors> {
    let mut errors = FieldErrors::new();

    let sub = check_bounded_text(&mut errors, Field::Sub, form.sub.as_deref());
    let given_name = check_bounded_text(&mut errors, Field::GivenName, form.given_name.as_deref());
    let family_name =
        check_bounded_text(&mut errors, Field::FamilyName, form.family_name.as_deref());
    let email = check_email(&mut errors, Field::Email, form.email.as_deref());
    let phone_number = check_phone(&mut errors, Field::PhoneNumber, form.phone_number.as_deref());

    let iss = non_empty(form.iss.as_deref()).unwrap_or(&defaults.issuer);
    if Url::parse(iss).is_err() {
        errors.add(Field::Iss, INVALID_URL_MESSAGE);
    }

    let aud = non_empty(form.aud.as_deref()).unwrap_or(&defaults.audience);
    if aud.is_empty() {
        errors.add(Field::Aud, REQUIRED_MESSAGE);
    }

    let endpoint = non_empty(form.endpoint.as_deref()).unwrap_or(&defaults.endpoint);
    if !is_http_url(endpoint) {
        errors.add(Field::Endpoint, INVALID_URL_MESSAGE);
    }

    let iat = form.iat.unwrap_or_else(|| now.timestamp());
    let exp = match form.exp {
        Some(exp) => exp,
        None => iat
            .checked_add(defaults.token_lifetime.num_seconds())
            .unwrap_or_else(|| {
                errors.add(Field::Iat, TIMESTAMP_RANGE_MESSAGE);
                0
            }),
    };

    errors.into_result(|| RegistrationPayload {
        claims: IdentityClaims {
            sub: sub.to_string(),
            given_name: given_name.to_string(),
            family_name: family_name.to_string(),
            email: email.to_string(),
            email_verified: form.email_verified,
            phone_number: phone_number.to_string(),
            phone_number_verified: form.phone_number_verified,
            iss: iss.to_string(),
            aud: aud.to_string(),
            iat,
            exp,
        },
        endpoint: endpoint.to_string(),
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

fn is_http_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

/// Required text of 2 to 50 characters. Returns the value, or "" after recording an error.
pub(crate) fn check_bounded_text<'a>(
    errors: &mut FieldErrors,
    field: Field,
    value: Option<&'a str>,
) -> &'a str {
    let Some(value) = value else {
        errors.add(field, REQUIRED_MESSAGE);
        return "";
    };
    let length = value.chars().count();
    if length < MIN_NAME_LENGTH {
        errors.add(
            field,
            format!("String must contain at least {MIN_NAME_LENGTH} character(s)"),
        );
    } else if length > MAX_NAME_LENGTH {
        errors.add(
            field,
            format!("String must contain at most {MAX_NAME_LENGTH} character(s)"),
        );
    }
    value
}

pub(crate) fn check_email<'a>(
    errors: &mut FieldErrors,
    field: Field,
    value: Option<&'a str>,
) -> &'a str {
    match value {
        None => {
            errors.add(field, REQUIRED_MESSAGE);
            ""
        }
        Some(value) => {
            if !is_email(value) {
                errors.add(field, INVALID_EMAIL_MESSAGE);
            }
            value
        }
    }
}

pub(crate) fn check_phone<'a>(
    errors: &mut FieldErrors,
    field: Field,
    value: Option<&'a str>,
) -> &'a str {
    match value {
        None => {
            errors.add(field, REQUIRED_MESSAGE);
            ""
        }
        Some(value) => {
            if !is_e164(value) {
                errors.add(field, PHONE_FORMAT_MESSAGE);
            }
            value
        }
    }
}

/// Deserialize a checkbox: JSON booleans, or `on`/`true`/`1`/`yes` from forms.
pub(crate) fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(false),
        Some(Flag::Bool(value)) => Ok(value),
        Some(Flag::Text(text)) => match text.to_ascii_lowercase().as_str() {
            "on" | "true" | "1" | "yes" => Ok(true),
            "" | "off" | "false" | "0" | "no" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "invalid boolean '{other}'"
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn valid_form() -> RegistrationForm {
        RegistrationForm {
            sub: Some("user123".to_string()),
            given_name: Some("John".to_string()),
            family_name: Some("Doe".to_string()),
            email: Some("john@example.com".to_string()),
            phone_number: Some("+15555555555".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_e164_accepts_valid_numbers() {
        for phone in ["+12", "+15555555555", "+442071838750", "+123456789012345"] {
            assert!(is_e164(phone), "{phone} should be accepted");
        }
    }

    #[test]
    fn test_e164_rejects_invalid_numbers() {
        for phone in [
            "",
            "+",
            "+1",
            "5555555555",
            "+05555555555",
            "+1234567890123456",
            "+1 555 555 5555",
            "++15555555555",
            "+1555555555a",
            "+1555\u{0661}",
            " +15555555555",
        ] {
            assert!(!is_e164(phone), "{phone:?} should be rejected");
        }
    }

    #[test]
    fn test_e164_exhaustive_digit_counts() {
        for first in 0..=9u8 {
            for rest in 0..=16usize {
                let phone = format!("+{first}{}", "7".repeat(rest));
                let total = rest + 1;
                let expected = first != 0 && (2..=15).contains(&total);
                assert_eq!(is_e164(&phone), expected, "{phone}");
            }
        }
    }

    #[test]
    fn test_email_syntax() {
        assert!(is_email("john@example.com"));
        assert!(is_email("first.last+tag@sub.example.co.uk"));
        assert!(!is_email("john"));
        assert!(!is_email("john@example"));
        assert!(!is_email("@example.com"));
        assert!(!is_email(".john@example.com"));
        assert!(!is_email("jo..hn@example.com"));
        assert!(!is_email("john@exa mple.com"));
    }

    #[test]
    fn test_validate_applies_defaults() {
        let defaults = RegistrationDefaults::default();
        let payload = validate(&valid_form(), &defaults, fixed_now()).unwrap();

        assert_eq!(payload.claims.sub, "user123");
        assert_eq!(payload.claims.iss, "https://testharness.com");
        assert_eq!(payload.claims.aud, "trua_headless");
        assert_eq!(payload.endpoint, "http://localhost:5000/register");
        assert!(!payload.claims.email_verified);
        assert!(!payload.claims.phone_number_verified);
        assert_eq!(payload.claims.iat, fixed_now().timestamp());
        assert_eq!(payload.claims.exp, fixed_now().timestamp() + 3600);
    }

    #[test]
    fn test_validate_keeps_supplied_timestamps() {
        let form = RegistrationForm {
            iat: Some(1_000),
            exp: Some(5_000),
            ..valid_form()
        };
        let payload = validate(&form, &RegistrationDefaults::default(), fixed_now()).unwrap();
        assert_eq!(payload.claims.iat, 1_000);
        assert_eq!(payload.claims.exp, 5_000);

        let form = RegistrationForm {
            iat: Some(1_000),
            ..valid_form()
        };
        let payload = validate(&form, &RegistrationDefaults::default(), fixed_now()).unwrap();
        assert_eq!(payload.claims.exp, 4_600);
    }

    #[test]
    fn test_validate_rejects_iat_without_room_for_lifetime() {
        let form = RegistrationForm {
            iat: Some(i64::MAX),
            ..valid_form()
        };
        let errors = validate(&form, &RegistrationDefaults::default(), fixed_now()).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::Iat).unwrap(), [TIMESTAMP_RANGE_MESSAGE]);

        let form = RegistrationForm {
            iat: Some(i64::MAX),
            exp: Some(i64::MAX),
            ..valid_form()
        };
        let payload = validate(&form, &RegistrationDefaults::default(), fixed_now()).unwrap();
        assert_eq!(payload.claims.iat, i64::MAX);
    }

    #[test]
    fn test_validate_rejects_phone_without_plus() {
        let form = RegistrationForm {
            phone_number: Some("5555555555".to_string()),
            ..valid_form()
        };
        let errors = validate(&form, &RegistrationDefaults::default(), fixed_now()).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(Field::PhoneNumber),
            Some(&[PHONE_FORMAT_MESSAGE.to_string()][..])
        );
    }

    #[test]
    fn test_validate_collects_every_error() {
        let form = RegistrationForm {
            sub: Some("u".to_string()),
            given_name: Some("x".repeat(51)),
            family_name: None,
            email: Some("not-an-email".to_string()),
            phone_number: Some("+0123".to_string()),
            iss: Some("not a url".to_string()),
            endpoint: Some("ftp://example.com/register".to_string()),
            ..Default::default()
        };
        let errors = validate(&form, &RegistrationDefaults::default(), fixed_now()).unwrap_err();

        assert_eq!(
            errors.get(Field::Sub),
            Some(&["String must contain at least 2 character(s)".to_string()][..])
        );
        assert_eq!(
            errors.get(Field::GivenName),
            Some(&["String must contain at most 50 character(s)".to_string()][..])
        );
        assert_eq!(
            errors.get(Field::FamilyName),
            Some(&[REQUIRED_MESSAGE.to_string()][..])
        );
        assert!(errors.contains(Field::Email));
        assert!(errors.contains(Field::PhoneNumber));
        assert!(errors.contains(Field::Iss));
        assert!(errors.contains(Field::Endpoint));
        assert!(!errors.contains(Field::Aud));
    }

    #[test]
    fn test_name_length_counts_characters() {
        let form = RegistrationForm {
            given_name: Some("Zoë".to_string()),
            family_name: Some("é".repeat(50)),
            ..valid_form()
        };
        assert!(validate(&form, &RegistrationDefaults::default(), fixed_now()).is_ok());
    }

    #[test]
    fn test_empty_defaulted_fields_fall_back() {
        let form = RegistrationForm {
            iss: Some(String::new()),
            aud: Some(String::new()),
            endpoint: Some(String::new()),
            ..valid_form()
        };
        let payload = validate(&form, &RegistrationDefaults::default(), fixed_now()).unwrap();
        assert_eq!(payload.claims.iss, DEFAULT_ISSUER);
        assert_eq!(payload.claims.aud, DEFAULT_AUDIENCE);
        assert_eq!(payload.endpoint, default_endpoint());
    }

    #[test]
    fn test_form_deserializes_json_booleans() {
        let form: RegistrationForm = serde_json::from_value(serde_json::json!({
            "sub": "user123",
            "emailVerified": true,
            "phoneNumberVerified": null
        }))
        .unwrap();
        assert_eq!(form.sub.as_deref(), Some("user123"));
        assert!(form.email_verified);
        assert!(!form.phone_number_verified);
    }

    #[test]
    fn test_form_deserializes_checkbox_strings() {
        let form: RegistrationForm = serde_json::from_value(serde_json::json!({
            "emailVerified": "on",
            "phoneNumberVerified": "off"
        }))
        .unwrap();
        assert!(form.email_verified);
        assert!(!form.phone_number_verified);

        let invalid = serde_json::from_value::<RegistrationForm>(serde_json::json!({
            "emailVerified": "maybe"
        }));
        assert!(invalid.is_err());
    }

    #[test]
    fn test_payload_serializes_flat_with_endpoint() {
        let payload = validate(&valid_form(), &RegistrationDefaults::default(), fixed_now()).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["givenName"], "John");
        assert_eq!(value["phoneNumberVerified"], false);
        assert_eq!(value["endpoint"], "http://localhost:5000/register");
        assert!(value.get("claims").is_none());
    }

    #[test]
    fn test_field_errors_display() {
        let mut errors = FieldErrors::new();
        errors.add(Field::Email, INVALID_EMAIL_MESSAGE);
        errors.add(Field::Sub, REQUIRED_MESSAGE);
        assert_eq!(errors.to_string(), "sub: Required; email: Invalid email");

        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(value["email"][0], "Invalid email");
    }
}
