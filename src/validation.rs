//! Lead schema validation.
//!
//! A raw JSON payload is decoded into [`LeadCreate`] (the single typed schema)
//! and then checked against the constraints serde cannot express. The result
//! is either a [`Lead`] ready to be stored or a [`ValidationError`] naming the
//! offending field when it is known.

use crate::models::{Lead, LeadCreate};
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;

/// Fields that must be present and non-null.
pub const REQUIRED_FIELDS: [&str; 3] = ["full_name", "email", "user_intent"];

pub const MIN_OCCUPANTS: i64 = 1;
pub const MAX_OCCUPANTS: i64 = 50;

const MAX_EMAIL_LEN: usize = 254;
const MAX_LOCAL_PART_LEN: usize = 64;

// RFC 5322 simplified, Unicode letters allowed: local@label(.label)*.tld
// where the last label starts with a letter.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[\p{L}\p{N}.!#$%&'*+/=?^_`{|}~-]+@(?:[\p{L}\p{N}](?:[\p{L}\p{N}-]{0,61}[\p{L}\p{N}])?\.)+\p{L}(?:[\p{L}\p{N}-]{0,61}[\p{L}\p{N}])?$",
    )
    .expect("email regex compiles")
});

/// A payload that does not satisfy the lead schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Field the failure is attributed to, if it could be determined.
    pub field: Option<String>,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    fn missing(field: &str) -> Self {
        Self::new(field, "field required")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}: {}", field, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<serde_path_to_error::Error<serde_json::Error>> for ValidationError {
    /// Keeps the path of the value that failed to decode, e.g. `occupants` or
    /// `concerns[1]`.
    fn from(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = err.path().to_string();
        let field = (path != ".").then_some(path);
        Self {
            field,
            message: err.into_inner().to_string(),
        }
    }
}

/// Validates a raw submission and produces the lead to persist.
///
/// Pure: no I/O, no logging. `preferred_datetime` is checked for shape but is
/// not carried into the returned [`Lead`].
pub fn validate_lead(raw: Value) -> Result<Lead, ValidationError> {
    let Some(fields) = raw.as_object() else {
        return Err(ValidationError {
            field: None,
            message: "lead payload must be a JSON object".to_string(),
        });
    };

    for field in REQUIRED_FIELDS {
        if fields.get(field).map_or(true, Value::is_null) {
            return Err(ValidationError::missing(field));
        }
    }

    let create: LeadCreate = serde_path_to_error::deserialize(raw)?;
    validate_create(create)
}

/// Applies the value constraints to an already decoded submission.
pub fn validate_create(create: LeadCreate) -> Result<Lead, ValidationError> {
    if create.full_name.trim().is_empty() {
        return Err(ValidationError::new("full_name", "must not be empty"));
    }

    if !is_valid_email(&create.email) {
        return Err(ValidationError::new(
            "email",
            "value is not a valid email address",
        ));
    }

    let occupants = create.occupants.map(check_occupants).transpose()?;

    Ok(Lead {
        full_name: create.full_name,
        email: create.email,
        phone: create.phone,
        user_intent: create.user_intent,
        property_type: create.property_type,
        occupants,
        concerns: create.concerns,
        budget_range: create.budget_range,
        message: create.message,
        source: create.source,
    })
}

fn check_occupants(value: i64) -> Result<u8, ValidationError> {
    if !(MIN_OCCUPANTS..=MAX_OCCUPANTS).contains(&value) {
        return Err(ValidationError::new(
            "occupants",
            format!(
                "must be between {} and {}, got {}",
                MIN_OCCUPANTS, MAX_OCCUPANTS, value
            ),
        ));
    }
    // Bounded by MAX_OCCUPANTS above.
    u8::try_from(value).map_err(|_| ValidationError::new("occupants", "out of range"))
}

/// Checks an address against a simplified RFC 5322 grammar.
///
/// Requires a local part, an `@`, and a domain made of at least two
/// dot-separated labels, the last of which starts with a letter. Letters and
/// digits may be any Unicode letters and digits, so internationalized
/// addresses pass; no IDNA or normalization is applied.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN {
        return false;
    }

    let Some((local, _domain)) = email.rsplit_once('@') else {
        return false;
    };

    if local.is_empty()
        || local.len() > MAX_LOCAL_PART_LEN
        || local.starts_with('.')
        || local.ends_with('.')
        || local.contains("..")
    {
        return false;
    }

    EMAIL_REGEX.is_match(email)
}
