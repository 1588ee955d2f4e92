//! User account rules: registration input, password policy, age limit.

use std::sync::LazyLock;

use chrono::{Months, NaiveDate, Utc};
use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::CoreError;
use crate::roles::{validate_registration_role, validate_status};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const MIN_PASSWORD_LEN: usize = 12;
pub const MIN_AGE_YEARS: u32 = 18;

static HAS_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]").expect("valid regex"));
static HAS_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d").expect("valid regex"));
static HAS_SYMBOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9\s]").expect("valid regex"));

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Registration payload as submitted by the client.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Registration {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub role: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[validate(custom(function = "validate_adult"))]
    pub birthday: NaiveDate,
    #[validate(custom(function = "validate_password_policy"))]
    pub password: String,
}

fn default_status() -> String {
    crate::roles::STATUS_ACTIVE.to_string()
}

impl Registration {
    /// Run every field rule and return the first failure as a [`CoreError`].
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate().map_err(validation_error)?;
        validate_name(&self.name)?;
        validate_registration_role(&self.role)?;
        validate_status(&self.status)?;
        Ok(())
    }
}

/// Profile update payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}

impl ProfileUpdate {
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate().map_err(validation_error)?;
        validate_name(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Field rules
// ---------------------------------------------------------------------------

/// Names must contain something besides whitespace.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Name must not be blank".into()));
    }
    Ok(())
}

/// At least [`MIN_PASSWORD_LEN`] characters with a letter, a digit and a symbol.
pub fn check_password_policy(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        ));
    }
    if !HAS_LETTER.is_match(password) {
        return Err("Password must contain a letter".into());
    }
    if !HAS_DIGIT.is_match(password) {
        return Err("Password must contain a digit".into());
    }
    if !HAS_SYMBOL.is_match(password) {
        return Err("Password must contain a symbol".into());
    }
    Ok(())
}

/// `true` when someone born on `birthday` is at least [`MIN_AGE_YEARS`] on `today`.
pub fn is_adult(birthday: NaiveDate, today: NaiveDate) -> bool {
    today
        .checked_sub_months(Months::new(MIN_AGE_YEARS * 12))
        .is_some_and(|cutoff| birthday <= cutoff)
}

fn validate_adult(birthday: &NaiveDate) -> Result<(), ValidationError> {
    if is_adult(*birthday, Utc::now().date_naive()) {
        Ok(())
    } else {
        Err(ValidationError::new("underage")
            .with_message(format!("User must be at least {MIN_AGE_YEARS} years old").into()))
    }
}

fn validate_password_policy(password: &str) -> Result<(), ValidationError> {
    check_password_policy(password)
        .map_err(|msg| ValidationError::new("password_policy").with_message(msg.into()))
}

/// Flatten validator output into a single readable message.
pub fn validation_error(errors: ValidationErrors) -> CoreError {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{field}: {msg}"),
                None => format!("{field}: invalid ({})", e.code),
            })
        })
        .collect();
    parts.sort();
    CoreError::Validation(parts.join("; "))
}
