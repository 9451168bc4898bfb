//! Form bodies and their validation.
//!
//! Every field defaults to an empty string so a partial form still parses;
//! `validate` then decides whether the required fields are present.

use crate::store::{FeedbackRecord, normalize_identifier};
use serde::Deserialize;
use std::fmt;
use utoipa::ToSchema;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Email and password after validation. The email is normalized.
#[derive(PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    fn validate(email: &str, password: String) -> Result<Self, FormError> {
        let email = normalize_identifier(email);
        if email.is_empty() {
            return Err(FormError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(FormError::MissingField("password"));
        }
        Ok(Self { email, password })
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub role: String,
}

impl fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupForm")
            .field("email", &self.email)
            .field("password", &"***")
            .field("role", &self.role)
            .finish()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Signup {
    pub credentials: Credentials,
    /// Raw role; empty means the store default.
    pub role: String,
}

impl SignupForm {
    /// # Errors
    /// Returns [`FormError::MissingField`] if email or password is empty.
    pub fn validate(self) -> Result<Signup, FormError> {
        Ok(Signup {
            credentials: Credentials::validate(&self.email, self.password)?,
            role: self.role.trim().to_string(),
        })
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl LoginForm {
    /// # Errors
    /// Returns [`FormError::MissingField`] if email or password is empty.
    pub fn validate(self) -> Result<Credentials, FormError> {
        Credentials::validate(&self.email, self.password)
    }
}

/// Feedback has no required fields.
#[derive(ToSchema, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FeedbackForm {
    pub name: String,
    pub email: String,
    pub role: String,
    pub rating: String,
    pub message: String,
}

impl FeedbackForm {
    #[must_use]
    pub fn into_record(self) -> FeedbackRecord {
        FeedbackRecord::new(
            &self.name,
            &self.email,
            &self.role,
            &self.rating,
            &self.message,
        )
    }
}
