//! User-related DTOs.

use scribe_core::rules::not_blank;
use scribe_core::{User, UserId};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidationError};

/// Request to register a new account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    pub password_confirmation: String,
}

/// Request to log in.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Partial profile update. Absent or empty fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(custom(function = "blank_or_empty", message = "Name must not be blank"))]
    pub name: Option<String>,

    #[validate(custom(function = "email_or_empty", message = "Invalid email address"))]
    pub email: Option<String>,

    pub password: Option<String>,

    pub password_confirmation: Option<String>,
}

impl UpdateUserRequest {
    /// The new password, if one was given.
    #[must_use]
    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// The new email, if one was given.
    #[must_use]
    pub fn new_email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.is_empty())
    }

    /// The new display name, if one was given.
    #[must_use]
    pub fn new_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Checks that a new password comes with a non-empty, equal confirmation.
    #[must_use]
    pub fn confirmation_matches(&self) -> bool {
        match self.new_password() {
            None => true,
            Some(password) => self
                .password_confirmation
                .as_deref()
                .is_some_and(|confirmation| !confirmation.is_empty() && confirmation == password),
        }
    }
}

/// Empty means "unchanged"; whitespace alone is not a name.
fn blank_or_empty(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Ok(())
    } else {
        not_blank(value)
    }
}

fn email_or_empty(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

/// Public user projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Result of a successful register or login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Session token, also recorded in the session directory.
    pub token: String,
    pub user: UserResponse,
}
