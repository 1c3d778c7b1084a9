/// Input validation rules shared by both API surfaces.
///
/// The REST handlers and the GraphQL resolvers never restate these rules;
/// they call the same accumulators and get the same multi-entry payload.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::FieldError;

// Compile regex patterns once at startup
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    // This regex is hardcoded and validated - it is a compile-time constant in practice
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("hardcoded email regex is invalid - fix source code")
});

/// Validate email format (RFC 5322 simplified)
pub fn validate_email(email: &str) -> bool {
    !email.is_empty() && email.len() <= 254 && EMAIL_REGEX.is_match(email)
}

/// Account names need at least two characters after trimming.
pub fn validate_name(name: &str) -> bool {
    name.trim().chars().count() >= 2
}

/// Passwords: at least five characters, letters and digits only.
pub fn validate_password(password: &str) -> bool {
    let trimmed = password.trim();
    trimmed.chars().count() >= 5 && trimmed.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Post titles need at least five characters after trimming.
pub fn validate_title(title: &str) -> bool {
    title.trim().chars().count() >= 5
}

pub fn validate_content(content: &str) -> bool {
    !content.trim().is_empty()
}

pub fn validate_status(status: &str) -> bool {
    !status.trim().is_empty()
}

/// Accumulate sign-up violations, one entry per broken rule.
pub fn sign_up_errors(name: &str, email: &str, password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if !validate_name(name) {
        errors.push(FieldError::new(
            "name",
            "Name must contain at least 2 characters",
        ));
    }
    if !validate_email(email) {
        errors.push(FieldError::new("email", "Email is not valid"));
    }
    if !validate_password(password) {
        errors.push(FieldError::new(
            "password",
            "Password must contain only numbers and letters and at least 5 characters",
        ));
    }

    errors
}

/// Accumulate post-input violations, one entry per broken rule.
pub fn post_errors(title: &str, content: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if !validate_title(title) {
        errors.push(FieldError::new(
            "title",
            "Title must be at least 5 characters long",
        ));
    }
    if !validate_content(content) {
        errors.push(FieldError::new("content", "Content cannot be empty"));
    }

    errors
}
