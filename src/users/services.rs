use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

const MAX_PASSWORD_BYTES: usize = 1024;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn validate_password(password: &str) -> Result<(), AppError> {
    if password.is_empty() {
        return Err(AppError::BadRequest("Password is required".into()));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::BadRequest("Password too long".into()));
    }
    Ok(())
}

/// Normalizes the email and checks both fields. Returns the normalized email.
pub(crate) fn validate_registration(email: &str, password: &str) -> Result<String, AppError> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(AppError::BadRequest("Invalid email".into()));
    }
    validate_password(password)?;
    Ok(email)
}
