//! Form checks run before any request is sent.
//!
//! The API client does not enforce these; they mirror what the sign-in and
//! upload screens refuse to submit.

use thiserror::Error;

/// Number of digits in an emailed verification code
pub const VERIFICATION_CODE_LEN: usize = 6;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Email and password are required.")]
    MissingCredentials,

    #[error("Username and display name are required.")]
    MissingProfile,

    #[error("Enter the 6-digit code from your email.")]
    InvalidCode,

    #[error("Title is required.")]
    MissingTitle,
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.is_empty() || password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok(())
}

pub fn validate_registration(
    email: &str,
    password: &str,
    username: &str,
    display_name: &str,
) -> Result<(), ValidationError> {
    validate_login(email, password)?;
    if username.is_empty() || display_name.is_empty() {
        return Err(ValidationError::MissingProfile);
    }
    Ok(())
}

pub fn validate_verification_code(code: &str) -> Result<(), ValidationError> {
    if code.len() == VERIFICATION_CODE_LEN && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidCode)
    }
}

pub fn validate_upload(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::MissingTitle);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_login() {
        assert!(validate_login("a@b.c", "pw").is_ok());
        assert_eq!(validate_login("", "pw"), Err(ValidationError::MissingCredentials));
        assert_eq!(validate_login("a@b.c", ""), Err(ValidationError::MissingCredentials));
    }

    #[test]
    fn test_validate_registration() {
        assert!(validate_registration("a@b.c", "pw", "neon", "Neon").is_ok());
        assert_eq!(
            validate_registration("", "pw", "neon", "Neon"),
            Err(ValidationError::MissingCredentials)
        );
        assert_eq!(
            validate_registration("a@b.c", "pw", "neon", ""),
            Err(ValidationError::MissingProfile)
        );
    }

    #[test]
    fn test_validate_verification_code() {
        assert!(validate_verification_code("012345").is_ok());
        assert!(validate_verification_code("12345").is_err());
        assert!(validate_verification_code("1234567").is_err());
        assert!(validate_verification_code("12a456").is_err());
        assert!(validate_verification_code("١٢٣٤٥٦").is_err()); // non-ASCII digits
    }

    #[test]
    fn test_validate_upload() {
        assert!(validate_upload("Night Drive").is_ok());
        assert_eq!(validate_upload("   "), Err(ValidationError::MissingTitle));
    }
}
