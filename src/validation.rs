use regex::Regex;
use std::sync::LazyLock;

use crate::models::{FieldError, LoginRequest, SignupRequest};

pub const LOGIN_MIN_PASSWORD_LEN: usize = 6;
pub const SIGNUP_MIN_PASSWORD_LEN: usize = 8;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Lowercased, trimmed email used for lookups and storage.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// validate_login
///
/// Checks the login form. At most one error per field; all fields are checked.
pub fn validate_login(req: &LoginRequest) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    // Checked as typed: surrounding whitespace fails the pattern.
    if req.email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !is_valid_email(&req.email) {
        errors.push(FieldError::new("email", "Please enter a valid email"));
    }

    if req.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    } else if req.password.chars().count() < LOGIN_MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 6 characters",
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// validate_signup
///
/// Checks the signup form, collecting every failing field.
pub fn validate_signup(req: &SignupRequest) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if req.first_name.trim().is_empty() {
        errors.push(FieldError::new("firstName", "First name is required"));
    }
    if req.last_name.trim().is_empty() {
        errors.push(FieldError::new("lastName", "Last name is required"));
    }

    // Blank counts as missing; otherwise the pattern sees the raw value.
    if req.email.trim().is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !is_valid_email(&req.email) {
        errors.push(FieldError::new("email", "Please enter a valid email address"));
    }

    if req.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    } else if req.password.chars().count() < SIGNUP_MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 8 characters",
        ));
    }

    if req.confirm_password.is_empty() {
        errors.push(FieldError::new(
            "confirmPassword",
            "Please confirm your password",
        ));
    } else if req.password != req.confirm_password {
        errors.push(FieldError::new("confirmPassword", "Passwords do not match"));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("ada@learnhub.dev"));
        assert!(!is_valid_email("ada@learnhub"));
        assert!(!is_valid_email("ada learnhub@x.io"));
        assert!(!is_valid_email("@x.io"));
    }

    #[test]
    fn login_requires_both_fields() {
        let errors = validate_login(&LoginRequest::default()).unwrap_err();
        assert_eq!(fields(&errors), vec!["email", "password"]);
        assert_eq!(errors[0].message, "Email is required");
        assert_eq!(errors[1].message, "Password is required");
    }

    #[test]
    fn login_checks_email_as_typed() {
        for email in ["   ", " ada@learnhub.dev", "ada@learnhub.dev "] {
            let req = LoginRequest {
                email: email.to_string(),
                password: "123456".to_string(),
            };
            let errors = validate_login(&req).unwrap_err();
            assert_eq!(errors, vec![FieldError::new("email", "Please enter a valid email")]);
        }
    }

    #[test]
    fn signup_blank_email_is_missing() {
        let req = SignupRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "   ".to_string(),
            password: "engine01".to_string(),
            confirm_password: "engine01".to_string(),
        };
        let errors = validate_signup(&req).unwrap_err();
        assert_eq!(errors, vec![FieldError::new("email", "Email is required")]);
    }

    #[test]
    fn login_rejects_short_password() {
        let req = LoginRequest {
            email: "ada@learnhub.dev".to_string(),
            password: "12345".to_string(),
        };
        let errors = validate_login(&req).unwrap_err();
        assert_eq!(errors, vec![FieldError::new("password", "Password must be at least 6 characters")]);
    }

    #[test]
    fn login_accepts_six_characters() {
        let req = LoginRequest {
            email: "ada@learnhub.dev".to_string(),
            password: "123456".to_string(),
        };
        assert!(validate_login(&req).is_ok());
    }

    #[test]
    fn signup_collects_every_error() {
        let req = SignupRequest {
            first_name: "  ".to_string(),
            last_name: String::new(),
            email: "nope".to_string(),
            password: "short".to_string(),
            confirm_password: "other".to_string(),
        };
        let errors = validate_signup(&req).unwrap_err();
        assert_eq!(
            fields(&errors),
            vec!["firstName", "lastName", "email", "password", "confirmPassword"]
        );
        assert_eq!(errors[4].message, "Passwords do not match");
    }

    #[test]
    fn signup_requires_confirmation() {
        let req = SignupRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@learnhub.dev".to_string(),
            password: "analytical".to_string(),
            confirm_password: String::new(),
        };
        let errors = validate_signup(&req).unwrap_err();
        assert_eq!(errors, vec![FieldError::new("confirmPassword", "Please confirm your password")]);
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Ada@LearnHub.dev "), "ada@learnhub.dev");
    }
}
