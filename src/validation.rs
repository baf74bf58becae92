//! Client-side form checks. A form with errors is never submitted.

use crate::error::AppError;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"\S+@\S+\.\S+").unwrap();
    static ref OTP: Regex = Regex::new(r"^\d{6}$").unwrap();
    static ref SPECIAL: Regex = Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#).unwrap();
}

pub const OTP_LENGTH: usize = 6;
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Name,
    Email,
    Password,
    ConfirmPassword,
    Terms,
    Otp,
    Title,
    Content,
}

/// Per-field error messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<Field, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(&mut self, field: Field, error: Option<&str>) {
        if let Some(message) = error {
            self.0.insert(field, message.to_string());
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.0.values().next().map(String::as_str)
    }

    /// `Ok` when nothing failed, otherwise the first message as a validation
    /// error.
    pub fn into_result(self) -> Result<(), AppError> {
        match self.first() {
            None => Ok(()),
            Some(message) => Err(AppError::Validation(message.to_string())),
        }
    }
}

pub fn name_error(name: &str) -> Option<&'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Some("Full name is required")
    } else if trimmed.chars().count() < 2 {
        Some("Name must be at least 2 characters")
    } else {
        None
    }
}

pub fn email_error(email: &str) -> Option<&'static str> {
    if email.is_empty() {
        Some("Email is required")
    } else if !EMAIL.is_match(email) {
        Some("Please enter a valid email")
    } else {
        None
    }
}

pub fn password_error(password: &str) -> Option<&'static str> {
    if password.is_empty() {
        Some("Password is required")
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        Some("Password must be at least 8 characters")
    } else if !(password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit()))
    {
        Some("Password must contain uppercase, lowercase, and number")
    } else {
        None
    }
}

pub fn confirm_error(password: &str, confirm: &str) -> Option<&'static str> {
    if confirm.is_empty() {
        Some("Please confirm your password")
    } else if password != confirm {
        Some("Passwords do not match")
    } else {
        None
    }
}

pub fn otp_error(otp: &str) -> Option<&'static str> {
    if otp.is_empty() {
        Some("OTP is required")
    } else if otp.chars().count() != OTP_LENGTH {
        Some("OTP must be 6 digits")
    } else if !OTP.is_match(otp) {
        Some("OTP must contain only numbers")
    } else {
        None
    }
}

pub fn validate_sign_in(email: &str, password: &str) -> FormErrors {
    let mut errors = FormErrors::new();
    errors.check(Field::Email, email_error(email));
    errors.check(
        Field::Password,
        password.is_empty().then_some("Password is required"),
    );
    errors
}

pub fn validate_sign_up(
    name: &str,
    email: &str,
    password: &str,
    confirm: &str,
    agreed_to_terms: bool,
) -> FormErrors {
    let mut errors = FormErrors::new();
    errors.check(Field::Name, name_error(name));
    errors.check(Field::Email, email_error(email));
    errors.check(Field::Password, password_error(password));
    errors.check(Field::ConfirmPassword, confirm_error(password, confirm));
    errors.check(
        Field::Terms,
        (!agreed_to_terms).then_some("You must agree to the terms and conditions"),
    );
    errors
}

pub fn validate_forgot_password(email: &str) -> FormErrors {
    let mut errors = FormErrors::new();
    errors.check(Field::Email, email_error(email));
    errors
}

pub fn validate_reset_password(otp: &str, password: &str, confirm: &str) -> FormErrors {
    let mut errors = FormErrors::new();
    errors.check(Field::Otp, otp_error(otp));
    errors.check(
        Field::Password,
        password_error(password).map(|m| match m {
            "Password is required" => "New password is required",
            other => other,
        }),
    );
    errors.check(Field::ConfirmPassword, confirm_error(password, confirm));
    errors
}

pub fn validate_note(title: &str, content: &str) -> FormErrors {
    let mut errors = FormErrors::new();
    errors.check(
        Field::Title,
        title.trim().is_empty().then_some("Title is required"),
    );
    errors.check(
        Field::Content,
        content.trim().is_empty().then_some("Content is required"),
    );
    errors
}

/// Password strength 0-5: one point each for length, lowercase, uppercase,
/// digit and a symbol.
pub fn password_strength(password: &str) -> u8 {
    if password.is_empty() {
        return 0;
    }
    [
        password.chars().count() >= MIN_PASSWORD_LEN,
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        SPECIAL.is_match(password),
    ]
    .iter()
    .filter(|passed| **passed)
    .count() as u8
}

pub fn strength_label(strength: u8) -> &'static str {
    match strength {
        1 => "Very Weak",
        2 => "Weak",
        3 => "Fair",
        4 => "Good",
        5 => "Strong",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_pattern() {
        assert_eq!(email_error(""), Some("Email is required"));
        assert_eq!(email_error("sam@example"), Some("Please enter a valid email"));
        assert_eq!(email_error("sam@example.com"), None);
    }

    #[test]
    fn test_password_rules() {
        assert_eq!(password_error("Ab1"), Some("Password must be at least 8 characters"));
        assert_eq!(
            password_error("alllowercase1"),
            Some("Password must contain uppercase, lowercase, and number")
        );
        assert_eq!(password_error("Secret123"), None);
    }

    #[test]
    fn test_sign_up_collects_every_field() {
        let errors = validate_sign_up(" ", "bad", "short", "", false);
        assert_eq!(errors.get(Field::Name), Some("Full name is required"));
        assert_eq!(errors.get(Field::Email), Some("Please enter a valid email"));
        assert!(errors.get(Field::Password).is_some());
        assert_eq!(errors.get(Field::ConfirmPassword), Some("Please confirm your password"));
        assert!(errors.get(Field::Terms).is_some());
        assert_eq!(errors.first(), Some("Full name is required"));
    }

    #[test]
    fn test_sign_up_valid() {
        let errors = validate_sign_up("Sam", "sam@example.com", "Secret123", "Secret123", true);
        assert!(errors.is_empty());
        assert!(errors.into_result().is_ok());
    }

    #[test]
    fn test_mismatched_confirmation() {
        let errors = validate_sign_up("Sam", "sam@example.com", "Secret123", "Secret124", true);
        assert_eq!(errors.get(Field::ConfirmPassword), Some("Passwords do not match"));
        assert!(matches!(errors.into_result(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_otp_rules() {
        assert_eq!(otp_error(""), Some("OTP is required"));
        assert_eq!(otp_error("12345"), Some("OTP must be 6 digits"));
        assert_eq!(otp_error("12a456"), Some("OTP must contain only numbers"));
        assert_eq!(otp_error("123456"), None);
    }

    #[test]
    fn test_reset_password_wording() {
        let errors = validate_reset_password("123456", "", "");
        assert_eq!(errors.get(Field::Password), Some("New password is required"));
    }

    #[test]
    fn test_note_requires_title_and_content() {
        let errors = validate_note("  ", "");
        assert_eq!(errors.get(Field::Title), Some("Title is required"));
        assert_eq!(errors.get(Field::Content), Some("Content is required"));
        assert!(validate_note("Cells", "# Mitosis").is_empty());
    }

    #[test]
    fn test_password_strength_levels() {
        assert_eq!(password_strength(""), 0);
        assert_eq!(strength_label(password_strength("")), "");
        assert_eq!(password_strength("abc"), 1);
        assert_eq!(strength_label(password_strength("abc")), "Very Weak");
        assert_eq!(password_strength("Secret123"), 4);
        assert_eq!(strength_label(password_strength("Secret123!")), "Strong");
    }
}
