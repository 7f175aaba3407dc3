//! Login and registration against the remote auth collaborator.
//!
//! The backend owns accounts and tokens; this module only checks input
//! before it is sent.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::PortfolioError;
use crate::repository::AuthProvider;
use crate::types::AuthSession;

pub const MIN_PASSWORD_LENGTH: usize = 8;
const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

pub fn is_valid_email(email: &str) -> bool {
    email_re().is_match(email.trim())
}

/// Password policy, one flag per rule so a form can show each individually.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordCriteria {
    pub min_length: bool,
    pub has_lowercase: bool,
    pub has_uppercase: bool,
    pub has_number: bool,
    pub has_special_char: bool,
}

impl PasswordCriteria {
    pub fn check(password: &str) -> Self {
        Self {
            min_length: password.chars().count() >= MIN_PASSWORD_LENGTH,
            has_lowercase: password.chars().any(|c| c.is_ascii_lowercase()),
            has_uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
            has_number: password.chars().any(|c| c.is_ascii_digit()),
            has_special_char: password.chars().any(|c| SPECIAL_CHARS.contains(c)),
        }
    }

    pub fn all_met(&self) -> bool {
        self.min_length
            && self.has_lowercase
            && self.has_uppercase
            && self.has_number
            && self.has_special_char
    }

    /// Human-readable descriptions of the rules not yet satisfied.
    pub fn unmet(&self) -> Vec<&'static str> {
        [
            (self.min_length, "at least 8 characters"),
            (self.has_lowercase, "a lowercase letter"),
            (self.has_uppercase, "an uppercase letter"),
            (self.has_number, "a number"),
            (self.has_special_char, "a special character (!@#$...)"),
        ]
        .into_iter()
        .filter(|(met, _)| !met)
        .map(|(_, text)| text)
        .collect()
    }
}

pub fn validate_login(email: &str, password: &str) -> Result<(), PortfolioError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(PortfolioError::Validation(
            "Email and password are required".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_registration(name: &str, email: &str, password: &str) -> Result<(), PortfolioError> {
    if name.trim().is_empty() {
        return Err(PortfolioError::Validation("Name is required".to_string()));
    }
    if !is_valid_email(email) {
        return Err(PortfolioError::Validation(format!(
            "Invalid email address: {}",
            email.trim()
        )));
    }
    let criteria = PasswordCriteria::check(password);
    if !criteria.all_met() {
        return Err(PortfolioError::Validation(format!(
            "Password must contain {}",
            criteria.unmet().join(", ")
        )));
    }
    Ok(())
}

pub async fn login(
    provider: &dyn AuthProvider,
    email: &str,
    password: &str,
) -> Result<AuthSession, PortfolioError> {
    validate_login(email, password)?;
    let session = provider.login(email.trim(), password).await?;
    log::info!("Logged in as {}", session.user.email);
    Ok(session)
}

pub async fn register(
    provider: &dyn AuthProvider,
    name: &str,
    email: &str,
    password: &str,
) -> Result<AuthSession, PortfolioError> {
    validate_registration(name, email, password)?;
    let session = provider.register(name.trim(), email.trim(), password).await?;
    log::info!("Registered {}", session.user.email);
    Ok(session)
}
