use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 8;

/// Registration form as submitted by a visitor.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Collect every problem with a registration; empty means it may be persisted.
pub fn validate(reg: &Registration) -> Vec<String> {
    let mut problems = Vec::new();

    if reg.username.chars().count() < MIN_USERNAME_LEN {
        problems.push(format!(
            "Username must be at least {} characters long",
            MIN_USERNAME_LEN
        ));
    }
    if !is_valid_email(&reg.email) {
        problems.push("Enter a valid email address".to_string());
    }
    if !is_valid_password(&reg.password) {
        problems.push(format!(
            "Password must be at least {} characters and contain an uppercase letter and a digit",
            MIN_PASSWORD_LEN
        ));
    }
    if reg.password != reg.confirm_password {
        problems.push("Passwords do not match".to_string());
    }

    problems
}

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").expect("email pattern compiles")
});

/// `local@domain.tld`: word characters, dots and hyphens on both sides of a
/// single `@`, and a domain whose last label is made of word characters only.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().any(char::is_uppercase)
        && password.chars().any(|c| c.is_ascii_digit())
}
