use regex::Regex;
use std::sync::LazyLock;

use crate::error::AppError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// `#RRGGBB`, either case.
pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR_RE.is_match(value)
}

/// Collects every field error of a request before rejecting it.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(format!("{field} is required"));
        }
        self
    }

    /// Length in characters, inclusive bounds.
    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        let len = value.chars().count();
        if len < min {
            self.errors
                .push(format!("{field} must be at least {min} characters"));
        } else if len > max {
            self.errors
                .push(format!("{field} must be at most {max} characters"));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.is_empty() && !is_valid_email(value) {
            self.errors.push(format!("{field} is not a valid email address"));
        }
        self
    }

    pub fn hex_color(&mut self, field: &str, value: &str) -> &mut Self {
        if !is_hex_color(value) {
            self.errors.push(format!("{field} must be in #RRGGBB format"));
        }
        self
    }

    pub fn check(&mut self, condition: bool, message: &str) -> &mut Self {
        if !condition {
            self.errors.push(message.to_string());
        }
        self
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn finish(&mut self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}
