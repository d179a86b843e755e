//! Request body validation. Each failed rule contributes one message; the
//! whole list is returned to the client as a 400.

use crate::error::ApiError;

pub trait Validate {
    fn validate(&self) -> Vec<String>;

    fn validated(self) -> Result<Self, ApiError>
    where
        Self: Sized,
    {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ApiError::validation(errors))
        }
    }
}

pub(crate) fn check_length(errors: &mut Vec<String>, field: &str, value: &str, min: usize, max: usize) {
    let len = value.chars().count();
    if len < min || len > max {
        errors.push(format!("{} must be between {} and {} characters", field, min, max));
    }
}

pub(crate) fn check_range(errors: &mut Vec<String>, field: &str, value: i32, min: i32, max: i32) {
    if value < min || value > max {
        errors.push(format!("{} must be between {} and {}", field, min, max));
    }
}

pub(crate) fn check_email(errors: &mut Vec<String>, field: &str, value: &str) {
    check_length(errors, field, value, 6, 60);
    let well_formed = match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if !well_formed {
        errors.push(format!("{} must be an email address", field));
    }
}
