pub mod admin;
pub mod auth;
pub mod availability;
pub mod booking;
pub mod catalog;
pub mod health;

use std::collections::HashMap;
use crate::error::AppError;

fn required_param<'a>(params: &'a HashMap<String, String>, key: &str) -> Result<&'a str, AppError> {
    params.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or(AppError::Validation(format!("Missing query parameter '{key}'")))
}
