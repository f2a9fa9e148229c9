//! Application operations
//!
//! Validation and orchestration between callers (the MCP server, the
//! maintenance binary) and the storage/nutrition layers. Every operation
//! takes its database handle explicitly.

pub mod foods;
pub mod meals;
pub mod recipes;
pub mod reports;
pub mod settings;
pub mod status;
pub mod water;
pub mod weight;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::db::DbError;

/// Tool operation errors
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    Invalid(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("Database error: {0}")]
    Db(#[from] DbError),
}

impl ToolError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ToolError::Invalid(msg.into())
    }

    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        ToolError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<rusqlite::Error> for ToolError {
    fn from(e: rusqlite::Error) -> Self {
        ToolError::Db(DbError::Sqlite(e))
    }
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Response for delete operations
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Require an ISO `YYYY-MM-DD` date
pub fn validate_date(date: &str) -> ToolResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| ToolError::invalid(format!("Invalid date '{}', expected YYYY-MM-DD", date)))
}

/// Validate a date and return it zero-padded, the form every dated row is
/// stored and looked up in
pub fn canonical_date(date: &str) -> ToolResult<String> {
    Ok(validate_date(date)?.format("%Y-%m-%d").to_string())
}

/// Require a non-empty name, returning it trimmed
pub fn validate_name<'a>(field: &str, value: &'a str) -> ToolResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ToolError::invalid(format!("{} cannot be empty", field)));
    }
    Ok(trimmed)
}

/// Require a finite number that is zero or more
pub fn validate_non_negative(field: &str, value: f64) -> ToolResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(ToolError::invalid(format!(
            "{} must be a number >= 0 (got {})",
            field, value
        )));
    }
    Ok(value)
}

/// Require a finite number greater than zero
pub fn validate_positive(field: &str, value: f64) -> ToolResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ToolError::invalid(format!(
            "{} must be greater than 0 (got {})",
            field, value
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_date() {
        assert_eq!(
            validate_date("2025-02-28").unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert!(validate_date("2025-02-30").is_err());
        assert!(validate_date("28/02/2025").is_err());
        assert!(validate_date("").is_err());
    }

    #[test]
    fn test_canonical_date_pads_and_trims() {
        assert_eq!(canonical_date("2025-3-1").unwrap(), "2025-03-01");
        assert_eq!(canonical_date(" 2025-03-01 ").unwrap(), "2025-03-01");
        assert_eq!(canonical_date("2025-10-01").unwrap(), "2025-10-01");
        assert!(canonical_date("2025-3-32").is_err());
    }

    #[test]
    fn test_validate_numbers() {
        assert!(validate_non_negative("quantity", 0.0).is_ok());
        assert!(validate_non_negative("quantity", -1.0).is_err());
        assert!(validate_non_negative("quantity", f64::NAN).is_err());
        assert!(validate_positive("amount", 0.0).is_err());
        assert!(validate_positive("amount", f64::INFINITY).is_err());
        assert_eq!(validate_positive("amount", 250.0).unwrap(), 250.0);
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("name", "  Bolo  ").unwrap(), "Bolo");
        let err = validate_name("name", "   ").unwrap_err();
        assert_eq!(err.to_string(), "name cannot be empty");
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(ToolError::not_found("Food", 7).to_string(), "Food 7 not found");
    }
}
