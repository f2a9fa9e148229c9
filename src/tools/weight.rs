//! Weight Tools

use serde::Serialize;

use super::{canonical_date, validate_positive, DeleteResponse, ToolError, ToolResult};
use crate::db::Database;
use crate::models::WeightEntry;

/// Response for list_weights
#[derive(Debug, Serialize)]
pub struct WeightHistoryResponse {
    pub entries: Vec<WeightEntry>,
    pub latest_kg: Option<f64>,
    /// Latest minus earliest reading
    pub change_kg: Option<f64>,
}

pub fn add_weight(db: &Database, date: &str, kg: f64) -> ToolResult<WeightEntry> {
    let date = canonical_date(date)?;
    let kg = validate_positive("kg", kg)?;
    Ok(db.with_conn(|conn| WeightEntry::create(conn, &date, kg))?)
}

/// All readings, oldest first
pub fn list_weights(db: &Database) -> ToolResult<WeightHistoryResponse> {
    let entries = db.with_conn(WeightEntry::list_all)?;
    let latest_kg = entries.last().map(|e| e.kg);
    let change_kg = match (entries.first(), entries.last()) {
        (Some(first), Some(last)) if entries.len() > 1 => Some(last.kg - first.kg),
        _ => None,
    };
    Ok(WeightHistoryResponse {
        entries,
        latest_kg,
        change_kg,
    })
}

pub fn delete_weight(db: &Database, id: i64) -> ToolResult<DeleteResponse> {
    if !db.with_conn(|conn| WeightEntry::delete(conn, id))? {
        return Err(ToolError::not_found("Weight entry", id));
    }
    Ok(DeleteResponse {
        success: true,
        deleted_id: id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_sorted_with_change() {
        let db = Database::in_memory().unwrap();
        add_weight(&db, "2025-03-10", 80.5).unwrap();
        add_weight(&db, "2025-03-01", 82.0).unwrap();

        let history = list_weights(&db).unwrap();
        assert_eq!(history.entries[0].date, "2025-03-01");
        assert_eq!(history.latest_kg, Some(80.5));
        assert!((history.change_kg.unwrap() - -1.5).abs() < 1e-9);
    }

    #[test]
    fn test_unpadded_dates_sort_chronologically() {
        let db = Database::in_memory().unwrap();
        add_weight(&db, "2025-10-01", 80.0).unwrap();
        add_weight(&db, "2025-3-1", 82.0).unwrap();

        let history = list_weights(&db).unwrap();
        assert_eq!(history.entries[0].date, "2025-03-01");
        assert_eq!(history.latest_kg, Some(80.0));
    }

    #[test]
    fn test_single_reading_has_no_change() {
        let db = Database::in_memory().unwrap();
        assert!(list_weights(&db).unwrap().latest_kg.is_none());
        add_weight(&db, "2025-03-01", 82.0).unwrap();
        assert!(list_weights(&db).unwrap().change_kg.is_none());
    }

    #[test]
    fn test_rejects_bad_input_and_deletes() {
        let db = Database::in_memory().unwrap();
        assert!(add_weight(&db, "2025-03-01", 0.0).is_err());
        assert!(add_weight(&db, "01-03-2025", 80.0).is_err());

        let entry = add_weight(&db, "2025-03-01", 80.0).unwrap();
        assert!(delete_weight(&db, entry.id).is_ok());
        assert!(matches!(delete_weight(&db, entry.id), Err(ToolError::NotFound { .. })));
    }
}
