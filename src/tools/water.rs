//! Water Tools

use serde::Serialize;

use super::{canonical_date, validate_positive, DeleteResponse, ToolError, ToolResult};
use crate::db::Database;
use crate::models::WaterLog;

/// Water logged on one date
#[derive(Debug, Serialize)]
pub struct WaterDayResponse {
    pub date: String,
    pub logs: Vec<WaterLog>,
    pub total_ml: f64,
}

/// Response for add_water / remove_last_water
#[derive(Debug, Serialize)]
pub struct WaterChangeResponse {
    pub log: WaterLog,
    pub total_ml: f64,
}

pub fn add_water(db: &Database, date: &str, amount_ml: f64) -> ToolResult<WaterChangeResponse> {
    let date = canonical_date(date)?;
    let amount_ml = validate_positive("amount_ml", amount_ml)?;

    let (log, total_ml) = db.with_conn(|conn| {
        let log = WaterLog::create(conn, &date, amount_ml)?;
        let total = WaterLog::total_for_date(conn, &date)?;
        Ok((log, total))
    })?;
    Ok(WaterChangeResponse { log, total_ml })
}

pub fn get_water_by_date(db: &Database, date: &str) -> ToolResult<WaterDayResponse> {
    let date = canonical_date(date)?;
    let (logs, total_ml) = db.with_conn(|conn| {
        Ok((
            WaterLog::get_by_date(conn, &date)?,
            WaterLog::total_for_date(conn, &date)?,
        ))
    })?;
    Ok(WaterDayResponse {
        date,
        logs,
        total_ml,
    })
}

/// Undo the most recent water log of a date
pub fn remove_last_water(db: &Database, date: &str) -> ToolResult<WaterChangeResponse> {
    let date = canonical_date(date)?;
    let removed = db.with_conn(|conn| {
        let Some(last) = WaterLog::last_for_date(conn, &date)? else {
            return Ok(None);
        };
        WaterLog::delete(conn, last.id)?;
        Ok(Some((last, WaterLog::total_for_date(conn, &date)?)))
    })?;

    match removed {
        Some((log, total_ml)) => Ok(WaterChangeResponse { log, total_ml }),
        None => Err(ToolError::invalid(format!("No water logged on {}", date))),
    }
}

pub fn delete_water(db: &Database, id: i64) -> ToolResult<DeleteResponse> {
    if !db.with_conn(|conn| WaterLog::delete(conn, id))? {
        return Err(ToolError::not_found("Water log", id));
    }
    Ok(DeleteResponse {
        success: true,
        deleted_id: id,
    })
}
