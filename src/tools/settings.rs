//! Settings Tools

use serde::Serialize;

use super::{validate_positive, ToolResult};
use crate::db::Database;
use crate::models::Setting;

/// Response for get_calorie_goal / set_calorie_goal
#[derive(Debug, Serialize)]
pub struct CalorieGoalResponse {
    pub calorie_goal: f64,
    /// False when the configured default is in effect
    pub is_custom: bool,
}

/// Stored goal, else `default_goal`
pub fn get_calorie_goal(db: &Database, default_goal: f64) -> ToolResult<CalorieGoalResponse> {
    let stored = db.with_conn(Setting::calorie_goal)?;
    Ok(match stored {
        Some(goal) => CalorieGoalResponse {
            calorie_goal: goal,
            is_custom: true,
        },
        None => CalorieGoalResponse {
            calorie_goal: default_goal,
            is_custom: false,
        },
    })
}

pub fn set_calorie_goal(db: &Database, goal: f64) -> ToolResult<CalorieGoalResponse> {
    let goal = validate_positive("calorie_goal", goal)?;
    db.with_conn(|conn| Setting::set_calorie_goal(conn, goal))?;
    tracing::info!(goal, "Calorie goal updated");
    Ok(CalorieGoalResponse {
        calorie_goal: goal,
        is_custom: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_defaults_then_stored() {
        let db = Database::in_memory().unwrap();
        let initial = get_calorie_goal(&db, 2000.0).unwrap();
        assert_eq!(initial.calorie_goal, 2000.0);
        assert!(!initial.is_custom);

        set_calorie_goal(&db, 1800.0).unwrap();
        let stored = get_calorie_goal(&db, 2000.0).unwrap();
        assert_eq!(stored.calorie_goal, 1800.0);
        assert!(stored.is_custom);
    }

    #[test]
    fn test_goal_must_be_positive() {
        let db = Database::in_memory().unwrap();
        assert!(set_calorie_goal(&db, 0.0).is_err());
        assert!(set_calorie_goal(&db, -100.0).is_err());
        assert!(!get_calorie_goal(&db, 2000.0).unwrap().is_custom);
    }
}
