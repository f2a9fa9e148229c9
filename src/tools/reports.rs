//! Report Tools
//!
//! Daily dashboard summary and calorie history over a period.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{canonical_date, ToolResult};
use crate::db::Database;
use crate::models::{DailyCalories, Meal, Setting, WaterLog, WeightEntry};
use crate::nutrition::round_to_tenth;

/// Everything logged on one date against the calorie goal
#[derive(Debug, Serialize)]
pub struct DailySummary {
    pub date: String,
    pub calorie_goal: f64,
    pub consumed: f64,
    /// Goal minus consumed; negative once the goal is exceeded
    pub remaining: f64,
    /// Share of the goal consumed, capped at 100
    pub percentage: f64,
    pub meal_count: usize,
    pub water_ml: f64,
    pub weight_kg: Option<f64>,
}

/// History window, counted back from today inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportPeriod {
    #[serde(rename = "7")]
    Week,
    #[serde(rename = "30")]
    Month,
    #[serde(rename = "all")]
    All,
}

impl ReportPeriod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "7" => Some(ReportPeriod::Week),
            "30" => Some(ReportPeriod::Month),
            "all" => Some(ReportPeriod::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPeriod::Week => "7",
            ReportPeriod::Month => "30",
            ReportPeriod::All => "all",
        }
    }

    /// First date included, or `None` for no lower bound
    pub fn cutoff(&self, today: NaiveDate) -> Option<NaiveDate> {
        let back = match self {
            ReportPeriod::Week => 6,
            ReportPeriod::Month => 29,
            ReportPeriod::All => return None,
        };
        today.checked_sub_days(Days::new(back))
    }
}

/// Response for calorie_history
#[derive(Debug, Serialize)]
pub struct CalorieHistory {
    pub period: ReportPeriod,
    pub calorie_goal: f64,
    /// Logged days only, ascending
    pub days: Vec<DailyCalories>,
    /// Mean over logged days, rounded to whole kcal
    pub average: f64,
    /// Days with something logged that stayed within the goal
    pub days_on_goal: usize,
    pub days_over_goal: usize,
}

fn effective_goal(db: &Database, default_goal: f64) -> ToolResult<f64> {
    Ok(db.with_conn(Setting::calorie_goal)?.unwrap_or(default_goal))
}

pub fn daily_summary(db: &Database, date: &str, default_goal: f64) -> ToolResult<DailySummary> {
    let date = canonical_date(date)?;
    let calorie_goal = effective_goal(db, default_goal)?;

    let (meals, water_ml, weight) = db.with_conn(|conn| {
        Ok((
            Meal::get_by_date(conn, &date)?,
            WaterLog::total_for_date(conn, &date)?,
            WeightEntry::get_by_date(conn, &date)?,
        ))
    })?;

    let consumed = meals.iter().fold(0.0, |sum, m| sum + m.calories);
    let percentage = if calorie_goal > 0.0 {
        round_to_tenth((consumed / calorie_goal * 100.0).min(100.0))
    } else {
        0.0
    };

    Ok(DailySummary {
        date,
        calorie_goal,
        consumed,
        remaining: calorie_goal - consumed,
        percentage,
        meal_count: meals.len(),
        water_ml,
        weight_kg: weight.map(|w| w.kg),
    })
}

pub fn calorie_history(
    db: &Database,
    period: ReportPeriod,
    today: NaiveDate,
    default_goal: f64,
) -> ToolResult<CalorieHistory> {
    let calorie_goal = effective_goal(db, default_goal)?;
    let cutoff = period.cutoff(today).map(|d| d.format("%Y-%m-%d").to_string());

    let days: Vec<DailyCalories> = db
        .with_conn(Meal::daily_calorie_totals)?
        .into_iter()
        .filter(|day| cutoff.as_deref().map_or(true, |c| day.date.as_str() >= c))
        .collect();

    let average = if days.is_empty() {
        0.0
    } else {
        (days.iter().map(|d| d.calories).sum::<f64>() / days.len() as f64).round()
    };
    let days_on_goal = days
        .iter()
        .filter(|d| d.calories > 0.0 && d.calories <= calorie_goal)
        .count();
    let days_over_goal = days.iter().filter(|d| d.calories > calorie_goal).count();

    Ok(CalorieHistory {
        period,
        calorie_goal,
        days,
        average,
        days_on_goal,
        days_over_goal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{meals, settings, water, weight};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_daily_summary() {
        let db = Database::in_memory().unwrap();
        meals::log_meal(&db, "2025-03-01", "Café", Some(400.0), &[]).unwrap();
        meals::log_meal(&db, "2025-03-01", "Almoço", Some(800.0), &[]).unwrap();
        water::add_water(&db, "2025-03-01", 500.0).unwrap();
        weight::add_weight(&db, "2025-03-01", 81.2).unwrap();

        let summary = daily_summary(&db, "2025-03-01", 2000.0).unwrap();
        assert_eq!(summary.consumed, 1200.0);
        assert_eq!(summary.remaining, 800.0);
        assert_eq!(summary.percentage, 60.0);
        assert_eq!(summary.meal_count, 2);
        assert_eq!(summary.water_ml, 500.0);
        assert_eq!(summary.weight_kg, Some(81.2));

        let empty = daily_summary(&db, "2025-03-02", 2000.0).unwrap();
        assert_eq!(empty.consumed, 0.0);
        assert!(empty.consumed.is_sign_positive());
        assert!(empty.weight_kg.is_none());
    }

    #[test]
    fn test_daily_summary_caps_percentage() {
        let db = Database::in_memory().unwrap();
        settings::set_calorie_goal(&db, 1500.0).unwrap();
        meals::log_meal(&db, "2025-03-01", "Rodízio", Some(2100.0), &[]).unwrap();

        let summary = daily_summary(&db, "2025-03-01", 2000.0).unwrap();
        assert_eq!(summary.calorie_goal, 1500.0);
        assert_eq!(summary.percentage, 100.0);
        assert_eq!(summary.remaining, -600.0);
    }

    #[test]
    fn test_period_cutoff() {
        let today = date("2025-03-10");
        assert_eq!(ReportPeriod::Week.cutoff(today), Some(date("2025-03-04")));
        assert_eq!(ReportPeriod::Month.cutoff(today), Some(date("2025-02-09")));
        assert_eq!(ReportPeriod::All.cutoff(today), None);
        assert_eq!(ReportPeriod::parse("ALL"), Some(ReportPeriod::All));
        assert_eq!(ReportPeriod::parse("14"), None);
    }

    #[test]
    fn test_calorie_history() {
        let db = Database::in_memory().unwrap();
        for (day, calories) in [
            ("2025-01-15", 3000.0),
            ("2025-03-03", 1800.0),
            ("2025-03-04", 2500.0),
            ("2025-03-10", 1500.0),
        ] {
            meals::log_meal(&db, day, "Dia", Some(calories), &[]).unwrap();
        }
        meals::log_meal(&db, "2025-03-10", "Lanche", Some(100.0), &[]).unwrap();
        let today = date("2025-03-10");

        let week = calorie_history(&db, ReportPeriod::Week, today, 2000.0).unwrap();
        let dates: Vec<&str> = week.days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-03-04", "2025-03-10"]);
        assert_eq!(week.days[1].calories, 1600.0);
        assert_eq!(week.average, 2050.0);
        assert_eq!(week.days_on_goal, 1);
        assert_eq!(week.days_over_goal, 1);

        let all = calorie_history(&db, ReportPeriod::All, today, 2000.0).unwrap();
        assert_eq!(all.days.len(), 4);
        assert_eq!(all.days[0].date, "2025-01-15");
        assert_eq!(all.days_over_goal, 2);

        let empty = calorie_history(&Database::in_memory().unwrap(), ReportPeriod::Month, today, 2000.0)
            .unwrap();
        assert!(empty.days.is_empty());
        assert_eq!(empty.average, 0.0);
    }

    #[test]
    fn test_unpadded_dates_land_in_their_day() {
        let db = Database::in_memory().unwrap();
        meals::log_meal(&db, "2025-3-1", "Café", Some(500.0), &[]).unwrap();
        meals::log_meal(&db, " 2025-03-01 ", "Almoço", Some(300.0), &[]).unwrap();
        water::add_water(&db, "2025-3-1", 250.0).unwrap();

        let summary = daily_summary(&db, "2025-03-01", 2000.0).unwrap();
        assert_eq!(summary.consumed, 800.0);
        assert_eq!(summary.meal_count, 2);
        assert_eq!(summary.water_ml, 250.0);

        // Must not sort after 2025-10-01 and leak into an October window
        let week = calorie_history(&db, ReportPeriod::Week, date("2025-10-05"), 2000.0).unwrap();
        assert!(week.days.is_empty());
        let all = calorie_history(&db, ReportPeriod::All, date("2025-10-05"), 2000.0).unwrap();
        assert_eq!(all.days.len(), 1);
        assert_eq!(all.days[0].date, "2025-03-01");
        assert_eq!(all.days[0].calories, 800.0);
    }
}
