//! The bundled reports: one per achievement type, the per-achievement
//! earnings drill-down, and active users.

pub mod achievements;
pub mod active_users;
pub mod earnings;
pub mod store;

pub use store::{Achievement, AchievementType, ActivityStore, LogEntry, MemoryStore, User};

use std::sync::Arc;

use crate::core::{CellValue, Row};
use crate::error::Result;
use crate::page::ReportCatalog;
use crate::report::Report;

/// Register every bundled report against `store`.
pub fn register_all(catalog: &mut ReportCatalog, store: Arc<dyn ActivityStore>) -> Result<()> {
    achievements::register(catalog, Arc::clone(&store))?;
    catalog.register(earnings::definition(Arc::clone(&store)));
    catalog.register(active_users::definition(store));
    Ok(())
}

/// Unlocks that fall inside the report's date range, oldest first.
fn unlocks_in_range(store: &dyn ActivityStore, report: &Report) -> Result<Vec<LogEntry>> {
    let filter = report.query_filter();
    Ok(store
        .unlocks()?
        .into_iter()
        .filter(|entry| entry.within(&filter))
        .collect())
}

/// Stored date of the most recent entry, or null.
fn latest_date<'a>(entries: impl Iterator<Item = &'a LogEntry>) -> CellValue {
    entries
        .last()
        .map(|entry| CellValue::from(entry.date.as_str()))
        .unwrap_or_default()
}

fn column_total(data: &[Row], key: &str) -> i64 {
    data.iter().map(|row| row.get(key).as_i64()).sum()
}

fn per_item(total: i64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}
