//! Drill-down from an achievement to the users who earned it.

use std::sync::Arc;

use super::{column_total, latest_date, per_item, unlocks_in_range, ActivityStore};
use crate::core::{ColumnSchema, Columns, DataType, Output, Row};
use crate::error::Result;
use crate::page::{PageBuilder, ReportDefinition};
use crate::report::Report;
use crate::request::RequestContext;

pub const EARNINGS_SLUG: &str = crate::core::format::EARNINGS_REPORT_SLUG;

/// Hidden from the menu; reached through the earnings links in achievement
/// reports, which carry `achievement_id`.
pub fn definition(store: Arc<dyn ActivityStore>) -> ReportDefinition {
    ReportDefinition::new("Earnings Report", EARNINGS_SLUG, move |report, request, page| {
        populate(report, request, page, store.as_ref())
    })
    .hidden()
}

pub fn columns() -> Columns {
    let listed = [Output::Table, Output::Csv];
    Columns::new()
        .with(ColumnSchema::hidden("ID", "User ID", DataType::Integer))
        .with(ColumnSchema::new("username", "Username", DataType::UserLogin).visible_in(&listed))
        .with(ColumnSchema::new("first_name", "First Name", DataType::String).visible_in(&listed))
        .with(ColumnSchema::new("last_name", "Last Name", DataType::String).visible_in(&listed))
        .with(ColumnSchema::new("email", "Email", DataType::Email).visible_in(&listed))
        .with(ColumnSchema::new("earned_count", "Earned Count", DataType::Integer).visible_in(&listed))
        .with(ColumnSchema::new("last_earned", "Last Earned", DataType::Date).visible_in(&listed))
}

fn populate(
    report: &mut Report,
    request: &RequestContext,
    page: &mut PageBuilder,
    store: &dyn ActivityStore,
) -> Result<()> {
    let achievement = match request.achievement_id {
        Some(id) => store.achievement(id)?,
        None => None,
    };
    let achievement_title = achievement.as_ref().map_or("", |a| a.title.as_str());
    report.title = format!("\"{achievement_title}\" Earnings Report");

    let unlocks: Vec<_> = match &achievement {
        Some(achievement) => unlocks_in_range(store, report)?
            .into_iter()
            .filter(|entry| entry.achievement_id == Some(achievement.id))
            .collect(),
        None => Vec::new(),
    };

    report.data = store
        .users()?
        .into_iter()
        .filter_map(|user| {
            let earned: Vec<_> = unlocks.iter().filter(|e| e.user_id == user.id).collect();
            if earned.is_empty() {
                return None;
            }
            Some(
                Row::new()
                    .with("ID", user.id)
                    .with("username", user.login)
                    .with("first_name", user.first_name)
                    .with("last_name", user.last_name)
                    .with("email", user.email)
                    .with("earned_count", earned.len())
                    .with("last_earned", latest_date(earned.into_iter())),
            )
        })
        .collect();
    report.columns = columns();

    let users = report.data.len();
    let earnings = column_total(&report.data, "earned_count");

    page.push(report.render_data_point("Total Users", users, DataType::Integer));
    page.push(report.render_data_point("Total Earnings", earnings, DataType::Integer));
    page.push(report.render_data_point(
        "Avg Earnings per User",
        per_item(earnings, users),
        DataType::Float,
    ));

    if let Some(table) = report.render_table() {
        page.push(table);
    }
    Ok(())
}
