//! Users who unlocked at least one achievement in the selected range.

use std::collections::BTreeMap;
use std::sync::Arc;

use time::Date;

use super::{latest_date, unlocks_in_range, ActivityStore};
use crate::core::{
    date::{format_short_date, parse_datetime},
    ColumnSchema, Columns, DataType, Output, Row,
};
use crate::error::Result;
use crate::page::{PageBuilder, ReportDefinition};
use crate::render::ChartData;
use crate::render::ChartKind;
use crate::report::Report;

pub const ACTIVE_USERS_SLUG: &str = "active-users-report";
pub const DESCRIPTION: &str =
    "This report lists users who have earned achievements within this time period.";

pub fn definition(store: Arc<dyn ActivityStore>) -> ReportDefinition {
    ReportDefinition::new("Active Users Report", ACTIVE_USERS_SLUG, move |report, _, page| {
        populate(report, page, store.as_ref())
    })
}

pub fn columns() -> Columns {
    let listed = [Output::Table, Output::Csv];
    Columns::new()
        .with(ColumnSchema::hidden("ID", "User ID", DataType::Integer))
        .with(ColumnSchema::new("username", "Username", DataType::UserLogin).visible_in(&listed))
        .with(ColumnSchema::new("first_name", "First Name", DataType::String).visible_in(&listed))
        .with(ColumnSchema::new("last_name", "Last Name", DataType::String).visible_in(&listed))
        .with(ColumnSchema::new("email", "Email", DataType::Email).visible_in(&listed))
        .with(
            ColumnSchema::new("total_achievements", "Total Achievements", DataType::Integer)
                .visible_in(&listed),
        )
        .with(
            ColumnSchema::new("recent_achievements", "Achievements Earned in Range", DataType::Integer)
                .visible_in(&listed),
        )
        .with(
            ColumnSchema::new("last_earned", "Last Achievement Date", DataType::Date)
                .visible_in(&listed),
        )
        .with(ColumnSchema::new("join_date", "Date Joined", DataType::Date).visible_in(&listed))
}

fn populate(report: &mut Report, page: &mut PageBuilder, store: &dyn ActivityStore) -> Result<()> {
    let all_unlocks = store.unlocks()?;
    let in_range = unlocks_in_range(store, report)?;

    report.data = store
        .users()?
        .into_iter()
        .filter_map(|user| {
            let recent = in_range.iter().filter(|e| e.user_id == user.id).count();
            if recent == 0 {
                return None;
            }
            let earned = || all_unlocks.iter().filter(|e| e.user_id == user.id);
            Some(
                Row::new()
                    .with("ID", user.id)
                    .with("username", user.login)
                    .with("first_name", user.first_name)
                    .with("last_name", user.last_name)
                    .with("email", user.email)
                    .with("total_achievements", earned().count())
                    .with("recent_achievements", recent)
                    .with("last_earned", latest_date(earned()))
                    .with("join_date", user.registered),
            )
        })
        .collect();
    report.columns = columns();

    let active = report.data.len();
    let total = store.user_count()?;
    let percent = if total == 0 {
        0.0
    } else {
        active as f64 / total as f64 * 100.0
    };

    page.push(crate::render::widgets::page_description(DESCRIPTION));
    page.push(report.render_data_point("Active Users", active, DataType::Integer));
    page.push(report.render_data_point("Total Users", total, DataType::Integer));
    page.push(report.render_data_point("Percent Active", percent, DataType::Percentage));

    if let Some(chart) = join_chart(&report.data) {
        if let Some(markup) = report.render_chart(ChartKind::Line, &chart) {
            page.push(markup);
        }
    }

    if let Some(table) = report.render_table() {
        page.push(table);
    }
    Ok(())
}

/// Cumulative and new users per join day, oldest day first. `None` when no
/// row carries a readable join date.
pub fn join_chart(data: &[Row]) -> Option<ChartData> {
    let mut new_by_day: BTreeMap<Date, u32> = BTreeMap::new();
    for row in data {
        if let Some(joined) = parse_datetime(&row.get("join_date").as_text()) {
            *new_by_day.entry(joined.date()).or_default() += 1;
        }
    }
    if new_by_day.is_empty() {
        return None;
    }

    let mut labels = Vec::with_capacity(new_by_day.len());
    let mut cumulative = Vec::with_capacity(new_by_day.len());
    let mut new_users = Vec::with_capacity(new_by_day.len());
    let mut running = 0u32;

    for (day, count) in new_by_day {
        let label = format_short_date(day.midnight().assume_utc());
        running += count;
        cumulative.push((label.clone(), f64::from(running)));
        new_users.push((label.clone(), f64::from(count)));
        labels.push(label);
    }

    Some(
        ChartData::new(labels)
            .with_series(cumulative)
            .with_series(new_users),
    )
}
