//! One report per achievement type: how often each achievement was earned.

use std::sync::Arc;

use super::{column_total, latest_date, per_item, unlocks_in_range, AchievementType, ActivityStore};
use crate::core::{ColumnSchema, Columns, DataType, Output, Row};
use crate::error::Result;
use crate::page::{PageBuilder, ReportCatalog, ReportDefinition};
use crate::report::Report;

pub fn register(catalog: &mut ReportCatalog, store: Arc<dyn ActivityStore>) -> Result<()> {
    for kind in store.achievement_types()? {
        catalog.register(definition(kind, Arc::clone(&store)));
    }
    Ok(())
}

pub fn definition(kind: AchievementType, store: Arc<dyn ActivityStore>) -> ReportDefinition {
    ReportDefinition::new(kind.plural.clone(), kind.slug.clone(), move |report, _, page| {
        populate(report, page, &kind, store.as_ref())
    })
}

pub fn columns(singular: &str) -> Columns {
    Columns::new()
        .with(ColumnSchema::hidden("ID", "Achievement ID", DataType::Integer))
        .with(ColumnSchema::new("title", format!("{singular} Name"), DataType::PostTitle))
        .with(ColumnSchema::new("earned_count", "Earning Count", DataType::Earnings))
        .with(
            ColumnSchema::new("last_earned_date", "Last Earned", DataType::Date)
                .visible_in(&[Output::Table, Output::Csv]),
        )
}

fn populate(
    report: &mut Report,
    page: &mut PageBuilder,
    kind: &AchievementType,
    store: &dyn ActivityStore,
) -> Result<()> {
    let unlocks = unlocks_in_range(store, report)?;

    report.data = store
        .achievements(&kind.slug)?
        .into_iter()
        .map(|achievement| {
            let earned: Vec<_> = unlocks
                .iter()
                .filter(|entry| entry.achievement_id == Some(achievement.id))
                .collect();
            Row::new()
                .with("ID", achievement.id)
                .with("title", achievement.title)
                .with("earned_count", earned.len())
                .with("last_earned_date", latest_date(earned.into_iter()))
        })
        .collect();
    report.columns = columns(&kind.singular);

    let total = report.data.len();
    let awarded = column_total(&report.data, "earned_count");

    page.push(report.render_data_point(
        &format!("Total {}", kind.plural),
        total,
        DataType::Integer,
    ));
    page.push(report.render_data_point(
        &format!("Total {} Awarded", kind.plural),
        awarded,
        DataType::Integer,
    ));
    page.push(report.render_data_point(
        &format!("Avg Earnings per {}", kind.singular),
        per_item(awarded, total),
        DataType::Float,
    ));

    if let Some(table) = report.render_table() {
        page.push(table);
    }
    Ok(())
}
