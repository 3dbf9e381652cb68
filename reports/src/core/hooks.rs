//! Extension points: ordered post-processors for every computed value.
//!
//! Each extension point is a list of filters run in registration order. A
//! filter receives the value computed so far plus read-only context and
//! returns the replacement value. With no filters registered the
//! core-computed value passes through untouched.

use std::fmt;

use super::column::{Columns, DataType};
use super::format::{CellDisplay, SortValue};
use super::value::{CellValue, Dataset, Row};
use crate::render::chart::ChartKind;

/// Identity of the report a hook is running for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportInfo<'a> {
    pub slug: &'a str,
    pub title: &'a str,
}

/// Context for the per-value projections.
#[derive(Debug, Clone, Copy)]
pub struct CellContext<'a> {
    pub report: ReportInfo<'a>,
    pub raw: &'a CellValue,
    pub data_type: DataType,
    /// The owning row. `None` for summary data points.
    pub row: Option<&'a Row>,
}

/// Which rendered output a string filter is being applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Table,
    CsvLink,
    CsvUrl,
    DataPoint,
    Chart(ChartKind),
    DatePicker,
    FilterFields,
    Filters,
    CsvFilename,
    FileDateRange,
    QueryDateRange,
}

#[derive(Debug, Clone, Copy)]
pub struct OutputContext<'a> {
    pub report: ReportInfo<'a>,
    pub kind: OutputKind,
}

type DataFilter = Box<dyn Fn(Dataset, &ReportInfo<'_>) -> Dataset + Send + Sync>;
type ColumnsFilter = Box<dyn Fn(Columns, &ReportInfo<'_>) -> Columns + Send + Sync>;
type SortFilter = Box<dyn Fn(SortValue, &CellContext<'_>) -> SortValue + Send + Sync>;
type DisplayFilter = Box<dyn Fn(CellDisplay, &CellContext<'_>) -> CellDisplay + Send + Sync>;
type SummaryFilter = Box<dyn Fn(String, &CellContext<'_>) -> String + Send + Sync>;
type OutputFilter = Box<dyn Fn(String, &OutputContext<'_>) -> String + Send + Sync>;

#[derive(Default)]
pub struct Hooks {
    data: Vec<DataFilter>,
    columns: Vec<ColumnsFilter>,
    sort_value: Vec<SortFilter>,
    display_value: Vec<DisplayFilter>,
    summary_value: Vec<SummaryFilter>,
    output: Vec<OutputFilter>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_data(
        &mut self,
        filter: impl Fn(Dataset, &ReportInfo<'_>) -> Dataset + Send + Sync + 'static,
    ) -> &mut Self {
        self.data.push(Box::new(filter));
        self
    }

    pub fn on_columns(
        &mut self,
        filter: impl Fn(Columns, &ReportInfo<'_>) -> Columns + Send + Sync + 'static,
    ) -> &mut Self {
        self.columns.push(Box::new(filter));
        self
    }

    pub fn on_sort_value(
        &mut self,
        filter: impl Fn(SortValue, &CellContext<'_>) -> SortValue + Send + Sync + 'static,
    ) -> &mut Self {
        self.sort_value.push(Box::new(filter));
        self
    }

    pub fn on_display_value(
        &mut self,
        filter: impl Fn(CellDisplay, &CellContext<'_>) -> CellDisplay + Send + Sync + 'static,
    ) -> &mut Self {
        self.display_value.push(Box::new(filter));
        self
    }

    pub fn on_summary_value(
        &mut self,
        filter: impl Fn(String, &CellContext<'_>) -> String + Send + Sync + 'static,
    ) -> &mut Self {
        self.summary_value.push(Box::new(filter));
        self
    }

    /// Filter the final string of any rendered output; match on
    /// [`OutputContext::kind`] to target one renderer.
    pub fn on_output(
        &mut self,
        filter: impl Fn(String, &OutputContext<'_>) -> String + Send + Sync + 'static,
    ) -> &mut Self {
        self.output.push(Box::new(filter));
        self
    }

    pub fn filter_data(&self, data: Dataset, info: &ReportInfo<'_>) -> Dataset {
        self.data.iter().fold(data, |data, filter| filter(data, info))
    }

    pub fn filter_columns(&self, columns: Columns, info: &ReportInfo<'_>) -> Columns {
        self.columns
            .iter()
            .fold(columns, |columns, filter| filter(columns, info))
    }

    pub fn filter_sort_value(&self, value: SortValue, ctx: &CellContext<'_>) -> SortValue {
        self.sort_value
            .iter()
            .fold(value, |value, filter| filter(value, ctx))
    }

    pub fn filter_display_value(&self, value: CellDisplay, ctx: &CellContext<'_>) -> CellDisplay {
        self.display_value
            .iter()
            .fold(value, |value, filter| filter(value, ctx))
    }

    pub fn filter_summary_value(&self, value: String, ctx: &CellContext<'_>) -> String {
        self.summary_value
            .iter()
            .fold(value, |value, filter| filter(value, ctx))
    }

    pub fn filter_output(&self, output: String, ctx: &OutputContext<'_>) -> String {
        self.output
            .iter()
            .fold(output, |output, filter| filter(output, ctx))
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("data", &self.data.len())
            .field("columns", &self.columns.len())
            .field("sort_value", &self.sort_value.len())
            .field("display_value", &self.display_value.len())
            .field("summary_value", &self.summary_value.len())
            .field("output", &self.output.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO: ReportInfo<'static> = ReportInfo {
        slug: "active-users-report",
        title: "Active Users Report",
    };

    #[test]
    fn no_filters_is_identity() {
        let hooks = Hooks::new();
        let ctx = OutputContext {
            report: INFO,
            kind: OutputKind::Table,
        };
        assert_eq!(hooks.filter_output("<table>".into(), &ctx), "<table>");
    }

    #[test]
    fn filters_run_in_registration_order() {
        let mut hooks = Hooks::new();
        hooks
            .on_output(|out, _| format!("{out}a"))
            .on_output(|out, ctx| match ctx.kind {
                OutputKind::Table => format!("{out}b"),
                _ => out,
            });

        let table = OutputContext {
            report: INFO,
            kind: OutputKind::Table,
        };
        let link = OutputContext {
            report: INFO,
            kind: OutputKind::CsvLink,
        };
        assert_eq!(hooks.filter_output(String::new(), &table), "ab");
        assert_eq!(hooks.filter_output(String::new(), &link), "a");
    }

    #[test]
    fn cell_filters_see_raw_input() {
        let mut hooks = Hooks::new();
        hooks.on_summary_value(|value, ctx| format!("{value} ({})", ctx.raw));

        let raw = CellValue::from(7);
        let ctx = CellContext {
            report: INFO,
            raw: &raw,
            data_type: DataType::Integer,
            row: None,
        };
        assert_eq!(hooks.filter_summary_value("7".into(), &ctx), "7 (7)");
    }

    #[test]
    fn data_filters_receive_report_identity() {
        let mut hooks = Hooks::new();
        hooks.on_data(|mut data, info| {
            data.retain(|row| info.slug == "active-users-report" && row.entity_id() != 2);
            data
        });

        let data = vec![Row::new().with("ID", 1), Row::new().with("ID", 2)];
        assert_eq!(hooks.filter_data(data, &INFO).len(), 1);
    }
}
