//! The report entity: a dataset, its column schema and a date range, plus
//! every rendering entry point a report page needs.

use std::sync::Arc;

use dioxus::prelude::*;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::core::{
    date::{file_date_suffix, format_long_date, DateFilter, DateRange},
    format, CellContext, CellDisplay, CellValue, Columns, DataType, Dataset, Hooks,
    OutputContext, OutputKind, ReportInfo, ReportSettings, Row, SortValue,
};
use crate::csv::CsvStore;
use crate::error::Result;
use crate::render::{
    chart::{self, ChartData, ChartKind},
    table::{ReportTable, TableModel},
    to_html, widgets,
};

/// Created per page view, populated once by its producer, rendered, then
/// dropped. Only the CSV export outlives it.
#[derive(Debug, Clone)]
pub struct Report {
    pub title: String,
    pub slug: String,
    pub show_in_menu: bool,
    pub data: Dataset,
    pub columns: Columns,
    pub base_filename: String,
    date_range: DateRange,
    settings: Arc<ReportSettings>,
    hooks: Arc<Hooks>,
}

impl Report {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        settings: Arc<ReportSettings>,
        hooks: Arc<Hooks>,
    ) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            show_in_menu: true,
            data: Dataset::new(),
            columns: Columns::new(),
            base_filename: settings.base_filename.clone(),
            date_range: DateRange::default(),
            settings,
            hooks,
        }
    }

    pub fn info(&self) -> ReportInfo<'_> {
        ReportInfo {
            slug: &self.slug,
            title: &self.title,
        }
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    fn output(&self, output: String, kind: OutputKind) -> String {
        let ctx = OutputContext {
            report: self.info(),
            kind,
        };
        self.hooks.filter_output(output, &ctx)
    }

    /// The assigned rows after the data hooks.
    pub fn get_data(&self) -> Dataset {
        self.hooks.filter_data(self.data.clone(), &self.info())
    }

    /// The assigned schema after the column hooks.
    pub fn get_columns(&self) -> Columns {
        self.hooks.filter_columns(self.columns.clone(), &self.info())
    }

    // Dates

    /// Unix timestamps; a non-positive value resets that bound to its default.
    pub fn set_date_range(&mut self, start: i64, end: i64) {
        self.date_range = DateRange::from_timestamps(start, end);
    }

    pub fn set_dates(&mut self, range: DateRange) {
        self.date_range = range;
    }

    pub fn date_range(&self) -> DateRange {
        self.date_range
    }

    pub fn start_date(&self) -> OffsetDateTime {
        self.date_range.start()
    }

    pub fn end_date(&self) -> OffsetDateTime {
        self.date_range.end()
    }

    /// The date filter every producer applies to its stored records.
    pub fn query_filter(&self) -> DateFilter {
        self.date_range.query_filter()
    }

    /// SQL form of [`Report::query_filter`] against `{alias}.post_date`.
    pub fn query_date_range(&self, alias: &str) -> String {
        let fragment = self.query_filter().to_sql(alias);
        self.output(fragment, OutputKind::QueryDateRange)
    }

    pub fn file_date_range(&self) -> String {
        let suffix = file_date_suffix(
            Some(self.start_date().date()),
            Some(self.end_date().date()),
        );
        self.output(suffix, OutputKind::FileDateRange)
    }

    /// `{base_filename}-{slug}{date suffix}`, without extension.
    pub fn csv_filename(&self) -> String {
        let filename = format!(
            "{}-{}{}",
            self.base_filename,
            self.slug,
            self.file_date_range()
        );
        self.output(filename, OutputKind::CsvFilename)
    }

    // Cell projections

    fn cell_context<'a>(
        &'a self,
        raw: &'a CellValue,
        data_type: DataType,
        row: Option<&'a Row>,
    ) -> CellContext<'a> {
        CellContext {
            report: self.info(),
            raw,
            data_type,
            row,
        }
    }

    pub fn sort_value(&self, value: &CellValue, data_type: DataType) -> SortValue {
        let computed = format::sort_value(value, data_type);
        self.hooks
            .filter_sort_value(computed, &self.cell_context(value, data_type, None))
    }

    pub fn display_value(&self, value: &CellValue, data_type: DataType, row: &Row) -> CellDisplay {
        let computed =
            format::display_value(value, data_type, row, &self.settings.admin_links());
        self.hooks
            .filter_display_value(computed, &self.cell_context(value, data_type, Some(row)))
    }

    pub fn summary_value(&self, value: &CellValue, data_type: DataType) -> String {
        let computed = format::summary_value(value, data_type);
        self.hooks
            .filter_summary_value(computed, &self.cell_context(value, data_type, None))
    }

    // Renderers

    pub fn render_data_point(
        &self,
        title: &str,
        value: impl Into<CellValue>,
        data_type: DataType,
    ) -> String {
        let value = self.summary_value(&value.into(), data_type);
        self.output(widgets::data_point(title, &value), OutputKind::DataPoint)
    }

    /// Table model for the given rows, or `None` for empty input.
    pub fn table_model(&self, data: &[Row], columns: &Columns) -> Option<TableModel> {
        TableModel::build(&self.slug, data, columns, |value, column, row| {
            (
                self.sort_value(value, column.data_type),
                self.display_value(value, column.data_type, row),
            )
        })
    }

    /// Table over the report's own data and columns, followed by the CSV
    /// download link.
    pub fn render_table(&self) -> Option<String> {
        self.render_table_with(&self.get_data(), &self.get_columns())
    }

    pub fn render_table_with(&self, data: &[Row], columns: &Columns) -> Option<String> {
        let Some(model) = self.table_model(data, columns) else {
            debug!(slug = %self.slug, "nothing to tabulate");
            return None;
        };

        let mut output = to_html(rsx! { ReportTable { model } });
        output.push_str(&self.render_csv_link_with(data, columns));
        Some(self.output(output, OutputKind::Table))
    }

    pub fn render_csv_link(&self) -> String {
        self.render_csv_link_with(&self.get_data(), &self.get_columns())
    }

    /// Write the export, then link to it. A failed write renders a notice in
    /// place of the link.
    pub fn render_csv_link_with(&self, data: &[Row], columns: &Columns) -> String {
        let link = match self.csv_url(data, columns) {
            Ok(Some(url)) => widgets::csv_link(&url, &self.csv_filename()),
            Ok(None) => widgets::csv_failure("the export file is missing"),
            Err(err) => {
                warn!(slug = %self.slug, error = %err, "CSV link unavailable");
                widgets::csv_failure(&err.to_string())
            }
        };
        self.output(link, OutputKind::CsvLink)
    }

    /// Save the export under [`Report::csv_filename`] and return its URL.
    pub fn csv_url(&self, data: &[Row], columns: &Columns) -> Result<Option<String>> {
        let store = CsvStore::from_settings(&self.settings);
        let filename = self.csv_filename();
        store.save(data, columns, &filename)?;

        Ok(store
            .url(&filename)
            .map(|url| self.output(url, OutputKind::CsvUrl)))
    }

    pub fn render_chart(&self, kind: ChartKind, data: &ChartData) -> Option<String> {
        let output = chart::render(kind, data)?;
        Some(self.output(output, OutputKind::Chart(kind)))
    }

    pub fn render_date_picker(&self) -> String {
        let picker = widgets::date_picker(
            &format_long_date(self.start_date()),
            &format_long_date(self.end_date()),
        );
        self.output(picker, OutputKind::DatePicker)
    }

    /// Date picker, extra fields from the filter-field hooks, and a submit
    /// button.
    pub fn render_filters(&self) -> String {
        let extra = self.output(String::new(), OutputKind::FilterFields);
        let form = widgets::filter_form(&self.render_date_picker(), &extra);
        self.output(form, OutputKind::Filters)
    }
}
