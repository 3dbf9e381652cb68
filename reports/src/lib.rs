//! Reporting add-on for BadgeOS achievement data: typed report datasets
//! rendered as tables, charts and CSV downloads.

pub mod core;
pub mod csv;
pub mod error;
pub mod nav;
pub mod page;
pub mod producers;
pub mod render;
pub mod report;
pub mod request;

pub use error::{ReportError, Result};
pub use page::{render_report_page, PageBuilder, ReportCatalog, ReportDefinition};
pub use report::Report;
pub use request::RequestContext;

/// Stylesheet for report pages, embedded so hosts need no asset pipeline.
pub const REPORTS_CSS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/reports.css"
));
