//! Report data model and the rules every renderer shares.

pub mod column;
pub mod date;
pub mod format;
pub mod hooks;
pub mod settings;
pub mod value;

pub use column::{ColumnSchema, Columns, DataType, Output};
pub use date::{DateFilter, DateRange};
pub use format::{AdminLinks, CellDisplay, LinkStyle, SortValue};
pub use hooks::{CellContext, Hooks, OutputContext, OutputKind, ReportInfo};
pub use settings::{ReportSettings, Role};
pub use value::{CellValue, Dataset, Row};
