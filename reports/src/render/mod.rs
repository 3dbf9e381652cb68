//! Markup renderers. Each builds a plain model first, then an rsx view that is
//! serialised to an HTML string so output hooks can amend it.

pub mod chart;
pub mod table;
pub mod widgets;

pub use chart::{ChartData, ChartKind};
pub use table::{ReportTable, TableModel};

use dioxus::prelude::*;

/// Serialise a rendered element to HTML.
pub fn to_html(element: Element) -> String {
    dioxus_ssr::render_element(element)
}
