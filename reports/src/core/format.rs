//! Formatting rules shared by the table, CSV and data-point renderers.
//!
//! Each raw cell has three projections, all keyed by the column's
//! [`DataType`]:
//! - [`sort_value`]: machine-sortable value for the table cell metadata.
//! - [`display_value`]: human-facing cell content (text or a link).
//! - [`summary_value`]: single data-point formatting outside the table.
//!
//! These are the core-computed values; [`Report`](crate::report::Report)
//! passes each through the registered [`Hooks`](super::hooks::Hooks).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::column::DataType;
use super::date::{format_cell_date, parse_datetime};
use super::value::{CellValue, Row};

/// Number of characters kept for text sort keys.
const SORT_PREFIX_CHARS: usize = 20;

/// Slug of the per-achievement drill-down that earnings cells link to.
pub const EARNINGS_REPORT_SLUG: &str = "earnings-report";

/// Literal shown for an empty date cell.
pub const EMPTY_DATE: &str = "N/A";

#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(i64),
    Text(String),
    Raw(CellValue),
}

impl fmt::Display for SortValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortValue::Number(value) => write!(f, "{value}"),
            SortValue::Text(text) => f.write_str(text),
            SortValue::Raw(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellDisplay {
    Text(String),
    Link { href: String, label: String },
}

impl CellDisplay {
    pub fn text(value: impl Into<String>) -> Self {
        CellDisplay::Text(value.into())
    }

    fn link_or_text(href: Option<String>, label: String) -> Self {
        match href {
            Some(href) => CellDisplay::Link { href, label },
            None => CellDisplay::Text(label),
        }
    }
}

/// Where generated links point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStyle {
    /// The host's admin screens under `admin_url`.
    #[default]
    Admin,
    /// The desktop shell's own `/report/{slug}` routes. Post and user edit
    /// screens have no counterpart there, so those cells render as text.
    App,
}

/// Builds links into the host's admin screens or the shell's routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminLinks {
    base: String,
    style: LinkStyle,
}

impl AdminLinks {
    pub fn new(admin_url: &str) -> Self {
        let mut base = admin_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self {
            base,
            style: LinkStyle::Admin,
        }
    }

    pub fn app() -> Self {
        Self {
            base: "/".to_string(),
            style: LinkStyle::App,
        }
    }

    fn page(&self, path: &str) -> String {
        format!("{}{}", self.base, path.trim_start_matches('/'))
    }

    pub fn post_edit(&self, post_id: u64) -> Option<String> {
        match self.style {
            LinkStyle::Admin => Some(self.page(&format!("post.php?post={post_id}&action=edit"))),
            LinkStyle::App => None,
        }
    }

    pub fn user_edit(&self, user_id: u64) -> Option<String> {
        match self.style {
            LinkStyle::Admin => {
                Some(self.page(&format!("user-edit.php?user_id={user_id}&action=edit")))
            }
            LinkStyle::App => None,
        }
    }

    pub fn report(&self, slug: &str) -> String {
        match self.style {
            LinkStyle::Admin => self.page(&format!("admin.php?page={slug}")),
            LinkStyle::App => format!("/report/{slug}"),
        }
    }

    pub fn earnings_report(&self, achievement_id: u64) -> String {
        match self.style {
            LinkStyle::Admin => self.page(&format!(
                "admin.php?page={EARNINGS_REPORT_SLUG}&achievement_id={achievement_id}"
            )),
            LinkStyle::App => {
                format!("/report/{EARNINGS_REPORT_SLUG}?achievement_id={achievement_id}")
            }
        }
    }
}

pub fn sort_value(value: &CellValue, data_type: DataType) -> SortValue {
    match data_type {
        DataType::Integer | DataType::Earnings => {
            SortValue::Number(i64::try_from(value.abs_int()).unwrap_or(i64::MAX))
        }
        DataType::Date => SortValue::Number(date_timestamp(value).unwrap_or(0)),
        DataType::String | DataType::PostTitle | DataType::UserLogin => {
            SortValue::Text(value.as_text().chars().take(SORT_PREFIX_CHARS).collect())
        }
        _ => SortValue::Raw(value.clone()),
    }
}

/// `row` supplies the entity id for the link-producing types.
pub fn display_value(
    value: &CellValue,
    data_type: DataType,
    row: &Row,
    links: &AdminLinks,
) -> CellDisplay {
    match data_type {
        DataType::Integer => CellDisplay::Text(group_digits(value.abs_int())),
        DataType::Date => {
            if value.is_empty() {
                return CellDisplay::text(EMPTY_DATE);
            }
            let parsed = date_timestamp(value)
                .and_then(|ts| time::OffsetDateTime::from_unix_timestamp(ts).ok());
            match parsed {
                Some(at) => CellDisplay::Text(format_cell_date(at)),
                None => CellDisplay::Text(value.to_string()),
            }
        }
        DataType::String => CellDisplay::Text(strip_markup(&value.as_text())),
        DataType::PostTitle => {
            CellDisplay::link_or_text(links.post_edit(row.entity_id()), value.to_string())
        }
        DataType::UserLogin => {
            CellDisplay::link_or_text(links.user_edit(row.entity_id()), value.to_string())
        }
        DataType::Earnings if value.is_truthy() => CellDisplay::Link {
            href: links.earnings_report(row.entity_id()),
            label: value.to_string(),
        },
        _ => CellDisplay::Text(value.to_string()),
    }
}

pub fn summary_value(value: &CellValue, data_type: DataType) -> String {
    match data_type {
        DataType::String => value.to_string(),
        DataType::Percentage => format!("{}%", number_format(value.as_f64(), 2)),
        DataType::Float => number_format(value.as_f64(), 2),
        _ => number_format(value.as_f64(), 0),
    }
}

/// Value written to a CSV field: the raw cell text.
pub fn csv_value(value: &CellValue) -> String {
    value.to_string()
}

fn date_timestamp(value: &CellValue) -> Option<i64> {
    match value {
        CellValue::Null => None,
        CellValue::Integer(ts) if *ts > 0 => Some(*ts),
        CellValue::Integer(_) | CellValue::Float(_) => None,
        CellValue::Text(text) => parse_datetime(text).map(|at| at.unix_timestamp()),
    }
}

/// Fixed-decimal formatting with `,` thousands separators. Halves round away
/// from zero.
pub fn number_format(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return number_format(0.0, decimals);
    }

    let factor = 10f64.powi(decimals as i32);
    let rounded = (value.abs() * factor).round() / factor;
    let fixed = format!("{rounded:.decimals$}");
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut output = String::new();
    if value < 0.0 && rounded != 0.0 {
        output.push('-');
    }
    output.push_str(&group_str(whole));
    if !fraction.is_empty() {
        output.push('.');
        output.push_str(fraction);
    }
    output
}

fn group_digits(value: u64) -> String {
    group_str(&value.to_string())
}

fn group_str(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Plain-text sanitiser: drops tags, collapses whitespace, trims.
///
/// A `<` only opens a tag when followed by a letter, `/` or `!`; any other
/// `<` is kept as text.
pub fn strip_markup(input: &str) -> String {
    let mut text = String::with_capacity(input.len());
    let mut in_tag = false;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            '<' if chars
                .peek()
                .is_some_and(|next| next.is_ascii_alphabetic() || matches!(next, '/' | '!')) =>
            {
                in_tag = true
            }
            _ => text.push(ch),
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links() -> AdminLinks {
        AdminLinks::new("https://example.org/wp-admin")
    }

    #[test]
    fn integer_and_earnings_sort_as_absolute_numbers() {
        assert_eq!(sort_value(&CellValue::from(-12), DataType::Integer), SortValue::Number(12));
        assert_eq!(sort_value(&CellValue::from("abc"), DataType::Earnings), SortValue::Number(0));
    }

    #[test]
    fn date_sort_is_timestamp_or_zero() {
        assert_eq!(
            sort_value(&CellValue::from("2013-01-01 00:00:00"), DataType::Date),
            SortValue::Number(1_356_998_400)
        );
        assert_eq!(sort_value(&CellValue::Null, DataType::Date), SortValue::Number(0));
        assert_eq!(sort_value(&CellValue::from("garbage"), DataType::Date), SortValue::Number(0));
    }

    #[test]
    fn text_sort_keeps_twenty_characters() {
        let long = "abcdefghijklmnopqrstuvwxyz";
        assert_eq!(
            sort_value(&CellValue::from(long), DataType::UserLogin),
            SortValue::Text("abcdefghijklmnopqrst".into())
        );
        assert_eq!(
            sort_value(&CellValue::from("ü".repeat(25)), DataType::String),
            SortValue::Text("ü".repeat(20))
        );
    }

    #[test]
    fn other_types_sort_raw() {
        assert_eq!(
            sort_value(&CellValue::from(0.5), DataType::Percentage),
            SortValue::Raw(CellValue::Float(0.5))
        );
    }

    #[test]
    fn integer_display_is_absolute_and_grouped() {
        let row = Row::new();
        assert_eq!(
            display_value(&CellValue::from(-7), DataType::Integer, &row, &links()),
            CellDisplay::text("7")
        );
        assert_eq!(
            display_value(&CellValue::from(1_234_567), DataType::Integer, &row, &links()),
            CellDisplay::text("1,234,567")
        );
    }

    #[test]
    fn date_display() {
        let row = Row::new();
        assert_eq!(
            display_value(&CellValue::from(""), DataType::Date, &row, &links()),
            CellDisplay::text("N/A")
        );
        assert_eq!(
            display_value(&CellValue::from("2023-06-01 10:11:12"), DataType::Date, &row, &links()),
            CellDisplay::text("06-01-2023")
        );
    }

    #[test]
    fn string_display_strips_markup() {
        let row = Row::new();
        assert_eq!(
            display_value(&CellValue::from("<b>Ada</b>\n  Lovelace"), DataType::String, &row, &links()),
            CellDisplay::text("Ada Lovelace")
        );
    }

    #[test]
    fn lone_angle_brackets_are_text() {
        assert_eq!(strip_markup("Tom <3 Jerry"), "Tom <3 Jerry");
        assert_eq!(strip_markup("a < b and c > d"), "a < b and c > d");
        assert_eq!(strip_markup("x<br/>y <!-- note -->z"), "xy z");
        assert_eq!(strip_markup("</em>tail"), "tail");
    }

    #[test]
    fn link_types_use_row_entity_id() {
        let row = Row::new().with("ID", 9);
        assert_eq!(
            display_value(&CellValue::from("Gold Star"), DataType::PostTitle, &row, &links()),
            CellDisplay::Link {
                href: "https://example.org/wp-admin/post.php?post=9&action=edit".into(),
                label: "Gold Star".into(),
            }
        );
        assert_eq!(
            display_value(&CellValue::from("ada"), DataType::UserLogin, &row, &links()),
            CellDisplay::Link {
                href: "https://example.org/wp-admin/user-edit.php?user_id=9&action=edit".into(),
                label: "ada".into(),
            }
        );
        assert_eq!(
            display_value(&CellValue::from(3), DataType::Earnings, &row, &links()),
            CellDisplay::Link {
                href: "https://example.org/wp-admin/admin.php?page=earnings-report&achievement_id=9"
                    .into(),
                label: "3".into(),
            }
        );
    }

    #[test]
    fn falsy_earnings_stay_raw() {
        let row = Row::new().with("ID", 9);
        assert_eq!(
            display_value(&CellValue::from(0), DataType::Earnings, &row, &links()),
            CellDisplay::text("0")
        );
    }

    #[test]
    fn app_links_point_at_shell_routes() {
        let row = Row::new().with("ID", 9);
        let links = AdminLinks::app();
        assert_eq!(
            display_value(&CellValue::from(3), DataType::Earnings, &row, &links),
            CellDisplay::Link {
                href: "/report/earnings-report?achievement_id=9".into(),
                label: "3".into(),
            }
        );
        assert_eq!(
            display_value(&CellValue::from("ada"), DataType::UserLogin, &row, &links),
            CellDisplay::text("ada")
        );
        assert_eq!(
            display_value(&CellValue::from("Gold"), DataType::PostTitle, &row, &links),
            CellDisplay::text("Gold")
        );
        assert_eq!(links.report("badges"), "/report/badges");
    }

    #[test]
    fn summary_formats() {
        assert_eq!(summary_value(&CellValue::from(42.5), DataType::Percentage), "42.50%");
        assert_eq!(summary_value(&CellValue::from(1234.567), DataType::Float), "1,234.57");
        assert_eq!(summary_value(&CellValue::from(2.5), DataType::Integer), "3");
        assert_eq!(summary_value(&CellValue::from(-1500), DataType::Email), "-1,500");
        assert_eq!(summary_value(&CellValue::from("as is"), DataType::String), "as is");
    }

    #[test]
    fn number_format_handles_edges() {
        assert_eq!(number_format(0.0, 2), "0.00");
        assert_eq!(number_format(-0.001, 2), "0.00");
        assert_eq!(number_format(f64::NAN, 0), "0");
        assert_eq!(number_format(999.996, 2), "1,000.00");
    }
}
