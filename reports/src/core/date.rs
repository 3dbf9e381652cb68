//! Report date ranges, their query filter, and date parsing/formatting.

use time::{
    format_description::{well_known::Rfc3339, BorrowedFormatItem},
    macros::{datetime, format_description},
    Date, Duration, OffsetDateTime, PrimitiveDateTime, Time,
};

/// Start of the default reporting window.
pub const DEFAULT_START: OffsetDateTime = datetime!(2013-01-01 0:00 UTC);

const SQL_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const FILE_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]_[month]_[day]");
const CELL_DATE: &[BorrowedFormatItem<'static>] = format_description!("[month]-[day]-[year]");
const LONG_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");
const SHORT_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:short] [day], [year]");

const DATE_INPUTS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day]"),
    format_description!("[month repr:long case_sensitive:false] [day padding:none], [year]"),
    format_description!("[month repr:short case_sensitive:false] [day padding:none], [year]"),
    format_description!("[month repr:long case_sensitive:false] [day padding:none] [year]"),
    format_description!("[month padding:none]/[day padding:none]/[year]"),
];

const DATETIME_INPUTS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
];

/// Start/end bounds for a report's data query. Unset bounds fall back to
/// [`DEFAULT_START`] and "now" when read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    start: Option<OffsetDateTime>,
    end: Option<OffsetDateTime>,
}

impl DateRange {
    pub fn new(start: Option<OffsetDateTime>, end: Option<OffsetDateTime>) -> Self {
        Self { start, end }
    }

    /// Build from unix timestamps; non-positive values mean "use the default".
    pub fn from_timestamps(start: i64, end: i64) -> Self {
        Self::new(from_timestamp(start), from_timestamp(end))
    }

    pub fn set_start(&mut self, start: Option<OffsetDateTime>) {
        self.start = start;
    }

    pub fn set_end(&mut self, end: Option<OffsetDateTime>) {
        self.end = end;
    }

    pub fn start(&self) -> OffsetDateTime {
        self.start.unwrap_or(DEFAULT_START)
    }

    pub fn end(&self) -> OffsetDateTime {
        self.end.unwrap_or_else(OffsetDateTime::now_utc)
    }

    /// Lower bound on the start day, exclusive upper bound the day after the
    /// end day so the whole end day is included.
    pub fn query_filter(&self) -> DateFilter {
        let end = self.end().date();
        DateFilter {
            lower: Some(self.start().date()),
            upper: end.checked_add(Duration::DAY).or(Some(end)),
        }
    }

    /// `-{start}`, `-{start}-{end}` or `-{end}` in `YYYY_MM_DD` form.
    pub fn file_suffix(&self) -> String {
        file_date_suffix(Some(self.start().date()), Some(self.end().date()))
    }
}

fn from_timestamp(timestamp: i64) -> Option<OffsetDateTime> {
    if timestamp <= 0 {
        return None;
    }
    OffsetDateTime::from_unix_timestamp(timestamp).ok()
}

pub(crate) fn file_date_suffix(start: Option<Date>, end: Option<Date>) -> String {
    let mut range = String::new();

    if start.is_some() || end.is_some() {
        range.push('-');
    }

    if let Some(start) = start {
        range.push_str(&format_date(start, FILE_DATE));
    }

    if start == end {
        return range;
    }

    if start.is_some() && end.is_some() {
        range.push('-');
    }

    if let Some(end) = end {
        range.push_str(&format_date(end, FILE_DATE));
    }

    range
}

/// Date filter shared by every report producer: `lower <= day < upper`.
///
/// The same value renders the SQL fragment for relational stores and filters
/// timestamps for in-memory stores, so both apply identical bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFilter {
    pub lower: Option<Date>,
    pub upper: Option<Date>,
}

impl DateFilter {
    pub fn matches(&self, at: PrimitiveDateTime) -> bool {
        let day = at.date();
        self.lower.map_or(true, |lower| day >= lower) && self.upper.map_or(true, |upper| day < upper)
    }

    /// SQL `AND` fragment against `{alias}.post_date`.
    pub fn to_sql(&self, alias: &str) -> String {
        let alias: String = alias
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
            .collect();
        let mut fragment = String::new();

        if let Some(lower) = self.lower {
            fragment.push_str(&format!(
                " AND {alias}.post_date >= '{}'",
                format_date(lower, SQL_DATE)
            ));
        }
        if let Some(upper) = self.upper {
            fragment.push_str(&format!(
                " AND {alias}.post_date < '{}'",
                format_date(upper, SQL_DATE)
            ));
        }

        fragment
    }
}

fn format_date(date: Date, format: &[BorrowedFormatItem<'_>]) -> String {
    date.format(format).unwrap_or_default()
}

/// `MM-DD-YYYY`, the table cell form.
pub fn format_cell_date(at: OffsetDateTime) -> String {
    format_date(at.date(), CELL_DATE)
}

/// `January 1, 2013`, the date picker form.
pub fn format_long_date(at: OffsetDateTime) -> String {
    format_date(at.date(), LONG_DATE)
}

/// `Jan 01, 2013`, used for chart labels.
pub fn format_short_date(at: OffsetDateTime) -> String {
    format_date(at.date(), SHORT_DATE)
}

/// `YYYY-MM-DD`.
pub fn format_sql_date(at: OffsetDateTime) -> String {
    format_date(at.date(), SQL_DATE)
}

/// Parse a stored or human-entered date. Dates without a time are read as
/// midnight UTC; offsets are normalised to UTC.
pub fn parse_datetime(input: &str) -> Option<OffsetDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(parsed) = OffsetDateTime::parse(input, &Rfc3339) {
        return Some(parsed.to_offset(time::UtcOffset::UTC));
    }

    for format in DATETIME_INPUTS {
        if let Ok(parsed) = PrimitiveDateTime::parse(input, *format) {
            return Some(parsed.assume_utc());
        }
    }

    DATE_INPUTS
        .iter()
        .find_map(|format| Date::parse(input, *format).ok())
        .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc())
}
