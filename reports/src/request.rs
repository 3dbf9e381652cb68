//! Per-request report inputs.

use time::OffsetDateTime;
use tracing::debug;

use crate::core::date::{format_sql_date, parse_datetime, DateRange};

/// Optional `start_date`, `end_date` and `achievement_id` read once per
/// request. Values that fail to parse are dropped so the defaults apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub start_date: Option<OffsetDateTime>,
    pub end_date: Option<OffsetDateTime>,
    pub achievement_id: Option<u64>,
}

impl RequestContext {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut ctx = Self::default();

        for (key, value) in pairs {
            let value = value.as_ref().trim();
            match key.as_ref() {
                "start_date" => ctx.start_date = parse_date_field("start_date", value),
                "end_date" => ctx.end_date = parse_date_field("end_date", value),
                "achievement_id" => {
                    ctx.achievement_id = value.parse().ok().filter(|id| *id > 0);
                }
                _ => {}
            }
        }

        ctx
    }

    /// Parse an `application/x-www-form-urlencoded` query or form body.
    pub fn from_query(query: &str) -> Self {
        let pairs = query
            .trim_start_matches('?')
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(key), decode_component(value))
            });
        Self::from_pairs(pairs)
    }

    /// Fields set in `submitted` replace this context's; unset ones keep it.
    pub fn merged(self, submitted: RequestContext) -> Self {
        Self {
            start_date: submitted.start_date.or(self.start_date),
            end_date: submitted.end_date.or(self.end_date),
            achievement_id: submitted.achievement_id.or(self.achievement_id),
        }
    }

    /// Query string for the set fields, readable by [`RequestContext::from_query`].
    pub fn to_query(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(start) = self.start_date {
            pairs.push(format!("start_date={}", format_sql_date(start)));
        }
        if let Some(end) = self.end_date {
            pairs.push(format!("end_date={}", format_sql_date(end)));
        }
        if let Some(id) = self.achievement_id {
            pairs.push(format!("achievement_id={id}"));
        }
        pairs.join("&")
    }

    pub fn date_range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }
}

fn parse_date_field(name: &str, value: &str) -> Option<OffsetDateTime> {
    if value.is_empty() {
        return None;
    }
    let parsed = parse_datetime(value);
    if parsed.is_none() {
        debug!(field = name, value, "ignoring unparseable date");
    }
    parsed
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn parses_form_encoded_dates() {
        let ctx = RequestContext::from_query(
            "start_date=January+1%2C+2023&end_date=2023-01-31&achievement_id=42",
        );
        assert_eq!(ctx.start_date, Some(datetime!(2023-01-01 0:00 UTC)));
        assert_eq!(ctx.end_date, Some(datetime!(2023-01-31 0:00 UTC)));
        assert_eq!(ctx.achievement_id, Some(42));
    }

    #[test]
    fn bad_values_fall_back_to_defaults() {
        let ctx = RequestContext::from_pairs([
            ("start_date", "someday"),
            ("end_date", ""),
            ("achievement_id", "abc"),
        ]);
        assert_eq!(ctx, RequestContext::default());
        assert_eq!(ctx.date_range().start(), crate::core::date::DEFAULT_START);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let ctx = RequestContext::from_query("?page=earnings-report&achievement_id=7");
        assert_eq!(ctx.achievement_id, Some(7));
        assert_eq!(ctx.start_date, None);
    }

    #[test]
    fn submitted_dates_keep_drill_down_id() {
        let current = RequestContext::from_query("achievement_id=10");
        let submitted = RequestContext::from_pairs([
            ("start_date", "January 1, 2023"),
            ("end_date", "January 31, 2023"),
        ]);
        let next = current.merged(submitted);

        assert_eq!(
            next.to_query(),
            "start_date=2023-01-01&end_date=2023-01-31&achievement_id=10"
        );
        assert_eq!(RequestContext::from_query(&next.to_query()), next);
        assert_eq!(RequestContext::default().to_query(), "");
    }
}
