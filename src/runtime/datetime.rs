//! String to instant conversion for the `datetime()` item method.

use std::fmt;

use time::format_description::well_known::{Iso8601, Rfc3339};
use time::format_description::{self, OwnedFormatItem};
use time::{Date, OffsetDateTime, PrimitiveDateTime};

// Longest tokens first so `HH24` wins over `HH` and `TZH` over a literal `T`.
const TEMPLATE_TOKENS: &[(&str, &str)] = &[
    ("YYYY", "[year]"),
    ("HH24", "[hour]"),
    ("TZH", "[offset_hour sign:mandatory]"),
    ("TZM", "[offset_minute]"),
    ("MM", "[month]"),
    ("DD", "[day]"),
    ("HH", "[hour]"),
    ("MI", "[minute]"),
    ("SS", "[second]"),
    ("FF", "[subsecond]"),
];

/// A `datetime("...")` template compiled to a `time` format description.
///
/// Recognized tokens: `YYYY MM DD HH24 HH MI SS FF TZH TZM`. Everything else
/// is matched literally.
#[derive(Clone)]
pub struct DateTemplate {
    source: String,
    format: OwnedFormatItem,
}

impl DateTemplate {
    pub fn new(template: &str) -> Result<Self, String> {
        let mut description = String::new();
        let mut rest = template;
        'outer: while !rest.is_empty() {
            for (token, component) in TEMPLATE_TOKENS {
                if let Some(after) = rest.strip_prefix(token) {
                    description.push_str(component);
                    rest = after;
                    continue 'outer;
                }
            }
            let mut chars = rest.chars();
            if let Some(ch) = chars.next() {
                if ch == '[' {
                    description.push_str("[[");
                } else {
                    description.push(ch);
                }
            }
            rest = chars.as_str();
        }

        let format = format_description::parse_owned::<1>(&description)
            .map_err(|e| format!("invalid datetime template \"{template}\": {e}"))?;
        Ok(DateTemplate {
            source: template.to_string(),
            format,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Missing offset means UTC, missing time means midnight.
    pub fn parse(&self, text: &str) -> Option<OffsetDateTime> {
        OffsetDateTime::parse(text, &self.format)
            .or_else(|_| PrimitiveDateTime::parse(text, &self.format).map(|dt| dt.assume_utc()))
            .or_else(|_| Date::parse(text, &self.format).map(|d| d.midnight().assume_utc()))
            .ok()
    }
}

/// Parses an ISO 8601 / RFC 3339 instant, a local date-time, or a bare date.
pub fn parse_iso(text: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(text, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(text, &Iso8601::DEFAULT))
        .or_else(|_| PrimitiveDateTime::parse(text, &Iso8601::DEFAULT).map(|dt| dt.assume_utc()))
        .or_else(|_| Date::parse(text, &Iso8601::DEFAULT).map(|d| d.midnight().assume_utc()))
        .ok()
}

impl PartialEq for DateTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for DateTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DateTemplate").field(&self.source).finish()
    }
}
