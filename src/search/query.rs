use std::collections::BTreeSet;
use std::num::IntErrorKind;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::models::search::RawSearchParams;

pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Relevance,
    Date,
    Author,
}

impl SortField {
    /// Missing means relevance; anything unrecognised means date.
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()) {
            None => SortField::Relevance,
            Some(s) if s.is_empty() || s == "relevance" => SortField::Relevance,
            Some(s) if s == "author" => SortField::Author,
            Some(_) => SortField::Date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.trim().eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

/// A normalised search request.
///
/// Built from the raw, string-typed parameters. Construction never fails:
/// anything malformed is replaced by its default or clamped into range.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    /// Free-text term, trimmed. Empty means no text criterion.
    pub q: String,
    /// Allowed document types. Empty means unrestricted.
    pub types: BTreeSet<String>,
    /// Tags a document must all carry.
    pub tags: BTreeSet<String>,
    pub author: Option<String>,
    pub updated_from: Option<DateTime<Utc>>,
    pub updated_to: Option<DateTime<Utc>>,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    /// 1-based.
    pub page: u64,
    /// Within `[1, MAX_LIMIT]`.
    pub limit: u64,
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        Self::from_params(&RawSearchParams::default())
    }
}

impl QueryDescriptor {
    pub fn from_params(params: &RawSearchParams) -> Self {
        let q = params.q.as_deref().map(str::trim).unwrap_or_default().to_string();
        let author = params
            .author
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .map(str::to_string);

        Self {
            q,
            types: split_list(params.types.as_deref()),
            tags: split_list(params.tags.as_deref()),
            author,
            updated_from: params.from.as_deref().and_then(parse_timestamp),
            updated_to: params.to.as_deref().and_then(parse_timestamp),
            sort_field: SortField::parse(params.sort.as_deref()),
            sort_order: SortOrder::parse(params.order.as_deref()),
            page: parse_clamped(params.page.as_deref(), 1, 1, u64::MAX),
            limit: parse_clamped(params.limit.as_deref(), DEFAULT_LIMIT, 1, MAX_LIMIT),
        }
    }

    pub fn has_text(&self) -> bool {
        !self.q.is_empty()
    }

    /// Relevance ranking applies only to a non-empty term.
    pub fn is_relevance_mode(&self) -> bool {
        self.has_text() && self.sort_field == SortField::Relevance
    }

    /// Number of ranked matches preceding the requested page.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Split a comma-separated list, trimming tokens and dropping blanks.
fn split_list(raw: Option<&str>) -> BTreeSet<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Parse an integer, substituting `default` when it is not one and clamping
/// the result into `[min, max]`. Integers too large to represent clamp to the
/// nearer bound.
fn parse_clamped(raw: Option<&str>, default: u64, min: u64, max: u64) -> u64 {
    let value = match raw.map(|s| s.trim().parse::<i128>()) {
        Some(Ok(n)) => n,
        Some(Err(e)) => match e.kind() {
            IntErrorKind::PosOverflow => return max,
            IntErrorKind::NegOverflow => return min,
            _ => return default.clamp(min, max),
        },
        None => return default.clamp(min, max),
    };
    let clamped = value.clamp(i128::from(min), i128::from(max));
    u64::try_from(clamped).unwrap_or(max)
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (UTC) or a bare date
/// (UTC midnight).
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
