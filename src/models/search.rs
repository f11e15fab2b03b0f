use serde::{Deserialize, Serialize};

use crate::models::document::DocumentSummary;

/// Search request parameters exactly as received, before normalisation.
///
/// Every field is optional and string-typed; see
/// [`QueryDescriptor::from_params`](crate::search::query::QueryDescriptor::from_params)
/// for how they are interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSearchParams {
    pub q: Option<String>,
    pub types: Option<String>,
    pub tags: Option<String>,
    pub author: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl RawSearchParams {
    /// Parse a raw URL query string (without the leading `?`).
    ///
    /// Never fails: invalid percent-encoding is decoded lossily, unknown keys
    /// are ignored and the last occurrence of a repeated key wins.
    pub fn from_query_string(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "q" => &mut params.q,
                "types" => &mut params.types,
                "tags" => &mut params.tags,
                "author" => &mut params.author,
                "from" => &mut params.from,
                "to" => &mut params.to,
                "sort" => &mut params.sort,
                "order" => &mut params.order,
                "page" => &mut params.page,
                "limit" => &mut params.limit,
                _ => continue,
            };
            *slot = Some(value.into_owned());
        }
        params
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub items: Vec<DocumentSummary>,
    /// Number of matching documents before pagination.
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_query_string() {
        let params = RawSearchParams::from_query_string(
            "q=api+docs&types=markdown,pdf&tags=guide%2Cintro&sort=date&order=asc&page=2&limit=5",
        );
        assert_eq!(params.q.as_deref(), Some("api docs"));
        assert_eq!(params.types.as_deref(), Some("markdown,pdf"));
        assert_eq!(params.tags.as_deref(), Some("guide,intro"));
        assert_eq!(params.sort.as_deref(), Some("date"));
        assert_eq!(params.order.as_deref(), Some("asc"));
        assert_eq!(params.page.as_deref(), Some("2"));
        assert_eq!(params.limit.as_deref(), Some("5"));
        assert_eq!(params.author, None);
    }

    #[test]
    fn test_from_query_string_is_lenient() {
        let params = RawSearchParams::from_query_string("page=1&page=3&bogus=%zz&author=%E2%28");
        assert_eq!(params.page.as_deref(), Some("3"));
        assert!(params.author.is_some());

        assert_eq!(RawSearchParams::from_query_string(""), RawSearchParams::default());
    }
}
