use std::sync::Arc;

use crate::error::AppError;
use crate::models::search::{RawSearchParams, SearchResponse};
use crate::search::backend::{BackendKind, MatchSet, StorageBackend, Window};
use crate::search::filter::FilterPredicate;
use crate::search::query::QueryDescriptor;
use crate::search::ranking::RankingStrategy;

/// Parses, filters, ranks and paginates each request against the backend
/// chosen at startup.
pub struct SearchCoordinator {
    backend: Arc<dyn StorageBackend>,
}

impl SearchCoordinator {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub async fn search(&self, params: &RawSearchParams) -> Result<SearchResponse, AppError> {
        let query = QueryDescriptor::from_params(params);
        let predicate = FilterPredicate::from_query(&query);
        let ranking = RankingStrategy::from_query(&query);
        let window = Window {
            skip: query.skip(),
            limit: query.limit,
        };

        let matches = self.backend.search(&predicate, &ranking, window).await?;
        let response = paginate(matches, query.page, query.limit);

        tracing::debug!(
            backend = %self.backend.kind(),
            total = response.total,
            page = response.page,
            returned = response.items.len(),
            "search completed"
        );

        Ok(response)
    }
}

/// Cut page `page` (1-based) of size `limit` out of a match set.
///
/// `limit` must be at least 1. Pages past the end come back empty.
pub fn paginate(matches: MatchSet, page: u64, limit: u64) -> SearchResponse {
    let start = page.saturating_sub(1).saturating_mul(limit);
    let relative = start.saturating_sub(matches.offset);
    let relative = usize::try_from(relative).unwrap_or(usize::MAX);
    let take = usize::try_from(limit).unwrap_or(usize::MAX);

    let items = matches.hits.into_iter().skip(relative).take(take).collect();

    SearchResponse {
        items,
        total: matches.total,
        page,
        pages: matches.total.div_ceil(limit),
    }
}
