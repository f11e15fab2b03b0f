use std::sync::Arc;

use async_trait::async_trait;

use crate::db::index::{DocumentIndex, IndexQuery};
use crate::error::AppError;
use crate::models::document::DocumentSummary;
use crate::search::backend::{BackendKind, MatchSet, StorageBackend, Window};
use crate::search::filter::FilterPredicate;
use crate::search::ranking::RankingStrategy;

/// Backend that defers filtering, scoring and sorting to the native store.
///
/// The window is pushed down as `skip`/`limit`; the total comes from a
/// separate exact count over the same filter.
pub struct IndexedBackend {
    index: Arc<dyn DocumentIndex>,
}

impl IndexedBackend {
    pub fn new(index: Arc<dyn DocumentIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl StorageBackend for IndexedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Indexed
    }

    async fn search(
        &self,
        predicate: &FilterPredicate,
        ranking: &RankingStrategy,
        window: Window,
    ) -> Result<MatchSet, AppError> {
        let with_score = ranking.is_relevance();
        let query = IndexQuery {
            filter: predicate.to_index_filter(),
            sort: ranking.to_index_sort(),
            skip: window.skip,
            limit: i64::try_from(window.limit).unwrap_or(i64::MAX),
            with_score,
        };

        let (docs, total) =
            futures::try_join!(self.index.find(&query), self.index.count(&query.filter))?;

        let hits = docs
            .into_iter()
            .map(|doc| {
                let score = if with_score { doc.score } else { None };
                DocumentSummary::from_record(&doc.into_record(), score)
            })
            .collect();

        Ok(MatchSet {
            hits,
            offset: window.skip,
            total,
        })
    }
}
