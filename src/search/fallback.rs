use std::sync::Arc;

use async_trait::async_trait;

use crate::db::corpus::MemoryCorpus;
use crate::error::AppError;
use crate::models::document::{DocumentRecord, DocumentSummary};
use crate::search::backend::{BackendKind, MatchSet, StorageBackend, Window};
use crate::search::filter::FilterPredicate;
use crate::search::ranking::RankingStrategy;

/// In-process backend over a fixed corpus.
///
/// Evaluates the predicate and ranking exactly, which makes it the reference
/// the indexed backend is checked against. It ignores the window and always
/// returns the full ranked list.
pub struct FallbackBackend {
    corpus: Arc<MemoryCorpus>,
}

impl FallbackBackend {
    pub fn new(corpus: Arc<MemoryCorpus>) -> Self {
        Self { corpus }
    }
}

#[async_trait]
impl StorageBackend for FallbackBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Fallback
    }

    async fn search(
        &self,
        predicate: &FilterPredicate,
        ranking: &RankingStrategy,
        _window: Window,
    ) -> Result<MatchSet, AppError> {
        let mut matches: Vec<&DocumentRecord> = self
            .corpus
            .records()
            .iter()
            .filter(|record| predicate.matches(record))
            .collect();

        ranking.sort(&mut matches);

        let hits: Vec<DocumentSummary> = matches
            .iter()
            .map(|record| DocumentSummary::from_record(record, ranking.score(record)))
            .collect();

        tracing::debug!(
            corpus = self.corpus.len(),
            matched = hits.len(),
            "fallback search evaluated"
        );

        Ok(MatchSet {
            total: hits.len() as u64,
            offset: 0,
            hits,
        })
    }
}
