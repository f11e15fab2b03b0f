use std::fmt;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::document::DocumentSummary;
use crate::search::filter::FilterPredicate;
use crate::search::ranking::RankingStrategy;

/// Which implementation answers queries for this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Durable, natively indexed document store.
    Indexed,
    /// In-process corpus used when the store is unreachable at startup.
    Fallback,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Indexed => write!(f, "indexed"),
            BackendKind::Fallback => write!(f, "fallback"),
        }
    }
}

/// The slice of the ranked list the caller will keep.
///
/// Backends may use it to bound their work; they are free to ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub skip: u64,
    pub limit: u64,
}

/// Ranked matches returned by a backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchSet {
    /// Consecutive run of the ranked list, starting at rank `offset`.
    pub hits: Vec<DocumentSummary>,
    /// Rank (0-based) of `hits[0]` in the full ordering.
    pub offset: u64,
    /// Count of every predicate-matching record, independent of the window.
    pub total: u64,
}

/// Trait for search execution, enabling mock testing and the
/// indexed/fallback split.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Filter and rank the corpus.
    ///
    /// Summaries carry a score only under a relevance strategy.
    async fn search(
        &self,
        predicate: &FilterPredicate,
        ranking: &RankingStrategy,
        window: Window,
    ) -> Result<MatchSet, AppError>;
}
