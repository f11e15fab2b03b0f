use std::cmp::Ordering;

use bson::{doc, Document};

use crate::models::document::DocumentRecord;
use crate::search::query::{QueryDescriptor, SortField, SortOrder};

/// Attribute used in field-sort mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date,
    Author,
}

/// Ordering over matching records.
///
/// Every strategy is a total order: after its primary key it falls back to
/// `updatedAt` and finally to the unique `slug`, so repeated queries over an
/// unchanged corpus paginate identically.
#[derive(Debug, Clone, PartialEq)]
pub enum RankingStrategy {
    /// Weighted term match, score descending, then `updatedAt` descending.
    Relevance { term: String },
    /// Named attribute in the requested order.
    Field { key: SortKey, order: SortOrder },
}

impl RankingStrategy {
    pub fn from_query(query: &QueryDescriptor) -> Self {
        if query.is_relevance_mode() {
            return RankingStrategy::Relevance {
                term: query.q.to_lowercase(),
            };
        }
        match query.sort_field {
            // No term to score against: most recent first.
            SortField::Relevance => RankingStrategy::Field {
                key: SortKey::Date,
                order: SortOrder::Desc,
            },
            SortField::Date => RankingStrategy::Field {
                key: SortKey::Date,
                order: query.sort_order,
            },
            SortField::Author => RankingStrategy::Field {
                key: SortKey::Author,
                order: query.sort_order,
            },
        }
    }

    pub fn is_relevance(&self) -> bool {
        matches!(self, RankingStrategy::Relevance { .. })
    }

    /// Relevance score of a record, `None` in field-sort mode.
    pub fn score(&self, record: &DocumentRecord) -> Option<f64> {
        match self {
            RankingStrategy::Relevance { term } => Some(f64::from(record.text_score(term))),
            RankingStrategy::Field { .. } => None,
        }
    }

    /// Order two records. `Less` means `a` ranks first.
    pub fn compare(&self, a: &DocumentRecord, b: &DocumentRecord) -> Ordering {
        let primary = match self {
            RankingStrategy::Relevance { term } => {
                b.text_score(term)
                    .cmp(&a.text_score(term))
                    .then_with(|| b.updated_at.cmp(&a.updated_at))
            }
            RankingStrategy::Field {
                key: SortKey::Date,
                order,
            } => directed(a.updated_at.cmp(&b.updated_at), *order),
            // Ties on author are always newest first, whatever the order.
            RankingStrategy::Field {
                key: SortKey::Author,
                order,
            } => directed(a.author.cmp(&b.author), *order)
                .then_with(|| b.updated_at.cmp(&a.updated_at)),
        };
        primary.then_with(|| a.slug.cmp(&b.slug))
    }

    /// Sort records in place by this strategy.
    pub fn sort(&self, records: &mut [&DocumentRecord]) {
        match self {
            // Score each record once instead of on every comparison.
            RankingStrategy::Relevance { term } => {
                records.sort_by_cached_key(|r| {
                    (
                        std::cmp::Reverse(r.text_score(term)),
                        std::cmp::Reverse(r.updated_at),
                        r.slug.clone(),
                    )
                });
            }
            RankingStrategy::Field { .. } => records.sort_by(|a, b| self.compare(a, b)),
        }
    }

    /// Render as a MongoDB sort document. Relevance uses the store's text
    /// score, which is weighted by the `TextSearch` index.
    pub fn to_index_sort(&self) -> Document {
        match self {
            RankingStrategy::Relevance { .. } => doc! {
                "score": { "$meta": "textScore" },
                "updatedAt": -1,
                "slug": 1,
            },
            RankingStrategy::Field {
                key: SortKey::Date,
                order,
            } => doc! {
                "updatedAt": direction(*order),
                "slug": 1,
            },
            RankingStrategy::Field {
                key: SortKey::Author,
                order,
            } => doc! {
                "author": direction(*order),
                "updatedAt": -1,
                "slug": 1,
            },
        }
    }
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

fn direction(order: SortOrder) -> i32 {
    match order {
        SortOrder::Asc => 1,
        SortOrder::Desc => -1,
    }
}
