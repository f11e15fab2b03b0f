#![allow(dead_code)]

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use bson::{Bson, Document};

use docusphere::app::{router, AppState};
use docusphere::db::corpus::MemoryCorpus;
use docusphere::db::index::{DocumentIndex, IndexQuery, IndexedDocument};
use docusphere::error::AppError;
use docusphere::models::document::{DocumentRecord, DocumentType};
use docusphere::models::search::SearchResponse;
use docusphere::search::backend::StorageBackend;
use docusphere::search::fallback::FallbackBackend;
use docusphere::search::indexed::IndexedBackend;

/// A fixed corpus with deliberate ties on `updatedAt` and `author`.
///
/// The first three records are the built-in sample documents.
pub fn fixture_records() -> Vec<DocumentRecord> {
    let mut records = MemoryCorpus::sample().records().to_vec();
    records.extend([
        record(
            "Importing PDF files",
            "pdf-import",
            DocumentType::Pdf,
            &["import", "pdf"],
            "tools",
            "Import PDF files into the workspace.",
            "2025-01-15T09:00:00Z",
        ),
        record(
            "Scripting Guide",
            "scripting-guide",
            DocumentType::Word,
            &["api", "guide"],
            "alice",
            "Calling the API from scripts.",
            "2025-02-10T08:00:00Z",
        ),
        record(
            "Release Notes",
            "release-notes",
            DocumentType::Markdown,
            &["changelog"],
            "alice",
            "What changed in this release, including rapid api fixes.",
            "2025-03-01T00:00:00Z",
        ),
        record(
            "Style Guide",
            "style-guide",
            DocumentType::Word,
            &["guide"],
            "bob",
            "Writing style for documentation.",
            "2025-01-15T09:00:00Z",
        ),
        record(
            "API Changelog",
            "api-changelog",
            DocumentType::Markdown,
            &["api", "changelog"],
            "bob",
            "Breaking changes per version.",
            "2025-03-01T00:00:00Z",
        ),
    ]);
    records
}

pub fn record(
    title: &str,
    slug: &str,
    doc_type: DocumentType,
    tags: &[&str],
    author: &str,
    content: &str,
    updated_at: &str,
) -> DocumentRecord {
    DocumentRecord {
        id: format!("fixture-{slug}"),
        title: title.to_string(),
        slug: slug.to_string(),
        doc_type,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        author: author.to_string(),
        content_text: content.to_string(),
        updated_at: updated_at.parse().expect("valid fixture timestamp"),
    }
}

pub fn fallback_backend(records: Vec<DocumentRecord>) -> Arc<dyn StorageBackend> {
    let corpus = MemoryCorpus::new(records).expect("valid fixture corpus");
    Arc::new(FallbackBackend::new(Arc::new(corpus)))
}

pub fn indexed_backend(records: &[DocumentRecord]) -> Arc<dyn StorageBackend> {
    Arc::new(IndexedBackend::new(Arc::new(InMemoryIndex::new(records))))
}

/// Build an `axum_test::TestServer` answering from `backend`.
pub fn server(backend: Arc<dyn StorageBackend>) -> axum_test::TestServer {
    axum_test::TestServer::builder()
        .expect_success_by_default()
        .build(router(AppState::new(backend)))
}

/// Build a `TestServer` that does NOT expect success by default (for error tests).
pub fn server_permissive(backend: Arc<dyn StorageBackend>) -> axum_test::TestServer {
    axum_test::TestServer::builder()
        .build(router(AppState::new(backend)))
}

/// Helper: run a search with a raw query string and decode the body.
pub async fn search(server: &axum_test::TestServer, query: &str) -> SearchResponse {
    let response = server.get(&format!("/api/search?{query}")).await;
    response.assert_status_ok();
    response.json::<SearchResponse>()
}

pub fn slugs(response: &SearchResponse) -> Vec<&str> {
    response.items.iter().map(|i| i.slug.as_str()).collect()
}

/// In-process stand-in for the MongoDB collection.
///
/// Interprets the subset of the query language the indexed backend emits
/// (`$in`, `$all`, equality, `$gte`/`$lte`, `$text`, and `$meta` text score
/// sorts) so the indexed backend's translation can be checked against the
/// fallback backend over the same corpus. The text score uses the same field
/// weights as the `TextSearch` index with substring matching.
pub struct InMemoryIndex {
    docs: Vec<IndexedDocument>,
}

impl InMemoryIndex {
    pub fn new(records: &[DocumentRecord]) -> Self {
        Self {
            docs: records.iter().map(IndexedDocument::from_record).collect(),
        }
    }

    fn text_score(doc: &IndexedDocument, term: &str) -> f64 {
        f64::from(doc.clone().into_record().text_score(&term.to_lowercase()))
    }

    fn matches(doc: &IndexedDocument, filter: &Document) -> bool {
        filter.iter().all(|(key, cond)| match key.as_str() {
            "type" => operand_strings(cond, "$in")
                .iter()
                .any(|t| t == doc.doc_type.as_str()),
            "tags" => operand_strings(cond, "$all")
                .iter()
                .all(|t| doc.tags.contains(t)),
            "author" => cond.as_str() == Some(doc.author.as_str()),
            "updatedAt" => {
                let range = cond.as_document().expect("range operand");
                let at = bson::DateTime::from_chrono(doc.updated_at);
                range.get_datetime("$gte").map_or(true, |from| at >= *from)
                    && range.get_datetime("$lte").map_or(true, |to| at <= *to)
            }
            "$text" => Self::text_score(doc, text_term(cond)) > 0.0,
            other => panic!("unsupported filter key {other}"),
        })
    }

    fn compare(a: &IndexedDocument, b: &IndexedDocument, sort: &Document) -> Ordering {
        for (key, direction) in sort {
            let ordering = if key == "score" {
                // $meta sorts are always descending
                b.score.unwrap_or(0.0).total_cmp(&a.score.unwrap_or(0.0))
            } else {
                let ascending = match key.as_str() {
                    "updatedAt" => a.updated_at.cmp(&b.updated_at),
                    "author" => a.author.cmp(&b.author),
                    "slug" => a.slug.cmp(&b.slug),
                    other => panic!("unsupported sort key {other}"),
                };
                if direction.as_i32() == Some(-1) {
                    ascending.reverse()
                } else {
                    ascending
                }
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

fn operand_strings(cond: &Bson, op: &str) -> Vec<String> {
    cond.as_document()
        .and_then(|d| d.get_array(op).ok())
        .expect("array operand")
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn text_term(cond: &Bson) -> &str {
    cond.as_document()
        .and_then(|d| d.get_str("$search").ok())
        .expect("$search operand")
}

#[async_trait]
impl DocumentIndex for InMemoryIndex {
    async fn find(&self, query: &IndexQuery) -> Result<Vec<IndexedDocument>, AppError> {
        let term = query.filter.get("$text").map(text_term);

        let mut hits: Vec<IndexedDocument> = self
            .docs
            .iter()
            .filter(|doc| Self::matches(doc, &query.filter))
            .cloned()
            .map(|mut doc| {
                doc.score = term.map(|t| Self::text_score(&doc, t));
                doc
            })
            .collect();

        hits.sort_by(|a, b| Self::compare(a, b, &query.sort));

        Ok(hits
            .into_iter()
            .skip(usize::try_from(query.skip).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
            .map(|mut doc| {
                // Mirror the projection
                doc.content_text.clear();
                if !query.with_score {
                    doc.score = None;
                }
                doc
            })
            .collect())
    }

    async fn count(&self, filter: &Document) -> Result<u64, AppError> {
        Ok(self.docs.iter().filter(|doc| Self::matches(doc, filter)).count() as u64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn ensure_indexes(&self) -> Result<(), AppError> {
        Ok(())
    }
}

mockall::mock! {
    pub Index {}

    #[async_trait]
    impl DocumentIndex for Index {
        async fn find(&self, query: &IndexQuery) -> Result<Vec<IndexedDocument>, AppError>;
        async fn count(&self, filter: &Document) -> Result<u64, AppError>;
        async fn ping(&self) -> Result<(), AppError>;
        async fn ensure_indexes(&self) -> Result<(), AppError>;
    }
}
