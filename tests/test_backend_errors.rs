mod common;

use std::sync::Arc;

use docusphere::db::index::IndexedDocument;
use docusphere::error::AppError;
use docusphere::search::indexed::IndexedBackend;

use common::{fixture_records, server, server_permissive, slugs, MockIndex};

fn stored(slugs: &[&str]) -> Vec<IndexedDocument> {
    fixture_records()
        .iter()
        .filter(|r| slugs.contains(&r.slug.as_str()))
        .map(IndexedDocument::from_record)
        .collect()
}

#[tokio::test]
async fn test_store_failure_is_an_opaque_500() {
    let mut index = MockIndex::new();
    index
        .expect_find()
        .returning(|_| Err(AppError::Database("connection reset by db-7.internal".into())));
    index.expect_count().returning(|_| Ok(3));

    let server = server_permissive(Arc::new(IndexedBackend::new(Arc::new(index))));
    let response = server.get("/api/search").add_query_param("q", "api").await;

    response.assert_status_internal_server_error();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Search backend unavailable");
    assert!(!response.text().contains("db-7"));
}

#[tokio::test]
async fn test_count_failure_is_an_opaque_500() {
    let mut index = MockIndex::new();
    index.expect_find().returning(|_| Ok(vec![]));
    index
        .expect_count()
        .returning(|_| Err(AppError::Unavailable("server selection timeout".into())));

    let server = server_permissive(Arc::new(IndexedBackend::new(Arc::new(index))));
    let response = server.get("/api/search").await;

    response.assert_status_internal_server_error();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Search backend unavailable");
}

#[tokio::test]
async fn test_window_is_pushed_down() {
    let mut index = MockIndex::new();
    index
        .expect_find()
        .withf(|query| query.skip == 10 && query.limit == 5 && !query.with_score)
        .times(1)
        .returning(|_| Ok(stored(&["export-pdf", "pdf-import"])));
    index
        .expect_count()
        .times(1)
        .returning(|filter| {
            assert_eq!(filter.get_str("author").unwrap(), "tools");
            Ok(12)
        });

    let server = server(Arc::new(IndexedBackend::new(Arc::new(index))));
    let result = common::search(&server, "author=tools&page=3&limit=5&sort=date").await;

    assert_eq!(slugs(&result), vec!["export-pdf", "pdf-import"]);
    assert_eq!(result.total, 12);
    assert_eq!(result.pages, 3);
    assert_eq!(result.page, 3);
}

#[tokio::test]
async fn test_relevance_query_asks_for_the_score() {
    let mut index = MockIndex::new();
    index
        .expect_find()
        .withf(|query| {
            query.with_score
                && query.filter.get_document("$text").unwrap().get_str("$search").unwrap() == "api"
                && query.sort.keys().next().map(String::as_str) == Some("score")
        })
        .times(1)
        .returning(|_| {
            let mut docs = stored(&["api-reference"]);
            docs[0].score = Some(4.5);
            Ok(docs)
        });
    index.expect_count().returning(|_| Ok(1));

    let server = server(Arc::new(IndexedBackend::new(Arc::new(index))));
    let result = common::search(&server, "q=API").await;

    assert_eq!(slugs(&result), vec!["api-reference"]);
    assert_eq!(result.items[0].score, Some(4.5));
}
