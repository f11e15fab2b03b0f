use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Document};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::document::{DocumentRecord, DocumentType, TextField};

/// Name of the weighted full-text index over the searchable fields.
pub const TEXT_INDEX_NAME: &str = "TextSearch";

/// A document as stored in the `documents` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub author: String,
    /// Not projected by search queries.
    #[serde(default)]
    pub content_text: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
    /// Text score projected by the store for `$text` queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl IndexedDocument {
    pub fn from_record(record: &DocumentRecord) -> Self {
        Self {
            id: ObjectId::parse_str(&record.id).ok(),
            title: record.title.clone(),
            slug: record.slug.clone(),
            doc_type: record.doc_type,
            tags: record.tags.iter().cloned().collect(),
            author: record.author.clone(),
            content_text: record.content_text.clone(),
            updated_at: record.updated_at,
            score: None,
        }
    }

    pub fn into_record(self) -> DocumentRecord {
        DocumentRecord {
            id: self.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            title: self.title,
            slug: self.slug,
            doc_type: self.doc_type,
            tags: self.tags.into_iter().collect(),
            author: self.author,
            content_text: self.content_text,
            updated_at: self.updated_at,
        }
    }
}

/// A native find request: filter, sort and window.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuery {
    pub filter: Document,
    pub sort: Document,
    pub skip: u64,
    pub limit: i64,
    /// Project the `$text` score into `score`.
    pub with_score: bool,
}

impl IndexQuery {
    /// Fields returned for each hit. The content body is left out.
    pub fn projection(&self) -> Document {
        let mut projection = doc! {
            "title": 1,
            "slug": 1,
            "type": 1,
            "tags": 1,
            "author": 1,
            "updatedAt": 1,
        };
        if self.with_score {
            projection.insert("score", doc! { "$meta": "textScore" });
        }
        projection
    }
}

/// Trait for native document store queries.
///
/// This trait allows replacing the database layer in tests.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    /// Run a filtered, sorted, windowed find.
    async fn find(&self, query: &IndexQuery) -> Result<Vec<IndexedDocument>, AppError>;

    /// Count every document matching `filter`.
    async fn count(&self, filter: &Document) -> Result<u64, AppError>;

    /// Round-trip to the store to prove it is reachable.
    async fn ping(&self) -> Result<(), AppError>;

    /// Create the indexes queries rely on, if missing.
    async fn ensure_indexes(&self) -> Result<(), AppError>;
}

/// Key document and weights of the `TextSearch` index.
pub fn text_index_definition() -> (Document, Document) {
    let mut keys = Document::new();
    let mut weights = Document::new();
    for field in TextField::ALL {
        keys.insert(field.stored_name(), "text");
        weights.insert(field.stored_name(), field.weight() as i32);
    }
    (keys, weights)
}

/// MongoDB implementation of the DocumentIndex.
///
/// This is only available when the `server` feature is enabled.
#[cfg(feature = "server")]
pub struct MongoDocumentIndex {
    db: mongodb::Database,
    collection: mongodb::Collection<IndexedDocument>,
}

#[cfg(feature = "server")]
impl MongoDocumentIndex {
    pub fn new(db: &mongodb::Database, collection: &str) -> Self {
        Self {
            db: db.clone(),
            collection: db.collection(collection),
        }
    }

    /// Connect with a bounded server selection timeout.
    ///
    /// No round trip is made here; call [`DocumentIndex::ping`] to probe.
    pub async fn connect(
        uri: &str,
        database: &str,
        collection: &str,
        timeout: std::time::Duration,
    ) -> Result<Self, AppError> {
        use mongodb::options::ClientOptions;

        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| AppError::Unavailable(format!("Invalid MongoDB URI: {e}")))?;
        options.server_selection_timeout = Some(timeout);
        options.connect_timeout = Some(timeout);
        options.app_name = Some("docusphere".to_string());

        let client = mongodb::Client::with_options(options)
            .map_err(|e| AppError::Unavailable(e.to_string()))?;

        Ok(Self::new(&client.database(database), collection))
    }

    /// Insert documents as-is. Used to seed test and demo stores.
    pub async fn insert_many(&self, docs: &[IndexedDocument]) -> Result<(), AppError> {
        self.collection
            .insert_many(docs)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(feature = "server")]
#[async_trait]
impl DocumentIndex for MongoDocumentIndex {
    async fn find(&self, query: &IndexQuery) -> Result<Vec<IndexedDocument>, AppError> {
        use futures::TryStreamExt;
        use mongodb::options::FindOptions;

        // The wire protocol carries skip as a signed 64-bit integer.
        let skip = query.skip.min(i64::MAX as u64);

        let options = FindOptions::builder()
            .projection(query.projection())
            .sort(query.sort.clone())
            .skip(skip)
            .limit(query.limit)
            .build();

        let cursor = self
            .collection
            .find(query.filter.clone())
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        cursor
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn count(&self, filter: &Document) -> Result<u64, AppError> {
        self.collection
            .count_documents(filter.clone())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| AppError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn ensure_indexes(&self) -> Result<(), AppError> {
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        let (text_keys, weights) = text_index_definition();

        let models = vec![
            IndexModel::builder()
                .keys(text_keys)
                .options(
                    IndexOptions::builder()
                        .name(TEXT_INDEX_NAME.to_string())
                        .weights(weights)
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "slug": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            IndexModel::builder().keys(doc! { "updatedAt": -1 }).build(),
            IndexModel::builder()
                .keys(doc! { "author": 1, "updatedAt": -1 })
                .build(),
            IndexModel::builder()
                .keys(doc! { "type": 1, "updatedAt": -1 })
                .build(),
            IndexModel::builder()
                .keys(doc! { "tags": 1, "updatedAt": -1 })
                .build(),
        ];

        self.collection
            .create_indexes(models)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
