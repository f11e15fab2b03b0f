use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The closed set of document formats known to the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Markdown,
    Pdf,
    Word,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Markdown => "markdown",
            DocumentType::Pdf => "pdf",
            DocumentType::Word => "word",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field that takes part in free-text matching.
///
/// Each field carries the weight it contributes to a relevance score when it
/// contains the query term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Tags,
    Author,
    Content,
}

impl TextField {
    /// All weighted fields, heaviest first.
    pub const ALL: [TextField; 4] = [
        TextField::Title,
        TextField::Tags,
        TextField::Author,
        TextField::Content,
    ];

    pub fn weight(self) -> u32 {
        match self {
            TextField::Title => 8,
            TextField::Tags => 4,
            TextField::Author => 2,
            TextField::Content => 1,
        }
    }

    /// Name of the field in the stored (native) document.
    pub fn stored_name(self) -> &'static str {
        match self {
            TextField::Title => "title",
            TextField::Tags => "tags",
            TextField::Author => "author",
            TextField::Content => "contentText",
        }
    }
}

/// The searchable unit.
///
/// Records are produced by the editing subsystem; search only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    /// Backend-assigned identifier. Seed files may leave it empty.
    #[serde(default)]
    pub id: String,
    pub title: String,
    /// Unique human-readable key.
    pub slug: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub author: String,
    /// Plain-text body, markup already stripped.
    #[serde(default)]
    pub content_text: String,
    pub updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// Case-insensitive substring test of `term` against one field.
    ///
    /// `term` must already be lowercased.
    pub fn field_contains(&self, field: TextField, term: &str) -> bool {
        match field {
            TextField::Title => self.title.to_lowercase().contains(term),
            TextField::Tags => self.tags.iter().any(|t| t.to_lowercase().contains(term)),
            TextField::Author => self.author.to_lowercase().contains(term),
            TextField::Content => self.content_text.to_lowercase().contains(term),
        }
    }

    /// Sum of the weights of every field containing `term` (lowercased).
    pub fn text_score(&self, term: &str) -> u32 {
        TextField::ALL
            .iter()
            .filter(|field| self.field_contains(**field, term))
            .map(|field| field.weight())
            .sum()
    }
}

/// The projection of a record returned to search clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub title: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub tags: Vec<String>,
    pub author: String,
    pub updated_at: DateTime<Utc>,
    /// Only present when results were ranked by relevance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl DocumentSummary {
    pub fn from_record(record: &DocumentRecord, score: Option<f64>) -> Self {
        Self {
            title: record.title.clone(),
            slug: record.slug.clone(),
            doc_type: record.doc_type,
            tags: record.tags.iter().cloned().collect(),
            author: record.author.clone(),
            updated_at: record.updated_at,
            score,
        }
    }
}
