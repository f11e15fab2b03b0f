use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::document::{DocumentRecord, DocumentType};

/// An immutable, in-memory set of documents.
///
/// Populated once before any query is served and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
    records: Vec<DocumentRecord>,
}

impl MemoryCorpus {
    /// Build a corpus, normalising tags and assigning missing ids.
    ///
    /// Rejects blank titles and duplicate slugs.
    pub fn new(records: Vec<DocumentRecord>) -> Result<Self, AppError> {
        let mut seen = HashSet::new();
        let mut normalised = Vec::with_capacity(records.len());

        for mut record in records {
            if record.title.trim().is_empty() {
                return Err(AppError::Config(format!(
                    "Document '{}' has an empty title",
                    record.slug
                )));
            }
            if !seen.insert(record.slug.clone()) {
                return Err(AppError::Config(format!(
                    "Duplicate slug '{}' in corpus",
                    record.slug
                )));
            }
            if record.id.is_empty() {
                record.id = uuid::Uuid::new_v4().to_string();
            }
            record.tags = record
                .tags
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            normalised.push(record);
        }

        Ok(Self { records: normalised })
    }

    /// The three built-in sample documents.
    pub fn sample() -> Self {
        let records = vec![
            sample_record(
                "Getting Started Guide",
                "getting-started",
                DocumentType::Markdown,
                &["guide", "intro"],
                "core",
                "Install, setup, and begin using DocuSphere. Tags and search.",
                "2025-01-01T10:00:00Z",
            ),
            sample_record(
                "API Reference",
                "api-reference",
                DocumentType::Markdown,
                &["api", "reference"],
                "core",
                "Endpoints, auth using JWT, RBAC scopes.",
                "2025-02-10T08:00:00Z",
            ),
            sample_record(
                "Export to PDF",
                "export-pdf",
                DocumentType::Pdf,
                &["export", "pdf"],
                "tools",
                "How to export documents to PDF and best practices.",
                "2025-02-20T12:00:00Z",
            ),
        ];
        Self { records }
    }

    /// Load a seed file. `.yaml`/`.yml` is read as YAML, anything else as JSON.
    ///
    /// The file holds a list of records in their JSON shape
    /// (`title`, `slug`, `type`, `tags`, `author`, `contentText`, `updatedAt`).
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read corpus '{}': {e}", path.display()))
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let records: Vec<DocumentRecord> = if is_yaml {
            serde_yaml::from_str(&raw).map_err(|e| {
                AppError::Config(format!("Invalid YAML corpus '{}': {e}", path.display()))
            })?
        } else {
            serde_json::from_str(&raw).map_err(|e| {
                AppError::Config(format!("Invalid JSON corpus '{}': {e}", path.display()))
            })?
        };

        Self::new(records)
    }

    pub fn records(&self) -> &[DocumentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn sample_record(
    title: &str,
    slug: &str,
    doc_type: DocumentType,
    tags: &[&str],
    author: &str,
    content_text: &str,
    updated_at: &str,
) -> DocumentRecord {
    DocumentRecord {
        id: format!("sample-{slug}"),
        title: title.to_string(),
        slug: slug.to_string(),
        doc_type,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        author: author.to_string(),
        content_text: content_text.to_string(),
        updated_at: DateTime::parse_from_rfc3339(updated_at)
            .map(|ts| ts.with_timezone(&Utc))
            .unwrap_or_default(),
    }
}
