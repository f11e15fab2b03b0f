use std::collections::BTreeSet;

use bson::{doc, Bson, Document};
use chrono::{DateTime, Utc};

use crate::models::document::DocumentRecord;
use crate::search::query::QueryDescriptor;

/// Backend-agnostic match criteria derived from a [`QueryDescriptor`].
///
/// Evaluated in process with [`FilterPredicate::matches`] or rendered as a
/// native store filter with [`FilterPredicate::to_index_filter`]. All criteria
/// are AND-ed; an absent criterion always passes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPredicate {
    /// Pass if empty or the record's type is listed.
    pub types: BTreeSet<String>,
    /// Pass if empty or the record carries every listed tag.
    pub tags: BTreeSet<String>,
    /// Exact match.
    pub author: Option<String>,
    /// Inclusive.
    pub updated_from: Option<DateTime<Utc>>,
    /// Inclusive.
    pub updated_to: Option<DateTime<Utc>>,
    /// Lowercased free-text term; the record must contain it in at least one
    /// weighted field.
    pub text: Option<String>,
}

impl FilterPredicate {
    pub fn from_query(query: &QueryDescriptor) -> Self {
        Self {
            types: query.types.clone(),
            tags: query.tags.clone(),
            author: query.author.clone(),
            updated_from: query.updated_from,
            updated_to: query.updated_to,
            text: query.has_text().then(|| query.q.to_lowercase()),
        }
    }

    pub fn matches(&self, record: &DocumentRecord) -> bool {
        self.matches_type(record)
            && self.matches_tags(record)
            && self.matches_author(record)
            && self.matches_range(record)
            && self.matches_text(record)
    }

    fn matches_type(&self, record: &DocumentRecord) -> bool {
        self.types.is_empty() || self.types.contains(record.doc_type.as_str())
    }

    fn matches_tags(&self, record: &DocumentRecord) -> bool {
        self.tags.is_subset(&record.tags)
    }

    fn matches_author(&self, record: &DocumentRecord) -> bool {
        self.author.as_ref().map_or(true, |a| *a == record.author)
    }

    fn matches_range(&self, record: &DocumentRecord) -> bool {
        self.updated_from.map_or(true, |from| record.updated_at >= from)
            && self.updated_to.map_or(true, |to| record.updated_at <= to)
    }

    fn matches_text(&self, record: &DocumentRecord) -> bool {
        self.text.as_deref().map_or(true, |term| record.text_score(term) > 0)
    }

    /// Render as a MongoDB query document over the stored field names.
    pub fn to_index_filter(&self) -> Document {
        let mut filter = Document::new();

        if !self.types.is_empty() {
            filter.insert("type", doc! { "$in": string_array(&self.types) });
        }
        if !self.tags.is_empty() {
            filter.insert("tags", doc! { "$all": string_array(&self.tags) });
        }
        if let Some(author) = &self.author {
            filter.insert("author", author.as_str());
        }
        if self.updated_from.is_some() || self.updated_to.is_some() {
            let mut range = Document::new();
            if let Some(from) = self.updated_from {
                range.insert("$gte", bson::DateTime::from_chrono(from));
            }
            if let Some(to) = self.updated_to {
                range.insert("$lte", bson::DateTime::from_chrono(to));
            }
            filter.insert("updatedAt", range);
        }
        if let Some(term) = &self.text {
            filter.insert("$text", doc! { "$search": term.as_str() });
        }

        filter
    }
}

fn string_array(values: &BTreeSet<String>) -> Bson {
    Bson::Array(values.iter().map(|v| Bson::String(v.clone())).collect())
}
