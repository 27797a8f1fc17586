use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The record a rule tree is evaluated against. Everything the engine can
/// filter on lives here or in the optional metadata block; a book fresh out
/// of a library scan may carry no metadata at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: u64,
    pub library_id: u64,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size_kb: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_status: Option<ReadStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BookMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookMetadata {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub moods: Vec<String>,
    pub publisher: Option<String>,
    pub language: Option<String>,
    pub series_name: Option<String>,
    pub series_number: Option<f64>,
    pub series_total: Option<u32>,
    pub page_count: Option<u32>,
    pub published_date: Option<NaiveDate>,
    pub amazon_rating: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadStatus {
    Unread,
    Reading,
    Paused,
    Read,
    PartiallyRead,
    Abandoned,
    Unset,
}

impl ReadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadStatus::Unread => "UNREAD",
            ReadStatus::Reading => "READING",
            ReadStatus::Paused => "PAUSED",
            ReadStatus::Read => "READ",
            ReadStatus::PartiallyRead => "PARTIALLY_READ",
            ReadStatus::Abandoned => "ABANDONED",
            ReadStatus::Unset => "UNSET",
        }
    }
}

impl Book {
    pub fn title(&self) -> Option<&str> {
        self.metadata.as_ref()?.title.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_deserializes_with_missing_metadata() {
        let json = r#"{"id": 1, "libraryId": 2, "fileName": "dune.epub"}"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert!(book.metadata.is_none());
        assert!(book.read_status.is_none());
        assert_eq!(book.library_id, 2);
    }

    #[test]
    fn test_read_status_wire_names() {
        let book: Book = serde_json::from_str(
            r#"{"id": 1, "libraryId": 1, "fileName": "x.pdf", "readStatus": "PARTIALLY_READ"}"#,
        )
        .unwrap();
        assert_eq!(book.read_status, Some(ReadStatus::PartiallyRead));
        assert_eq!(ReadStatus::PartiallyRead.as_str(), "PARTIALLY_READ");
    }

    #[test]
    fn test_metadata_defaults() {
        let json = r#"{"id": 1, "libraryId": 1, "fileName": "x.epub",
                       "metadata": {"title": "Dune", "pageCount": 412}}"#;
        let book: Book = serde_json::from_str(json).unwrap();
        let meta = book.metadata.unwrap();
        assert_eq!(meta.title.as_deref(), Some("Dune"));
        assert_eq!(meta.page_count, Some(412));
        assert!(meta.authors.is_empty());
        assert!(meta.published_date.is_none());
    }
}
