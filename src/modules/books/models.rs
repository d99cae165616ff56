use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A catalog record as it appears on the wire. The soft-delete marker is a
/// storage detail and never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub author: String,
    pub title: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a book. Client-supplied ids and timestamps are
/// ignored; absent fields decode to empty strings so that validation, not
/// deserialization, reports them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBook {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub title: String,
}

impl NewBook {
    /// Verify that the required fields are present. Pure, no side effects.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if self.author.is_empty() {
            return Err(ValidationError::MissingAuthor);
        }
        Ok(())
    }
}

/// Partial update payload: only the supplied fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookPatch {
    pub author: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("book: missing required title")]
    MissingTitle,
    #[error("book: missing required author")]
    MissingAuthor,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_book(author: &str, title: &str) -> NewBook {
        NewBook {
            author: author.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn complete_book_validates() {
        assert_eq!(new_book("Steve Klabnik", "The Rust Programming Language").validate(), Ok(()));
    }

    #[test]
    fn missing_title_is_reported_first() {
        let err = new_book("", "").validate().unwrap_err();
        assert_eq!(err, ValidationError::MissingTitle);
        assert_eq!(err.to_string(), "book: missing required title");
    }

    #[test]
    fn missing_author_is_reported() {
        let err = new_book("", "Programming Rust").validate().unwrap_err();
        assert_eq!(err, ValidationError::MissingAuthor);
        assert_eq!(err.to_string(), "book: missing required author");
    }

    #[test]
    fn absent_fields_decode_to_empty_strings() {
        let decoded: NewBook = serde_json::from_str("{}").unwrap();
        assert!(decoded.author.is_empty());
        assert!(decoded.title.is_empty());
        assert!(decoded.validate().is_err());
    }

    #[test]
    fn client_supplied_id_and_timestamps_are_ignored() {
        let decoded: NewBook =
            serde_json::from_str(r#"{"id": 7, "author": "A", "title": "T", "createdAt": "x"}"#)
                .unwrap();
        assert_eq!(decoded.author, "A");
        assert_eq!(decoded.title, "T");
    }

    #[test]
    fn book_serializes_camel_case_timestamps() {
        let book = Book {
            id: 1,
            author: "A".into(),
            title: "T".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&book).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("created_at").is_none());
    }
}
