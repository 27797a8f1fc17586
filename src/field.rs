use serde::{Deserialize, Serialize};

use crate::book::Book;
use crate::value::Value;

/// Every book attribute a shelf rule can filter on. Wire names are the
/// camelCase strings stored in persisted shelf definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleField {
    Title,
    Subtitle,
    Authors,
    Categories,
    Tags,
    Moods,
    Publisher,
    Language,
    SeriesName,
    SeriesNumber,
    SeriesTotal,
    PageCount,
    PublishedDate,
    DateAdded,
    PersonalRating,
    AmazonRating,
    ReadStatus,
    FileType,
    FileSize,
    Library,
}

/// Semantic type of a field, used by the codec to parse operands and by
/// rule builders to offer the right operator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Decimal,
    Date,
    /// No declared type; compared as text after normalization.
    Untyped,
}

/// Static metadata about a field. `max` is a UI bound only; the evaluator
/// never enforces it.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub kind: FieldKind,
    pub max: Option<f64>,
    pub multi_valued: bool,
}

const TEXT: FieldDescriptor = FieldDescriptor {
    kind: FieldKind::Text,
    max: None,
    multi_valued: false,
};
const NUMBER: FieldDescriptor = FieldDescriptor {
    kind: FieldKind::Number,
    max: None,
    multi_valued: false,
};
const DATE: FieldDescriptor = FieldDescriptor {
    kind: FieldKind::Date,
    max: None,
    multi_valued: false,
};
const MULTI: FieldDescriptor = FieldDescriptor {
    kind: FieldKind::Untyped,
    max: None,
    multi_valued: true,
};
const DECIMAL: FieldDescriptor = FieldDescriptor {
    kind: FieldKind::Decimal,
    max: None,
    multi_valued: false,
};
const RATING_10: FieldDescriptor = FieldDescriptor {
    kind: FieldKind::Decimal,
    max: Some(10.0),
    multi_valued: false,
};
const RATING_5: FieldDescriptor = FieldDescriptor {
    kind: FieldKind::Decimal,
    max: Some(5.0),
    multi_valued: false,
};

impl RuleField {
    /// Descriptor lookup. One static entry per field, resolved through an
    /// exhaustive match so a new field cannot ship without one.
    pub fn descriptor(&self) -> &'static FieldDescriptor {
        match self {
            RuleField::Title
            | RuleField::Subtitle
            | RuleField::Publisher
            | RuleField::Language
            | RuleField::SeriesName => &TEXT,
            RuleField::SeriesTotal | RuleField::PageCount | RuleField::FileSize => &NUMBER,
            RuleField::SeriesNumber => &DECIMAL,
            RuleField::PersonalRating => &RATING_10,
            RuleField::AmazonRating => &RATING_5,
            RuleField::PublishedDate | RuleField::DateAdded => &DATE,
            RuleField::Authors | RuleField::Categories | RuleField::Tags | RuleField::Moods => {
                &MULTI
            }
            // Scalar in the default extractor but explicitly multi-valued so
            // the set operators apply; their set accessor collapses to a
            // singleton list.
            RuleField::ReadStatus | RuleField::Library | RuleField::FileType => &MULTI,
        }
    }

    /// Extract the raw (pre-normalization) value of this field from a book.
    /// Missing attributes, including a wholly absent metadata block, yield
    /// `Value::Null` rather than an error.
    pub fn extract(&self, book: &Book) -> Value {
        let meta = book.metadata.as_ref();
        match self {
            RuleField::Title => text(meta.and_then(|m| m.title.clone())),
            RuleField::Subtitle => text(meta.and_then(|m| m.subtitle.clone())),
            RuleField::Authors => string_list(meta.map(|m| m.authors.as_slice())),
            RuleField::Categories => string_list(meta.map(|m| m.categories.as_slice())),
            RuleField::Tags => string_list(meta.map(|m| m.tags.as_slice())),
            RuleField::Moods => string_list(meta.map(|m| m.moods.as_slice())),
            RuleField::Publisher => text(meta.and_then(|m| m.publisher.clone())),
            RuleField::Language => text(meta.and_then(|m| m.language.clone())),
            RuleField::SeriesName => text(meta.and_then(|m| m.series_name.clone())),
            RuleField::SeriesNumber => number(meta.and_then(|m| m.series_number)),
            RuleField::SeriesTotal => number(meta.and_then(|m| m.series_total.map(f64::from))),
            RuleField::PageCount => number(meta.and_then(|m| m.page_count.map(f64::from))),
            RuleField::PublishedDate => meta
                .and_then(|m| m.published_date)
                .map(Value::Date)
                .unwrap_or(Value::Null),
            RuleField::DateAdded => book.date_added.map(Value::Date).unwrap_or(Value::Null),
            RuleField::PersonalRating => number(book.personal_rating),
            RuleField::AmazonRating => number(meta.and_then(|m| m.amazon_rating)),
            RuleField::ReadStatus => text(book.read_status.map(|s| s.as_str().to_string())),
            RuleField::FileType => file_type(&book.file_name),
            // Stringified so it compares cleanly in set/list contexts.
            RuleField::Library => Value::Text(book.library_id.to_string()),
            RuleField::FileSize => number(book.file_size_kb.map(|kb| kb as f64)),
        }
    }

    /// Set-family accessor: the field as a lowercase term list, independent
    /// of the default extractor's shape. Multi-valued fields yield their
    /// elements, scalar fields collapse to a singleton, and an absent value
    /// is an empty list.
    pub fn extract_terms(&self, book: &Book) -> Vec<String> {
        match self.extract(book).normalize() {
            Value::List(items) => items.iter().filter_map(Value::as_term).collect(),
            Value::Null => Vec::new(),
            scalar => scalar.as_term().into_iter().collect(),
        }
    }
}

fn text(v: Option<String>) -> Value {
    v.map(Value::Text).unwrap_or(Value::Null)
}

fn number(v: Option<f64>) -> Value {
    v.map(Value::Number).unwrap_or(Value::Null)
}

fn string_list(items: Option<&[String]>) -> Value {
    match items {
        Some(items) => Value::List(items.iter().cloned().map(Value::Text).collect()),
        None => Value::Null,
    }
}

/// Derived field: the extension after the last dot of the file name.
/// A name without a dot has no file type.
fn file_type(file_name: &str) -> Value {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Value::Text(ext.to_string()),
        _ => Value::Null,
    }
}
