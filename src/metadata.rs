//! First-page course metadata.
//!
//! Shared documents open with a cover listing file name, author, subject,
//! course, faculty and university, one per line. Extraction is best effort:
//! failures are reported to the caller and never stop cleaning.

use lopdf::Document;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};
use crate::model::DocumentMetadata;

/// Number of cover lines mapped to metadata fields.
const FIELD_COUNT: usize = DocumentMetadata::LABELS.len();

/// Read the metadata printed on the first page of `doc`.
pub fn extract(doc: &Document) -> Result<DocumentMetadata> {
    let first = doc
        .get_pages()
        .into_keys()
        .next()
        .ok_or_else(|| Error::Metadata("document has no pages".to_string()))?;
    let text = doc
        .extract_text(&[first])
        .map_err(|e| Error::Metadata(format!("reading page {} text: {}", first, e)))?;
    from_text(&text)
}

/// Map the first six non-blank lines of `text` to metadata fields.
pub fn from_text(text: &str) -> Result<DocumentMetadata> {
    let lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(FIELD_COUNT)
        .map(|line| line.nfc().collect())
        .collect();

    if lines.len() < FIELD_COUNT {
        return Err(Error::Metadata(format!(
            "expected {} lines on the first page, found {}",
            FIELD_COUNT,
            lines.len()
        )));
    }

    let mut fields = lines.into_iter().map(Some);
    Ok(DocumentMetadata {
        file: fields.next().flatten(),
        author: fields.next().flatten(),
        subject: fields.next().flatten(),
        course: fields.next().flatten(),
        faculty: fields.next().flatten(),
        university: fields.next().flatten(),
    })
}
