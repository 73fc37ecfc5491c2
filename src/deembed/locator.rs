//! The "new" method: recover each page by splicing its `Contents` array
//! between the wrapper objects it shares with a sibling page.
//!
//! The embedding platform reuses the same two content streams as delimiters
//! around every embedded page. Those streams are the only entries two pages
//! have in common, so their positions bracket the original content.

use std::collections::HashSet;
use std::ops::Range;

use lopdf::{Document, ObjectId};

use super::graph::{shared_ids, PageContentGraph, PageContents};
use super::page::OutputPage;
use crate::error::{Error, Result};

/// Entries kept before the first shared marker.
pub const LEADING_PADDING: usize = 2;

/// Entries kept after the second shared marker.
pub const TRAILING_PADDING: usize = 4;

/// A half-open range of a page's content array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentSpan {
    pub start: usize,
    pub end: usize,
}

impl ContentSpan {
    /// Span around the marker pair `first < second` in an array of `len`
    /// entries, padded and clamped to the array bounds.
    pub fn around_markers(first: usize, second: usize, len: usize) -> Self {
        let start = first.saturating_sub(LEADING_PADDING);
        let end = second.saturating_add(TRAILING_PADDING).min(len);
        Self { start, end }
    }

    /// Number of entries in the span.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The span as a range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Content span located on one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedSpan {
    /// Page number (1-indexed)
    pub number: u32,
    /// Id of the page dictionary
    pub page_id: ObjectId,
    /// Page number of the sibling compared against
    pub neighbor: u32,
    /// Positions of the two shared markers
    pub markers: (usize, usize),
    /// Extracted span
    pub span: ContentSpan,
    /// Content ids inside the span
    pub contents: Vec<ObjectId>,
}

/// Positions in `current` of the first two distinct ids it shares with
/// `neighbor`, in `current` order.
pub fn find_marker_pair(current: &[ObjectId], neighbor: &[ObjectId]) -> Option<(usize, usize)> {
    let shared = shared_ids(current, neighbor);
    let mut seen = HashSet::new();
    let mut positions = current
        .iter()
        .enumerate()
        .filter(|(_, id)| shared.contains(id) && seen.insert(**id))
        .map(|(index, _)| index);

    let first = positions.next()?;
    let second = positions.next()?;
    Some((first, second))
}

/// Splices original page content out of wrapper pages.
pub struct RepeatingObjectLocator<'a> {
    doc: &'a Document,
    graph: PageContentGraph,
}

impl<'a> RepeatingObjectLocator<'a> {
    /// Create a locator over `doc`.
    pub fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            graph: PageContentGraph::new(doc),
        }
    }

    /// Locate the content span of every multi-stream page.
    ///
    /// Each page is compared with the next multi-stream page; the last one is
    /// compared with the previous. A lone multi-stream page has no sibling
    /// and is rejected as malformed rather than skipped.
    pub fn locate(&self) -> Result<Vec<LocatedSpan>> {
        let pages = self.graph.multi_content();
        match pages.len() {
            0 => {
                return Err(Error::NoEmbeddedContentFound(
                    "no page has more than one content stream".to_string(),
                ))
            }
            1 => {
                return Err(Error::MalformedDocument(format!(
                    "page {} is the only page with several content streams, \
                     there is no sibling to compare it with",
                    pages[0].number
                )))
            }
            _ => {}
        }

        let last = pages.len() - 1;
        pages
            .iter()
            .enumerate()
            .map(|(index, page)| {
                let neighbor = if index == last {
                    pages[index - 1]
                } else {
                    pages[index + 1]
                };
                locate_on(page, neighbor)
            })
            .collect()
    }

    /// Build one output page per located span.
    pub fn extract(&self) -> Result<Vec<OutputPage>> {
        self.locate()?
            .into_iter()
            .map(|located| {
                log::debug!(
                    "Page {}: markers at {:?} (sibling page {}), keeping entries {:?}",
                    located.number,
                    located.markers,
                    located.neighbor,
                    located.span.range()
                );
                Ok(OutputPage::copy_of(self.doc, located.number, located.page_id)?
                    .with_existing_contents(&located.contents))
            })
            .collect()
    }
}

fn locate_on(page: &PageContents, neighbor: &PageContents) -> Result<LocatedSpan> {
    let (first, second) = find_marker_pair(&page.contents, &neighbor.contents).ok_or_else(|| {
        Error::NoEmbeddedContentFound(format!(
            "page {} shares fewer than two content objects with page {}",
            page.number, neighbor.number
        ))
    })?;

    let span = ContentSpan::around_markers(first, second, page.len());
    Ok(LocatedSpan {
        number: page.number,
        page_id: page.page_id,
        neighbor: neighbor.number,
        markers: (first, second),
        span,
        contents: page.contents[span.range()].to_vec(),
    })
}
