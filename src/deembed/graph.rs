//! Read-only projection of a document's pages onto the indirect objects they
//! reference.
//!
//! Everything here compares object ids, never object contents: two pages
//! "share" a content stream only when both `Contents` arrays name the same
//! indirect object.

use std::collections::{BTreeSet, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};

/// Bound on `Parent` chains and reference chains, guarding against cycles.
const MAX_DEPTH: usize = 32;

/// A page and the ordered ids of its content streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContents {
    /// Page number (1-indexed)
    pub number: u32,
    /// Id of the page dictionary
    pub page_id: ObjectId,
    /// Content stream ids, in `Contents` order
    pub contents: Vec<ObjectId>,
}

impl PageContents {
    /// Number of content streams.
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Whether the page has no content streams.
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

/// Content-stream view over every page of a document.
#[derive(Debug, Clone)]
pub struct PageContentGraph {
    pages: Vec<PageContents>,
}

impl PageContentGraph {
    /// Project every page of `doc`, in page order.
    pub fn new(doc: &Document) -> Self {
        let pages = doc
            .get_pages()
            .into_iter()
            .map(|(number, page_id)| PageContents {
                number,
                page_id,
                contents: content_ids(doc, page_id),
            })
            .collect();
        Self { pages }
    }

    /// All pages.
    pub fn pages(&self) -> &[PageContents] {
        &self.pages
    }

    /// Pages with more than one content stream.
    ///
    /// Single-stream pages cannot carry a wrapper delimiter and are left out
    /// of the repeating-object search.
    pub fn multi_content(&self) -> Vec<&PageContents> {
        self.pages.iter().filter(|page| page.len() > 1).collect()
    }
}

/// Ids present in both sequences.
pub fn shared_ids(a: &[ObjectId], b: &[ObjectId]) -> BTreeSet<ObjectId> {
    let other: HashSet<ObjectId> = b.iter().copied().collect();
    a.iter().copied().filter(|id| other.contains(id)).collect()
}

/// Ordered content stream ids of a page.
///
/// `Contents` may be a stream reference, a reference to an array, or a direct
/// array of references.
pub fn content_ids(doc: &Document, page_id: ObjectId) -> Vec<ObjectId> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };
    match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => references(items),
            Ok(_) => vec![*id],
            Err(_) => Vec::new(),
        },
        Ok(Object::Array(items)) => references(items),
        _ => Vec::new(),
    }
}

fn references(items: &[Object]) -> Vec<ObjectId> {
    items
        .iter()
        .filter_map(|item| item.as_reference().ok())
        .collect()
}

/// Follow references until a direct object is reached.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    let mut current = obj;
    for _ in 0..MAX_DEPTH {
        match current {
            Object::Reference(id) => current = doc.get_object(*id).ok()?,
            other => return Some(other),
        }
    }
    None
}

/// Look up a page attribute, walking up the page tree for inherited values.
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Effective resource dictionary of a page.
pub(crate) fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let resources = inherited_attribute(doc, page_id, b"Resources")?;
    resolve(doc, resources)?.as_dict().ok()
}

/// Named XObjects in a page's resources that are indirect objects.
///
/// Inline XObject dictionaries have no id and are skipped.
pub(crate) fn page_xobjects(doc: &Document, page_id: ObjectId) -> Vec<(String, ObjectId)> {
    let Some(resources) = page_resources(doc, page_id) else {
        return Vec::new();
    };
    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_dict().ok())
    else {
        return Vec::new();
    };

    xobjects
        .iter()
        .filter_map(|(name, obj)| {
            let id = obj.as_reference().ok()?;
            Some((String::from_utf8_lossy(name).into_owned(), id))
        })
        .collect()
}

/// Stream dictionary of an XObject, if it is a stream.
pub(crate) fn xobject_dict(doc: &Document, id: ObjectId) -> Option<&Dictionary> {
    match doc.get_object(id).ok()? {
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

/// Value of a name entry, e.g. `/Subtype`.
pub(crate) fn name_of<'a>(dict: &'a Dictionary, key: &[u8]) -> Option<&'a [u8]> {
    dict.get(key).ok()?.as_name().ok()
}

/// Value of an integer entry, following a reference if needed.
pub(crate) fn integer_of(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<i64> {
    resolve(doc, dict.get(key).ok()?)?.as_i64().ok()
}
