//! Reconstructed output pages.

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use super::graph::{inherited_attribute, resolve};
use crate::error::{Error, Result};
use crate::model::PageBox;

/// Attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Entries rebuilt by the assembler.
const REBUILT: [&[u8]; 4] = [b"Parent", b"Contents", b"MediaBox", b"BleedBox"];

/// Letter size, used when a page has no readable `MediaBox`.
const DEFAULT_MEDIA_BOX: PageBox = PageBox {
    x0: 0.0,
    y0: 0.0,
    x1: 612.0,
    y1: 792.0,
};

/// A content stream of an output page.
#[derive(Debug, Clone)]
pub enum ContentRef {
    /// An existing stream in the source document
    Existing(ObjectId),
    /// A new stream, allocated when the page is assembled
    Fresh(Stream),
}

/// A page ready for assembly into the output document.
///
/// Boxes are kept in source coordinates; the assembler writes them
/// translated to the origin.
#[derive(Debug, Clone)]
pub struct OutputPage {
    /// Source page number, when the page is a copy of one
    pub source_page: Option<u32>,
    /// Page attributes other than `Contents`, `Parent` and the boxes
    pub dict: Dictionary,
    /// Content streams, in drawing order
    pub contents: Vec<ContentRef>,
    /// Source `MediaBox`
    pub media_box: PageBox,
    /// Source `BleedBox`, if the page had one
    pub bleed_box: Option<PageBox>,
}

impl OutputPage {
    /// Copy a source page with inherited attributes pulled down onto it.
    ///
    /// The copy keeps no contents and no annotations.
    pub fn copy_of(doc: &Document, number: u32, page_id: ObjectId) -> Result<Self> {
        let source = doc.get_dictionary(page_id).map_err(|e| {
            Error::MalformedDocument(format!("page {} is not a dictionary: {}", number, e))
        })?;

        let mut dict = source.clone();
        for key in INHERITABLE {
            if !dict.has(key) {
                if let Some(value) = inherited_attribute(doc, page_id, key) {
                    dict.set(key.to_vec(), value.clone());
                }
            }
        }

        let media_box = box_attribute(doc, &dict, b"MediaBox").unwrap_or_else(|| {
            log::warn!("Page {} has no usable MediaBox, assuming Letter", number);
            DEFAULT_MEDIA_BOX
        });
        let bleed_box = box_attribute(doc, &dict, b"BleedBox");

        for key in REBUILT {
            dict.remove(key);
        }
        dict.set("Annots", Object::Array(Vec::new()));

        Ok(Self {
            source_page: Some(number),
            dict,
            contents: Vec::new(),
            media_box,
            bleed_box,
        })
    }

    /// A new page that draws a single XObject with the given content stream.
    pub fn wrapping(name: &str, xobject: ObjectId, content: Stream, media_box: PageBox) -> Self {
        let dict = dictionary! {
            "Resources" => dictionary! {
                "XObject" => dictionary! { name => xobject },
            },
        };
        Self {
            source_page: None,
            dict,
            contents: vec![ContentRef::Fresh(content)],
            media_box,
            bleed_box: None,
        }
    }

    /// Replace the contents with existing source streams.
    pub fn with_existing_contents(mut self, ids: &[ObjectId]) -> Self {
        self.contents = ids.iter().copied().map(ContentRef::Existing).collect();
        self
    }

    /// Ids of existing source streams among the contents.
    pub fn existing_ids(&self) -> Vec<ObjectId> {
        self.contents
            .iter()
            .filter_map(|content| match content {
                ContentRef::Existing(id) => Some(*id),
                ContentRef::Fresh(_) => None,
            })
            .collect()
    }
}

fn box_attribute(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<PageBox> {
    let obj = resolve(doc, dict.get(key).ok()?)?;
    PageBox::from_object(obj)
}
