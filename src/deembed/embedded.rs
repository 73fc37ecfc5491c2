//! The "old" method: promote embedded page XObjects back to pages.

use std::collections::HashSet;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use super::graph::{integer_of, name_of, page_xobjects, resolve, xobject_dict};
use super::page::OutputPage;
use crate::error::{Error, Result};
use crate::model::PageBox;

/// Substring of the resource name given to embedded pages.
pub const EMBEDDED_PAGE_SENTINEL: &str = "EmbeddedPdfPage";

/// Width of the page an image is wrapped in, margins included, in points.
pub const WRAP_WIDTH: f32 = 1000.0;

/// Margin around wrapped images, in points (half an inch).
pub const WRAP_MARGIN: f32 = 0.5 * 72.0;

/// Resource name of the XObject on a wrapper page.
const WRAPPED_NAME: &str = "Embedded0";

/// Shape of an embedded XObject.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum XObjectKind {
    /// Form XObject with its bounding box
    Form { bbox: PageBox },
    /// Image XObject with its pixel size
    Image { width: f32, height: f32 },
}

/// An embedded page found in a page's resources.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedPage {
    /// Page number the XObject was first seen on
    pub page: u32,
    /// Resource name
    pub name: String,
    /// Id of the XObject stream
    pub object_id: ObjectId,
    /// Form or image geometry
    pub kind: XObjectKind,
}

/// Collect embedded page XObjects across all pages, first-seen order.
///
/// An XObject referenced from several pages is reported once.
pub fn find_embedded_pages(doc: &Document) -> Vec<EmbeddedPage> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for (number, page_id) in doc.get_pages() {
        for (name, object_id) in page_xobjects(doc, page_id) {
            if !name.contains(EMBEDDED_PAGE_SENTINEL) || seen.contains(&object_id) {
                continue;
            }
            match xobject_kind(doc, object_id) {
                Some(kind) => {
                    seen.insert(object_id);
                    found.push(EmbeddedPage {
                        page: number,
                        name,
                        object_id,
                        kind,
                    });
                }
                None => log::debug!(
                    "Page {}: skipping /{} {:?}, not a wrappable form or image",
                    number,
                    name,
                    object_id
                ),
            }
        }
    }

    found
}

/// Whether any page carries an embedded page XObject.
pub fn has_embedded_pages(doc: &Document) -> bool {
    doc.get_pages().into_values().any(|page_id| {
        page_xobjects(doc, page_id).into_iter().any(|(name, id)| {
            name.contains(EMBEDDED_PAGE_SENTINEL) && xobject_kind(doc, id).is_some()
        })
    })
}

/// Build one wrapper page per embedded XObject.
pub fn extract(doc: &Document) -> Result<Vec<OutputPage>> {
    let embedded = find_embedded_pages(doc);
    if embedded.is_empty() {
        return Err(Error::NoEmbeddedContentFound(
            "No embedded pages found".to_string(),
        ));
    }

    embedded
        .iter()
        .map(|item| {
            log::debug!(
                "Wrapping /{} {:?} from page {}",
                item.name,
                item.object_id,
                item.page
            );
            wrap(item)
        })
        .collect()
}

fn wrap(item: &EmbeddedPage) -> Result<OutputPage> {
    let (matrix, media_box) = match item.kind {
        XObjectKind::Form { bbox } => (
            [1.0, 0.0, 0.0, 1.0, -bbox.x0, -bbox.y0],
            bbox.normalized(),
        ),
        XObjectKind::Image { width, height } => {
            let drawn_width = WRAP_WIDTH - 2.0 * WRAP_MARGIN;
            let drawn_height = if width > 0.0 {
                height * drawn_width / width
            } else {
                drawn_width
            };
            (
                [drawn_width, 0.0, 0.0, drawn_height, WRAP_MARGIN, WRAP_MARGIN],
                PageBox::from_size(WRAP_WIDTH, drawn_height + 2.0 * WRAP_MARGIN),
            )
        }
    };

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                matrix.iter().map(|value| Object::Real(*value)).collect(),
            ),
            Operation::new("Do", vec![Object::Name(WRAPPED_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let bytes = content
        .encode()
        .map_err(|e| Error::SerializationFailure(format!("wrapper content: {}", e)))?;

    Ok(OutputPage::wrapping(
        WRAPPED_NAME,
        item.object_id,
        Stream::new(dictionary! {}, bytes),
        media_box,
    ))
}

fn xobject_kind(doc: &Document, id: ObjectId) -> Option<XObjectKind> {
    let dict = xobject_dict(doc, id)?;
    match name_of(dict, b"Subtype")? {
        b"Form" => {
            let bbox = dict
                .get(b"BBox")
                .ok()
                .and_then(|obj| resolve(doc, obj))
                .and_then(PageBox::from_object)?;
            Some(XObjectKind::Form { bbox })
        }
        b"Image" => {
            let width = integer_of(doc, dict, b"Width")?;
            let height = integer_of(doc, dict, b"Height")?;
            Some(XObjectKind::Image {
                width: width as f32,
                height: height as f32,
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with(doc: &mut Document, pages_id: ObjectId, xobjects: lopdf::Dictionary) -> ObjectId {
        let content = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content,
            "Resources" => dictionary! { "XObject" => xobjects },
        })
    }

    fn finish(doc: &mut Document, pages_id: ObjectId, kids: Vec<ObjectId>) {
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids.into_iter().map(Object::Reference).collect::<Vec<_>>(),
                "Count" => count,
            }),
        );
        let catalog = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog);
    }

    fn form(doc: &mut Document, bbox: [i64; 4]) -> ObjectId {
        doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => bbox.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
            },
            b"0 0 m 10 10 l S".to_vec(),
        ))
    }

    #[test]
    fn test_duplicates_wrapped_once() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let shared = form(&mut doc, [10, 20, 310, 420]);
        let other = form(&mut doc, [0, 0, 100, 100]);
        let p1 = page_with(
            &mut doc,
            pages_id,
            dictionary! { "EmbeddedPdfPage1" => shared, "Logo" => other },
        );
        let p2 = page_with(&mut doc, pages_id, dictionary! { "EmbeddedPdfPage1" => shared });
        finish(&mut doc, pages_id, vec![p1, p2]);

        let found = find_embedded_pages(&doc);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].object_id, shared);
        assert_eq!(found[0].page, 1);
        assert!(has_embedded_pages(&doc));

        let pages = extract(&doc).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].media_box, PageBox::new(0.0, 0.0, 300.0, 400.0));
        assert!(pages[0].source_page.is_none());
    }

    #[test]
    fn test_image_wrapped_with_margin() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let image = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 500,
                "Height" => 250,
            },
            Vec::new(),
        ));
        let page = page_with(&mut doc, pages_id, dictionary! { "EmbeddedPdfPage" => image });
        finish(&mut doc, pages_id, vec![page]);

        let pages = extract(&doc).unwrap();
        // 928 points between the margins, 464 high at the image's 2:1 ratio
        assert_eq!(pages[0].media_box, PageBox::from_size(1000.0, 536.0));

        let crate::deembed::page::ContentRef::Fresh(stream) = &pages[0].contents[0] else {
            panic!("expected a fresh stream");
        };
        let content = Content::decode(&stream.content).unwrap();
        let ops: Vec<&str> = content.operations.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(ops, vec!["q", "cm", "Do", "Q"]);
        let cm = &content.operations[1].operands;
        assert_eq!(cm[0].as_float().unwrap(), 928.0);
        assert_eq!(cm[3].as_float().unwrap(), 464.0);
        assert_eq!(cm[4].as_float().unwrap(), 36.0);
        assert_eq!(cm[5].as_float().unwrap(), 36.0);
        assert_eq!(
            cm[0].as_float().unwrap() + 2.0 * cm[4].as_float().unwrap(),
            pages[0].media_box.width()
        );
    }

    #[test]
    fn test_non_wrappable_subtype_skipped() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let ps = doc.add_object(Stream::new(
            dictionary! { "Type" => "XObject", "Subtype" => "PS" },
            Vec::new(),
        ));
        let page = page_with(&mut doc, pages_id, dictionary! { "EmbeddedPdfPage" => ps });
        finish(&mut doc, pages_id, vec![page]);

        assert!(!has_embedded_pages(&doc));
        let err = extract(&doc).unwrap_err();
        assert!(matches!(err, Error::NoEmbeddedContentFound(_)));
    }
}
