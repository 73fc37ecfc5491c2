//! Output document assembly.
//!
//! The output starts from a copy of the source object arena, so content
//! streams and resources kept by the engine are carried over by id. A new
//! page tree is built on top, then everything unreachable from it is pruned
//! before serialization.

use std::fs;
use std::io::Write;
use std::path::Path;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};

use crate::deembed::{ContentRef, OutputPage};
use crate::error::{Error, Result};

/// Page boxes dropped from output pages; only `MediaBox` and `BleedBox` are
/// written.
const DROPPED_BOXES: [&[u8]; 3] = [b"CropBox", b"TrimBox", b"ArtBox"];

/// Builds output documents from engine pages.
pub struct OutputAssembler<'a> {
    source: &'a Document,
}

impl<'a> OutputAssembler<'a> {
    /// Create an assembler over the document the pages were taken from.
    pub fn new(source: &'a Document) -> Self {
        Self { source }
    }

    /// Build the output document.
    ///
    /// Boxes are written translated to the origin. `BleedBox` falls back to
    /// `MediaBox` when the page had none.
    pub fn build(&self, pages: Vec<OutputPage>) -> Result<Document> {
        if pages.is_empty() {
            return Err(Error::NoEmbeddedContentFound(
                "no pages to assemble".to_string(),
            ));
        }

        let mut doc = Document::with_version(self.source.version.clone());
        doc.objects = self.source.objects.clone();
        doc.max_id = self.source.max_id;

        let pages_id = doc.new_object_id();
        let mut kids = Vec::with_capacity(pages.len());

        for page in pages {
            let contents: Vec<Object> = page
                .contents
                .into_iter()
                .map(|content| match content {
                    ContentRef::Existing(id) => Object::Reference(id),
                    ContentRef::Fresh(stream) => Object::Reference(doc.add_object(stream)),
                })
                .collect();

            let mut dict = page.dict;
            for key in DROPPED_BOXES {
                dict.remove(key);
            }
            dict.set("Type", "Page");
            dict.set("Parent", pages_id);
            dict.set("MediaBox", page.media_box.normalized().to_object());
            dict.set(
                "BleedBox",
                page.bleed_box
                    .unwrap_or(page.media_box)
                    .normalized()
                    .to_object(),
            );
            let contents = if contents.len() == 1 {
                contents[0].clone()
            } else {
                Object::Array(contents)
            };
            dict.set("Contents", contents);

            let annots = annotation_ids(&dict);
            let page_id = doc.add_object(dict);
            for annot_id in annots {
                if let Ok(annot) = doc.get_dictionary_mut(annot_id) {
                    if annot.has(b"P") {
                        annot.set("P", page_id);
                    }
                }
            }
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });

        doc.trailer = dictionary! { "Root" => catalog_id };
        if let Ok(info) = self.source.trailer.get(b"Info") {
            doc.trailer.set("Info", info.clone());
        }

        let pruned = doc.prune_objects();
        log::debug!("Pruned {} unreachable objects", pruned.len());
        doc.renumber_objects();
        doc.compress();

        Ok(doc)
    }

    /// Build and serialize the output document.
    pub fn to_bytes(&self, pages: Vec<OutputPage>) -> Result<Vec<u8>> {
        let mut doc = self.build(pages)?;
        serialize(&mut doc)
    }

    /// Build the output document and write it to `path`.
    ///
    /// Nothing is left at `path` if building or writing fails.
    pub fn to_file<P: AsRef<Path>>(&self, pages: Vec<OutputPage>, path: P) -> Result<()> {
        let bytes = self.to_bytes(pages)?;
        write_atomically(path.as_ref(), &bytes)
    }
}

/// Indirect annotations listed on a page.
fn annotation_ids(page: &Dictionary) -> Vec<ObjectId> {
    match page.get(b"Annots") {
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_reference().ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// Serialize a document to PDF bytes.
pub fn serialize(doc: &mut Document) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| Error::SerializationFailure(e.to_string()))?;
    Ok(buffer)
}

/// Write `bytes` to `path` through a temporary file in the same directory.
///
/// An existing file at `path` is only replaced once the new content is
/// completely written.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| Error::SerializationFailure(format!("{}: {}", dir.display(), e)))?;
    file.write_all(bytes)
        .and_then(|_| file.flush())
        .map_err(|e| Error::SerializationFailure(e.to_string()))?;
    if let Some(permissions) = target_permissions(path) {
        file.as_file()
            .set_permissions(permissions)
            .map_err(|e| Error::SerializationFailure(format!("{}: {}", path.display(), e)))?;
    }
    file.persist(path)
        .map_err(|e| Error::SerializationFailure(format!("{}: {}", path.display(), e.error)))?;
    Ok(())
}

/// Permissions for a file written to `path`: those of the file it replaces,
/// otherwise world-readable.
fn target_permissions(path: &Path) -> Option<fs::Permissions> {
    if let Ok(existing) = fs::metadata(path) {
        return Some(existing.permissions());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        Some(fs::Permissions::from_mode(0o644))
    }
    #[cfg(not(unix))]
    {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageBox;
    use lopdf::Stream;

    fn source() -> (Document, lopdf::ObjectId) {
        let mut doc = Document::with_version("1.6");
        let stream = doc.add_object(Stream::new(dictionary! {}, b"0 0 m 1 1 l S".to_vec()));
        let info = doc.add_object(dictionary! { "Title" => Object::string_literal("Apuntes") });
        doc.add_object(dictionary! { "Unused" => true });
        doc.trailer.set("Info", info);
        (doc, stream)
    }

    fn page(stream: lopdf::ObjectId, media: PageBox, bleed: Option<PageBox>) -> OutputPage {
        let mut dict = Dictionary::new();
        dict.set("CropBox", PageBox::from_size(1.0, 1.0).to_object());
        OutputPage {
            source_page: Some(1),
            dict,
            contents: vec![ContentRef::Existing(stream)],
            media_box: media,
            bleed_box: bleed,
        }
    }

    #[test]
    fn test_build_normalizes_boxes() {
        let (src, stream) = source();
        let pages = vec![
            page(stream, PageBox::new(10.0, 20.0, 310.0, 420.0), None),
            page(
                stream,
                PageBox::new(0.0, 0.0, 595.0, 842.0),
                Some(PageBox::new(5.0, 5.0, 590.0, 837.0)),
            ),
        ];
        let doc = OutputAssembler::new(&src).build(pages).unwrap();
        assert_eq!(doc.version, "1.6");

        let page_ids: Vec<_> = doc.get_pages().into_values().collect();
        assert_eq!(page_ids.len(), 2);

        let first = doc.get_dictionary(page_ids[0]).unwrap();
        let media = PageBox::from_object(first.get(b"MediaBox").unwrap()).unwrap();
        let bleed = PageBox::from_object(first.get(b"BleedBox").unwrap()).unwrap();
        assert_eq!(media, PageBox::from_size(300.0, 400.0));
        assert_eq!(bleed, media);
        assert!(!first.has(b"CropBox"));

        let second = doc.get_dictionary(page_ids[1]).unwrap();
        let bleed = PageBox::from_object(second.get(b"BleedBox").unwrap()).unwrap();
        assert_eq!(bleed, PageBox::from_size(585.0, 832.0));

        assert!(doc.trailer.get(b"Info").is_ok());
        let unused = doc.objects.values().any(|obj| {
            obj.as_dict()
                .map(|dict| dict.has(b"Unused"))
                .unwrap_or(false)
        });
        assert!(!unused);
    }

    #[test]
    fn test_fresh_streams_are_allocated() {
        let (src, _) = source();
        let fresh = OutputPage::wrapping(
            "X0",
            (99, 0),
            Stream::new(dictionary! {}, b"q Q".to_vec()),
            PageBox::from_size(100.0, 100.0),
        );
        let doc = OutputAssembler::new(&src).build(vec![fresh]).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();
        let contents = doc.get_page_contents(page_id);
        assert_eq!(contents.len(), 1);
        assert!(doc.get_object(contents[0]).unwrap().as_stream().is_ok());
    }

    #[test]
    fn test_empty_page_list_rejected() {
        let (src, _) = source();
        let err = OutputAssembler::new(&src).build(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::NoEmbeddedContentFound(_)));
    }

    #[test]
    fn test_to_file_writes_complete_output() {
        let (src, stream) = source();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        let pages = vec![page(stream, PageBox::from_size(10.0, 10.0), None)];
        OutputAssembler::new(&src).to_file(pages, &path).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert!(written.starts_with(b"%PDF-1.6"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_atomically_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.pdf");
        let err = write_atomically(&path, b"%PDF-1.4").unwrap_err();
        assert!(matches!(err, Error::SerializationFailure(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_annotations_point_at_new_page() {
        let (mut src, stream) = source();
        let annot = src.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "P" => (1, 0),
        });
        let mut kept = page(stream, PageBox::from_size(10.0, 10.0), None);
        kept.dict.set("Annots", vec![Object::Reference(annot)]);

        let doc = OutputAssembler::new(&src).build(vec![kept]).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();
        let annots = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Annots")
            .unwrap()
            .as_array()
            .unwrap();
        assert_eq!(annots.len(), 1);
        let annot = doc
            .get_dictionary(annots[0].as_reference().unwrap())
            .unwrap();
        assert_eq!(annot.get(b"P").unwrap().as_reference().unwrap(), page_id);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomically_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let fresh = dir.path().join("fresh.pdf");
        write_atomically(&fresh, b"%PDF-1.4").unwrap();
        let mode = fs::metadata(&fresh).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);

        let existing = dir.path().join("existing.pdf");
        fs::write(&existing, b"old").unwrap();
        fs::set_permissions(&existing, fs::Permissions::from_mode(0o640)).unwrap();
        write_atomically(&existing, b"%PDF-1.4").unwrap();
        let mode = fs::metadata(&existing).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
        assert_eq!(fs::read(&existing).unwrap(), b"%PDF-1.4");
    }
}
