//! Synthetic documents shaped like the platform's output.

#![allow(dead_code)]

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// A document together with the ids tests need to reason about.
pub struct Fixture {
    pub doc: Document,
    /// Content streams, indexed as in the layout passed to the builder
    pub streams: Vec<ObjectId>,
    /// Page dictionaries, in page order
    pub pages: Vec<ObjectId>,
}

impl Fixture {
    /// Serialize the document.
    pub fn to_bytes(&mut self) -> Vec<u8> {
        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer).unwrap();
        buffer
    }
}

fn content_stream(label: usize) -> Stream {
    let ops = format!("q 0 0 m {} {} l S Q", label, label + 1);
    Stream::new(dictionary! {}, ops.into_bytes())
}

fn finish(doc: &mut Document, pages_id: ObjectId, kids: &[ObjectId]) {
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "Count" => kids.len() as i64,
        }),
    );
    let catalog = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog);
    let info = doc.add_object(dictionary! {
        "Producer" => Object::string_literal("fixture"),
    });
    doc.trailer.set("Info", info);
}

/// Pages whose `Contents` arrays reference `streams` shared content
/// streams by index.
pub fn with_contents(layout: &[&[usize]], streams: usize, media_box: [i64; 4]) -> Fixture {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let ids: Vec<ObjectId> = (0..streams)
        .map(|i| doc.add_object(content_stream(i)))
        .collect();

    let pages: Vec<ObjectId> = layout
        .iter()
        .map(|indices| {
            let contents: Vec<Object> = indices.iter().map(|i| Object::Reference(ids[*i])).collect();
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
                "Contents" => contents,
                "Resources" => dictionary! {},
            })
        })
        .collect();

    finish(&mut doc, pages_id, &pages);
    Fixture {
        doc,
        streams: ids,
        pages,
    }
}

/// A wrapped document in the newer layout.
///
/// Every page draws `[pre, pre, M1, own, own, M2, post, post, post, ad, ad,
/// ad]`, where `M1` and `M2` are the same two objects on every page and
/// everything else is private to the page. The first nine entries are the
/// page's recoverable content.
pub fn wrapped(page_count: usize) -> Fixture {
    const PRIVATE: usize = 10;
    let markers = [0, 1];
    let mut layout: Vec<Vec<usize>> = Vec::new();
    for page in 0..page_count {
        let base = 2 + page * PRIVATE;
        let own = |k: usize| base + k;
        layout.push(vec![
            own(0),
            own(1),
            markers[0],
            own(2),
            own(3),
            markers[1],
            own(4),
            own(5),
            own(6),
            own(7),
            own(8),
            own(9),
        ]);
    }
    let refs: Vec<&[usize]> = layout.iter().map(Vec::as_slice).collect();
    with_contents(&refs, 2 + page_count * PRIVATE, [10, 20, 605, 862])
}

/// A document in the older layout: each page draws one embedded page form
/// framed by a horizontal and a vertical banner.
///
/// When `share_first` is set, the second page reuses the first page's form.
pub fn embedded(page_count: usize, share_first: bool) -> Fixture {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();
    let mut forms = Vec::new();
    let mut pages = Vec::new();

    for page in 0..page_count {
        let form = if share_first && page == 1 {
            forms[0]
        } else {
            let id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Form",
                    "BBox" => vec![5.into(), 5.into(), 600.into(), 847.into()],
                    "Resources" => dictionary! {},
                },
                format!("BT ({}) Tj ET", page).into_bytes(),
            ));
            forms.push(id);
            id
        };

        let banner = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 1414,
                "Height" => 247,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            Vec::new(),
        ));
        let side = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 170,
                "Height" => 1753,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            Vec::new(),
        ));
        let content = doc.add_object(Stream::new(
            dictionary! {},
            b"q 1 0 0 1 0 0 cm /EmbeddedPdfPage0 Do Q q 100 0 0 20 0 0 cm /Im0 Do Q".to_vec(),
        ));
        let mut xobjects = Dictionary::new();
        xobjects.set("EmbeddedPdfPage0", form);
        xobjects.set("Im0", banner);
        xobjects.set("Im1", side);
        pages.push(doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 842.into(), 1190.into()],
            "Contents" => content,
            "Resources" => dictionary! { "XObject" => xobjects },
        }));
    }

    finish(&mut doc, pages_id, &pages);
    Fixture {
        doc,
        streams: forms,
        pages,
    }
}

/// Plain single-stream pages with no decoration.
pub fn plain(page_count: usize) -> Fixture {
    let layout: Vec<Vec<usize>> = (0..page_count).map(|i| vec![i]).collect();
    let refs: Vec<&[usize]> = layout.iter().map(Vec::as_slice).collect();
    with_contents(&refs, page_count, [0, 0, 612, 792])
}

/// Read a four-number box entry of a page.
pub fn page_box(doc: &Document, page_id: ObjectId, key: &[u8]) -> [f32; 4] {
    let array = doc
        .get_dictionary(page_id)
        .unwrap()
        .get(key)
        .unwrap()
        .as_array()
        .unwrap();
    let mut out = [0.0; 4];
    for (slot, value) in out.iter_mut().zip(array) {
        *slot = value.as_float().unwrap();
    }
    out
}
