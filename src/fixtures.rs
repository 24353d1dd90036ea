//! In-memory test inputs shared by unit tests.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

/// Encode a solid-colour image in `format`.
pub fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([40, 120, 200]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap();
    bytes
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    image_bytes(width, height, ImageFormat::Jpeg)
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    image_bytes(width, height, ImageFormat::Png)
}

fn blank_content() -> Vec<u8> {
    Content {
        operations: vec![Operation::new("q", vec![]), Operation::new("Q", vec![])],
    }
    .encode()
    .unwrap()
}

/// A PDF with one page per `(width, height)`, each carrying its own MediaBox.
pub fn document(sizes: &[(i64, i64)]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = sizes
        .iter()
        .map(|&(width, height)| {
            let content_id = doc.add_object(Stream::new(dictionary! {}, blank_content()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
                "Resources" => dictionary! {},
                "Contents" => content_id,
            });
            page_id.into()
        })
        .collect();

    finish(doc, pages_id, kids, dictionary! {})
}

/// A PDF whose pages inherit MediaBox and Resources from the page tree root.
pub fn document_with_inherited_media_box(width: i64, height: i64, pages: usize) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            let content_id = doc.add_object(Stream::new(dictionary! {}, blank_content()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

    let inherited = dictionary! {
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Resources" => dictionary! {},
    };
    finish(doc, pages_id, kids, inherited)
}

fn finish(
    mut doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    mut pages: lopdf::Dictionary,
) -> Document {
    let count = kids.len() as i64;
    pages.set("Type", "Pages");
    pages.set("Kids", kids);
    pages.set("Count", count);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Write [`document`] to `path`.
pub fn write_pdf(path: &Path, sizes: &[(i64, i64)]) {
    document(sizes).save(path).unwrap();
}

/// Width and height of a page's MediaBox.
pub fn media_box_size(document: &Document, page_id: ObjectId) -> (f32, f32) {
    let page = document.get_dictionary(page_id).unwrap();
    let media_box = page.get(b"MediaBox").and_then(Object::as_array).unwrap();
    let values: Vec<f32> = media_box.iter().map(|v| v.as_float().unwrap()).collect();
    (values[2] - values[0], values[3] - values[1])
}

/// Page sizes of the PDF at `path`, in page order.
pub fn page_sizes(path: &Path) -> Vec<(f32, f32)> {
    let document = Document::load_mem(&std::fs::read(path).unwrap()).unwrap();
    document
        .get_pages()
        .into_values()
        .map(|id| media_box_size(&document, id))
        .collect()
}
