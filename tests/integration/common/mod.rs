//! Integration tests for dirpdf.
//!
//! Inputs are generated on the fly into temporary directories, so the tests
//! need no checked-in fixtures.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::{Document, Object, Stream, dictionary};
use tempfile::TempDir;

/// Create `<tmp>/<name>/` and return both, keeping the temp dir alive.
pub fn named_dir(name: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let dir = temp_dir.path().join(name);
    std::fs::create_dir(&dir).expect("Failed to create input dir");
    (temp_dir, dir)
}

/// Write a solid-colour image of the given size and format.
pub fn write_image(path: &Path, width: u32, height: u32, format: ImageFormat) {
    let image = RgbImage::from_pixel(width, height, Rgb([200, 80, 20]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("Failed to encode image");
    std::fs::write(path, bytes).expect("Failed to write image");
}

/// Write a PDF with one blank page per `(width, height)`.
pub fn write_pdf(path: &Path, sizes: &[(i64, i64)]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = sizes
        .iter()
        .map(|&(width, height)| {
            let content_id = doc.add_object(Stream::new(dictionary! {}, b"q Q".to_vec()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
                "Resources" => dictionary! {},
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

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
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("Failed to write PDF");
}

/// Load a PDF from disk.
pub fn load(path: &Path) -> Document {
    let bytes = std::fs::read(path).expect("Failed to read PDF");
    Document::load_mem(&bytes).expect("Failed to parse PDF")
}

/// MediaBox width and height of every page, in page order.
pub fn page_sizes(path: &Path) -> Vec<(f32, f32)> {
    let document = load(path);
    document
        .get_pages()
        .into_values()
        .map(|id| {
            let page = document.get_dictionary(id).unwrap();
            let media_box = page.get(b"MediaBox").and_then(Object::as_array).unwrap();
            let v: Vec<f32> = media_box.iter().map(|n| n.as_float().unwrap()).collect();
            (v[2] - v[0], v[3] - v[1])
        })
        .collect()
}
