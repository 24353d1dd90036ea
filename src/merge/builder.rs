//! Incremental assembly of the output document.
//!
//! A [`DocumentBuilder`] owns one growing `lopdf` document with a single flat
//! page tree. Pages are only ever appended: one per image, or every page of
//! an imported PDF in its original order.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};

use crate::config::CompressionLevel;
use crate::raster::NormalizedImage;

/// PDF version of a fresh output document.
const BASE_VERSION: &str = "1.5";

/// Attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against malformed (cyclic) page trees.
const MAX_TREE_DEPTH: usize = 64;

const IMAGE_NAME: &str = "Im0";

/// Values written to the output's Info dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    /// Document title.
    pub title: String,
    /// Producing application.
    pub producer: String,
}

impl DocumentInfo {
    /// Info for a document titled `title` and produced by this crate.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            producer: format!("{} {}", crate::NAME, crate::VERSION),
        }
    }
}

/// Append-only builder for the merged document.
#[derive(Debug)]
pub struct DocumentBuilder {
    document: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl DocumentBuilder {
    /// Start an empty document.
    pub fn new() -> Self {
        let mut document = Document::with_version(BASE_VERSION);
        let pages_id = document.new_object_id();
        Self {
            document,
            pages_id,
            kids: Vec::new(),
        }
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Check whether no page has been appended.
    pub fn is_empty(&self) -> bool {
        self.kids.is_empty()
    }

    /// Append one page exactly the size of `image`, with the image covering it.
    ///
    /// One image pixel maps to one PDF unit, and the image is drawn from the
    /// origin to the opposite corner with no margin.
    ///
    /// # Errors
    ///
    /// Returns an error if the page content stream cannot be encoded.
    pub fn append_image_page(&mut self, image: NormalizedImage) -> lopdf::Result<()> {
        let width = i64::from(image.width);
        let height = i64::from(image.height);

        let image_stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            image.bytes,
        )
        .with_compression(false);
        let image_id = self.document.add_object(image_stream);

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        width.into(),
                        0i64.into(),
                        0i64.into(),
                        height.into(),
                        0i64.into(),
                        0i64.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = self
            .document
            .add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0i64.into(), 0i64.into(), width.into(), height.into()],
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    IMAGE_NAME => image_id,
                },
            },
            "Contents" => content_id,
        });
        self.kids.push(page_id.into());

        Ok(())
    }

    /// Append every page of `source`, in order.
    ///
    /// Inheritable attributes are copied onto each page before it is moved
    /// under the output's page tree, so imported pages keep their resources
    /// and geometry.
    ///
    /// Returns the number of pages appended.
    pub fn append_document(&mut self, mut source: Document) -> usize {
        let source_pages: Vec<ObjectId> = source.get_pages().into_values().collect();
        flatten_inherited_attributes(&mut source, &source_pages);

        source.renumber_objects_with(self.document.max_id + 1);
        self.document.max_id = source.max_id;

        let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();
        for &page_id in &page_ids {
            if let Ok(page) = source.get_dictionary_mut(page_id) {
                page.set("Parent", self.pages_id);
            }
        }

        if source.version > self.document.version {
            self.document.version = source.version.clone();
        }

        self.document.objects.extend(source.objects);
        self.kids.extend(page_ids.iter().map(|&id| Object::Reference(id)));

        page_ids.len()
    }

    /// Close the page tree and produce the final document.
    ///
    /// Unreferenced objects (the imported documents' catalogs and page trees)
    /// are pruned and objects renumbered, so identical inputs always yield
    /// identical output.
    pub fn finish(mut self, info: &DocumentInfo, compression: CompressionLevel) -> Document {
        let count = self.kids.len() as i64;
        self.document.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.document.trailer.set("Root", catalog_id);

        let info_id = self.document.add_object(dictionary! {
            "Title" => text_string(&info.title),
            "Producer" => text_string(&info.producer),
        });
        self.document.trailer.set("Info", info_id);

        self.document.prune_objects();
        self.document.renumber_objects();

        if compression == CompressionLevel::Standard {
            self.document.compress();
        }

        self.document
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a PDF text string: literal for ASCII, UTF-16BE with BOM otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn flatten_inherited_attributes(document: &mut Document, page_ids: &[ObjectId]) {
    for &page_id in page_ids {
        for key in INHERITABLE {
            let present = document
                .get_dictionary(page_id)
                .map(|page| page.has(key))
                .unwrap_or(true);
            if present {
                continue;
            }

            if let Some(value) = inherited_attribute(document, page_id, key)
                && let Ok(page) = document.get_dictionary_mut(page_id)
            {
                page.set(key, value);
            }
        }
    }
}

fn inherited_attribute(document: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = document.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        let parent_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = document.get_dictionary(parent_id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
    }
    None
}
