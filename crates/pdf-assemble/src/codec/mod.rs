//! Document codec built on lopdf
//!
//! This module handles all PDF-specific operations of an export:
//! - Copying pages out of source documents
//! - Creating pages from raster images
//! - Drawing text with a standard font and transparency
//! - Building the page tree and serializing the output

mod copy;
mod font;
mod raster;

pub use self::font::{StandardFont, encode_win_ansi};
pub use self::raster::ImageRef;

use crate::constants::OUTPUT_PDF_VERSION;
use crate::options::Rgb;
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{HashMap, HashSet};

/// A parsed source PDF plus the objects already copied out of it during
/// the current export.
pub struct SourceDocument {
    doc: Document,
    page_ids: Vec<ObjectId>,
    cache: HashMap<ObjectId, ObjectId>,
}

impl SourceDocument {
    pub fn load(bytes: &[u8]) -> Result<Self> {
        Ok(Self::from_document(Document::load_mem(bytes)?))
    }

    pub fn from_document(doc: Document) -> Self {
        let page_ids = doc.get_pages().into_values().collect();
        Self {
            doc,
            page_ids,
            cache: HashMap::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.page_ids
            .get(index)
            .copied()
            .ok_or(AssembleError::PageOutOfRange {
                index,
                count: self.page_ids.len(),
            })
    }

    /// Effective `/Rotate` of a source page
    pub fn page_rotation(&self, index: usize) -> Result<i64> {
        Ok(copy::page_rotation(&self.doc, self.page_id(index)?))
    }

    /// Effective MediaBox size of a source page in points
    pub fn page_size(&self, index: usize) -> Result<(f32, f32)> {
        let (_, _, w, h) = copy::page_box(&self.doc, self.page_id(index)?);
        Ok((w, h))
    }
}

/// A page of the output document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRef(ObjectId);

/// A font registered in the output document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontRef {
    id: ObjectId,
}

/// One line of text to draw on a page
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun<'a> {
    pub text: &'a str,
    /// Baseline origin in page space
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub font: FontRef,
    pub color: Rgb,
    pub opacity: f32,
    /// Counter-clockwise
    pub rotation_degrees: f32,
}

/// The document being assembled
pub struct OutputDocument {
    doc: Document,
    pages_tree_id: ObjectId,
    pages: Vec<ObjectId>,
    /// Pages whose original content is already wrapped in q/Q
    isolated: HashSet<ObjectId>,
    next_resource: usize,
}

impl Default for OutputDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputDocument {
    pub fn new() -> Self {
        let mut doc = Document::with_version(OUTPUT_PDF_VERSION);
        let pages_tree_id = doc.new_object_id();
        Self {
            doc,
            pages_tree_id,
            pages: Vec::new(),
            isolated: HashSet::new(),
            next_resource: 0,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Pages in output order
    pub fn page_refs(&self) -> Vec<PageRef> {
        self.pages.iter().copied().map(PageRef).collect()
    }

    /// Copy page `page_index` of `source` to the end of this document
    pub fn copy_page(&mut self, source: &mut SourceDocument, page_index: usize) -> Result<PageRef> {
        let page_id = source.page_id(page_index)?;
        let new_id = self.doc.new_object_id();
        copy::copy_page_dictionary(&mut self.doc, &source.doc, page_id, new_id, &mut source.cache)?;
        self.pages.push(new_id);
        Ok(PageRef(new_id))
    }

    /// Append a blank page of the given size in points
    pub fn add_page(&mut self, width: f32, height: f32) -> PageRef {
        let page_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(width),
                    Object::Real(height),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
        ]);
        let id = self.doc.add_object(page_dict);
        self.pages.push(id);
        PageRef(id)
    }

    pub fn rotation(&self, page: PageRef) -> Result<i64> {
        let dict = self.doc.get_dictionary(page.0)?;
        Ok(dict
            .get(b"Rotate")
            .map(|r| copy::resolve(&self.doc, r))
            .and_then(Object::as_i64)
            .unwrap_or(0)
            .rem_euclid(360))
    }

    pub fn set_rotation(&mut self, page: PageRef, degrees: i64) -> Result<()> {
        self.page_dict_mut(page)?
            .set("Rotate", Object::Integer(degrees.rem_euclid(360)));
        Ok(())
    }

    /// MediaBox as (x, y, width, height)
    pub fn page_box(&self, page: PageRef) -> Result<(f32, f32, f32, f32)> {
        Ok(copy::page_box(&self.doc, page.0))
    }

    pub fn embed_image(&mut self, bytes: &[u8], kind: ImageKind) -> Result<ImageRef> {
        raster::embed_image(&mut self.doc, bytes, kind)
    }

    pub fn draw_image(
        &mut self,
        page: PageRef,
        image: ImageRef,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<()> {
        let name = self.add_resource(page, b"XObject", "Im", Object::Reference(image.id))?;
        let ops = format!(
            "q {} 0 0 {} {} {} cm /{} Do Q\n",
            width, height, x, y, name
        );
        self.append_content(page, ops.into_bytes(), false)
    }

    pub fn embed_font(&mut self, font: StandardFont) -> FontRef {
        let id = self.doc.add_object(font.dictionary());
        FontRef { id }
    }

    /// Draw text over the existing page content
    pub fn draw_text(&mut self, page: PageRef, run: &TextRun) -> Result<()> {
        let gs = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"ExtGState".to_vec())),
            ("ca", Object::Real(run.opacity)),
            ("CA", Object::Real(run.opacity)),
        ]);
        let gs_name = self.add_resource(page, b"ExtGState", "GS", Object::Dictionary(gs))?;
        let font_name = self.add_resource(page, b"Font", "F", Object::Reference(run.font.id))?;

        let (sin, cos) = run.rotation_degrees.to_radians().sin_cos();
        let hex: String = encode_win_ansi(run.text)?
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect();

        let ops = format!(
            "q\n/{} gs\n{:.4} {:.4} {:.4} rg\nBT\n/{} {:.4} Tf\n{:.6} {:.6} {:.6} {:.6} {:.4} {:.4} Tm\n<{}> Tj\nET\nQ\n",
            gs_name,
            run.color.r,
            run.color.g,
            run.color.b,
            font_name,
            run.size,
            cos,
            sin,
            -sin,
            cos,
            run.x,
            run.y,
            hex
        );
        self.append_content(page, ops.into_bytes(), true)
    }

    /// Attach the page tree and catalog and return the finished document
    pub fn into_document(mut self) -> Document {
        let page_refs: Vec<Object> = self.pages.iter().copied().map(Object::Reference).collect();
        for &id in &self.pages {
            if let Ok(Object::Dictionary(dict)) = self.doc.get_object_mut(id) {
                dict.set("Parent", Object::Reference(self.pages_tree_id));
            }
        }

        let count = page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(page_refs)),
            ("Count", Object::Integer(count)),
        ]);
        self.doc
            .objects
            .insert(self.pages_tree_id, Object::Dictionary(pages_dict));

        let catalog_id = self.doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_tree_id)),
        ]));
        self.doc.trailer.set("Root", catalog_id);

        // Drop objects left behind by pages that failed halfway through a copy
        self.doc.prune_objects();
        self.doc.compress();
        self.doc
    }

    /// Serialize to PDF bytes
    pub fn save(self) -> Result<Vec<u8>> {
        let mut doc = self.into_document();
        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok(writer)
    }

    fn page_dict(&self, page: PageRef) -> Result<&Dictionary> {
        Ok(self.doc.get_dictionary(page.0)?)
    }

    fn page_dict_mut(&mut self, page: PageRef) -> Result<&mut Dictionary> {
        Ok(self.doc.get_object_mut(page.0)?.as_dict_mut()?)
    }

    /// Resolve an entry that may be a direct dictionary or a reference to one
    fn owned_dictionary(&self, obj: Option<&Object>) -> Dictionary {
        obj.and_then(|o| copy::resolve(&self.doc, o).as_dict().ok())
            .cloned()
            .unwrap_or_else(Dictionary::new)
    }

    /// Register `value` under a fresh name in one resource category of the
    /// page. Shared resource dictionaries are copied so other pages are not
    /// affected.
    fn add_resource(
        &mut self,
        page: PageRef,
        category: &[u8],
        prefix: &str,
        value: Object,
    ) -> Result<String> {
        let mut resources = self.owned_dictionary(self.page_dict(page)?.get(b"Resources").ok());
        let mut entries = self.owned_dictionary(resources.get(category).ok());

        let name = loop {
            self.next_resource += 1;
            let candidate = format!("{}{}", prefix, self.next_resource);
            if !entries.has(candidate.as_bytes()) {
                break candidate;
            }
        };

        entries.set(name.as_bytes().to_vec(), value);
        resources.set(category.to_vec(), Object::Dictionary(entries));
        self.page_dict_mut(page)?
            .set("Resources", Object::Dictionary(resources));
        Ok(name)
    }

    /// Add a content stream after the existing ones. With `isolate_existing`,
    /// earlier content is wrapped in q/Q first so its graphics state cannot
    /// leak into the new stream.
    fn append_content(&mut self, page: PageRef, ops: Vec<u8>, isolate_existing: bool) -> Result<()> {
        let existing = self.page_dict(page)?.get(b"Contents").ok().cloned();
        let mut streams = match existing {
            Some(Object::Array(items)) => items,
            Some(Object::Reference(id)) => match self.doc.get_object(id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(id)],
            },
            _ => Vec::new(),
        };

        if isolate_existing && !streams.is_empty() && self.isolated.insert(page.0) {
            let push = self.doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
            let pop = self.doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
            streams.insert(0, Object::Reference(push));
            streams.push(Object::Reference(pop));
        }

        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), ops));
        streams.push(Object::Reference(content_id));
        self.page_dict_mut(page)?
            .set("Contents", Object::Array(streams));
        Ok(())
    }
}
