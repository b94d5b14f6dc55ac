//! Realising the ledger as an output PDF
//!
//! This module orchestrates an export:
//! 1. Copy PDF pages and build image pages, in ledger order
//! 2. Compose each page's rotation with what the source already carried
//! 3. Stamp the optional watermark on every output page
//! 4. Serialize
//!
//! Failures of a single page or file are logged and skipped; only an empty
//! ledger or an empty result fail the export.

mod watermark;

pub use watermark::{
    WatermarkPlacement, centered_anchor, place_watermark, rotate_vector, watermark_font_size,
};

use crate::codec::{ImageRef, OutputDocument, SourceDocument};
use crate::options::ExportOptions;
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use watermark::apply_watermark;

/// Everything an export reads, copied out of the session when it starts
#[derive(Debug, Clone, Default)]
pub struct AssemblyInput {
    pub pages: Vec<PageDescriptor>,
    pub files: HashMap<FileId, Arc<SourceFile>>,
}

/// A finished export
#[derive(Debug, Clone)]
pub struct Assembled {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub skipped: Vec<SkippedPage>,
}

/// Assemble off the async executor
pub async fn assemble(input: AssemblyInput, options: ExportOptions) -> Result<Assembled> {
    tokio::task::spawn_blocking(move || assemble_sync(&input.pages, &input.files, &options)).await?
}

pub fn assemble_sync(
    pages: &[PageDescriptor],
    files: &HashMap<FileId, Arc<SourceFile>>,
    options: &ExportOptions,
) -> Result<Assembled> {
    if pages.is_empty() {
        return Err(AssembleError::EmptyDocument);
    }
    options.validate()?;

    let mut output = OutputDocument::new();
    let mut sources = SourceCache::default();
    let mut skipped = Vec::new();

    for page in pages {
        let result = match files.get(&page.source_file) {
            Some(file) => match file.kind {
                SourceKind::Pdf => place_pdf_page(&mut output, &mut sources, file, page),
                SourceKind::Image(kind) => {
                    place_image_page(&mut output, &mut sources, file, kind, page)
                }
            },
            None => Err(AssembleError::UnknownSource(page.source_file)),
        };

        if let Err(e) = result {
            log::warn!("Skipping {} during export: {}", page.id, e);
            skipped.push(SkippedPage {
                page_id: page.id,
                reason: e.to_string(),
            });
        }
    }

    if let Some(wm) = options.active_watermark() {
        match apply_watermark(&mut output, wm) {
            Ok(stamped) => log::debug!("Watermark stamped on {} page(s)", stamped),
            Err(e) => log::warn!("Failed to apply watermark: {}", e),
        }
    }

    let page_count = output.page_count();
    if page_count == 0 {
        return Err(AssembleError::EmptyOutput);
    }

    let bytes = output.save()?;
    log::info!(
        "Assembled {} page(s), {} skipped, {} bytes",
        page_count,
        skipped.len(),
        bytes.len()
    );

    Ok(Assembled {
        bytes,
        page_count,
        skipped,
    })
}

/// Decoded sources for one export run, keyed by file. A source that failed
/// to load is remembered as `None` so it is not parsed again per page.
#[derive(Default)]
struct SourceCache {
    pdfs: HashMap<FileId, Option<SourceDocument>>,
    images: HashMap<FileId, ImageRef>,
}

fn place_pdf_page(
    output: &mut OutputDocument,
    sources: &mut SourceCache,
    file: &SourceFile,
    page: &PageDescriptor,
) -> Result<()> {
    let entry = sources.pdfs.entry(file.id).or_insert_with(|| {
        log::debug!("Loading source document {}", file.name);
        match SourceDocument::load(&file.data) {
            Ok(doc) => Some(doc),
            Err(e) => {
                log::warn!("Failed to load {}: {}", file.name, e);
                None
            }
        }
    });
    let Some(source) = entry.as_mut() else {
        return Err(AssembleError::decode(&file.name, "source document could not be loaded"));
    };

    let copied = output.copy_page(source, page.source_page_index)?;
    let existing = output.rotation(copied)?;
    output.set_rotation(copied, page.rotation.compose(existing))
}

fn place_image_page(
    output: &mut OutputDocument,
    sources: &mut SourceCache,
    file: &SourceFile,
    kind: ImageKind,
    page: &PageDescriptor,
) -> Result<()> {
    let image = match sources.images.get(&file.id) {
        Some(image) => *image,
        None => {
            let image = output
                .embed_image(&file.data, kind)
                .map_err(|e| AssembleError::decode(&file.name, e))?;
            sources.images.insert(file.id, image);
            image
        }
    };

    let (width, height) = image.natural_size();
    let new_page = output.add_page(width, height);
    output.draw_image(new_page, image, 0.0, 0.0, width, height)?;
    output.set_rotation(new_page, page.rotation.degrees())
}

/// Write an assembled document to disk
pub async fn save_pdf(bytes: &[u8], path: impl AsRef<std::path::Path>) -> Result<()> {
    tokio::fs::write(path.as_ref(), bytes).await?;
    log::info!("Saved {}", path.as_ref().display());
    Ok(())
}
