//! Turning uploaded files into page records
//!
//! A PDF yields one page per document page; an image yields exactly one.
//! The session assigns page ids when it appends the result to the ledger.

mod pdf;
mod picture;

use crate::types::*;
use std::sync::Arc;

/// Page information produced for one source page
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedPage {
    pub source_page_index: usize,
    pub thumbnail: Thumbnail,
    pub width: f32,
    pub height: f32,
}

/// Everything a file contributes to the session
#[derive(Debug, Clone, PartialEq)]
pub struct Materialized {
    pub source: SourceFile,
    pub pages: Vec<MaterializedPage>,
}

/// Decodes uploaded files. Presentation layers that can rasterize PDF pages
/// plug in their own implementation to get real thumbnails.
pub trait PageMaterializer: Send + Sync {
    fn materialize(&self, file_id: FileId, name: &str, bytes: Arc<[u8]>) -> Result<Materialized>;
}

/// Materialize off the async executor
pub async fn materialize(
    materializer: Arc<dyn PageMaterializer>,
    file_id: FileId,
    name: String,
    bytes: Arc<[u8]>,
) -> Result<Materialized> {
    tokio::task::spawn_blocking(move || materializer.materialize(file_id, &name, bytes)).await?
}

/// Default materializer: lopdf for PDFs, the `image` crate for pictures
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfMaterializer;

impl PageMaterializer for LopdfMaterializer {
    fn materialize(&self, file_id: FileId, name: &str, bytes: Arc<[u8]>) -> Result<Materialized> {
        let kind = SourceKind::detect(name, &bytes)?;

        let pages = match kind {
            SourceKind::Pdf => pdf::materialize_pdf(name, &bytes)?,
            SourceKind::Image(image_kind) => vec![picture::materialize_image(name, &bytes, image_kind)?],
        };

        log::debug!("Materialized {} ({:?}): {} page(s)", name, kind, pages.len());

        Ok(Materialized {
            source: SourceFile {
                id: file_id,
                name: name.to_string(),
                kind,
                data: bytes,
            },
            pages,
        })
    }
}
