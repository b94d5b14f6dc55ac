use super::MaterializedPage;
use crate::codec::SourceDocument;
use crate::constants::PDF_RENDER_SCALE;
use crate::types::*;

/// Measure every page of a PDF at the preview render scale.
///
/// Dimensions follow viewport semantics: a page whose own `/Rotate` is a
/// quarter turn reports its width and height swapped.
pub(super) fn materialize_pdf(name: &str, bytes: &[u8]) -> Result<Vec<MaterializedPage>> {
    let source = SourceDocument::load(bytes).map_err(|e| AssembleError::decode(name, e))?;

    (0..source.page_count())
        .map(|index| {
            let (w, h) = source.page_size(index)?;
            let quarter_turn = matches!(source.page_rotation(index)?, 90 | 270);
            let (width, height) = if quarter_turn { (h, w) } else { (w, h) };

            Ok(MaterializedPage {
                source_page_index: index,
                thumbnail: Thumbnail::Unrendered,
                width: width * PDF_RENDER_SCALE,
                height: height * PDF_RENDER_SCALE,
            })
        })
        .collect()
}
