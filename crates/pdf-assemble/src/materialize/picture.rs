use super::MaterializedPage;
use crate::constants::{THUMBNAIL_JPEG_QUALITY, THUMBNAIL_MAX_EDGE};
use crate::types::*;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::sync::Arc;

/// Decode an image and re-encode a JPEG thumbnail from it
pub(super) fn materialize_image(name: &str, bytes: &[u8], kind: ImageKind) -> Result<MaterializedPage> {
    let decoded = image::load_from_memory_with_format(bytes, kind.format())
        .map_err(|e| AssembleError::decode(name, e))?;
    let (width, height) = (decoded.width(), decoded.height());

    let preview = if width > THUMBNAIL_MAX_EDGE || height > THUMBNAIL_MAX_EDGE {
        decoded.resize(THUMBNAIL_MAX_EDGE, THUMBNAIL_MAX_EDGE, FilterType::Triangle)
    } else {
        decoded
    };
    let rgb = preview.to_rgb8();

    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, THUMBNAIL_JPEG_QUALITY).encode_image(&rgb)?;

    Ok(MaterializedPage {
        source_page_index: 0,
        thumbnail: Thumbnail::Jpeg {
            width: rgb.width(),
            height: rgb.height(),
            data: Arc::from(encoded),
        },
        width: width as f32,
        height: height as f32,
    })
}
