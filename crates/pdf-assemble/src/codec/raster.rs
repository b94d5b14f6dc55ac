//! Raster image XObjects
//!
//! JPEG data is embedded as-is with `DCTDecode`; everything else is decoded
//! and stored as raw 8-bit samples (compressed on save), with an optional
//! soft mask carrying the alpha channel.

use crate::types::{ImageKind, Result};
use image::{ColorType, DynamicImage, ImageDecoder};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::Cursor;

/// An image placed in the output document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRef {
    pub id: ObjectId,
    pub width: u32,
    pub height: u32,
}

impl ImageRef {
    /// Natural size in pixels, used 1:1 as points for the page size
    pub fn natural_size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }
}

pub(crate) fn embed_image(doc: &mut Document, bytes: &[u8], kind: ImageKind) -> Result<ImageRef> {
    if kind == ImageKind::Jpeg {
        if let Some(image) = embed_jpeg_passthrough(doc, bytes)? {
            return Ok(image);
        }
    }

    let decoded = image::load_from_memory_with_format(bytes, kind.format())?;
    Ok(embed_decoded(doc, &decoded))
}

/// Embed a baseline gray or RGB JPEG without re-encoding it.
/// Returns `None` for colour layouts that need the decode path.
fn embed_jpeg_passthrough(doc: &mut Document, bytes: &[u8]) -> Result<Option<ImageRef>> {
    let decoder = image::codecs::jpeg::JpegDecoder::new(Cursor::new(bytes))?;
    let (width, height) = decoder.dimensions();
    let color_space: &[u8] = match decoder.color_type() {
        ColorType::L8 => b"DeviceGray",
        ColorType::Rgb8 => b"DeviceRGB",
        _ => return Ok(None),
    };

    let mut dict = image_dictionary(width, height, color_space);
    dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
    let stream = Stream::new(dict, bytes.to_vec()).with_compression(false);

    Ok(Some(ImageRef {
        id: doc.add_object(stream),
        width,
        height,
    }))
}

fn embed_decoded(doc: &mut Document, decoded: &DynamicImage) -> ImageRef {
    let (width, height) = (decoded.width(), decoded.height());
    let has_alpha = decoded.color().has_alpha();

    let (color_space, samples): (&[u8], Vec<u8>) = if decoded.color().has_color() {
        (b"DeviceRGB", decoded.to_rgb8().into_raw())
    } else {
        (b"DeviceGray", decoded.to_luma8().into_raw())
    };

    let mut dict = image_dictionary(width, height, color_space);

    if has_alpha {
        let alpha: Vec<u8> = decoded.to_rgba8().pixels().map(|p| p.0[3]).collect();
        let mask = image_dictionary(width, height, b"DeviceGray");
        let mask_id = doc.add_object(Stream::new(mask, alpha));
        dict.set("SMask", Object::Reference(mask_id));
    }

    ImageRef {
        id: doc.add_object(Stream::new(dict, samples)),
        width,
        height,
    }
}

fn image_dictionary(width: u32, height: u32, color_space: &[u8]) -> Dictionary {
    Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(width as i64)),
        ("Height", Object::Integer(height as i64)),
        ("ColorSpace", Object::Name(color_space.to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
    ])
}
