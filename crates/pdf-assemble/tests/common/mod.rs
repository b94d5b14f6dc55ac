#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::Cursor;

/// Build a PDF whose pages are Letter sized. `rotate` is set on the page
/// tree node so every page inherits it.
pub fn create_test_pdf(num_pages: usize, rotate: Option<i64>) -> Document {
    let mut doc = Document::with_version("1.7");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));
    let resources = Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Reference(font_id))])),
    )]);

    let mut kids = Vec::new();
    for i in 0..num_pages {
        let content = format!("BT /F1 24 Tf 72 720 Td (Page {}) Tj ET", i + 1);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let mut pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        ),
        ("Resources", Object::Dictionary(resources)),
    ]);
    if let Some(degrees) = rotate {
        pages_dict.set("Rotate", Object::Integer(degrees));
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    doc
}

pub fn pdf_bytes(num_pages: usize, rotate: Option<i64>) -> Vec<u8> {
    let mut doc = create_test_pdf(num_pages, rotate);
    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    writer
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, _| image::Rgba([(x % 256) as u8, 64, 128, 200]));
    encode(DynamicImage::ImageRgba8(image), ImageFormat::Png)
}

/// PNG carrying a `tEXt` chunk right after the header
pub fn png_with_text(width: u32, height: u32, keyword: &str, text: &str) -> Vec<u8> {
    let png = png_bytes(width, height);
    // Signature (8) + IHDR chunk (4 + 4 + 13 + 4)
    let (head, tail) = png.split_at(33);

    let mut chunk_body = b"tEXt".to_vec();
    chunk_body.extend_from_slice(keyword.as_bytes());
    chunk_body.push(0);
    chunk_body.extend_from_slice(text.as_bytes());

    let mut out = head.to_vec();
    out.extend_from_slice(&((chunk_body.len() - 4) as u32).to_be_bytes());
    out.extend_from_slice(&chunk_body);
    out.extend_from_slice(&crc32(&chunk_body).to_be_bytes());
    out.extend_from_slice(tail);
    out
}

fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in bytes {
        crc ^= byte as u32;
        for _ in 0..8 {
            crc = if crc & 1 == 1 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
        }
    }
    !crc
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |_, y| image::Rgb([200, (y % 256) as u8, 32]));
    encode(DynamicImage::ImageRgb8(image), ImageFormat::Jpeg)
}

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

pub fn number(object: &Object) -> f32 {
    match object {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r,
        other => panic!("Expected a number, got {:?}", other),
    }
}

/// MediaBox of an output page as (x, y, width, height)
pub fn media_box(doc: &Document, page_id: ObjectId) -> (f32, f32, f32, f32) {
    let dict = doc.get_dictionary(page_id).unwrap();
    let values: Vec<f32> = dict
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(number)
        .collect();
    (values[0], values[1], values[2] - values[0], values[3] - values[1])
}

pub fn rotate_of(doc: &Document, page_id: ObjectId) -> i64 {
    doc.get_dictionary(page_id)
        .unwrap()
        .get(b"Rotate")
        .ok()
        .and_then(|r| r.as_i64().ok())
        .unwrap_or(0)
}

pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}
