//! Copying pages and their object graphs between documents

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Page attributes a page may inherit from its ancestors in the page tree
pub(crate) const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against malformed trees whose `Parent` chain loops
const MAX_TREE_DEPTH: usize = 64;

/// Look up a page attribute on the page itself or the nearest ancestor
/// that defines it.
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = current.get(key) {
            return Some(value);
        }
        let parent = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Follow a reference to the object it points at
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Rectangle `[x0 y0 x1 y1]` as (x, y, width, height)
pub(crate) fn rect_of(doc: &Document, obj: &Object) -> Option<(f32, f32, f32, f32)> {
    let values = resolve(doc, obj).as_array().ok()?;
    if values.len() != 4 {
        return None;
    }
    let mut coords = [0.0f32; 4];
    for (slot, value) in coords.iter_mut().zip(values) {
        *slot = extract_number(resolve(doc, value))?;
    }
    let [x0, y0, x1, y1] = coords;
    Some((x0.min(x1), y0.min(y1), (x1 - x0).abs(), (y1 - y0).abs()))
}

/// Effective MediaBox of a page, falling back to US Letter
pub(crate) fn page_box(doc: &Document, page_id: ObjectId) -> (f32, f32, f32, f32) {
    inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(|mb| rect_of(doc, mb))
        .unwrap_or((0.0, 0.0, DEFAULT_PAGE_DIMENSIONS.0, DEFAULT_PAGE_DIMENSIONS.1))
}

/// Effective `/Rotate` of a page, normalized to 0..360
pub(crate) fn page_rotation(doc: &Document, page_id: ObjectId) -> i64 {
    inherited_attribute(doc, page_id, b"Rotate")
        .and_then(|r| resolve(doc, r).as_i64().ok())
        .unwrap_or(0)
        .rem_euclid(360)
}

/// Extract numeric value from a PDF object
pub(crate) fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Copy one page dictionary from `source` into `output` under `new_id`.
///
/// The `Parent` link is dropped (the caller attaches the page to its own
/// tree) and inherited attributes are made explicit.
pub(crate) fn copy_page_dictionary(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    new_id: ObjectId,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<()> {
    let page_dict = source.get_dictionary(page_id)?;

    // Annotations point back at their page via /P
    cache.insert(page_id, new_id);

    let mut new_dict = Dictionary::new();
    for (key, value) in page_dict.iter() {
        if key.as_slice() == b"Parent" {
            continue;
        }
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }

    for key in INHERITABLE_KEYS {
        if new_dict.has(key) {
            continue;
        }
        if let Some(value) = inherited_attribute(source, page_id, key) {
            let copied = copy_object_deep(output, source, value, cache)?;
            new_dict.set(key.to_vec(), copied);
        }
    }

    new_dict.set("Type", Object::Name(b"Page".to_vec()));
    output.objects.insert(new_id, Object::Dictionary(new_dict));
    Ok(())
}

/// Deep copy an object from source to output document, following references.
///
/// Uses a cache so shared objects are copied once. Ids are reserved before
/// recursing, so reference cycles terminate. References to pages that were
/// not copied become null rather than dragging the whole source tree along.
pub(crate) fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            let referenced = match source.get_object(*id) {
                Ok(referenced) => referenced,
                // Dangling references are legal and read as null
                Err(_) => return Ok(Object::Null),
            };
            if is_page_object(referenced) {
                return Ok(Object::Null);
            }

            let new_id = output.new_object_id();
            cache.insert(*id, new_id);
            let copied = copy_object_deep(output, source, referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => Ok(Object::Stream(Stream {
            dict: copy_dictionary(output, source, &stream.dict, cache)?,
            content: stream.content.clone(),
            allows_compression: stream.allows_compression,
            start_position: None,
        })),
        // Primitive types: just clone
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}

fn is_page_object(obj: &Object) -> bool {
    matches!(obj.type_name(), Ok(b"Page") | Ok(b"Pages"))
}
