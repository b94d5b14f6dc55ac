//! Diagonal text watermark
//!
//! Text is sized relative to the page width and anchored so that its rotated
//! box, not its unrotated corner, sits on the page centre.

use crate::codec::{OutputDocument, StandardFont, TextRun, encode_win_ansi};
use crate::constants::{WATERMARK_ANGLE_DEG, WATERMARK_FONT_RATIO, WATERMARK_VERTICAL_CENTER_RATIO};
use crate::options::WatermarkOptions;
use crate::types::*;

/// Where and how big to draw the watermark on one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatermarkPlacement {
    pub font_size: f32,
    /// Baseline origin, before rotation
    pub x: f32,
    pub y: f32,
    pub angle_degrees: f32,
}

/// Font size that scales the mark with the page
pub fn watermark_font_size(page_width: f32) -> f32 {
    page_width * WATERMARK_FONT_RATIO
}

/// Rotate a vector counter-clockwise
pub fn rotate_vector(x: f32, y: f32, angle_degrees: f32) -> (f32, f32) {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    (x * cos - y * sin, x * sin + y * cos)
}

/// Baseline origin that centres text of the given extent on `center` once
/// drawn at `angle_degrees`.
pub fn centered_anchor(
    center: (f32, f32),
    text_width: f32,
    text_height: f32,
    angle_degrees: f32,
) -> (f32, f32) {
    let (dx, dy) = rotate_vector(
        text_width / 2.0,
        text_height * WATERMARK_VERTICAL_CENTER_RATIO,
        angle_degrees,
    );
    (center.0 - dx, center.1 - dy)
}

/// Compute the placement of `text` on a page with the given MediaBox
pub fn place_watermark(
    text: &str,
    font: StandardFont,
    page_box: (f32, f32, f32, f32),
) -> WatermarkPlacement {
    let (x0, y0, width, height) = page_box;
    let font_size = watermark_font_size(width);
    let text_width = font.width_of_text_at_size(text, font_size);
    let text_height = font.height_at_size(font_size);

    let center = (x0 + width / 2.0, y0 + height / 2.0);
    let (x, y) = centered_anchor(center, text_width, text_height, WATERMARK_ANGLE_DEG);

    WatermarkPlacement {
        font_size,
        x,
        y,
        angle_degrees: WATERMARK_ANGLE_DEG,
    }
}

/// Stamp the watermark on every page of the output. Returns how many pages
/// were stamped; a page that cannot be stamped is logged and left as is.
/// Text the standard font cannot draw fails before any page is touched.
pub(crate) fn apply_watermark(output: &mut OutputDocument, options: &WatermarkOptions) -> Result<usize> {
    encode_win_ansi(&options.text)?;
    let color = options.color()?;
    let opacity = options.opacity.clamp(0.0, 1.0);
    let font = StandardFont::HelveticaBold;
    let font_ref = output.embed_font(font);

    let mut stamped = 0;
    for page in output.page_refs() {
        let page_box = output.page_box(page)?;
        let placement = place_watermark(&options.text, font, page_box);

        let run = TextRun {
            text: &options.text,
            x: placement.x,
            y: placement.y,
            size: placement.font_size,
            font: font_ref,
            color,
            opacity,
            rotation_degrees: placement.angle_degrees,
        };

        match output.draw_text(page, &run) {
            Ok(()) => stamped += 1,
            Err(e) => log::warn!("Failed to stamp watermark on page {:?}: {}", page, e),
        }
    }

    Ok(stamped)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn test_font_size_is_twelve_percent_of_width() {
        assert!((watermark_font_size(600.0) - 72.0).abs() < EPS);
        assert!((watermark_font_size(1000.0) - 120.0).abs() < EPS);
    }

    #[test]
    fn test_rotate_vector_quarter_turn() {
        let (x, y) = rotate_vector(1.0, 0.0, 90.0);
        assert!(x.abs() < EPS);
        assert!((y - 1.0).abs() < EPS);
    }

    #[test]
    fn test_anchor_centres_rotated_text() {
        let (x, y) = centered_anchor((300.0, 400.0), 200.0, 50.0, 45.0);
        let (dx, dy) = rotate_vector(100.0, 50.0 * WATERMARK_VERTICAL_CENTER_RATIO, 45.0);
        assert!((x + dx - 300.0).abs() < EPS);
        assert!((y + dy - 400.0).abs() < EPS);
    }

    #[test]
    fn test_place_watermark_on_offset_media_box() {
        let font = StandardFont::HelveticaBold;
        let placement = place_watermark("CONFIDENTIEL", font, (100.0, 50.0, 600.0, 800.0));
        assert!((placement.font_size - 72.0).abs() < EPS);

        let text_width = font.width_of_text_at_size("CONFIDENTIEL", 72.0);
        let text_height = font.height_at_size(72.0);
        let (dx, dy) = rotate_vector(
            text_width / 2.0,
            text_height * WATERMARK_VERTICAL_CENTER_RATIO,
            45.0,
        );
        assert!((placement.x + dx - 400.0).abs() < EPS);
        assert!((placement.y + dy - 450.0).abs() < EPS);
    }
}
