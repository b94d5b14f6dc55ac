//! Shared constants for page assembly
//!
//! This module centralizes magic numbers used by the materializer, the
//! document codec and the watermark geometry.

// =============================================================================
// Materialization
// =============================================================================

/// Scale at which PDF page viewports are measured (matches the preview renderer)
pub const PDF_RENDER_SCALE: f32 = 2.0;

/// Largest edge of an image thumbnail, in pixels
pub const THUMBNAIL_MAX_EDGE: u32 = 1024;

/// JPEG quality used for thumbnails
pub const THUMBNAIL_JPEG_QUALITY: u8 = 85;

// =============================================================================
// Default Page Dimensions
// =============================================================================

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

/// Default page dimensions as tuple (width, height)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

// =============================================================================
// Watermark
// =============================================================================

/// Watermark font size as a fraction of the page width.
/// The on-screen preview uses the same 12%-of-width rule.
pub const WATERMARK_FONT_RATIO: f32 = 0.12;

/// Angle of the watermark baseline, counter-clockwise from horizontal
pub const WATERMARK_ANGLE_DEG: f32 = 45.0;

/// Fraction of the text height from the baseline to its visual middle
pub const WATERMARK_VERTICAL_CENTER_RATIO: f32 = 0.35;

pub const DEFAULT_WATERMARK_TEXT: &str = "CONFIDENTIEL";

pub const DEFAULT_WATERMARK_COLOR: &str = "#FF3B30";

pub const DEFAULT_WATERMARK_OPACITY: f32 = 0.5;

// =============================================================================
// Output
// =============================================================================

pub const DEFAULT_OUTPUT_NAME: &str = "document-fusionne";

/// Used when the output name is blank
pub const FALLBACK_OUTPUT_STEM: &str = "document";

/// PDF version written by the codec
pub const OUTPUT_PDF_VERSION: &str = "1.7";
