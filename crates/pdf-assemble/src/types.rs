use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("Unsupported file type: {name}")]
    UnsupportedFileType { name: String },
    #[error("Failed to decode {name}: {reason}")]
    Decode { name: String, reason: String },
    #[error("No pages to export")]
    EmptyDocument,
    #[error("The generated document is empty")]
    EmptyOutput,
    #[error("Unknown source file {0}")]
    UnknownSource(FileId),
    #[error("Character {0:?} cannot be drawn with a standard font")]
    UnencodableText(char),
    #[error("Page index {index} out of range (source has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("An export is already in progress")]
    Busy,
}

impl AssembleError {
    pub(crate) fn decode(name: &str, reason: impl fmt::Display) -> Self {
        AssembleError::Decode {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AssembleError>;

/// Stable identity of a page in the ledger. Survives reorders and undo/redo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u64);

/// Identity of an imported source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u64);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page#{}", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

/// Rotation applied to a page, clockwise in quarter turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    pub fn degrees(self) -> i64 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Clockwise180 => 180,
            Rotation::Clockwise270 => 270,
        }
    }

    /// Normalize any multiple of 90 into a rotation. Other values snap down
    /// to the previous quarter turn.
    pub fn from_degrees(degrees: i64) -> Self {
        match degrees.rem_euclid(360) / 90 {
            0 => Rotation::None,
            1 => Rotation::Clockwise90,
            2 => Rotation::Clockwise180,
            _ => Rotation::Clockwise270,
        }
    }

    /// One more quarter turn clockwise
    pub fn turned(self) -> Self {
        Rotation::from_degrees(self.degrees() + 90)
    }

    /// Add this rotation on top of an existing `/Rotate` value
    pub fn compose(self, existing_degrees: i64) -> i64 {
        (existing_degrees + self.degrees()).rem_euclid(360)
    }

    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Rotation::Clockwise90 | Rotation::Clockwise270)
    }
}

/// Image container formats we know how to embed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    /// Any other raster format the `image` crate can decode
    Other(image::ImageFormat),
}

impl ImageKind {
    pub fn from_format(format: image::ImageFormat) -> Self {
        match format {
            image::ImageFormat::Png => ImageKind::Png,
            image::ImageFormat::Jpeg => ImageKind::Jpeg,
            other => ImageKind::Other(other),
        }
    }

    pub fn format(self) -> image::ImageFormat {
        match self {
            ImageKind::Png => image::ImageFormat::Png,
            ImageKind::Jpeg => image::ImageFormat::Jpeg,
            ImageKind::Other(format) => format,
        }
    }
}

/// What an uploaded file contains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Image(ImageKind),
}

impl SourceKind {
    /// Sniff the content first, then fall back to the file extension.
    /// Image signatures sit at offset 0, so they are checked before the
    /// looser PDF header search.
    pub fn detect(name: &str, bytes: &[u8]) -> Result<Self> {
        if let Ok(format) = image::guess_format(bytes) {
            return Ok(SourceKind::Image(ImageKind::from_format(format)));
        }
        if is_pdf_header(bytes) {
            return Ok(SourceKind::Pdf);
        }

        let extension = std::path::Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("pdf") => Ok(SourceKind::Pdf),
            Some(ext) => image::ImageFormat::from_extension(ext)
                .map(|format| SourceKind::Image(ImageKind::from_format(format)))
                .ok_or_else(|| AssembleError::UnsupportedFileType {
                    name: name.to_string(),
                }),
            None => Err(AssembleError::UnsupportedFileType {
                name: name.to_string(),
            }),
        }
    }
}

/// PDF files may carry junk before the header; readers accept it within the
/// first kilobyte.
fn is_pdf_header(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(1024)];
    window.windows(5).any(|w| w == b"%PDF-")
}

/// One uploaded file. The payload is kept for the whole session because
/// export re-reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub id: FileId,
    pub name: String,
    pub kind: SourceKind,
    pub data: Arc<[u8]>,
}

/// Preview raster produced once at import time
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Thumbnail {
    /// JPEG-encoded preview
    Jpeg {
        width: u32,
        height: u32,
        data: Arc<[u8]>,
    },
    /// No raster was produced for this page
    #[default]
    Unrendered,
}

/// A page destined for the output document
#[derive(Debug, Clone, PartialEq)]
pub struct PageDescriptor {
    pub id: PageId,
    pub source_file: FileId,
    /// 0-based page index in the source; always 0 for images
    pub source_page_index: usize,
    pub rotation: Rotation,
    pub thumbnail: Thumbnail,
    /// Intrinsic size at rotation 0
    pub width: f32,
    pub height: f32,
}

impl PageDescriptor {
    /// Width and height as displayed, with the user rotation applied
    pub fn displayed_size(&self) -> (f32, f32) {
        if self.rotation.is_quarter_turn() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }
}

/// Result of a dispatcher command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// State changed (and history was recorded where applicable)
    Applied,
    /// Nothing to do; state is untouched
    NoOp,
}

impl Outcome {
    pub fn is_applied(self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// A page the assembly pipeline had to leave out
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPage {
    pub page_id: PageId,
    pub reason: String,
}
