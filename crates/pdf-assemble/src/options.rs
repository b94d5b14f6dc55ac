use crate::constants::*;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Export configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExportOptions {
    /// Output file name without the `.pdf` suffix
    pub output_name: String,
    /// Diagonal text stamped on every output page
    pub watermark: Option<WatermarkOptions>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            watermark: None,
        }
    }
}

/// Watermark text, colour and opacity
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WatermarkOptions {
    pub text: String,
    /// `#RRGGBB`
    pub color_hex: String,
    /// 0.0 (invisible) to 1.0 (opaque)
    pub opacity: f32,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            text: DEFAULT_WATERMARK_TEXT.to_string(),
            color_hex: DEFAULT_WATERMARK_COLOR.to_string(),
            opacity: DEFAULT_WATERMARK_OPACITY,
        }
    }
}

impl WatermarkOptions {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn color(&self) -> Result<Rgb> {
        Rgb::from_hex(&self.color_hex)
    }

    /// Blank text disables the watermark
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl ExportOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| AssembleError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AssembleError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// File name to write the export to
    pub fn file_name(&self) -> String {
        let stem = self.output_name.trim();
        let stem = if stem.is_empty() {
            FALLBACK_OUTPUT_STEM
        } else {
            stem
        };
        format!("{}.pdf", stem)
    }

    /// The watermark to stamp, if one is configured with non-blank text
    pub fn active_watermark(&self) -> Option<&WatermarkOptions> {
        self.watermark.as_ref().filter(|wm| !wm.is_blank())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        let Some(watermark) = self.active_watermark() else {
            return Ok(());
        };

        if !watermark.opacity.is_finite() || !(0.0..=1.0).contains(&watermark.opacity) {
            return Err(AssembleError::Config(format!(
                "Watermark opacity must be between 0 and 1, got {}",
                watermark.opacity
            )));
        }

        watermark.color()?;
        Ok(())
    }
}

/// RGB colour with channels in 0..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    /// Parse `#RRGGBB` (the `#` is optional)
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AssembleError::Config(format!(
                "Invalid colour '{}', expected #RRGGBB",
                hex
            )));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|e| AssembleError::Config(format!("Invalid colour '{}': {}", hex, e)))
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}
