//! Standard Type1 fonts: dictionaries, WinAnsi encoding and metrics

use crate::types::{AssembleError, Result};
use lopdf::{Dictionary, Object};

/// Standard 14 fonts the codec can reference without embedding a font program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    HelveticaBold,
}

/// Helvetica-Bold advance widths for codes 32..=126, in 1/1000 em
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 48-63
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 80-95
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 96-111
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 112-126
];

/// Width used for codes outside the ASCII table
const HELVETICA_BOLD_FALLBACK_WIDTH: u16 = 556;

const HELVETICA_BOLD_ASCENDER: f32 = 718.0;
const HELVETICA_BOLD_DESCENDER: f32 = -207.0;

impl StandardFont {
    pub fn base_font(self) -> &'static str {
        match self {
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Font dictionary using WinAnsiEncoding
    pub fn dictionary(self) -> Dictionary {
        Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(self.base_font().as_bytes().to_vec())),
            ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
        ])
    }

    fn code_width(self, code: u8) -> u16 {
        match self {
            StandardFont::HelveticaBold => match code {
                32..=126 => HELVETICA_BOLD_WIDTHS[(code - 32) as usize],
                0xA0 => 278,
                _ => HELVETICA_BOLD_FALLBACK_WIDTH,
            },
        }
    }

    /// Advance width of `text` at `size` points
    pub fn width_of_text_at_size(self, text: &str, size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| match win_ansi_code(c) {
                Some(code) => self.code_width(code) as u32,
                None => HELVETICA_BOLD_FALLBACK_WIDTH as u32,
            })
            .sum();
        units as f32 * size / 1000.0
    }

    /// Distance from descender to ascender at `size` points
    pub fn height_at_size(self, size: f32) -> f32 {
        match self {
            StandardFont::HelveticaBold => {
                (HELVETICA_BOLD_ASCENDER - HELVETICA_BOLD_DESCENDER) * size / 1000.0
            }
        }
    }
}

/// Encode text for a WinAnsi simple font
pub fn encode_win_ansi(text: &str) -> Result<Vec<u8>> {
    text.chars()
        .map(|c| win_ansi_code(c).ok_or(AssembleError::UnencodableText(c)))
        .collect()
}

fn win_ansi_code(c: char) -> Option<u8> {
    let code = match c {
        ' '..='~' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_of_known_text() {
        let font = StandardFont::HelveticaBold;
        // H(722) + i(278) at 1000pt = 1000 units
        assert_eq!(font.width_of_text_at_size("Hi", 1000.0), 1000.0);
        assert_eq!(font.width_of_text_at_size("", 72.0), 0.0);
    }

    #[test]
    fn test_width_scales_with_size() {
        let font = StandardFont::HelveticaBold;
        let small = font.width_of_text_at_size("CONFIDENTIEL", 10.0);
        let large = font.width_of_text_at_size("CONFIDENTIEL", 20.0);
        assert!((large - 2.0 * small).abs() < 1e-3);
    }

    #[test]
    fn test_height_at_size() {
        let font = StandardFont::HelveticaBold;
        assert!((font.height_at_size(100.0) - 92.5).abs() < 1e-4);
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(encode_win_ansi("Aé€").unwrap(), vec![b'A', 0xE9, 0x80]);
        assert!(matches!(
            encode_win_ansi("A日"),
            Err(AssembleError::UnencodableText('日'))
        ));
    }
}
