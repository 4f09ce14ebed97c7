/*!
 * Standard-14 font metrics and text encoding.
 *
 * Body text uses the Helvetica family with WinAnsiEncoding. Greek letters
 * and math operators outside that encoding are drawn with the Symbol font.
 * Anything else is replaced by `?`. Widths are in thousandths of an em.
 */

use encoding_rs::WINDOWS_1252;

/// Width of a glyph missing from the tables
const FALLBACK_WIDTH: u16 = 556;

/// Helvetica widths for codes 32..=126
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold widths for codes 32..=126
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Characters drawn with the Symbol font: (char, code, width)
const SYMBOL_GLYPHS: [(char, u8, u16); 25] = [
    ('α', 0x61, 631),
    ('β', 0x62, 549),
    ('γ', 0x67, 411),
    ('δ', 0x64, 494),
    ('ε', 0x65, 439),
    ('θ', 0x71, 521),
    ('λ', 0x6C, 549),
    ('μ', 0x6D, 576),
    ('π', 0x70, 549),
    ('σ', 0x73, 603),
    ('φ', 0x66, 521),
    ('ω', 0x77, 686),
    ('Δ', 0x44, 612),
    ('Σ', 0x53, 592),
    ('Ω', 0x57, 768),
    ('√', 0xD6, 549),
    ('∞', 0xA5, 713),
    ('≤', 0xA3, 549),
    ('≥', 0xB3, 549),
    ('≠', 0xB9, 549),
    ('≈', 0xBB, 549),
    ('∑', 0xE5, 713),
    ('∫', 0xF2, 274),
    ('→', 0xAE, 987),
    ('∂', 0xB6, 494),
];

/// One of the five fonts registered on every rendered page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
    BoldItalic,
    Symbol,
}

impl FontFace {
    pub const ALL: [FontFace; 5] = [
        FontFace::Regular,
        FontFace::Bold,
        FontFace::Italic,
        FontFace::BoldItalic,
        FontFace::Symbol,
    ];

    /// Latin face for a run style
    pub fn for_style(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => FontFace::Regular,
            (true, false) => FontFace::Bold,
            (false, true) => FontFace::Italic,
            (true, true) => FontFace::BoldItalic,
        }
    }

    /// Name of the font in the page resource dictionary
    pub fn resource_name(&self) -> &'static str {
        match self {
            FontFace::Regular => "F1",
            FontFace::Bold => "F2",
            FontFace::Italic => "F3",
            FontFace::BoldItalic => "F4",
            FontFace::Symbol => "F5",
        }
    }

    /// PostScript name of the standard font
    pub fn base_font(&self) -> &'static str {
        match self {
            FontFace::Regular => "Helvetica",
            FontFace::Bold => "Helvetica-Bold",
            FontFace::Italic => "Helvetica-Oblique",
            FontFace::BoldItalic => "Helvetica-BoldOblique",
            FontFace::Symbol => "Symbol",
        }
    }

    /// Symbol is a symbolic font and carries its own built-in encoding
    pub fn uses_win_ansi(&self) -> bool {
        !matches!(self, FontFace::Symbol)
    }
}

/// A character resolved to a font code and width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub symbol: bool,
    pub code: u8,
    pub width: u16,
}

fn win_ansi_code(c: char) -> Option<u8> {
    if c.is_control() {
        return None;
    }
    let mut buffer = [0u8; 4];
    let (bytes, _, had_errors) = WINDOWS_1252.encode(c.encode_utf8(&mut buffer));
    match (had_errors, bytes.as_ref()) {
        (false, [code]) => Some(*code),
        _ => None,
    }
}

fn ascii_width(code: u8, bold: bool) -> u16 {
    let table = if bold { &HELVETICA_BOLD_WIDTHS } else { &HELVETICA_WIDTHS };
    table[(code - 32) as usize]
}

fn base_letter(c: char) -> Option<char> {
    let base = match c {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' | 'Ÿ' => 'Y',
        'Š' => 'S',
        'Ž' => 'Z',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'š' => 's',
        'ž' => 'z',
        _ => return None,
    };
    Some(base)
}

fn latin_width(c: char, code: u8, bold: bool) -> u16 {
    if (32..=126).contains(&code) {
        return ascii_width(code, bold);
    }
    if let Some(base) = base_letter(c) {
        return ascii_width(base as u8, bold);
    }
    match (c, bold) {
        ('•', _) => 350,
        ('–', _) => 556,
        ('—', _) | ('…', _) | ('‰', _) => 1000,
        ('‘' | '’' | '‚', false) => 222,
        ('‘' | '’' | '‚', true) => 278,
        ('“' | '”' | '„', false) => 333,
        ('“' | '”' | '„', true) => 500,
        ('×' | '÷' | '±' | '¬', _) => 584,
        ('°', _) => 400,
        ('©' | '®', _) => 737,
        ('\u{a0}', _) => 278,
        ('ß', _) => 611,
        ('Æ', _) => 1000,
        ('æ', _) => 889,
        ('€', _) => 556,
        _ => FALLBACK_WIDTH,
    }
}

/// Resolve a character for drawing. Unmappable characters become `?`.
pub fn glyph(c: char, bold: bool) -> Glyph {
    if let Some(code) = win_ansi_code(c) {
        return Glyph {
            symbol: false,
            code,
            width: latin_width(c, code, bold),
        };
    }

    if let Some((_, code, width)) = SYMBOL_GLYPHS.iter().find(|(symbol, _, _)| *symbol == c) {
        return Glyph {
            symbol: true,
            code: *code,
            width: *width,
        };
    }

    Glyph {
        symbol: false,
        code: b'?',
        width: ascii_width(b'?', bold),
    }
}

/// Width in points of `text` set at `size`
pub fn text_width(text: &str, bold: bool, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| glyph(c, bold).width as u32).sum();
    units as f32 * size / 1000.0
}

/// Bytes of a run that share one font
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSegment {
    pub face: FontFace,
    pub bytes: Vec<u8>,
}

/// Encode a styled run into font segments ready for a `Tj` operator
pub fn encode_run(text: &str, bold: bool, italic: bool) -> Vec<EncodedSegment> {
    let latin = FontFace::for_style(bold, italic);
    let mut segments: Vec<EncodedSegment> = Vec::new();

    for c in text.chars() {
        let g = glyph(c, bold);
        let face = if g.symbol { FontFace::Symbol } else { latin };
        match segments.last_mut() {
            Some(last) if last.face == face => last.bytes.push(g.code),
            _ => segments.push(EncodedSegment {
                face,
                bytes: vec![g.code],
            }),
        }
    }

    segments
}
