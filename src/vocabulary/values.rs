//! Value conversions between XAML attribute strings and RTF quantities.
//!
//! Each function pair here converts one XAML value syntax into the RTF-side
//! quantity (twips, half-points, color, table code) and back. Formatting
//! always produces the canonical XAML spelling, so values that went through
//! RTF once come back byte-identical on every later trip.

use crate::common::unit::{format_px, half_points_to_px, parse_px, px_to_half_points, px_to_twips, twips_to_px};
use crate::rtf::{Alignment, Color, Direction};
use phf::phf_map;

/// Vertical position of text relative to the baseline.
///
/// Shared by `BaselineAlignment` (`\up`/`\dn`) and `Typography.Variants`
/// (`\super`/`\sub`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Baseline {
    /// Raised text
    Superscript,
    /// Lowered text
    Subscript,
    /// Normal position
    Baseline,
}

/// `BaselineAlignment` values with an RTF counterpart.
pub fn parse_baseline_alignment(value: &str) -> Option<Baseline> {
    match value.trim() {
        "Superscript" => Some(Baseline::Superscript),
        "Subscript" => Some(Baseline::Subscript),
        "Baseline" => Some(Baseline::Baseline),
        _ => None,
    }
}

pub fn format_baseline_alignment(value: Baseline) -> &'static str {
    match value {
        Baseline::Superscript => "Superscript",
        Baseline::Subscript => "Subscript",
        Baseline::Baseline => "Baseline",
    }
}

/// `Typography.Variants` values with an RTF counterpart.
pub fn parse_font_variants(value: &str) -> Option<Baseline> {
    match value.trim() {
        "Superscript" => Some(Baseline::Superscript),
        "Subscript" => Some(Baseline::Subscript),
        "Normal" => Some(Baseline::Baseline),
        _ => None,
    }
}

pub fn format_font_variants(value: Baseline) -> &'static str {
    match value {
        Baseline::Superscript => "Superscript",
        Baseline::Subscript => "Subscript",
        Baseline::Baseline => "Normal",
    }
}

/// `FontWeight`: true for bold weights.
pub fn parse_font_weight(value: &str) -> Option<bool> {
    match value.trim() {
        "Bold" | "SemiBold" | "DemiBold" | "ExtraBold" | "UltraBold" | "Black" | "Heavy"
        | "ExtraBlack" | "UltraBlack" => Some(true),
        "Normal" | "Regular" | "Medium" | "Light" | "Thin" | "ExtraLight" | "UltraLight" => {
            Some(false)
        },
        other => other.parse::<u16>().ok().map(|w| w >= 600),
    }
}

pub fn format_font_weight(bold: bool) -> &'static str {
    if bold { "Bold" } else { "Normal" }
}

/// `FontStyle`: true for slanted styles.
pub fn parse_font_style(value: &str) -> Option<bool> {
    match value.trim() {
        "Italic" | "Oblique" => Some(true),
        "Normal" => Some(false),
        _ => None,
    }
}

pub fn format_font_style(italic: bool) -> &'static str {
    if italic { "Italic" } else { "Normal" }
}

/// `FontSize` in pixels to RTF half-points.
pub fn parse_font_size(value: &str) -> Option<i32> {
    parse_px(value)
        .filter(|px| *px > 0.0)
        .map(px_to_half_points)
        .filter(|hp| *hp > 0)
}

/// Half-points to a `FontSize` in pixels. Sizes `FontSize` cannot hold
/// yield `None`.
pub fn format_font_size(half_points: i32) -> Option<String> {
    (half_points > 0).then(|| format_px(half_points_to_px(half_points)))
}

/// `FontStretch` names and their `\charscalex` percentages.
const FONT_STRETCHES: &[(&str, i32)] = &[
    ("UltraCondensed", 50),
    ("ExtraCondensed", 62),
    ("Condensed", 75),
    ("SemiCondensed", 87),
    ("Normal", 100),
    ("SemiExpanded", 112),
    ("Expanded", 125),
    ("ExtraExpanded", 150),
    ("UltraExpanded", 200),
];

pub fn parse_font_stretch(value: &str) -> Option<i32> {
    let value = value.trim();
    if value == "Medium" {
        return Some(100);
    }
    FONT_STRETCHES
        .iter()
        .find(|(name, _)| *name == value)
        .map(|(_, percent)| *percent)
}

/// Name of the stretch closest to a `\charscalex` percentage.
pub fn format_font_stretch(percent: i32) -> &'static str {
    FONT_STRETCHES
        .iter()
        .min_by_key(|(_, p)| (p - percent).abs())
        .map(|(name, _)| *name)
        .unwrap_or("Normal")
}

/// Named brushes accepted in XAML, keyed by lower-case name.
static NAMED_COLORS: phf::Map<&'static str, (u8, u8, u8)> = phf_map! {
    "black" => (0, 0, 0),
    "white" => (255, 255, 255),
    "red" => (255, 0, 0),
    "green" => (0, 128, 0),
    "lime" => (0, 255, 0),
    "blue" => (0, 0, 255),
    "yellow" => (255, 255, 0),
    "cyan" => (0, 255, 255),
    "aqua" => (0, 255, 255),
    "magenta" => (255, 0, 255),
    "fuchsia" => (255, 0, 255),
    "gray" => (128, 128, 128),
    "grey" => (128, 128, 128),
    "darkgray" => (169, 169, 169),
    "lightgray" => (211, 211, 211),
    "silver" => (192, 192, 192),
    "maroon" => (128, 0, 0),
    "navy" => (0, 0, 128),
    "olive" => (128, 128, 0),
    "purple" => (128, 0, 128),
    "teal" => (0, 128, 128),
    "orange" => (255, 165, 0),
    "brown" => (165, 42, 42),
    "pink" => (255, 192, 203),
    "darkred" => (139, 0, 0),
    "darkblue" => (0, 0, 139),
    "darkgreen" => (0, 100, 0),
};

/// Parse a solid color brush: `#RGB`, `#RRGGBB`, `#AARRGGBB` or a name.
///
/// Fully transparent brushes have no RTF color and yield `None`.
pub fn parse_brush(value: &str) -> Option<Color> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        let digits = u32::from_str_radix(hex, 16).ok()?;
        let (alpha, rgb) = match hex.len() {
            3 => {
                let expand = |n: u32| ((n & 0xF) * 0x11) as u8;
                let rgb = (expand(digits >> 8), expand(digits >> 4), expand(digits));
                (255, rgb)
            },
            6 => (255, split_rgb(digits)),
            8 => ((digits >> 24) as u8, split_rgb(digits)),
            _ => return None,
        };
        if alpha == 0 {
            return None;
        }
        return Some(Color::new(rgb.0, rgb.1, rgb.2));
    }
    NAMED_COLORS
        .get(value.to_ascii_lowercase().as_str())
        .map(|&(r, g, b)| Color::new(r, g, b))
}

#[inline]
fn split_rgb(digits: u32) -> (u8, u8, u8) {
    ((digits >> 16) as u8, (digits >> 8) as u8, digits as u8)
}

/// Format a color as an opaque `#AARRGGBB` brush.
pub fn format_brush(color: Color) -> String {
    format!("#FF{:02X}{:02X}{:02X}", color.red, color.green, color.blue)
}

pub fn parse_flow_direction(value: &str) -> Option<Direction> {
    match value.trim() {
        "LeftToRight" => Some(Direction::LeftToRight),
        "RightToLeft" => Some(Direction::RightToLeft),
        _ => None,
    }
}

pub fn format_flow_direction(direction: Direction) -> &'static str {
    match direction {
        Direction::LeftToRight => "LeftToRight",
        Direction::RightToLeft => "RightToLeft",
    }
}

pub fn parse_text_alignment(value: &str) -> Option<Alignment> {
    match value.trim() {
        "Left" => Some(Alignment::Left),
        "Right" => Some(Alignment::Right),
        "Center" => Some(Alignment::Center),
        "Justify" => Some(Alignment::Justify),
        _ => None,
    }
}

pub fn format_text_alignment(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "Left",
        Alignment::Right => "Right",
        Alignment::Center => "Center",
        Alignment::Justify => "Justify",
    }
}

/// The subset of `TextDecorations` RTF can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextDecorations {
    pub underline: bool,
    pub strikethrough: bool,
}

/// Parse a decoration list such as `Underline, Strikethrough`.
///
/// `Overline` and `Baseline` are valid but have no RTF equivalent and are
/// ignored; any other name makes the value invalid.
pub fn parse_text_decorations(value: &str) -> Option<TextDecorations> {
    let mut decorations = TextDecorations::default();
    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part {
            "Underline" => decorations.underline = true,
            "Strikethrough" => decorations.strikethrough = true,
            "None" | "Overline" | "Baseline" => {},
            _ => return None,
        }
    }
    Some(decorations)
}

pub fn format_text_decorations(decorations: TextDecorations) -> String {
    match (decorations.underline, decorations.strikethrough) {
        (false, false) => "None".to_string(),
        (true, false) => "Underline".to_string(),
        (false, true) => "Strikethrough".to_string(),
        (true, true) => "Underline, Strikethrough".to_string(),
    }
}

/// Parse a `Thickness` (`uniform`, `h,v` or `l,t,r,b` in px) into twips,
/// ordered left, top, right, bottom.
pub fn parse_thickness(value: &str) -> Option<[i32; 4]> {
    let parts = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .map(|p| parse_px(p).map(px_to_twips))
        .collect::<Option<Vec<_>>>()?;
    match parts.as_slice() {
        &[all] => Some([all; 4]),
        &[h, v] => Some([h, v, h, v]),
        &[l, t, r, b] => Some([l, t, r, b]),
        _ => None,
    }
}

pub fn format_thickness(edges: [i32; 4]) -> String {
    if edges.iter().all(|e| *e == edges[0]) {
        return format_px(twips_to_px(edges[0]));
    }
    edges
        .iter()
        .map(|e| format_px(twips_to_px(*e)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a length in px into twips. `Auto` and non-numbers yield `None`.
pub fn parse_length(value: &str) -> Option<i32> {
    parse_px(value).map(px_to_twips)
}

/// Parse a non-negative length in px into twips.
pub fn parse_extent(value: &str) -> Option<i32> {
    parse_px(value).filter(|px| *px >= 0.0).map(px_to_twips)
}

pub fn format_length(twips: i32) -> String {
    format_px(twips_to_px(twips))
}

/// Parse a positive cell span.
pub fn parse_span(value: &str) -> Option<u16> {
    value.trim().parse::<u16>().ok().filter(|n| *n >= 1)
}

/// Culture names and their Windows LCIDs.
const CULTURES: &[(&str, u16)] = &[
    ("en-US", 1033),
    ("en-GB", 2057),
    ("fr-FR", 1036),
    ("de-DE", 1031),
    ("es-ES", 3082),
    ("it-IT", 1040),
    ("ja-JP", 1041),
    ("zh-CN", 2052),
    ("zh-TW", 1028),
    ("ko-KR", 1042),
    ("ru-RU", 1049),
    ("pt-BR", 1046),
    ("nl-NL", 1043),
    ("ar-SA", 1025),
    ("he-IL", 1037),
    ("pl-PL", 1045),
    ("sv-SE", 1053),
];

/// LCID for a culture name (case-insensitive).
pub fn parse_language(value: &str) -> Option<u16> {
    let value = value.trim();
    CULTURES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value))
        .map(|(_, lcid)| *lcid)
}

/// Culture name for an LCID.
pub fn format_language(lcid: u16) -> Option<&'static str> {
    CULTURES
        .iter()
        .find(|(_, id)| *id == lcid)
        .map(|(name, _)| *name)
}

/// List marker styles (`TextMarkerStyle`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerStyle {
    None,
    #[default]
    Disc,
    Circle,
    Square,
    Box,
    LowerRoman,
    UpperRoman,
    LowerLatin,
    UpperLatin,
    Decimal,
}

impl MarkerStyle {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value.trim() {
            "None" => MarkerStyle::None,
            "Disc" => MarkerStyle::Disc,
            "Circle" => MarkerStyle::Circle,
            "Square" => MarkerStyle::Square,
            "Box" => MarkerStyle::Box,
            "LowerRoman" => MarkerStyle::LowerRoman,
            "UpperRoman" => MarkerStyle::UpperRoman,
            "LowerLatin" => MarkerStyle::LowerLatin,
            "UpperLatin" => MarkerStyle::UpperLatin,
            "Decimal" => MarkerStyle::Decimal,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            MarkerStyle::None => "None",
            MarkerStyle::Disc => "Disc",
            MarkerStyle::Circle => "Circle",
            MarkerStyle::Square => "Square",
            MarkerStyle::Box => "Box",
            MarkerStyle::LowerRoman => "LowerRoman",
            MarkerStyle::UpperRoman => "UpperRoman",
            MarkerStyle::LowerLatin => "LowerLatin",
            MarkerStyle::UpperLatin => "UpperLatin",
            MarkerStyle::Decimal => "Decimal",
        }
    }

    /// `\levelnfc` number format code.
    pub fn number_format(self) -> i32 {
        match self {
            MarkerStyle::Decimal => 0,
            MarkerStyle::UpperRoman => 1,
            MarkerStyle::LowerRoman => 2,
            MarkerStyle::UpperLatin => 3,
            MarkerStyle::LowerLatin => 4,
            MarkerStyle::Disc | MarkerStyle::Circle | MarkerStyle::Square | MarkerStyle::Box => 23,
            MarkerStyle::None => 255,
        }
    }

    /// Bullet character for bullet styles.
    fn bullet(self) -> Option<char> {
        match self {
            MarkerStyle::Disc => Some('\u{2022}'),
            MarkerStyle::Circle => Some('o'),
            MarkerStyle::Square => Some('\u{25AA}'),
            MarkerStyle::Box => Some('\u{25A1}'),
            _ => None,
        }
    }

    /// `\leveltext` content for list level `level` (0-based), without the
    /// length prefix. Numbered styles reference the level number with the
    /// placeholder character `level`.
    pub fn level_text(self, level: u8) -> String {
        match self {
            MarkerStyle::None => String::new(),
            style => match style.bullet() {
                Some(bullet) => bullet.to_string(),
                None => format!("{}.", char::from(level)),
            },
        }
    }

    /// Marker style of a list level read from `\listtable`.
    pub fn from_level(number_format: i32, text: &str) -> Self {
        match number_format {
            0 => MarkerStyle::Decimal,
            1 => MarkerStyle::UpperRoman,
            2 => MarkerStyle::LowerRoman,
            3 => MarkerStyle::UpperLatin,
            4 => MarkerStyle::LowerLatin,
            255 => MarkerStyle::None,
            _ => match text.chars().find(|c| !c.is_control()) {
                Some('o') => MarkerStyle::Circle,
                // Wingdings square, or the Unicode small square
                Some('\u{25AA}' | '\u{25A0}' | '\u{A7}' | '\u{F0A7}') => MarkerStyle::Square,
                Some('\u{25A1}' | '\u{F071}') => MarkerStyle::Box,
                _ => MarkerStyle::Disc,
            },
        }
    }

    /// Text shown before the `n`th item (1-based), as written to `\listtext`.
    pub fn marker_text(self, n: i32) -> String {
        let n = n.max(1);
        match self {
            MarkerStyle::None => String::new(),
            MarkerStyle::Decimal => format!("{}.", n),
            MarkerStyle::UpperRoman => format!("{}.", to_roman(n)),
            MarkerStyle::LowerRoman => format!("{}.", to_roman(n).to_ascii_lowercase()),
            MarkerStyle::UpperLatin => format!("{}.", to_latin(n)),
            MarkerStyle::LowerLatin => format!("{}.", to_latin(n).to_ascii_lowercase()),
            bullet => bullet.bullet().map(String::from).unwrap_or_default(),
        }
    }
}

fn to_roman(mut n: i32) -> String {
    const NUMERALS: &[(i32, &str)] = &[
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for &(value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

fn to_latin(n: i32) -> String {
    // A..Z, then AA..ZZ as Word numbers them
    let letter = char::from(b'A' + ((n - 1) % 26) as u8);
    std::iter::repeat_n(letter, ((n - 1) / 26 + 1) as usize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_weight_and_style() {
        assert_eq!(parse_font_weight("Bold"), Some(true));
        assert_eq!(parse_font_weight("Normal"), Some(false));
        assert_eq!(parse_font_weight("700"), Some(true));
        assert_eq!(parse_font_weight("Chunky"), None);
        assert_eq!(parse_font_style("Oblique"), Some(true));
        assert_eq!(format_font_style(false), "Normal");
    }

    #[test]
    fn test_font_size() {
        assert_eq!(parse_font_size("16"), Some(24));
        assert_eq!(parse_font_size("12pt"), Some(24));
        assert_eq!(parse_font_size("0"), None);
        assert_eq!(parse_font_size("-4"), None);
        assert_eq!(format_font_size(24).as_deref(), Some("16"));
        assert_eq!(format_font_size(21).as_deref(), Some("14"));
        assert_eq!(format_font_size(0), None);
        assert_eq!(format_font_size(-4), None);
    }

    #[test]
    fn test_font_stretch() {
        assert_eq!(parse_font_stretch("Condensed"), Some(75));
        assert_eq!(parse_font_stretch("Medium"), Some(100));
        assert_eq!(format_font_stretch(100), "Normal");
        assert_eq!(format_font_stretch(80), "Condensed");
        assert_eq!(format_font_stretch(400), "UltraExpanded");
    }

    #[test]
    fn test_brushes() {
        assert_eq!(parse_brush("#FF0000"), Some(Color::new(255, 0, 0)));
        assert_eq!(parse_brush("#80102030"), Some(Color::new(0x10, 0x20, 0x30)));
        assert_eq!(parse_brush("#0F0"), Some(Color::new(0, 255, 0)));
        assert_eq!(parse_brush("Navy"), Some(Color::new(0, 0, 128)));
        assert_eq!(parse_brush("#00FFFFFF"), None);
        assert_eq!(parse_brush("#12345"), None);
        assert_eq!(parse_brush("Transparentish"), None);
        assert_eq!(format_brush(Color::new(0x12, 0xAB, 0)), "#FF12AB00");
        assert_eq!(parse_brush(&format_brush(Color::new(1, 2, 3))), Some(Color::new(1, 2, 3)));
    }

    #[test]
    fn test_decorations() {
        let both = parse_text_decorations("Underline, Strikethrough").unwrap();
        assert!(both.underline && both.strikethrough);
        assert_eq!(format_text_decorations(both), "Underline, Strikethrough");
        assert_eq!(parse_text_decorations("Overline"), Some(TextDecorations::default()));
        assert_eq!(parse_text_decorations("Sparkle"), None);
        assert_eq!(format_text_decorations(TextDecorations::default()), "None");
    }

    #[test]
    fn test_thickness() {
        assert_eq!(parse_thickness("1"), Some([15; 4]));
        assert_eq!(parse_thickness("1,2"), Some([15, 30, 15, 30]));
        assert_eq!(parse_thickness("1 2 3 4"), Some([15, 30, 45, 60]));
        assert_eq!(parse_thickness("1,2,3"), None);
        assert_eq!(format_thickness([15; 4]), "1");
        assert_eq!(format_thickness([15, 0, 15, 0]), "1,0,1,0");
    }

    #[test]
    fn test_language() {
        assert_eq!(parse_language("en-us"), Some(1033));
        assert_eq!(format_language(1041), Some("ja-JP"));
        assert_eq!(format_language(9999), None);
        assert_eq!(parse_language("tlh"), None);
    }

    #[test]
    fn test_marker_styles() {
        for style in [
            MarkerStyle::None,
            MarkerStyle::Disc,
            MarkerStyle::Circle,
            MarkerStyle::Square,
            MarkerStyle::Box,
            MarkerStyle::LowerRoman,
            MarkerStyle::UpperRoman,
            MarkerStyle::LowerLatin,
            MarkerStyle::UpperLatin,
            MarkerStyle::Decimal,
        ] {
            assert_eq!(MarkerStyle::parse(style.name()), Some(style));
            let text = style.level_text(0);
            assert_eq!(MarkerStyle::from_level(style.number_format(), &text), style);
        }
        assert_eq!(MarkerStyle::Decimal.level_text(2), "\u{2}.");
    }

    #[test]
    fn test_marker_text() {
        assert_eq!(MarkerStyle::Decimal.marker_text(3), "3.");
        assert_eq!(MarkerStyle::UpperRoman.marker_text(14), "XIV.");
        assert_eq!(MarkerStyle::LowerLatin.marker_text(28), "bb.");
        assert_eq!(MarkerStyle::Disc.marker_text(1), "\u{2022}");
        assert_eq!(MarkerStyle::None.marker_text(1), "");
    }

    #[test]
    fn test_lengths_and_spans() {
        assert_eq!(parse_length("-12"), Some(-180));
        assert_eq!(parse_extent("-12"), None);
        assert_eq!(parse_length("Auto"), None);
        assert_eq!(format_length(180), "12");
        assert_eq!(parse_span("2"), Some(2));
        assert_eq!(parse_span("0"), None);
    }
}
