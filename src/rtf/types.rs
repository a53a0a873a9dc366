//! RTF document type definitions shared by the reader and the writer.

use crate::common::encoding::{DEFAULT_CODE_PAGE, charset_to_codepage};

/// Font reference (index into font table).
pub type FontRef = u16;

/// Color reference (index into color table). Index 0 is the "auto" color.
pub type ColorRef = u16;

/// RTF color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    /// Red component (0-255)
    pub red: u8,
    /// Green component (0-255)
    pub green: u8,
    /// Blue component (0-255)
    pub blue: u8,
}

impl Color {
    /// Create a new color.
    #[inline]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Black color.
    #[inline]
    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }

    /// White color.
    #[inline]
    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }
}

/// Color table containing document colors.
///
/// Slot 0 is always the implicit "auto" entry written as a bare `;`, so
/// real colors start at index 1 as they do in Word-produced files.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    colors: Vec<Option<Color>>,
}

impl ColorTable {
    /// Create a new color table holding only the auto entry.
    #[inline]
    pub fn new() -> Self {
        Self { colors: Vec::new() }
    }

    /// Append an entry as read from `\colortbl`. `None` is the auto color.
    #[inline]
    pub fn push(&mut self, color: Option<Color>) -> ColorRef {
        let index = self.colors.len() as ColorRef;
        self.colors.push(color);
        index
    }

    /// Index of `color`, adding it when not yet present.
    pub fn intern(&mut self, color: Color) -> ColorRef {
        if self.colors.is_empty() {
            self.colors.push(None);
        }
        match self.colors.iter().position(|c| *c == Some(color)) {
            Some(index) => index as ColorRef,
            None => self.push(Some(color)),
        }
    }

    /// Get a color by reference. The auto entry and unknown indices yield `None`.
    #[inline]
    pub fn get(&self, color_ref: ColorRef) -> Option<Color> {
        self.colors.get(color_ref as usize).copied().flatten()
    }

    /// All entries in table order.
    #[inline]
    pub fn entries(&self) -> &[Option<Color>] {
        &self.colors
    }

    /// Number of entries, auto entry included.
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the table has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Font family categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontFamily {
    /// Nil (unknown or default)
    #[default]
    Nil,
    /// Roman (serif) fonts
    Roman,
    /// Swiss (sans-serif) fonts
    Swiss,
    /// Modern (monospace) fonts
    Modern,
    /// Script fonts
    Script,
    /// Decorative fonts
    Decor,
    /// Technical, symbol, and mathematical fonts
    Tech,
    /// Bidirectional fonts
    Bidi,
}

impl FontFamily {
    /// Parse a font family control word (`froman`, `fswiss`, ...).
    pub fn from_control_word(word: &str) -> Option<Self> {
        Some(match word {
            "fnil" => FontFamily::Nil,
            "froman" => FontFamily::Roman,
            "fswiss" => FontFamily::Swiss,
            "fmodern" => FontFamily::Modern,
            "fscript" => FontFamily::Script,
            "fdecor" => FontFamily::Decor,
            "ftech" => FontFamily::Tech,
            "fbidi" => FontFamily::Bidi,
            _ => return None,
        })
    }

    /// Control word for this family.
    pub fn control_word(self) -> &'static str {
        match self {
            FontFamily::Nil => "fnil",
            FontFamily::Roman => "froman",
            FontFamily::Swiss => "fswiss",
            FontFamily::Modern => "fmodern",
            FontFamily::Script => "fscript",
            FontFamily::Decor => "fdecor",
            FontFamily::Tech => "ftech",
            FontFamily::Bidi => "fbidi",
        }
    }
}

/// Font definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Font {
    /// Font name
    pub name: String,
    /// Font family category
    pub family: FontFamily,
    /// Character set (`\fcharsetN`), if declared
    pub charset: Option<i32>,
}

impl Font {
    /// Create a new font.
    #[inline]
    pub fn new(name: impl Into<String>, family: FontFamily, charset: Option<i32>) -> Self {
        Self {
            name: name.into(),
            family,
            charset,
        }
    }

    /// Codepage implied by the font charset, if any.
    #[inline]
    pub fn code_page(&self) -> Option<u32> {
        self.charset.and_then(charset_to_codepage)
    }
}

/// Font table containing document fonts.
///
/// RTF font numbers are sparse identifiers, not positions, so entries are
/// kept as `(number, font)` pairs.
#[derive(Debug, Clone, Default)]
pub struct FontTable {
    fonts: Vec<(FontRef, Font)>,
}

impl FontTable {
    /// Create a new font table.
    #[inline]
    pub fn new() -> Self {
        Self { fonts: Vec::new() }
    }

    /// Add or replace the font with number `index`.
    pub fn insert(&mut self, index: FontRef, font: Font) {
        match self.fonts.iter_mut().find(|(i, _)| *i == index) {
            Some(slot) => slot.1 = font,
            None => self.fonts.push((index, font)),
        }
    }

    /// Number of the font named `name`, adding it when not yet present.
    pub fn intern(&mut self, name: &str) -> FontRef {
        if let Some((index, _)) = self.fonts.iter().find(|(_, f)| f.name == name) {
            return *index;
        }
        let index = self
            .fonts
            .iter()
            .map(|(i, _)| i + 1)
            .max()
            .unwrap_or(0);
        self.fonts.push((index, Font::new(name, FontFamily::Nil, None)));
        index
    }

    /// Get a font by reference.
    #[inline]
    pub fn get(&self, font_ref: FontRef) -> Option<&Font> {
        self.fonts
            .iter()
            .find(|(i, _)| *i == font_ref)
            .map(|(_, f)| f)
    }

    /// All fonts in table order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (FontRef, &Font)> {
        self.fonts.iter().map(|(i, f)| (*i, f))
    }

    /// Number of fonts.
    #[inline]
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Whether the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

/// Text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// Left-aligned
    #[default]
    Left,
    /// Right-aligned
    Right,
    /// Centered
    Center,
    /// Justified
    Justify,
}

impl Alignment {
    /// Control word selecting this alignment.
    pub fn control_word(self) -> &'static str {
        match self {
            Alignment::Left => "ql",
            Alignment::Right => "qr",
            Alignment::Center => "qc",
            Alignment::Justify => "qj",
        }
    }
}

/// Reading direction of text or paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Left-to-right
    #[default]
    LeftToRight,
    /// Right-to-left
    RightToLeft,
}

/// One level of a list definition (`\listlevel`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListLevel {
    /// Number format (`\levelnfcN`)
    pub number_format: i32,
    /// Level text with the leading length character and trailing `;` removed
    pub text: String,
    /// Start value (`\levelstartatN`)
    pub start_at: i32,
}

/// A list definition from `\listtable`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListDefinition {
    /// List identifier (`\listidN`)
    pub id: i32,
    /// Level definitions, outermost first
    pub levels: Vec<ListLevel>,
}

/// List and list-override tables.
#[derive(Debug, Clone, Default)]
pub struct ListTable {
    /// List definitions
    pub lists: Vec<ListDefinition>,
    /// `(ls, listid)` pairs from `\listoverridetable`
    pub overrides: Vec<(i32, i32)>,
}

impl ListTable {
    /// Create an empty list table.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the level definition used by paragraphs with `\lsN\ilvlM`.
    pub fn level(&self, ls: i32, ilvl: i32) -> Option<&ListLevel> {
        let list_id = self
            .overrides
            .iter()
            .find(|(override_ls, _)| *override_ls == ls)
            .map(|(_, id)| *id)?;
        let list = self.lists.iter().find(|l| l.id == list_id)?;
        list.levels.get(usize::try_from(ilvl).ok()?)
    }

    /// Whether there is nothing to write.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

/// Document-level settings read from the RTF header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentInfo {
    /// ANSI codepage (`\ansicpgN`, or implied by `\mac`, `\pc`, `\pca`)
    pub code_page: u32,
    /// Default font (`\deffN`)
    pub default_font: Option<FontRef>,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self {
            code_page: DEFAULT_CODE_PAGE,
            default_font: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_table_auto_slot() {
        let mut table = ColorTable::new();
        let red = table.intern(Color::new(255, 0, 0));
        assert_eq!(red, 1);
        assert_eq!(table.intern(Color::new(255, 0, 0)), 1);
        assert_eq!(table.intern(Color::black()), 2);
        assert_eq!(table.get(0), None);
        assert_eq!(table.get(1), Some(Color::new(255, 0, 0)));
        assert_eq!(table.get(9), None);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_font_table_sparse_numbers() {
        let mut table = FontTable::new();
        table.insert(3, Font::new("Arial", FontFamily::Swiss, Some(0)));
        table.insert(7, Font::new("MS Mincho", FontFamily::Roman, Some(128)));
        assert_eq!(table.get(3).map(|f| f.name.as_str()), Some("Arial"));
        assert_eq!(table.get(7).and_then(Font::code_page), Some(932));
        assert!(table.get(0).is_none());
        assert_eq!(table.intern("Arial"), 3);
        assert_eq!(table.intern("Consolas"), 8);
    }

    #[test]
    fn test_list_level_resolution() {
        let table = ListTable {
            lists: vec![ListDefinition {
                id: 42,
                levels: vec![
                    ListLevel {
                        number_format: 0,
                        text: String::new(),
                        start_at: 1,
                    },
                    ListLevel {
                        number_format: 23,
                        text: "\u{2022}".into(),
                        start_at: 1,
                    },
                ],
            }],
            overrides: vec![(1, 42)],
        };
        assert_eq!(table.level(1, 1).map(|l| l.number_format), Some(23));
        assert!(table.level(2, 0).is_none());
        assert!(table.level(1, 5).is_none());
        assert!(table.level(1, -1).is_none());
    }

    #[test]
    fn test_font_family_words() {
        for word in ["fnil", "froman", "fswiss", "fmodern", "fscript", "fdecor", "ftech", "fbidi"] {
            let family = FontFamily::from_control_word(word).unwrap();
            assert_eq!(family.control_word(), word);
        }
        assert!(FontFamily::from_control_word("fcharset").is_none());
    }
}
