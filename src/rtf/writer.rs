//! RTF text emitter.
//!
//! `RtfWriter` appends RTF syntax to an in-memory buffer: control words,
//! groups, escaped text and hex picture data. It tracks whether the last
//! thing written was a control word so that a delimiting space is inserted
//! only where the next byte could otherwise be read as part of the word.
//!
//! Writers nest: table cells are rendered into their own writer and spliced
//! into the row with [`RtfWriter::append`].

use super::types::{ColorTable, FontTable, ListTable};
use crate::common::Result;
use crate::common::encoding::byte_to_hex;
use encoding_rs::Encoding;

/// Hex digits per line of picture data.
const HEX_LINE_WIDTH: usize = 128;

/// RTF document writer.
#[derive(Debug, Clone, Default)]
pub struct RtfWriter {
    /// Output buffer
    buf: String,
    /// Last output was a control word that still needs a delimiter
    needs_delimiter: bool,
}

impl RtfWriter {
    /// Create an empty writer.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Written output.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Consume the writer, returning its output.
    #[inline]
    pub fn into_string(self) -> String {
        self.buf
    }

    /// Whether nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Write a control word with optional parameter.
    pub fn write_control_word(&mut self, word: &str, param: Option<i32>) {
        self.buf.push('\\');
        self.buf.push_str(word);
        if let Some(p) = param {
            let mut digits = itoa::Buffer::new();
            self.buf.push_str(digits.format(p));
        }
        self.needs_delimiter = true;
    }

    /// Write a parameterless control word.
    #[inline]
    pub fn word(&mut self, word: &str) {
        self.write_control_word(word, None);
    }

    /// Write a control word with a parameter.
    #[inline]
    pub fn word_n(&mut self, word: &str, param: i32) {
        self.write_control_word(word, Some(param));
    }

    /// Open a group.
    #[inline]
    pub fn open_group(&mut self) {
        self.buf.push('{');
        self.needs_delimiter = false;
    }

    /// Close a group.
    #[inline]
    pub fn close_group(&mut self) {
        self.buf.push('}');
        self.needs_delimiter = false;
    }

    /// Open an ignorable destination group (`{\*\word`).
    pub fn open_destination(&mut self, word: &str) {
        self.open_group();
        self.buf.push_str("\\*");
        self.word(word);
    }

    /// Write literal RTF syntax that needs no escaping.
    pub fn write_raw(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        self.delimit_before(raw.as_bytes()[0]);
        self.buf.push_str(raw);
    }

    /// Write plain text, escaping RTF specials.
    ///
    /// Characters the target encoding can represent are written as `\'hh`
    /// bytes; anything else becomes `\uN?` (with surrogate pairs above the
    /// BMP). Tabs become `\tab` and newlines `\line`.
    pub fn write_text(&mut self, text: &str, encoding: &'static Encoding) {
        let mut utf8 = [0u8; 4];
        for ch in text.chars() {
            match ch {
                '\\' | '{' | '}' => {
                    self.needs_delimiter = false;
                    self.buf.push('\\');
                    self.buf.push(ch);
                },
                '\t' => self.word("tab"),
                '\n' => self.word("line"),
                '\r' => {},
                '\u{00A0}' => self.write_symbol('~'),
                '\u{00AD}' => self.write_symbol('-'),
                '\u{2011}' => self.write_symbol('_'),
                c if c.is_ascii() && !c.is_ascii_control() => {
                    if self.needs_delimiter {
                        self.buf.push(' ');
                        self.needs_delimiter = false;
                    }
                    self.buf.push(c);
                },
                c => {
                    let (bytes, _, unmappable) = encoding.encode(c.encode_utf8(&mut utf8));
                    if !unmappable && !c.is_ascii() {
                        for &b in bytes.iter() {
                            self.write_hex_byte(b);
                        }
                    } else {
                        self.write_unicode(c);
                    }
                },
            }
        }
    }

    /// Write a `\'hh` escape.
    #[inline]
    pub fn write_hex_byte(&mut self, byte: u8) {
        let [hi, lo] = byte_to_hex(byte);
        self.buf.push_str("\\'");
        self.buf.push(hi as char);
        self.buf.push(lo as char);
        self.needs_delimiter = false;
    }

    /// Write a character as `\uN?`, splitting astral characters into a
    /// surrogate pair. Parameters are signed 16-bit values as RTF requires.
    pub fn write_unicode(&mut self, ch: char) {
        let mut units = [0u16; 2];
        for &unit in ch.encode_utf16(&mut units).iter() {
            self.word_n("u", i32::from(unit as i16));
            self.buf.push('?');
            self.needs_delimiter = false;
        }
    }

    /// Write a control symbol such as `\~`.
    #[inline]
    fn write_symbol(&mut self, symbol: char) {
        self.buf.push('\\');
        self.buf.push(symbol);
        self.needs_delimiter = false;
    }

    /// Write binary data as lowercase hex, wrapped at a fixed line width.
    pub fn write_hex_data(&mut self, data: &[u8]) -> Result<()> {
        self.buf
            .try_reserve(data.len() * 2 + data.len() / (HEX_LINE_WIDTH / 2) + 1)?;
        self.buf.push('\n');
        for (i, &byte) in data.iter().enumerate() {
            if i > 0 && i % (HEX_LINE_WIDTH / 2) == 0 {
                self.buf.push('\n');
            }
            let [hi, lo] = byte_to_hex(byte);
            self.buf.push(hi as char);
            self.buf.push(lo as char);
        }
        self.needs_delimiter = false;
        Ok(())
    }

    /// Splice the output of a nested writer.
    pub fn append(&mut self, other: RtfWriter) {
        if other.buf.is_empty() {
            return;
        }
        self.delimit_before(other.buf.as_bytes()[0]);
        self.buf.push_str(&other.buf);
        self.needs_delimiter = other.needs_delimiter;
    }

    /// Insert the delimiting space if `next` would extend the last control word.
    #[inline]
    fn delimit_before(&mut self, next: u8) {
        if self.needs_delimiter && (next.is_ascii_alphanumeric() || matches!(next, b' ' | b'-')) {
            self.buf.push(' ');
        }
        self.needs_delimiter = false;
    }

    /// Write the document prologue: `{\rtf1\ansi\ansicpgN\deffN\uc1`.
    pub fn write_document_header(&mut self, code_page: u32, default_font: u16) {
        self.open_group();
        self.word_n("rtf", 1);
        self.word("ansi");
        self.word_n("ansicpg", code_page as i32);
        self.word_n("deff", i32::from(default_font));
        self.word_n("uc", 1);
    }

    /// Write font table.
    pub fn write_font_table(&mut self, fonts: &FontTable, encoding: &'static Encoding) {
        if fonts.is_empty() {
            return;
        }

        self.open_group();
        self.word("fonttbl");
        for (index, font) in fonts.iter() {
            self.open_group();
            self.word_n("f", i32::from(index));
            self.word(font.family.control_word());
            if let Some(charset) = font.charset {
                self.word_n("fcharset", charset);
            }
            self.write_text(&font.name, encoding);
            self.buf.push(';');
            self.close_group();
        }
        self.close_group();
    }

    /// Write color table.
    pub fn write_color_table(&mut self, colors: &ColorTable) {
        if colors.is_empty() {
            return;
        }

        self.open_group();
        self.word("colortbl");
        for entry in colors.entries() {
            if let Some(color) = entry {
                self.word_n("red", i32::from(color.red));
                self.word_n("green", i32::from(color.green));
                self.word_n("blue", i32::from(color.blue));
            }
            self.buf.push(';');
            self.needs_delimiter = false;
        }
        self.close_group();
    }

    /// Write `\listtable` and `\listoverridetable`.
    pub fn write_list_tables(&mut self, lists: &ListTable, encoding: &'static Encoding) {
        if lists.is_empty() {
            return;
        }

        self.open_destination("listtable");
        for list in &lists.lists {
            self.open_group();
            self.word("list");
            self.word_n("listtemplateid", list.id);
            for (depth, level) in list.levels.iter().enumerate() {
                let indent = 360 * (depth as i32 + 1);
                self.open_group();
                self.word("listlevel");
                self.word_n("levelnfc", level.number_format);
                self.word_n("levelnfcn", level.number_format);
                self.word_n("leveljc", 0);
                self.word_n("levelfollow", 0);
                self.word_n("levelstartat", level.start_at);

                // Level text is prefixed by its length in characters
                self.open_group();
                self.word("leveltext");
                let len = level.text.chars().count().min(255) as u8;
                self.write_hex_byte(len);
                for ch in level.text.chars() {
                    match u8::try_from(u32::from(ch)) {
                        Ok(placeholder) if placeholder < 9 => self.write_hex_byte(placeholder),
                        _ => self.write_text(ch.encode_utf8(&mut [0; 4]), encoding),
                    }
                }
                self.buf.push(';');
                self.needs_delimiter = false;
                self.close_group();

                self.open_group();
                self.word("levelnumbers");
                if let Some(pos) = level.text.chars().position(|c| (c as u32) < 9) {
                    self.write_hex_byte(pos as u8 + 1);
                }
                self.buf.push(';');
                self.needs_delimiter = false;
                self.close_group();

                self.word_n("fi", -360);
                self.word_n("li", indent);
                self.close_group();
            }
            self.open_group();
            self.word("listname");
            self.buf.push(';');
            self.close_group();
            self.word_n("listid", list.id);
            self.close_group();
        }
        self.close_group();

        self.open_destination("listoverridetable");
        for &(ls, list_id) in &lists.overrides {
            self.open_group();
            self.word("listoverride");
            self.word_n("listid", list_id);
            self.word_n("listoverridecount", 0);
            self.word_n("ls", ls);
            self.close_group();
        }
        self.close_group();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtf::types::{Color, Font, FontFamily, ListDefinition, ListLevel};

    #[test]
    fn test_control_words() {
        let mut writer = RtfWriter::new();
        writer.write_control_word("test", Some(42));
        writer.write_control_word("flag", None);
        assert_eq!(writer.as_str(), "\\test42\\flag");
    }

    #[test]
    fn test_delimiter_only_where_needed() {
        let mut writer = RtfWriter::new();
        writer.open_group();
        writer.word("b");
        writer.write_text("Hi", encoding_rs::WINDOWS_1252);
        writer.close_group();
        writer.word("par");
        writer.write_text("{x}", encoding_rs::WINDOWS_1252);
        assert_eq!(writer.as_str(), "{\\b Hi}\\par\\{x\\}");
    }

    #[test]
    fn test_text_escaping() {
        let mut writer = RtfWriter::new();
        writer.write_text("a\\b\tc\u{e9}\u{4e2d}\u{1F600}", encoding_rs::WINDOWS_1252);
        assert_eq!(
            writer.as_str(),
            "a\\\\b\\tab c\\'e9\\u20013?\\u-10179?\\u-8704?"
        );
    }

    #[test]
    fn test_codepage_dependent_escaping() {
        let mut writer = RtfWriter::new();
        writer.write_text("\u{4e2d}", encoding_rs::GBK);
        assert_eq!(writer.as_str(), "\\'d6\\'d0");
    }

    #[test]
    fn test_append_delimits_nested_output() {
        let mut cell = RtfWriter::new();
        cell.write_text("x", encoding_rs::WINDOWS_1252);
        cell.word("cell");

        let mut row = RtfWriter::new();
        row.word("intbl");
        row.append(cell);
        row.write_text("y", encoding_rs::WINDOWS_1252);
        assert_eq!(row.as_str(), "\\intbl x\\cell y");
    }

    #[test]
    fn test_tables() {
        let mut fonts = FontTable::new();
        fonts.insert(0, Font::new("Times New Roman", FontFamily::Roman, None));
        let mut colors = ColorTable::new();
        colors.intern(Color::new(255, 0, 0));

        let mut writer = RtfWriter::new();
        writer.write_document_header(1252, 0);
        writer.write_font_table(&fonts, encoding_rs::WINDOWS_1252);
        writer.write_color_table(&colors);
        writer.close_group();
        assert_eq!(
            writer.as_str(),
            "{\\rtf1\\ansi\\ansicpg1252\\deff0\\uc1{\\fonttbl{\\f0\\froman Times New Roman;}}\
             {\\colortbl;\\red255\\green0\\blue0;}}"
        );
    }

    #[test]
    fn test_list_table_output() {
        let lists = ListTable {
            lists: vec![ListDefinition {
                id: 1,
                levels: vec![ListLevel {
                    number_format: 0,
                    text: "\u{0}.".into(),
                    start_at: 1,
                }],
            }],
            overrides: vec![(1, 1)],
        };
        let mut writer = RtfWriter::new();
        writer.write_list_tables(&lists, encoding_rs::WINDOWS_1252);
        let out = writer.as_str();
        assert!(out.contains("{\\leveltext\\'02\\'00.;}"));
        assert!(out.contains("{\\levelnumbers\\'01;}"));
        assert!(out.contains("{\\listoverride\\listid1\\listoverridecount0\\ls1}"));
    }

    #[test]
    fn test_hex_data_wrapping() {
        let mut writer = RtfWriter::new();
        writer.word("pngblip");
        writer.write_hex_data(&[0xAB; 70]).unwrap();
        let out = writer.as_str();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "\\pngblip");
        assert_eq!(lines[1].len(), 128);
        assert_eq!(lines[2], "abababababab");
    }
}
