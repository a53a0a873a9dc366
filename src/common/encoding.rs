//! Character encoding utilities for RTF text.
//!
//! RTF carries text as 8-bit bytes in a document codepage (`\ansicpgN`) or a
//! per-font charset (`\fcharsetN`). This module maps those identifiers onto
//! `encoding_rs` encodings and provides the hex helpers used for `\'hh`
//! escapes and picture data.

use crate::common::{Error, Result};
use encoding_rs::Encoding;

/// Codepage assumed when a document declares none.
pub const DEFAULT_CODE_PAGE: u32 = 1252;

/// Map Windows codepage identifier to encoding_rs Encoding.
///
/// # Examples
/// ```
/// use xaml_rtf::common::encoding::codepage_to_encoding;
///
/// let encoding = codepage_to_encoding(936).unwrap();
/// assert_eq!(encoding.name(), "GBK");
/// ```
#[inline]
pub fn codepage_to_encoding(codepage: u32) -> Option<&'static Encoding> {
    match codepage {
        // DOS codepages
        437 | 850 => Some(encoding_rs::IBM866), // approximation, encoding_rs has no CP437
        866 => Some(encoding_rs::IBM866),

        // Windows codepages (Western scripts)
        874 => Some(encoding_rs::WINDOWS_874),
        1250 => Some(encoding_rs::WINDOWS_1250),
        1251 => Some(encoding_rs::WINDOWS_1251),
        1252 => Some(encoding_rs::WINDOWS_1252),
        1253 => Some(encoding_rs::WINDOWS_1253),
        1254 => Some(encoding_rs::WINDOWS_1254),
        1255 => Some(encoding_rs::WINDOWS_1255),
        1256 => Some(encoding_rs::WINDOWS_1256),
        1257 => Some(encoding_rs::WINDOWS_1257),
        1258 => Some(encoding_rs::WINDOWS_1258),

        // East Asian codepages
        932 => Some(encoding_rs::SHIFT_JIS),
        936 | 20936 => Some(encoding_rs::GBK),
        949 => Some(encoding_rs::EUC_KR),
        950 => Some(encoding_rs::BIG5),
        20932 => Some(encoding_rs::EUC_JP),
        54936 => Some(encoding_rs::GB18030),

        // ISO 8859 series
        28591 => Some(encoding_rs::WINDOWS_1252),
        28592 => Some(encoding_rs::ISO_8859_2),
        28595 => Some(encoding_rs::ISO_8859_5),
        28597 => Some(encoding_rs::ISO_8859_7),
        28605 => Some(encoding_rs::ISO_8859_15),

        // KOI8 series
        20866 => Some(encoding_rs::KOI8_R),
        21866 => Some(encoding_rs::KOI8_U),

        // Macintosh
        10000 => Some(encoding_rs::MACINTOSH),

        65001 => Some(encoding_rs::UTF_8),

        _ => None,
    }
}

/// Map an RTF font charset (`\fcharsetN`) to a Windows codepage.
///
/// Returns `None` for `DEFAULT_CHARSET` (1) and unknown charsets, in which
/// case the document codepage applies.
#[inline]
pub fn charset_to_codepage(charset: i32) -> Option<u32> {
    match charset {
        0 | 2 => Some(1252), // ANSI, Symbol
        77 => Some(10000),   // Mac Roman
        128 => Some(932),    // Shift JIS
        129 => Some(949),    // Hangul
        134 => Some(936),    // GB2312
        136 => Some(950),    // Big5
        161 => Some(1253),   // Greek
        162 => Some(1254),   // Turkish
        163 => Some(1258),   // Vietnamese
        177 => Some(1255),   // Hebrew
        178 => Some(1256),   // Arabic
        186 => Some(1257),   // Baltic
        204 => Some(1251),   // Cyrillic
        222 => Some(874),    // Thai
        238 => Some(1250),   // Eastern European
        254 => Some(437),    // PC 437
        _ => None,
    }
}

/// Convert a hex character to its nibble value (0-15).
#[inline(always)]
pub fn hex_char_to_nibble(c: u8) -> Result<u8> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(Error::format(format!(
            "Invalid hex character: {:?}",
            c as char
        ))),
    }
}

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Lower-case hex digits of a byte.
#[inline(always)]
pub fn byte_to_hex(byte: u8) -> [u8; 2] {
    [HEX_DIGITS[(byte >> 4) as usize], HEX_DIGITS[(byte & 0x0F) as usize]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charset_mapping() {
        assert_eq!(charset_to_codepage(0), Some(1252));
        assert_eq!(charset_to_codepage(204), Some(1251));
        assert_eq!(charset_to_codepage(1), None);
        let enc = charset_to_codepage(128).and_then(codepage_to_encoding).unwrap();
        assert_eq!(enc.name(), "Shift_JIS");
    }

    #[test]
    fn test_hex_helpers() {
        assert_eq!(hex_char_to_nibble(b'a').unwrap(), 10);
        assert_eq!(hex_char_to_nibble(b'F').unwrap(), 15);
        assert!(hex_char_to_nibble(b'g').is_err());
        assert_eq!(&byte_to_hex(0xB7), b"b7");
    }

    #[test]
    fn test_windows_1252_decoding() {
        let enc = codepage_to_encoding(DEFAULT_CODE_PAGE).unwrap();
        let (text, _, had_errors) = enc.decode(&[0x93, b'x', 0x94]);
        assert!(!had_errors);
        assert_eq!(text, "\u{201C}x\u{201D}");
    }
}
