//! RTF lexer/tokenizer.
//!
//! This module turns raw RTF bytes into a stream of typed tokens. The lexer
//! borrows from the input wherever it can: text runs, control word names and
//! `\bin` payloads are slices of the source buffer.
//!
//! The lexer also owns the structural bookkeeping of groups: it knows the
//! current nesting depth and rejects an excess `}` or an input that ends with
//! groups still open.

use crate::common::encoding::hex_char_to_nibble;
use crate::common::{Error, Result};
use memchr::memchr3;
use std::borrow::Cow;

/// Longest control word name accepted (RTF 1.9 limits names to 32 letters).
const MAX_CONTROL_WORD_LEN: usize = 32;

/// Longest numeric parameter accepted, sign excluded.
const MAX_PARAMETER_DIGITS: usize = 10;

/// Control word with optional parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlWord<'a> {
    /// Control word name without the leading backslash
    pub name: &'a str,
    /// Signed numeric parameter, if one was written
    pub param: Option<i32>,
}

impl<'a> ControlWord<'a> {
    /// Create a control word.
    #[inline]
    pub const fn new(name: &'a str, param: Option<i32>) -> Self {
        Self { name, param }
    }

    /// Parameter value, or `default` when none was written.
    #[inline]
    pub fn param_or(&self, default: i32) -> i32 {
        self.param.unwrap_or(default)
    }

    /// Toggle value: a missing parameter or any non-zero parameter turns the
    /// property on, `0` turns it off.
    #[inline]
    pub fn toggle(&self) -> bool {
        self.param_or(1) != 0
    }
}

/// Token types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// End of input
    Eof,
    /// Opening brace
    GroupStart,
    /// Closing brace
    GroupEnd,
    /// Control word (`\name` with optional parameter)
    Control(ControlWord<'a>),
    /// The `\*` ignorable-destination marker
    Destination,
    /// Control symbol with meaning of its own (`\~`, `\-`, `\_`, ...)
    TextSymbol(char),
    /// Escaped byte (`\'hh`)
    Hex(u8),
    /// Literal text bytes in the document codepage
    Text(&'a [u8]),
    /// Binary picture payload: raw `\bin` bytes or decoded hex picture data
    PictureData(Cow<'a, [u8]>),
    /// Raw carriage return or line feed
    Newline,
    /// Raw NUL byte
    NullChar,
}

impl Token<'_> {
    /// Short name of the token kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Token::Eof => "EOF",
            Token::GroupStart => "GroupStart",
            Token::GroupEnd => "GroupEnd",
            Token::Control(_) => "Control",
            Token::Destination => "Destination",
            Token::TextSymbol(_) => "TextSymbol",
            Token::Hex(_) => "Hex",
            Token::Text(_) => "Text",
            Token::PictureData(_) => "PictureData",
            Token::Newline => "Newline",
            Token::NullChar => "NullChar",
        }
    }
}

/// RTF Lexer.
pub struct Lexer<'a> {
    /// Source input
    input: &'a [u8],
    /// Current position in bytes
    pos: usize,
    /// Number of open groups
    depth: usize,
    /// Decode hex text as picture data
    picture_mode: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer.
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
            picture_mode: false,
        }
    }

    /// Number of currently open groups.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Current byte offset into the input.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Switch hex picture decoding on or off.
    ///
    /// Inside a `\pict` destination the text between control words is
    /// hex-encoded image data; in picture mode such text comes back as
    /// [`Token::PictureData`] instead of [`Token::Text`].
    #[inline]
    pub fn set_picture_mode(&mut self, on: bool) {
        self.picture_mode = on;
    }

    /// Tokenize the entire input, `Eof` excluded.
    pub fn tokenize(&mut self) -> Result<Vec<Token<'a>>> {
        let mut tokens = Vec::new();
        loop {
            match self.next_token()? {
                Token::Eof => return Ok(tokens),
                token => tokens.push(token),
            }
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        let Some(&byte) = self.input.get(self.pos) else {
            if self.depth > 0 {
                return Err(Error::format(format!(
                    "Unexpected end of input with {} unterminated group(s)",
                    self.depth
                )));
            }
            return Ok(Token::Eof);
        };

        match byte {
            b'{' => {
                self.pos += 1;
                self.depth += 1;
                Ok(Token::GroupStart)
            },
            b'}' => {
                if self.depth == 0 {
                    return Err(Error::format(format!(
                        "Unmatched closing brace at offset {}",
                        self.pos
                    )));
                }
                self.pos += 1;
                self.depth -= 1;
                Ok(Token::GroupEnd)
            },
            b'\\' => self.parse_control(),
            b'\r' | b'\n' => {
                self.pos += 1;
                Ok(Token::Newline)
            },
            0 => {
                self.pos += 1;
                Ok(Token::NullChar)
            },
            _ if self.picture_mode => self.parse_picture_hex(),
            _ => Ok(self.parse_text()),
        }
    }

    /// Parse a control word or control symbol.
    fn parse_control(&mut self) -> Result<Token<'a>> {
        let start = self.pos;
        self.pos += 1; // Skip '\'

        let Some(&ch) = self.input.get(self.pos) else {
            return Err(Error::format("Dangling backslash at end of input"));
        };

        if !ch.is_ascii_alphabetic() {
            self.pos += 1;
            return match ch {
                b'\\' | b'{' | b'}' => Ok(Token::Text(&self.input[start + 1..self.pos])),
                b'\'' => self.parse_hex_escape(),
                b'*' => Ok(Token::Destination),
                b'\r' | b'\n' => Ok(Token::Control(ControlWord::new("par", None))),
                b'\t' => Ok(Token::Control(ControlWord::new("tab", None))),
                _ if ch.is_ascii() => Ok(Token::TextSymbol(ch as char)),
                _ => Err(Error::format(format!(
                    "Invalid control symbol byte 0x{:02X} at offset {}",
                    ch, start
                ))),
            };
        }

        let name_start = self.pos;
        while self
            .input
            .get(self.pos)
            .is_some_and(|b| b.is_ascii_alphabetic())
        {
            self.pos += 1;
        }
        if self.pos - name_start > MAX_CONTROL_WORD_LEN {
            return Err(Error::format(format!(
                "Control word longer than {} characters at offset {}",
                MAX_CONTROL_WORD_LEN, start
            )));
        }
        // Control word names are ASCII letters, so this cannot fail
        let name = std::str::from_utf8(&self.input[name_start..self.pos])?;

        let param = self.parse_numeric_parameter()?;

        // A single space delimiter belongs to the control word
        if self.input.get(self.pos) == Some(&b' ') {
            self.pos += 1;
        }

        if name == "bin" {
            return self.parse_binary(param);
        }

        Ok(Token::Control(ControlWord::new(name, param)))
    }

    /// Parse numeric parameter after control word.
    fn parse_numeric_parameter(&mut self) -> Result<Option<i32>> {
        let start = self.pos;
        let negative = self.input.get(self.pos) == Some(&b'-');
        if negative {
            self.pos += 1;
        }

        let digits_start = self.pos;
        while self.input.get(self.pos).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits = &self.input[digits_start..self.pos];

        if digits.is_empty() {
            if negative {
                return Err(Error::format(format!(
                    "Truncated control word parameter at offset {}",
                    start
                )));
            }
            return Ok(None);
        }
        if digits.len() > MAX_PARAMETER_DIGITS {
            return Err(Error::format(format!(
                "Control word parameter too long at offset {}",
                start
            )));
        }

        let magnitude = digits
            .iter()
            .fold(0i64, |acc, d| acc * 10 + i64::from(d - b'0'));
        let value = if negative { -magnitude } else { magnitude };
        i32::try_from(value).map(Some).map_err(|_| {
            Error::format(format!(
                "Control word parameter {} out of range at offset {}",
                value, start
            ))
        })
    }

    /// Parse hexadecimal character escape (\').
    fn parse_hex_escape(&mut self) -> Result<Token<'a>> {
        let Some(hex) = self.input.get(self.pos..self.pos + 2) else {
            return Err(Error::format("Incomplete hex escape at end of input"));
        };
        let byte = (hex_char_to_nibble(hex[0])? << 4) | hex_char_to_nibble(hex[1])?;
        self.pos += 2;
        Ok(Token::Hex(byte))
    }

    /// Consume the raw payload that follows `\binN`.
    fn parse_binary(&mut self, param: Option<i32>) -> Result<Token<'a>> {
        let len = usize::try_from(param.unwrap_or(0))
            .map_err(|_| Error::format("Negative \\bin length"))?;
        let end = self.pos.checked_add(len).filter(|&end| end <= self.input.len());
        let Some(end) = end else {
            return Err(Error::format(format!(
                "\\bin{} payload truncated: {} byte(s) left",
                len,
                self.input.len() - self.pos
            )));
        };
        let data = &self.input[self.pos..end];
        self.pos = end;
        Ok(Token::PictureData(Cow::Borrowed(data)))
    }

    /// Decode a run of hex picture data up to the next delimiter.
    fn parse_picture_hex(&mut self) -> Result<Token<'a>> {
        let run = self.take_run();
        let mut data = Vec::new();
        data.try_reserve(run.len() / 2)?;

        let mut high: Option<u8> = None;
        for &b in run {
            if b.is_ascii_whitespace() {
                continue;
            }
            let nibble = hex_char_to_nibble(b)?;
            match high.take() {
                Some(h) => data.push((h << 4) | nibble),
                None => high = Some(nibble),
            }
        }
        if high.is_some() {
            // Producers break hex data across lines; a dangling nibble means
            // the digits were split by a newline, so carry it over.
            if let Some(&next) = self.input.get(self.pos)
                && matches!(next, b'\r' | b'\n')
            {
                return self.continue_picture_hex(data, high);
            }
            return Err(Error::format("Odd number of hex digits in picture data"));
        }
        Ok(Token::PictureData(Cow::Owned(data)))
    }

    /// Continue a hex run whose last byte was split by line breaks.
    fn continue_picture_hex(&mut self, mut data: Vec<u8>, mut high: Option<u8>) -> Result<Token<'a>> {
        while let Some(&b) = self.input.get(self.pos) {
            match b {
                b'\r' | b'\n' => self.pos += 1,
                b'\\' | b'{' | b'}' | 0 => break,
                _ => {
                    for &b in self.take_run() {
                        if b.is_ascii_whitespace() {
                            continue;
                        }
                        let nibble = hex_char_to_nibble(b)?;
                        match high.take() {
                            Some(h) => data.push((h << 4) | nibble),
                            None => high = Some(nibble),
                        }
                    }
                    if high.is_none() {
                        break;
                    }
                },
            }
        }
        if high.is_some() {
            return Err(Error::format("Odd number of hex digits in picture data"));
        }
        Ok(Token::PictureData(Cow::Owned(data)))
    }

    /// Parse plain text until a special byte.
    fn parse_text(&mut self) -> Token<'a> {
        Token::Text(self.take_run())
    }

    /// Take bytes up to the next `\`, `{`, `}`, CR, LF or NUL.
    #[inline]
    fn take_run(&mut self) -> &'a [u8] {
        let rest = &self.input[self.pos..];
        let end = memchr3(b'\\', b'{', b'}', rest).unwrap_or(rest.len());
        let end = memchr3(b'\r', b'\n', 0, &rest[..end]).unwrap_or(end);
        self.pos += end;
        &rest[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorKind;

    fn control(name: &str, param: Option<i32>) -> Token<'_> {
        Token::Control(ControlWord::new(name, param))
    }

    #[test]
    fn test_simple_tokenization() {
        let input = br"{\rtf1\ansi Hello}";
        let tokens = Lexer::new(input).tokenize().unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::GroupStart,
                control("rtf", Some(1)),
                control("ansi", None),
                Token::Text(b"Hello"),
                Token::GroupEnd,
            ]
        );
    }

    #[test]
    fn test_negative_parameter_and_delimiters() {
        let tokens = Lexer::new(br"{\fi-360\li720;x}").tokenize().unwrap();
        assert_eq!(tokens[1], control("fi", Some(-360)));
        assert_eq!(tokens[2], control("li", Some(720)));
        assert_eq!(tokens[3], Token::Text(b";x"));
    }

    #[test]
    fn test_only_one_space_is_consumed() {
        let tokens = Lexer::new(br"{\b0  World}").tokenize().unwrap();
        assert_eq!(tokens[1], control("b", Some(0)));
        assert_eq!(tokens[2], Token::Text(b" World"));
    }

    #[test]
    fn test_symbols_and_escapes() {
        let tokens = Lexer::new(br"{\{\}\\\~\'e9\*\foo}").tokenize().unwrap();
        assert_eq!(tokens[1], Token::Text(b"{"));
        assert_eq!(tokens[2], Token::Text(b"}"));
        assert_eq!(tokens[3], Token::Text(b"\\"));
        assert_eq!(tokens[4], Token::TextSymbol('~'));
        assert_eq!(tokens[5], Token::Hex(0xE9));
        assert_eq!(tokens[6], Token::Destination);
        assert_eq!(tokens[7], control("foo", None));
    }

    #[test]
    fn test_newlines_and_nulls() {
        let tokens = Lexer::new(b"{a\r\nb\0}").tokenize().unwrap();
        assert_eq!(
            tokens[1..5],
            [
                Token::Text(b"a"),
                Token::Newline,
                Token::Newline,
                Token::Text(b"b"),
            ]
        );
        assert_eq!(tokens[5], Token::NullChar);
        // Escaped line break is a paragraph mark
        let tokens = Lexer::new(b"{\\\n}").tokenize().unwrap();
        assert_eq!(tokens[1], control("par", None));
    }

    #[test]
    fn test_binary_payload_is_opaque() {
        let input = b"{\\bin4 {}\\\\x}";
        let tokens = Lexer::new(input).tokenize().unwrap();
        assert_eq!(tokens[1], Token::PictureData(Cow::Borrowed(b"{}\\\\")));
        assert_eq!(tokens[2], Token::Text(b"x"));
    }

    #[test]
    fn test_picture_mode_decodes_hex() {
        let mut lexer = Lexer::new(b"{\\pict 89504e\r\n470d}");
        assert_eq!(lexer.next_token().unwrap(), Token::GroupStart);
        assert_eq!(lexer.next_token().unwrap(), control("pict", None));
        lexer.set_picture_mode(true);
        assert_eq!(
            lexer.next_token().unwrap(),
            Token::PictureData(Cow::Owned(vec![0x89, 0x50, 0x4E]))
        );
        assert_eq!(lexer.next_token().unwrap(), Token::Newline);
        assert_eq!(lexer.next_token().unwrap(), Token::Newline);
        assert_eq!(
            lexer.next_token().unwrap(),
            Token::PictureData(Cow::Owned(vec![0x47, 0x0D]))
        );
    }

    #[test]
    fn test_picture_hex_split_across_lines() {
        let mut lexer = Lexer::new(b"{\\pict 895\n04e}");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        lexer.set_picture_mode(true);
        assert_eq!(
            lexer.next_token().unwrap(),
            Token::PictureData(Cow::Owned(vec![0x89, 0x50, 0x4E]))
        );
    }

    #[test]
    fn test_structural_errors() {
        let err = Lexer::new(br"{\rtf1 x}}").tokenize().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);

        let err = Lexer::new(br"{\rtf1 {x}").tokenize().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_malformed_escapes() {
        for input in [
            &br"{\'zz}"[..],
            br"{\'4",
            br"{\li-}",
            br"{\fs99999999999}",
            br"{\bin10 abc}",
            br"{\bin-1 }",
        ] {
            let err = Lexer::new(input).tokenize().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidFormat, "{:?}", input);
        }
    }

    #[test]
    fn test_unknown_control_words_are_not_errors() {
        let tokens = Lexer::new(br"{\madeupword42 x}").tokenize().unwrap();
        assert_eq!(tokens[1], control("madeupword", Some(42)));
    }

    #[test]
    fn test_depth_tracking() {
        let mut lexer = Lexer::new(b"{{}}");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        assert_eq!(lexer.depth(), 2);
        lexer.next_token().unwrap();
        assert_eq!(lexer.depth(), 1);
    }
}
