//! XAML tokenizer.
//!
//! A thin layer over `quick-xml`'s pull reader that yields the token kinds
//! the converter cares about. End-name checking is switched off: matching
//! start and end tags is the job of the parse driver, which reports
//! mismatches before any further callback fires.

use crate::common::Result;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::str;

/// One attribute as written in markup, value unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
    /// Qualified name (`prefix:local` or `local`)
    pub name: String,
    /// Attribute value with references resolved
    pub value: String,
}

/// XAML token types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XamlToken {
    /// End of input
    Eof,
    /// Character data containing non-whitespace
    Characters(String),
    /// Character data consisting only of XML whitespace
    Whitespace(String),
    /// Entity or character reference, name without `&` and `;`
    Entity(String),
    /// Start tag, or empty-element tag when `self_closing`
    StartElement {
        name: String,
        attributes: Vec<RawAttribute>,
        self_closing: bool,
    },
    /// End tag
    EndElement { name: String },
    /// CDATA section content
    CData(String),
    /// Processing instruction
    ProcessingInstruction { target: String, data: String },
    /// Comment text
    Comment(String),
}

/// XAML Lexer.
pub struct XamlLexer<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> XamlLexer<'a> {
    /// Create a new lexer over `input`.
    pub fn new(input: &'a str) -> Self {
        let mut reader = Reader::from_str(input);
        let config = reader.config_mut();
        config.check_end_names = false;
        config.trim_text(false);
        Self { reader }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<XamlToken> {
        loop {
            let token = match self.reader.read_event()? {
                Event::Start(e) => start_element(&e, false)?,
                Event::Empty(e) => start_element(&e, true)?,
                Event::End(e) => XamlToken::EndElement {
                    name: str::from_utf8(e.name().as_ref())?.to_string(),
                },
                Event::Text(e) => {
                    let text = str::from_utf8(e.as_ref())?;
                    if text.bytes().all(is_xml_whitespace) {
                        XamlToken::Whitespace(text.to_string())
                    } else {
                        XamlToken::Characters(text.to_string())
                    }
                },
                Event::GeneralRef(e) => XamlToken::Entity(str::from_utf8(e.as_ref())?.to_string()),
                Event::CData(e) => XamlToken::CData(str::from_utf8(e.as_ref())?.to_string()),
                Event::Comment(e) => XamlToken::Comment(str::from_utf8(e.as_ref())?.to_string()),
                Event::PI(e) => {
                    let content = str::from_utf8(e.as_ref())?;
                    let (target, data) = content
                        .split_once(|c: char| c.is_ascii_whitespace())
                        .unwrap_or((content, ""));
                    XamlToken::ProcessingInstruction {
                        target: target.to_string(),
                        data: data.trim_start().to_string(),
                    }
                },
                Event::Eof => XamlToken::Eof,
                // The declaration and DOCTYPE carry nothing for flow content
                _ => continue,
            };
            return Ok(token);
        }
    }
}

fn start_element(e: &BytesStart<'_>, self_closing: bool) -> Result<XamlToken> {
    let name = str::from_utf8(e.name().as_ref())?.to_string();
    let mut attributes = Vec::new();
    // Duplicate names are rejected by the attribute iterator
    for attr in e.attributes() {
        let attr = attr?;
        let value = str::from_utf8(&attr.value)?;
        attributes.push(RawAttribute {
            name: str::from_utf8(attr.key.as_ref())?.to_string(),
            value: crate::common::xml::resolve_references(value)?.into_owned(),
        });
    }
    Ok(XamlToken::StartElement {
        name,
        attributes,
        self_closing,
    })
}

#[inline]
fn is_xml_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorKind;

    fn tokens(input: &str) -> Result<Vec<XamlToken>> {
        let mut lexer = XamlLexer::new(input);
        let mut out = Vec::new();
        loop {
            match lexer.next_token()? {
                XamlToken::Eof => return Ok(out),
                token => out.push(token),
            }
        }
    }

    #[test]
    fn test_elements_and_text() {
        let toks = tokens(r#"<?xml version="1.0"?><Paragraph a="1 &amp; 2"><Run/>Hi</Paragraph>"#)
            .unwrap();
        assert_eq!(
            toks[0],
            XamlToken::StartElement {
                name: "Paragraph".into(),
                attributes: vec![RawAttribute {
                    name: "a".into(),
                    value: "1 & 2".into()
                }],
                self_closing: false,
            }
        );
        assert!(matches!(&toks[1], XamlToken::StartElement { self_closing: true, .. }));
        assert_eq!(toks[2], XamlToken::Characters("Hi".into()));
        assert_eq!(toks[3], XamlToken::EndElement { name: "Paragraph".into() });
    }

    #[test]
    fn test_entities_whitespace_and_misc() {
        let toks = tokens("<a>\n <!--c--><![CDATA[<x>]]>&lt;&#65;<?pi some data?></a>").unwrap();
        assert_eq!(toks[1], XamlToken::Whitespace("\n ".into()));
        assert_eq!(toks[2], XamlToken::Comment("c".into()));
        assert_eq!(toks[3], XamlToken::CData("<x>".into()));
        assert_eq!(toks[4], XamlToken::Entity("lt".into()));
        assert_eq!(toks[5], XamlToken::Entity("#65".into()));
        assert_eq!(
            toks[6],
            XamlToken::ProcessingInstruction {
                target: "pi".into(),
                data: "some data".into()
            }
        );
    }

    #[test]
    fn test_mismatched_end_is_left_to_driver() {
        let toks = tokens("<a></b>").unwrap();
        assert_eq!(toks[1], XamlToken::EndElement { name: "b".into() });
    }

    #[test]
    fn test_malformed_markup() {
        for input in [r#"<a b="1" b="2"/>"#, "<a", r#"<a b="&nope;"/>"#] {
            let err = tokens(input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidFormat, "{}", input);
        }
    }
}
