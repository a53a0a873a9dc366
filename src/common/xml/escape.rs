use crate::common::{Error, Result};
use aho_corasick::AhoCorasick;
use memchr::memchr;
use once_cell::sync::Lazy;
use std::borrow::Cow;

// Static initialization: automaton is built only once, thread-safe
static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build XML escaper")
});

/// Escape XML special characters.
///
/// # Examples
///
/// ```
/// use xaml_rtf::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("<tag>\"hello\"</tag>"), "&lt;tag&gt;&quot;hello&quot;&lt;/tag&gt;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
}

/// Resolve entity and character references in attribute text.
///
/// Handles the five predefined entities and `&#N;`/`&#xH;` references.
/// Unknown entities, unterminated references and references to characters
/// XML forbids are `InvalidFormat`.
///
/// # Examples
///
/// ```
/// use xaml_rtf::common::xml::resolve_references;
/// assert_eq!(resolve_references("&lt;a &amp; b&gt;").unwrap(), "<a & b>");
/// assert_eq!(resolve_references("&#x41;&#66;").unwrap(), "AB");
/// assert!(resolve_references("&invalid;").is_err());
/// ```
pub fn resolve_references(s: &str) -> Result<Cow<'_, str>> {
    let Some(first) = memchr(b'&', s.as_bytes()) else {
        return Ok(Cow::Borrowed(s));
    };

    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..first]);
    let mut rest = &s[first..];
    while let Some(amp) = memchr(b'&', rest.as_bytes()) {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let Some(semi) = memchr(b';', after.as_bytes()) else {
            return Err(Error::format(format!("Unterminated reference in {:?}", s)));
        };
        let name = &after[..semi];
        match predefined_entity(name) {
            Some(ch) => out.push(ch),
            None if name.starts_with('#') => out.push(resolve_char_ref(name)?),
            None => return Err(Error::format(format!("Unknown entity &{};", name))),
        }
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(Cow::Owned(out))
}

/// Resolve a character reference name such as `#65` or `#x41`.
pub fn resolve_char_ref(name: &str) -> Result<char> {
    let digits = name
        .strip_prefix('#')
        .ok_or_else(|| Error::format(format!("Not a character reference: {}", name)))?;
    let code = match digits.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => digits.parse::<u32>(),
    };
    code.ok()
        .and_then(char::from_u32)
        .filter(|&c| is_xml_char(c))
        .ok_or_else(|| Error::format(format!("Invalid character reference &{};", name)))
}

/// Resolve a predefined XML entity name (`amp`, `lt`, ...) to its character.
#[inline]
pub fn predefined_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None,
    }
}

/// Whether `ch` may appear in an XML 1.0 document.
#[inline]
pub fn is_xml_char(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..)
}

/// Drop characters that XML 1.0 cannot represent.
///
/// RTF can carry arbitrary control bytes (`\'01`); they have no XML spelling.
pub fn strip_invalid_xml_chars(s: &str) -> Cow<'_, str> {
    if s.chars().all(is_xml_char) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.chars().filter(|&c| is_xml_char(c)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let raw = "if a < b && c > d then \"x\" else 'y'";
        assert_eq!(resolve_references(&escape_xml(raw)).unwrap(), raw);
    }

    #[test]
    fn test_malformed_references() {
        assert!(resolve_references("a & b").is_err());
        assert!(resolve_references("&#xZZ;").is_err());
        assert!(resolve_references("&#0;").is_err());
        assert!(resolve_references("&#xD800;").is_err());
        assert_eq!(resolve_references("plain").unwrap(), Cow::Borrowed("plain"));
    }

    #[test]
    fn test_strip_invalid_chars() {
        assert_eq!(strip_invalid_xml_chars("plain"), Cow::Borrowed("plain"));
        assert_eq!(strip_invalid_xml_chars("a\u{1}b\u{0}c"), "abc");
        assert_eq!(strip_invalid_xml_chars("tab\tok"), "tab\tok");
    }

    #[test]
    fn test_predefined_entity() {
        assert_eq!(predefined_entity("amp"), Some('&'));
        assert_eq!(predefined_entity("nbsp"), None);
    }
}
