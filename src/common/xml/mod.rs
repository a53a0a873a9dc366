//! XML text utilities shared by the XAML tokenizer and writer.

mod escape;

pub use escape::{
    escape_xml, is_xml_char, predefined_entity, resolve_char_ref, resolve_references,
    strip_invalid_xml_chars,
};
