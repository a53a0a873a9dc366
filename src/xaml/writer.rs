//! Serialize content events back to XAML text.

use super::attributes::AttributeSet;
use super::handler::ContentHandler;
use crate::common::Result;
use crate::common::xml::{escape_xml, strip_invalid_xml_chars};

/// A [`ContentHandler`] that writes markup.
///
/// Elements with no content are written self-closing. Prefix mappings
/// announced before an element are written as `xmlns` declarations on it.
/// Characters XML cannot represent are dropped.
#[derive(Debug, Default)]
pub struct XamlWriter {
    out: String,
    /// Declarations waiting for the next start tag
    pending_namespaces: Vec<(String, String)>,
    /// A start tag is written up to its attributes, `>` still missing
    tag_open: bool,
}

impl XamlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Markup written so far.
    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }

    #[inline]
    fn finish_start_tag(&mut self) {
        if self.tag_open {
            self.out.push('>');
            self.tag_open = false;
        }
    }

    fn push_text(&mut self, text: &str) {
        self.finish_start_tag();
        self.out.push_str(&escape_xml(&strip_invalid_xml_chars(text)));
    }
}

impl ContentHandler for XamlWriter {
    fn start_document(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        self.finish_start_tag();
        Ok(())
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<()> {
        self.pending_namespaces.push((prefix.to_string(), uri.to_string()));
        Ok(())
    }

    fn start_element(
        &mut self,
        _namespace_uri: &str,
        _local_name: &str,
        qname: &str,
        attributes: &AttributeSet,
    ) -> Result<()> {
        self.finish_start_tag();
        self.out.push('<');
        self.out.push_str(qname);
        for (prefix, uri) in std::mem::take(&mut self.pending_namespaces) {
            if prefix.is_empty() {
                self.out.push_str(" xmlns=\"");
            } else {
                self.out.push_str(" xmlns:");
                self.out.push_str(&prefix);
                self.out.push_str("=\"");
            }
            self.out.push_str(&escape_xml(&uri));
            self.out.push('"');
        }
        for attr in attributes {
            self.out.push(' ');
            self.out.push_str(&attr.qname);
            self.out.push_str("=\"");
            self.out.push_str(&escape_xml(&strip_invalid_xml_chars(&attr.value)));
            self.out.push('"');
        }
        self.tag_open = true;
        Ok(())
    }

    fn end_element(&mut self, _namespace_uri: &str, _local_name: &str, qname: &str) -> Result<()> {
        if self.tag_open {
            self.out.push_str("/>");
            self.tag_open = false;
        } else {
            self.out.push_str("</");
            self.out.push_str(qname);
            self.out.push('>');
        }
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        if !text.is_empty() {
            self.push_text(text);
        }
        Ok(())
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<()> {
        self.characters(text)
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<()> {
        self.finish_start_tag();
        self.out.push_str("<?");
        self.out.push_str(target);
        if !data.is_empty() {
            self.out.push(' ');
            self.out.push_str(data);
        }
        self.out.push_str("?>");
        Ok(())
    }

    fn skipped_entity(&mut self, name: &str) -> Result<()> {
        self.finish_start_tag();
        self.out.push('&');
        self.out.push_str(name);
        self.out.push(';');
        Ok(())
    }
}
