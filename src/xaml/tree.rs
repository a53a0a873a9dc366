//! In-memory element tree built from content events.

use super::attributes::AttributeSet;
use super::handler::ContentHandler;
use super::writer::XamlWriter;
use crate::common::Result;
use tracing::trace;

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XamlNode {
    Element(XamlElement),
    Text(String),
}

/// One element with its attributes and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XamlElement {
    pub namespace_uri: String,
    pub local_name: String,
    pub qname: String,
    pub attributes: AttributeSet,
    /// Namespace declarations made on this element
    pub namespaces: Vec<(String, String)>,
    pub children: Vec<XamlNode>,
}

impl XamlElement {
    /// Value of the attribute with the given qualified name.
    pub fn attribute(&self, qname: &str) -> Option<&str> {
        self.attributes.value_of(qname)
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &XamlElement> {
        self.children.iter().filter_map(|node| match node {
            XamlNode::Element(e) => Some(e),
            XamlNode::Text(_) => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, local_name: &str) -> Option<&XamlElement> {
        self.elements().find(|e| e.local_name == local_name)
    }

    /// All descendant elements with the given local name, in document order.
    pub fn descendants<'a>(&'a self, local_name: &str) -> Vec<&'a XamlElement> {
        let mut found = Vec::new();
        self.collect_descendants(local_name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, local_name: &str, found: &mut Vec<&'a XamlElement>) {
        for child in self.elements() {
            if child.local_name == local_name {
                found.push(child);
            }
            child.collect_descendants(local_name, found);
        }
    }

    /// Concatenated text of all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XamlNode::Text(text) => out.push_str(text),
                XamlNode::Element(e) => e.collect_text(out),
            }
        }
    }

    /// Push this element and its subtree into `handler` as a complete
    /// document.
    pub fn replay<H: ContentHandler + ?Sized>(&self, handler: &mut H) -> Result<()> {
        handler.start_document()?;
        self.replay_element(handler)?;
        handler.end_document()
    }

    fn replay_element<H: ContentHandler + ?Sized>(&self, handler: &mut H) -> Result<()> {
        for (prefix, uri) in &self.namespaces {
            handler.start_prefix_mapping(prefix, uri)?;
        }
        handler.start_element(&self.namespace_uri, &self.local_name, &self.qname, &self.attributes)?;
        for node in &self.children {
            match node {
                XamlNode::Element(e) => e.replay_element(handler)?,
                XamlNode::Text(text) if text.bytes().all(|b| b.is_ascii_whitespace()) => {
                    handler.ignorable_whitespace(text)?
                },
                XamlNode::Text(text) => handler.characters(text)?,
            }
        }
        handler.end_element(&self.namespace_uri, &self.local_name, &self.qname)?;
        for (prefix, _) in self.namespaces.iter().rev() {
            handler.end_prefix_mapping(prefix)?;
        }
        Ok(())
    }

    /// Serialize the subtree as markup.
    pub fn to_xaml(&self) -> Result<String> {
        let mut writer = XamlWriter::new();
        self.replay(&mut writer)?;
        Ok(writer.into_string())
    }
}

/// A [`ContentHandler`] that builds an [`XamlElement`] tree.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    stack: Vec<XamlElement>,
    pending_namespaces: Vec<(String, String)>,
    root: Option<XamlElement>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The completed root element, if a document was parsed.
    pub fn into_root(self) -> Option<XamlElement> {
        self.root
    }

    fn push_text(&mut self, text: &str) {
        let Some(parent) = self.stack.last_mut() else {
            return;
        };
        if let Some(XamlNode::Text(last)) = parent.children.last_mut() {
            last.push_str(text);
        } else {
            parent.children.push(XamlNode::Text(text.to_string()));
        }
    }
}

impl ContentHandler for TreeBuilder {
    fn start_document(&mut self) -> Result<()> {
        self.stack.clear();
        self.root = None;
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        Ok(())
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<()> {
        self.pending_namespaces.push((prefix.to_string(), uri.to_string()));
        Ok(())
    }

    fn start_element(
        &mut self,
        namespace_uri: &str,
        local_name: &str,
        qname: &str,
        attributes: &AttributeSet,
    ) -> Result<()> {
        self.stack.push(XamlElement {
            namespace_uri: namespace_uri.to_string(),
            local_name: local_name.to_string(),
            qname: qname.to_string(),
            attributes: attributes.clone(),
            namespaces: std::mem::take(&mut self.pending_namespaces),
            children: Vec::new(),
        });
        Ok(())
    }

    fn end_element(&mut self, _namespace_uri: &str, _local_name: &str, _qname: &str) -> Result<()> {
        if let Some(element) = self.stack.pop() {
            match self.stack.last_mut() {
                Some(parent) => parent.children.push(XamlNode::Element(element)),
                None => self.root = Some(element),
            }
        }
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        self.push_text(text);
        Ok(())
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<()> {
        self.push_text(text);
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, _data: &str) -> Result<()> {
        trace!("Dropping processing instruction {}", target);
        Ok(())
    }

    fn skipped_entity(&mut self, name: &str) -> Result<()> {
        trace!("Dropping entity reference &{};", name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xaml::parse;

    fn build(input: &str) -> XamlElement {
        let mut builder = TreeBuilder::new();
        parse(input, &mut builder).unwrap();
        builder.into_root().unwrap()
    }

    #[test]
    fn test_builds_tree() {
        let root = build(r#"<Section><Paragraph TextAlignment="Center">a<Run>b</Run>c</Paragraph><Paragraph/></Section>"#);
        assert_eq!(root.local_name, "Section");
        let paragraphs = root.descendants("Paragraph");
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].attribute("TextAlignment"), Some("Center"));
        assert_eq!(paragraphs[0].children.len(), 3);
        assert_eq!(paragraphs[0].child("Run").map(XamlElement::text).as_deref(), Some("b"));
        assert_eq!(root.text(), "abc");
    }

    #[test]
    fn test_adjacent_text_merges() {
        let root = build("<a>x&amp;y</a>");
        assert_eq!(root.children, vec![XamlNode::Text("x&y".into())]);
    }

    #[test]
    fn test_replay_round_trip() {
        let input = r#"<Section xmlns="urn:x" xml:space="preserve"><Paragraph> <Run>a</Run></Paragraph></Section>"#;
        let root = build(input);
        assert_eq!(root.namespaces, vec![(String::new(), "urn:x".to_string())]);
        assert_eq!(root.to_xaml().unwrap(), input);
    }
}
