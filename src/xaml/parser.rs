//! Well-formedness and namespace driver over the XAML token stream.
//!
//! [`parse`] pulls tokens from [`XamlLexer`] and pushes events into a
//! [`ContentHandler`]. It owns everything the tokenizer leaves open: start
//! and end tag matching, a single root element, prefix resolution against
//! the in-scope `xmlns` declarations and entity resolution. Any violation is
//! reported as `InvalidFormat` before another callback fires.

use super::attributes::{Attribute, AttributeSet};
use super::handler::ContentHandler;
use super::lexer::{RawAttribute, XamlLexer, XamlToken};
use crate::common::xml::{predefined_entity, resolve_char_ref};
use crate::common::{Error, Result};
use crate::vocabulary::XML_NAMESPACE;
use smallvec::SmallVec;
use tracing::trace;

/// Namespace bound to the reserved `xmlns` prefix.
const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

struct OpenElement {
    qname: String,
    namespace_uri: String,
    local_name: String,
    /// Bindings introduced on this element, in declaration order
    declared: usize,
}

/// In-scope prefix bindings, innermost last.
#[derive(Default)]
struct Scopes {
    bindings: Vec<(String, String)>,
}

impl Scopes {
    fn resolve(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE);
        }
        self.bindings
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    fn resolve_element(&self, qname: &str) -> Result<(String, String)> {
        match qname.split_once(':') {
            Some((prefix, local)) => {
                let uri = self
                    .resolve(prefix)
                    .filter(|uri| !uri.is_empty())
                    .ok_or_else(|| Error::format(format!("Unbound prefix in <{}>", qname)))?;
                Ok((uri.to_string(), local.to_string()))
            },
            None => Ok((self.resolve("").unwrap_or_default().to_string(), qname.to_string())),
        }
    }

    /// Unprefixed attributes are in no namespace.
    fn resolve_attribute(&self, qname: &str) -> Result<(String, String)> {
        match qname.split_once(':') {
            Some(_) => self.resolve_element(qname),
            None => Ok((String::new(), qname.to_string())),
        }
    }
}

/// Parse `input` and push its events into `handler`.
///
/// # Example
///
/// ```rust
/// use xaml_rtf::xaml::{self, TreeBuilder};
///
/// let mut builder = TreeBuilder::new();
/// xaml::parse("<Paragraph>Hi</Paragraph>", &mut builder)?;
/// let root = builder.into_root().unwrap();
/// assert_eq!(root.local_name, "Paragraph");
/// assert_eq!(root.text(), "Hi");
/// # Ok::<(), xaml_rtf::common::Error>(())
/// ```
pub fn parse<H: ContentHandler + ?Sized>(input: &str, handler: &mut H) -> Result<()> {
    let mut lexer = XamlLexer::new(input);
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut scopes = Scopes::default();
    let mut seen_root = false;

    handler.start_document()?;
    loop {
        match lexer.next_token()? {
            XamlToken::StartElement {
                name,
                attributes,
                self_closing,
            } => {
                if stack.is_empty() && seen_root {
                    return Err(Error::format(format!("Second root element <{}>", name)));
                }
                seen_root = true;

                let (declarations, attributes) = split_declarations(attributes)?;
                for (prefix, uri) in &declarations {
                    scopes.bindings.push((prefix.clone(), uri.clone()));
                }
                let (namespace_uri, local_name) = scopes.resolve_element(&name)?;
                let mut set = AttributeSet::new();
                for raw in attributes {
                    let (uri, local) = scopes.resolve_attribute(&raw.name)?;
                    set.push(Attribute::new(uri, local, raw.name, raw.value))?;
                }

                for (prefix, uri) in &declarations {
                    handler.start_prefix_mapping(prefix, uri)?;
                }
                handler.start_element(&namespace_uri, &local_name, &name, &set)?;

                let open = OpenElement {
                    qname: name,
                    namespace_uri,
                    local_name,
                    declared: declarations.len(),
                };
                if self_closing {
                    close_element(handler, &mut scopes, open)?;
                } else {
                    stack.push(open);
                }
            },
            XamlToken::EndElement { name } => {
                let open = stack
                    .pop()
                    .ok_or_else(|| Error::format(format!("Unexpected </{}>", name)))?;
                if open.qname != name {
                    return Err(Error::format(format!(
                        "Expected </{}>, found </{}>",
                        open.qname, name
                    )));
                }
                close_element(handler, &mut scopes, open)?;
            },
            XamlToken::Characters(text) | XamlToken::CData(text) => {
                if stack.is_empty() {
                    return Err(Error::format("Character data outside the root element"));
                }
                handler.characters(&text)?;
            },
            XamlToken::Whitespace(text) => {
                if !stack.is_empty() {
                    handler.ignorable_whitespace(&text)?;
                }
            },
            XamlToken::Entity(name) => {
                if stack.is_empty() {
                    return Err(Error::format(format!("Reference &{}; outside the root element", name)));
                }
                if name.starts_with('#') {
                    let mut utf8 = [0u8; 4];
                    handler.characters(resolve_char_ref(&name)?.encode_utf8(&mut utf8))?;
                } else if let Some(ch) = predefined_entity(&name) {
                    let mut utf8 = [0u8; 4];
                    handler.characters(ch.encode_utf8(&mut utf8))?;
                } else {
                    trace!("Skipping entity &{};", name);
                    handler.skipped_entity(&name)?;
                }
            },
            XamlToken::ProcessingInstruction { target, data } => {
                handler.processing_instruction(&target, &data)?;
            },
            XamlToken::Comment(_) => {},
            XamlToken::Eof => {
                if let Some(open) = stack.last() {
                    return Err(Error::format(format!("Unclosed element <{}>", open.qname)));
                }
                if !seen_root {
                    return Err(Error::format("No root element"));
                }
                return handler.end_document();
            },
        }
    }
}

fn close_element<H: ContentHandler + ?Sized>(
    handler: &mut H,
    scopes: &mut Scopes,
    open: OpenElement,
) -> Result<()> {
    handler.end_element(&open.namespace_uri, &open.local_name, &open.qname)?;
    let keep = scopes.bindings.len() - open.declared;
    for (prefix, _) in scopes.bindings[keep..].iter().rev() {
        handler.end_prefix_mapping(prefix)?;
    }
    scopes.bindings.truncate(keep);
    Ok(())
}

type Declarations = SmallVec<[(String, String); 2]>;

/// Separate `xmlns` declarations from ordinary attributes.
fn split_declarations(attributes: Vec<RawAttribute>) -> Result<(Declarations, Vec<RawAttribute>)> {
    let mut declarations = Declarations::new();
    let mut rest = Vec::with_capacity(attributes.len());
    for attr in attributes {
        let prefix = if attr.name == "xmlns" {
            ""
        } else if let Some(prefix) = attr.name.strip_prefix("xmlns:") {
            prefix
        } else {
            rest.push(attr);
            continue;
        };

        let valid = match prefix {
            "xml" => attr.value == XML_NAMESPACE,
            "xmlns" => false,
            "" => attr.value != XML_NAMESPACE && attr.value != XMLNS_NAMESPACE,
            _ => {
                !attr.value.is_empty()
                    && attr.value != XML_NAMESPACE
                    && attr.value != XMLNS_NAMESPACE
            },
        };
        if !valid {
            return Err(Error::format(format!(
                "Invalid namespace declaration {}=\"{}\"",
                attr.name, attr.value
            )));
        }
        declarations.push((prefix.to_string(), attr.value));
    }
    Ok((declarations, rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorKind;

    /// Records events as strings.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl ContentHandler for Recorder {
        fn start_document(&mut self) -> Result<()> {
            self.events.push("start-doc".into());
            Ok(())
        }

        fn end_document(&mut self) -> Result<()> {
            self.events.push("end-doc".into());
            Ok(())
        }

        fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<()> {
            self.events.push(format!("map {}={}", prefix, uri));
            Ok(())
        }

        fn end_prefix_mapping(&mut self, prefix: &str) -> Result<()> {
            self.events.push(format!("unmap {}", prefix));
            Ok(())
        }

        fn start_element(
            &mut self,
            namespace_uri: &str,
            local_name: &str,
            _qname: &str,
            attributes: &AttributeSet,
        ) -> Result<()> {
            let attrs: Vec<_> = attributes
                .iter()
                .map(|a| format!(" {{{}}}{}={}", a.namespace_uri, a.local_name, a.value))
                .collect();
            self.events
                .push(format!("<{{{}}}{}{}>", namespace_uri, local_name, attrs.concat()));
            Ok(())
        }

        fn end_element(&mut self, _namespace_uri: &str, local_name: &str, _qname: &str) -> Result<()> {
            self.events.push(format!("</{}>", local_name));
            Ok(())
        }

        fn characters(&mut self, text: &str) -> Result<()> {
            self.events.push(format!("text {}", text));
            Ok(())
        }

        fn ignorable_whitespace(&mut self, text: &str) -> Result<()> {
            self.events.push(format!("ws {:?}", text));
            Ok(())
        }

        fn processing_instruction(&mut self, target: &str, data: &str) -> Result<()> {
            self.events.push(format!("pi {} {}", target, data));
            Ok(())
        }

        fn skipped_entity(&mut self, name: &str) -> Result<()> {
            self.events.push(format!("skip {}", name));
            Ok(())
        }
    }

    fn run(input: &str) -> Result<Vec<String>> {
        let mut recorder = Recorder::default();
        parse(input, &mut recorder)?;
        Ok(recorder.events)
    }

    #[test]
    fn test_event_order() {
        let events = run(r#"<Section xmlns="urn:x" xmlns:p="urn:p"><p:Run p:a="1" b="2">A&amp;B</p:Run><LineBreak/></Section>"#)
            .unwrap();
        assert_eq!(
            events,
            [
                "start-doc",
                "map =urn:x",
                "map p=urn:p",
                "<{urn:x}Section>",
                "<{urn:p}Run {urn:p}a=1 {}b=2>",
                "text A",
                "text &",
                "text B",
                "</Run>",
                "<{urn:x}LineBreak>",
                "</LineBreak>",
                "</Section>",
                "unmap p",
                "unmap ",
                "end-doc",
            ]
        );
    }

    #[test]
    fn test_xml_prefix_is_predeclared() {
        let events = run(r#"<a xml:space="preserve"> </a>"#).unwrap();
        assert_eq!(events[1], format!("<{{}}a {{{}}}space=preserve>", XML_NAMESPACE));
        assert_eq!(events[2], "ws \" \"");
    }

    #[test]
    fn test_entities_cdata_and_pi() {
        let events = run("<a>&#x263A;<![CDATA[<b>]]>&custom;<?target data?><!-- gone --></a>").unwrap();
        assert_eq!(events[2], "text \u{263A}");
        assert_eq!(events[3], "text <b>");
        assert_eq!(events[4], "skip custom");
        assert_eq!(events[5], "pi target data");
        assert_eq!(events[6], "</a>");
    }

    #[test]
    fn test_malformed_documents() {
        for input in [
            "<a></b>",
            "<a><b></a></b>",
            "<a>",
            "",
            "text<a/>",
            "<a/><b/>",
            "<p:a/>",
            r#"<a xmlns:p=""/>"#,
            r#"<a xmlns:xml="urn:other"/>"#,
            r#"<a b="1" b="2"/>"#,
            r#"<a xmlns:p="urn:x" xmlns:q="urn:x" p:b="1" q:b="2"/>"#,
            "<a>&#1;</a>",
        ] {
            let err = run(input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidFormat, "{:?}", input);
        }
    }

    #[test]
    fn test_whitespace_outside_root_is_ignored() {
        let events = run("\n<a/>\n").unwrap();
        assert_eq!(events, ["start-doc", "<{}a>", "</a>", "end-doc"]);
    }

    #[test]
    fn test_handler_error_aborts() {
        struct Refuse(usize);
        impl ContentHandler for Refuse {
            fn start_document(&mut self) -> Result<()> {
                Ok(())
            }
            fn end_document(&mut self) -> Result<()> {
                Ok(())
            }
            fn start_prefix_mapping(&mut self, _: &str, _: &str) -> Result<()> {
                Ok(())
            }
            fn start_element(&mut self, _: &str, _: &str, _: &str, _: &AttributeSet) -> Result<()> {
                self.0 += 1;
                Err(Error::parameter("refused"))
            }
            fn end_element(&mut self, _: &str, _: &str, _: &str) -> Result<()> {
                Ok(())
            }
            fn characters(&mut self, _: &str) -> Result<()> {
                Ok(())
            }
            fn ignorable_whitespace(&mut self, _: &str) -> Result<()> {
                Ok(())
            }
            fn processing_instruction(&mut self, _: &str, _: &str) -> Result<()> {
                Ok(())
            }
            fn skipped_entity(&mut self, _: &str) -> Result<()> {
                Ok(())
            }
        }

        let mut handler = Refuse(0);
        let err = parse("<a><b/><c/></a>", &mut handler).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert_eq!(handler.0, 1);
    }
}
