//! XAML flow content: tokenizer, push parser and event sinks.
//!
//! The pipeline is [`XamlLexer`] (markup to tokens, on top of `quick-xml`)
//! feeding [`parse`], which checks well-formedness, resolves namespaces and
//! entities, and calls a [`ContentHandler`]. Three handlers ship with the
//! crate: [`XamlWriter`] serializes events back to markup, [`TreeBuilder`]
//! collects an [`XamlElement`] tree, and the XAML to RTF converter in
//! [`crate::convert`].

pub mod attributes;
pub mod handler;
pub mod lexer;
mod parser;
pub mod tree;
pub mod writer;

pub use attributes::{Attribute, AttributeSet};
pub use handler::ContentHandler;
pub use lexer::{RawAttribute, XamlLexer, XamlToken};
pub use parser::parse;
pub use tree::{TreeBuilder, XamlElement, XamlNode};
pub use writer::XamlWriter;
