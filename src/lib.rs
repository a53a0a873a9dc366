//! xaml-rtf - Bidirectional conversion between RTF documents and XAML flow content
//!
//! This library converts Rich Text Format documents into XAML flow content
//! (`Section`, `Paragraph`, `Run`, `Table`, `List`, ...) and back, the way
//! rich text controls exchange content with the clipboard and with files.
//!
//! # Features
//!
//! - **RTF tokenizer**: Streaming lexer for control words, groups, text and picture data
//! - **XAML reader**: Namespace-aware, SAX-style event parser over quick-xml
//! - **Shared vocabulary**: One table mapping XAML attributes to RTF control words
//! - **Tables, lists and hyperlinks**: Cell merges, list numbering and `HYPERLINK` fields
//! - **Embedded images**: Pictures become `data:` URIs and `data:` URIs become `\pict` groups
//! - **Result codes**: Every failure collapses to a small closed set of codes
//!
//! # Example - RTF to XAML
//!
//! ```rust
//! use xaml_rtf::{ConvertOptions, rtf_to_xaml};
//!
//! let xaml = rtf_to_xaml(br"{\rtf1\ansi Hello {\b world}\par}", &ConvertOptions::default())?;
//! assert!(xaml.contains(r#"<Run FontWeight="Bold">world</Run>"#));
//! # Ok::<(), xaml_rtf::Error>(())
//! ```
//!
//! # Example - XAML to RTF
//!
//! ```rust
//! use xaml_rtf::{ConvertOptions, xaml_to_rtf};
//!
//! let rtf = xaml_to_rtf(
//!     r#"<Paragraph TextAlignment="Center">Hello <Italic>world</Italic></Paragraph>"#,
//!     &ConvertOptions::default(),
//! )?;
//! assert!(rtf.starts_with(r"{\rtf1\ansi"));
//! assert!(rtf.contains(r"\pard\qc Hello {\i world}\par"));
//! # Ok::<(), xaml_rtf::Error>(())
//! ```
//!
//! # Example - Result codes
//!
//! ```rust
//! use xaml_rtf::{ConvertOptions, ErrorKind, convert_rtf_to_xaml};
//!
//! let mut output = String::new();
//! let status = convert_rtf_to_xaml(b"not rtf", &mut output, &ConvertOptions::default());
//! assert_eq!(status, ErrorKind::InvalidFormat);
//! assert!(output.is_empty());
//! ```

/// Errors, codepages, units and XML escaping
pub mod common;

/// RTF tokenizer, side tables, pictures and writer
pub mod rtf;

/// XAML tokenizer, event parser, tree builder and writer
pub mod xaml;

/// The XAML element and attribute vocabulary
pub mod vocabulary;

/// Conversion in both directions
pub mod convert;

// Re-export commonly used types for convenience
pub use common::{Error, ErrorKind, Result};
pub use convert::{
    ConvertOptions, RtfToXaml, XamlToRtf, convert_rtf_to_xaml, convert_xaml_to_rtf, rtf_to_xaml,
    rtf_to_xaml_tree, xaml_to_rtf,
};
