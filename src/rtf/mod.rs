//! RTF (Rich Text Format) building blocks.
//!
//! This module holds the format-level pieces both conversion directions
//! share: the tokenizer, the font/color/list tables, picture formats and the
//! text emitter.
//!
//! # Architecture
//!
//! - **Lexer**: Tokenizes RTF input into control words, symbols, text and picture data
//! - **Types**: Font, color and list tables, alignment and direction
//! - **Picture**: Image formats, signature detection and DIB/BMP framing
//! - **Writer**: Emits control words, groups and escaped text
//!
//! # Example
//!
//! ```rust
//! use xaml_rtf::rtf::{Lexer, Token};
//!
//! let mut lexer = Lexer::new(br"{\rtf1\b Hello}");
//! let tokens = lexer.tokenize()?;
//! assert_eq!(tokens.len(), 5);
//! assert_eq!(tokens[3], Token::Text(b"Hello"));
//! # Ok::<(), xaml_rtf::common::Error>(())
//! ```

pub mod lexer;
pub mod picture;
pub mod types;
pub mod writer;

// Re-exports
pub use lexer::{ControlWord, Lexer, Token};
pub use picture::{ImageType, Picture, detect_image_type};
pub use types::{
    Alignment, Color, ColorRef, ColorTable, Direction, DocumentInfo, Font, FontFamily, FontRef,
    FontTable, ListDefinition, ListLevel, ListTable,
};
pub use writer::RtfWriter;
