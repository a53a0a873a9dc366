//! RTF and XAML conversion in both directions.
//!
//! - [`rtf_to_xaml`] reads an RTF document and writes XAML flow content
//!   rooted at a `Section`.
//! - [`xaml_to_rtf`] reads XAML flow content and writes a complete RTF
//!   document.
//!
//! Both directions translate formatting through the property snapshots in
//! [`props`] and the attribute vocabulary in [`crate::vocabulary`]. The
//! [`boundary`] functions wrap the two entry points for hosts that only
//! understand integer result codes.
//!
//! # Example
//!
//! ```rust
//! use xaml_rtf::convert::{ConvertOptions, rtf_to_xaml, xaml_to_rtf};
//!
//! let options = ConvertOptions::default();
//! let xaml = rtf_to_xaml(br"{\rtf1\ansi {\b bold}\par}", &options)?;
//! assert!(xaml.contains(r#"<Run FontWeight="Bold">bold</Run>"#));
//!
//! let rtf = xaml_to_rtf(&xaml, &options)?;
//! assert!(rtf.contains(r"{\b bold}"));
//! # Ok::<(), xaml_rtf::common::Error>(())
//! ```

pub mod boundary;
pub mod options;
pub mod props;
pub mod rtf_to_xaml;
pub mod xaml_to_rtf;

pub use boundary::{convert_rtf_to_xaml, convert_xaml_to_rtf};
pub use options::ConvertOptions;
pub use rtf_to_xaml::{RtfToXaml, rtf_to_xaml, rtf_to_xaml_tree};
pub use xaml_to_rtf::{XamlToRtf, xaml_to_rtf};

#[cfg(test)]
mod tests;
