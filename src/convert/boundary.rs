//! Result-code entry points.
//!
//! Plugin hosts that cannot carry a rich error call these instead of
//! [`rtf_to_xaml`] and [`xaml_to_rtf`]. The output buffer receives the
//! converted document on success and is left empty on failure.

use super::{ConvertOptions, rtf_to_xaml, xaml_to_rtf};
use crate::common::{ErrorKind, Result};
use tracing::warn;

fn finish(result: Result<String>, output: &mut String) -> ErrorKind {
    output.clear();
    match result {
        Ok(converted) => {
            *output = converted;
            ErrorKind::None
        },
        Err(err) => {
            warn!("Conversion failed: {}", err);
            err.kind()
        },
    }
}

/// Convert RTF bytes to XAML into `output`.
pub fn convert_rtf_to_xaml(input: &[u8], output: &mut String, options: &ConvertOptions) -> ErrorKind {
    finish(rtf_to_xaml(input, options), output)
}

/// Convert XAML markup to RTF into `output`.
pub fn convert_xaml_to_rtf(input: &str, output: &mut String, options: &ConvertOptions) -> ErrorKind {
    finish(xaml_to_rtf(input, options), output)
}
