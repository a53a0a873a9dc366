//! End-to-end conversion tests across both directions.

mod property_tests;

use crate::convert::{ConvertOptions, rtf_to_xaml_tree, xaml_to_rtf};
use crate::vocabulary::XAML_NAMESPACE;
use crate::xaml::XamlElement;

/// Wrap flow content in a namespaced `Section`.
fn section(inner: &str) -> String {
    format!(r#"<Section xmlns="{}">{}</Section>"#, XAML_NAMESPACE, inner)
}

/// XAML to RTF and back to an element tree.
fn round_trip(xaml: &str) -> XamlElement {
    let options = ConvertOptions::default();
    let rtf = xaml_to_rtf(xaml, &options).unwrap();
    rtf_to_xaml_tree(rtf.as_bytes(), &options).unwrap_or_else(|e| panic!("{e}: {rtf}"))
}

/// Braces in `rtf` balance once escaped braces are skipped.
fn groups_balance(rtf: &str) -> bool {
    let mut depth = 0i64;
    let mut bytes = rtf.bytes();
    while let Some(b) = bytes.next() {
        match b {
            b'\\' => {
                bytes.next();
            },
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            },
            _ => {},
        }
    }
    depth == 0
}
