use super::{groups_balance, section};
use crate::common::xml::escape_xml;
use crate::convert::{ConvertOptions, rtf_to_xaml, rtf_to_xaml_tree, xaml_to_rtf};
use crate::xaml::{self, TreeBuilder};
use proptest::prelude::*;

/// Fragments of RTF bodies, balanced or not.
fn fragment_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("{"),
        Just("}"),
        Just(r"\b "),
        Just(r"\b0 "),
        Just(r"\i "),
        Just(r"\par "),
        Just(r"\pard\qc "),
        Just(r"\line "),
        Just(r"\tab "),
        Just(r"\'e9"),
        Just(concat!(r"\", "u8364?")),
        Just(r"\~"),
        Just(r"\{"),
        Just(r"\\"),
        Just("text <&> "),
        Just(r"{\*\unknown skipped}"),
        Just(r#"{\field{\*\fldinst{HYPERLINK "x"}}{\fldrslt link}}"#),
        Just(r"\trowd\cellx1000 cell\cell\row "),
        Just(r"{\pict\pngblip 89504e47}"),
    ]
}

/// Paragraph text with RTF and XML specials and non-ASCII characters.
fn text_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9 {}\\\\<>&\"'.,\u{E9}\u{20AC}\u{3042}\u{1F600}\t]{0,30}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_rtf_output_is_well_formed(fragments in prop::collection::vec(fragment_strategy(), 0..24)) {
        let rtf = format!(r"{{\rtf1\ansi {}}}", fragments.concat());
        // Unbalanced input fails cleanly; anything accepted parses as XML
        if let Ok(xaml) = rtf_to_xaml(rtf.as_bytes(), &ConvertOptions::default()) {
            let mut builder = TreeBuilder::new();
            prop_assert!(xaml::parse(&xaml, &mut builder).is_ok(), "{}", xaml);
            prop_assert!(builder.into_root().is_some());
        }
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = rtf_to_xaml(&bytes, &ConvertOptions::default());
    }

    #[test]
    fn prop_generated_rtf_groups_balance(text in text_strategy(), bold in any::<bool>()) {
        let weight = if bold { "Bold" } else { "Normal" };
        let xaml = section(&format!(
            r#"<Paragraph><Run FontWeight="{}">{}</Run><LineBreak/>{}</Paragraph>"#,
            weight,
            escape_xml(&text),
            escape_xml(&text)
        ));
        let rtf = xaml_to_rtf(&xaml, &ConvertOptions::default()).unwrap();
        prop_assert!(rtf.is_ascii());
        prop_assert!(groups_balance(&rtf), "{}", rtf);
    }

    #[test]
    fn prop_preserved_text_round_trips(text in text_strategy()) {
        let xaml = section(&format!(
            r#"<Paragraph xml:space="preserve">{}</Paragraph>"#,
            escape_xml(&text)
        ));
        let options = ConvertOptions::default();
        let rtf = xaml_to_rtf(&xaml, &options).unwrap();
        let tree = rtf_to_xaml_tree(rtf.as_bytes(), &options).unwrap();
        prop_assert_eq!(tree.text(), text);
    }
}
