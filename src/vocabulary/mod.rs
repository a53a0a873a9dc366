//! Attribute vocabulary: the fixed mapping between XAML attributes and RTF.
//!
//! Every XAML attribute the converters understand has one static
//! [`AttributeDescriptor`]: its names, declared value type, the RTF control
//! words that express it, and a parse/format function pair converting
//! between the XAML string and a typed [`AttrValue`]. Lookups go through a
//! perfect-hash map and are idempotent; names outside the vocabulary
//! resolve to the [`AttributeKind::Unknown`] descriptor.
//!
//! # Example
//!
//! ```rust
//! use xaml_rtf::vocabulary::{self, AttrValue, AttributeKind};
//!
//! let desc = vocabulary::lookup("FontSize");
//! assert_eq!(desc.kind, AttributeKind::FontSize);
//! assert_eq!(desc.rtf_words, &["fs"]);
//!
//! let value = desc.parse("16").unwrap();
//! assert_eq!(value, AttrValue::HalfPoints(24));
//! assert_eq!(desc.format(&value).as_deref(), Some("16"));
//!
//! assert_eq!(vocabulary::lookup("Foo").kind, AttributeKind::Unknown);
//! ```

mod elements;
pub mod values;

pub use elements::ElementKind;
pub use values::{Baseline, MarkerStyle, TextDecorations};

use crate::rtf::{Alignment, Color, Direction};
use phf::phf_map;
use values::*;

/// The XAML presentation namespace.
pub const XAML_NAMESPACE: &str = "http://schemas.microsoft.com/winfx/2006/xaml/presentation";

/// The namespace bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Known XAML attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    FontWeight,
    FontSize,
    FontStyle,
    FontFamily,
    FontStretch,
    Background,
    Foreground,
    FlowDirection,
    TextDecorations,
    TextAlignment,
    ColumnSpan,
    RowSpan,
    BorderThickness,
    BorderBrush,
    Margin,
    Padding,
    BaselineAlignment,
    BaselineOffset,
    NavigateUri,
    LineHeight,
    TextIndent,
    Source,
    Stretch,
    Width,
    Height,
    /// `Typography.Variants`
    TypographyVariants,
    /// `Language` or `xml:lang`
    Language,
    MarkerStyle,
    /// `xml:space`
    XmlSpace,
    /// Sentinel for names outside the vocabulary
    Unknown,
}

impl AttributeKind {
    /// Primary descriptor for this kind.
    pub fn descriptor(self) -> &'static AttributeDescriptor {
        DESCRIPTORS
            .iter()
            .find(|d| d.kind == self)
            .unwrap_or(&UNKNOWN)
    }

    /// Whether the attribute has an RTF counterpart at all.
    #[inline]
    pub fn is_mapped(self) -> bool {
        !self.descriptor().rtf_words.is_empty()
    }
}

/// Declared value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    FontWeight,
    FontSize,
    FontStyle,
    FontFamily,
    FontStretch,
    Brush,
    FlowDirection,
    TextDecorationCollection,
    TextAlignment,
    Int32,
    Thickness,
    BaselineAlignment,
    Length,
    Uri,
    ImageSource,
    Stretch,
    FontVariants,
    XmlLanguage,
    TextMarkerStyle,
    XmlSpace,
    /// Undeclared (unknown attributes)
    String,
}

impl ValueType {
    /// Type name as used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ValueType::FontWeight => "FontWeight",
            ValueType::FontSize => "FontSize",
            ValueType::FontStyle => "FontStyle",
            ValueType::FontFamily => "FontFamily",
            ValueType::FontStretch => "FontStretch",
            ValueType::Brush => "Brush",
            ValueType::FlowDirection => "FlowDirection",
            ValueType::TextDecorationCollection => "TextDecorationCollection",
            ValueType::TextAlignment => "TextAlignment",
            ValueType::Int32 => "Int32",
            ValueType::Thickness => "Thickness",
            ValueType::BaselineAlignment => "BaselineAlignment",
            ValueType::Length => "Double",
            ValueType::Uri => "Uri",
            ValueType::ImageSource => "ImageSource",
            ValueType::Stretch => "Stretch",
            ValueType::FontVariants => "FontVariants",
            ValueType::XmlLanguage => "XmlLanguage",
            ValueType::TextMarkerStyle => "TextMarkerStyle",
            ValueType::XmlSpace => "XmlSpace",
            ValueType::String => "String",
        }
    }
}

/// A parsed attribute value in RTF units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// `FontWeight` (bold) and `FontStyle` (italic)
    Bool(bool),
    /// `FontSize`
    HalfPoints(i32),
    /// `FontStretch` as a `\charscalex` percentage
    Percent(i32),
    /// Names and URIs carried verbatim
    Text(String),
    /// Brushes
    Color(Color),
    Direction(Direction),
    Decorations(TextDecorations),
    Alignment(Alignment),
    /// `ColumnSpan`/`RowSpan`
    Span(u16),
    /// Thickness edges in twips: left, top, right, bottom
    Edges([i32; 4]),
    /// Lengths in twips
    Twips(i32),
    Baseline(Baseline),
    /// Windows language identifier
    Lcid(u16),
    Marker(MarkerStyle),
}

/// Static description of one XAML attribute name.
#[derive(Debug)]
pub struct AttributeDescriptor {
    pub kind: AttributeKind,
    /// Namespace URI; empty for unprefixed attributes
    pub namespace_uri: &'static str,
    pub local_name: &'static str,
    pub qname: &'static str,
    pub value_type: ValueType,
    /// RTF control words expressing this attribute; empty when it has no
    /// RTF counterpart
    pub rtf_words: &'static [&'static str],
    parse_fn: fn(&str) -> Option<AttrValue>,
    format_fn: fn(&AttrValue) -> Option<String>,
}

impl AttributeDescriptor {
    /// Convert a XAML value string. `None` when the value is outside the
    /// domain RTF can express.
    #[inline]
    pub fn parse(&self, value: &str) -> Option<AttrValue> {
        (self.parse_fn)(value)
    }

    /// Canonical XAML spelling of a value. Values that would not parse
    /// back, such as negative extents, yield `None`.
    #[inline]
    pub fn format(&self, value: &AttrValue) -> Option<String> {
        (self.format_fn)(value).filter(|text| (self.parse_fn)(text).is_some())
    }
}

const fn entry(
    kind: AttributeKind,
    namespace_uri: &'static str,
    local_name: &'static str,
    qname: &'static str,
    value_type: ValueType,
    rtf_words: &'static [&'static str],
    parse_fn: fn(&str) -> Option<AttrValue>,
    format_fn: fn(&AttrValue) -> Option<String>,
) -> AttributeDescriptor {
    AttributeDescriptor {
        kind,
        namespace_uri,
        local_name,
        qname,
        value_type,
        rtf_words,
        parse_fn,
        format_fn,
    }
}

/// Plain attribute in the default (empty) namespace.
const fn plain(
    kind: AttributeKind,
    name: &'static str,
    value_type: ValueType,
    rtf_words: &'static [&'static str],
    parse_fn: fn(&str) -> Option<AttrValue>,
    format_fn: fn(&AttrValue) -> Option<String>,
) -> AttributeDescriptor {
    entry(kind, "", name, name, value_type, rtf_words, parse_fn, format_fn)
}

fn text_value(value: &str) -> Option<AttrValue> {
    let value = value.trim();
    (!value.is_empty()).then(|| AttrValue::Text(value.to_string()))
}

fn format_text(value: &AttrValue) -> Option<String> {
    match value {
        AttrValue::Text(text) => Some(text.clone()),
        _ => None,
    }
}

fn format_brush_value(value: &AttrValue) -> Option<String> {
    match value {
        AttrValue::Color(color) => Some(format_brush(*color)),
        _ => None,
    }
}

fn format_edges(value: &AttrValue) -> Option<String> {
    match value {
        AttrValue::Edges(edges) => Some(format_thickness(*edges)),
        _ => None,
    }
}

fn format_twips(value: &AttrValue) -> Option<String> {
    match value {
        AttrValue::Twips(twips) => Some(format_length(*twips)),
        _ => None,
    }
}

fn format_span(value: &AttrValue) -> Option<String> {
    match value {
        AttrValue::Span(n) => Some(n.to_string()),
        _ => None,
    }
}

fn format_direction(value: &AttrValue) -> Option<String> {
    match value {
        AttrValue::Direction(d) => Some(format_flow_direction(*d).to_string()),
        _ => None,
    }
}

fn no_value(_: &str) -> Option<AttrValue> {
    None
}

fn no_format(_: &AttrValue) -> Option<String> {
    None
}

static UNKNOWN: AttributeDescriptor = plain(
    AttributeKind::Unknown,
    "",
    ValueType::String,
    &[],
    no_value,
    no_format,
);

static DESCRIPTORS: [AttributeDescriptor; 30] = [
    plain(
        AttributeKind::FontWeight,
        "FontWeight",
        ValueType::FontWeight,
        &["b"],
        |v| parse_font_weight(v).map(AttrValue::Bool),
        |v| match v {
            AttrValue::Bool(b) => Some(format_font_weight(*b).to_string()),
            _ => None,
        },
    ),
    plain(
        AttributeKind::FontSize,
        "FontSize",
        ValueType::FontSize,
        &["fs"],
        |v| parse_font_size(v).map(AttrValue::HalfPoints),
        |v| match v {
            AttrValue::HalfPoints(hp) => format_font_size(*hp),
            _ => None,
        },
    ),
    plain(
        AttributeKind::FontStyle,
        "FontStyle",
        ValueType::FontStyle,
        &["i"],
        |v| parse_font_style(v).map(AttrValue::Bool),
        |v| match v {
            AttrValue::Bool(b) => Some(format_font_style(*b).to_string()),
            _ => None,
        },
    ),
    plain(
        AttributeKind::FontFamily,
        "FontFamily",
        ValueType::FontFamily,
        &["f", "fonttbl"],
        // Only the first face of a fallback list survives
        |v| text_value(v.split(',').next().unwrap_or_default()),
        format_text,
    ),
    plain(
        AttributeKind::FontStretch,
        "FontStretch",
        ValueType::FontStretch,
        &["charscalex"],
        |v| parse_font_stretch(v).map(AttrValue::Percent),
        |v| match v {
            AttrValue::Percent(p) => Some(format_font_stretch(*p).to_string()),
            _ => None,
        },
    ),
    plain(
        AttributeKind::Background,
        "Background",
        ValueType::Brush,
        &["highlight", "chcbpat", "cb", "cbpat", "clcbpat"],
        |v| parse_brush(v).map(AttrValue::Color),
        format_brush_value,
    ),
    plain(
        AttributeKind::Foreground,
        "Foreground",
        ValueType::Brush,
        &["cf"],
        |v| parse_brush(v).map(AttrValue::Color),
        format_brush_value,
    ),
    plain(
        AttributeKind::FlowDirection,
        "FlowDirection",
        ValueType::FlowDirection,
        &["ltrch", "rtlch", "ltrpar", "rtlpar"],
        |v| parse_flow_direction(v).map(AttrValue::Direction),
        format_direction,
    ),
    plain(
        AttributeKind::TextDecorations,
        "TextDecorations",
        ValueType::TextDecorationCollection,
        &["ul", "ulnone", "strike"],
        |v| parse_text_decorations(v).map(AttrValue::Decorations),
        |v| match v {
            AttrValue::Decorations(d) => Some(format_text_decorations(*d)),
            _ => None,
        },
    ),
    plain(
        AttributeKind::TextAlignment,
        "TextAlignment",
        ValueType::TextAlignment,
        &["ql", "qr", "qc", "qj"],
        |v| parse_text_alignment(v).map(AttrValue::Alignment),
        |v| match v {
            AttrValue::Alignment(a) => Some(format_text_alignment(*a).to_string()),
            _ => None,
        },
    ),
    plain(
        AttributeKind::ColumnSpan,
        "ColumnSpan",
        ValueType::Int32,
        &["clmgf", "clmrg"],
        |v| parse_span(v).map(AttrValue::Span),
        format_span,
    ),
    plain(
        AttributeKind::RowSpan,
        "RowSpan",
        ValueType::Int32,
        &["clvmgf", "clvmrg"],
        |v| parse_span(v).map(AttrValue::Span),
        format_span,
    ),
    plain(
        AttributeKind::BorderThickness,
        "BorderThickness",
        ValueType::Thickness,
        &[
            "brdrl", "brdrt", "brdrr", "brdrb", "clbrdrl", "clbrdrt", "clbrdrr", "clbrdrb",
            "brdrs", "brdrw",
        ],
        |v| {
            parse_thickness(v)
                .filter(|edges| edges.iter().all(|e| *e >= 0))
                .map(AttrValue::Edges)
        },
        format_edges,
    ),
    plain(
        AttributeKind::BorderBrush,
        "BorderBrush",
        ValueType::Brush,
        &["brdrcf"],
        |v| parse_brush(v).map(AttrValue::Color),
        format_brush_value,
    ),
    plain(
        AttributeKind::Margin,
        "Margin",
        ValueType::Thickness,
        &["li", "sb", "ri", "sa"],
        |v| parse_thickness(v).map(AttrValue::Edges),
        format_edges,
    ),
    plain(
        AttributeKind::Padding,
        "Padding",
        ValueType::Thickness,
        &["clpadl", "clpadt", "clpadr", "clpadb"],
        |v| {
            parse_thickness(v)
                .filter(|edges| edges.iter().all(|e| *e >= 0))
                .map(AttrValue::Edges)
        },
        format_edges,
    ),
    plain(
        AttributeKind::BaselineAlignment,
        "BaselineAlignment",
        ValueType::BaselineAlignment,
        &["up", "dn"],
        |v| parse_baseline_alignment(v).map(AttrValue::Baseline),
        |v| match v {
            AttrValue::Baseline(b) => Some(format_baseline_alignment(*b).to_string()),
            _ => None,
        },
    ),
    plain(
        AttributeKind::BaselineOffset,
        "BaselineOffset",
        ValueType::Length,
        &[],
        no_value,
        no_format,
    ),
    plain(
        AttributeKind::NavigateUri,
        "NavigateUri",
        ValueType::Uri,
        &["field", "fldinst", "fldrslt"],
        text_value,
        format_text,
    ),
    plain(
        AttributeKind::LineHeight,
        "LineHeight",
        ValueType::Length,
        &["sl", "slmult"],
        |v| parse_extent(v).filter(|t| *t > 0).map(AttrValue::Twips),
        format_twips,
    ),
    plain(
        AttributeKind::TextIndent,
        "TextIndent",
        ValueType::Length,
        &["fi"],
        |v| parse_length(v).map(AttrValue::Twips),
        format_twips,
    ),
    plain(
        AttributeKind::Source,
        "Source",
        ValueType::ImageSource,
        &["pict"],
        text_value,
        format_text,
    ),
    plain(
        AttributeKind::Stretch,
        "Stretch",
        ValueType::Stretch,
        &[],
        no_value,
        no_format,
    ),
    plain(
        AttributeKind::Width,
        "Width",
        ValueType::Length,
        &["picwgoal", "cellx"],
        |v| parse_extent(v).map(AttrValue::Twips),
        format_twips,
    ),
    plain(
        AttributeKind::Height,
        "Height",
        ValueType::Length,
        &["pichgoal"],
        |v| parse_extent(v).map(AttrValue::Twips),
        format_twips,
    ),
    plain(
        AttributeKind::TypographyVariants,
        "Typography.Variants",
        ValueType::FontVariants,
        &["super", "sub", "nosupersub"],
        |v| parse_font_variants(v).map(AttrValue::Baseline),
        |v| match v {
            AttrValue::Baseline(b) => Some(format_font_variants(*b).to_string()),
            _ => None,
        },
    ),
    plain(
        AttributeKind::Language,
        "Language",
        ValueType::XmlLanguage,
        &["lang"],
        |v| parse_language(v).map(AttrValue::Lcid),
        |v| match v {
            AttrValue::Lcid(lcid) => format_language(*lcid).map(str::to_string),
            _ => None,
        },
    ),
    entry(
        AttributeKind::Language,
        XML_NAMESPACE,
        "lang",
        "xml:lang",
        ValueType::XmlLanguage,
        &["lang"],
        |v| parse_language(v).map(AttrValue::Lcid),
        |v| match v {
            AttrValue::Lcid(lcid) => format_language(*lcid).map(str::to_string),
            _ => None,
        },
    ),
    plain(
        AttributeKind::MarkerStyle,
        "MarkerStyle",
        ValueType::TextMarkerStyle,
        &["ls", "levelnfc", "leveltext"],
        |v| MarkerStyle::parse(v).map(AttrValue::Marker),
        |v| match v {
            AttrValue::Marker(m) => Some(m.name().to_string()),
            _ => None,
        },
    ),
    entry(
        AttributeKind::XmlSpace,
        XML_NAMESPACE,
        "space",
        "xml:space",
        ValueType::XmlSpace,
        &[],
        no_value,
        no_format,
    ),
];

/// Qualified name to descriptor index.
static BY_NAME: phf::Map<&'static str, usize> = phf_map! {
    "FontWeight" => 0,
    "FontSize" => 1,
    "FontStyle" => 2,
    "FontFamily" => 3,
    "FontStretch" => 4,
    "Background" => 5,
    "Foreground" => 6,
    "FlowDirection" => 7,
    "TextDecorations" => 8,
    "TextAlignment" => 9,
    "ColumnSpan" => 10,
    "RowSpan" => 11,
    "BorderThickness" => 12,
    "BorderBrush" => 13,
    "Margin" => 14,
    "Padding" => 15,
    "BaselineAlignment" => 16,
    "BaselineOffset" => 17,
    "NavigateUri" => 18,
    "LineHeight" => 19,
    "TextIndent" => 20,
    "Source" => 21,
    "Stretch" => 22,
    "Width" => 23,
    "Height" => 24,
    "Typography.Variants" => 25,
    "Language" => 26,
    "xml:lang" => 27,
    "MarkerStyle" => 28,
    "xml:space" => 29,
};

/// Resolve an attribute by qualified name.
#[inline]
pub fn lookup(qname: &str) -> &'static AttributeDescriptor {
    BY_NAME
        .get(qname)
        .and_then(|&i| DESCRIPTORS.get(i))
        .unwrap_or(&UNKNOWN)
}

/// Resolve an attribute by namespace URI and local name.
pub fn lookup_expanded(namespace_uri: &str, local_name: &str) -> &'static AttributeDescriptor {
    match namespace_uri {
        "" | XAML_NAMESPACE => {
            let desc = lookup(local_name);
            if desc.namespace_uri.is_empty() { desc } else { &UNKNOWN }
        },
        XML_NAMESPACE => match local_name {
            "lang" => lookup("xml:lang"),
            "space" => lookup("xml:space"),
            _ => &UNKNOWN,
        },
        _ => &UNKNOWN,
    }
}

/// The attribute an RTF control word contributes to, if any.
pub fn for_control_word(word: &str) -> Option<AttributeKind> {
    DESCRIPTORS
        .iter()
        .find(|d| d.rtf_words.contains(&word))
        .map(|d| d.kind)
}

/// All known attribute descriptors.
#[inline]
pub fn descriptors() -> &'static [AttributeDescriptor] {
    &DESCRIPTORS
}
