//! Character, paragraph and cell property snapshots.
//!
//! Both converters translate through these: the RTF reader fills them from
//! control words and turns them into XAML attributes, the XAML reader fills
//! them from vocabulary values and writes them as control words. A `None`
//! field means "not set here", which is distinct from an explicit default
//! such as `FontWeight="Normal"`.

use crate::rtf::{Alignment, Color, ColorTable, ControlWord, Direction, FontTable, RtfWriter};
use crate::vocabulary::{AttrValue, AttributeKind, Baseline, TextDecorations};

/// `(qualified name, value)` pairs in vocabulary order.
pub type XamlAttributes = Vec<(&'static str, String)>;

/// Border edges, in vocabulary edge order.
pub const EDGE_COUNT: usize = 4;
const PARA_BORDER_WORDS: [&str; EDGE_COUNT] = ["brdrl", "brdrt", "brdrr", "brdrb"];
const CELL_BORDER_WORDS: [&str; EDGE_COUNT] = ["clbrdrl", "clbrdrt", "clbrdrr", "clbrdrb"];
const CELL_PADDING_WORDS: [&str; EDGE_COUNT] = ["clpadl", "clpadt", "clpadr", "clpadb"];
const CELL_PADDING_UNITS: [&str; EDGE_COUNT] = ["clpadfl", "clpadft", "clpadfr", "clpadfb"];

/// Width of a border whose `\brdrw` is missing: one pixel.
pub const DEFAULT_BORDER_WIDTH: i32 = 15;

fn push_attr(out: &mut XamlAttributes, kind: AttributeKind, value: AttrValue) {
    let desc = kind.descriptor();
    if let Some(text) = desc.format(&value) {
        out.push((desc.qname, text));
    }
}

/// Edge index of a paragraph (`\brdrl`...) or cell (`\clbrdrl`...) border word.
pub fn border_edge(word: &str) -> Option<(usize, bool)> {
    if let Some(edge) = PARA_BORDER_WORDS.iter().position(|w| *w == word) {
        return Some((edge, false));
    }
    CELL_BORDER_WORDS
        .iter()
        .position(|w| *w == word)
        .map(|edge| (edge, true))
}

fn write_border(w: &mut RtfWriter, side_word: &str, width: i32, color: Option<Color>, colors: &mut ColorTable) {
    w.word(side_word);
    w.word("brdrs");
    w.word_n("brdrw", width);
    if let Some(color) = color {
        w.word_n("brdrcf", i32::from(colors.intern(color)));
    }
}

/// Character formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharProps {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub decorations: Option<TextDecorations>,
    /// Half-points
    pub font_size: Option<i32>,
    pub font_family: Option<String>,
    /// `\charscalex` percentage
    pub stretch: Option<i32>,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub direction: Option<Direction>,
    /// `\up`/`\dn`
    pub baseline: Option<Baseline>,
    /// `\super`/`\sub`
    pub variants: Option<Baseline>,
    /// Windows language identifier
    pub language: Option<u16>,
}

macro_rules! char_fields {
    ($mac:ident) => {
        $mac!(
            bold,
            italic,
            decorations,
            font_size,
            font_family,
            stretch,
            foreground,
            background,
            direction,
            baseline,
            variants,
            language
        )
    };
}

impl CharProps {
    pub fn is_empty(&self) -> bool {
        *self == CharProps::default()
    }

    /// Set the field a vocabulary value maps to. Returns `false` when the
    /// attribute is not a character property.
    pub fn apply(&mut self, kind: AttributeKind, value: AttrValue) -> bool {
        match (kind, value) {
            (AttributeKind::FontWeight, AttrValue::Bool(b)) => self.bold = Some(b),
            (AttributeKind::FontStyle, AttrValue::Bool(b)) => self.italic = Some(b),
            (AttributeKind::TextDecorations, AttrValue::Decorations(d)) => self.decorations = Some(d),
            (AttributeKind::FontSize, AttrValue::HalfPoints(hp)) => self.font_size = Some(hp),
            (AttributeKind::FontFamily, AttrValue::Text(name)) => self.font_family = Some(name),
            (AttributeKind::FontStretch, AttrValue::Percent(p)) => self.stretch = Some(p),
            (AttributeKind::Foreground, AttrValue::Color(c)) => self.foreground = Some(c),
            (AttributeKind::Background, AttrValue::Color(c)) => self.background = Some(c),
            (AttributeKind::FlowDirection, AttrValue::Direction(d)) => self.direction = Some(d),
            (AttributeKind::BaselineAlignment, AttrValue::Baseline(b)) => self.baseline = Some(b),
            (AttributeKind::TypographyVariants, AttrValue::Baseline(b)) => self.variants = Some(b),
            (AttributeKind::Language, AttrValue::Lcid(lcid)) => self.language = Some(lcid),
            _ => return false,
        }
        true
    }

    /// Override fields with those set in `other`.
    pub fn overlay(&mut self, other: &CharProps) {
        macro_rules! overlay {
            ($($field:ident),*) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field.clone();
                })*
            };
        }
        char_fields!(overlay);
    }

    /// Fields set here whose value differs from `base`.
    pub fn diff(&self, base: &CharProps) -> CharProps {
        macro_rules! diff {
            ($($field:ident),*) => {
                CharProps {
                    $($field: self.$field.clone().filter(|v| base.$field.as_ref() != Some(v)),)*
                }
            };
        }
        let mut own = char_fields!(diff);
        // No decorations and an explicit "None" render the same
        own.decorations = own.decorations.filter(|d| *d != base.decorations.unwrap_or_default());
        own
    }

    /// Properties a paragraph can carry for all of its runs: the paragraph
    /// mark's value for every field that every run sets explicitly.
    pub fn hoist<'a, I>(mark: &CharProps, runs: I) -> CharProps
    where
        I: Iterator<Item = &'a CharProps> + Clone,
    {
        macro_rules! hoist {
            ($($field:ident),*) => {
                CharProps {
                    $($field: mark
                        .$field
                        .clone()
                        .filter(|_| runs.clone().all(|r| r.$field.is_some())),)*
                }
            };
        }
        char_fields!(hoist)
    }

    /// Apply an RTF character formatting word. Returns `false` for words
    /// that are not character formatting.
    pub fn apply_control_word(&mut self, word: &ControlWord<'_>, fonts: &FontTable, colors: &ColorTable) -> bool {
        match word.name {
            "plain" => *self = CharProps::default(),
            "b" => self.bold = Some(word.toggle()),
            "i" => self.italic = Some(word.toggle()),
            "ul" | "uld" | "uldash" | "uldb" | "ulth" | "ulw" | "ulwave" => {
                self.decorations.get_or_insert_with(TextDecorations::default).underline = word.toggle();
            },
            "ulnone" => {
                self.decorations.get_or_insert_with(TextDecorations::default).underline = false;
            },
            "strike" | "striked" => {
                self.decorations.get_or_insert_with(TextDecorations::default).strikethrough =
                    word.toggle();
            },
            "fs" => {
                // \fs0 and negative sizes keep the inherited size
                let size = word.param_or(24);
                if size > 0 {
                    self.font_size = Some(size);
                }
            },
            "f" => {
                self.font_family = u16::try_from(word.param_or(0))
                    .ok()
                    .and_then(|n| fonts.get(n))
                    .map(|font| font.name.clone());
            },
            "charscalex" => self.stretch = Some(word.param_or(100)),
            "cf" => self.foreground = color_param(word, colors),
            "highlight" | "cb" | "chcbpat" => self.background = color_param(word, colors),
            "rtlch" => self.direction = Some(Direction::RightToLeft),
            "ltrch" => self.direction = Some(Direction::LeftToRight),
            "super" => self.variants = Some(Baseline::Superscript),
            "sub" => self.variants = Some(Baseline::Subscript),
            "nosupersub" => self.variants = Some(Baseline::Baseline),
            "up" => {
                self.baseline = Some(if word.param_or(6) != 0 { Baseline::Superscript } else { Baseline::Baseline });
            },
            "dn" => {
                self.baseline = Some(if word.param_or(6) != 0 { Baseline::Subscript } else { Baseline::Baseline });
            },
            "lang" => self.language = u16::try_from(word.param_or(0)).ok().filter(|lcid| *lcid != 0),
            _ => return false,
        }
        true
    }

    /// XAML attributes for the fields that are set.
    pub fn attributes(&self) -> XamlAttributes {
        let mut out = XamlAttributes::new();
        if let Some(b) = self.bold {
            push_attr(&mut out, AttributeKind::FontWeight, AttrValue::Bool(b));
        }
        if let Some(hp) = self.font_size {
            push_attr(&mut out, AttributeKind::FontSize, AttrValue::HalfPoints(hp));
        }
        if let Some(i) = self.italic {
            push_attr(&mut out, AttributeKind::FontStyle, AttrValue::Bool(i));
        }
        if let Some(name) = &self.font_family {
            push_attr(&mut out, AttributeKind::FontFamily, AttrValue::Text(name.clone()));
        }
        if let Some(p) = self.stretch {
            push_attr(&mut out, AttributeKind::FontStretch, AttrValue::Percent(p));
        }
        if let Some(c) = self.background {
            push_attr(&mut out, AttributeKind::Background, AttrValue::Color(c));
        }
        if let Some(c) = self.foreground {
            push_attr(&mut out, AttributeKind::Foreground, AttrValue::Color(c));
        }
        if let Some(d) = self.direction {
            push_attr(&mut out, AttributeKind::FlowDirection, AttrValue::Direction(d));
        }
        if let Some(d) = self.decorations {
            push_attr(&mut out, AttributeKind::TextDecorations, AttrValue::Decorations(d));
        }
        if let Some(b) = self.baseline {
            push_attr(&mut out, AttributeKind::BaselineAlignment, AttrValue::Baseline(b));
        }
        if let Some(b) = self.variants {
            push_attr(&mut out, AttributeKind::TypographyVariants, AttrValue::Baseline(b));
        }
        if let Some(lcid) = self.language {
            push_attr(&mut out, AttributeKind::Language, AttrValue::Lcid(lcid));
        }
        out
    }

    /// Write the fields that are set as RTF control words, interning fonts
    /// and colors. `current` is the formatting already in effect; only the
    /// decoration flags that change relative to it are written.
    pub fn write_rtf(&self, current: &CharProps, w: &mut RtfWriter, fonts: &mut FontTable, colors: &mut ColorTable) {
        if let Some(name) = &self.font_family {
            w.word_n("f", i32::from(fonts.intern(name)));
        }
        if let Some(hp) = self.font_size {
            w.word_n("fs", hp);
        }
        if let Some(b) = self.bold {
            toggle(w, "b", b);
        }
        if let Some(i) = self.italic {
            toggle(w, "i", i);
        }
        if let Some(d) = self.decorations {
            let before = current.decorations.unwrap_or_default();
            if d.underline != before.underline {
                w.word(if d.underline { "ul" } else { "ulnone" });
            }
            if d.strikethrough != before.strikethrough {
                toggle(w, "strike", d.strikethrough);
            }
        }
        if let Some(p) = self.stretch {
            w.word_n("charscalex", p);
        }
        if let Some(c) = self.foreground {
            w.word_n("cf", i32::from(colors.intern(c)));
        }
        if let Some(c) = self.background {
            w.word_n("highlight", i32::from(colors.intern(c)));
        }
        if let Some(d) = self.direction {
            w.word(match d {
                Direction::LeftToRight => "ltrch",
                Direction::RightToLeft => "rtlch",
            });
        }
        match self.baseline {
            Some(Baseline::Superscript) => w.word_n("up", 6),
            Some(Baseline::Subscript) => w.word_n("dn", 6),
            Some(Baseline::Baseline) => w.word_n("up", 0),
            None => {},
        }
        match self.variants {
            Some(Baseline::Superscript) => w.word("super"),
            Some(Baseline::Subscript) => w.word("sub"),
            Some(Baseline::Baseline) => w.word("nosupersub"),
            None => {},
        }
        if let Some(lcid) = self.language {
            w.word_n("lang", i32::from(lcid));
        }
    }
}

#[inline]
fn toggle(w: &mut RtfWriter, word: &str, on: bool) {
    if on {
        w.word(word);
    } else {
        w.word_n(word, 0);
    }
}

/// Color table entry named by a word parameter; the auto entry is `None`.
fn color_param(word: &ControlWord<'_>, colors: &ColorTable) -> Option<Color> {
    u16::try_from(word.param_or(0))
        .ok()
        .and_then(|index| colors.get(index))
}

/// Paragraph formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParaProps {
    pub alignment: Option<Alignment>,
    /// `\li` in twips
    pub left_indent: Option<i32>,
    /// `\ri`
    pub right_indent: Option<i32>,
    /// `\sb`
    pub space_before: Option<i32>,
    /// `\sa`
    pub space_after: Option<i32>,
    /// `\fi`
    pub first_indent: Option<i32>,
    /// `\sl` magnitude in twips
    pub line_height: Option<i32>,
    pub direction: Option<Direction>,
    /// `\cbpat`
    pub background: Option<Color>,
    /// Border widths in twips, left, top, right, bottom; 0 for no border
    pub borders: [i32; EDGE_COUNT],
    pub border_color: Option<Color>,
    /// `\intbl`
    pub in_table: bool,
    /// `\ls`
    pub list: Option<i32>,
    /// `\ilvl`
    pub list_level: i32,
}

impl ParaProps {
    pub fn has_margin(&self) -> bool {
        self.left_indent.is_some()
            || self.right_indent.is_some()
            || self.space_before.is_some()
            || self.space_after.is_some()
    }

    /// Set the field a vocabulary value maps to. Returns `false` when the
    /// attribute is not a paragraph property.
    pub fn apply(&mut self, kind: AttributeKind, value: AttrValue) -> bool {
        match (kind, value) {
            (AttributeKind::TextAlignment, AttrValue::Alignment(a)) => self.alignment = Some(a),
            (AttributeKind::Margin, AttrValue::Edges([l, t, r, b])) => {
                self.left_indent = Some(l);
                self.space_before = Some(t);
                self.right_indent = Some(r);
                self.space_after = Some(b);
            },
            (AttributeKind::TextIndent, AttrValue::Twips(t)) => self.first_indent = Some(t),
            (AttributeKind::LineHeight, AttrValue::Twips(t)) => self.line_height = Some(t),
            (AttributeKind::FlowDirection, AttrValue::Direction(d)) => self.direction = Some(d),
            (AttributeKind::Background, AttrValue::Color(c)) => self.background = Some(c),
            (AttributeKind::BorderThickness, AttrValue::Edges(edges)) => self.borders = edges,
            (AttributeKind::BorderBrush, AttrValue::Color(c)) => self.border_color = Some(c),
            _ => return false,
        }
        true
    }

    /// Take the properties a block container passes down to its paragraphs.
    pub fn inherit(&mut self, parent: &ParaProps) {
        if parent.alignment.is_some() {
            self.alignment = parent.alignment;
        }
        if parent.line_height.is_some() {
            self.line_height = parent.line_height;
        }
        if parent.direction.is_some() {
            self.direction = parent.direction;
        }
    }

    /// Apply an RTF paragraph formatting word. Border words are routed by
    /// the caller, which knows the current border target.
    pub fn apply_control_word(&mut self, word: &ControlWord<'_>, colors: &ColorTable) -> bool {
        match word.name {
            "pard" => *self = ParaProps::default(),
            "ql" => self.alignment = Some(Alignment::Left),
            "qr" => self.alignment = Some(Alignment::Right),
            "qc" => self.alignment = Some(Alignment::Center),
            "qj" => self.alignment = Some(Alignment::Justify),
            "li" => self.left_indent = Some(word.param_or(0)),
            "ri" => self.right_indent = Some(word.param_or(0)),
            "sb" => self.space_before = Some(word.param_or(0)),
            "sa" => self.space_after = Some(word.param_or(0)),
            "fi" => self.first_indent = Some(word.param_or(0)),
            "sl" => {
                self.line_height = Some(word.param_or(0).saturating_abs()).filter(|t| *t != 0);
            },
            // Multiples of single spacing depend on the font; only exact
            // and minimum heights carry over
            "slmult" => {
                if word.param_or(0) != 0 {
                    self.line_height = None;
                }
            },
            "rtlpar" => self.direction = Some(Direction::RightToLeft),
            "ltrpar" => self.direction = Some(Direction::LeftToRight),
            "cbpat" => self.background = color_param(word, colors),
            "intbl" => self.in_table = true,
            "ls" => self.list = Some(word.param_or(0)),
            "ilvl" => self.list_level = word.param_or(0).clamp(0, 8),
            _ => return false,
        }
        true
    }

    /// XAML attributes for the fields that are set. List paragraphs leave
    /// their indentation to the list.
    pub fn attributes(&self) -> XamlAttributes {
        let mut out = XamlAttributes::new();
        if let Some(a) = self.alignment {
            push_attr(&mut out, AttributeKind::TextAlignment, AttrValue::Alignment(a));
        }
        let listed = self.list.is_some();
        if self.has_margin() && !(listed && self.space_before.is_none() && self.space_after.is_none()) {
            let left = if listed { 0 } else { self.left_indent.unwrap_or(0) };
            let edges = [
                left,
                self.space_before.unwrap_or(0),
                self.right_indent.unwrap_or(0),
                self.space_after.unwrap_or(0),
            ];
            push_attr(&mut out, AttributeKind::Margin, AttrValue::Edges(edges));
        }
        if let Some(t) = self.first_indent.filter(|_| !listed) {
            push_attr(&mut out, AttributeKind::TextIndent, AttrValue::Twips(t));
        }
        if let Some(t) = self.line_height {
            push_attr(&mut out, AttributeKind::LineHeight, AttrValue::Twips(t));
        }
        if let Some(d) = self.direction {
            push_attr(&mut out, AttributeKind::FlowDirection, AttrValue::Direction(d));
        }
        if let Some(c) = self.background {
            push_attr(&mut out, AttributeKind::Background, AttrValue::Color(c));
        }
        if self.borders.iter().any(|w| *w > 0) {
            push_attr(&mut out, AttributeKind::BorderThickness, AttrValue::Edges(self.borders));
            if let Some(c) = self.border_color {
                push_attr(&mut out, AttributeKind::BorderBrush, AttrValue::Color(c));
            }
        }
        out
    }

    /// Write the formatting fields as RTF control words. Table and list
    /// membership are written by the caller.
    pub fn write_rtf(&self, w: &mut RtfWriter, colors: &mut ColorTable) {
        if let Some(a) = self.alignment {
            w.word(a.control_word());
        }
        if self.has_margin() {
            w.word_n("li", self.left_indent.unwrap_or(0));
            w.word_n("sb", self.space_before.unwrap_or(0));
            w.word_n("ri", self.right_indent.unwrap_or(0));
            w.word_n("sa", self.space_after.unwrap_or(0));
        }
        if let Some(t) = self.first_indent {
            w.word_n("fi", t);
        }
        if let Some(t) = self.line_height {
            // Negative: exactly this height
            w.word_n("sl", -t);
            w.word_n("slmult", 0);
        }
        if let Some(d) = self.direction {
            w.word(match d {
                Direction::LeftToRight => "ltrpar",
                Direction::RightToLeft => "rtlpar",
            });
        }
        if let Some(c) = self.background {
            w.word_n("cbpat", i32::from(colors.intern(c)));
        }
        for (edge, width) in self.borders.iter().enumerate() {
            if *width > 0 {
                write_border(w, PARA_BORDER_WORDS[edge], *width, self.border_color, colors);
            }
        }
    }
}

/// Table cell formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellProps {
    pub column_span: u16,
    pub row_span: u16,
    /// `\clcbpat`
    pub background: Option<Color>,
    /// Border widths in twips, left, top, right, bottom
    pub borders: [i32; EDGE_COUNT],
    pub border_color: Option<Color>,
    /// Padding in twips, left, top, right, bottom
    pub padding: Option<[i32; EDGE_COUNT]>,
}

impl Default for CellProps {
    fn default() -> Self {
        Self {
            column_span: 1,
            row_span: 1,
            background: None,
            borders: [0; EDGE_COUNT],
            border_color: None,
            padding: None,
        }
    }
}

impl CellProps {
    /// Set the field a vocabulary value maps to. Returns `false` when the
    /// attribute is not a cell property.
    pub fn apply(&mut self, kind: AttributeKind, value: AttrValue) -> bool {
        match (kind, value) {
            (AttributeKind::ColumnSpan, AttrValue::Span(n)) => self.column_span = n,
            (AttributeKind::RowSpan, AttrValue::Span(n)) => self.row_span = n,
            (AttributeKind::Background, AttrValue::Color(c)) => self.background = Some(c),
            (AttributeKind::BorderThickness, AttrValue::Edges(edges)) => self.borders = edges,
            (AttributeKind::BorderBrush, AttrValue::Color(c)) => self.border_color = Some(c),
            (AttributeKind::Padding, AttrValue::Edges(edges)) => self.padding = Some(edges),
            _ => return false,
        }
        true
    }

    /// Apply an RTF cell definition word (shading and padding).
    pub fn apply_control_word(&mut self, word: &ControlWord<'_>, colors: &ColorTable) -> bool {
        if let Some(edge) = CELL_PADDING_WORDS.iter().position(|w| *w == word.name) {
            self.padding.get_or_insert([0; EDGE_COUNT])[edge] = word.param_or(0);
            return true;
        }
        match word.name {
            "clcbpat" => self.background = color_param(word, colors),
            name if CELL_PADDING_UNITS.contains(&name) => {},
            _ => return false,
        }
        true
    }

    pub fn attributes(&self) -> XamlAttributes {
        let mut out = XamlAttributes::new();
        if self.column_span > 1 {
            push_attr(&mut out, AttributeKind::ColumnSpan, AttrValue::Span(self.column_span));
        }
        if self.row_span > 1 {
            push_attr(&mut out, AttributeKind::RowSpan, AttrValue::Span(self.row_span));
        }
        if let Some(c) = self.background {
            push_attr(&mut out, AttributeKind::Background, AttrValue::Color(c));
        }
        if self.borders.iter().any(|w| *w > 0) {
            push_attr(&mut out, AttributeKind::BorderThickness, AttrValue::Edges(self.borders));
            if let Some(c) = self.border_color {
                push_attr(&mut out, AttributeKind::BorderBrush, AttrValue::Color(c));
            }
        }
        if let Some(edges) = self.padding {
            push_attr(&mut out, AttributeKind::Padding, AttrValue::Edges(edges));
        }
        out
    }

    /// Write shading, borders and padding. Merge flags and `\cellx` are
    /// written by the row writer.
    pub fn write_rtf(&self, w: &mut RtfWriter, colors: &mut ColorTable) {
        if let Some(c) = self.background {
            w.word_n("clcbpat", i32::from(colors.intern(c)));
        }
        for (edge, width) in self.borders.iter().enumerate() {
            if *width > 0 {
                write_border(w, CELL_BORDER_WORDS[edge], *width, self.border_color, colors);
            }
        }
        if let Some(edges) = self.padding {
            for (edge, twips) in edges.iter().enumerate() {
                w.word_n(CELL_PADDING_WORDS[edge], *twips);
                // Unit 3: twips
                w.word_n(CELL_PADDING_UNITS[edge], 3);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtf::Font;
    use crate::rtf::FontFamily;

    fn tables() -> (FontTable, ColorTable) {
        let mut fonts = FontTable::new();
        fonts.insert(0, Font::new("Arial", FontFamily::Swiss, None));
        fonts.insert(3, Font::new("Courier New", FontFamily::Modern, None));
        let mut colors = ColorTable::new();
        colors.push(None);
        colors.push(Some(Color::new(255, 0, 0)));
        (fonts, colors)
    }

    #[test]
    fn test_char_control_words() {
        let (fonts, colors) = tables();
        let mut props = CharProps::default();
        for word in [
            ControlWord::new("b", None),
            ControlWord::new("i", Some(0)),
            ControlWord::new("f", Some(3)),
            ControlWord::new("fs", Some(28)),
            ControlWord::new("cf", Some(1)),
            ControlWord::new("ul", None),
            ControlWord::new("strike", None),
            ControlWord::new("super", None),
        ] {
            assert!(props.apply_control_word(&word, &fonts, &colors), "{}", word.name);
        }
        assert_eq!(props.bold, Some(true));
        assert_eq!(props.italic, Some(false));
        assert_eq!(props.font_family.as_deref(), Some("Courier New"));
        assert_eq!(props.font_size, Some(28));
        assert_eq!(props.foreground, Some(Color::new(255, 0, 0)));
        assert_eq!(
            props.decorations,
            Some(TextDecorations {
                underline: true,
                strikethrough: true
            })
        );
        assert_eq!(props.variants, Some(Baseline::Superscript));

        assert!(props.apply_control_word(&ControlWord::new("cf", Some(0)), &fonts, &colors));
        assert_eq!(props.foreground, None);
        assert!(props.apply_control_word(&ControlWord::new("plain", None), &fonts, &colors));
        assert!(props.is_empty());
        assert!(!props.apply_control_word(&ControlWord::new("par", None), &fonts, &colors));
    }

    #[test]
    fn test_char_attributes() {
        let props = CharProps {
            bold: Some(true),
            font_size: Some(24),
            foreground: Some(Color::new(0x10, 0x20, 0x30)),
            ..Default::default()
        };
        assert_eq!(
            props.attributes(),
            vec![
                ("FontWeight", "Bold".to_string()),
                ("FontSize", "16".to_string()),
                ("Foreground", "#FF102030".to_string()),
            ]
        );
    }

    #[test]
    fn test_diff_and_hoist() {
        let bold = CharProps {
            bold: Some(true),
            ..Default::default()
        };
        let normal = CharProps {
            bold: Some(false),
            ..Default::default()
        };
        let unset = CharProps::default();

        let para = CharProps::hoist(&normal, [&bold, &normal].into_iter());
        assert_eq!(para, normal);
        assert_eq!(bold.diff(&para), bold);
        assert!(normal.diff(&para).is_empty());

        // One run leaves the field unset, so the paragraph cannot carry it
        let para = CharProps::hoist(&normal, [&bold, &unset].into_iter());
        assert!(para.is_empty());
    }

    #[test]
    fn test_overlay() {
        let mut base = CharProps {
            bold: Some(true),
            font_size: Some(20),
            ..Default::default()
        };
        base.overlay(&CharProps {
            font_size: Some(30),
            italic: Some(true),
            ..Default::default()
        });
        assert_eq!(base.bold, Some(true));
        assert_eq!(base.font_size, Some(30));
        assert_eq!(base.italic, Some(true));
    }

    #[test]
    fn test_char_write_rtf() {
        let mut fonts = FontTable::new();
        let mut colors = ColorTable::new();
        let props = CharProps {
            bold: Some(true),
            italic: Some(false),
            font_family: Some("Arial".into()),
            background: Some(Color::new(255, 255, 0)),
            baseline: Some(Baseline::Subscript),
            ..Default::default()
        };
        let mut w = RtfWriter::new();
        props.write_rtf(&CharProps::default(), &mut w, &mut fonts, &mut colors);
        assert_eq!(w.as_str(), "\\f0\\b\\i0\\highlight1\\dn6");
        assert_eq!(colors.len(), 2);
    }

    #[test]
    fn test_decorations_write_changed_flags_only() {
        let mut fonts = FontTable::new();
        let mut colors = ColorTable::new();
        let underline = CharProps {
            decorations: Some(TextDecorations {
                underline: true,
                strikethrough: false,
            }),
            ..Default::default()
        };

        let mut w = RtfWriter::new();
        underline.write_rtf(&CharProps::default(), &mut w, &mut fonts, &mut colors);
        assert_eq!(w.as_str(), "\\ul");

        // Replacing a strikethrough turns it off
        let struck = CharProps {
            decorations: Some(TextDecorations {
                underline: false,
                strikethrough: true,
            }),
            ..Default::default()
        };
        let mut w = RtfWriter::new();
        underline.write_rtf(&struck, &mut w, &mut fonts, &mut colors);
        assert_eq!(w.as_str(), "\\ul\\strike0");

        let none = CharProps {
            decorations: Some(TextDecorations::default()),
            ..Default::default()
        };
        assert!(none.diff(&CharProps::default()).is_empty());
        assert_eq!(none.diff(&struck), none);
    }

    #[test]
    fn test_para_round_trip_through_words() {
        let (_, colors) = tables();
        let mut props = ParaProps::default();
        for word in [
            ControlWord::new("qc", None),
            ControlWord::new("li", Some(150)),
            ControlWord::new("sa", Some(75)),
            ControlWord::new("sl", Some(-300)),
            ControlWord::new("slmult", Some(0)),
            ControlWord::new("cbpat", Some(1)),
        ] {
            assert!(props.apply_control_word(&word, &colors));
        }
        assert_eq!(
            props.attributes(),
            vec![
                ("TextAlignment", "Center".to_string()),
                ("Margin", "10,0,0,5".to_string()),
                ("LineHeight", "20".to_string()),
                ("Background", "#FFFF0000".to_string()),
            ]
        );

        let mut colors = ColorTable::new();
        let mut w = RtfWriter::new();
        props.write_rtf(&mut w, &mut colors);
        assert_eq!(w.as_str(), "\\qc\\li150\\sb0\\ri0\\sa75\\sl-300\\slmult0\\cbpat1");
    }

    #[test]
    fn test_list_paragraph_leaves_indent_to_list() {
        let props = ParaProps {
            left_indent: Some(720),
            first_indent: Some(-360),
            list: Some(1),
            ..Default::default()
        };
        assert!(props.attributes().is_empty());
    }

    #[test]
    fn test_cell_props() {
        let (_, colors) = tables();
        let mut cell = CellProps::default();
        assert!(cell.apply_control_word(&ControlWord::new("clpadl", Some(30)), &colors));
        assert!(cell.apply_control_word(&ControlWord::new("clpadfl", Some(3)), &colors));
        assert!(cell.apply_control_word(&ControlWord::new("clcbpat", Some(1)), &colors));
        assert!(cell.apply(AttributeKind::ColumnSpan, AttrValue::Span(2)));
        assert!(!cell.apply(AttributeKind::FontSize, AttrValue::HalfPoints(20)));
        assert_eq!(
            cell.attributes(),
            vec![
                ("ColumnSpan", "2".to_string()),
                ("Background", "#FFFF0000".to_string()),
                ("Padding", "2,0,0,0".to_string()),
            ]
        );

        let mut colors = ColorTable::new();
        let mut w = RtfWriter::new();
        cell.borders = [15, 0, 0, 0];
        cell.write_rtf(&mut w, &mut colors);
        assert_eq!(
            w.as_str(),
            "\\clcbpat1\\clbrdrl\\brdrs\\brdrw15\\clpadl30\\clpadfl3\\clpadt0\\clpadft3\\clpadr0\\clpadfr3\\clpadb0\\clpadfb3"
        );
    }

    #[test]
    fn test_border_edges() {
        assert_eq!(border_edge("brdrt"), Some((1, false)));
        assert_eq!(border_edge("clbrdrb"), Some((3, true)));
        assert_eq!(border_edge("brdrs"), None);
    }
}
