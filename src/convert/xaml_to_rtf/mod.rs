//! XAML to RTF conversion.
//!
//! [`XamlToRtf`] is a [`ContentHandler`]: the XAML parser drives it with
//! element and text events and it writes RTF as they arrive. Formatting is
//! carried down the element tree as property snapshots, one per open
//! element. Inline elements become RTF groups; paragraphs reset paragraph
//! formatting with `\pard` and restate what they inherit.
//!
//! Font, color and list tables grow while the body is written and are put
//! in front of it when the document ends.
//!
//! # Example
//!
//! ```rust
//! use xaml_rtf::convert::{ConvertOptions, xaml_to_rtf};
//!
//! let rtf = xaml_to_rtf(r#"<Paragraph><Run FontWeight="Bold">Hi</Run></Paragraph>"#, &ConvertOptions::default())?;
//! assert!(rtf.contains(r"{\b Hi}"));
//! # Ok::<(), xaml_rtf::common::Error>(())
//! ```

mod list;
mod table;

use crate::common::encoding::codepage_to_encoding;
use crate::common::{Error, Result};
use crate::convert::ConvertOptions;
use crate::convert::props::{CellProps, CharProps, ParaProps};
use crate::rtf::picture::{bmp_to_dib, pixel_size};
use crate::rtf::{ColorTable, Font, FontFamily, FontTable, ImageType, RtfWriter, detect_image_type};
use crate::vocabulary::{self, AttrValue, AttributeKind, ElementKind, MarkerStyle, XAML_NAMESPACE};
use crate::xaml::{AttributeSet, ContentHandler};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use encoding_rs::Encoding;
use list::ListBuilder;
use std::borrow::Cow;
use table::{CellOutput, TableState};
use tracing::{debug, trace, warn};

/// Font size `\plain` resets to, in half-points.
const PLAIN_FONT_SIZE: i32 = 24;

/// What ending an element has to do.
#[derive(Debug, Clone)]
enum Close {
    Nothing,
    /// Close an inline group
    Group,
    /// Close the field groups of a hyperlink
    Hyperlink,
    Paragraph,
    Table,
    Row,
    Cell(CellProps),
    List,
    /// Table markup flattened into the enclosing cell
    Flattened,
}

/// State of one open element.
#[derive(Debug, Clone)]
struct Scope {
    kind: ElementKind,
    /// Character formatting in effect inside the element
    chars: CharProps,
    /// Paragraph formatting passed to contained paragraphs
    paras: ParaProps,
    /// `xml:space="preserve"` in effect
    preserve: bool,
    close: Close,
}

/// Formatting and content attributes of one element.
#[derive(Debug, Default)]
struct ElementProps {
    chars: CharProps,
    paras: ParaProps,
    cell: CellProps,
    uri: Option<String>,
    source: Option<String>,
    width: Option<i32>,
    height: Option<i32>,
    marker: Option<MarkerStyle>,
    preserve: Option<bool>,
}

/// A writer for the body or for one table cell.
#[derive(Debug, Default)]
struct Output {
    writer: RtfWriter,
    /// A cell paragraph ended; its `\par` waits until it is known whether
    /// another paragraph follows or the cell ends
    pending_par: bool,
}

#[derive(Debug, Clone, Copy)]
struct OpenParagraph {
    /// Scope count when the paragraph started
    depth: usize,
    /// Opened for inline content outside a `Paragraph`
    implicit: bool,
}

/// XAML to RTF converter.
///
/// Feed it to [`crate::xaml::parse`] and take the result with
/// [`XamlToRtf::into_rtf`]. One value converts one document.
pub struct XamlToRtf {
    options: ConvertOptions,
    encoding: &'static Encoding,
    fonts: FontTable,
    colors: ColorTable,
    lists: ListBuilder,
    /// Character formatting RTF implies without any control word
    base: CharProps,
    scopes: Vec<Scope>,
    /// Nesting depth inside a skipped element, zero when not skipping
    skipping: usize,
    body: Output,
    /// Open table cells, innermost last
    cells: Vec<Output>,
    tables: Vec<TableState>,
    /// Open tables flattened into a cell
    flattened: usize,
    paragraph: Option<OpenParagraph>,
    /// The last paragraph set character formatting that `\pard` keeps
    chars_dirty: bool,
    rtf: Option<String>,
}

impl XamlToRtf {
    pub fn new(options: ConvertOptions) -> Self {
        let mut fonts = FontTable::new();
        fonts.insert(0, Font::new(options.default_font.clone(), FontFamily::Nil, None));
        let base = CharProps {
            font_family: Some(options.default_font.clone()),
            font_size: Some(PLAIN_FONT_SIZE),
            ..Default::default()
        };
        Self {
            encoding: codepage_to_encoding(options.code_page).unwrap_or(encoding_rs::WINDOWS_1252),
            options,
            fonts,
            colors: ColorTable::new(),
            lists: ListBuilder::new(),
            base,
            scopes: Vec::new(),
            skipping: 0,
            body: Output::default(),
            cells: Vec::new(),
            tables: Vec::new(),
            flattened: 0,
            paragraph: None,
            chars_dirty: false,
            rtf: None,
        }
    }

    /// The finished RTF document.
    pub fn into_rtf(self) -> Result<String> {
        self.rtf
            .ok_or_else(|| Error::Unknown("XAML document was not completed".to_string()))
    }

    fn output(&mut self) -> &mut Output {
        match self.cells.last_mut() {
            Some(cell) => cell,
            None => &mut self.body,
        }
    }

    fn write(&mut self, w: RtfWriter) {
        self.output().writer.append(w);
    }

    fn write_text(&mut self, text: &str) {
        let encoding = self.encoding;
        self.output().writer.write_text(text, encoding);
    }

    /// Parse and validate an element's attributes, sorting each value to
    /// the property set it belongs to on this element.
    fn element_props(&self, kind: ElementKind, qname: &str, attributes: &AttributeSet) -> Result<ElementProps> {
        let mut props = ElementProps::default();
        match kind {
            ElementKind::Bold => props.chars.bold = Some(true),
            ElementKind::Italic => props.chars.italic = Some(true),
            ElementKind::Underline => {
                props.chars.decorations.get_or_insert_with(Default::default).underline = true;
            },
            _ => {},
        }

        for attr in attributes.iter() {
            let attr_kind = attr.kind();
            match attr_kind {
                AttributeKind::Unknown => {
                    if self.options.strict {
                        return Err(Error::parameter(format!(
                            "Unknown attribute {} on {}",
                            attr.qname, qname
                        )));
                    }
                    debug!("Dropping unknown attribute {} on {}", attr.qname, qname);
                    continue;
                },
                AttributeKind::XmlSpace => {
                    props.preserve = Some(attr.value.trim() == "preserve");
                    continue;
                },
                _ if !attr_kind.is_mapped() => {
                    trace!("Attribute {} has no RTF equivalent", attr.qname);
                    continue;
                },
                _ => {},
            }

            let desc = vocabulary::lookup_expanded(&attr.namespace_uri, &attr.local_name);
            let Some(value) = desc.parse(&attr.value) else {
                if self.options.strict {
                    return Err(Error::parameter(format!(
                        "Invalid {} value {:?} on {}",
                        attr.qname, attr.value, qname
                    )));
                }
                debug!("Dropping {}={:?} on {}: not expressible in RTF", attr.qname, attr.value, qname);
                continue;
            };

            let taken = match (kind, attr_kind, value) {
                (_, AttributeKind::NavigateUri, AttrValue::Text(uri)) => {
                    props.uri = Some(uri);
                    true
                },
                (ElementKind::Image, AttributeKind::Source, AttrValue::Text(source)) => {
                    props.source = Some(source);
                    true
                },
                (ElementKind::Image | ElementKind::TableColumn, AttributeKind::Width, AttrValue::Twips(w)) => {
                    props.width = Some(w);
                    true
                },
                (ElementKind::Image, AttributeKind::Height, AttrValue::Twips(h)) => {
                    props.height = Some(h);
                    true
                },
                (_, AttributeKind::MarkerStyle, AttrValue::Marker(m)) => {
                    props.marker = Some(m);
                    true
                },
                (kind, attr_kind, value) if kind.is_inline() || kind == ElementKind::Unknown => {
                    props.chars.apply(attr_kind, value)
                },
                (ElementKind::TableCell, attr_kind, value) => {
                    props.cell.apply(attr_kind, value.clone())
                        || props.paras.apply(attr_kind, value.clone())
                        || props.chars.apply(attr_kind, value)
                },
                (kind, attr_kind, value) if kind.is_block() => {
                    props.paras.apply(attr_kind, value.clone()) || props.chars.apply(attr_kind, value)
                },
                _ => false,
            };
            if !taken {
                trace!("Attribute {} does not apply to {}", attr.qname, qname);
            }
        }
        Ok(props)
    }

    /// Whether inline content may appear in the innermost element.
    fn accepts_inlines(&self) -> bool {
        let structural = self
            .scopes
            .iter()
            .rev()
            .map(|s| s.kind)
            .find(|k| *k != ElementKind::Unknown);
        !matches!(
            structural,
            Some(
                ElementKind::Table
                    | ElementKind::TableColumns
                    | ElementKind::TableColumn
                    | ElementKind::TableRowGroup
                    | ElementKind::TableRow
                    | ElementKind::List
                    | ElementKind::Image
            )
        )
    }

    /// How an element is handled where it appears. Elements that cannot
    /// appear here are made transparent.
    fn placement(&self, kind: ElementKind) -> ElementKind {
        let in_explicit_paragraph = self.paragraph.is_some_and(|p| !p.implicit);
        let in_table_markup = self.flattened > 0;
        let fits = match kind {
            ElementKind::Paragraph
            | ElementKind::BlockUIContainer
            | ElementKind::List
            | ElementKind::ListItem
            | ElementKind::Section
            | ElementKind::FlowDocument => !in_explicit_paragraph,
            ElementKind::Table => !in_explicit_paragraph,
            ElementKind::TableColumns | ElementKind::TableColumn | ElementKind::TableRowGroup => {
                !in_table_markup && !self.tables.is_empty()
            },
            ElementKind::TableRow => {
                !in_table_markup && self.tables.last().is_some_and(|t| !t.row_open()) && self.cells.is_empty()
            },
            ElementKind::TableCell => {
                !in_table_markup && self.tables.last().is_some_and(TableState::row_open) && self.cells.is_empty()
            },
            _ => true,
        };
        if fits {
            kind
        } else {
            debug!("{} is out of place, reading through it", kind.name());
            ElementKind::Unknown
        }
    }

    /// Open an implicit paragraph for inline content outside a `Paragraph`.
    fn ensure_paragraph(&mut self) {
        if self.paragraph.is_some() {
            return;
        }
        let (paras, chars) = match self.scopes.last() {
            Some(scope) => (scope.paras.clone(), scope.chars.clone()),
            None => (ParaProps::default(), self.base.clone()),
        };
        self.begin_paragraph(&paras, &chars, true);
    }

    fn begin_paragraph(&mut self, props: &ParaProps, chars: &CharProps, implicit: bool) {
        let list = self.lists.paragraph();
        let in_cell = !self.cells.is_empty();

        let mut w = RtfWriter::new();
        let out = self.output();
        if std::mem::take(&mut out.pending_par) {
            w.word("par");
        }
        w.word("pard");
        if in_cell {
            w.word("intbl");
        }
        if let Some(list) = &list {
            w.word_n("ls", list.ls);
            w.word_n("ilvl", list.level);
        }
        props.write_rtf(&mut w, &mut self.colors);
        if let Some(list) = &list
            && !props.has_margin()
            && props.first_indent.is_none()
        {
            w.word_n("fi", -360);
            w.word_n("li", 720 + 360 * list.level);
        }

        if self.chars_dirty {
            w.word("plain");
        }
        let own = chars.diff(&self.base);
        own.write_rtf(&self.base, &mut w, &mut self.fonts, &mut self.colors);
        self.chars_dirty = !own.is_empty();

        if let Some(marker) = list.and_then(|l| l.marker) {
            w.open_group();
            w.word("listtext");
            w.write_text(&marker, self.encoding);
            w.word("tab");
            w.close_group();
        }

        self.write(w);
        self.paragraph = Some(OpenParagraph {
            depth: self.scopes.len(),
            implicit,
        });
    }

    fn end_paragraph(&mut self) {
        if self.paragraph.take().is_none() {
            return;
        }
        if self.cells.is_empty() {
            self.body.writer.word("par");
        } else {
            self.output().pending_par = true;
        }
    }

    /// Close an implicit paragraph before block content starts.
    fn end_implicit_paragraph(&mut self) {
        if self.paragraph.is_some_and(|p| p.implicit) {
            self.end_paragraph();
        }
    }

    fn start_hyperlink(&mut self, uri: &str, own: &CharProps, current: &CharProps) {
        let instruction = match uri.strip_prefix('#') {
            Some(anchor) => format!("HYPERLINK \\l \"{}\"", anchor.replace('"', "%22")),
            None => format!("HYPERLINK \"{}\"", uri.replace('"', "%22")),
        };
        let mut w = RtfWriter::new();
        w.open_group();
        w.word("field");
        w.open_destination("fldinst");
        w.open_group();
        w.write_text(&instruction, self.encoding);
        w.close_group();
        w.close_group();
        w.open_group();
        w.word("fldrslt");
        w.open_group();
        own.write_rtf(current, &mut w, &mut self.fonts, &mut self.colors);
        self.write(w);
    }

    fn write_image(&mut self, props: &ElementProps) -> Result<()> {
        if !self.options.embed_images {
            debug!("Dropping image, image embedding is off");
            return Ok(());
        }
        let Some(source) = props.source.as_deref() else {
            debug!("Dropping image without Source");
            return Ok(());
        };
        let Some((mime, data)) = self.decode_data_uri(source)? else {
            warn!("Dropping image with a non-embedded source: {}", truncate(source, 64));
            return Ok(());
        };

        let image_type = match ImageType::from_mime_type(mime) {
            ImageType::Unknown => detect_image_type(&data),
            declared => declared,
        };
        let pixels = pixel_size(&data);
        let payload = match image_type {
            ImageType::Bmp => bmp_to_dib(&data),
            _ => &data[..],
        };

        let mut w = RtfWriter::new();
        w.open_group();
        w.word("pict");
        if let Some((word, param)) = image_type.control_word() {
            w.write_control_word(word, param);
        }
        let to_i32 = |v: u32| i32::try_from(v).unwrap_or(i32::MAX);
        if let Some((width, height)) = pixels {
            w.word_n("picw", to_i32(width));
            w.word_n("pich", to_i32(height));
        }
        let px_twips = |v: u32| to_i32(v).saturating_mul(crate::common::unit::TWIPS_PER_PX);
        if let Some(goal) = props.width.or(pixels.map(|(width, _)| px_twips(width))) {
            w.word_n("picwgoal", goal);
        }
        if let Some(goal) = props.height.or(pixels.map(|(_, height)| px_twips(height))) {
            w.word_n("pichgoal", goal);
        }
        w.write_hex_data(payload)?;
        w.close_group();
        trace!("Embedded {} image of {} bytes", image_type.mime_type(), payload.len());
        self.write(w);
        Ok(())
    }

    /// Split a `data:` URI into its media type and decoded bytes. `None`
    /// for other sources and for values that cannot be decoded leniently.
    fn decode_data_uri<'s>(&self, source: &'s str) -> Result<Option<(&'s str, Vec<u8>)>> {
        let Some(rest) = source
            .get(..5)
            .filter(|scheme| scheme.eq_ignore_ascii_case("data:"))
            .and_then(|_| source.get(5..))
        else {
            return Ok(None);
        };
        let Some((header, payload)) = rest.split_once(',') else {
            return Ok(None);
        };
        let Some(mime) = header.strip_suffix(";base64") else {
            debug!("Only base64 data URIs are embedded");
            return Ok(None);
        };
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        match BASE64.decode(compact.as_bytes()) {
            Ok(data) => Ok(Some((mime, data))),
            Err(err) if self.options.strict => Err(err.into()),
            Err(err) => {
                debug!("Dropping image with bad base64 data: {}", err);
                Ok(None)
            },
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

/// Collapse whitespace runs to one space, as XAML does outside
/// `xml:space="preserve"`.
fn collapse_whitespace(text: &str) -> Cow<'_, str> {
    let needs_work = text
        .as_bytes()
        .windows(2)
        .any(|w| w[0].is_ascii_whitespace() && w[1].is_ascii_whitespace())
        || text.bytes().any(|b| matches!(b, b'\t' | b'\r' | b'\n'));
    if !needs_work {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    Cow::Owned(out)
}

impl ContentHandler for XamlToRtf {
    fn start_document(&mut self) -> Result<()> {
        self.encoding = codepage_to_encoding(self.options.code_page).ok_or_else(|| {
            Error::parameter(format!("Unsupported code page {}", self.options.code_page))
        })?;
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        self.end_paragraph();
        let encoding = self.encoding;

        let mut w = RtfWriter::new();
        w.write_document_header(self.options.code_page, 0);
        w.write_font_table(&self.fonts, encoding);
        w.write_color_table(&self.colors);
        w.write_list_tables(self.lists.table(), encoding);
        w.append(std::mem::take(&mut self.body.writer));
        w.close_group();

        debug!(
            "Wrote RTF: {} font(s), {} color(s), {} list(s)",
            self.fonts.len(),
            self.colors.len(),
            self.lists.table().lists.len()
        );
        self.rtf = Some(w.into_string());
        Ok(())
    }

    fn start_prefix_mapping(&mut self, _prefix: &str, _uri: &str) -> Result<()> {
        Ok(())
    }

    fn start_element(
        &mut self,
        namespace_uri: &str,
        local_name: &str,
        qname: &str,
        attributes: &AttributeSet,
    ) -> Result<()> {
        if self.skipping > 0 {
            self.skipping += 1;
            return Ok(());
        }

        let mut kind = match namespace_uri {
            "" | XAML_NAMESPACE => ElementKind::lookup(local_name),
            _ => ElementKind::Unknown,
        };
        if kind == ElementKind::Unknown {
            if self.options.strict {
                return Err(Error::parameter(format!("Unknown element {}", qname)));
            }
            if local_name.contains('.') {
                debug!("Skipping property element {}", qname);
                self.skipping = 1;
                return Ok(());
            }
            debug!("Reading through unknown element {}", qname);
        }
        if kind.is_inline() && !self.accepts_inlines() {
            debug!("Skipping {} outside of flow content", qname);
            self.skipping = 1;
            return Ok(());
        }
        kind = self.placement(kind);

        let props = self.element_props(kind, qname, attributes)?;
        let (parent_chars, parent_paras, parent_preserve) = match self.scopes.last() {
            Some(scope) => (scope.chars.clone(), scope.paras.clone(), scope.preserve),
            None => {
                // The root's font is the document font
                if let Some(name) = &props.chars.font_family {
                    self.fonts.insert(0, Font::new(name.clone(), FontFamily::Nil, None));
                    self.base.font_family = Some(name.clone());
                }
                (self.base.clone(), ParaProps::default(), false)
            },
        };

        let mut chars = parent_chars.clone();
        chars.overlay(&props.chars);
        let mut paras = parent_paras.clone();
        let preserve = props.preserve.unwrap_or(parent_preserve);

        let close = match kind {
            ElementKind::FlowDocument | ElementKind::Section | ElementKind::ListItem | ElementKind::TableRowGroup => {
                self.end_implicit_paragraph();
                if kind == ElementKind::ListItem {
                    self.lists.start_item();
                }
                paras.inherit(&props.paras);
                Close::Nothing
            },
            ElementKind::Paragraph | ElementKind::BlockUIContainer => {
                self.end_implicit_paragraph();
                let mut own = ParaProps::default();
                own.inherit(&parent_paras);
                overlay_paras(&mut own, &props.paras);
                self.begin_paragraph(&own, &chars, false);
                Close::Paragraph
            },
            ElementKind::Run | ElementKind::Span | ElementKind::Bold | ElementKind::Italic | ElementKind::Underline => {
                self.ensure_paragraph();
                let own = chars.diff(&parent_chars);
                if own.is_empty() {
                    Close::Nothing
                } else {
                    let mut w = RtfWriter::new();
                    w.open_group();
                    own.write_rtf(&parent_chars, &mut w, &mut self.fonts, &mut self.colors);
                    self.write(w);
                    Close::Group
                }
            },
            ElementKind::Hyperlink => {
                self.ensure_paragraph();
                let own = chars.diff(&parent_chars);
                match &props.uri {
                    Some(uri) => {
                        self.start_hyperlink(uri, &own, &parent_chars);
                        Close::Hyperlink
                    },
                    None if own.is_empty() => Close::Nothing,
                    None => {
                        let mut w = RtfWriter::new();
                        w.open_group();
                        own.write_rtf(&parent_chars, &mut w, &mut self.fonts, &mut self.colors);
                        self.write(w);
                        Close::Group
                    },
                }
            },
            ElementKind::LineBreak => {
                self.ensure_paragraph();
                self.output().writer.word("line");
                Close::Nothing
            },
            ElementKind::InlineUIContainer => {
                self.ensure_paragraph();
                Close::Nothing
            },
            ElementKind::Image => {
                self.ensure_paragraph();
                self.write_image(&props)?;
                Close::Nothing
            },
            ElementKind::Table => {
                self.end_implicit_paragraph();
                paras.inherit(&props.paras);
                if self.cells.is_empty() {
                    self.tables.push(TableState::new(self.options.default_column_width));
                    Close::Table
                } else {
                    debug!("Nested table flattened into its cell");
                    self.flattened += 1;
                    Close::Flattened
                }
            },
            ElementKind::TableColumns => Close::Nothing,
            ElementKind::TableColumn => {
                if let Some(table) = self.tables.last_mut() {
                    table.push_column(props.width);
                }
                Close::Nothing
            },
            ElementKind::TableRow => {
                paras.inherit(&props.paras);
                if let Some(table) = self.tables.last_mut() {
                    table.start_row();
                }
                Close::Row
            },
            ElementKind::TableCell => {
                paras.inherit(&props.paras);
                self.cells.push(Output::default());
                Close::Cell(props.cell.clone())
            },
            ElementKind::List => {
                self.end_implicit_paragraph();
                paras.inherit(&props.paras);
                self.lists.open(props.marker.unwrap_or_default());
                Close::List
            },
            ElementKind::Unknown => Close::Nothing,
        };

        self.scopes.push(Scope {
            kind,
            chars,
            paras,
            preserve,
            close,
        });
        Ok(())
    }

    fn end_element(&mut self, _namespace_uri: &str, _local_name: &str, _qname: &str) -> Result<()> {
        if self.skipping > 0 {
            self.skipping -= 1;
            return Ok(());
        }
        let Some(scope) = self.scopes.pop() else {
            return Ok(());
        };
        if self.paragraph.is_some_and(|p| p.implicit && p.depth > self.scopes.len()) {
            self.end_paragraph();
        }

        match scope.close {
            Close::Nothing => {},
            Close::Group => self.output().writer.close_group(),
            Close::Hyperlink => {
                let w = &mut self.output().writer;
                for _ in 0..3 {
                    w.close_group();
                }
            },
            Close::Paragraph => self.end_paragraph(),
            Close::Table => {
                if let Some(table) = self.tables.pop() {
                    debug!("Wrote table with {} row(s)", table.rows());
                }
            },
            Close::Row => {
                if let Some(table) = self.tables.last_mut() {
                    let row = table.finish_row(&mut self.colors);
                    self.write(row);
                }
            },
            Close::Cell(props) => {
                if let Some(mut cell) = self.cells.pop() {
                    if cell.pending_par {
                        cell.writer.word("cell");
                    } else {
                        cell.writer.word("pard");
                        cell.writer.word("intbl");
                        cell.writer.word("cell");
                    }
                    if let Some(table) = self.tables.last_mut() {
                        table.push_cell(CellOutput {
                            props,
                            content: cell.writer,
                        });
                    }
                }
            },
            Close::List => self.lists.close(),
            Close::Flattened => self.flattened = self.flattened.saturating_sub(1),
        }
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        if self.skipping > 0 || text.is_empty() {
            return Ok(());
        }
        let preserve = self.scopes.last().is_some_and(|s| s.preserve);
        if self.paragraph.is_none() {
            if text.trim().is_empty() {
                return Ok(());
            }
            if !self.accepts_inlines() {
                debug!("Dropping text outside of flow content");
                return Ok(());
            }
            self.ensure_paragraph();
        }
        if preserve {
            self.write_text(text);
        } else {
            let text = collapse_whitespace(text);
            self.write_text(&text);
        }
        Ok(())
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<()> {
        if self.skipping > 0 || self.paragraph.is_none() {
            return Ok(());
        }
        if self.scopes.last().is_some_and(|s| s.preserve) {
            self.write_text(text);
        } else if !text.contains(['\n', '\r']) {
            // Spacing between inline elements
            self.write_text(" ");
        }
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, _data: &str) -> Result<()> {
        trace!("Ignoring processing instruction {}", target);
        Ok(())
    }

    fn skipped_entity(&mut self, name: &str) -> Result<()> {
        debug!("Dropping reference to unknown entity &{};", name);
        Ok(())
    }
}

/// Override the fields `own` sets.
fn overlay_paras(props: &mut ParaProps, own: &ParaProps) {
    let defaults = ParaProps::default();
    macro_rules! take {
        ($($field:ident),*) => {
            $(if own.$field != defaults.$field {
                props.$field = own.$field.clone();
            })*
        };
    }
    take!(
        alignment,
        left_indent,
        right_indent,
        space_before,
        space_after,
        first_indent,
        line_height,
        direction,
        background,
        borders,
        border_color
    );
}

/// Convert XAML markup to an RTF document.
pub fn xaml_to_rtf(input: &str, options: &ConvertOptions) -> Result<String> {
    let mut converter = XamlToRtf::new(options.clone());
    crate::xaml::parse(input, &mut converter)?;
    converter.into_rtf()
}
