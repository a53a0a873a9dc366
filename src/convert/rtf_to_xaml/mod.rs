//! RTF to XAML conversion.
//!
//! The converter pulls tokens from the [`Lexer`] and keeps RTF's group
//! scoping as an explicit stack of [`GroupState`] snapshots: `{` saves a
//! copy of the current state, `}` restores it. Header destinations (fonts,
//! colors, lists) are captured into side tables; everything else the
//! document body does not show is skipped to the end of its group.
//!
//! Body text is collected into a small document model (paragraphs, tables,
//! lists) and emitted as content events once the document is complete, so
//! a table's column grid and a paragraph's attributes can depend on content
//! that follows them in the token stream.
//!
//! # Example
//!
//! ```rust
//! use xaml_rtf::convert::{ConvertOptions, rtf_to_xaml};
//!
//! let xaml = rtf_to_xaml(br"{\rtf1 Hello {\b World}\par}", &ConvertOptions::default())?;
//! assert!(xaml.contains(r#"<Run FontWeight="Bold">World</Run>"#));
//! # Ok::<(), xaml_rtf::common::Error>(())
//! ```

mod emit;
mod model;

use crate::common::encoding::codepage_to_encoding;
use crate::common::{Error, Result};
use crate::convert::ConvertOptions;
use crate::convert::props::{CharProps, DEFAULT_BORDER_WIDTH, ParaProps, EDGE_COUNT, border_edge};
use crate::rtf::picture::dib_to_bmp;
use crate::rtf::{
    Color, ColorTable, ControlWord, DocumentInfo, Font, FontFamily, FontRef, FontTable, ImageType,
    Lexer, ListDefinition, ListLevel, ListTable, Picture, Token,
};
use crate::vocabulary::{AttrValue, AttributeKind, ElementKind, XAML_NAMESPACE, XML_NAMESPACE};
use crate::xaml::{Attribute, AttributeSet, ContentHandler, TreeBuilder, XamlElement, XamlWriter};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use emit::Emitter;
use encoding_rs::Encoding;
use model::{Block, CellDef, ImageData, Inline, Merge, Paragraph, TableBuilder, group_lists};
use phf::phf_set;
use tracing::{debug, trace};

/// Destinations whose content never reaches the output.
static SKIPPED_DESTINATIONS: phf::Set<&'static str> = phf_set! {
    "stylesheet", "info", "header", "headerl", "headerr", "headerf", "footer",
    "footerl", "footerr", "footerf", "footnote", "annotation", "atnid",
    "atnauthor", "atndate", "atnref", "listtext", "pntext", "pn", "pnseclvl",
    "nonshppict", "shp", "shpinst", "shprslt", "sp", "sn", "sv", "themedata",
    "colorschememapping", "datastore", "latentstyles", "xmlnstbl", "rsidtbl",
    "generator", "mmathPr", "filetbl", "revtbl", "bkmkstart", "bkmkend",
    "template", "objdata", "objclass", "objname", "objalias", "objsect",
    "pgdsctbl", "protusertbl", "userprops", "docvar", "xe", "tc", "txe",
    "private", "wgrffmtfilter", "ftnsep", "ftnsepc", "ftncn", "aftnsep",
    "aftnsepc", "aftncn", "fchars", "lchars", "nesttableprops", "nonesttables",
    "listpicture", "blipuid", "background", "formfield", "datafield", "defchp",
    "defpap", "levelnumbers", "listname", "falt", "panose", "fname", "bkmkcolf",
    "bkmkcoll", "htmltag", "mhtmltag", "comment", "passwordhash", "ebcstart",
    "ebcend", "picprop",
};

/// What text and control words in the current group mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Destination {
    /// Document text
    Body,
    /// Consumed to the end of the group without output
    Skip,
    /// `\object`: skipped except for its `\result`
    Object,
    FontTable,
    ColorTable,
    ListTable,
    /// `\leveltext` of a list level
    LevelText,
    ListOverrideTable,
    /// `\fldinst` of a field
    FieldInstruction,
    /// `\pict` image data
    Picture,
    /// `\upr`: ANSI text whose `\ud` alternative is read instead
    Upr,
}

/// Formatting state saved and restored by groups.
#[derive(Debug, Clone)]
struct GroupState {
    destination: Destination,
    /// Destination `\ud` returns to inside `\upr`
    resume: Destination,
    chars: CharProps,
    paras: ParaProps,
    /// `\f` in effect, for the text codepage
    font: Option<FontRef>,
    /// `\v` hidden text
    hidden: bool,
    /// `\uc`: fallback characters following `\u`
    uc: usize,
}

impl Default for GroupState {
    fn default() -> Self {
        Self {
            destination: Destination::Body,
            resume: Destination::Body,
            chars: CharProps::default(),
            paras: ParaProps::default(),
            font: None,
            hidden: false,
            uc: 1,
        }
    }
}

/// An open `\field` group.
#[derive(Debug)]
struct FieldContext {
    /// Group depth of the `\field` group
    depth: usize,
    instruction: String,
    hyperlink: bool,
}

/// Where `\brdrw`, `\brdrcf` and border style words apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BorderTarget {
    None,
    Paragraph(usize),
    Cell(usize),
}

/// RTF to XAML converter.
///
/// One value converts one document: [`RtfToXaml::convert`] consumes it.
pub struct RtfToXaml {
    options: ConvertOptions,
    /// Current group state
    state: GroupState,
    /// States of the enclosing groups
    stack: Vec<GroupState>,
    info: DocumentInfo,
    fonts: FontTable,
    colors: ColorTable,
    lists: ListTable,
    /// Font table entry being read
    pending_font: Option<(FontRef, Font)>,
    /// Color table entry being read
    pending_color: Option<Color>,
    /// `\leveltext` being read
    level_text: String,
    /// Current row definition; survives groups
    row: Vec<CellDef>,
    /// Cell definition before its `\cellx`
    cell_def: CellDef,
    border: BorderTarget,
    fields: Vec<FieldContext>,
    /// Picture being read and the depth of its group
    picture: Option<(usize, Picture)>,
    /// Text bytes not yet decoded
    bytes: Vec<u8>,
    /// Fallback characters still to skip after `\u`
    skip: usize,
    high_surrogate: Option<u16>,
    /// The previous token was `\*`
    ignorable: bool,
    started: bool,
    paragraph: Paragraph,
    table: Option<TableBuilder>,
    blocks: Vec<Block>,
}

impl RtfToXaml {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            state: GroupState::default(),
            stack: Vec::new(),
            info: DocumentInfo::default(),
            fonts: FontTable::new(),
            colors: ColorTable::new(),
            lists: ListTable::new(),
            pending_font: None,
            pending_color: None,
            level_text: String::new(),
            row: Vec::new(),
            cell_def: CellDef::default(),
            border: BorderTarget::None,
            fields: Vec::new(),
            picture: None,
            bytes: Vec::new(),
            skip: 0,
            high_surrogate: None,
            ignorable: false,
            started: false,
            paragraph: Paragraph::default(),
            table: None,
            blocks: Vec::new(),
        }
    }

    /// Convert `input` and push the resulting XAML into `handler`.
    ///
    /// The document is read completely before the first event is sent, so
    /// a malformed input produces no events at all.
    pub fn convert<H: ContentHandler + ?Sized>(mut self, input: &[u8], handler: &mut H) -> Result<()> {
        let mut lexer = Lexer::new(input);
        loop {
            lexer.set_picture_mode(self.state.destination == Destination::Picture);
            let token = lexer.next_token()?;
            if token == Token::Eof {
                break;
            }
            self.handle(token)?;
        }
        if !self.started {
            return Err(Error::format("Input contains no RTF group"));
        }
        if !self.stack.is_empty() {
            return Err(Error::format(format!("{} group(s) left open", self.stack.len())));
        }
        self.finish_document()?;
        self.emit(handler)
    }

    fn handle(&mut self, token: Token<'_>) -> Result<()> {
        let ignorable = std::mem::take(&mut self.ignorable);

        if self.stack.is_empty() {
            return match token {
                Token::GroupStart => {
                    self.started = true;
                    self.push_state()
                },
                Token::Newline | Token::NullChar => Ok(()),
                _ if !self.started => Err(Error::format("RTF document must start with {")),
                Token::GroupEnd => Err(Error::format("Unbalanced group end")),
                other => {
                    trace!("Ignoring {} after the document group", other.kind_name());
                    Ok(())
                },
            };
        }

        match token {
            Token::GroupStart => {
                self.flush_text()?;
                self.push_state()
            },
            Token::GroupEnd => {
                self.flush_text()?;
                self.pop_state()
            },
            Token::Control(word) => {
                self.flush_text()?;
                if self.skip > 0 {
                    // A control word can stand in for a fallback character
                    self.skip -= 1;
                    return Ok(());
                }
                self.control(word, ignorable)
            },
            Token::Destination => {
                self.flush_text()?;
                self.ignorable = true;
                Ok(())
            },
            Token::TextSymbol(symbol) => {
                self.flush_text()?;
                if self.skip > 0 {
                    self.skip -= 1;
                    return Ok(());
                }
                match symbol {
                    '~' => self.deliver_text("\u{A0}"),
                    '-' => self.deliver_text("\u{AD}"),
                    '_' => self.deliver_text("\u{2011}"),
                    other => trace!("Ignoring control symbol \\{}", other),
                }
                Ok(())
            },
            Token::Hex(byte) => {
                if self.skip > 0 {
                    self.skip -= 1;
                } else {
                    self.bytes.push(byte);
                }
                Ok(())
            },
            Token::Text(mut text) => {
                if self.skip > 0 {
                    let n = self.skip.min(text.len());
                    self.skip -= n;
                    text = &text[n..];
                }
                self.bytes.try_reserve(text.len())?;
                self.bytes.extend_from_slice(text);
                Ok(())
            },
            Token::PictureData(data) => {
                if self.state.destination == Destination::Picture
                    && let Some((_, picture)) = &mut self.picture
                {
                    picture.data.try_reserve(data.len())?;
                    picture.data.extend_from_slice(&data);
                }
                Ok(())
            },
            Token::Newline | Token::NullChar | Token::Eof => Ok(()),
        }
    }

    fn push_state(&mut self) -> Result<()> {
        if self.stack.len() >= self.options.max_depth {
            return Err(Error::format(format!(
                "Group nesting deeper than {} levels",
                self.options.max_depth
            )));
        }
        self.stack.push(self.state.clone());
        self.skip = 0;
        Ok(())
    }

    fn pop_state(&mut self) -> Result<()> {
        if self.stack.len() == 1 {
            // The document group ends: its state is the final paragraph mark
            self.end_paragraph(false, false);
        }
        let Some(outer) = self.stack.pop() else {
            return Err(Error::format("Group end without matching group start"));
        };
        let inner = std::mem::replace(&mut self.state, outer);
        self.skip = 0;

        match inner.destination {
            Destination::FontTable => self.commit_font(),
            Destination::LevelText if self.state.destination != Destination::LevelText => {
                self.commit_level_text();
            },
            _ => {},
        }

        let depth = self.stack.len();
        while self.fields.last().is_some_and(|f| f.depth > depth) {
            if let Some(field) = self.fields.pop()
                && field.hyperlink
            {
                self.paragraph.close_hyperlink();
            }
        }
        if self.picture.as_ref().is_some_and(|(d, _)| *d > depth)
            && let Some((_, picture)) = self.picture.take()
        {
            self.finish_picture(picture)?;
        }
        Ok(())
    }

    /// Codepage decoder for text in the current group.
    fn encoding(&self) -> &'static Encoding {
        let font_page = match self.state.destination {
            Destination::FontTable => self.pending_font.as_ref().and_then(|(_, f)| f.code_page()),
            _ => self
                .state
                .font
                .or(self.info.default_font)
                .and_then(|f| self.fonts.get(f))
                .and_then(Font::code_page),
        };
        font_page
            .and_then(codepage_to_encoding)
            .or_else(|| codepage_to_encoding(self.info.code_page))
            .unwrap_or(encoding_rs::WINDOWS_1252)
    }

    /// Decode pending text bytes and deliver them.
    fn flush_text(&mut self) -> Result<()> {
        if self.bytes.is_empty() {
            return Ok(());
        }
        let bytes = std::mem::take(&mut self.bytes);
        let (text, _) = self.encoding().decode_without_bom_handling(&bytes);
        self.deliver_text(&text);
        Ok(())
    }

    fn deliver_text(&mut self, text: &str) {
        self.high_surrogate = None;
        match self.state.destination {
            Destination::Body => {
                if !self.state.hidden {
                    self.paragraph.push_text(&self.state.chars, text);
                }
            },
            Destination::FontTable => {
                for ch in text.chars() {
                    if ch == ';' {
                        self.commit_font();
                    } else if let Some((_, font)) = &mut self.pending_font {
                        font.name.push(ch);
                    }
                }
            },
            Destination::ColorTable => {
                for _ in text.matches(';') {
                    self.colors.push(self.pending_color.take());
                }
            },
            Destination::LevelText => self.level_text.push_str(text),
            Destination::FieldInstruction => {
                if let Some(field) = self.fields.last_mut() {
                    field.instruction.push_str(text);
                }
            },
            Destination::Skip
            | Destination::Object
            | Destination::ListTable
            | Destination::ListOverrideTable
            | Destination::Picture
            | Destination::Upr => {},
        }
    }

    fn commit_font(&mut self) {
        if let Some((index, mut font)) = self.pending_font.take() {
            let name = font.name.trim();
            if name.is_empty() {
                return;
            }
            font.name = name.to_string();
            trace!("Font {}: {}", index, font.name);
            self.fonts.insert(index, font);
        }
    }

    fn commit_level_text(&mut self) {
        let raw = std::mem::take(&mut self.level_text);
        // First character is the text length
        let mut chars = raw.chars();
        chars.next();
        let text = chars.as_str();
        let text = text.strip_suffix(';').unwrap_or(text);
        if let Some(level) = self.lists.lists.last_mut().and_then(|l| l.levels.last_mut()) {
            level.text = text.to_string();
        }
    }

    fn control(&mut self, word: ControlWord<'_>, ignorable: bool) -> Result<()> {
        match self.state.destination {
            Destination::Skip => return Ok(()),
            Destination::Upr => {
                if word.name == "ud" {
                    self.state.destination = self.state.resume;
                }
                return Ok(());
            },
            _ => {},
        }

        if self.enter_destination(&word, ignorable) {
            return Ok(());
        }

        // Words meaningful in every destination
        match word.name {
            "u" => {
                self.unicode(word.param_or(0));
                return Ok(());
            },
            "uc" => {
                self.state.uc = usize::try_from(word.param_or(1)).unwrap_or(0);
                return Ok(());
            },
            _ => {},
        }
        if let Some(symbol) = symbol_char(word.name) {
            let mut buf = [0u8; 4];
            self.deliver_text(symbol.encode_utf8(&mut buf));
            return Ok(());
        }

        match self.state.destination {
            Destination::Body => self.body_word(word),
            Destination::FontTable => self.font_word(word),
            Destination::ColorTable => self.color_word(word),
            Destination::ListTable | Destination::LevelText => self.list_word(word),
            Destination::ListOverrideTable => self.override_word(word),
            Destination::Picture => self.picture_word(word),
            Destination::FieldInstruction | Destination::Object | Destination::Skip | Destination::Upr => {},
        }
        Ok(())
    }

    /// Switch destination for a destination word. Returns `false` when the
    /// word is not one.
    fn enter_destination(&mut self, word: &ControlWord<'_>, ignorable: bool) -> bool {
        let current = self.state.destination;
        let next = match word.name {
            "fonttbl" => Destination::FontTable,
            "colortbl" => Destination::ColorTable,
            "listtable" => Destination::ListTable,
            "listoverridetable" => Destination::ListOverrideTable,
            "leveltext" if current == Destination::ListTable => {
                self.level_text.clear();
                Destination::LevelText
            },
            "object" => Destination::Object,
            "result" if current == Destination::Object => Destination::Body,
            "pict" => {
                self.picture = Some((self.stack.len(), Picture::default()));
                Destination::Picture
            },
            "fldinst" => Destination::FieldInstruction,
            "fldrslt" => {
                let target = self.fields.last_mut().and_then(|field| {
                    let target = hyperlink_target(&field.instruction)?;
                    field.hyperlink = true;
                    Some(target)
                });
                if let Some(uri) = target {
                    self.paragraph.open_hyperlink(uri);
                }
                Destination::Body
            },
            "upr" => {
                self.state.resume = current;
                Destination::Upr
            },
            // Shape pictures are read like any other picture
            "shppict" => return true,
            name if SKIPPED_DESTINATIONS.contains(name) => Destination::Skip,
            name if ignorable => {
                trace!("Skipping unknown destination \\*\\{}", name);
                Destination::Skip
            },
            _ => return false,
        };
        if next == Destination::Skip {
            trace!("Skipping destination \\{}", word.name);
        }
        self.state.destination = next;
        true
    }

    fn unicode(&mut self, param: i32) {
        self.skip = self.state.uc;
        let Ok(unit) = u16::try_from(if param < 0 { param + 0x10000 } else { param }) else {
            return;
        };
        match unit {
            0xD800..=0xDBFF => self.high_surrogate = Some(unit),
            0xDC00..=0xDFFF => {
                let decoded = self
                    .high_surrogate
                    .take()
                    .and_then(|high| char::decode_utf16([high, unit]).next())
                    .and_then(|r| r.ok());
                if let Some(ch) = decoded {
                    let mut buf = [0u8; 4];
                    self.deliver_text(ch.encode_utf8(&mut buf));
                }
            },
            _ => {
                if let Some(ch) = char::from_u32(u32::from(unit)) {
                    let mut buf = [0u8; 4];
                    self.deliver_text(ch.encode_utf8(&mut buf));
                }
            },
        }
    }

    fn body_word(&mut self, word: ControlWord<'_>) {
        match word.name {
            "par" => self.end_paragraph(true, false),
            "page" | "sect" => self.end_paragraph(false, false),
            "line" => {
                if !self.state.hidden {
                    self.paragraph.push_inline(Inline::LineBreak);
                }
            },
            "tab" => self.deliver_text("\t"),
            "cell" => {
                self.end_paragraph(true, true);
                self.table.get_or_insert_with(TableBuilder::new).end_cell(&self.lists);
            },
            // Nested tables are flattened into the enclosing cell
            "nestcell" => self.end_paragraph(false, true),
            "nestrow" => {},
            "row" => {
                self.end_paragraph(false, true);
                let row = &self.row;
                self.table.get_or_insert_with(TableBuilder::new).end_row(row, &self.lists);
            },
            "trowd" => {
                self.row.clear();
                self.cell_def = CellDef::default();
                self.border = BorderTarget::None;
            },
            "cellx" => {
                let mut def = std::mem::take(&mut self.cell_def);
                def.right = Some(word.param_or(0));
                self.row.push(def);
                self.border = BorderTarget::None;
            },
            "clmgf" => self.cell_def.h_merge = Merge::First,
            "clmrg" => self.cell_def.h_merge = Merge::Continue,
            "clvmgf" => self.cell_def.v_merge = Merge::First,
            "clvmrg" => self.cell_def.v_merge = Merge::Continue,
            "field" => self.fields.push(FieldContext {
                depth: self.stack.len(),
                instruction: String::new(),
                hyperlink: false,
            }),
            "ansi" => self.info.code_page = 1252,
            "mac" => self.info.code_page = 10000,
            "pc" => self.info.code_page = 437,
            "pca" => self.info.code_page = 850,
            "ansicpg" => {
                if let Ok(cp) = u32::try_from(word.param_or(0)) {
                    self.info.code_page = cp;
                }
            },
            "deff" => self.info.default_font = u16::try_from(word.param_or(0)).ok(),
            "v" => self.state.hidden = word.toggle(),
            name => {
                if self.border_word(&word) {
                    return;
                }
                if name == "f" {
                    self.state.font = u16::try_from(word.param_or(0)).ok();
                } else if name == "plain" {
                    self.state.font = None;
                    self.state.hidden = false;
                }
                if self.state.chars.apply_control_word(&word, &self.fonts, &self.colors) {
                    return;
                }
                if name == "pard" {
                    self.border = BorderTarget::None;
                }
                if self.state.paras.apply_control_word(&word, &self.colors) {
                    return;
                }
                if self.cell_def.props.apply_control_word(&word, &self.colors) {
                    return;
                }
                trace!("Ignoring control word \\{}", name);
            },
        }
    }

    /// Border side, style, width and color words.
    fn border_word(&mut self, word: &ControlWord<'_>) -> bool {
        if let Some((edge, cell)) = border_edge(word.name) {
            self.border = if cell { BorderTarget::Cell(edge) } else { BorderTarget::Paragraph(edge) };
            if let Some(width) = self.border_width()
                && *width == 0
            {
                *width = DEFAULT_BORDER_WIDTH;
            }
            return true;
        }
        match word.name {
            "brdrw" => {
                let param = word.param_or(DEFAULT_BORDER_WIDTH).max(0);
                if let Some(width) = self.border_width() {
                    *width = param;
                }
            },
            "brdrnone" => {
                if let Some(width) = self.border_width() {
                    *width = 0;
                }
            },
            "brdrcf" => {
                let color = u16::try_from(word.param_or(0)).ok().and_then(|i| self.colors.get(i));
                match self.border {
                    BorderTarget::Paragraph(_) => self.state.paras.border_color = color,
                    BorderTarget::Cell(_) => self.cell_def.props.border_color = color,
                    BorderTarget::None => {},
                }
            },
            "box" => {
                self.state.paras.borders = [DEFAULT_BORDER_WIDTH; EDGE_COUNT];
                self.border = BorderTarget::None;
            },
            // Line styles: any style draws the border
            name if name.starts_with("brdr") => {},
            _ => return false,
        }
        true
    }

    fn border_width(&mut self) -> Option<&mut i32> {
        match self.border {
            BorderTarget::Paragraph(edge) => self.state.paras.borders.get_mut(edge),
            BorderTarget::Cell(edge) => self.cell_def.props.borders.get_mut(edge),
            BorderTarget::None => None,
        }
    }

    fn font_word(&mut self, word: ControlWord<'_>) {
        match word.name {
            "f" => {
                self.commit_font();
                if let Ok(index) = u16::try_from(word.param_or(0)) {
                    self.pending_font = Some((index, Font::default()));
                }
            },
            "fcharset" => {
                if let Some((_, font)) = &mut self.pending_font {
                    font.charset = Some(word.param_or(0));
                }
            },
            name => {
                if let Some(family) = FontFamily::from_control_word(name)
                    && let Some((_, font)) = &mut self.pending_font
                {
                    font.family = family;
                }
            },
        }
    }

    fn color_word(&mut self, word: ControlWord<'_>) {
        let component = u8::try_from(word.param_or(0).clamp(0, 255)).unwrap_or(0);
        let color = self.pending_color.get_or_insert_with(Color::black);
        match word.name {
            "red" => color.red = component,
            "green" => color.green = component,
            "blue" => color.blue = component,
            _ => {},
        }
    }

    fn list_word(&mut self, word: ControlWord<'_>) {
        let list = self.lists.lists.last_mut();
        match word.name {
            "list" => self.lists.lists.push(ListDefinition::default()),
            "listid" => {
                if let Some(list) = list {
                    list.id = word.param_or(0);
                }
            },
            "listlevel" => {
                if let Some(list) = list {
                    list.levels.push(ListLevel {
                        start_at: 1,
                        ..Default::default()
                    });
                }
            },
            "levelnfc" | "levelnfcn" => {
                if let Some(level) = list.and_then(|l| l.levels.last_mut()) {
                    level.number_format = word.param_or(0);
                }
            },
            "levelstartat" => {
                if let Some(level) = list.and_then(|l| l.levels.last_mut()) {
                    level.start_at = word.param_or(1);
                }
            },
            _ => {},
        }
    }

    fn override_word(&mut self, word: ControlWord<'_>) {
        match word.name {
            "listoverride" => self.lists.overrides.push((0, 0)),
            "listid" => {
                if let Some(entry) = self.lists.overrides.last_mut() {
                    entry.1 = word.param_or(0);
                }
            },
            "ls" => {
                if let Some(entry) = self.lists.overrides.last_mut() {
                    entry.0 = word.param_or(0);
                }
            },
            _ => {},
        }
    }

    fn picture_word(&mut self, word: ControlWord<'_>) {
        let Some((_, picture)) = &mut self.picture else {
            return;
        };
        if let Some(image_type) = ImageType::from_control_word(word.name) {
            picture.image_type = image_type;
            return;
        }
        // Extents and scales are only meaningful when positive
        let value = word.param.filter(|v| *v > 0);
        match word.name {
            "picw" => picture.width = value,
            "pich" => picture.height = value,
            "picwgoal" => picture.goal_width = value,
            "pichgoal" => picture.goal_height = value,
            "picscalex" => picture.scale_x = value,
            "picscaley" => picture.scale_y = value,
            _ => {},
        }
    }

    fn finish_picture(&mut self, picture: Picture) -> Result<()> {
        if !self.options.embed_images {
            debug!("Dropping picture, image embedding is off");
            return Ok(());
        }
        if picture.data.is_empty() {
            debug!("Dropping picture without data");
            return Ok(());
        }
        let image_type = picture.resolved_type();
        if image_type == ImageType::Unknown {
            debug!("Picture format not recognized, embedding {} bytes as opaque data", picture.data.len());
        }
        let encoded = match image_type {
            ImageType::Dib => BASE64.encode(dib_to_bmp(&picture.data)),
            _ => BASE64.encode(&picture.data),
        };
        let mut source = String::new();
        source.try_reserve(encoded.len() + 48)?;
        source.push_str("data:");
        source.push_str(image_type.mime_type());
        source.push_str(";base64,");
        source.push_str(&encoded);

        if !self.state.hidden {
            self.paragraph.push_inline(Inline::Image(ImageData {
                source,
                width: picture.computed_width(),
                height: picture.computed_height(),
            }));
        }
        Ok(())
    }

    /// Close the current paragraph with the current paragraph mark.
    fn end_paragraph(&mut self, keep_empty: bool, in_cell: bool) {
        let mut paragraph = std::mem::take(&mut self.paragraph);
        if paragraph.has_hyperlink() {
            paragraph.close_hyperlink();
            // The field result continues in the next paragraph unlinked
            for field in &mut self.fields {
                field.hyperlink = false;
            }
        }
        if paragraph.is_empty() && !keep_empty {
            return;
        }
        paragraph.props = self.state.paras.clone();
        paragraph.mark = self.state.chars.clone();
        if in_cell {
            paragraph.props.in_table = true;
        }

        if paragraph.props.in_table {
            self.table
                .get_or_insert_with(TableBuilder::new)
                .push_block(Block::Paragraph(paragraph));
        } else {
            self.finish_table();
            self.blocks.push(Block::Paragraph(paragraph));
        }
    }

    fn finish_table(&mut self) {
        if let Some(builder) = self.table.take() {
            let table = builder.finish(&self.row, &self.lists, self.options.default_column_width);
            self.blocks.push(Block::Table(table));
        }
    }

    fn finish_document(&mut self) -> Result<()> {
        self.flush_text()?;
        self.end_paragraph(false, false);
        self.finish_table();
        self.blocks = group_lists(std::mem::take(&mut self.blocks), &self.lists);
        debug!(
            "Read {} block(s), {} font(s), {} color(s), {} list(s)",
            self.blocks.len(),
            self.fonts.len(),
            self.colors.len(),
            self.lists.lists.len()
        );
        Ok(())
    }

    fn emit<H: ContentHandler + ?Sized>(self, handler: &mut H) -> Result<()> {
        let font = self
            .info
            .default_font
            .and_then(|f| self.fonts.get(f))
            .map(|f| f.name.clone())
            .unwrap_or_else(|| self.options.default_font.clone());

        let mut root = AttributeSet::new();
        root.push(Attribute::new(XML_NAMESPACE, "space", "xml:space", "preserve"))?;
        for (kind, value) in [
            (AttributeKind::FontFamily, AttrValue::Text(font)),
            (AttributeKind::FontSize, AttrValue::HalfPoints(self.options.default_font_size)),
        ] {
            let desc = kind.descriptor();
            if let Some(text) = desc.format(&value) {
                root.push(Attribute::plain(desc.qname, text))?;
            }
        }

        handler.start_document()?;
        handler.start_prefix_mapping("", XAML_NAMESPACE)?;
        let mut emitter = Emitter::new(handler);
        emitter.start_with(ElementKind::Section, &root)?;
        emitter.blocks(&self.blocks)?;
        emitter.end(ElementKind::Section)?;
        handler.end_prefix_mapping("")?;
        handler.end_document()
    }
}

/// Character written by a symbol control word.
fn symbol_char(name: &str) -> Option<char> {
    Some(match name {
        "emdash" => '\u{2014}',
        "endash" => '\u{2013}',
        "emspace" => '\u{2003}',
        "enspace" => '\u{2002}',
        "qmspace" => '\u{2005}',
        "bullet" => '\u{2022}',
        "lquote" => '\u{2018}',
        "rquote" => '\u{2019}',
        "ldblquote" => '\u{201C}',
        "rdblquote" => '\u{201D}',
        "zwj" => '\u{200D}',
        "zwnj" => '\u{200C}',
        "ltrmark" => '\u{200E}',
        "rtlmark" => '\u{200F}',
        _ => return None,
    })
}

/// Split field instruction arguments; quoted arguments lose their quotes.
fn field_args(instruction: &str) -> Vec<&str> {
    let mut args = Vec::new();
    let mut rest = instruction.trim_start();
    while !rest.is_empty() {
        if let Some(quoted) = rest.strip_prefix('"') {
            let end = quoted.find('"').unwrap_or(quoted.len());
            args.push(&quoted[..end]);
            rest = quoted.get(end + 1..).unwrap_or("");
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            args.push(&rest[..end]);
            rest = &rest[end..];
        }
        rest = rest.trim_start();
    }
    args
}

/// Target of a `HYPERLINK` field instruction.
fn hyperlink_target(instruction: &str) -> Option<String> {
    let args = field_args(instruction);
    let (first, rest) = args.split_first()?;
    if !first.eq_ignore_ascii_case("HYPERLINK") {
        return None;
    }
    let mut uri: Option<&str> = None;
    let mut anchor: Option<&str> = None;
    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        match *arg {
            "\\l" => anchor = iter.next().copied(),
            // Switches taking an argument
            "\\o" | "\\t" => {
                iter.next();
            },
            switch if switch.starts_with('\\') => {},
            value if uri.is_none() => uri = Some(value),
            _ => {},
        }
    }
    match (uri, anchor) {
        (Some(uri), Some(anchor)) => Some(format!("{}#{}", uri, anchor)),
        (Some(uri), None) => Some(uri.to_string()),
        (None, Some(anchor)) => Some(format!("#{}", anchor)),
        (None, None) => None,
    }
}

/// Convert RTF to XAML markup.
pub fn rtf_to_xaml(input: &[u8], options: &ConvertOptions) -> Result<String> {
    let mut writer = XamlWriter::new();
    RtfToXaml::new(options.clone()).convert(input, &mut writer)?;
    Ok(writer.into_string())
}

/// Convert RTF to an element tree rooted at the `Section`.
pub fn rtf_to_xaml_tree(input: &[u8], options: &ConvertOptions) -> Result<XamlElement> {
    let mut builder = TreeBuilder::new();
    RtfToXaml::new(options.clone()).convert(input, &mut builder)?;
    builder
        .into_root()
        .ok_or_else(|| Error::Unknown("Conversion produced no root element".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorKind;

    fn convert(input: &str) -> String {
        rtf_to_xaml(input.as_bytes(), &ConvertOptions::default()).unwrap()
    }

    fn body(input: &str) -> String {
        let xaml = convert(input);
        let start = xaml.find('>').map(|i| i + 1).unwrap_or(0);
        let end = xaml.rfind("</Section>").unwrap_or(xaml.len());
        xaml[start..end].to_string()
    }

    #[test]
    fn test_root_section() {
        let xaml = convert(r"{\rtf1\ansi\deff0{\fonttbl{\f0\fswiss Arial;}} x}");
        assert!(xaml.starts_with(&format!(
            r#"<Section xmlns="{}" xml:space="preserve" FontFamily="Arial" FontSize="16">"#,
            XAML_NAMESPACE
        )));
    }

    #[test]
    fn test_bold_run_in_paragraph() {
        assert_eq!(
            body(r"{\rtf1\b Hello\b0  World}"),
            r#"<Paragraph FontWeight="Normal"><Run FontWeight="Bold">Hello</Run> World</Paragraph>"#
        );
    }

    #[test]
    fn test_group_scoped_formatting() {
        assert_eq!(
            body(r"{\rtf1 a{\i b}c\par}"),
            r#"<Paragraph>a<Run FontStyle="Italic">b</Run>c</Paragraph>"#
        );
    }

    #[test]
    fn test_empty_paragraphs_kept_on_par() {
        assert_eq!(body(r"{\rtf1\par\par}"), "<Paragraph/><Paragraph/>");
        assert_eq!(body(r"{\rtf1 x\page}"), "<Paragraph>x</Paragraph>");
    }

    #[test]
    fn test_unbalanced_groups() {
        let err = rtf_to_xaml(br"{\rtf1 a}}", &ConvertOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
        let err = rtf_to_xaml(br"{\rtf1 {a}", &ConvertOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
        let err = rtf_to_xaml(b"plain text", &ConvertOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_depth_limit() {
        let options = ConvertOptions::default().with_max_depth(3);
        assert!(rtf_to_xaml(br"{\rtf1{{x}}}", &options).is_ok());
        let err = rtf_to_xaml(br"{\rtf1{{{x}}}}", &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_skipped_destinations() {
        assert_eq!(
            body(r"{\rtf1{\info{\title T}}{\*\generator G;}{\*\unknown U}{\stylesheet{\s0 Normal;}}x\par}"),
            "<Paragraph>x</Paragraph>"
        );
    }

    #[test]
    fn test_codepage_and_hex() {
        assert_eq!(
            body(r"{\rtf1\ansi\ansicpg1251 \'cf\'f0\'e8\par}"),
            "<Paragraph>\u{41F}\u{440}\u{438}</Paragraph>"
        );
        assert_eq!(body(r"{\rtf1 caf\'e9\par}"), "<Paragraph>caf\u{E9}</Paragraph>");
    }

    #[test]
    fn test_font_charset_selects_codepage() {
        assert_eq!(
            body(r"{\rtf1\ansi{\fonttbl{\f0 Arial;}{\f1\fcharset204 Arial Cyr;}}\f1\'c0\par}"),
            "<Paragraph FontFamily=\"Arial Cyr\">\u{410}</Paragraph>"
        );
    }

    #[test]
    fn test_unicode_escapes() {
        assert_eq!(body(concat!(r"{\rtf1 \u", "8364", r"?\par}")), "<Paragraph>\u{20AC}</Paragraph>");
        assert_eq!(body(concat!(r"{\rtf1\uc2 \u", "8364", r"\'80\'80x\par}")), "<Paragraph>\u{20AC}x</Paragraph>");
        assert_eq!(body(r"{\rtf1 \u-10179?\u-8704?\par}"), "<Paragraph>\u{1F600}</Paragraph>");
        assert_eq!(body(r"{\rtf1 a\~b\emdash c\par}"), "<Paragraph>a\u{A0}b\u{2014}c</Paragraph>");
    }

    #[test]
    fn test_escaped_text() {
        assert_eq!(body(r"{\rtf1 \{a\}\\ <&>\par}"), "<Paragraph>{a}\\ &lt;&amp;&gt;</Paragraph>");
    }

    #[test]
    fn test_line_and_tab() {
        assert_eq!(body(r"{\rtf1 a\line b\tab c\par}"), "<Paragraph>a<LineBreak/>b\tc</Paragraph>");
    }

    #[test]
    fn test_paragraph_properties() {
        assert_eq!(
            body(r"{\rtf1\pard\qc\li300\sa120 x\par}"),
            r#"<Paragraph TextAlignment="Center" Margin="20,0,0,8">x</Paragraph>"#
        );
    }

    #[test]
    fn test_colors() {
        assert_eq!(
            body(r"{\rtf1{\colortbl;\red255\green0\blue0;\red0\green0\blue255;}\cf1 r\cf2 b\cf0 a\par}"),
            r##"<Paragraph><Run Foreground="#FFFF0000">r</Run><Run Foreground="#FF0000FF">b</Run>a</Paragraph>"##
        );
    }

    #[test]
    fn test_hyperlink_field() {
        assert_eq!(
            body(r#"{\rtf1 see {\field{\*\fldinst{HYPERLINK "http://example.com/"}}{\fldrslt{here}}} now\par}"#),
            r#"<Paragraph>see <Hyperlink NavigateUri="http://example.com/">here</Hyperlink> now</Paragraph>"#
        );
        assert_eq!(
            body(r#"{\rtf1{\field{\*\fldinst HYPERLINK \\l "top"}{\fldrslt up}}\par}"#),
            r##"<Paragraph><Hyperlink NavigateUri="#top">up</Hyperlink></Paragraph>"##
        );
    }

    #[test]
    fn test_other_fields_keep_result() {
        assert_eq!(
            body(r"{\rtf1{\field{\*\fldinst PAGE}{\fldrslt 3}}\par}"),
            "<Paragraph>3</Paragraph>"
        );
    }

    #[test]
    fn test_hyperlink_target_parsing() {
        assert_eq!(hyperlink_target(r#"HYPERLINK "a" \o "tip""#).as_deref(), Some("a"));
        assert_eq!(hyperlink_target(r#"HYPERLINK "a" \l "b""#).as_deref(), Some("a#b"));
        assert_eq!(hyperlink_target(r#" hyperlink x"#).as_deref(), Some("x"));
        assert_eq!(hyperlink_target("PAGE"), None);
        assert_eq!(hyperlink_target("HYPERLINK"), None);
    }

    #[test]
    fn test_simple_table() {
        let rtf = r"{\rtf1\trowd\cellx1500\cellx3000\pard\intbl a\cell b\cell\row\pard after\par}";
        assert_eq!(
            body(rtf),
            concat!(
                r#"<Table><Table.Columns><TableColumn Width="100"/><TableColumn Width="100"/></Table.Columns>"#,
                r#"<TableRowGroup><TableRow><TableCell><Paragraph>a</Paragraph></TableCell>"#,
                r#"<TableCell><Paragraph>b</Paragraph></TableCell></TableRow></TableRowGroup></Table>"#,
                r#"<Paragraph>after</Paragraph>"#
            )
        );
    }

    #[test]
    fn test_table_spans() {
        let rtf = concat!(
            r"{\rtf1",
            r"\trowd\clvmgf\cellx1500\clmgf\cellx3000\clmrg\cellx4500\pard\intbl a\cell b\cell\cell\row",
            r"\trowd\clvmrg\cellx1500\cellx3000\cellx4500\pard\intbl\cell c\cell d\cell\row}"
        );
        let tree = rtf_to_xaml_tree(rtf.as_bytes(), &ConvertOptions::default()).unwrap();
        let cells = tree.descendants("TableCell");
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0].attribute("RowSpan"), Some("2"));
        assert_eq!(cells[1].attribute("ColumnSpan"), Some("2"));
        assert_eq!(cells[2].text(), "c");
        assert_eq!(tree.descendants("TableColumn").len(), 3);
    }

    #[test]
    fn test_cell_borders_and_shading() {
        let rtf = r"{\rtf1{\colortbl;\red0\green255\blue0;}\trowd\clcbpat1\clbrdrb\brdrs\brdrw30\cellx1500\pard\intbl x\cell\row}";
        let tree = rtf_to_xaml_tree(rtf.as_bytes(), &ConvertOptions::default()).unwrap();
        let cell = tree.descendants("TableCell")[0];
        assert_eq!(cell.attribute("Background"), Some("#FF00FF00"));
        assert_eq!(cell.attribute("BorderThickness"), Some("0,0,0,2"));
    }

    #[test]
    fn test_lists() {
        let rtf = concat!(
            r"{\rtf1",
            r"{\*\listtable{\list\listtemplateid1{\listlevel\levelnfc0\levelstartat1{\leveltext\'02\'00.;}{\levelnumbers\'01;}}\listid5}}",
            r"{\*\listoverridetable{\listoverride\listid5\listoverridecount0\ls1}}",
            r"\pard\ls1\ilvl0{\listtext 1.\tab}one\par",
            r"\pard\ls1\ilvl0{\listtext 2.\tab}two\par",
            r"\pard after\par}"
        );
        assert_eq!(
            body(rtf),
            concat!(
                r#"<List MarkerStyle="Decimal"><ListItem><Paragraph>one</Paragraph></ListItem>"#,
                r#"<ListItem><Paragraph>two</Paragraph></ListItem></List><Paragraph>after</Paragraph>"#
            )
        );
    }

    #[test]
    fn test_png_picture() {
        let rtf = r"{\rtf1{\pict\pngblip\picw2\pich1\picwgoal30\pichgoal15 89504e470d0a1a0a}\par}";
        let tree = rtf_to_xaml_tree(rtf.as_bytes(), &ConvertOptions::default()).unwrap();
        let image = tree.descendants("Image")[0];
        assert_eq!(image.attribute("Source"), Some("data:image/png;base64,iVBORw0KGgo="));
        assert_eq!(image.attribute("Width"), Some("2"));
        assert_eq!(image.attribute("Height"), Some("1"));
        assert_eq!(image.attribute("Stretch"), Some("Fill"));
    }

    #[test]
    fn test_out_of_range_lengths_are_dropped() {
        assert_eq!(body(r"{\rtf1 \fs0 x\par}"), "<Paragraph>x</Paragraph>");
        assert_eq!(body(r"{\rtf1 \fs30\fs-4 x\par}"), r#"<Paragraph FontSize="20">x</Paragraph>"#);

        let rtf = r"{\rtf1{\pict\emfblip\picwgoal-30\pichgoal-5 0102}\par}";
        let tree = rtf_to_xaml_tree(rtf.as_bytes(), &ConvertOptions::default()).unwrap();
        let image = tree.descendants("Image")[0];
        assert_eq!(image.attribute("Width"), None);
        assert_eq!(image.attribute("Height"), None);

        // The output is valid input for a strict conversion back
        let strict = ConvertOptions::default().with_strict(true);
        for rtf in [r"{\rtf1 \fs0 x\par}", r"{\rtf1 \fs-4 x\par}", rtf] {
            let xaml = convert(rtf);
            assert!(crate::convert::xaml_to_rtf(&xaml, &strict).is_ok(), "{xaml}");
        }
    }

    #[test]
    fn test_multiple_line_spacing_is_dropped() {
        assert_eq!(body(r"{\rtf1 \sl480\slmult1 x\par}"), "<Paragraph>x</Paragraph>");
        assert_eq!(body(r"{\rtf1 \sl-360\slmult0 x\par}"), r#"<Paragraph LineHeight="24">x</Paragraph>"#);
    }

    #[test]
    fn test_unknown_picture_is_opaque() {
        let rtf = r"{\rtf1{\pict\wbitmap0 0102}x\par}";
        let tree = rtf_to_xaml_tree(rtf.as_bytes(), &ConvertOptions::default()).unwrap();
        let image = tree.descendants("Image")[0];
        assert_eq!(image.attribute("Source"), Some("data:application/octet-stream;base64,AQI="));
        assert_eq!(tree.text(), "x");
    }

    #[test]
    fn test_pictures_dropped_when_disabled() {
        let rtf = br"{\rtf1{\pict\pngblip 89504e47}x\par}";
        let options = ConvertOptions::default().with_embed_images(false);
        let xaml = rtf_to_xaml(rtf, &options).unwrap();
        assert!(!xaml.contains("Image"));
    }

    #[test]
    fn test_bad_picture_hex() {
        let err = rtf_to_xaml(br"{\rtf1{\pict\pngblip 8950zz}}", &ConvertOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_object_result_is_read() {
        assert_eq!(
            body(r"{\rtf1{\object\objemb{\*\objclass Equation}{\*\objdata 0102}{\result shown}}\par}"),
            "<Paragraph>shown</Paragraph>"
        );
    }

    #[test]
    fn test_upr_reads_unicode_alternative() {
        assert_eq!(
            body(r"{\rtf1{\upr{ansi}{\*\ud{uni}}}\par}"),
            "<Paragraph>uni</Paragraph>"
        );
    }

    #[test]
    fn test_hidden_text() {
        assert_eq!(body(r"{\rtf1 a{\v hidden}b\par}"), "<Paragraph>ab</Paragraph>");
    }
}
