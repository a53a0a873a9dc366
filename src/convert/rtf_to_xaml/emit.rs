//! Emit the collected document model as content events.

use super::model::{Block, Cell, Inline, List, Paragraph, Table};
use crate::common::Result;
use crate::convert::props::{CharProps, XamlAttributes};
use crate::vocabulary::{AttrValue, AttributeKind, ElementKind, XAML_NAMESPACE};
use crate::xaml::{Attribute, AttributeSet, ContentHandler};

pub struct Emitter<'h, H: ContentHandler + ?Sized> {
    handler: &'h mut H,
}

fn attribute_set(attrs: XamlAttributes) -> Result<AttributeSet> {
    let mut set = AttributeSet::new();
    for (name, value) in attrs {
        set.push(Attribute::plain(name, value))?;
    }
    Ok(set)
}

fn format(kind: AttributeKind, value: AttrValue) -> Option<(&'static str, String)> {
    let desc = kind.descriptor();
    desc.format(&value).map(|text| (desc.qname, text))
}

impl<'h, H: ContentHandler + ?Sized> Emitter<'h, H> {
    pub fn new(handler: &'h mut H) -> Self {
        Self { handler }
    }

    pub fn start_with(&mut self, kind: ElementKind, attributes: &AttributeSet) -> Result<()> {
        let name = kind.name();
        self.handler.start_element(XAML_NAMESPACE, name, name, attributes)
    }

    pub fn start(&mut self, kind: ElementKind, attrs: XamlAttributes) -> Result<()> {
        let attributes = attribute_set(attrs)?;
        self.start_with(kind, &attributes)
    }

    pub fn end(&mut self, kind: ElementKind) -> Result<()> {
        let name = kind.name();
        self.handler.end_element(XAML_NAMESPACE, name, name)
    }

    fn empty(&mut self, kind: ElementKind, attrs: XamlAttributes) -> Result<()> {
        self.start(kind, attrs)?;
        self.end(kind)
    }

    pub fn blocks(&mut self, blocks: &[Block]) -> Result<()> {
        for block in blocks {
            match block {
                Block::Paragraph(p) => self.paragraph(p)?,
                Block::Table(t) => self.table(t)?,
                Block::List(l) => self.list(l)?,
            }
        }
        Ok(())
    }

    fn paragraph(&mut self, p: &Paragraph) -> Result<()> {
        let runs = p.run_props();
        let mut shared = CharProps::hoist(&p.mark, runs.iter().copied());
        // Paragraph level values win over the mark's
        if p.props.direction.is_some() {
            shared.direction = None;
        }
        if p.props.background.is_some() {
            shared.background = None;
        }

        let mut attrs = p.props.attributes();
        for (name, value) in shared.attributes() {
            if !attrs.iter().any(|(n, _)| *n == name) {
                attrs.push((name, value));
            }
        }
        self.start(ElementKind::Paragraph, attrs)?;
        self.inlines(&p.inlines, &shared)?;
        self.end(ElementKind::Paragraph)
    }

    fn inlines(&mut self, inlines: &[Inline], base: &CharProps) -> Result<()> {
        for inline in inlines {
            match inline {
                Inline::Run { props, text } => {
                    let own = props.diff(base);
                    if own.is_empty() {
                        self.handler.characters(text)?;
                    } else {
                        self.start(ElementKind::Run, own.attributes())?;
                        self.handler.characters(text)?;
                        self.end(ElementKind::Run)?;
                    }
                },
                Inline::LineBreak => self.empty(ElementKind::LineBreak, Vec::new())?,
                Inline::Image(image) => {
                    let mut attrs: XamlAttributes = Vec::new();
                    attrs.extend(format(AttributeKind::Source, AttrValue::Text(image.source.clone())));
                    if let Some(w) = image.width {
                        attrs.extend(format(AttributeKind::Width, AttrValue::Twips(w)));
                    }
                    if let Some(h) = image.height {
                        attrs.extend(format(AttributeKind::Height, AttrValue::Twips(h)));
                    }
                    attrs.push((AttributeKind::Stretch.descriptor().qname, "Fill".to_string()));

                    self.start(ElementKind::InlineUIContainer, Vec::new())?;
                    self.empty(ElementKind::Image, attrs)?;
                    self.end(ElementKind::InlineUIContainer)?;
                },
                Inline::Hyperlink { uri, inlines } => {
                    let attrs = format(AttributeKind::NavigateUri, AttrValue::Text(uri.clone()))
                        .into_iter()
                        .collect();
                    self.start(ElementKind::Hyperlink, attrs)?;
                    self.inlines(inlines, base)?;
                    self.end(ElementKind::Hyperlink)?;
                },
            }
        }
        Ok(())
    }

    fn table(&mut self, table: &Table) -> Result<()> {
        self.start(ElementKind::Table, Vec::new())?;
        if !table.columns.is_empty() {
            self.start(ElementKind::TableColumns, Vec::new())?;
            for width in &table.columns {
                let attrs = format(AttributeKind::Width, AttrValue::Twips(*width))
                    .into_iter()
                    .collect();
                self.empty(ElementKind::TableColumn, attrs)?;
            }
            self.end(ElementKind::TableColumns)?;
        }
        self.start(ElementKind::TableRowGroup, Vec::new())?;
        for row in &table.rows {
            self.start(ElementKind::TableRow, Vec::new())?;
            for cell in row {
                self.cell(cell)?;
            }
            self.end(ElementKind::TableRow)?;
        }
        self.end(ElementKind::TableRowGroup)?;
        self.end(ElementKind::Table)
    }

    fn cell(&mut self, cell: &Cell) -> Result<()> {
        self.start(ElementKind::TableCell, cell.props.attributes())?;
        self.blocks(&cell.blocks)?;
        self.end(ElementKind::TableCell)
    }

    fn list(&mut self, list: &List) -> Result<()> {
        let attrs = format(AttributeKind::MarkerStyle, AttrValue::Marker(list.marker))
            .into_iter()
            .collect();
        self.start(ElementKind::List, attrs)?;
        for item in &list.items {
            self.start(ElementKind::ListItem, Vec::new())?;
            self.blocks(item)?;
            self.end(ElementKind::ListItem)?;
        }
        self.end(ElementKind::List)
    }
}
