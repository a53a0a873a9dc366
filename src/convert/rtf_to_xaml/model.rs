//! Document model the RTF reader fills before emitting XAML.
//!
//! Paragraphs are collected whole because a paragraph's attributes depend on
//! its paragraph mark, which RTF only fixes at `\par`. Tables and lists are
//! collected whole because column widths and spans are only known once the
//! last row has been read.

use crate::convert::props::{CellProps, CharProps, ParaProps};
use crate::rtf::ListTable;
use crate::vocabulary::MarkerStyle;
use tracing::debug;

/// An embedded picture ready for emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// `data:` URI
    pub source: String,
    /// Display width in twips
    pub width: Option<i32>,
    /// Display height in twips
    pub height: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Run { props: CharProps, text: String },
    LineBreak,
    Image(ImageData),
    Hyperlink { uri: String, inlines: Vec<Inline> },
}

/// Push text, extending the last run when its properties match.
fn push_run(inlines: &mut Vec<Inline>, props: &CharProps, text: &str) {
    if let Some(Inline::Run { props: last, text: run }) = inlines.last_mut()
        && last == props
    {
        run.push_str(text);
        return;
    }
    inlines.push(Inline::Run {
        props: props.clone(),
        text: text.to_string(),
    });
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub props: ParaProps,
    /// Character properties in effect at the paragraph mark
    pub mark: CharProps,
    pub inlines: Vec<Inline>,
    /// Open hyperlink: target and collected inlines
    pub(super) hyperlink: Option<(String, Vec<Inline>)>,
}

impl Paragraph {
    fn target(&mut self) -> &mut Vec<Inline> {
        match &mut self.hyperlink {
            Some((_, inlines)) => inlines,
            None => &mut self.inlines,
        }
    }

    pub fn push_text(&mut self, props: &CharProps, text: &str) {
        if !text.is_empty() {
            push_run(self.target(), props, text);
        }
    }

    pub fn push_inline(&mut self, inline: Inline) {
        self.target().push(inline);
    }

    pub fn open_hyperlink(&mut self, uri: String) {
        self.close_hyperlink();
        self.hyperlink = Some((uri, Vec::new()));
    }

    pub fn close_hyperlink(&mut self) {
        if let Some((uri, inlines)) = self.hyperlink.take()
            && !inlines.is_empty()
        {
            self.inlines.push(Inline::Hyperlink { uri, inlines });
        }
    }

    pub fn has_hyperlink(&self) -> bool {
        self.hyperlink.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.inlines.is_empty() && self.hyperlink.as_ref().is_none_or(|(_, i)| i.is_empty())
    }

    /// Properties of every run, hyperlink contents included.
    pub fn run_props(&self) -> Vec<&CharProps> {
        fn collect<'a>(inlines: &'a [Inline], out: &mut Vec<&'a CharProps>) {
            for inline in inlines {
                match inline {
                    Inline::Run { props, .. } => out.push(props),
                    Inline::Hyperlink { inlines, .. } => collect(inlines, out),
                    Inline::LineBreak | Inline::Image(_) => {},
                }
            }
        }
        let mut out = Vec::new();
        collect(&self.inlines, &mut out);
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    List(List),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Column widths in twips
    pub columns: Vec<i32>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub props: CellProps,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub marker: MarkerStyle,
    /// Each item is a block sequence
    pub items: Vec<Vec<Block>>,
}

/// Horizontal or vertical merge flag of a cell definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Merge {
    #[default]
    None,
    /// `\clmgf` / `\clvmgf`
    First,
    /// `\clmrg` / `\clvmrg`
    Continue,
}

/// One cell of a `\trowd` row definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellDef {
    pub props: CellProps,
    /// `\cellx`: right boundary in twips from the row's left edge
    pub right: Option<i32>,
    pub h_merge: Merge,
    pub v_merge: Merge,
}

#[derive(Debug)]
struct RawRow {
    defs: Vec<CellDef>,
    cells: Vec<Vec<Block>>,
}

/// Collects rows of `\intbl` paragraphs and resolves the column grid.
#[derive(Debug, Default)]
pub struct TableBuilder {
    rows: Vec<RawRow>,
    /// Completed cells of the open row
    cells: Vec<Vec<Block>>,
    /// Blocks of the open cell
    current: Vec<Block>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.cells.is_empty() && self.current.is_empty()
    }

    pub fn push_block(&mut self, block: Block) {
        self.current.push(block);
    }

    pub fn end_cell(&mut self, lists: &ListTable) {
        let blocks = group_lists(std::mem::take(&mut self.current), lists);
        self.cells.push(blocks);
    }

    pub fn end_row(&mut self, defs: &[CellDef], lists: &ListTable) {
        if !self.current.is_empty() {
            self.end_cell(lists);
        }
        self.rows.push(RawRow {
            defs: defs.to_vec(),
            cells: std::mem::take(&mut self.cells),
        });
    }

    /// Resolve the grid. Rows left open (no `\row`) are closed with `defs`.
    pub fn finish(mut self, defs: &[CellDef], lists: &ListTable, default_width: i32) -> Table {
        if !self.cells.is_empty() || !self.current.is_empty() {
            self.end_row(defs, lists);
        }
        let default_width = default_width.max(1);

        // Cell extents per row, as (left, right) in twips
        let extents: Vec<Vec<(i32, i32)>> = self
            .rows
            .iter()
            .map(|row| {
                let count = row.defs.len().max(row.cells.len());
                let mut prev = 0i32;
                (0..count)
                    .map(|j| {
                        let right = match row.defs.get(j).and_then(|d| d.right) {
                            Some(r) if r > prev => r,
                            _ => prev.saturating_add(default_width),
                        };
                        let extent = (prev, right);
                        prev = right;
                        extent
                    })
                    .collect()
            })
            .collect();

        let mut bounds: Vec<i32> = extents.iter().flatten().map(|(_, right)| *right).collect();
        bounds.sort_unstable();
        bounds.dedup();

        let mut columns = Vec::with_capacity(bounds.len());
        let mut prev = 0;
        for bound in &bounds {
            columns.push(bound - prev);
            prev = *bound;
        }

        // Start column -> (row, cell) of the cell a vertical merge extends
        let mut origins: Vec<Option<(usize, usize)>> = vec![None; bounds.len()];
        let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(self.rows.len());

        for (raw, extents) in self.rows.into_iter().zip(extents) {
            let row_index = rows.len();
            let mut out: Vec<Cell> = Vec::new();
            let mut prev_absorbed = false;
            let mut cells = raw.cells.into_iter();

            for (j, (left, right)) in extents.into_iter().enumerate() {
                let def = raw.defs.get(j).cloned().unwrap_or_default();
                let blocks = cells.next().unwrap_or_default();
                let span = bounds.iter().filter(|b| **b > left && **b <= right).count().max(1);
                let start = bounds.iter().filter(|b| **b <= left).count();

                if def.h_merge == Merge::Continue {
                    if !prev_absorbed && let Some(last) = out.last_mut() {
                        last.props.column_span = last.props.column_span.saturating_add(span as u16);
                        // Merged cells carry an empty paragraph of their own
                        last.blocks.extend(
                            blocks
                                .into_iter()
                                .filter(|b| !matches!(b, Block::Paragraph(p) if p.is_empty())),
                        );
                    }
                    continue;
                }

                match def.v_merge {
                    Merge::Continue => {
                        let origin = origins.get(start).copied().flatten();
                        if let Some((r, c)) = origin
                            && let Some(cell) = rows.get_mut(r).and_then(|row| row.get_mut(c))
                        {
                            cell.props.row_span = cell.props.row_span.saturating_add(1);
                            prev_absorbed = true;
                            continue;
                        }
                    },
                    Merge::First => {
                        if let Some(slot) = origins.get_mut(start) {
                            *slot = Some((row_index, out.len()));
                        }
                    },
                    Merge::None => {
                        if let Some(slot) = origins.get_mut(start) {
                            *slot = None;
                        }
                    },
                }
                prev_absorbed = false;

                let mut props = def.props;
                props.column_span = span as u16;
                props.row_span = 1;
                out.push(Cell { props, blocks });
            }
            rows.push(out);
        }

        debug!("Assembled table: {} column(s), {} row(s)", columns.len(), rows.len());
        Table { columns, rows }
    }
}

/// Group consecutive list paragraphs into nested lists.
///
/// A change of `\ls` starts a new list; deeper `\ilvl` values nest inside
/// the last item of the enclosing level.
pub fn group_lists(blocks: Vec<Block>, lists: &ListTable) -> Vec<Block> {
    let mut out = Vec::with_capacity(blocks.len());
    let mut open: Vec<List> = Vec::new();
    let mut current: Option<i32> = None;

    for block in blocks {
        let list = match &block {
            Block::Paragraph(p) => p.props.list.map(|ls| (ls, p.props.list_level)),
            _ => None,
        };
        let Some((ls, level)) = list else {
            close_lists(&mut open, 0, &mut out);
            current = None;
            out.push(block);
            continue;
        };

        if current != Some(ls) {
            close_lists(&mut open, 0, &mut out);
            current = Some(ls);
        }
        let depth = usize::try_from(level).unwrap_or(0) + 1;
        close_lists(&mut open, depth, &mut out);
        while open.len() < depth {
            if let Some(parent) = open.last_mut()
                && parent.items.is_empty()
            {
                parent.items.push(Vec::new());
            }
            let marker = lists
                .level(ls, open.len() as i32)
                .map(|l| MarkerStyle::from_level(l.number_format, &l.text))
                .unwrap_or_default();
            open.push(List {
                marker,
                items: Vec::new(),
            });
        }
        if let Some(list) = open.last_mut() {
            list.items.push(vec![block]);
        }
    }
    close_lists(&mut open, 0, &mut out);
    out
}

/// Close open lists until `depth` remain.
fn close_lists(open: &mut Vec<List>, depth: usize, out: &mut Vec<Block>) {
    while open.len() > depth {
        let Some(list) = open.pop() else { break };
        match open.last_mut() {
            Some(parent) => {
                if parent.items.is_empty() {
                    parent.items.push(Vec::new());
                }
                if let Some(item) = parent.items.last_mut() {
                    item.push(Block::List(list));
                }
            },
            None => out.push(Block::List(list)),
        }
    }
}
