//! Table rows for XAML to RTF conversion.
//!
//! RTF has no table element: a row is a `\trowd` definition listing every
//! cell's right edge, followed by the cell paragraphs and `\row`. Spanned
//! cells are written as merged runs of grid cells, so each row is buffered
//! until its last cell is known.

use crate::convert::props::CellProps;
use crate::rtf::{ColorTable, RtfWriter};
use tracing::debug;

/// Gap between cell text and cell edges, in twips.
const CELL_GAP: i32 = 108;

/// A rendered cell waiting for the end of its row.
#[derive(Debug)]
pub struct CellOutput {
    pub props: CellProps,
    /// Cell paragraphs, ending in `\cell`
    pub content: RtfWriter,
}

/// Vertical merge continuing into later rows.
#[derive(Debug, Clone, Copy)]
struct RowSpan {
    rows_left: u16,
    columns: u16,
}

/// An open `Table` element.
#[derive(Debug)]
pub struct TableState {
    /// Widths from `Table.Columns`, twips
    columns: Vec<Option<i32>>,
    default_width: i32,
    /// Right edges of the grid columns measured so far
    edges: Vec<i32>,
    /// Open vertical merges by start column
    spans: Vec<Option<RowSpan>>,
    cells: Vec<CellOutput>,
    row_open: bool,
    rows: usize,
}

impl TableState {
    pub fn new(default_width: i32) -> Self {
        Self {
            columns: Vec::new(),
            default_width: default_width.max(1),
            edges: Vec::new(),
            spans: Vec::new(),
            cells: Vec::new(),
            row_open: false,
            rows: 0,
        }
    }

    pub fn push_column(&mut self, width: Option<i32>) {
        self.columns.push(width.filter(|w| *w > 0));
        self.edges.clear();
    }

    pub fn row_open(&self) -> bool {
        self.row_open
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn start_row(&mut self) {
        self.cells.clear();
        self.row_open = true;
    }

    pub fn push_cell(&mut self, cell: CellOutput) {
        self.cells.push(cell);
    }

    /// Right edge of grid column `column`, twips from the row's left.
    fn right_edge(&mut self, column: usize) -> i32 {
        while self.edges.len() <= column {
            let c = self.edges.len();
            let width = self.columns.get(c).copied().flatten().unwrap_or(self.default_width);
            let left = self.edges.last().copied().unwrap_or(0);
            self.edges.push(left.saturating_add(width));
        }
        self.edges[column]
    }

    fn covered(&self, column: usize) -> Option<RowSpan> {
        self.spans.get(column).copied().flatten()
    }

    /// Write the placeholder of a vertically merged cell at `column`.
    /// Returns the number of grid columns it covers.
    fn write_placeholder(&mut self, column: usize, defs: &mut RtfWriter, body: &mut RtfWriter) -> usize {
        let Some(span) = self.covered(column) else {
            return 0;
        };
        let columns = usize::from(span.columns.max(1));
        for k in 0..columns {
            if k == 0 {
                defs.word("clvmrg");
            }
            if columns > 1 {
                defs.word(if k == 0 { "clmgf" } else { "clmrg" });
            }
            defs.word_n("cellx", self.right_edge(column + k));
        }
        body.word("pard");
        body.word("intbl");
        for _ in 0..columns {
            body.word("cell");
        }

        if let Some(slot) = self.spans.get_mut(column) {
            *slot = (span.rows_left > 1).then(|| RowSpan {
                rows_left: span.rows_left - 1,
                ..span
            });
        }
        columns
    }

    /// Close the open row and render it.
    pub fn finish_row(&mut self, colors: &mut ColorTable) -> RtfWriter {
        self.row_open = false;
        self.rows += 1;
        let cells = std::mem::take(&mut self.cells);

        let mut defs = RtfWriter::new();
        defs.word("trowd");
        defs.word_n("trgaph", CELL_GAP);
        let mut body = RtfWriter::new();
        let mut column = 0usize;

        for cell in cells {
            loop {
                let covered = self.write_placeholder(column, &mut defs, &mut body);
                if covered == 0 {
                    break;
                }
                column += covered;
            }

            let columns = usize::from(cell.props.column_span.max(1));
            let rows = cell.props.row_span.max(1);
            for k in 0..columns {
                if k == 0 {
                    if rows > 1 {
                        defs.word("clvmgf");
                    }
                    cell.props.write_rtf(&mut defs, colors);
                }
                if columns > 1 {
                    defs.word(if k == 0 { "clmgf" } else { "clmrg" });
                }
                defs.word_n("cellx", self.right_edge(column + k));
            }
            if rows > 1 {
                if self.spans.len() <= column {
                    self.spans.resize(column + 1, None);
                }
                self.spans[column] = Some(RowSpan {
                    rows_left: rows - 1,
                    columns: columns as u16,
                });
            }

            body.append(cell.content);
            // Merged grid cells still end with their own \cell
            for _ in 1..columns {
                body.word("cell");
            }
            column += columns;
        }

        // Merges from above to the right of the last cell
        while let Some(last) = self.spans.iter().rposition(Option::is_some) {
            if column > last {
                break;
            }
            let covered = self.write_placeholder(column, &mut defs, &mut body);
            if covered == 0 {
                defs.word_n("cellx", self.right_edge(column));
                body.word("pard");
                body.word("intbl");
                body.word("cell");
                column += 1;
            } else {
                column += covered;
            }
        }

        body.word("row");
        defs.append(body);
        debug!("Wrote table row {} with {} grid column(s)", self.rows, column);
        defs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(text: &str, columns: u16, rows: u16) -> CellOutput {
        let mut content = RtfWriter::new();
        content.word("pard");
        content.word("intbl");
        content.write_raw(text);
        content.word("cell");
        CellOutput {
            props: CellProps {
                column_span: columns,
                row_span: rows,
                ..Default::default()
            },
            content,
        }
    }

    #[test]
    fn test_plain_row() {
        let mut table = TableState::new(2880);
        table.push_column(Some(1500));
        table.start_row();
        table.push_cell(cell("a", 1, 1));
        table.push_cell(cell("b", 1, 1));
        let row = table.finish_row(&mut ColorTable::new());
        assert_eq!(
            row.as_str(),
            r"\trowd\trgaph108\cellx1500\cellx4380\pard\intbl a\cell\pard\intbl b\cell\row"
        );
        assert_eq!(table.rows(), 1);
        assert!(!table.row_open());
    }

    #[test]
    fn test_column_span() {
        let mut table = TableState::new(1000);
        table.start_row();
        table.push_cell(cell("a", 2, 1));
        let row = table.finish_row(&mut ColorTable::new());
        assert_eq!(
            row.as_str(),
            r"\trowd\trgaph108\clmgf\cellx1000\clmrg\cellx2000\pard\intbl a\cell\cell\row"
        );
    }

    #[test]
    fn test_row_span_placeholders() {
        let mut table = TableState::new(1000);
        table.start_row();
        table.push_cell(cell("a", 1, 2));
        table.push_cell(cell("b", 1, 1));
        let first = table.finish_row(&mut ColorTable::new());
        assert!(first.as_str().starts_with(r"\trowd\trgaph108\clvmgf\cellx1000\cellx2000"));

        table.start_row();
        table.push_cell(cell("c", 1, 1));
        let second = table.finish_row(&mut ColorTable::new());
        assert_eq!(
            second.as_str(),
            r"\trowd\trgaph108\clvmrg\cellx1000\cellx2000\pard\intbl\cell\pard\intbl c\cell\row"
        );

        // The merge is used up
        table.start_row();
        table.push_cell(cell("d", 1, 1));
        let third = table.finish_row(&mut ColorTable::new());
        assert!(!third.as_str().contains("clvmrg"));
    }

    #[test]
    fn test_wide_span_edges() {
        let mut table = TableState::new(1000);
        table.push_column(Some(500));
        table.start_row();
        table.push_cell(cell("a", u16::MAX, 1));
        let row = table.finish_row(&mut ColorTable::new());
        let text = row.as_str();

        assert_eq!(text.matches("cellx").count(), usize::from(u16::MAX));
        assert!(text.contains(r"\clmgf\cellx500\clmrg\cellx1500\clmrg\cellx2500"));
        assert!(text.contains(r"\cellx65534500\pard\intbl a\cell\cell"));
    }

    #[test]
    fn test_trailing_placeholder() {
        let mut table = TableState::new(1000);
        table.start_row();
        table.push_cell(cell("a", 1, 1));
        table.push_cell(cell("b", 1, 2));
        table.finish_row(&mut ColorTable::new());

        table.start_row();
        table.push_cell(cell("c", 1, 1));
        let row = table.finish_row(&mut ColorTable::new());
        assert!(row.as_str().contains(r"\cellx1000\clvmrg\cellx2000"));
        assert!(row.as_str().ends_with(r"c\cell\pard\intbl\cell\row"));
    }
}
