//! The closed XAML flow-content element vocabulary.

use phf::phf_map;

/// Known XAML flow-content elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    FlowDocument,
    Section,
    Paragraph,
    Run,
    Span,
    Bold,
    Italic,
    Underline,
    Hyperlink,
    LineBreak,
    InlineUIContainer,
    BlockUIContainer,
    Image,
    Table,
    /// The `Table.Columns` property element
    TableColumns,
    TableColumn,
    TableRowGroup,
    TableRow,
    TableCell,
    List,
    ListItem,
    /// Any element outside the vocabulary
    Unknown,
}

static ELEMENTS: phf::Map<&'static str, ElementKind> = phf_map! {
    "FlowDocument" => ElementKind::FlowDocument,
    "Section" => ElementKind::Section,
    "Paragraph" => ElementKind::Paragraph,
    "Run" => ElementKind::Run,
    "Span" => ElementKind::Span,
    "Bold" => ElementKind::Bold,
    "Italic" => ElementKind::Italic,
    "Underline" => ElementKind::Underline,
    "Hyperlink" => ElementKind::Hyperlink,
    "LineBreak" => ElementKind::LineBreak,
    "InlineUIContainer" => ElementKind::InlineUIContainer,
    "BlockUIContainer" => ElementKind::BlockUIContainer,
    "Image" => ElementKind::Image,
    "Table" => ElementKind::Table,
    "Table.Columns" => ElementKind::TableColumns,
    "TableColumn" => ElementKind::TableColumn,
    "TableRowGroup" => ElementKind::TableRowGroup,
    "TableRow" => ElementKind::TableRow,
    "TableCell" => ElementKind::TableCell,
    "List" => ElementKind::List,
    "ListItem" => ElementKind::ListItem,
};

impl ElementKind {
    /// Resolve an element by local name. Unknown names map to `Unknown`.
    #[inline]
    pub fn lookup(local_name: &str) -> Self {
        ELEMENTS
            .get(local_name)
            .copied()
            .unwrap_or(ElementKind::Unknown)
    }

    /// Local name as written in markup.
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::FlowDocument => "FlowDocument",
            ElementKind::Section => "Section",
            ElementKind::Paragraph => "Paragraph",
            ElementKind::Run => "Run",
            ElementKind::Span => "Span",
            ElementKind::Bold => "Bold",
            ElementKind::Italic => "Italic",
            ElementKind::Underline => "Underline",
            ElementKind::Hyperlink => "Hyperlink",
            ElementKind::LineBreak => "LineBreak",
            ElementKind::InlineUIContainer => "InlineUIContainer",
            ElementKind::BlockUIContainer => "BlockUIContainer",
            ElementKind::Image => "Image",
            ElementKind::Table => "Table",
            ElementKind::TableColumns => "Table.Columns",
            ElementKind::TableColumn => "TableColumn",
            ElementKind::TableRowGroup => "TableRowGroup",
            ElementKind::TableRow => "TableRow",
            ElementKind::TableCell => "TableCell",
            ElementKind::List => "List",
            ElementKind::ListItem => "ListItem",
            ElementKind::Unknown => "",
        }
    }

    /// Elements that live inside paragraphs.
    #[inline]
    pub fn is_inline(self) -> bool {
        matches!(
            self,
            ElementKind::Run
                | ElementKind::Span
                | ElementKind::Bold
                | ElementKind::Italic
                | ElementKind::Underline
                | ElementKind::Hyperlink
                | ElementKind::LineBreak
                | ElementKind::InlineUIContainer
        )
    }

    /// Elements that hold blocks or are blocks themselves.
    #[inline]
    pub fn is_block(self) -> bool {
        matches!(
            self,
            ElementKind::FlowDocument
                | ElementKind::Section
                | ElementKind::Paragraph
                | ElementKind::BlockUIContainer
                | ElementKind::Table
                | ElementKind::TableRowGroup
                | ElementKind::TableRow
                | ElementKind::TableCell
                | ElementKind::List
                | ElementKind::ListItem
        )
    }
}
