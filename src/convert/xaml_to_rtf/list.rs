//! List numbering for XAML to RTF conversion.
//!
//! Every outermost `List` becomes one `\list` definition with a matching
//! `\listoverride`; nested lists become its deeper levels.

use crate::rtf::{ListDefinition, ListLevel, ListTable};
use crate::vocabulary::MarkerStyle;
use tracing::trace;

/// Deepest `\ilvl` RTF supports.
const MAX_LEVEL: usize = 8;

/// List membership of one paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParagraph {
    /// `\ls` override index
    pub ls: i32,
    /// `\ilvl`
    pub level: i32,
    /// `\listtext` for the first paragraph of an item
    pub marker: Option<String>,
}

#[derive(Debug)]
struct OpenList {
    ls: i32,
    level: usize,
    marker: MarkerStyle,
    /// Items started so far
    items: i32,
    /// The current item has not written its marker yet
    marker_pending: bool,
}

#[derive(Debug, Default)]
pub struct ListBuilder {
    table: ListTable,
    open: Vec<OpenList>,
}

impl ListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> &ListTable {
        &self.table
    }

    /// A `List` element starts.
    pub fn open(&mut self, marker: MarkerStyle) {
        let level = self.open.len().min(MAX_LEVEL);
        let ls = match self.open.first() {
            Some(outer) => outer.ls,
            None => {
                let id = self.table.lists.len() as i32 + 1;
                self.table.lists.push(ListDefinition {
                    id,
                    levels: Vec::new(),
                });
                self.table.overrides.push((id, id));
                id
            },
        };

        if let Some(def) = self.table.lists.iter_mut().find(|l| l.id == ls) {
            // The first list seen at a level defines it
            while def.levels.len() <= level {
                let depth = def.levels.len() as u8;
                def.levels.push(ListLevel {
                    number_format: marker.number_format(),
                    text: marker.level_text(depth),
                    start_at: 1,
                });
            }
        }
        trace!("List {} level {} opened as {}", ls, level, marker.name());

        self.open.push(OpenList {
            ls,
            level,
            marker,
            items: 0,
            marker_pending: false,
        });
    }

    pub fn close(&mut self) {
        self.open.pop();
    }

    /// A `ListItem` element starts.
    pub fn start_item(&mut self) {
        if let Some(list) = self.open.last_mut() {
            list.items += 1;
            list.marker_pending = true;
        }
    }

    /// List membership for a paragraph starting now.
    pub fn paragraph(&mut self) -> Option<ListParagraph> {
        let list = self.open.last_mut()?;
        let marker = std::mem::take(&mut list.marker_pending)
            .then(|| list.marker.marker_text(list.items))
            .filter(|text| !text.is_empty());
        Some(ListParagraph {
            ls: list.ls,
            level: list.level as i32,
            marker,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outer_lists_get_own_definitions() {
        let mut lists = ListBuilder::new();
        lists.open(MarkerStyle::Decimal);
        lists.close();
        lists.open(MarkerStyle::Disc);
        lists.close();

        let table = lists.table();
        assert_eq!(table.lists.len(), 2);
        assert_eq!(table.overrides, vec![(1, 1), (2, 2)]);
        assert_eq!(table.level(2, 0).map(|l| l.number_format), Some(23));
    }

    #[test]
    fn test_nested_list_defines_next_level() {
        let mut lists = ListBuilder::new();
        lists.open(MarkerStyle::Decimal);
        lists.start_item();
        lists.open(MarkerStyle::LowerLatin);
        lists.start_item();

        let para = lists.paragraph().unwrap();
        assert_eq!(para.ls, 1);
        assert_eq!(para.level, 1);
        assert_eq!(para.marker.as_deref(), Some("a."));

        let level = lists.table().level(1, 1).unwrap();
        assert_eq!(level.number_format, 4);
        assert_eq!(level.text, "\u{1}.");
    }

    #[test]
    fn test_marker_only_on_first_paragraph_of_item() {
        let mut lists = ListBuilder::new();
        assert_eq!(lists.paragraph(), None);

        lists.open(MarkerStyle::Decimal);
        lists.start_item();
        lists.start_item();
        assert_eq!(lists.paragraph().unwrap().marker.as_deref(), Some("2."));
        assert_eq!(lists.paragraph().unwrap().marker, None);
    }
}
