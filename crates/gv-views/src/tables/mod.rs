//! Table view adapter

use ahash::AHashSet;
use egui::Color32;
use gv_core::{
    Dataset, SelectionChange, SelectionContext, SelectionSubscriber, SettingsDelta, StyleSettings,
};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::surface::{TableRow, TableSurface};

const ROW_PREFIX: &str = "row-";

/// Row id of a feature
pub fn row_id(index: usize) -> String {
    format!("{}{}", ROW_PREFIX, index)
}

/// Parse a `row-{index}` id
pub fn parse_row_id(id: &str) -> Option<usize> {
    id.strip_prefix(ROW_PREFIX)?.parse().ok()
}

struct TableState {
    surface: Box<dyn TableSurface>,
    rows: usize,
    highlighted: AHashSet<usize>,
    highlight_color: Option<Color32>,
}

/// Drives the attribute table of one workspace
pub struct TableAdapter {
    state: Mutex<TableState>,
}

impl TableAdapter {
    pub fn new(surface: Box<dyn TableSurface>) -> Self {
        Self {
            state: Mutex::new(TableState {
                surface,
                rows: 0,
                highlighted: AHashSet::new(),
                highlight_color: None,
            }),
        }
    }

    /// Render the header and one row per feature
    pub fn render(&self, dataset: &Dataset, settings: &StyleSettings) {
        let header = dataset.property_names();
        let rows: Vec<TableRow> = dataset
            .features()
            .iter()
            .map(|feature| TableRow {
                id: row_id(feature.index()),
                cells: header
                    .iter()
                    .map(|name| feature.property(name).map(ToString::to_string).unwrap_or_default())
                    .collect(),
            })
            .collect();

        let mut state = self.state.lock();
        state.surface.set_highlight_color(settings.row_highlight_color);
        state.surface.render(&header, &rows);
        state.rows = rows.len();
        state.highlighted.clear();
        state.highlight_color = Some(settings.row_highlight_color);

        debug!(rows = rows.len(), columns = header.len(), "Table rendered");
    }

    pub fn is_rendered(&self) -> bool {
        self.state.lock().highlight_color.is_some()
    }

    /// Feature index of a clicked row, `None` for malformed or unknown ids
    pub fn row_index(&self, id: &str) -> Option<usize> {
        let rows = self.state.lock().rows;
        match parse_row_id(id).filter(|&i| i < rows) {
            Some(index) => Some(index),
            None => {
                warn!(row = id, "Click on unknown table row");
                None
            }
        }
    }

    /// Rows currently drawn highlighted, ascending
    pub fn highlighted(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self.state.lock().highlighted.iter().copied().collect();
        rows.sort_unstable();
        rows
    }

    pub fn apply_settings(&self, delta: &SettingsDelta, settings: &StyleSettings) {
        if !delta.row_color_changed {
            return;
        }
        let mut state = self.state.lock();
        if state.highlight_color.is_some() {
            state.surface.set_highlight_color(settings.row_highlight_color);
            state.highlight_color = Some(settings.row_highlight_color);
        }
    }
}

impl SelectionSubscriber for TableAdapter {
    fn on_selection_changed(&self, ctx: &SelectionContext<'_>) {
        let mut state = self.state.lock();
        let TableState {
            surface,
            rows,
            highlighted,
            ..
        } = &mut *state;

        for index in 0..*rows {
            let selected = ctx.selection.contains(index);
            if selected != highlighted.contains(&index) {
                surface.set_row_highlighted(&row_id(index), selected);
                if selected {
                    highlighted.insert(index);
                } else {
                    highlighted.remove(&index);
                }
            }
        }

        if let SelectionChange::Toggled { index, selected: true } = ctx.change {
            if index < *rows {
                surface.scroll_into_view(&row_id(index));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{point, Geometry};
    use gv_core::{Properties, PropertyValue, SelectionSet, WorkspaceId};
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorded {
        header: Vec<String>,
        rows: Vec<TableRow>,
        highlights: Vec<(String, bool)>,
        scrolled: Vec<String>,
    }

    struct RecordingTable(Arc<Mutex<Recorded>>);

    impl TableSurface for RecordingTable {
        fn render(&mut self, header: &[String], rows: &[TableRow]) {
            let mut rec = self.0.lock();
            rec.header = header.to_vec();
            rec.rows = rows.to_vec();
        }

        fn set_row_highlighted(&mut self, row_id: &str, highlighted: bool) {
            self.0.lock().highlights.push((row_id.to_string(), highlighted));
        }

        fn scroll_into_view(&mut self, row_id: &str) {
            self.0.lock().scrolled.push(row_id.to_string());
        }

        fn set_highlight_color(&mut self, _color: Color32) {}
    }

    fn rendered() -> (TableAdapter, Arc<Mutex<Recorded>>) {
        let dataset = Dataset::new(
            "t",
            (0..3).map(|i| {
                let mut props = Properties::new();
                props.insert("id".to_string(), PropertyValue::Number(i as f64));
                props.insert("name".to_string(), PropertyValue::Text(format!("n{}", i)));
                (Geometry::Point(point!(x: 0.0, y: 0.0)), props)
            }),
        );
        let rec = Arc::new(Mutex::new(Recorded::default()));
        let adapter = TableAdapter::new(Box::new(RecordingTable(rec.clone())));
        adapter.render(&dataset, &StyleSettings::default());
        (adapter, rec)
    }

    fn notify(adapter: &TableAdapter, selection: &SelectionSet, change: SelectionChange) {
        adapter.on_selection_changed(&SelectionContext {
            workspace: WorkspaceId(1),
            selection,
            change,
            settings: &StyleSettings::default(),
        });
    }

    #[test]
    fn test_render_rows() {
        let (_, rec) = rendered();
        let rec = rec.lock();
        assert_eq!(rec.header, vec!["id", "name"]);
        assert_eq!(rec.rows[2].id, "row-2");
        assert_eq!(rec.rows[2].cells, vec!["2", "n2"]);
    }

    #[test]
    fn test_scroll_only_on_single_select() {
        let (adapter, rec) = rendered();

        let one: SelectionSet = [1].into_iter().collect();
        notify(&adapter, &one, SelectionChange::Toggled { index: 1, selected: true });
        let deselect = SelectionChange::Toggled {
            index: 1,
            selected: false,
        };
        notify(&adapter, &SelectionSet::new(), deselect);
        let many: SelectionSet = [0, 2].into_iter().collect();
        notify(&adapter, &many, SelectionChange::Replaced);

        let rec = rec.lock();
        assert_eq!(rec.scrolled, vec!["row-1"]);
        assert_eq!(adapter.highlighted(), vec![0, 2]);
    }

    #[test]
    fn test_row_ids() {
        let (adapter, _) = rendered();
        assert_eq!(adapter.row_index("row-2"), Some(2));
        assert_eq!(adapter.row_index("row-3"), None);
        assert_eq!(adapter.row_index("feature-1"), None);
        assert_eq!(parse_row_id("row-x"), None);
    }
}
