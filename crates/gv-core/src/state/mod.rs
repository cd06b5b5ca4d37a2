//! Workspace store: per-workspace datasets and selection, and the current-workspace pointer

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::WorkspaceError;
use crate::model::{Dataset, ValueRange};
use crate::settings::StyleSettings;
use crate::sync::SelectionEngine;

/// Workspace identifier; never reused within a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkspaceId(pub u32);

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Proof that an import was started on a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportTicket {
    pub workspace: WorkspaceId,
    pub id: u64,
}

/// Import lifecycle of a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportState {
    #[default]
    Idle,
    InProgress(u64),
}

/// An isolated map/table/chart session with its own dataset and selection
pub struct Workspace {
    id: WorkspaceId,
    name: String,
    dataset: Option<Arc<Dataset>>,
    selection: SelectionEngine,
    map_property: Option<String>,
    chart_property: Option<String>,
    /// Cached min/max of the active map property
    range: Option<ValueRange>,
    import: ImportState,
}

impl Workspace {
    fn new(id: WorkspaceId) -> Self {
        Self {
            id,
            name: format!("Workspace {}", id),
            dataset: None,
            selection: SelectionEngine::new(id),
            map_property: None,
            chart_property: None,
            range: None,
            import: ImportState::Idle,
        }
    }

    pub fn id(&self) -> WorkspaceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        self.dataset.as_ref()
    }

    /// The dataset, or the user-facing "import first" error
    pub fn require_dataset(&self) -> Result<&Arc<Dataset>, WorkspaceError> {
        self.dataset.as_ref().ok_or(WorkspaceError::NoDataset)
    }

    pub fn selection(&self) -> &SelectionEngine {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionEngine {
        &mut self.selection
    }

    pub fn map_property(&self) -> Option<&str> {
        self.map_property.as_deref()
    }

    pub fn chart_property(&self) -> Option<&str> {
        self.chart_property.as_deref()
    }

    pub fn range(&self) -> Option<ValueRange> {
        self.range
    }

    pub fn import_state(&self) -> ImportState {
        self.import
    }

    /// Install a new dataset. The selection is cleared and the active
    /// properties fall back to the first numeric property.
    pub fn replace_dataset(&mut self, dataset: Arc<Dataset>, settings: &StyleSettings) {
        let first_numeric = dataset.numeric_properties().into_iter().next();
        info!(
            workspace = %self.id,
            dataset = dataset.name(),
            features = dataset.len(),
            "Installing dataset"
        );

        self.selection.reset(dataset.len(), settings);
        self.range = first_numeric.as_deref().and_then(|p| dataset.value_range(p));
        self.map_property = first_numeric.clone();
        self.chart_property = first_numeric;
        self.dataset = Some(dataset);
    }

    /// Select the property used for map coloring and cache its range
    pub fn set_map_property(
        &mut self,
        property: &str,
    ) -> Result<Option<ValueRange>, WorkspaceError> {
        let dataset = self.require_dataset()?;
        check_numeric(dataset, property)?;

        self.range = dataset.value_range(property);
        self.map_property = Some(property.to_string());
        debug!(workspace = %self.id, property, range = ?self.range, "Map property changed");
        Ok(self.range)
    }

    /// Select the property shown by the histogram.
    ///
    /// The selection is cleared when the property actually changes, because
    /// the bins it was made from no longer exist.
    pub fn set_chart_property(
        &mut self,
        property: &str,
        settings: &StyleSettings,
    ) -> Result<bool, WorkspaceError> {
        let dataset = self.require_dataset()?;
        check_numeric(dataset, property)?;

        if self.chart_property.as_deref() == Some(property) {
            return Ok(false);
        }

        self.chart_property = Some(property.to_string());
        self.selection.clear(settings);
        debug!(workspace = %self.id, property, "Chart property changed");
        Ok(true)
    }

    fn begin_import(&mut self, id: u64) -> Result<ImportTicket, WorkspaceError> {
        if let ImportState::InProgress(_) = self.import {
            return Err(WorkspaceError::ImportInProgress(self.id));
        }
        self.import = ImportState::InProgress(id);
        Ok(ImportTicket { workspace: self.id, id })
    }

    fn end_import(&mut self, ticket: ImportTicket) -> Result<(), WorkspaceError> {
        match self.import {
            ImportState::InProgress(id) if id == ticket.id => {
                self.import = ImportState::Idle;
                Ok(())
            }
            _ => Err(WorkspaceError::StaleImport {
                workspace: self.id,
                ticket: ticket.id,
            }),
        }
    }
}

fn check_numeric(dataset: &Dataset, property: &str) -> Result<(), WorkspaceError> {
    if !dataset.property_names().iter().any(|p| p == property) {
        return Err(WorkspaceError::UnknownProperty(property.to_string()));
    }
    if !dataset.is_numeric_property(property) {
        return Err(WorkspaceError::NonNumericProperty(property.to_string()));
    }
    Ok(())
}

/// All open workspaces plus the current-workspace pointer
pub struct WorkspaceStore {
    workspaces: IndexMap<WorkspaceId, Workspace>,
    current: WorkspaceId,
    next_id: u32,
    next_ticket: u64,
}

impl Default for WorkspaceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceStore {
    /// Create a store holding workspace 1 as the current workspace
    pub fn new() -> Self {
        let first = WorkspaceId(1);
        let mut workspaces = IndexMap::new();
        workspaces.insert(first, Workspace::new(first));

        Self {
            workspaces,
            current: first,
            next_id: 2,
            next_ticket: 1,
        }
    }

    pub fn current_id(&self) -> WorkspaceId {
        self.current
    }

    pub fn current(&self) -> &Workspace {
        &self.workspaces[&self.current]
    }

    pub fn current_mut(&mut self) -> &mut Workspace {
        self.workspaces
            .get_mut(&self.current)
            .expect("current workspace is always present")
    }

    pub fn get(&self, id: WorkspaceId) -> Option<&Workspace> {
        self.workspaces.get(&id)
    }

    pub fn get_mut(&mut self, id: WorkspaceId) -> Option<&mut Workspace> {
        self.workspaces.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.workspaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }

    /// Workspace ids in creation order
    pub fn ids(&self) -> Vec<WorkspaceId> {
        self.workspaces.keys().copied().collect()
    }

    /// Create a workspace. The caller decides whether to switch to it.
    pub fn add(&mut self) -> WorkspaceId {
        let id = WorkspaceId(self.next_id);
        self.next_id += 1;
        self.workspaces.insert(id, Workspace::new(id));
        info!(workspace = %id, "Workspace created");
        id
    }

    /// Make `id` the current workspace
    pub fn switch(&mut self, id: WorkspaceId) -> Result<(), WorkspaceError> {
        if !self.workspaces.contains_key(&id) {
            return Err(WorkspaceError::NotFound(id));
        }
        self.current = id;
        debug!(workspace = %id, "Switched workspace");
        Ok(())
    }

    /// Close a workspace. Closing the current one switches to the first remaining.
    ///
    /// Returns the closed workspace.
    pub fn close(&mut self, id: WorkspaceId) -> Result<Workspace, WorkspaceError> {
        if !self.workspaces.contains_key(&id) {
            return Err(WorkspaceError::NotFound(id));
        }
        if self.workspaces.len() == 1 {
            return Err(WorkspaceError::LastWorkspace);
        }

        let closed = self
            .workspaces
            .shift_remove(&id)
            .ok_or(WorkspaceError::NotFound(id))?;

        if self.current == id {
            if let Some(first) = self.workspaces.keys().next().copied() {
                self.current = first;
            }
        }

        info!(workspace = %id, current = %self.current, "Workspace closed");
        Ok(closed)
    }

    pub fn rename(&mut self, id: WorkspaceId, name: &str) -> Result<(), WorkspaceError> {
        let workspace = self.workspaces.get_mut(&id).ok_or(WorkspaceError::NotFound(id))?;
        let name = name.trim();
        if !name.is_empty() {
            workspace.name = name.to_string();
        }
        Ok(())
    }

    /// Mark the current workspace as importing. A second concurrent import is rejected.
    pub fn begin_import(&mut self) -> Result<ImportTicket, WorkspaceError> {
        let ticket_id = self.next_ticket;
        let ticket = self.current_mut().begin_import(ticket_id)?;
        self.next_ticket += 1;
        Ok(ticket)
    }

    /// Close an import and hand back the workspace it targets
    pub fn end_import(&mut self, ticket: ImportTicket) -> Result<&mut Workspace, WorkspaceError> {
        let workspace = self
            .workspaces
            .get_mut(&ticket.workspace)
            .ok_or(WorkspaceError::NotFound(ticket.workspace))?;
        workspace.end_import(ticket)?;
        Ok(workspace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::dataset;

    #[test]
    fn test_store_starts_with_workspace_one() {
        let store = WorkspaceStore::new();
        assert_eq!(store.current_id(), WorkspaceId(1));
        assert_eq!(store.current().name(), "Workspace 1");
        assert!(store.current().dataset().is_none());
    }

    #[test]
    fn test_last_workspace_cannot_close() {
        let mut store = WorkspaceStore::new();
        assert_eq!(store.close(WorkspaceId(1)).err(), Some(WorkspaceError::LastWorkspace));
    }

    #[test]
    fn test_close_current_switches_to_first_remaining() {
        let mut store = WorkspaceStore::new();
        let second = store.add();
        let third = store.add();
        store.switch(third).unwrap();

        store.close(third).unwrap();
        assert_eq!(store.current_id(), WorkspaceId(1));
        assert_eq!(store.ids(), vec![WorkspaceId(1), second]);

        // ids are not reused
        assert_eq!(store.add(), WorkspaceId(4));
    }

    #[test]
    fn test_switch_to_unknown_workspace() {
        let mut store = WorkspaceStore::new();
        assert_eq!(store.switch(WorkspaceId(7)), Err(WorkspaceError::NotFound(WorkspaceId(7))));
    }

    #[test]
    fn test_rename_ignores_blank() {
        let mut store = WorkspaceStore::new();
        store.rename(WorkspaceId(1), "Parcels").unwrap();
        store.rename(WorkspaceId(1), "   ").unwrap();
        assert_eq!(store.current().name(), "Parcels");
    }

    #[test]
    fn test_replace_dataset_clears_selection() {
        let settings = StyleSettings::default();
        let mut store = WorkspaceStore::new();
        let ws = store.current_mut();
        ws.replace_dataset(Arc::new(dataset(&[1.0, 2.0, 3.0])), &settings);
        ws.selection_mut().set_selection([0, 2], &settings);

        ws.replace_dataset(Arc::new(dataset(&[5.0])), &settings);
        assert!(ws.selection().selection().is_empty());
        assert_eq!(ws.map_property(), Some("P"));
        assert_eq!(ws.range(), Some(ValueRange { min: 5.0, max: 5.0 }));
        assert!(!ws.selection_mut().toggle(1, &settings));
    }

    #[test]
    fn test_chart_property_change_clears_selection() {
        let settings = StyleSettings::default();
        let mut store = WorkspaceStore::new();
        let ws = store.current_mut();
        ws.replace_dataset(Arc::new(dataset(&[1.0, 2.0])), &settings);
        ws.selection_mut().toggle(1, &settings);

        // same property: selection kept
        assert!(!ws.set_chart_property("P", &settings).unwrap());
        assert!(ws.selection().is_selected(1));

        assert_eq!(
            ws.set_chart_property("Name", &settings),
            Err(WorkspaceError::NonNumericProperty("Name".to_string()))
        );
        assert_eq!(
            ws.set_chart_property("Missing", &settings),
            Err(WorkspaceError::UnknownProperty("Missing".to_string()))
        );
        assert!(ws.selection().is_selected(1));
    }

    #[test]
    fn test_property_requires_dataset() {
        let mut store = WorkspaceStore::new();
        assert_eq!(store.current_mut().set_map_property("P"), Err(WorkspaceError::NoDataset));
    }

    #[test]
    fn test_concurrent_import_rejected() {
        let mut store = WorkspaceStore::new();
        let ticket = store.begin_import().unwrap();
        assert_eq!(store.begin_import(), Err(WorkspaceError::ImportInProgress(WorkspaceId(1))));

        store.end_import(ticket).unwrap();
        assert_eq!(store.current().import_state(), ImportState::Idle);
        assert!(matches!(store.end_import(ticket), Err(WorkspaceError::StaleImport { .. })));
        assert!(store.begin_import().is_ok());
    }

    #[test]
    fn test_import_on_closed_workspace() {
        let mut store = WorkspaceStore::new();
        let second = store.add();
        store.switch(second).unwrap();
        let ticket = store.begin_import().unwrap();
        store.close(second).unwrap();

        assert!(matches!(store.end_import(ticket), Err(WorkspaceError::NotFound(_))));
    }
}
