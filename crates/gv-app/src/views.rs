//! Per-workspace view adapters and the host hook that supplies their surfaces

use std::sync::Arc;

use gv_core::{Dataset, SelectionEngine, StyleSettings, Workspace, WorkspaceId};
use gv_views::{ChartAdapter, ChartSurface, MapAdapter, MapSurface, TableAdapter, TableSurface};

/// Rendering targets for one workspace
pub struct WorkspaceSurfaces {
    pub map: Box<dyn MapSurface>,
    pub table: Box<dyn TableSurface>,
    pub chart: Box<dyn ChartSurface>,
}

/// Host hook creating the map, table and chart widgets of a new workspace
pub trait SurfaceFactory: Send + Sync {
    fn create(&self, workspace: WorkspaceId) -> WorkspaceSurfaces;
}

/// The three linked views of a workspace
pub struct WorkspaceViews {
    pub map: Arc<MapAdapter>,
    pub table: Arc<TableAdapter>,
    pub chart: Arc<ChartAdapter>,
}

impl WorkspaceViews {
    pub fn new(surfaces: WorkspaceSurfaces) -> Self {
        Self {
            map: Arc::new(MapAdapter::new(surfaces.map)),
            table: Arc::new(TableAdapter::new(surfaces.table)),
            chart: Arc::new(ChartAdapter::new(surfaces.chart)),
        }
    }

    /// Subscribe all three adapters to a selection engine
    pub fn attach(&self, engine: &mut SelectionEngine) {
        engine.subscribe(&self.map);
        engine.subscribe(&self.table);
        engine.subscribe(&self.chart);
    }

    pub fn render_map(&self, workspace: &Workspace, dataset: &Dataset, settings: &StyleSettings) {
        self.map
            .render(dataset, workspace.map_property(), workspace.range(), settings);
    }

    /// Returns `false` when the workspace has no chartable property
    pub fn render_chart(
        &self,
        workspace: &Workspace,
        dataset: &Dataset,
        settings: &StyleSettings,
    ) -> bool {
        match workspace.chart_property() {
            Some(property) => self
                .chart
                .render(dataset, property, settings, workspace.selection().selection()),
            None => false,
        }
    }
}
