//! Application controller
//!
//! Owns the workspace store, the global settings and the view adapters of
//! every workspace. Every user interaction of the host is routed through an
//! [`App`] method, which always targets the current workspace.

use std::path::PathBuf;
use std::sync::Arc;

use gv_core::events::events::{
    DatasetImported, ImportFailed, SettingsSaved, WorkspaceClosed, WorkspaceCreated,
    WorkspaceSwitched,
};
use gv_core::{
    Dataset, EventBus, ImportTicket, Notice, Notifier, SettingsDelta, SettingsForm, SettingsStore,
    StyleSettings, Workspace, WorkspaceError, WorkspaceId, WorkspaceStore,
};
use gv_data::{
    dataset_from_collection, parse_geojson, FeatureDecoder, ShapefileDecoder, ShapefilePair,
};
use gv_views::ShapeHandle;
use indexmap::IndexMap;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, Result};
use crate::views::{SurfaceFactory, WorkspaceViews};

/// Input handed to [`App::import`]
#[derive(Debug, Clone)]
pub enum ImportSource {
    /// Paths picked in the host's file dialog; either may be missing
    ShapefilePaths { shp: Option<PathBuf>, dbf: Option<PathBuf> },
    /// Already-read shapefile bytes
    Shapefile(ShapefilePair),
    GeoJson { name: String, text: String },
}

/// Read, decode and convert an input into a dataset
pub async fn load_dataset(decoder: &dyn FeatureDecoder, source: ImportSource) -> Result<Dataset> {
    let (name, collection) = match source {
        ImportSource::ShapefilePaths { shp, dbf } => {
            let pair = ShapefilePair::read(shp.as_deref(), dbf.as_deref()).await?;
            debug!(decoder = decoder.decoder_name(), file = %pair.name, "Decoding shapefile");
            (pair.name.clone(), decoder.decode(pair).await?)
        }
        ImportSource::Shapefile(pair) => (pair.name.clone(), decoder.decode(pair).await?),
        ImportSource::GeoJson { name, text } => {
            let collection = parse_geojson(&text)?;
            (name, collection)
        }
    };

    Ok(dataset_from_collection(name, collection)?)
}

/// The multi-workspace linked-views application
pub struct App {
    store: WorkspaceStore,
    settings: SettingsStore,
    events: EventBus,
    notifier: Arc<dyn Notifier>,
    surfaces: Arc<dyn SurfaceFactory>,
    decoder: Arc<dyn FeatureDecoder>,
    views: IndexMap<WorkspaceId, WorkspaceViews>,
}

impl App {
    pub fn new(surfaces: Arc<dyn SurfaceFactory>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_settings(surfaces, notifier, StyleSettings::default())
    }

    pub fn with_settings(
        surfaces: Arc<dyn SurfaceFactory>,
        notifier: Arc<dyn Notifier>,
        settings: StyleSettings,
    ) -> Self {
        let mut store = WorkspaceStore::new();
        let first = store.current_id();
        let views = WorkspaceViews::new(surfaces.create(first));
        views.attach(store.current_mut().selection_mut());

        let mut all_views = IndexMap::new();
        all_views.insert(first, views);

        Self {
            store,
            settings: SettingsStore::new(settings),
            events: EventBus::new(),
            notifier,
            surfaces,
            decoder: Arc::new(ShapefileDecoder),
            views: all_views,
        }
    }

    /// Replace the shapefile decoder
    pub fn with_decoder(mut self, decoder: Arc<dyn FeatureDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn store(&self) -> &WorkspaceStore {
        &self.store
    }

    pub fn current_workspace(&self) -> &Workspace {
        self.store.current()
    }

    pub fn views(&self, id: WorkspaceId) -> Option<&WorkspaceViews> {
        self.views.get(&id)
    }

    pub fn current_views(&self) -> Option<&WorkspaceViews> {
        self.views.get(&self.store.current_id())
    }

    fn report(&self, err: &AppError) {
        self.notifier.notify(Notice::error(err.to_string()));
    }

    fn report_result<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.report(err);
        }
        result
    }

    /// Current dataset, or the "import first" notice
    fn require_dataset(&self) -> Result<Arc<Dataset>> {
        let dataset = self.store.current().require_dataset().cloned();
        self.report_result(dataset.map_err(AppError::from))
    }

    fn resync_current(&self) {
        let settings = self.settings.get();
        self.store.current().selection().resync(&settings);
    }

    // Workspaces

    /// Create a workspace and make it current
    pub fn add_workspace(&mut self) -> WorkspaceId {
        let id = self.store.add();
        self.views.insert(id, WorkspaceViews::new(self.surfaces.create(id)));
        self.events.publish(WorkspaceCreated { workspace: id });

        if let Err(err) = self.switch_workspace(id) {
            error!(workspace = %id, %err, "Failed to switch to new workspace");
        }
        id
    }

    /// Make `id` current: detach the old views, attach and resync the new ones
    pub fn switch_workspace(&mut self, id: WorkspaceId) -> Result<()> {
        let from = self.store.current_id();
        let switched = self.store.switch(id).map_err(AppError::from);
        self.report_result(switched)?;
        if from == id {
            return Ok(());
        }

        if let Some(old) = self.store.get_mut(from) {
            old.selection_mut().detach_all();
        }
        self.activate_current();

        info!(%from, to = %id, "Workspace switched");
        self.events.publish(WorkspaceSwitched { from, to: id });
        Ok(())
    }

    fn activate_current(&mut self) {
        let id = self.store.current_id();
        let Some(views) = self.views.get(&id) else {
            warn!(workspace = %id, "Workspace has no views");
            return;
        };

        let engine = self.store.current_mut().selection_mut();
        engine.detach_all();
        views.attach(engine);
        self.resync_current();
        views.map.invalidate_size();
    }

    pub fn close_workspace(&mut self, id: WorkspaceId) -> Result<()> {
        let was_current = self.store.current_id() == id;
        let closed = self.store.close(id).map_err(AppError::from);
        let mut closed = self.report_result(closed)?;

        closed.selection_mut().detach_all();
        self.views.shift_remove(&id);
        if was_current {
            self.activate_current();
        }

        self.events.publish(WorkspaceClosed { workspace: id });
        Ok(())
    }

    pub fn rename_workspace(&mut self, id: WorkspaceId, name: &str) -> Result<()> {
        let renamed = self.store.rename(id, name).map_err(AppError::from);
        self.report_result(renamed)
    }

    // Import

    /// Start an import on the current workspace
    pub fn begin_import(&mut self) -> Result<ImportTicket> {
        let ticket = self.store.begin_import().map_err(AppError::from);
        let ticket = self.report_result(ticket)?;
        info!(workspace = %ticket.workspace, ticket = ticket.id, "Import started");
        Ok(ticket)
    }

    /// Complete an import started with [`App::begin_import`].
    ///
    /// The dataset goes to the workspace that was current when the import
    /// began. If that workspace has been closed the result is dropped.
    pub fn finish_import(&mut self, ticket: ImportTicket, outcome: Result<Dataset>) -> Result<()> {
        let settings = self.settings.get();
        let workspace = match self.store.end_import(ticket) {
            Ok(workspace) => workspace,
            Err(err @ WorkspaceError::NotFound(_)) => {
                warn!(
                    workspace = %ticket.workspace,
                    "Import finished for a closed workspace; result dropped"
                );
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };

        let dataset = match outcome {
            Ok(dataset) => Arc::new(dataset),
            Err(err) => {
                error!(workspace = %ticket.workspace, %err, "Import failed");
                self.events.publish(ImportFailed {
                    workspace: ticket.workspace,
                    error: err.to_string(),
                });
                self.report(&err);
                return Err(err);
            }
        };

        workspace.replace_dataset(dataset.clone(), &settings);
        let workspace = &*workspace;

        if let Some(views) = self.views.get(&ticket.workspace) {
            views.render_map(workspace, &dataset, &settings);
            views.table.render(&dataset, &settings);
            views.render_chart(workspace, &dataset, &settings);
        }
        if ticket.workspace == self.store.current_id() {
            self.resync_current();
        }

        self.events.publish(DatasetImported {
            workspace: ticket.workspace,
            name: dataset.name().to_string(),
            feature_count: dataset.len(),
            property_count: dataset.property_names().len(),
        });
        Ok(())
    }

    /// Import into the current workspace in one step
    pub async fn import(&mut self, source: ImportSource) -> Result<()> {
        let ticket = self.begin_import()?;
        let decoder = self.decoder.clone();
        let outcome = load_dataset(decoder.as_ref(), source).await;
        self.finish_import(ticket, outcome)
    }

    // Views

    pub fn show_map(&mut self) -> Result<()> {
        let dataset = self.require_dataset()?;
        let settings = self.settings.get();
        if let Some(views) = self.current_views() {
            views.render_map(self.store.current(), &dataset, &settings);
            views.map.invalidate_size();
        }
        self.resync_current();
        Ok(())
    }

    pub fn show_table(&mut self) -> Result<()> {
        let dataset = self.require_dataset()?;
        let settings = self.settings.get();
        if let Some(views) = self.current_views() {
            views.table.render(&dataset, &settings);
        }
        self.resync_current();
        Ok(())
    }

    /// Show the histogram of `property`, or of the active chart property
    pub fn select_histogram_property(&mut self, property: Option<&str>) -> Result<()> {
        let dataset = self.require_dataset()?;
        let settings = self.settings.get();

        let property = match property
            .map(str::to_string)
            .or_else(|| dataset.numeric_properties().into_iter().next())
        {
            Some(property) => property,
            None => return self.report_result(Err(AppError::NoNumericProperties("histogram"))),
        };

        let changed = self
            .store
            .current_mut()
            .set_chart_property(&property, &settings)
            .map_err(AppError::from);
        self.report_result(changed)?;

        if let Some(views) = self.current_views() {
            views.render_chart(self.store.current(), &dataset, &settings);
        }
        self.resync_current();
        Ok(())
    }

    pub fn set_chart_property(&mut self, property: &str) -> Result<()> {
        self.select_histogram_property(Some(property))
    }

    /// Recolor the map by `property`
    pub fn set_map_property(&mut self, property: &str) -> Result<()> {
        let dataset = self.require_dataset()?;
        let settings = self.settings.get();

        let range = self.store.current_mut().set_map_property(property).map_err(AppError::from);
        self.report_result(range)?;

        if let Some(views) = self.current_views() {
            views.render_map(self.store.current(), &dataset, &settings);
        }
        self.resync_current();
        Ok(())
    }

    /// Change the histogram bin count from raw user input.
    ///
    /// Invalid input keeps the previous bins.
    pub fn set_bin_count(&mut self, raw: &str) -> Result<usize> {
        let bins = self.settings.set_bin_count(raw).map_err(AppError::from);
        let bins = self.report_result(bins)?;
        self.rerender_charts();
        Ok(bins)
    }

    fn rerender_charts(&self) {
        let settings = self.settings.get();
        for (id, views) in &self.views {
            let Some(workspace) = self.store.get(*id) else {
                continue;
            };
            if let (Some(dataset), true) = (workspace.dataset(), views.chart.is_rendered()) {
                views.render_chart(workspace, dataset, &settings);
            }
        }
    }

    // Interactions

    /// Toggle the feature behind a clicked map shape
    pub fn click_shape(&mut self, handle: ShapeHandle) -> bool {
        let Some(index) = self.current_views().and_then(|v| v.map.feature_at(handle)) else {
            return false;
        };
        self.toggle(index)
    }

    /// Toggle the feature behind a clicked table row
    pub fn click_row(&mut self, row_id: &str) -> bool {
        let Some(index) = self.current_views().and_then(|v| v.table.row_index(row_id)) else {
            return false;
        };
        self.toggle(index)
    }

    fn toggle(&mut self, index: usize) -> bool {
        let settings = self.settings.get();
        self.store.current_mut().selection_mut().toggle(index, &settings)
    }

    /// Apply a histogram bar click under the configured bin-click mode
    pub fn click_bin(&mut self, bin: usize) -> bool {
        let settings = self.settings.get();
        let selection = self.store.current().selection().selection();
        let Some(indices) = self
            .current_views()
            .and_then(|v| v.chart.bin_click(bin, settings.bin_click, selection))
        else {
            return false;
        };

        self.store
            .current_mut()
            .selection_mut()
            .set_selection(indices, &settings);
        true
    }

    /// Box or lasso selection over several bars. The selection becomes the
    /// union of their features; an empty selection clears it.
    pub fn select_bins(&mut self, bins: &[usize]) -> bool {
        if bins.is_empty() {
            self.reset_selection();
            return true;
        }

        let Some(indices) = self.current_views().and_then(|v| v.chart.bins_union(bins)) else {
            return false;
        };
        let settings = self.settings.get();
        self.store
            .current_mut()
            .selection_mut()
            .set_selection(indices, &settings);
        true
    }

    /// A click on the chart outside any bar clears the selection
    pub fn click_chart_background(&mut self) {
        self.reset_selection();
    }

    pub fn reset_selection(&mut self) {
        let settings = self.settings.get();
        self.store.current_mut().selection_mut().clear(&settings);
    }

    /// Property names of the current dataset, for the variables list
    pub fn variables(&self) -> Result<Vec<String>> {
        Ok(self.require_dataset()?.property_names())
    }

    // Settings

    pub fn settings_form(&self) -> SettingsForm {
        self.settings.form()
    }

    /// Validate and apply the settings form, restyling every workspace
    pub fn save_settings(&mut self, form: &SettingsForm) -> Result<SettingsDelta> {
        let delta = self.settings.save(form).map_err(AppError::from);
        let delta = self.report_result(delta)?;
        let settings = self.settings.get();

        for (id, views) in &self.views {
            let Some(workspace) = self.store.get(*id) else {
                continue;
            };
            views
                .map
                .apply_settings(&delta, &settings, workspace.selection().selection());
            views.table.apply_settings(&delta, &settings);
        }
        if delta.bin_count_changed {
            self.rerender_charts();
        }

        self.events.publish(SettingsSaved { delta });
        Ok(delta)
    }

    // Auxiliary charts

    /// Plot the cumulative distribution of `property`, or of the first numeric property
    pub fn show_cumulative_distribution(&mut self, property: Option<&str>) -> Result<()> {
        let dataset = self.require_dataset()?;
        let numeric = dataset.numeric_properties();
        if numeric.is_empty() {
            let err = AppError::NoNumericProperties("cumulative distribution plot");
            return self.report_result(Err(err));
        }

        let property = property.unwrap_or(numeric[0].as_str());
        if !dataset.is_numeric_property(property) {
            let err = WorkspaceError::NonNumericProperty(property.to_string());
            return self.report_result(Err(err.into()));
        }

        if let Some(views) = self.current_views() {
            views.chart.render_cdf(&dataset, property);
        }
        Ok(())
    }

    /// Box plot of every numeric property
    pub fn show_box_plot(&mut self) -> Result<()> {
        let dataset = self.require_dataset()?;
        let drawn = self.current_views().map(|v| v.chart.render_box_plot(&dataset)).unwrap_or(0);
        if drawn == 0 {
            return self.report_result(Err(AppError::NoNumericProperties("box plot")));
        }
        Ok(())
    }

    /// Scatter of two numeric properties, defaulting to the first two
    pub fn show_scatter_plot(&mut self, x: Option<&str>, y: Option<&str>) -> Result<()> {
        let dataset = self.require_dataset()?;
        let [x, y] = self.numeric_axes(&dataset, [x, y], "two", "a scatter plot")?;
        if let Some(views) = self.current_views() {
            views.chart.render_scatter(&dataset, &x, &y);
        }
        Ok(())
    }

    /// Heatmap of every numeric property by feature
    pub fn show_heatmap(&mut self) -> Result<()> {
        let dataset = self.require_dataset()?;
        let numeric = dataset.numeric_properties();
        if numeric.len() < 2 {
            return self.report_result(Err(AppError::NotEnoughNumericProperties {
                required: "two",
                plot: "a heatmap",
            }));
        }

        if let Some(views) = self.current_views() {
            views.chart.render_heatmap(&dataset, &numeric);
        }
        Ok(())
    }

    /// 3D scatter of three numeric properties, defaulting to the first three
    pub fn show_3d_scatter(
        &mut self,
        x: Option<&str>,
        y: Option<&str>,
        z: Option<&str>,
    ) -> Result<()> {
        let dataset = self.require_dataset()?;
        let [x, y, z] = self.numeric_axes(&dataset, [x, y, z], "three", "a 3D scatter plot")?;
        if let Some(views) = self.current_views() {
            views.chart.render_scatter_3d(&dataset, &x, &y, &z);
        }
        Ok(())
    }

    /// Resolve the axes of a multi-property chart. Unchosen axes take the
    /// numeric properties in order.
    fn numeric_axes<const N: usize>(
        &self,
        dataset: &Dataset,
        chosen: [Option<&str>; N],
        required: &'static str,
        plot: &'static str,
    ) -> Result<[String; N]> {
        let numeric = dataset.numeric_properties();
        if numeric.len() < N {
            return self.report_result(Err(AppError::NotEnoughNumericProperties { required, plot }));
        }

        let mut axes: [String; N] = std::array::from_fn(|i| numeric[i].clone());
        for (axis, choice) in axes.iter_mut().zip(chosen) {
            if let Some(name) = choice {
                if !dataset.is_numeric_property(name) {
                    let err = WorkspaceError::NonNumericProperty(name.to_string());
                    return self.report_result(Err(err.into()));
                }
                *axis = name.to_string();
            }
        }
        Ok(axes)
    }
}
