//! Map view adapter
//!
//! Draws one overlay shape per feature, colored by the active property, and
//! mirrors the workspace selection as highlight styles. The style each shape
//! was drawn with is kept in a side table so it can be restored when the
//! feature leaves the selection.

mod legend;
mod style;

pub use legend::{Legend, LegendEntry, LEGEND_GRADES};
pub use style::{ShapeStyle, MARKER_FILL_OPACITY, MARKER_RADIUS};

use ahash::AHashSet;
use geo::BoundingRect;
use geo_types::{coord, Rect};
use gv_core::{
    Dataset, Feature, PropertyValue, SelectionContext, SelectionSet, SelectionSubscriber,
    SettingsDelta, StyleSettings, ValueRange,
};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::plots::utils::colors::ramp_color;
use crate::surface::{MapSurface, ShapeHandle};

/// `key: value` lines of every property of a feature
pub fn popup_text(feature: &Feature) -> String {
    feature
        .properties()
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}

fn union(a: Option<Rect<f64>>, b: Rect<f64>) -> Rect<f64> {
    match a {
        None => b,
        Some(a) => Rect::new(
            coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
            coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
        ),
    }
}

struct MapState {
    surface: Box<dyn MapSurface>,
    /// Overlay handles in feature index order
    handles: Vec<ShapeHandle>,
    /// Style each shape was first drawn with, by feature index
    originals: Vec<ShapeStyle>,
    highlighted: AHashSet<usize>,
    legend: Option<Legend>,
}

impl MapState {
    fn highlight(&mut self, index: usize, settings: &StyleSettings) {
        let style = self.originals[index].highlighted(settings);
        self.surface.set_shape_style(self.handles[index], &style);
        self.surface.bring_to_front(self.handles[index]);
    }

    fn restore(&mut self, index: usize) {
        let style = self.originals[index];
        self.surface.set_shape_style(self.handles[index], &style);
    }
}

/// Drives the map surface of one workspace
pub struct MapAdapter {
    state: Mutex<MapState>,
}

impl MapAdapter {
    pub fn new(surface: Box<dyn MapSurface>) -> Self {
        Self {
            state: Mutex::new(MapState {
                surface,
                handles: Vec::new(),
                originals: Vec::new(),
                highlighted: AHashSet::new(),
                legend: None,
            }),
        }
    }

    /// Rebuild the overlay for `dataset`, colored by `property` over `range`
    pub fn render(
        &self,
        dataset: &Dataset,
        property: Option<&str>,
        range: Option<ValueRange>,
        settings: &StyleSettings,
    ) {
        let mut state = self.state.lock();
        state.surface.clear_overlay();
        state.handles.clear();
        state.originals.clear();
        state.highlighted.clear();

        let mut bounds: Option<Rect<f64>> = None;
        for feature in dataset.features() {
            let value = property
                .and_then(|p| feature.property(p))
                .and_then(PropertyValue::as_f64);
            let fill = ramp_color(value, range);

            let original = if feature.is_point() {
                ShapeStyle::marker(fill)
            } else {
                ShapeStyle::polygon(fill, settings.data_opacity)
            };

            let handle = state
                .surface
                .add_shape(feature.geometry(), &original, &popup_text(feature));
            state.handles.push(handle);
            state.originals.push(original);

            if let Some(rect) = feature.geometry().bounding_rect() {
                bounds = Some(union(bounds, rect));
            }
        }

        if let Some(bounds) = bounds {
            state.surface.fit_bounds(bounds);
        }

        let legend = Legend::new(property.unwrap_or_default(), range);
        state.surface.set_legend(&legend);
        state.legend = Some(legend);

        debug!(shapes = state.handles.len(), ?property, "Map overlay rendered");
    }

    pub fn is_rendered(&self) -> bool {
        self.state.lock().legend.is_some()
    }

    pub fn legend(&self) -> Option<Legend> {
        self.state.lock().legend.clone()
    }

    /// Original style captured for a feature at render time
    pub fn original_style(&self, index: usize) -> Option<ShapeStyle> {
        self.state.lock().originals.get(index).copied()
    }

    /// Feature indices currently drawn highlighted, ascending
    pub fn highlighted(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.state.lock().highlighted.iter().copied().collect();
        indices.sort_unstable();
        indices
    }

    /// Feature index of a clicked shape, by its position in the overlay
    pub fn feature_at(&self, handle: ShapeHandle) -> Option<usize> {
        let index = self.state.lock().handles.iter().position(|h| *h == handle);
        if index.is_none() {
            warn!(?handle, "Click on unknown map shape");
        }
        index
    }

    /// Restyle shapes after a settings save
    pub fn apply_settings(
        &self,
        delta: &SettingsDelta,
        settings: &StyleSettings,
        selection: &SelectionSet,
    ) {
        if !delta.affects_map() {
            return;
        }

        let mut state = self.state.lock();
        if delta.opacity_changed {
            for original in state.originals.iter_mut() {
                *original = original.with_opacity(settings.data_opacity);
            }
        }

        for index in 0..state.handles.len() {
            if selection.contains(index) {
                state.highlight(index, settings);
            } else if delta.opacity_changed {
                state.restore(index);
            }
        }
    }

    pub fn invalidate_size(&self) {
        self.state.lock().surface.invalidate_size();
    }
}

impl SelectionSubscriber for MapAdapter {
    fn on_selection_changed(&self, ctx: &SelectionContext<'_>) {
        let mut state = self.state.lock();
        let count = state.handles.len();

        let stale: Vec<usize> = state
            .highlighted
            .iter()
            .copied()
            .filter(|&i| !ctx.selection.contains(i))
            .collect();
        for index in stale {
            state.restore(index);
            state.highlighted.remove(&index);
        }

        for index in ctx.selection.sorted() {
            if index < count {
                state.highlight(index, ctx.settings);
                state.highlighted.insert(index);
            }
        }
    }
}
