//! Shape styles of the map overlay

use egui::Color32;
use gv_core::{SelectionMode, StyleSettings};
use serde::Serialize;

/// Radius of point markers, in pixels
pub const MARKER_RADIUS: f32 = 8.0;

/// Fill opacity of point markers before the data opacity setting applies
pub const MARKER_FILL_OPACITY: f32 = 0.8;

/// Visual style of one overlay shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapeStyle {
    pub fill: Color32,
    pub fill_opacity: f32,
    pub stroke: Color32,
    pub stroke_weight: f32,
    /// Circle marker radius; `None` for polygons and lines
    pub radius: Option<f32>,
}

impl ShapeStyle {
    /// Original style of a polygon or line
    pub fn polygon(fill: Color32, opacity: f32) -> Self {
        Self {
            fill,
            fill_opacity: opacity,
            stroke: Color32::WHITE,
            stroke_weight: 2.0,
            radius: None,
        }
    }

    /// Original style of a point marker
    pub fn marker(fill: Color32) -> Self {
        Self {
            fill,
            fill_opacity: MARKER_FILL_OPACITY,
            stroke: Color32::BLACK,
            stroke_weight: 1.0,
            radius: Some(MARKER_RADIUS),
        }
    }

    /// Same style with another fill opacity
    pub fn with_opacity(self, fill_opacity: f32) -> Self {
        Self { fill_opacity, ..self }
    }

    /// Highlight derived from this original style
    pub fn highlighted(self, settings: &StyleSettings) -> Self {
        match settings.selection_mode {
            SelectionMode::Fill => Self {
                fill: settings.map_highlight_color,
                fill_opacity: settings.data_opacity,
                stroke: Color32::WHITE,
                stroke_weight: 2.0,
                radius: self.radius,
            },
            SelectionMode::Outline => Self {
                fill: self.fill,
                fill_opacity: settings.data_opacity,
                stroke: settings.map_highlight_color,
                stroke_weight: settings.map_highlight_weight,
                radius: self.radius,
            },
        }
    }
}
