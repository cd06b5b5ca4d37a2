//! Scatter plots of two or three numeric properties

use gv_core::Dataset;

/// One plotted feature
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint<const N: usize> {
    /// Feature index the point was read from
    pub index: usize,
    pub coords: [f64; N],
}

/// Points of the features that have a numeric value for every axis property
#[derive(Debug, Clone, PartialEq)]
pub struct Scatter<const N: usize> {
    pub axes: [String; N],
    pub points: Vec<ScatterPoint<N>>,
}

pub type ScatterPlot = Scatter<2>;
pub type Scatter3d = Scatter<3>;

impl<const N: usize> Scatter<N> {
    /// Read the axis values of every feature. Features missing a value on
    /// any axis are left out.
    pub fn build(dataset: &Dataset, axes: [&str; N]) -> Self {
        let points = dataset
            .features()
            .iter()
            .filter_map(|feature| {
                let mut coords = [0.0; N];
                for (slot, axis) in coords.iter_mut().zip(axes) {
                    *slot = feature.property(axis)?.as_f64().filter(|v| v.is_finite())?;
                }
                Some(ScatterPoint {
                    index: feature.index(),
                    coords,
                })
            })
            .collect();

        Self {
            axes: axes.map(str::to_string),
            points,
        }
    }

    pub fn title(&self) -> String {
        match N {
            2 => format!("Scatter Plot: {} vs {}", self.axes[0], self.axes[1]),
            3 => "3D Scatter Plot".to_string(),
            _ => "Scatter Plot".to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
