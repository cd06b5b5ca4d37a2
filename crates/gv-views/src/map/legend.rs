//! Map legend for the active color property

use egui::Color32;
use gv_core::ValueRange;
use serde::Serialize;

use crate::plots::utils::colors::ramp_color;

/// Number of legend grades
pub const LEGEND_GRADES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub color: Color32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: String,
    pub entries: Vec<LegendEntry>,
}

impl Legend {
    /// Grades `min, min+¼, min+½, min+¾, max` labelled `a–b`, the last one `max+`
    pub fn new(title: impl Into<String>, range: Option<ValueRange>) -> Self {
        let entries = match range {
            Some(range) => {
                let grades: Vec<f64> = (0..LEGEND_GRADES)
                    .map(|i| range.min + range.span() * i as f64 / (LEGEND_GRADES - 1) as f64)
                    .collect();

                grades
                    .iter()
                    .enumerate()
                    .map(|(i, &grade)| LegendEntry {
                        color: ramp_color(Some(grade), Some(range)),
                        label: match grades.get(i + 1) {
                            Some(next) => {
                                format!("{}–{}", format_grade(grade), format_grade(*next))
                            }
                            None => format!("{}+", format_grade(grade)),
                        },
                    })
                    .collect()
            }
            None => Vec::new(),
        };

        Self {
            title: title.into(),
            entries,
        }
    }
}

fn format_grade(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grades() {
        let legend = Legend::new("P", Some(ValueRange { min: 0.0, max: 10.0 }));
        let labels: Vec<&str> = legend.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["0–2.5", "2.5–5", "5–7.5", "7.5–10", "10+"]);
        assert_eq!(legend.entries[0].color, Color32::from_rgb(255, 255, 0));
        assert_eq!(legend.entries[4].color, Color32::from_rgb(255, 0, 0));
    }

    #[test]
    fn test_no_range_no_entries() {
        assert!(Legend::new("name", None).entries.is_empty());
    }
}
