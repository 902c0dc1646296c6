//! Choropleth color scale and legend.
//!
//! The frontend map interpolates fill colors linearly between
//! consecutive breakpoints. This module supplies the breakpoints and
//! their colors in the interleaved form the map style expression expects,
//! plus human-readable legend rows.

use serde::Serialize;
use serde_json::json;

/// Feature property the default fill expression reads.
pub const DEFAULT_PROPERTY: &str = "positive";

const DEFAULT_STEPS: [u64; 9] = [0, 1, 100, 500, 1_000, 2_000, 5_000, 10_000, 20_000];

const DEFAULT_COLORS: [&str; 9] = [
    "#FFF", "#F1F1CD", "#EED78D", "#F3C11B", "#DA9C20", "#CF8124", "#CB682C", "#7B2320", "#591302",
];

/// Errors from building a [`ColorScale`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorScaleError {
    /// Every breakpoint needs exactly one color.
    #[error("{steps} breakpoints but {colors} colors")]
    LengthMismatch { steps: usize, colors: usize },

    #[error("color scale needs at least one breakpoint")]
    Empty,
}

/// Breakpoints paired index-for-index with colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorScale {
    property: String,
    steps: Vec<u64>,
    colors: Vec<String>,
}

impl Default for ColorScale {
    fn default() -> Self {
        Self {
            property: DEFAULT_PROPERTY.to_string(),
            steps: DEFAULT_STEPS.to_vec(),
            colors: DEFAULT_COLORS.iter().map(ToString::to_string).collect(),
        }
    }
}

/// One legend entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendRow {
    pub label: String,
    pub color: String,
}

/// Everything the frontend needs to color the overlay and draw its legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Legend {
    pub property: String,
    pub stops: Vec<serde_json::Value>,
    pub fill_color: serde_json::Value,
    pub rows: Vec<LegendRow>,
}

impl ColorScale {
    /// Pairs `steps` with `colors` in the order given.
    ///
    /// Steps are expected in ascending order and are neither sorted nor
    /// deduplicated here.
    ///
    /// # Errors
    ///
    /// Returns [`ColorScaleError`] if the lists are empty or differ in
    /// length.
    pub fn new(
        property: impl Into<String>,
        steps: Vec<u64>,
        colors: Vec<String>,
    ) -> Result<Self, ColorScaleError> {
        if steps.len() != colors.len() {
            return Err(ColorScaleError::LengthMismatch {
                steps: steps.len(),
                colors: colors.len(),
            });
        }
        if steps.is_empty() {
            return Err(ColorScaleError::Empty);
        }
        Ok(Self {
            property: property.into(),
            steps,
            colors,
        })
    }

    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    /// `[step, color, step, color, ...]` in breakpoint order.
    #[must_use]
    pub fn interpolation_stops(&self) -> Vec<serde_json::Value> {
        self.steps
            .iter()
            .zip(&self.colors)
            .flat_map(|(step, color)| [json!(step), json!(color)])
            .collect()
    }

    /// Full `["interpolate", ["linear"], ["get", property], ...stops]`
    /// style expression.
    #[must_use]
    pub fn fill_color_expression(&self) -> serde_json::Value {
        let mut expression = vec![
            json!("interpolate"),
            json!(["linear"]),
            json!(["get", self.property]),
        ];
        expression.extend(self.interpolation_stops());
        serde_json::Value::Array(expression)
    }

    /// Legend rows: the first breakpoint exactly, one row per band in
    /// between, and an open-ended row above the last breakpoint.
    ///
    /// With the default scale: `0`, `1-100`, `101-500`, ..., `10,001-20,000`,
    /// `> 20,000`.
    #[must_use]
    pub fn legend_rows(&self) -> Vec<LegendRow> {
        let n = self.steps.len();
        let mut rows = Vec::with_capacity(n);

        if n == 1 {
            rows.push(LegendRow {
                label: format!(">= {}", group_thousands(self.steps[0])),
                color: self.colors[0].clone(),
            });
            return rows;
        }

        rows.push(LegendRow {
            label: group_thousands(self.steps[0]),
            color: self.colors[0].clone(),
        });

        let mut lower = self.steps[0].saturating_add(1);
        for k in 1..n - 1 {
            let upper = self.steps[k + 1];
            rows.push(LegendRow {
                label: format!("{}-{}", group_thousands(lower), group_thousands(upper)),
                color: self.colors[k].clone(),
            });
            lower = upper.saturating_add(1);
        }

        rows.push(LegendRow {
            label: format!("> {}", group_thousands(self.steps[n - 1])),
            color: self.colors[n - 1].clone(),
        });
        rows
    }

    #[must_use]
    pub fn legend(&self) -> Legend {
        Legend {
            property: self.property.clone(),
            stops: self.interpolation_stops(),
            fill_color: self.fill_color_expression(),
            rows: self.legend_rows(),
        }
    }
}

/// `12345` -> `"12,345"`.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn interleaves_in_given_order() {
        let scale =
            ColorScale::new("positive", vec![0, 20, 50], colors(&["#a", "#b", "#c"])).unwrap();
        assert_eq!(
            serde_json::Value::Array(scale.interpolation_stops()),
            json!([0, "#a", 20, "#b", 50, "#c"])
        );
    }

    #[test]
    fn does_not_reorder_or_dedup() {
        let scale =
            ColorScale::new("positive", vec![0, 10, 10, 5], colors(&["#a", "#b", "#c", "#d"]))
                .unwrap();
        assert_eq!(
            serde_json::Value::Array(scale.interpolation_stops()),
            json!([0, "#a", 10, "#b", 10, "#c", 5, "#d"])
        );
    }

    #[test]
    fn rejects_length_mismatch() {
        assert_eq!(
            ColorScale::new("positive", vec![0, 1], colors(&["#a"])),
            Err(ColorScaleError::LengthMismatch {
                steps: 2,
                colors: 1
            })
        );
        assert_eq!(
            ColorScale::new("positive", vec![], vec![]),
            Err(ColorScaleError::Empty)
        );
    }

    #[test]
    fn fill_expression_shape() {
        let scale = ColorScale::new("death", vec![0, 20], colors(&["#a", "#b"])).unwrap();
        assert_eq!(
            scale.fill_color_expression(),
            json!(["interpolate", ["linear"], ["get", "death"], 0, "#a", 20, "#b"])
        );
    }

    #[test]
    fn default_legend_rows() {
        let labels: Vec<String> = ColorScale::default()
            .legend_rows()
            .into_iter()
            .map(|r| r.label)
            .collect();
        assert_eq!(
            labels,
            vec![
                "0",
                "1-100",
                "101-500",
                "501-1,000",
                "1,001-2,000",
                "2,001-5,000",
                "5,001-10,000",
                "10,001-20,000",
                "> 20,000",
            ]
        );
    }

    #[test]
    fn legend_row_colors_follow_steps() {
        let rows = ColorScale::default().legend_rows();
        assert_eq!(rows[0].color, "#FFF");
        assert_eq!(rows[8].color, "#591302");
    }

    #[test]
    fn single_step_legend() {
        let scale = ColorScale::new("positive", vec![10], colors(&["#a"])).unwrap();
        let rows = scale.legend_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, ">= 10");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }
}
