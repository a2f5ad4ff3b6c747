//! Styled map layers built from geometry tables.

use geojson::FeatureCollection;
use mobility_map_geography::GeometryTable;
use serde::Serialize;
use serde_json::Value;

use crate::color::{ColorScale, Palette, Rgb};

/// Property holding each feature's fill color.
pub const COLOR_PROPERTY: &str = "color";
/// Property holding each feature's tooltip text.
pub const TOOLTIP_PROPERTY: &str = "tooltip";

/// How a layer's values are shown in tooltips and the legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueFormat {
    /// The raw number.
    #[default]
    Plain,
    /// A ratio shown as a percentage with two decimals.
    Percent,
}

impl ValueFormat {
    /// Formats a cell. Missing values print as `-`, text prints as is.
    #[must_use]
    pub fn format(self, value: &Value) -> String {
        match (self, value) {
            (_, Value::Null) => "-".to_string(),
            (_, Value::String(text)) => text.clone(),
            (Self::Percent, Value::Number(n)) => n
                .as_f64()
                .map_or_else(|| n.to_string(), |v| self.format_number(v)),
            _ => value.to_string(),
        }
    }

    /// Formats a number.
    #[must_use]
    pub fn format_number(self, value: f64) -> String {
        match self {
            Self::Plain => value.to_string(),
            Self::Percent => format!("{:.2}%", value * 100.0),
        }
    }
}

/// Tooltip text of one record: `"{label}: {value}"`.
#[must_use]
pub fn tooltip(label: &str, value: &Value, format: ValueFormat) -> String {
    format!("{label}: {}", format.format(value))
}

/// What a layer looks like, independent of its data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSpec {
    /// Legend caption.
    pub caption: String,
    /// Palette the color scale spans.
    pub palette: Palette,
    /// Tooltip and legend number format.
    pub format: ValueFormat,
}

impl LayerSpec {
    /// Population layer: raw numbers on `Paired`.
    #[must_use]
    pub fn population() -> Self {
        Self {
            caption: "滞在人口".to_string(),
            palette: Palette::Paired6,
            format: ValueFormat::Plain,
        }
    }

    /// Change layer: percentages on `Accent`.
    #[must_use]
    pub fn change_ratio() -> Self {
        Self {
            caption: "増減率".to_string(),
            palette: Palette::Accent6,
            format: ValueFormat::Percent,
        }
    }
}

/// Fill opacity and outline width shared by every region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerStyle {
    /// Fill opacity.
    pub fill_opacity: f64,
    /// Outline width in pixels.
    pub line_weight: f64,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            fill_opacity: 0.6,
            line_weight: 1.0,
        }
    }
}

/// Legend entry of a layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Legend {
    /// Caption above the ramp.
    pub caption: String,
    /// Ramp colors from low to high.
    pub colors: Vec<Rgb>,
    /// Formatted lower bound.
    pub min_label: String,
    /// Formatted upper bound.
    pub max_label: String,
}

/// A fully styled layer ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    /// Name of the value column, used as tooltip label.
    pub value_column: String,
    /// Color scale fitted to the data.
    pub scale: ColorScale,
    /// Legend entry.
    pub legend: Legend,
    /// Fill and outline style.
    pub style: LayerStyle,
    /// Features with value, color, and tooltip properties.
    pub data: FeatureCollection,
}

impl Layer {
    /// Styles `geometry` according to `spec`.
    ///
    /// The color scale spans the smallest and largest non-missing value. A
    /// layer without numeric values gets a zero-width scale.
    #[must_use]
    pub fn build(geometry: &GeometryTable, spec: &LayerSpec) -> Self {
        let label = geometry.value_column();
        let (min, max) = geometry.value_range().unwrap_or((0.0, 0.0));
        let scale = ColorScale::new(spec.palette, min, max);

        let mut data = geometry.to_feature_collection();
        for (feature, record) in data.features.iter_mut().zip(geometry.records()) {
            let color = scale.color_for(record.value.as_f64());
            let properties = feature.properties.get_or_insert_with(Default::default);
            properties.insert(COLOR_PROPERTY.to_string(), color.to_string().into());
            properties.insert(
                TOOLTIP_PROPERTY.to_string(),
                tooltip(label, &record.value, spec.format).into(),
            );
        }

        log::debug!(
            "Styled layer {label} ({}): {} features, domain [{min}, {max}]",
            spec.caption,
            data.features.len()
        );

        Self {
            value_column: label.to_string(),
            legend: Legend {
                caption: spec.caption.clone(),
                colors: scale.colors().to_vec(),
                min_label: spec.format.format_number(min),
                max_label: spec.format.format_number(max),
            },
            scale,
            style: LayerStyle::default(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use mobility_map_geography::polygon;
    use mobility_map_table::read_csv;
    use serde_json::json;

    use super::*;

    fn geometry(csv: &str, column: &str) -> GeometryTable {
        let table = read_csv(csv.as_bytes()).unwrap();
        polygon::build(&table, column).unwrap()
    }

    #[test]
    fn percent_has_two_decimals() {
        assert_eq!(ValueFormat::Percent.format(&json!(0.25)), "25.00%");
        assert_eq!(ValueFormat::Percent.format(&json!(-0.1234)), "-12.34%");
        assert_eq!(ValueFormat::Percent.format(&Value::Null), "-");
    }

    #[test]
    fn tooltip_uses_column_label() {
        assert_eq!(
            tooltip("population", &json!(1200), ValueFormat::Plain),
            "population: 1200"
        );
        assert_eq!(
            tooltip("diff", &json!(0.25), ValueFormat::Percent),
            "diff: 25.00%"
        );
        assert_eq!(
            tooltip("name", &json!("千代田区"), ValueFormat::Plain),
            "name: 千代田区"
        );
    }

    #[test]
    fn features_carry_color_and_tooltip() {
        let geometry = geometry(
            "lon_min,lat_min,lon_max,lat_max,diff\n\
             0,0,1,1,-0.5\n\
             1,0,2,1,0.5\n\
             2,0,3,1,\n",
            "diff",
        );

        let layer = Layer::build(&geometry, &LayerSpec::change_ratio());

        let props: Vec<_> = layer
            .data
            .features
            .iter()
            .map(|f| f.properties.as_ref().unwrap())
            .collect();
        assert_eq!(props[0][COLOR_PROPERTY], "#7fc97f");
        assert_eq!(props[1][COLOR_PROPERTY], "#f0027f");
        assert_eq!(props[1][TOOLTIP_PROPERTY], "diff: 50.00%");
        assert_eq!(props[2][TOOLTIP_PROPERTY], "diff: -");
        assert_eq!(layer.legend.caption, "増減率");
        assert_eq!(layer.legend.min_label, "-50.00%");
        assert_eq!(layer.legend.max_label, "50.00%");
    }

    #[test]
    fn building_does_not_change_geometry() {
        let geometry = geometry("lon_min,lat_min,lon_max,lat_max,v\n0,0,1,1,3\n", "v");
        let before = geometry.clone();

        let _ = Layer::build(&geometry, &LayerSpec::population());

        assert_eq!(geometry, before);
    }
}
