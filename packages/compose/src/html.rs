//! Standalone HTML rendering with MapLibre GL JS.

use minijinja::{AutoEscape, Environment, Error, ErrorKind, Value, context};

use crate::DisplayError;
use crate::composer::{CompareMode, MapArtifact};

const MAPLIBRE_VERSION: &str = "4.7.1";
const COMPARE_VERSION: &str = "0.5.0";

static PAGE_TMPL: &str = include_str!("./page.html.jinja");

/// JSON for an inline `<script>`, with `</` escaped so the data cannot
/// end the element early.
fn script_json(value: &Value) -> Result<Value, Error> {
    let json = serde_json::to_string(value)
        .map_err(|e| Error::new(ErrorKind::BadSerialization, e.to_string()))?;
    Ok(Value::from_safe_string(json.replace("</", "<\\/")))
}

fn environment() -> Result<Environment<'static>, DisplayError> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env.add_filter("script_json", script_json);
    env.add_template("page.html", PAGE_TMPL)?;
    Ok(env)
}

impl MapArtifact {
    /// Serializes the artifact as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, DisplayError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Renders a standalone HTML page with a legend per layer, navigation,
    /// fullscreen and scale controls, a collapsed overview map, and
    /// feature tooltips.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::Template`] if the page cannot be rendered.
    pub fn to_html(&self) -> Result<String, DisplayError> {
        let env = environment()?;
        let page = env.get_template("page.html")?.render(context! {
            title => &self.title,
            maplibre_version => MAPLIBRE_VERSION,
            compare_version => COMPARE_VERSION,
            mode => self.mode.as_ref(),
            swipe => self.mode == CompareMode::Swipe,
            artifact => self,
        })?;
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use mobility_map_geography::{GeometryTable, MapCenter, polygon};
    use mobility_map_table::read_csv;

    use super::*;
    use crate::MapComposer;

    fn geometry(column: &str, value: &str) -> GeometryTable {
        let csv = format!("lon_min,lat_min,lon_max,lat_max,{column}\n139,35,140,36,{value}\n");
        let table = read_csv(csv.as_bytes()).unwrap();
        polygon::build(&table, column).unwrap()
    }

    fn artifact(mode: CompareMode) -> MapArtifact {
        MapComposer::new(mode).compose(
            &geometry("population", "120"),
            &geometry("diff", "0.25"),
            MapCenter {
                lat: 35.5,
                lon: 139.5,
            },
            10,
        )
    }

    #[test]
    fn page_embeds_basemap_and_legends() {
        let html = artifact(CompareMode::Linked).to_html().unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("cyberjapandata.gsi.go.jp/xyz/pale/{z}/{x}/{y}.png"));
        assert!(html.contains("地理院タイル"));
        assert!(html.contains("滞在人口"));
        assert!(html.contains("diff: 25.00%"));
        assert!(html.contains("class=\"linked\""));
        assert!(!html.contains("maplibre-gl-compare"));
        assert!(html.contains("new maplibregl.FullscreenControl()"));
        assert!(html.contains("new maplibregl.NavigationControl()"));
        assert!(html.contains("second.addControl(new OverviewControl()"));
        assert!(html.contains("overview minimized"));
        assert!(html.contains("const artifact = {\""));
    }

    #[test]
    fn title_is_rendered_verbatim() {
        let mut artifact = artifact(CompareMode::Linked);
        artifact.title = "Run __MAPLIBRE__ {{ mode }} __ARTIFACT__ & co".to_string();

        let html = artifact.to_html().unwrap();

        assert!(html.contains("<title>Run __MAPLIBRE__ {{ mode }} __ARTIFACT__ &amp; co</title>"));
        assert!(html.contains("maplibre-gl@4.7.1/dist/maplibre-gl.js"));
    }

    #[test]
    fn swipe_pulls_in_compare_plugin() {
        let html = artifact(CompareMode::Swipe).to_html().unwrap();

        assert!(html.contains("maplibre-gl-compare.js"));
        assert!(html.contains("class=\"swipe\""));
    }

    #[test]
    fn embedded_json_cannot_close_the_script() {
        let mut artifact = artifact(CompareMode::SideBySide);
        artifact.title = "</script><b>".to_string();
        artifact.first.legend.caption = "</script>".to_string();

        let html = artifact.to_html().unwrap();

        assert_eq!(html.matches("</script>").count(), 2);
        assert!(html.contains("&lt;b&gt;</title>"));
        assert!(html.contains("<\\/script>"));
    }

    #[test]
    fn json_round_trips_through_serde_json() {
        let json = artifact(CompareMode::Linked).to_json().unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["view"]["zoom"], 10);
    }
}
