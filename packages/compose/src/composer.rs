//! Two-layer comparison maps.

use mobility_map_geography::{GeometryTable, MapCenter};
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::layer::{Layer, LayerSpec};

/// How the two layers are laid out.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    serde::Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CompareMode {
    /// Two panes whose pan and zoom follow each other.
    #[default]
    Linked,
    /// Two independent panes.
    SideBySide,
    /// One pane split by a draggable swipe bar.
    Swipe,
}

/// Tile basemap shared by every pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseLayer {
    /// XYZ tile URL template.
    pub tiles: String,
    /// Attribution link text.
    pub attribution: String,
    /// Attribution link target.
    pub attribution_url: String,
    /// Lowest zoom the viewer allows.
    pub min_zoom: u8,
    /// Highest zoom the viewer allows.
    pub max_zoom: u8,
}

impl BaseLayer {
    /// GSI pale tiles.
    #[must_use]
    pub fn gsi_pale() -> Self {
        Self {
            tiles: "https://cyberjapandata.gsi.go.jp/xyz/pale/{z}/{x}/{y}.png".to_string(),
            attribution: "地理院タイル".to_string(),
            attribution_url: "https://maps.gsi.go.jp/development/ichiran.html".to_string(),
            min_zoom: 9,
            max_zoom: 14,
        }
    }
}

impl Default for BaseLayer {
    fn default() -> Self {
        Self::gsi_pale()
    }
}

/// Initial viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    /// Initial center.
    pub center: MapCenter,
    /// Initial zoom, within the basemap's bounds.
    pub zoom: u8,
}

/// A composed comparison map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapArtifact {
    /// Page title.
    pub title: String,
    /// Pane layout.
    pub mode: CompareMode,
    /// Initial viewport.
    pub view: MapView,
    /// Basemap.
    pub base: BaseLayer,
    /// Left or "before" layer.
    pub first: Layer,
    /// Right or "after" layer.
    pub second: Layer,
}

/// Builds [`MapArtifact`]s from pairs of geometry tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapComposer {
    /// Pane layout.
    pub mode: CompareMode,
    /// Basemap.
    pub base: BaseLayer,
    /// Style of the first layer.
    pub first: LayerSpec,
    /// Style of the second layer.
    pub second: LayerSpec,
    /// Page title.
    pub title: String,
}

impl Default for MapComposer {
    fn default() -> Self {
        Self::new(CompareMode::default())
    }
}

impl MapComposer {
    /// Population on the first pane and change ratio on the second, over
    /// GSI pale tiles.
    #[must_use]
    pub fn new(mode: CompareMode) -> Self {
        Self {
            mode,
            base: BaseLayer::gsi_pale(),
            first: LayerSpec::population(),
            second: LayerSpec::change_ratio(),
            title: "人流データ比較".to_string(),
        }
    }

    /// Sets the page title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Styles both tables and fixes the initial view.
    ///
    /// Each table gets its own color scale fitted to its values. `zoom` is
    /// clamped into the basemap's zoom bounds, read in either order. Inputs
    /// are left untouched.
    #[must_use]
    pub fn compose(
        &self,
        first: &GeometryTable,
        second: &GeometryTable,
        center: MapCenter,
        zoom: u8,
    ) -> MapArtifact {
        let (min, max) = (self.base.min_zoom, self.base.max_zoom);
        let clamped = zoom.clamp(min.min(max), min.max(max));
        if clamped != zoom {
            log::debug!("Clamped zoom {zoom} to {clamped}");
        }

        log::info!(
            "Composing {} map: {} + {} features at ({:.4}, {:.4}) zoom {clamped}",
            self.mode,
            first.len(),
            second.len(),
            center.lat,
            center.lon
        );

        MapArtifact {
            title: self.title.clone(),
            mode: self.mode,
            view: MapView {
                center,
                zoom: clamped,
            },
            base: self.base.clone(),
            first: Layer::build(first, &self.first),
            second: Layer::build(second, &self.second),
        }
    }
}
