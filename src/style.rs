//! Map style documents and the assembler that injects the NAIP raster
//! sources for an epoch.
//!
//! The base style is treated as an immutable template: every assembly
//! clones it and writes the two owned sources into the copy, so repeated
//! calls for the same epoch produce equal documents and nothing leaks from
//! one render into the next.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::error::NaipResult;
use crate::registry::MosaicRegistry;
use crate::tile_url::{build_tile_url, DEFAULT_COLOR_OPS, DEFAULT_TILE_TEMPLATE};

/// Source id of the full-resolution imagery
pub const NAIP_SOURCE: &str = "naip";
/// Source id of the overview imagery
pub const NAIP_OVERVIEW_SOURCE: &str = "naip-overview";

pub const NAIP_ATTRIBUTION: &str = "<a href=\"https://www.fsa.usda.gov/programs-and-services/aerial-photography/imagery-programs/naip-imagery/\" target=\"_blank\">© USDA</a>";

/// Base style bundled with the binary
pub const BASE_STYLE_JSON: &str = include_str!("../assets/style.json");

/// A style document: the `sources` table plus every other member untouched
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleDocument {
    #[serde(default)]
    pub sources: Map<String, Value>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl StyleDocument {
    /// Parse style JSON in place
    pub fn from_slice(bytes: &mut [u8]) -> NaipResult<Self> {
        Ok(simd_json::serde::from_slice(bytes)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> NaipResult<Self> {
        let mut bytes = fs::read(path)?;
        Self::from_slice(&mut bytes)
    }

    /// The base style compiled into the binary
    pub fn embedded() -> NaipResult<Self> {
        let mut bytes = BASE_STYLE_JSON.as_bytes().to_vec();
        Self::from_slice(&mut bytes)
    }

    /// Style layers in draw order
    pub fn layers(&self) -> &[Value] {
        self.rest
            .get("layers")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// A source of type `raster`, if `name` is one. Sources whose
    /// `minzoom` lies above `maxzoom` are ignored.
    pub fn raster_source(&self, name: &str) -> Option<RasterSource> {
        let source = self.sources.get(name)?;
        if source.get("type").and_then(Value::as_str) != Some("raster") {
            return None;
        }
        let source: RasterSource = serde_json::from_value(source.clone()).ok()?;
        if source.minzoom > source.maxzoom {
            warn!(
                source = name,
                minzoom = source.minzoom,
                maxzoom = source.maxzoom,
                "ignoring raster source with inverted zoom band"
            );
            return None;
        }
        Some(source)
    }

    /// `(name, data)` of every `geojson` source whose data is a path or URL
    pub fn geojson_sources(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.sources.iter().filter_map(|(name, source)| {
            if source.get("type").and_then(Value::as_str) != Some("geojson") {
                return None;
            }
            let data = source.get("data").and_then(Value::as_str)?;
            Some((name.as_str(), data))
        })
    }
}

/// Zoom levels a source serves tiles for
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomBand {
    pub min: u8,
    pub max: u8,
}

impl ZoomBand {
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }
}

/// A raster tile source entry
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RasterSource {
    pub tiles: Vec<String>,
    #[serde(rename = "tileSize", default = "default_tile_size")]
    pub tile_size: u32,
    #[serde(default)]
    pub minzoom: u8,
    #[serde(default = "default_maxzoom")]
    pub maxzoom: u8,
    #[serde(default)]
    pub attribution: Option<String>,
}

fn default_tile_size() -> u32 {
    512
}

fn default_maxzoom() -> u8 {
    22
}

impl RasterSource {
    /// Whether the source draws at this zoom. Above `maxzoom` the client
    /// overzooms the last level, below `minzoom` nothing is shown.
    pub fn covers(&self, zoom: f64) -> bool {
        zoom >= self.minzoom as f64
    }

    /// Tile level requested at this zoom
    pub fn tile_zoom(&self, zoom: f64) -> u8 {
        (zoom.floor().max(0.0) as u8).min(self.maxzoom).max(self.minzoom)
    }

    pub fn to_value(&self) -> Value {
        let mut value = json!({
            "type": "raster",
            "tiles": self.tiles,
            "tileSize": self.tile_size,
            "minzoom": self.minzoom,
            "maxzoom": self.maxzoom,
        });
        if let (Some(attribution), Some(object)) = (&self.attribution, value.as_object_mut()) {
            object.insert("attribution".to_string(), Value::String(attribution.clone()));
        }
        value
    }
}

/// Fixed tiling parameters for the two imagery sources
#[derive(Clone, Debug, PartialEq)]
pub struct StyleSettings {
    pub tile_template: String,
    pub color_ops: String,
    /// Used when the requested epoch is not registered
    pub default_epoch: String,
    pub tile_size: u32,
    pub full_res_zoom: ZoomBand,
    pub overview_zoom: ZoomBand,
    pub attribution: String,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            tile_template: DEFAULT_TILE_TEMPLATE.to_string(),
            color_ops: DEFAULT_COLOR_OPS.to_string(),
            default_epoch: "2016-2018".to_string(),
            tile_size: 512,
            full_res_zoom: ZoomBand::new(12, 17),
            overview_zoom: ZoomBand::new(6, 11),
            attribution: NAIP_ATTRIBUTION.to_string(),
        }
    }
}

impl StyleSettings {
    fn raster_source(&self, mosaic_url: &str, band: ZoomBand) -> RasterSource {
        RasterSource {
            tiles: vec![build_tile_url(
                mosaic_url,
                &self.tile_template,
                [("color_ops", self.color_ops.as_str())],
            )],
            tile_size: self.tile_size,
            minzoom: band.min,
            maxzoom: band.max,
            attribution: Some(self.attribution.clone()),
        }
    }
}

/// Return a copy of `base` with the `naip` and `naip-overview` sources set
/// for `epoch`. Unknown epochs use `settings.default_epoch`; every other
/// source and member of `base` is carried over unchanged.
pub fn build_map_style(
    base: &StyleDocument,
    epoch: &str,
    registry: &MosaicRegistry,
    settings: &StyleSettings,
) -> StyleDocument {
    let entry = registry.resolve_or_default(epoch, &settings.default_epoch);

    let mut style = base.clone();
    style.sources.insert(
        NAIP_SOURCE.to_string(),
        settings.raster_source(entry.full_res_url, settings.full_res_zoom).to_value(),
    );
    style.sources.insert(
        NAIP_OVERVIEW_SOURCE.to_string(),
        settings.raster_source(entry.overview_url, settings.overview_zoom).to_value(),
    );
    style
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> StyleDocument {
        let mut bytes = br#"{
            "version": 8,
            "sources": {
                "coastline": {"type": "geojson", "data": "data/coast.json"},
                "naip": {"type": "raster", "tiles": ["stale"]}
            },
            "layers": [{"id": "coast", "type": "line", "source": "coastline"}]
        }"#
        .to_vec();
        StyleDocument::from_slice(&mut bytes).unwrap()
    }

    #[test]
    fn test_embedded_style_parses() {
        let style = StyleDocument::embedded().unwrap();
        assert!(!style.layers().is_empty());
        assert!(style.geojson_sources().count() > 0);
    }

    #[test]
    fn test_injects_both_sources() {
        let registry = MosaicRegistry::default();
        let style = build_map_style(&base(), "2014-2015", &registry, &StyleSettings::default());

        let full = style.raster_source(NAIP_SOURCE).unwrap();
        let overview = style.raster_source(NAIP_OVERVIEW_SOURCE).unwrap();
        assert_eq!((full.minzoom, full.maxzoom, full.tile_size), (12, 17, 512));
        assert_eq!((overview.minzoom, overview.maxzoom), (6, 11));
        assert!(full.tiles[0].contains("5395d9e7bba4eeaa6af4842e1a7b9d3ea9dfc2a74373ae24698809e9"));
        assert!(overview.tiles[0].contains("naip_overview_2014_2015.json.gz"));
        assert!(full.tiles[0].contains("{z}/{x}/{y}"));
        assert!(full.attribution.unwrap().contains("USDA"));
    }

    #[test]
    fn test_keeps_unrelated_sources_and_members() {
        let base = base();
        let style = build_map_style(&base, "2016-2018", &MosaicRegistry::default(), &StyleSettings::default());

        for name in base.sources.keys() {
            assert!(style.sources.contains_key(name), "lost source {name}");
        }
        assert_eq!(style.sources["coastline"], base.sources["coastline"]);
        assert_eq!(style.rest, base.rest);
        assert_eq!(style.sources.len(), 3);
    }

    #[test]
    fn test_idempotent_and_base_untouched() {
        let base = base();
        let registry = MosaicRegistry::default();
        let settings = StyleSettings::default();
        let first = build_map_style(&base, "2011-2013", &registry, &settings);
        let second = build_map_style(&base, "2011-2013", &registry, &settings);
        assert_eq!(first.sources[NAIP_SOURCE], second.sources[NAIP_SOURCE]);
        assert_eq!(first.sources[NAIP_OVERVIEW_SOURCE], second.sources[NAIP_OVERVIEW_SOURCE]);
        assert_eq!(first, second);
        assert_eq!(base.sources["naip"]["tiles"][0], "stale");
    }

    #[test]
    fn test_unknown_epoch_uses_default() {
        let registry = MosaicRegistry::default();
        let settings = StyleSettings::default();
        let fallback = build_map_style(&base(), "1999-2000", &registry, &settings);
        let default = build_map_style(&base(), "2016-2018", &registry, &settings);
        assert_eq!(fallback, default);
    }

    #[test]
    fn test_raster_zoom_bands() {
        let source = StyleSettings::default().raster_source("s3://x", ZoomBand::new(12, 17));
        assert!(!source.covers(11.9));
        assert!(source.covers(12.0));
        assert_eq!(source.tile_zoom(13.7), 13);
        assert_eq!(source.tile_zoom(19.2), 17);
    }

    #[test]
    fn test_non_raster_source_is_not_raster() {
        assert!(base().raster_source("coastline").is_none());
        assert!(base().raster_source("missing").is_none());
    }

    #[test]
    fn test_inverted_zoom_band_is_ignored() {
        let mut bytes = br#"{
            "sources": {
                "sat": {"type": "raster", "tiles": ["t"], "minzoom": 10, "maxzoom": 5}
            }
        }"#
        .to_vec();
        let style = StyleDocument::from_slice(&mut bytes).unwrap();
        assert!(style.raster_source("sat").is_none());

        let source = RasterSource {
            tiles: vec!["t".to_string()],
            tile_size: 256,
            minzoom: 10,
            maxzoom: 5,
            attribution: None,
        };
        assert_eq!(source.tile_zoom(13.0), 10);
        assert_eq!(source.tile_zoom(2.0), 10);
    }

    fn write_style(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join("style.json");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_style_file_keeps_its_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_style(
            &dir,
            r#"{
                "version": 8,
                "sources": {"hillshade": {"type": "raster", "tiles": ["h/{z}/{x}/{y}"]}},
                "layers": [{"id": "shade", "type": "raster", "source": "hillshade"}]
            }"#,
        );
        let base = StyleDocument::from_path(&path).unwrap();
        let style = build_map_style(&base, "2014-2015", &MosaicRegistry::default(), &StyleSettings::default());
        assert!(style.sources.contains_key("hillshade"));
        assert!(style.sources.contains_key(NAIP_SOURCE));
        assert!(style.sources.contains_key(NAIP_OVERVIEW_SOURCE));
        assert_eq!(style.layers().len(), 1);
    }

    #[test]
    fn test_style_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_style(&dir, "{\"sources\": ");
        assert!(matches!(
            StyleDocument::from_path(&path),
            Err(crate::error::NaipError::StyleParse(_))
        ));
        assert!(matches!(
            StyleDocument::from_path(dir.path().join("missing.json")),
            Err(crate::error::NaipError::Io(_))
        ));
    }
}
