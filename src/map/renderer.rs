use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use naip_map::style::StyleDocument;
use naip_map::tile_url::TileCoord;
use ratatui::style::Color;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::braille::BrailleCanvas;
use crate::data;
use crate::map::geometry::{draw_circle, draw_line, draw_polygon};
use crate::map::projection::Viewport;

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Upper bound on tile footprints drawn per frame
const MAX_TILES: usize = 256;

/// A named point feature
#[derive(Clone)]
pub struct Place {
    pub lon: f64,
    pub lat: f64,
    pub name: String,
}

/// Geometry loaded from one GeoJSON source
#[derive(Clone, Default)]
pub struct VectorData {
    pub lines: Vec<LineString>,
    pub places: Vec<Place>,
}

impl VectorData {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.places.is_empty()
    }
}

/// One style layer, as far as the terminal can draw it
#[derive(Clone, Debug, PartialEq)]
pub struct StyleLayer {
    pub id: String,
    pub kind: String,
    pub source: Option<String>,
    pub minzoom: f64,
    pub maxzoom: f64,
    pub paint: Map<String, Value>,
    pub layout: Map<String, Value>,
}

impl StyleLayer {
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let member = |key: &str| object.get(key).and_then(Value::as_object).cloned().unwrap_or_default();
        Some(Self {
            id: object.get("id")?.as_str()?.to_string(),
            kind: object.get("type")?.as_str()?.to_string(),
            source: object.get("source").and_then(Value::as_str).map(str::to_string),
            minzoom: object.get("minzoom").and_then(Value::as_f64).unwrap_or(0.0),
            maxzoom: object.get("maxzoom").and_then(Value::as_f64).unwrap_or(f64::INFINITY),
            paint: member("paint"),
            layout: member("layout"),
        })
    }

    /// Layer zoom range is `[minzoom, maxzoom)`
    pub fn visible_at(&self, zoom: f64) -> bool {
        zoom >= self.minzoom && zoom < self.maxzoom
    }

    /// Color from `<kind>-color` paint. Raster footprints default to green,
    /// everything else to white.
    pub fn color(&self) -> Color {
        let key = match self.kind.as_str() {
            "symbol" => "text-color".to_string(),
            kind => format!("{kind}-color"),
        };
        self.paint
            .get(&key)
            .and_then(Value::as_str)
            .and_then(|s| Color::from_str(s).ok())
            .unwrap_or(if self.kind == "raster" { Color::Green } else { Color::White })
    }
}

/// A rendered braille layer with its color
pub struct CanvasLayer {
    pub id: String,
    pub color: Color,
    pub canvas: BrailleCanvas,
}

/// The imagery source on screen at the current zoom
#[derive(Clone, Debug, PartialEq)]
pub struct ImageryFrame {
    pub source: String,
    pub tile_zoom: u8,
    pub tiles: Vec<TileCoord>,
    /// Expanded URL of the tile under the view center
    pub center_tile_url: Option<String>,
}

/// Rendered map layers, back to front
pub struct MapLayers {
    pub canvases: Vec<CanvasLayer>,
    pub labels: Vec<(u16, u16, String)>,
    pub imagery: Option<ImageryFrame>,
}

/// Map renderer over the vector sources of a style
pub struct MapRenderer {
    /// Loaded sources keyed by source name, with the path they came from
    sources: HashMap<String, (PathBuf, VectorData)>,
    /// Built-in outline used when no source has data
    fallback: VectorData,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
            fallback: data::generate_simple_world(),
        }
    }

    /// Load every GeoJSON source the style names that is not loaded yet.
    /// Missing files are skipped; the fallback world covers for them.
    pub fn load_sources(&mut self, style: &StyleDocument, data_root: &Path) {
        for (name, data) in style.geojson_sources() {
            let path = data_root.join(data);
            if matches!(self.sources.get(name), Some((loaded, _)) if *loaded == path) {
                continue;
            }
            if !path.exists() {
                debug!(source = name, path = %path.display(), "geojson source not found");
                continue;
            }
            match data::load_geojson(&path) {
                Ok(vector) => {
                    debug!(source = name, lines = vector.lines.len(), places = vector.places.len(), "loaded source");
                    self.sources.insert(name.to_string(), (path, vector));
                }
                Err(err) => warn!(source = name, %err, "failed to load geojson source"),
            }
        }
    }

    /// Insert already loaded data for a source
    #[cfg(test)]
    pub fn insert_source(&mut self, name: &str, vector: VectorData) {
        self.sources.insert(name.to_string(), (PathBuf::new(), vector));
    }

    /// Check if any data is loaded
    pub fn has_data(&self) -> bool {
        self.sources.values().any(|(_, vector)| !vector.is_empty())
    }

    /// Render all style layers visible at the viewport's zoom
    pub fn render(&self, style: &StyleDocument, width: usize, height: usize, viewport: &Viewport) -> MapLayers {
        let mut canvases = Vec::new();
        let mut labels = Vec::new();
        let mut imagery = None;

        if !self.has_data() {
            let mut canvas = BrailleCanvas::new(width, height);
            for line in &self.fallback.lines {
                self.draw_linestring(&mut canvas, line, viewport);
            }
            canvases.push(CanvasLayer {
                id: "fallback".to_string(),
                color: Color::Cyan,
                canvas,
            });
            for place in &self.fallback.places {
                if let Some((x, y)) = label_position(viewport, place) {
                    labels.push((x, y, place.name.clone()));
                }
            }
        }

        for layer in style.layers().iter().filter_map(StyleLayer::from_value) {
            if !layer.visible_at(viewport.zoom) {
                continue;
            }
            let Some(source) = layer.source.as_deref() else {
                continue;
            };

            let mut canvas = BrailleCanvas::new(width, height);
            match layer.kind.as_str() {
                "raster" => {
                    let Some(frame) = self.draw_raster(&mut canvas, style, source, viewport) else {
                        continue;
                    };
                    imagery = Some(frame);
                }
                "line" | "fill" => {
                    let Some((_, vector)) = self.sources.get(source) else {
                        continue;
                    };
                    for line in &vector.lines {
                        self.draw_linestring(&mut canvas, line, viewport);
                    }
                }
                "circle" => {
                    let Some((_, vector)) = self.sources.get(source) else {
                        continue;
                    };
                    let radius = layer.paint.get("circle-radius").and_then(Value::as_i64).unwrap_or(1) as i32;
                    for place in &vector.places {
                        let (px, py) = viewport.project(place.lon, place.lat);
                        if viewport.is_visible(px, py) {
                            draw_circle(&mut canvas, px, py, radius);
                        }
                    }
                }
                "symbol" => {
                    if let Some((_, vector)) = self.sources.get(source) {
                        collect_labels(&layer, vector, viewport, &mut labels);
                    }
                    continue;
                }
                _ => continue,
            }

            let color = layer.color();
            canvases.push(CanvasLayer {
                id: layer.id,
                color,
                canvas,
            });
        }

        MapLayers {
            canvases,
            labels,
            imagery,
        }
    }

    /// Draw the footprints of the tiles a raster source would serve
    fn draw_raster(
        &self,
        canvas: &mut BrailleCanvas,
        style: &StyleDocument,
        source: &str,
        viewport: &Viewport,
    ) -> Option<ImageryFrame> {
        let raster = style.raster_source(source)?;
        if !raster.covers(viewport.zoom) {
            return None;
        }

        let tile_zoom = raster.tile_zoom(viewport.zoom);
        let tiles = viewport.visible_tiles(tile_zoom, MAX_TILES);
        for tile in &tiles {
            draw_polygon(canvas, &viewport.tile_outline(*tile), viewport);
        }

        let (cx, cy) = (viewport.width as i32 / 2, viewport.height as i32 / 2);
        let (x, y) = viewport.unproject_world(cx, cy);
        let n = (1u64 << tile_zoom) as f64;
        let center = TileCoord::new(tile_zoom, (x * n).floor().max(0.0) as u32, (y * n).floor().max(0.0) as u32);

        Some(ImageryFrame {
            source: source.to_string(),
            tile_zoom,
            tiles,
            center_tile_url: raster.tiles.first().map(|template| center.expand(template)),
        })
    }

    /// Draw a linestring with viewport culling
    fn draw_linestring(&self, canvas: &mut BrailleCanvas, line: &LineString, viewport: &Viewport) {
        if line.len() < 2 {
            return;
        }

        let mut prev: Option<(i32, i32)> = None;

        for &(lon, lat) in line {
            let (px, py) = viewport.project(lon, lat);

            if let Some((prev_x, prev_y)) = prev {
                // Long jumps are antimeridian wraps or far off-screen segments
                let dist = px.abs_diff(prev_x) as usize + py.abs_diff(prev_y) as usize;
                if dist < viewport.width && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                    draw_line(canvas, (prev_x, prev_y), (px, py));
                }
            }

            prev = Some((px, py));
        }
    }
}

/// Labels for a symbol layer: `{name}` in `text-field` becomes the place name
fn collect_labels(layer: &StyleLayer, vector: &VectorData, viewport: &Viewport, labels: &mut Vec<(u16, u16, String)>) {
    let template = layer
        .layout
        .get("text-field")
        .and_then(Value::as_str)
        .unwrap_or("{name}");

    for place in &vector.places {
        if let Some((x, y)) = label_position(viewport, place) {
            labels.push((x, y, template.replace("{name}", &place.name)));
        }
    }
}

/// Character cell for a place label, just right of its marker
fn label_position(viewport: &Viewport, place: &Place) -> Option<(u16, u16)> {
    let (px, py) = viewport.project(place.lon, place.lat);
    if px < 0 || py < 0 || !viewport.is_visible(px, py) {
        return None;
    }
    let char_x = (px / 2) as u16;
    let char_y = (py / 4) as u16;
    char_x.checked_add(2).map(|x| (x, char_y))
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new()
    }
}
