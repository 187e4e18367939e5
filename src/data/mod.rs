use anyhow::Result;
use geojson::{GeoJson, Geometry, Value};
use std::fs;
use std::path::Path;

use crate::map::{LineString, Place, VectorData};

/// Load a GeoJSON file: every line and polygon ring as linework, every
/// named point as a place
pub fn load_geojson(path: &Path) -> Result<VectorData> {
    let content = fs::read_to_string(path)?;
    let geojson: GeoJson = content.parse()?;

    let mut vector = VectorData::default();
    process_geojson_lines(&geojson, |line| vector.lines.push(line));
    collect_places(&geojson, &mut vector.places);
    Ok(vector)
}

/// Named points from a feature collection
fn collect_places(geojson: &GeoJson, places: &mut Vec<Place>) {
    let GeoJson::FeatureCollection(fc) = geojson else {
        return;
    };

    for feature in &fc.features {
        let Some(geometry) = &feature.geometry else {
            continue;
        };
        let Value::Point(coords) = &geometry.value else {
            continue;
        };
        if coords.len() < 2 {
            continue;
        }

        // Natural Earth uses `name`, other sources often `NAME`
        let name = feature
            .properties
            .as_ref()
            .and_then(|p| p.get("name").or_else(|| p.get("NAME")))
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
            .to_string();

        places.push(Place {
            lon: coords[0],
            lat: coords[1],
            name,
        });
    }
}

/// Process GeoJSON and extract line features
fn process_geojson_lines<F>(geojson: &GeoJson, mut add_line: F)
where
    F: FnMut(LineString),
{
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(ref geometry) = feature.geometry {
                    process_geometry_lines(geometry, &mut add_line);
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                process_geometry_lines(geometry, &mut add_line);
            }
        }
        GeoJson::Geometry(geometry) => {
            process_geometry_lines(geometry, &mut add_line);
        }
    }
}

fn process_geometry_lines<F>(geometry: &Geometry, add_line: &mut F)
where
    F: FnMut(LineString),
{
    match &geometry.value {
        Value::LineString(coords) => add_line(to_line(coords)),
        Value::MultiLineString(lines) => {
            for coords in lines {
                add_line(to_line(coords));
            }
        }
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                add_line(to_line(exterior));
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                if let Some(exterior) = rings.first() {
                    add_line(to_line(exterior));
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                process_geometry_lines(g, add_line);
            }
        }
        _ => {}
    }
}

fn to_line(coords: &[Vec<f64>]) -> LineString {
    coords.iter().map(|c| (c[0], c[1])).collect()
}

/// Coarse outline of the Americas for when no data file is available
pub fn generate_simple_world() -> VectorData {
    let lines = vec![
        vec![
            (-168.0, 65.0), (-166.0, 60.0), (-141.0, 60.0), (-130.0, 55.0),
            (-125.0, 48.0), (-124.0, 40.0), (-117.0, 32.0), (-110.0, 25.0),
            (-97.0, 25.0), (-97.0, 28.0), (-82.0, 24.0), (-80.0, 25.0),
            (-81.0, 31.0), (-75.0, 35.0), (-70.0, 41.0), (-67.0, 45.0),
            (-65.0, 47.0), (-55.0, 47.0), (-52.0, 47.0), (-55.0, 52.0),
            (-58.0, 55.0), (-64.0, 60.0), (-73.0, 62.0), (-80.0, 63.0),
            (-95.0, 62.0), (-110.0, 68.0), (-130.0, 70.0), (-145.0, 70.0),
            (-168.0, 65.0),
        ],
        // Lower 48 border with Canada and Mexico
        vec![
            (-123.0, 49.0), (-95.2, 49.0), (-89.6, 48.0), (-83.0, 46.1),
            (-82.4, 43.0), (-79.0, 43.3), (-74.7, 45.0), (-71.5, 45.0),
            (-69.2, 47.4), (-67.8, 47.1),
        ],
        vec![
            (-117.1, 32.5), (-114.7, 32.7), (-111.1, 31.3), (-108.2, 31.3),
            (-106.5, 31.8), (-104.5, 29.6), (-103.0, 29.0), (-101.4, 29.8),
            (-99.5, 27.5), (-97.1, 25.9),
        ],
        vec![
            (-80.0, 10.0), (-75.0, 5.0), (-70.0, 5.0), (-60.0, 5.0),
            (-50.0, 0.0), (-35.0, -5.0), (-35.0, -10.0), (-38.0, -15.0),
            (-40.0, -22.0), (-48.0, -25.0), (-55.0, -34.0), (-58.0, -38.0),
            (-65.0, -42.0), (-68.0, -50.0), (-75.0, -52.0), (-75.0, -45.0),
            (-72.0, -40.0), (-72.0, -30.0), (-70.0, -20.0), (-70.0, -15.0),
            (-80.0, -5.0), (-80.0, 0.0), (-80.0, 10.0),
        ],
    ];

    let places = [
        (-74.0, 40.7, "New York"),
        (-118.2, 34.0, "Los Angeles"),
        (-87.6, 41.9, "Chicago"),
        (-104.99, 39.74, "Denver"),
        (-112.07, 33.45, "Phoenix"),
        (-111.8695, 36.07832, "Grand Canyon"),
    ]
    .into_iter()
    .map(|(lon, lat, name)| Place {
        lon,
        lat,
        name: name.to_string(),
    })
    .collect();

    VectorData { lines, places }
}
