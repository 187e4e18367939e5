use std::f64::consts::PI;

use naip_map::camera::{CameraState, PartialCameraState};
use naip_map::tile_url::TileCoord;

/// Braille dots spanning the whole world at zoom 0. A braille dot is about
/// four screen pixels, so this matches a 512px tile pyramid.
const WORLD_DOTS: f64 = 128.0;

/// Normalized Web Mercator coordinates in [0, 1], origin at the north-west
pub fn lonlat_to_world(lon: f64, lat: f64) -> (f64, f64) {
    let x = (lon + 180.0) / 360.0;
    let lat_rad = lat * PI / 180.0;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;
    (x, y)
}

/// Inverse of [`lonlat_to_world`]
pub fn world_to_lonlat(x: f64, y: f64) -> (f64, f64) {
    let lon = x * 360.0 - 180.0;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    (lon, lat_rad * 180.0 / PI)
}

/// Viewport representing the visible map area for a camera
#[derive(Clone)]
pub struct Viewport {
    pub center_lon: f64,
    pub center_lat: f64,
    /// Web Mercator zoom level
    pub zoom: f64,
    /// Degrees clockwise from north
    pub bearing: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            bearing: 0.0,
            width,
            height,
        }
    }

    pub fn from_camera(camera: &CameraState, width: usize, height: usize) -> Self {
        Self {
            bearing: camera.bearing,
            ..Self::new(camera.longitude, camera.latitude, camera.zoom, width, height)
        }
    }

    /// World size in braille pixels at the current zoom
    pub fn world_size(&self) -> f64 {
        WORLD_DOTS * 2f64.powf(self.zoom)
    }

    fn center_world(&self) -> (f64, f64) {
        lonlat_to_world(self.center_lon, self.center_lat)
    }

    /// Screen offset from the center -> world offset, undoing the bearing
    fn screen_to_world_offset(&self, sx: f64, sy: f64, world_size: f64) -> (f64, f64) {
        let (sin, cos) = self.bearing.to_radians().sin_cos();
        let dx = sx * cos - sy * sin;
        let dy = sx * sin + sy * cos;
        (dx / world_size, dy / world_size)
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let (x, y) = lonlat_to_world(lon, lat);
        self.project_world(x, y)
    }

    /// Project normalized Mercator coordinates to pixel coordinates
    pub fn project_world(&self, x: f64, y: f64) -> (i32, i32) {
        let (cx, cy) = self.center_world();
        let scale = self.world_size();
        let dx = (x - cx) * scale;
        let dy = (y - cy) * scale;

        // Rotate so that the bearing points up
        let (sin, cos) = self.bearing.to_radians().sin_cos();
        let sx = dx * cos + dy * sin;
        let sy = -dx * sin + dy * cos;

        let px = (sx + self.width as f64 / 2.0).round() as i32;
        let py = (sy + self.height as f64 / 2.0).round() as i32;
        (px, py)
    }

    /// Unproject pixel coordinates back to normalized Mercator coordinates
    pub fn unproject_world(&self, px: i32, py: i32) -> (f64, f64) {
        let (cx, cy) = self.center_world();
        let sx = px as f64 - self.width as f64 / 2.0;
        let sy = py as f64 - self.height as f64 / 2.0;
        let (dx, dy) = self.screen_to_world_offset(sx, sy, self.world_size());
        (cx + dx, cy + dy)
    }

    /// Unproject pixel coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let (x, y) = self.unproject_world(px, py);
        world_to_lonlat(x, y)
    }

    /// Camera update that moves the view by a pixel delta
    pub fn pan(&self, dx: i32, dy: i32) -> PartialCameraState {
        let (lon, lat) = self.unproject(self.width as i32 / 2 + dx, self.height as i32 / 2 + dy);
        PartialCameraState::center(lat, lon)
    }

    /// Camera update that zooms by `delta` levels keeping the point under
    /// (px, py) fixed on screen
    pub fn zoom_at(&self, px: i32, py: i32, delta: f64) -> PartialCameraState {
        let (x, y) = self.unproject_world(px, py);
        let zoom = self.zoom + delta;

        let sx = px as f64 - self.width as f64 / 2.0;
        let sy = py as f64 - self.height as f64 / 2.0;
        let (dx, dy) = self.screen_to_world_offset(sx, sy, WORLD_DOTS * 2f64.powf(zoom));
        let (lon, lat) = world_to_lonlat(x - dx, y - dy);

        PartialCameraState {
            zoom: Some(zoom),
            latitude: Some(lat),
            longitude: Some(lon),
            ..PartialCameraState::default()
        }
    }

    /// Tiles at level `z` under the viewport, row-major, at most `limit`
    pub fn visible_tiles(&self, z: u8, limit: usize) -> Vec<TileCoord> {
        let corners = [
            self.unproject_world(0, 0),
            self.unproject_world(self.width as i32, 0),
            self.unproject_world(0, self.height as i32),
            self.unproject_world(self.width as i32, self.height as i32),
        ];
        let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
        let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
        let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

        let n = 1u64 << z;
        let to_index = |v: f64| ((v * n as f64).floor().max(0.0) as u64).min(n - 1) as u32;

        let mut tiles = Vec::new();
        for y in to_index(min_y)..=to_index(max_y) {
            for x in to_index(min_x)..=to_index(max_x) {
                if tiles.len() >= limit {
                    return tiles;
                }
                tiles.push(TileCoord::new(z, x, y));
            }
        }
        tiles
    }

    /// Screen corners of a tile, clockwise from the north-west
    pub fn tile_outline(&self, tile: TileCoord) -> [(i32, i32); 4] {
        let n = (1u64 << tile.z) as f64;
        let (x0, y0) = (tile.x as f64 / n, tile.y as f64 / n);
        let (x1, y1) = ((tile.x + 1) as f64 / n, (tile.y + 1) as f64 / n);
        [
            self.project_world(x0, y0),
            self.project_world(x1, y0),
            self.project_world(x1, y1),
            self.project_world(x0, y1),
        ]
    }

    /// Check if a projected point is visible in the viewport
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= -10 && px < self.width as i32 + 10 && py >= -10 && py < self.height as i32 + 10
    }

    /// Check if a line segment might be visible (rough bounding box check)
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0 && min_x < self.width as i32 && max_y >= 0 && min_y < self.height as i32
    }
}
