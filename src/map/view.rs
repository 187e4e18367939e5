use std::path::PathBuf;

use naip_map::camera::{CameraState, PartialCameraState};
use naip_map::shell::ShellEvent;
use naip_map::style::StyleDocument;

use crate::map::projection::Viewport;
use crate::map::renderer::{MapLayers, MapRenderer};

/// Bearing step for one rotate gesture, in degrees
pub const ROTATE_STEP: f64 = 15.0;
/// Pitch step for one tilt gesture, in degrees
pub const TILT_STEP: f64 = 10.0;

/// The interactive map. Mirrors the shell's camera and style; gestures
/// only describe camera updates, the shell decides what the camera becomes.
pub struct MapView {
    camera: CameraState,
    style: StyleDocument,
    renderer: MapRenderer,
    data_root: PathBuf,
    /// Map area in terminal cells (inside the border)
    width: u16,
    height: u16,
    /// Last drag position
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for the cursor marker
    pub mouse_pos: Option<(u16, u16)>,
}

impl MapView {
    pub fn new(data_root: PathBuf, width: u16, height: u16) -> Self {
        Self {
            camera: CameraState::default(),
            style: StyleDocument::default(),
            renderer: MapRenderer::new(),
            data_root,
            width,
            height,
            last_mouse: None,
            mouse_pos: None,
        }
    }

    /// Observer callback for shell transitions
    pub fn handle_event(&mut self, event: &ShellEvent<'_>) {
        match *event {
            ShellEvent::CameraChanged(camera) => self.camera = *camera,
            ShellEvent::StyleChanged { style, .. } => {
                self.renderer.load_sources(style, &self.data_root);
                self.style = style.clone();
            }
        }
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    /// Resize to the map area of a terminal of `cols` x `rows` cells
    pub fn resize(&mut self, cols: u16, rows: u16) {
        // Border on every side plus the status bar
        self.width = cols.saturating_sub(2);
        self.height = rows.saturating_sub(3);
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Viewport in braille pixels (2x4 per cell)
    pub fn viewport(&self) -> Viewport {
        Viewport::from_camera(&self.camera, self.width as usize * 2, self.height as usize * 4)
    }

    pub fn render(&self) -> MapLayers {
        self.renderer
            .render(&self.style, self.width as usize, self.height as usize, &self.viewport())
    }

    pub fn pan(&self, dx: i32, dy: i32) -> PartialCameraState {
        self.viewport().pan(dx, dy)
    }

    pub fn zoom_by(&self, delta: f64) -> PartialCameraState {
        PartialCameraState::zoom(self.camera.zoom + delta)
    }

    /// Zoom towards the terminal cell under the mouse
    pub fn zoom_at(&self, col: u16, row: u16, delta: f64) -> PartialCameraState {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport().zoom_at(px, py, delta)
    }

    pub fn rotate(&self, delta: f64) -> PartialCameraState {
        PartialCameraState {
            bearing: Some(self.camera.bearing + delta),
            ..PartialCameraState::default()
        }
    }

    pub fn tilt(&self, delta: f64) -> PartialCameraState {
        PartialCameraState {
            pitch: Some(self.camera.pitch + delta),
            ..PartialCameraState::default()
        }
    }

    pub fn begin_drag(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
    }

    /// Pan so the point under the mouse follows it
    pub fn drag(&mut self, col: u16, row: u16) -> PartialCameraState {
        let update = match self.last_mouse {
            Some((last_col, last_row)) if (last_col, last_row) != (col, row) => {
                let dx = (last_col as i32 - col as i32) * 2;
                let dy = (last_row as i32 - row as i32) * 4;
                self.pan(dx, dy)
            }
            _ => PartialCameraState::default(),
        };
        self.last_mouse = Some((col, row));
        update
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Mouse position in braille pixels
    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos.map(|(col, row)| cell_to_pixel(col, row))
    }

    /// Geographic position under the mouse, when it is over the map
    pub fn cursor_lonlat(&self) -> Option<(f64, f64)> {
        let (col, row) = self.mouse_pos?;
        if col == 0 || row == 0 || col > self.width || row > self.height {
            return None;
        }
        let (px, py) = cell_to_pixel(col, row);
        Some(self.viewport().unproject(px, py))
    }
}

/// Terminal cell to braille pixel, accounting for the one-cell border
fn cell_to_pixel(col: u16, row: u16) -> (i32, i32) {
    let px = col.saturating_sub(1) as i32 * 2;
    let py = row.saturating_sub(1) as i32 * 4;
    (px, py)
}
