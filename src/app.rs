use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use naip_map::camera::PartialCameraState;
use naip_map::Shell;
use ratatui::layout::Rect;

use crate::map::MapView;
use crate::panel::SelectorPanel;

/// Application state: the shell plus the two views observing it
pub struct App {
    pub shell: Shell,
    pub map: Rc<RefCell<MapView>>,
    pub panel: Rc<RefCell<SelectorPanel>>,
    pub should_quit: bool,
}

impl App {
    pub fn new(mut shell: Shell, data_root: PathBuf, hint_zoom: f64, cols: u16, rows: u16) -> Self {
        let mut view = MapView::new(data_root, 0, 0);
        view.resize(cols, rows);
        let map = Rc::new(RefCell::new(view));
        let panel = Rc::new(RefCell::new(SelectorPanel::new(shell.registry(), hint_zoom)));

        let sink = Rc::clone(&map);
        shell.subscribe(move |event| sink.borrow_mut().handle_event(event));
        let sink = Rc::clone(&panel);
        shell.subscribe(move |event| sink.borrow_mut().handle_event(event));

        Self {
            shell,
            map,
            panel,
            should_quit: false,
        }
    }

    /// Update for a terminal resize
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.map.borrow_mut().resize(cols, rows);
    }

    /// Map area inside the border, above the status bar
    pub fn map_area(&self) -> Rect {
        let (width, height) = self.map.borrow().size();
        Rect::new(1, 1, width, height)
    }

    pub fn panel_area(&self) -> Rect {
        self.panel.borrow().area(self.map_area())
    }

    fn update_camera(&mut self, update: PartialCameraState) {
        self.shell.on_camera_change(&update);
    }

    /// Pan the map by pixel offset
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let update = self.map.borrow().pan(dx, dy);
        self.update_camera(update);
    }

    pub fn zoom_in(&mut self) {
        let update = self.map.borrow().zoom_by(1.0);
        self.update_camera(update);
    }

    pub fn zoom_out(&mut self) {
        let update = self.map.borrow().zoom_by(-1.0);
        self.update_camera(update);
    }

    /// Zoom in towards mouse position
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let update = self.map.borrow().zoom_at(col, row, 1.0);
        self.update_camera(update);
    }

    /// Zoom out from mouse position
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let update = self.map.borrow().zoom_at(col, row, -1.0);
        self.update_camera(update);
    }

    pub fn rotate(&mut self, delta: f64) {
        let update = self.map.borrow().rotate(delta);
        self.update_camera(update);
    }

    pub fn tilt(&mut self, delta: f64) {
        let update = self.map.borrow().tilt(delta);
        self.update_camera(update);
    }

    /// Left button down: pick an epoch on the panel, otherwise start a drag
    pub fn click(&mut self, col: u16, row: u16) {
        let area = self.panel_area();
        let picked = self.panel.borrow().option_at(area, col, row);
        match picked {
            Some(epoch) => self.select_epoch(epoch),
            None => self.map.borrow_mut().begin_drag(col, row),
        }
    }

    /// Handle mouse drag for panning
    pub fn handle_drag(&mut self, col: u16, row: u16) {
        let update = self.map.borrow_mut().drag(col, row);
        self.update_camera(update);
    }

    pub fn end_drag(&mut self) {
        self.map.borrow_mut().end_drag();
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.map.borrow_mut().set_mouse_pos(col, row);
    }

    pub fn select_epoch(&mut self, epoch: &str) {
        self.shell.on_epoch_change(epoch);
    }

    /// Select the epoch listed at `index` (zero-based)
    pub fn select_epoch_index(&mut self, index: usize) {
        let picked = self.panel.borrow().select_index(index);
        if let Some(epoch) = picked {
            self.select_epoch(epoch);
        }
    }

    pub fn cycle_epoch(&mut self, step: isize) {
        let picked = self.panel.borrow().cycle(step);
        if let Some(epoch) = picked {
            self.select_epoch(epoch);
        }
    }

    /// Back to the configured default camera
    pub fn reset_view(&mut self) {
        let update = self.shell.config().default_camera.to_partial();
        self.update_camera(update);
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Get current zoom level as string
    pub fn zoom_level(&self) -> String {
        format!("{:.2}", self.shell.camera().zoom)
    }

    /// Get center coordinates as string
    pub fn center_coords(&self) -> String {
        let camera = self.shell.camera();
        format_lonlat(camera.longitude, camera.latitude)
    }

    pub fn orientation(&self) -> String {
        let camera = self.shell.camera();
        format!("{:.1}° / {:.0}°", camera.bearing, camera.pitch)
    }

    /// Coordinates under the mouse, if it is over the map
    pub fn cursor_coords(&self) -> Option<String> {
        self.map
            .borrow()
            .cursor_lonlat()
            .map(|(lon, lat)| format_lonlat(lon, lat))
    }
}

fn format_lonlat(lon: f64, lat: f64) -> String {
    let lat_dir = if lat >= 0.0 { 'N' } else { 'S' };
    let lon_dir = if lon >= 0.0 { 'E' } else { 'W' };
    format!("{:.5}°{} {:.5}°{}", lat.abs(), lat_dir, lon.abs(), lon_dir)
}
