use naip_map::registry::MosaicRegistry;
use naip_map::shell::ShellEvent;
use ratatui::layout::Rect;

/// Shown while the camera is zoomed out past every imagery band
pub const ZOOM_HINT: &str = "Zoom in to see imagery";

/// Widest the panel grows, in cells
const MAX_WIDTH: u16 = 40;
/// Border rows plus the hint and imagery lines
const EXTRA_ROWS: u16 = 4;

/// Epoch selector shown over the top-left corner of the map
pub struct SelectorPanel {
    /// `(value, label)` in registry order
    options: Vec<(&'static str, &'static str)>,
    selected: String,
    zoom: f64,
    hint_zoom: f64,
}

impl SelectorPanel {
    pub fn new(registry: &MosaicRegistry, hint_zoom: f64) -> Self {
        Self {
            options: registry.options().collect(),
            selected: String::new(),
            zoom: 0.0,
            hint_zoom,
        }
    }

    /// Observer callback for shell transitions
    pub fn handle_event(&mut self, event: &ShellEvent<'_>) {
        match *event {
            ShellEvent::CameraChanged(camera) => self.zoom = camera.zoom,
            ShellEvent::StyleChanged { epoch, .. } => self.selected = epoch.to_string(),
        }
    }

    pub fn options(&self) -> &[(&'static str, &'static str)] {
        &self.options
    }

    pub fn is_selected(&self, value: &str) -> bool {
        self.selected == value
    }

    pub fn hint(&self) -> Option<&'static str> {
        (self.zoom < self.hint_zoom).then_some(ZOOM_HINT)
    }

    /// Epoch at a zero-based position
    pub fn select_index(&self, index: usize) -> Option<&'static str> {
        self.options.get(index).map(|(value, _)| *value)
    }

    /// Epoch `step` places away from the selection, wrapping around
    pub fn cycle(&self, step: isize) -> Option<&'static str> {
        if self.options.is_empty() {
            return None;
        }
        let len = self.options.len() as isize;
        let current = self
            .options
            .iter()
            .position(|(value, _)| *value == self.selected)
            .unwrap_or(0) as isize;
        self.select_index((current + step).rem_euclid(len) as usize)
    }

    /// Panel rectangle inside the map area
    pub fn area(&self, map: Rect) -> Rect {
        let label_width = self
            .options
            .iter()
            .map(|(_, label)| label.chars().count() as u16)
            .max()
            .unwrap_or(0);
        // Border, selection marker and the digit key
        let width = (label_width + 6).max(ZOOM_HINT.len() as u16 + 2).min(MAX_WIDTH);
        let height = self.options.len() as u16 + EXTRA_ROWS;
        Rect {
            x: map.x + 1,
            y: map.y,
            width: width.min(map.width.saturating_sub(1)),
            height: height.min(map.height),
        }
    }

    /// Epoch listed on the screen row under a click inside `area`
    pub fn option_at(&self, area: Rect, col: u16, row: u16) -> Option<&'static str> {
        let inside_x = col > area.x && col + 1 < area.x + area.width;
        let inside_y = row > area.y && row + 1 < area.y + area.height;
        if !inside_x || !inside_y {
            return None;
        }
        self.select_index((row - area.y - 1) as usize)
    }
}
