/// Largest latitude representable in Web Mercator
pub const MAX_LATITUDE: f64 = 85.051129;
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;
pub const MAX_PITCH: f64 = 60.0;

/// Camera over the map: geographic center, zoom level, bearing and pitch
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    pub latitude: f64,
    pub longitude: f64,
    /// Web Mercator zoom level (0 = whole world in one tile)
    pub zoom: f64,
    /// Degrees clockwise from north
    pub bearing: f64,
    /// Degrees away from straight down
    pub pitch: f64,
}

impl CameraState {
    pub fn new(latitude: f64, longitude: f64, zoom: f64) -> Self {
        Self {
            latitude,
            longitude,
            zoom,
            bearing: 0.0,
            pitch: 0.0,
        }
    }

    /// Merge a partial update; fields the update does not carry are kept.
    pub fn apply(&mut self, update: &PartialCameraState) {
        if let Some(zoom) = update.zoom {
            self.zoom = zoom;
        }
        if let Some(latitude) = update.latitude {
            self.latitude = latitude;
        }
        if let Some(longitude) = update.longitude {
            self.longitude = longitude;
        }
        if let Some(bearing) = update.bearing {
            self.bearing = bearing;
        }
        if let Some(pitch) = update.pitch {
            self.pitch = pitch;
        }
        self.constrain();
    }

    /// Clamp and wrap every field into the range the map can display
    pub fn constrain(&mut self) {
        self.latitude = self.latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        if !(-180.0..180.0).contains(&self.longitude) {
            self.longitude = (self.longitude + 180.0).rem_euclid(360.0) - 180.0;
        }
        self.zoom = self.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if !(self.bearing > -180.0 && self.bearing <= 180.0) {
            let bearing = (self.bearing + 180.0).rem_euclid(360.0) - 180.0;
            self.bearing = if bearing == -180.0 { 180.0 } else { bearing };
        }
        self.pitch = self.pitch.clamp(0.0, MAX_PITCH);
    }

    /// Every field as a partial update
    pub fn to_partial(&self) -> PartialCameraState {
        PartialCameraState {
            zoom: Some(self.zoom),
            latitude: Some(self.latitude),
            longitude: Some(self.longitude),
            bearing: Some(self.bearing),
            pitch: Some(self.pitch),
        }
    }
}

impl Default for CameraState {
    /// Grand Canyon at zoom 13
    fn default() -> Self {
        Self::new(36.07832, -111.8695, 13.0)
    }
}

/// Camera update where every field is optional
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PartialCameraState {
    pub zoom: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub bearing: Option<f64>,
    pub pitch: Option<f64>,
}

impl PartialCameraState {
    pub fn is_empty(&self) -> bool {
        self.zoom.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.bearing.is_none()
            && self.pitch.is_none()
    }

    pub fn center(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..Self::default()
        }
    }

    pub fn zoom(zoom: f64) -> Self {
        Self {
            zoom: Some(zoom),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_keeps_absent_fields() {
        let mut camera = CameraState::default();
        camera.bearing = 30.0;
        camera.apply(&PartialCameraState::zoom(15.0));
        assert_eq!(camera.zoom, 15.0);
        assert_eq!(camera.latitude, 36.07832);
        assert_eq!(camera.longitude, -111.8695);
        assert_eq!(camera.bearing, 30.0);
    }

    #[test]
    fn test_empty_update_is_noop() {
        let mut camera = CameraState::default();
        camera.apply(&PartialCameraState::default());
        assert_eq!(camera, CameraState::default());
        assert!(PartialCameraState::default().is_empty());
    }

    #[test]
    fn test_constrain_wraps_and_clamps() {
        let mut camera = CameraState::new(89.0, 190.0, 30.0);
        camera.bearing = 270.0;
        camera.pitch = 75.0;
        camera.constrain();
        assert_eq!(camera.latitude, MAX_LATITUDE);
        assert!((camera.longitude - -170.0).abs() < 1e-9);
        assert_eq!(camera.zoom, MAX_ZOOM);
        assert!((camera.bearing - -90.0).abs() < 1e-9);
        assert_eq!(camera.pitch, MAX_PITCH);
    }

    #[test]
    fn test_bearing_half_turn_is_positive() {
        let mut camera = CameraState::default();
        camera.bearing = -180.0;
        camera.constrain();
        assert_eq!(camera.bearing, 180.0);
    }
}
