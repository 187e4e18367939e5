//! Application shell: owns the camera and the selected epoch, keeps the
//! location in sync and tells the views when either changes.

use tracing::{debug, info, warn};

use crate::camera::{CameraState, PartialCameraState};
use crate::codec::{
    format_view_state_hash, parse_view_state_from_hash, read_mosaic_from_query, write_hash, write_query_params,
    MOSAIC_PARAM,
};
use crate::location::Location;
use crate::registry::MosaicRegistry;
use crate::style::{build_map_style, StyleDocument, StyleSettings};

/// Behaviour switches for the shell
#[derive(Clone, Debug, PartialEq)]
pub struct ShellConfig {
    /// Camera used for every field the initial hash does not carry
    pub default_camera: CameraState,
    /// Write the camera to the hash on every change
    pub sync_hash: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            default_camera: CameraState::default(),
            sync_hash: true,
        }
    }
}

/// Notification sent to observers after a transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShellEvent<'a> {
    CameraChanged(&'a CameraState),
    StyleChanged { epoch: &'a str, style: &'a StyleDocument },
}

type Listener = Box<dyn FnMut(&ShellEvent<'_>)>;

pub struct Shell {
    camera: CameraState,
    epoch: String,
    style: StyleDocument,
    base_style: StyleDocument,
    registry: MosaicRegistry,
    settings: StyleSettings,
    config: ShellConfig,
    location: Box<dyn Location>,
    listeners: Vec<Listener>,
}

impl Shell {
    /// Build the initial state from the location: camera from the hash over
    /// the default camera, epoch from the query when it is registered.
    pub fn new(
        base_style: StyleDocument,
        registry: MosaicRegistry,
        settings: StyleSettings,
        config: ShellConfig,
        location: Box<dyn Location>,
    ) -> Self {
        let parts = location.get_location();

        let mut camera = config.default_camera;
        camera.apply(&parse_view_state_from_hash(parts.hash.as_str()));

        let requested = read_mosaic_from_query(&parts.search).unwrap_or_else(|| settings.default_epoch.clone());
        let epoch = registry.resolve_or_default(&requested, &settings.default_epoch).epoch.to_string();
        let style = build_map_style(&base_style, &epoch, &registry, &settings);

        info!(href = %parts.href(), %epoch, zoom = camera.zoom, "shell initialized");

        Self {
            camera,
            epoch,
            style,
            base_style,
            registry,
            settings,
            config,
            location,
            listeners: Vec::new(),
        }
    }

    /// Register an observer. It immediately receives the current camera and
    /// style, then every later change.
    pub fn subscribe(&mut self, mut listener: impl FnMut(&ShellEvent<'_>) + 'static) {
        listener(&ShellEvent::CameraChanged(&self.camera));
        listener(&ShellEvent::StyleChanged {
            epoch: &self.epoch,
            style: &self.style,
        });
        self.listeners.push(Box::new(listener));
    }

    /// Merge a camera update and mirror it into the hash
    pub fn on_camera_change(&mut self, update: &PartialCameraState) {
        if update.is_empty() {
            return;
        }

        self.camera.apply(update);

        if self.config.sync_hash {
            let href = write_hash(&self.location.href(), &format_view_state_hash(&self.camera));
            self.replace_location(&href);
        }

        for listener in &mut self.listeners {
            listener(&ShellEvent::CameraChanged(&self.camera));
        }
    }

    /// Switch epoch: unknown keys become the default epoch, the query is
    /// rewritten and the style rebuilt.
    pub fn on_epoch_change(&mut self, selected: &str) {
        let epoch: &'static str = self
            .registry
            .resolve_or_default(selected, &self.settings.default_epoch)
            .epoch;

        let href = write_query_params(&self.location.href(), [(MOSAIC_PARAM, epoch)]);
        self.replace_location(&href);

        self.style = build_map_style(&self.base_style, epoch, &self.registry, &self.settings);
        self.epoch = epoch.to_string();
        debug!(epoch, "epoch changed");

        for listener in &mut self.listeners {
            listener(&ShellEvent::StyleChanged {
                epoch: &self.epoch,
                style: &self.style,
            });
        }
    }

    /// Location writes are best effort; the session keeps its state even
    /// when the backing store is unwritable.
    fn replace_location(&mut self, href: &str) {
        if let Err(err) = self.location.replace_location(href) {
            warn!(%err, href, "failed to update location");
        }
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    pub fn style(&self) -> &StyleDocument {
        &self.style
    }

    pub fn registry(&self) -> &MosaicRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &StyleSettings {
        &self.settings
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn href(&self) -> String {
        self.location.href()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::codec::read_query_param;
    use crate::location::{LocationParts, MemoryLocation};
    use crate::style::NAIP_SOURCE;

    fn shell(href: &str) -> Shell {
        Shell::new(
            StyleDocument::embedded().unwrap(),
            MosaicRegistry::default(),
            StyleSettings::default(),
            ShellConfig::default(),
            Box::new(MemoryLocation::new(href)),
        )
    }

    #[test]
    fn test_initial_state_defaults() {
        let shell = shell("/");
        assert_eq!(*shell.camera(), CameraState::default());
        assert_eq!(shell.epoch(), "2016-2018");
        assert!(shell.style().sources.contains_key(NAIP_SOURCE));
    }

    #[test]
    fn test_initial_state_from_location() {
        let shell = shell("/?mosaic=2014-2015#10/40.5/-105.25");
        assert_eq!(shell.epoch(), "2014-2015");
        assert_eq!(shell.camera().zoom, 10.0);
        assert_eq!(shell.camera().latitude, 40.5);
        assert_eq!(shell.camera().longitude, -105.25);
        assert_eq!(shell.camera().bearing, 0.0);
    }

    #[test]
    fn test_unknown_initial_epoch_uses_default() {
        let shell = shell("/?mosaic=1999-2000");
        assert_eq!(shell.epoch(), "2016-2018");
    }

    #[test]
    fn test_epoch_change_updates_query_and_style() {
        let mut shell = shell("/?foo=bar#13/36/-111");
        let before = shell.style().clone();
        shell.on_epoch_change("2011-2013");

        let parts = LocationParts::parse(&shell.href());
        assert_eq!(read_query_param(&parts.search, "foo"), Some("bar".to_string()));
        assert_eq!(read_mosaic_from_query(&parts.search), Some("2011-2013".to_string()));
        assert_eq!(parts.hash, "#13/36/-111");
        assert_eq!(shell.epoch(), "2011-2013");
        assert_ne!(shell.style().sources[NAIP_SOURCE], before.sources[NAIP_SOURCE]);
    }

    #[test]
    fn test_unknown_epoch_change_falls_back() {
        let mut shell = shell("/?mosaic=2011-2013");
        shell.on_epoch_change("not-an-epoch");
        assert_eq!(shell.epoch(), "2016-2018");
        assert_eq!(shell.href(), "/?mosaic=2016-2018");
    }

    #[test]
    fn test_camera_change_merges_and_writes_hash() {
        let mut shell = shell("/?mosaic=2015-2017");
        shell.on_camera_change(&PartialCameraState::zoom(14.0));
        assert_eq!(shell.camera().zoom, 14.0);
        assert_eq!(shell.camera().latitude, 36.07832);
        assert_eq!(shell.href(), "/?mosaic=2015-2017#14/36.07832/-111.8695");
    }

    #[test]
    fn test_camera_change_without_hash_sync() {
        let mut shell = Shell::new(
            StyleDocument::embedded().unwrap(),
            MosaicRegistry::default(),
            StyleSettings::default(),
            ShellConfig {
                sync_hash: false,
                ..ShellConfig::default()
            },
            Box::new(MemoryLocation::new("/")),
        );
        shell.on_camera_change(&PartialCameraState::center(10.0, 20.0));
        assert_eq!(shell.camera().latitude, 10.0);
        assert_eq!(shell.href(), "/");
    }

    #[test]
    fn test_observers_see_current_state_then_changes() {
        let mut shell = shell("/");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        shell.subscribe(move |event| {
            let entry = match event {
                ShellEvent::CameraChanged(camera) => format!("camera {}", camera.zoom),
                ShellEvent::StyleChanged { epoch, .. } => format!("style {epoch}"),
            };
            sink.borrow_mut().push(entry);
        });

        shell.on_camera_change(&PartialCameraState::zoom(9.0));
        shell.on_camera_change(&PartialCameraState::default());
        shell.on_epoch_change("2014-2015");

        assert_eq!(
            *seen.borrow(),
            ["camera 13", "style 2016-2018", "camera 9", "style 2014-2015"]
        );
    }
}
