//! Core of the NAIP imagery viewer: view-state codec, mosaic registry, tile
//! URL builder, style assembly and the application shell. Terminal rendering
//! lives in the binary.

pub mod camera;
pub mod codec;
pub mod config;
pub mod error;
pub mod location;
pub mod registry;
pub mod shell;
pub mod style;
pub mod tile_url;

pub use camera::{CameraState, PartialCameraState};
pub use error::{NaipError, NaipResult};
pub use location::{Location, LocationParts};
pub use registry::MosaicRegistry;
pub use shell::{Shell, ShellEvent};
pub use style::{StyleDocument, StyleSettings};
