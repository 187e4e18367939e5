mod geometry;
mod projection;
mod renderer;
mod view;

pub use renderer::{ImageryFrame, LineString, MapLayers, Place, VectorData};
pub use view::{MapView, ROTATE_STEP, TILT_STEP};
