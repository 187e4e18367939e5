//! Tile template URLs for the dynamic imagery endpoint.

use url::form_urlencoded;

/// Tile endpoint; `@2x` requests 512px tiles
pub const DEFAULT_TILE_TEMPLATE: &str = "https://us-west-2-lambda.kylebarron.dev/naip/{z}/{x}/{y}@2x.jpg";

/// Contrast/saturation applied server-side to the raw NAIP bands
pub const DEFAULT_COLOR_OPS: &str = "sigmoidal RGB 4 0.5, saturation 1.25";

/// Query key carrying the mosaic identifier
pub const SOURCE_PARAM: &str = "url";

/// Append `url=<source_identifier>` and `extra_params` (in order, form
/// encoded) to a tile template. The `{z}/{x}/{y}` placeholders are left for
/// the tile client.
pub fn build_tile_url<I, K, V>(source_identifier: &str, template: &str, extra_params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair(SOURCE_PARAM, source_identifier);
    for (key, value) in extra_params {
        query.append_pair(key.as_ref(), value.as_ref());
    }

    let separator = match template.find('?') {
        None => "?",
        Some(_) if template.ends_with('?') || template.ends_with('&') => "",
        Some(_) => "&",
    };

    format!("{template}{separator}{}", query.finish())
}

/// A single tile address
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Substitute this tile into a template
    pub fn expand(&self, template: &str) -> String {
        template
            .replace("{z}", &self.z.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
    }
}
