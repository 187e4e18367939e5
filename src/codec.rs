//! View-state codec: camera state in the hash fragment, epoch selection in
//! the query string.
//!
//! Hash layout is `#zoom/latitude/longitude/bearing/pitch`, the order used
//! by Mapbox GL's `hash` option. Every field is optional from the right and
//! any field that is not a finite number is dropped rather than defaulted.

use tracing::debug;
use url::form_urlencoded;

use crate::camera::{CameraState, PartialCameraState};
use crate::error::{NaipError, NaipResult};
use crate::location::LocationParts;

/// Query parameter carrying the selected epoch
pub const MOSAIC_PARAM: &str = "mosaic";

/// Parse a hash fragment into whichever camera fields it carries.
///
/// `None`, `""` and strings without a leading `#` all yield an empty update.
pub fn parse_view_state_from_hash<'a>(hash: impl Into<Option<&'a str>>) -> PartialCameraState {
    let Some(body) = hash.into().and_then(|h| h.strip_prefix('#')) else {
        return PartialCameraState::default();
    };

    let mut fields = body
        .split('/')
        .enumerate()
        .map(|(index, raw)| match parse_hash_field(index, raw) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(%err, "dropping hash field");
                None
            }
        });

    // Extra trailing fields are never pulled from the iterator
    PartialCameraState {
        zoom: fields.next().flatten(),
        latitude: fields.next().flatten(),
        longitude: fields.next().flatten(),
        bearing: fields.next().flatten(),
        pitch: fields.next().flatten(),
    }
}

/// Fields are plain decimal numbers; hex or other radix forms such as
/// `0x10` are malformed.
fn parse_hash_field(index: usize, raw: &str) -> NaipResult<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| NaipError::MalformedHashField {
            index,
            value: raw.to_string(),
        })
}

/// Format a camera the way Mapbox GL writes its hash: zoom to 2 decimals,
/// lat/lon with zoom-dependent precision, bearing and pitch only when set.
pub fn format_view_state_hash(camera: &CameraState) -> String {
    let precision = coordinate_precision(camera.zoom);
    let mut hash = format!(
        "#{}/{}/{}",
        format_rounded(camera.zoom, 2),
        format_rounded(camera.latitude, precision),
        format_rounded(camera.longitude, precision),
    );

    if camera.bearing != 0.0 || camera.pitch != 0.0 {
        hash.push('/');
        hash.push_str(&format_rounded(camera.bearing, 1));
    }
    if camera.pitch != 0.0 {
        hash.push('/');
        hash.push_str(&format_rounded(camera.pitch, 0));
    }

    hash
}

/// Decimal places needed for sub-pixel lat/lon at this zoom
fn coordinate_precision(zoom: f64) -> usize {
    let digits = (zoom * std::f64::consts::LN_2 + (512.0_f64 / 360.0 / 0.5).ln()) / std::f64::consts::LN_10;
    digits.ceil().max(0.0) as usize
}

/// Round to `places` decimals and print without trailing zeros
fn format_rounded(value: f64, places: usize) -> String {
    let mut text = format!("{:.*}", places, value);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

/// First value of `key` in a search string (leading `?` optional)
pub fn read_query_param(search: &str, key: &str) -> Option<String> {
    let query = search.strip_prefix('?').unwrap_or(search);
    form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
}

/// The epoch named in the query string, unvalidated
pub fn read_mosaic_from_query(search: &str) -> Option<String> {
    read_query_param(search, MOSAIC_PARAM)
}

/// Merge `updates` into the query of `current` (a path+query+hash string)
/// and return the full href to replace the location with.
///
/// Existing keys are overwritten in place (later duplicates dropped), new
/// keys are appended and everything else is kept in order.
pub fn write_query_params<I, K, V>(current: &str, updates: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let parts = LocationParts::parse(current);
    let query = parts.search.strip_prefix('?').unwrap_or(&parts.search);
    let mut pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes()).into_owned().collect();

    for (key, value) in updates {
        let (key, value) = (key.as_ref(), value.as_ref());
        match pairs.iter().position(|(name, _)| name == key) {
            Some(first) => {
                pairs[first].1 = value.to_string();
                let mut index = 0;
                pairs.retain(|(name, _)| {
                    let keep = index <= first || name != key;
                    index += 1;
                    keep
                });
            }
            None => pairs.push((key.to_string(), value.to_string())),
        }
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(&pairs)
        .finish();

    if query.is_empty() {
        return format!("{}{}", parts.pathname, parts.hash);
    }
    format!("{}?{}{}", parts.pathname, query, parts.hash)
}

/// Replace the hash of `current`, keeping path and query
pub fn write_hash(current: &str, hash: &str) -> String {
    let parts = LocationParts::parse(current);
    format!("{}{}{}", parts.pathname, parts.search, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_hash() {
        let state = parse_view_state_from_hash("#13.5/36.07832/-111.8695/45/30");
        assert_eq!(
            state,
            PartialCameraState {
                zoom: Some(13.5),
                latitude: Some(36.07832),
                longitude: Some(-111.8695),
                bearing: Some(45.0),
                pitch: Some(30.0),
            }
        );
    }

    #[test]
    fn test_parse_empty_and_missing_hash() {
        assert!(parse_view_state_from_hash("").is_empty());
        assert!(parse_view_state_from_hash(None).is_empty());
        assert!(parse_view_state_from_hash("13/36/-111").is_empty());
    }

    #[test]
    fn test_parse_partial_hash() {
        let state = parse_view_state_from_hash("#13/36.07832/-111.8695");
        assert_eq!(state.zoom, Some(13.0));
        assert_eq!(state.latitude, Some(36.07832));
        assert_eq!(state.longitude, Some(-111.8695));
        assert_eq!(state.bearing, None);
        assert_eq!(state.pitch, None);
    }

    #[test]
    fn test_parse_drops_malformed_fields() {
        let state = parse_view_state_from_hash("#abc/36.1//NaN/inf");
        assert_eq!(state.zoom, None);
        assert_eq!(state.latitude, Some(36.1));
        assert_eq!(state.longitude, None);
        assert_eq!(state.bearing, None);
        assert_eq!(state.pitch, None);
    }

    #[test]
    fn test_parse_rejects_hex_fields() {
        let state = parse_view_state_from_hash("#0x10/36/-111/0b1");
        assert_eq!(state.zoom, None);
        assert_eq!(state.latitude, Some(36.0));
        assert_eq!(state.longitude, Some(-111.0));
        assert_eq!(state.bearing, None);
    }

    #[test]
    fn test_parse_keeps_zero_and_ignores_extra_fields() {
        let state = parse_view_state_from_hash("#0/0/0/0/0/99/100");
        assert_eq!(state.zoom, Some(0.0));
        assert_eq!(state.pitch, Some(0.0));
    }

    #[test]
    fn test_format_hash_omits_default_bearing_and_pitch() {
        let camera = CameraState::default();
        assert_eq!(format_view_state_hash(&camera), "#13/36.07832/-111.8695");
    }

    #[test]
    fn test_format_hash_with_rotation() {
        let mut camera = CameraState::new(36.0, -111.0, 12.346);
        camera.bearing = -12.34;
        camera.pitch = 40.4;
        assert_eq!(format_view_state_hash(&camera), "#12.35/36/-111/-12.3/40");

        camera.pitch = 0.0;
        assert_eq!(format_view_state_hash(&camera), "#12.35/36/-111/-12.3");
    }

    #[test]
    fn test_formatted_hash_parses_back() {
        let mut camera = CameraState::new(40.712776, -74.005974, 15.0);
        camera.bearing = 90.0;
        camera.pitch = 45.0;
        let parsed = parse_view_state_from_hash(format_view_state_hash(&camera).as_str());
        assert_eq!(parsed.zoom, Some(15.0));
        assert!((parsed.latitude.unwrap() - camera.latitude).abs() < 1e-5);
        assert!((parsed.longitude.unwrap() - camera.longitude).abs() < 1e-5);
        assert_eq!(parsed.bearing, Some(90.0));
        assert_eq!(parsed.pitch, Some(45.0));
    }

    #[test]
    fn test_read_mosaic() {
        assert_eq!(read_mosaic_from_query("?mosaic=2016-2018"), Some("2016-2018".to_string()));
        assert_eq!(read_mosaic_from_query("foo=1&mosaic=2011-2013"), Some("2011-2013".to_string()));
        assert_eq!(read_mosaic_from_query(""), None);
        assert_eq!(read_mosaic_from_query("?foo=bar"), None);
    }

    #[test]
    fn test_write_query_preserves_other_params() {
        let href = write_query_params("/?foo=bar", [("mosaic", "2014-2015")]);
        assert_eq!(href, "/?foo=bar&mosaic=2014-2015");

        let parts = LocationParts::parse(&href);
        assert_eq!(read_query_param(&parts.search, "foo"), Some("bar".to_string()));
        assert_eq!(read_mosaic_from_query(&parts.search), Some("2014-2015".to_string()));
    }

    #[test]
    fn test_write_query_overwrites_in_place_and_keeps_hash() {
        let href = write_query_params(
            "/naip/?mosaic=2011-2013&x=1&mosaic=old#13/36/-111",
            [("mosaic", "2016-2018")],
        );
        assert_eq!(href, "/naip/?mosaic=2016-2018&x=1#13/36/-111");
    }

    #[test]
    fn test_write_query_encodes_values() {
        let href = write_query_params("/", [("label", "a b&c")]);
        assert_eq!(href, "/?label=a+b%26c");
        assert_eq!(read_query_param("?label=a+b%26c", "label"), Some("a b&c".to_string()));
    }

    #[test]
    fn test_write_query_without_pairs_drops_question_mark() {
        let updates: [(&str, &str); 0] = [];
        assert_eq!(write_query_params("/?#5/1/2", updates), "/#5/1/2");
    }

    #[test]
    fn test_write_hash_keeps_query() {
        assert_eq!(write_hash("/?mosaic=2016-2018#1/2/3", "#4/5/6"), "/?mosaic=2016-2018#4/5/6");
    }
}
