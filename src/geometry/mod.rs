//! Point and bounding-box helpers
//!
//! Stateless geometry used around the geocoder: great-circle distances,
//! bounding-box normalisation, growth, intersection and merging.
//!
//! The distance strategy is a closed enum selected from configuration
//! (`distance_function = "haversine"`).

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::models::BoundingBox;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371e3;

/// Meters per degree of latitude (and of longitude at the equator)
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Default half-width, in degrees, beyond which a box is considered world-spanning
pub const LARGE_BBOX_THRESHOLD: f64 = 175.0;

/// Distance functions available to the geometry helpers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceFunction {
    /// Great-circle distance on a spherical Earth
    #[default]
    #[serde(alias = "harvesin")]
    Haversine,
}

impl DistanceFunction {
    /// Distance in meters between two `[lon, lat]` points
    pub fn distance(&self, a: [f64; 2], b: [f64; 2]) -> f64 {
        match self {
            Self::Haversine => haversine(a[1], a[0], b[1], b[0]),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Haversine => "haversine",
        }
    }
}

impl fmt::Display for DistanceFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "haversine" | "harvesin" => Ok(Self::Haversine),
            other => Err(format!("unknown distance function '{other}'")),
        }
    }
}

/// Haversine distance in meters between two latitude/longitude pairs
pub fn haversine(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    let phi_a = lat_a * PI / 180.0;
    let phi_b = lat_b * PI / 180.0;
    let delta_phi = (lat_b - lat_a) * PI / 180.0;
    let delta_lambda = (lon_b - lon_a) * PI / 180.0;

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi_a.cos() * phi_b.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Distance in meters between two `[lon, lat]` points
pub fn calculate_distance(a: [f64; 2], b: [f64; 2], function: DistanceFunction) -> f64 {
    function.distance(a, b)
}

/// Minimum corner-to-corner distance between two boxes
pub fn bbox_distance(a: &BoundingBox, b: &BoundingBox, function: DistanceFunction) -> f64 {
    let corners_a = [a.lower_corner(), a.upper_corner()];
    let corners_b = [b.lower_corner(), b.upper_corner()];

    corners_a
        .iter()
        .flat_map(|ca| corners_b.iter().map(move |cb| function.distance(*ca, *cb)))
        .fold(2.0 * PI * EARTH_RADIUS_M, f64::min)
}

/// Length of a box diagonal in meters
pub fn diagonal(bbox: &BoundingBox, function: DistanceFunction) -> f64 {
    function.distance(bbox.lower_corner(), bbox.upper_corner())
}

/// Order each axis so min <= max and clamp to valid GPS ranges.
///
/// Upstream extents regularly arrive with flipped latitude corners.
pub fn gps_sanity_check(bbox: &BoundingBox) -> BoundingBox {
    let (min_lon, max_lon) = ordered(bbox.min_lon, bbox.max_lon);
    let (min_lat, max_lat) = ordered(bbox.min_lat, bbox.max_lat);

    BoundingBox::new(
        min_lon.clamp(-180.0, 180.0),
        min_lat.clamp(-90.0, 90.0),
        max_lon.clamp(-180.0, 180.0),
        max_lat.clamp(-90.0, 90.0),
    )
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Centre of a box as `[lon, lat]`
pub fn bbox_to_point(bbox: &BoundingBox) -> [f64; 2] {
    [
        (bbox.min_lon + bbox.max_lon) / 2.0,
        (bbox.min_lat + bbox.max_lat) / 2.0,
    ]
}

/// Grow (`add`) or shrink the box by `meters`, split evenly on both sides of each axis
pub fn edit_bounding_box(bbox: &BoundingBox, meters: f64, add: bool) -> BoundingBox {
    let b = gps_sanity_check(bbox);
    let half = meters / 2.0;
    let sign = if add { 1.0 } else { -1.0 };

    let lat_delta = sign * half / METERS_PER_DEGREE;
    let mid_lat = ((b.min_lat + b.max_lat) / 2.0).to_radians();
    let lon_scale = (METERS_PER_DEGREE * mid_lat.cos()).max(1.0);
    let lon_delta = sign * half / lon_scale;

    let edited = BoundingBox::new(
        b.min_lon - lon_delta,
        b.min_lat - lat_delta,
        b.max_lon + lon_delta,
        b.max_lat + lat_delta,
    );

    // shrinking past the centre collapses to the centre point
    if edited.min_lon > edited.max_lon || edited.min_lat > edited.max_lat {
        let [lon, lat] = bbox_to_point(&b);
        return BoundingBox::new(lon, lat, lon, lat);
    }

    gps_sanity_check(&edited)
}

/// Grow a box whose diagonal is shorter than `distance` meters
pub fn enlarge_bounding_box(
    bbox: &BoundingBox,
    distance: f64,
    function: DistanceFunction,
) -> BoundingBox {
    let current = diagonal(bbox, function);
    if current > distance {
        return *bbox;
    }
    edit_bounding_box(bbox, distance - current, true)
}

/// True when the two boxes overlap (touching edges count)
pub fn check_intersection(a: &BoundingBox, b: &BoundingBox) -> bool {
    if a == b {
        return true;
    }

    let a = gps_sanity_check(a);
    let b = gps_sanity_check(b);

    a.min_lon <= b.max_lon
        && b.min_lon <= a.max_lon
        && a.min_lat <= b.max_lat
        && b.min_lat <= a.max_lat
}

/// Smallest box containing every input box; `None` for no input
pub fn merge_bounding_boxes(boxes: &[BoundingBox]) -> Option<BoundingBox> {
    let mut iter = boxes.iter().map(gps_sanity_check);
    let first = iter.next()?;

    Some(iter.fold(first, |acc, b| {
        BoundingBox::new(
            acc.min_lon.min(b.min_lon),
            acc.min_lat.min(b.min_lat),
            acc.max_lon.max(b.max_lon),
            acc.max_lat.max(b.max_lat),
        )
    }))
}

/// True when a box spans from beyond `-threshold` to beyond `threshold` on either axis.
///
/// Corners may come flipped, so both orientations are checked.
pub fn is_large_bounding_box(bbox: &BoundingBox, threshold: f64) -> bool {
    let t = threshold.abs();
    let spans = |lo: f64, hi: f64| (lo <= -t && hi >= t) || (hi <= -t && lo >= t);

    spans(bbox.min_lon, bbox.max_lon) || spans(bbox.min_lat, bbox.max_lat)
}
