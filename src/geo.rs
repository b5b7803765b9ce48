//! Geographic primitives
//!
//! Lat/lng points, axis-aligned bounding boxes, distance approximation and
//! spherical polyline resampling. Distances come from the `geo` crate;
//! the degree-based approximators are what the grid code actually uses
//! (cell sizes are expressed in degrees of latitude).

use geo::HaversineDistance;
use geo::Point;
use serde::{Deserialize, Serialize};

/// Meters per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE_LAT: f32 = 110_567.0;

/// A WGS84 coordinate. Latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f32,
    pub lng: f32,
}

impl LatLng {
    pub fn new(lat: f32, lng: f32) -> Self {
        Self { lat, lng }
    }

    /// Haversine distance to another point, in meters.
    pub fn distance_to(&self, other: &LatLng) -> f32 {
        haversine_distance(
            self.lat as f64,
            self.lng as f64,
            other.lat as f64,
            other.lng as f64,
        ) as f32
    }
}

pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let p1 = Point::new(lon1, lat1);
    let p2 = Point::new(lon2, lat2);
    p1.haversine_distance(&p2)
}

/// Meters per degree of longitude at the given latitude.
pub fn meters_per_lng_degree(lat: f32) -> f32 {
    METERS_PER_DEGREE_LAT * lat.to_radians().cos()
}

/// Axis-aligned bounding box in degrees (x = lng, y = lat).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Aabb {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// An "empty" box that any expand() call will collapse onto.
    pub fn empty() -> Self {
        Self {
            min_x: f32::MAX,
            min_y: f32::MAX,
            max_x: f32::MIN,
            max_y: f32::MIN,
        }
    }

    /// Grow this box to cover `other`.
    pub fn expand(&mut self, other: &Aabb) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn contains(&self, ll: LatLng) -> bool {
        ll.lng >= self.min_x && ll.lng < self.max_x && ll.lat >= self.min_y && ll.lat < self.max_y
    }
}

/// Resample a polyline to (approximately) evenly spaced points.
///
/// Walks the input shape and emits a point every `interval` meters,
/// interpolating linearly within segments. The first and last input points
/// are always kept, so the output spacing can be short at the tail end.
/// Shapes shorter than one interval come back as just their endpoints.
pub fn resample_polyline(shape: &[LatLng], interval: f32) -> Vec<LatLng> {
    if shape.len() < 2 || interval <= 0.0 {
        return shape.to_vec();
    }

    let mut resampled = Vec::with_capacity(shape.len() * 2);
    resampled.push(shape[0]);

    // Distance still to cover before the next emitted point
    let mut remaining = interval;
    for pair in shape.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let seg_len = a.distance_to(&b);
        if seg_len <= 0.0 {
            continue;
        }
        let mut along = 0.0f32;
        while along + remaining < seg_len {
            along += remaining;
            let t = along / seg_len;
            resampled.push(LatLng::new(
                a.lat + (b.lat - a.lat) * t,
                a.lng + (b.lng - a.lng) * t,
            ));
            remaining = interval;
        }
        remaining -= seg_len - along;
    }

    let last = *shape.last().unwrap();
    if resampled.last() != Some(&last) {
        resampled.push(last);
    }
    resampled
}
