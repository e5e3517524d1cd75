//! Geographic primitives for the campus geofence

use serde::{Deserialize, Serialize};

use crate::errors::{PasaListaError, Result};

/// WGS84 coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Simple closed polygon over WGS84 coordinates
///
/// The vertex list is the ring; the closing edge from the last vertex back to
/// the first is implied. At least three vertices are required, which the
/// constructor enforces so downstream evaluation never sees a degenerate ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GeoPoint>", into = "Vec<GeoPoint>")]
pub struct GeofencePolygon {
    vertices: Vec<GeoPoint>,
}

impl GeofencePolygon {
    /// Build a polygon from an ordered vertex ring
    ///
    /// # Errors
    /// Returns `PasaListaError::InvalidInput` when fewer than three vertices
    /// are supplied.
    pub fn new(vertices: Vec<GeoPoint>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(PasaListaError::InvalidInput(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[GeoPoint] {
        &self.vertices
    }
}

impl TryFrom<Vec<GeoPoint>> for GeofencePolygon {
    type Error = PasaListaError;

    fn try_from(vertices: Vec<GeoPoint>) -> Result<Self> {
        Self::new(vertices)
    }
}

impl From<GeofencePolygon> for Vec<GeoPoint> {
    fn from(polygon: GeofencePolygon) -> Self {
        polygon.vertices
    }
}
