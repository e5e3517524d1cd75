//! Campus geofence evaluation
//!
//! Ray-cast point-in-polygon test used by the self check-in flow. The ray is
//! cast from the point toward increasing longitude and crossings are counted;
//! an odd count means the point is inside. Two boundary rules are layered on
//! top of the parity test:
//!
//! - A point coinciding with a vertex is inside.
//! - A point on a horizontal edge (both endpoints at the point's latitude) is
//!   inside exactly when its longitude falls within the edge's longitude span.
//!
//! Edges with zero latitude delta cannot cross the ray and are skipped once
//! the horizontal rule has been consulted, so the interpolation below never
//! divides by zero. The result depends only on the cyclic order of the ring:
//! rotating the vertex list leaves every answer unchanged.

use pasalista_domain::{GeoPoint, GeofencePolygon};

/// Ray-cast containment test over a closed vertex ring
///
/// The closing edge from the last vertex back to the first is implied, as in
/// [`GeofencePolygon`]. Runs in one pass over the vertices.
pub fn point_in_polygon(point: GeoPoint, polygon: &GeofencePolygon) -> bool {
    let vertices = polygon.vertices();
    let count = vertices.len();
    let mut inside = false;

    for i in 0..count {
        let a = vertices[i];
        let b = vertices[(i + 1) % count];

        // Exact comparison is intentional: boundary rules are defined on the
        // coordinates as given, not on a tolerance band.
        if point == a {
            return true;
        }

        if a.latitude == point.latitude && b.latitude == point.latitude {
            if within_longitude_span(point.longitude, a.longitude, b.longitude) {
                return true;
            }
            // Horizontal edges never cross the ray
            continue;
        }

        let straddles = (a.latitude > point.latitude) != (b.latitude > point.latitude);
        if straddles {
            let t = (point.latitude - a.latitude) / (b.latitude - a.latitude);
            let crossing_longitude = a.longitude + t * (b.longitude - a.longitude);
            if point.longitude < crossing_longitude {
                inside = !inside;
            }
        }
    }

    inside
}

fn within_longitude_span(longitude: f64, edge_a: f64, edge_b: f64) -> bool {
    longitude >= edge_a.min(edge_b) && longitude <= edge_a.max(edge_b)
}

/// Containment checks bound to one campus polygon
///
/// Thin wrapper kept separate from [`point_in_polygon`] so call sites that
/// evaluate many positions against the configured campus fence do not thread
/// the polygon through every call.
#[derive(Debug, Clone)]
pub struct GeofenceEvaluator {
    polygon: GeofencePolygon,
}

impl GeofenceEvaluator {
    pub fn new(polygon: GeofencePolygon) -> Self {
        Self { polygon }
    }

    /// True when the position lies inside the campus fence or on its boundary
    /// per the vertex and horizontal-edge rules
    pub fn is_inside(&self, point: GeoPoint) -> bool {
        point_in_polygon(point, &self.polygon)
    }

    pub fn polygon(&self) -> &GeofencePolygon {
        &self.polygon
    }
}
