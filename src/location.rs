//! Snapped input locations
//!
//! Origins and destinations arrive already matched to the graph: a raw
//! lat/lng plus the candidate directed edges near it, each with the
//! fraction along the edge where the point projects. Snapping itself is an
//! external concern.

use crate::geo::LatLng;
use crate::graph::GraphId;

/// A candidate edge attached to a location.
#[derive(Debug, Clone)]
pub struct LocationEdge {
    pub id: GraphId,
    /// Fraction along the directed edge where the location projects,
    /// 0 = begin node, 1 = end node.
    pub dist: f32,
}

impl LocationEdge {
    /// The location sits exactly at the edge's begin node.
    pub fn begin_node(&self) -> bool {
        self.dist == 0.0
    }

    /// The location sits exactly at the edge's end node.
    pub fn end_node(&self) -> bool {
        self.dist == 1.0
    }
}

/// An origin or destination.
#[derive(Debug, Clone)]
pub struct Location {
    pub latlng: LatLng,
    /// Local date-time string (`YYYY-MM-DDTHH:MM[:SS]`), or the literal
    /// `"current"` to be resolved against the snapped node's time zone.
    /// Required for multimodal expansion.
    pub date_time: Option<String>,
    pub edges: Vec<LocationEdge>,
}

impl Location {
    pub fn new(latlng: LatLng) -> Self {
        Self {
            latlng,
            date_time: None,
            edges: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_endpoint_predicates() {
        let at_begin = LocationEdge {
            id: GraphId::new(0, 0, 0),
            dist: 0.0,
        };
        let at_end = LocationEdge {
            id: GraphId::new(0, 0, 1),
            dist: 1.0,
        };
        let mid = LocationEdge {
            id: GraphId::new(0, 0, 2),
            dist: 0.4,
        };
        assert!(at_begin.begin_node() && !at_begin.end_node());
        assert!(at_end.end_node() && !at_end.begin_node());
        assert!(!mid.begin_node() && !mid.end_node());
    }
}
