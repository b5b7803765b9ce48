//! Bicycle costing

use crate::costing::{Cost, DynamicCost, TravelMode};
use crate::graph::{access, DirectedEdge, GraphId, GraphTile, Use};
use crate::label::EdgeLabel;

pub struct BicycleCost {
    /// Riding speed; edges faster than this are ridden at this speed.
    speed_kmh: f32,
}

impl BicycleCost {
    pub fn new() -> Self {
        Self { speed_kmh: 25.0 }
    }

    pub fn with_speed(speed_kmh: f32) -> Self {
        Self { speed_kmh }
    }
}

impl Default for BicycleCost {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicCost for BicycleCost {
    fn travel_mode(&self) -> TravelMode {
        TravelMode::Bicycle
    }

    fn access_mode(&self) -> u32 {
        access::BICYCLE
    }

    fn allowed(
        &self,
        edge: &DirectedEdge,
        _pred: &EdgeLabel,
        _tile: &GraphTile,
        _edge_id: GraphId,
    ) -> bool {
        edge.edge_use == Use::Road && edge.forward_access & access::BICYCLE != 0
    }

    fn allowed_reverse(
        &self,
        edge: &DirectedEdge,
        _pred: &EdgeLabel,
        opp_edge: &DirectedEdge,
        _tile: &GraphTile,
        _edge_id: GraphId,
    ) -> bool {
        edge.edge_use == Use::Road && opp_edge.forward_access & access::BICYCLE != 0
    }

    fn edge_cost(&self, edge: &DirectedEdge) -> Cost {
        let speed = edge.speed_kmh.min(self.speed_kmh);
        let secs = edge.length / (speed / 3.6);
        Cost::new(secs, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_capped_at_riding_speed() {
        let costing = BicycleCost::new();
        let edge = DirectedEdge {
            end_node: GraphId::new(0, 0, 0),
            length: 1000.0,
            speed_kmh: 100.0,
            edge_use: Use::Road,
            forward_access: access::BICYCLE,
            reverse_access: 0,
            shortcut: false,
            trans_up: false,
            trans_down: false,
            forward: true,
            leaves_tile: false,
            edgeinfo_index: 0,
            line_id: 0,
            local_edge_idx: 0,
            opp_index: 0,
        };
        // 1 km at 25 km/h = 144 s, not 36 s
        assert!((costing.edge_cost(&edge).secs - 144.0).abs() < 0.1);
    }
}
