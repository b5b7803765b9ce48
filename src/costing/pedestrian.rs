//! Pedestrian costing
//!
//! Constant walking speed, pedestrian access bits and a cumulative
//! walking-distance cap. In multimodal expansion the cap switches to the
//! (tighter) per-leg multimodal limit and transit connection edges become
//! traversable.

use crate::costing::{Cost, DynamicCost, TravelMode};
use crate::graph::{access, DirectedEdge, GraphId, GraphTile, Use};
use crate::label::EdgeLabel;

pub struct PedestrianCost {
    walking_speed_kmh: f32,
    /// Cap on cumulative walking meters (checked against the label's
    /// path distance).
    max_walking_distance: f32,
    /// Cap applied instead when multimodal expansion opts in.
    multimodal_walking_distance: f32,
    allow_transit_connections: bool,
    mode_weight: f32,
}

impl PedestrianCost {
    pub fn new() -> Self {
        Self {
            walking_speed_kmh: 5.1,
            max_walking_distance: 100_000.0,
            multimodal_walking_distance: 3_000.0,
            allow_transit_connections: false,
            mode_weight: 1.5,
        }
    }

    pub fn with_multimodal_distance(mut self, meters: f32) -> Self {
        self.multimodal_walking_distance = meters;
        self
    }
}

impl Default for PedestrianCost {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicCost for PedestrianCost {
    fn travel_mode(&self) -> TravelMode {
        TravelMode::Pedestrian
    }

    fn access_mode(&self) -> u32 {
        access::PEDESTRIAN
    }

    fn allowed(
        &self,
        edge: &DirectedEdge,
        pred: &EdgeLabel,
        _tile: &GraphTile,
        _edge_id: GraphId,
    ) -> bool {
        if edge.forward_access & access::PEDESTRIAN == 0 || edge.edge_use == Use::TransitLine {
            return false;
        }
        if edge.edge_use == Use::TransitConnection && !self.allow_transit_connections {
            return false;
        }
        pred.path_distance as f32 + edge.length <= self.max_walking_distance
    }

    fn allowed_reverse(
        &self,
        edge: &DirectedEdge,
        pred: &EdgeLabel,
        opp_edge: &DirectedEdge,
        _tile: &GraphTile,
        _edge_id: GraphId,
    ) -> bool {
        if opp_edge.forward_access & access::PEDESTRIAN == 0 || edge.edge_use == Use::TransitLine {
            return false;
        }
        if edge.edge_use == Use::TransitConnection && !self.allow_transit_connections {
            return false;
        }
        pred.path_distance as f32 + edge.length <= self.max_walking_distance
    }

    fn edge_cost(&self, edge: &DirectedEdge) -> Cost {
        let secs = edge.length / (self.walking_speed_kmh / 3.6);
        Cost::new(secs, secs)
    }

    fn mode_weight(&self) -> f32 {
        self.mode_weight
    }

    fn set_allow_transit_connections(&mut self, allow: bool) {
        self.allow_transit_connections = allow;
    }

    fn use_max_multimodal_distance(&mut self) {
        self.max_walking_distance = self.multimodal_walking_distance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::INVALID_LABEL;

    fn walk_edge(length: f32, edge_use: Use) -> DirectedEdge {
        DirectedEdge {
            end_node: GraphId::new(0, 0, 0),
            length,
            speed_kmh: 5.1,
            edge_use,
            forward_access: access::PEDESTRIAN,
            reverse_access: access::PEDESTRIAN,
            shortcut: false,
            trans_up: false,
            trans_down: false,
            forward: true,
            leaves_tile: false,
            edgeinfo_index: 0,
            line_id: 0,
            local_edge_idx: 0,
            opp_index: 0,
        }
    }

    fn empty_tile() -> GraphTile {
        GraphTile {
            header: crate::graph::TileHeader {
                graph_id: GraphId::new(0, 0, 0),
                date_created: 0,
            },
            nodes: vec![],
            directededges: vec![],
            edgeinfo: vec![],
            routes: vec![],
            departures: vec![],
            names: vec![String::new()],
        }
    }

    fn pred_with_distance(meters: u32) -> EdgeLabel {
        let mut label = EdgeLabel::new(
            INVALID_LABEL,
            GraphId::new(0, 0, 0),
            &walk_edge(1.0, Use::Road),
            Cost::default(),
            0.0,
            TravelMode::Pedestrian,
            meters,
        );
        label.path_distance = meters;
        label
    }

    #[test]
    fn test_multimodal_distance_cap() {
        let mut costing = PedestrianCost::new();
        costing.use_max_multimodal_distance();

        let tile = empty_tile();
        let edge = walk_edge(500.0, Use::Road);
        let id = GraphId::new(0, 0, 1);

        assert!(costing.allowed(&edge, &pred_with_distance(2_400), &tile, id));
        assert!(!costing.allowed(&edge, &pred_with_distance(2_600), &tile, id));
    }

    #[test]
    fn test_transit_connections_gated() {
        let mut costing = PedestrianCost::new();
        let tile = empty_tile();
        let conn = walk_edge(50.0, Use::TransitConnection);
        let id = GraphId::new(0, 0, 1);
        let pred = pred_with_distance(0);

        assert!(!costing.allowed(&conn, &pred, &tile, id));
        costing.set_allow_transit_connections(true);
        assert!(costing.allowed(&conn, &pred, &tile, id));
    }
}
