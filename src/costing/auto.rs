//! Automobile costing
//!
//! Free-flow travel time at the edge's posted speed, auto access bits and
//! complex turn restrictions.

use crate::costing::{complex_restriction_match, edge_travel_secs, Cost, DynamicCost, TravelMode};
use crate::graph::{access, DirectedEdge, GraphId, GraphTile, Use};
use crate::label::EdgeLabel;

pub struct AutoCost {
    /// Banned edge sequences (complex turn restrictions). The last edge
    /// of a chain is the one being denied.
    restrictions: Vec<Vec<GraphId>>,
}

impl AutoCost {
    pub fn new() -> Self {
        Self {
            restrictions: Vec::new(),
        }
    }

    pub fn with_restrictions(restrictions: Vec<Vec<GraphId>>) -> Self {
        Self { restrictions }
    }
}

impl Default for AutoCost {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicCost for AutoCost {
    fn travel_mode(&self) -> TravelMode {
        TravelMode::Drive
    }

    fn access_mode(&self) -> u32 {
        access::AUTO
    }

    fn allowed(
        &self,
        edge: &DirectedEdge,
        _pred: &EdgeLabel,
        _tile: &GraphTile,
        _edge_id: GraphId,
    ) -> bool {
        edge.edge_use == Use::Road && edge.forward_access & access::AUTO != 0
    }

    fn allowed_reverse(
        &self,
        edge: &DirectedEdge,
        _pred: &EdgeLabel,
        opp_edge: &DirectedEdge,
        _tile: &GraphTile,
        _edge_id: GraphId,
    ) -> bool {
        // The opposing edge is the one actually driven in reverse search
        edge.edge_use == Use::Road && opp_edge.forward_access & access::AUTO != 0
    }

    fn restricted(
        &self,
        _edge: &DirectedEdge,
        pred: &EdgeLabel,
        labels: &[EdgeLabel],
        _tile: &GraphTile,
        edge_id: GraphId,
        _forward: bool,
    ) -> bool {
        complex_restriction_match(&self.restrictions, pred, labels, edge_id)
    }

    fn edge_cost(&self, edge: &DirectedEdge) -> Cost {
        let secs = edge_travel_secs(edge);
        Cost::new(secs, secs)
    }
}
