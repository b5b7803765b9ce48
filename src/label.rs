//! Edge labels
//!
//! The settle/relax record of the expansion loops. Labels live in an
//! append-only store and are addressed by stable `u32` indices — that is
//! what lets the bucket queue decrease-key without invalidating entries.

use crate::costing::{Cost, TravelMode};
use crate::graph::{DirectedEdge, GraphId, Use};

/// Sentinel predecessor index marking an origin/destination seed.
pub const INVALID_LABEL: u32 = u32::MAX;

/// One labeled directed edge on the search frontier.
#[derive(Debug, Clone, Copy)]
pub struct EdgeLabel {
    /// Index of the predecessor label, or [`INVALID_LABEL`] on seeds.
    pub predecessor: u32,
    pub edge_id: GraphId,
    /// The opposing directed edge (reverse expansion only).
    pub opp_edge_id: GraphId,
    pub end_node: GraphId,
    pub cost: Cost,
    /// Priority-queue key. Equal to `cost.weighted` here; kept separate
    /// for searches that add a heuristic on top.
    pub sort_cost: f32,
    pub mode: TravelMode,
    pub edge_use: Use,
    /// Walking meters accumulated since the last transit boarding.
    pub path_distance: u32,
    /// Current transit trip; 0 when not on transit.
    pub trip_id: u32,
    /// Vehicle block of the current trip; 0 when none.
    pub block_id: u32,
    /// Last transit stop visited on this path.
    pub prior_stop: GraphId,
    /// Operator of the current trip; 0 = unknown.
    pub transit_operator: u32,
    /// Whether any transit has been taken on this path.
    pub has_transit: bool,
    /// Set only on seed labels.
    pub origin: bool,
}

impl EdgeLabel {
    /// A fresh forward label for `edge`.
    pub fn new(
        predecessor: u32,
        edge_id: GraphId,
        edge: &DirectedEdge,
        cost: Cost,
        sort_cost: f32,
        mode: TravelMode,
        path_distance: u32,
    ) -> Self {
        Self {
            predecessor,
            edge_id,
            opp_edge_id: GraphId::INVALID,
            end_node: edge.end_node,
            cost,
            sort_cost,
            mode,
            edge_use: edge.edge_use,
            path_distance,
            trip_id: 0,
            block_id: 0,
            prior_stop: GraphId::INVALID,
            transit_operator: 0,
            has_transit: false,
            origin: false,
        }
    }

    /// A reverse label: `edge_id` is the opposing edge being traversed,
    /// `opp_edge_id` the forward edge it mirrors. `edge` is the forward
    /// directed edge (classification source).
    pub fn new_reverse(
        predecessor: u32,
        edge_id: GraphId,
        opp_edge_id: GraphId,
        edge: &DirectedEdge,
        cost: Cost,
        sort_cost: f32,
        mode: TravelMode,
    ) -> Self {
        Self {
            predecessor,
            edge_id,
            opp_edge_id,
            end_node: edge.end_node,
            cost,
            sort_cost,
            mode,
            edge_use: edge.edge_use,
            path_distance: 0,
            trip_id: 0,
            block_id: 0,
            prior_stop: GraphId::INVALID,
            transit_operator: 0,
            has_transit: false,
            origin: false,
        }
    }

    /// A multimodal label carrying the transit state machine fields.
    #[allow(clippy::too_many_arguments)]
    pub fn new_multimodal(
        predecessor: u32,
        edge_id: GraphId,
        edge: &DirectedEdge,
        cost: Cost,
        sort_cost: f32,
        mode: TravelMode,
        path_distance: u32,
        trip_id: u32,
        prior_stop: GraphId,
        block_id: u32,
        transit_operator: u32,
        has_transit: bool,
    ) -> Self {
        Self {
            predecessor,
            edge_id,
            opp_edge_id: GraphId::INVALID,
            end_node: edge.end_node,
            cost,
            sort_cost,
            mode,
            edge_use: edge.edge_use,
            path_distance,
            trip_id,
            block_id,
            prior_stop,
            transit_operator,
            has_transit,
            origin: false,
        }
    }

    /// A carry-forward label for a level-transition edge: cost, sort cost
    /// and all path state (opposing edge included) are copied from the
    /// predecessor; only the edge identity and end node change.
    pub fn from_transition(
        predecessor: u32,
        edge_id: GraphId,
        end_node: GraphId,
        pred: &EdgeLabel,
    ) -> Self {
        Self {
            predecessor,
            edge_id,
            end_node,
            origin: false,
            ..*pred
        }
    }

    /// Relax in place: a shorter path through `predecessor` was found.
    pub fn update(&mut self, predecessor: u32, cost: Cost, sort_cost: f32) {
        self.predecessor = predecessor;
        self.cost = cost;
        self.sort_cost = sort_cost;
    }

    /// Multimodal relax: also adopt the shorter path's transit state.
    pub fn update_multimodal(
        &mut self,
        predecessor: u32,
        cost: Cost,
        sort_cost: f32,
        path_distance: u32,
        trip_id: u32,
        block_id: u32,
    ) {
        self.update(predecessor, cost, sort_cost);
        self.path_distance = path_distance;
        self.trip_id = trip_id;
        self.block_id = block_id;
    }
}
