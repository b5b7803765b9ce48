//! Costing abstraction
//!
//! One [`DynamicCost`] implementation per travel mode. The expansion loops
//! never look at edge attributes to decide access or price — everything
//! goes through this capability set, so swapping a costing model swaps the
//! meaning of the whole surface.

pub mod auto;
pub mod bicycle;
pub mod pedestrian;
pub mod transit;

pub use auto::AutoCost;
pub use bicycle::BicycleCost;
pub use pedestrian::PedestrianCost;
pub use transit::TransitCost;

use std::ops::{Add, AddAssign, Mul};

use serde::{Deserialize, Serialize};

use crate::graph::{DirectedEdge, GraphId, GraphTile, NodeInfo, TransitDeparture};
use crate::label::EdgeLabel;

/// A path cost: the weighted objective the search minimizes, plus the
/// elapsed seconds it corresponds to. The two drift apart as soon as a
/// costing applies penalties or mode weights.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Cost {
    pub weighted: f32,
    pub secs: f32,
}

impl Cost {
    pub fn new(weighted: f32, secs: f32) -> Self {
        Self { weighted, secs }
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, rhs: Cost) -> Cost {
        Cost::new(self.weighted + rhs.weighted, self.secs + rhs.secs)
    }
}

impl AddAssign for Cost {
    fn add_assign(&mut self, rhs: Cost) {
        self.weighted += rhs.weighted;
        self.secs += rhs.secs;
    }
}

impl Mul<f32> for Cost {
    type Output = Cost;

    fn mul(self, rhs: f32) -> Cost {
        Cost::new(self.weighted * rhs, self.secs * rhs)
    }
}

/// Free-flow traversal seconds of an edge at its posted speed.
pub(crate) fn edge_travel_secs(edge: &DirectedEdge) -> f32 {
    edge.length / (edge.speed_kmh / 3.6)
}

/// Travel modes. The numeric value indexes the per-mode costing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TravelMode {
    Drive = 0,
    Pedestrian = 1,
    Bicycle = 2,
    Transit = 3,
}

impl TravelMode {
    pub const COUNT: usize = 4;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Table of costing models, one per travel mode.
pub type ModeCosting = [Box<dyn DynamicCost>; TravelMode::COUNT];

/// The capability set a costing model provides to the expansion loops.
///
/// Methods with transit-specific semantics have no-op defaults so street
/// costings only implement what applies to them.
pub trait DynamicCost {
    fn travel_mode(&self) -> TravelMode;

    /// Access bits this mode requires on edges and nodes.
    fn access_mode(&self) -> u32;

    /// Bucket quantum for the priority queue, in weighted-cost units.
    fn unit_size(&self) -> f32 {
        1.0
    }

    fn allowed_at_node(&self, node: &NodeInfo) -> bool {
        node.access & self.access_mode() != 0
    }

    /// Whether this edge may be traversed coming from `pred`.
    fn allowed(
        &self,
        edge: &DirectedEdge,
        pred: &EdgeLabel,
        tile: &GraphTile,
        edge_id: GraphId,
    ) -> bool;

    /// Reverse-expansion access check: `edge` is the forward edge under
    /// consideration, `opp_edge` its opposing edge (the one actually
    /// costed).
    fn allowed_reverse(
        &self,
        edge: &DirectedEdge,
        pred: &EdgeLabel,
        opp_edge: &DirectedEdge,
        tile: &GraphTile,
        edge_id: GraphId,
    ) -> bool;

    /// Complex (multi-edge) turn restriction check. `labels` is the label
    /// store for walking the predecessor chain.
    fn restricted(
        &self,
        _edge: &DirectedEdge,
        _pred: &EdgeLabel,
        _labels: &[EdgeLabel],
        _tile: &GraphTile,
        _edge_id: GraphId,
        _forward: bool,
    ) -> bool {
        false
    }

    fn edge_cost(&self, edge: &DirectedEdge) -> Cost;

    /// Transit overload: cost of riding `edge` on `departure` when
    /// boarding at `local_time` (seconds from midnight). Includes the
    /// wait for the departure.
    fn transit_edge_cost(
        &self,
        _edge: &DirectedEdge,
        _departure: &TransitDeparture,
        _local_time: u32,
    ) -> Cost {
        Cost::default()
    }

    fn transition_cost(&self, _edge: &DirectedEdge, _node: &NodeInfo, _pred: &EdgeLabel) -> Cost {
        Cost::default()
    }

    fn transition_cost_reverse(
        &self,
        _local_edge_idx: u32,
        _node: &NodeInfo,
        _opp_edge: &DirectedEdge,
        _opp_pred_edge: &DirectedEdge,
    ) -> Cost {
        Cost::default()
    }

    /// Scalar bias applied to this mode's edge costs in multimodal
    /// expansion (e.g. to prefer transit over long walks).
    fn mode_weight(&self) -> f32 {
        1.0
    }

    /// Baseline transfer cost budgeted at every settle.
    fn default_transfer_cost(&self) -> Cost {
        Cost::default()
    }

    /// Transfer cost when changing stations on foot mid-journey.
    fn transfer_cost(&self) -> Cost {
        Cost::default()
    }

    fn wheelchair(&self) -> bool {
        false
    }

    fn bicycle(&self) -> bool {
        false
    }

    /// Allow traversal of transit connection edges (pedestrian costing,
    /// multimodal expansion only).
    fn set_allow_transit_connections(&mut self, _allow: bool) {}

    /// Switch the walking-distance cap to the multimodal limit.
    fn use_max_multimodal_distance(&mut self) {}

    /// Register a tile's filtered stops/lines in the exclusion list.
    fn add_to_exclude_list(&mut self, _tile: &GraphTile) {}

    fn is_excluded_node(&self, _tile: &GraphTile, _node: GraphId) -> bool {
        false
    }

    fn is_excluded_edge(&self, _tile: &GraphTile, _edge: &DirectedEdge) -> bool {
        false
    }
}

/// Walk the predecessor chain and test whether traversing `edge_id` next
/// would complete one of the banned edge sequences.
///
/// A restriction `[e0, .., en]` matches when `edge_id == en` and the labels
/// behind `pred` spell `e(n-1), .., e0` walking backwards.
pub fn complex_restriction_match(
    restrictions: &[Vec<GraphId>],
    pred: &EdgeLabel,
    labels: &[EdgeLabel],
    edge_id: GraphId,
) -> bool {
    'next: for chain in restrictions {
        let Some((&last, prefix)) = chain.split_last() else {
            continue;
        };
        if last != edge_id {
            continue;
        }
        let mut label = Some(pred);
        for &want in prefix.iter().rev() {
            match label {
                Some(l) if l.edge_id == want => {
                    label = (l.predecessor != crate::label::INVALID_LABEL)
                        .then(|| &labels[l.predecessor as usize]);
                }
                _ => continue 'next,
            }
        }
        return true;
    }
    false
}
