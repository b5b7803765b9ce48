//! Public transit costing
//!
//! Prices transit line edges from scheduled departures (wait plus
//! in-vehicle time), owns the transfer cost pair, and maintains the
//! per-run exclusion list of filtered operators.

use rustc_hash::FxHashSet;

use crate::costing::{Cost, DynamicCost, TravelMode};
use crate::graph::{access, DirectedEdge, GraphId, GraphTile, TransitDeparture};
use crate::label::EdgeLabel;

pub struct TransitCost {
    /// Cost of an on-foot transfer between stations.
    transfer_cost: Cost,
    /// Baseline transfer cost budgeted at every boarding.
    default_transfer_cost: Cost,
    wheelchair: bool,
    bicycle: bool,
    /// Operator names whose service is excluded from the search.
    filtered_operators: FxHashSet<String>,
    /// Lines found to belong to filtered operators, keyed by owning tile.
    excluded_lines: FxHashSet<(GraphId, u32)>,
    /// Stops excluded outright.
    excluded_stops: FxHashSet<GraphId>,
}

impl TransitCost {
    pub fn new() -> Self {
        Self {
            transfer_cost: Cost::new(15.0, 15.0),
            default_transfer_cost: Cost::default(),
            wheelchair: false,
            bicycle: false,
            filtered_operators: FxHashSet::default(),
            excluded_lines: FxHashSet::default(),
            excluded_stops: FxHashSet::default(),
        }
    }

    pub fn with_transfer_costs(mut self, transfer: Cost, default_transfer: Cost) -> Self {
        self.transfer_cost = transfer;
        self.default_transfer_cost = default_transfer;
        self
    }

    pub fn with_accessibility(mut self, wheelchair: bool, bicycle: bool) -> Self {
        self.wheelchair = wheelchair;
        self.bicycle = bicycle;
        self
    }

    /// Exclude all lines operated under `name`.
    pub fn filter_operator(&mut self, name: impl Into<String>) {
        self.filtered_operators.insert(name.into());
    }

    pub fn exclude_stop(&mut self, stop: GraphId) {
        self.excluded_stops.insert(stop);
    }
}

impl Default for TransitCost {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicCost for TransitCost {
    fn travel_mode(&self) -> TravelMode {
        TravelMode::Transit
    }

    fn access_mode(&self) -> u32 {
        access::TRANSIT
    }

    fn allowed(
        &self,
        edge: &DirectedEdge,
        _pred: &EdgeLabel,
        _tile: &GraphTile,
        _edge_id: GraphId,
    ) -> bool {
        // Reaching a transit line edge implies having walked to the stop;
        // the schedule lookup is the real gate.
        edge.line_id != 0
    }

    fn allowed_reverse(
        &self,
        edge: &DirectedEdge,
        _pred: &EdgeLabel,
        _opp_edge: &DirectedEdge,
        _tile: &GraphTile,
        _edge_id: GraphId,
    ) -> bool {
        edge.line_id != 0
    }

    fn edge_cost(&self, edge: &DirectedEdge) -> Cost {
        // Without a departure there is no meaningful price; callers use
        // the departure overload.
        let secs = edge.length / (edge.speed_kmh / 3.6);
        Cost::new(secs, secs)
    }

    fn transit_edge_cost(
        &self,
        _edge: &DirectedEdge,
        departure: &TransitDeparture,
        local_time: u32,
    ) -> Cost {
        let wait = departure.departure_time.saturating_sub(local_time);
        let secs = (wait + departure.elapsed_time) as f32;
        Cost::new(secs, secs)
    }

    fn default_transfer_cost(&self) -> Cost {
        self.default_transfer_cost
    }

    fn transfer_cost(&self) -> Cost {
        self.transfer_cost
    }

    fn wheelchair(&self) -> bool {
        self.wheelchair
    }

    fn bicycle(&self) -> bool {
        self.bicycle
    }

    fn add_to_exclude_list(&mut self, tile: &GraphTile) {
        if self.filtered_operators.is_empty() {
            return;
        }
        for dep in &tile.departures {
            let Some(route) = tile.route(dep.route_index) else {
                continue;
            };
            let name = tile.name(route.operator_name_index);
            if !name.is_empty() && self.filtered_operators.contains(name) {
                self.excluded_lines.insert((tile.id().tile_base(), dep.line_id));
            }
        }
    }

    fn is_excluded_node(&self, _tile: &GraphTile, node: GraphId) -> bool {
        self.excluded_stops.contains(&node)
    }

    fn is_excluded_edge(&self, tile: &GraphTile, edge: &DirectedEdge) -> bool {
        self.excluded_lines
            .contains(&(tile.id().tile_base(), edge.line_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{TileHeader, TransitRoute, Use};

    fn line_edge(line_id: u32) -> DirectedEdge {
        DirectedEdge {
            end_node: GraphId::new(0, 0, 0),
            length: 2000.0,
            speed_kmh: 40.0,
            edge_use: Use::TransitLine,
            forward_access: access::TRANSIT,
            reverse_access: 0,
            shortcut: false,
            trans_up: false,
            trans_down: false,
            forward: true,
            leaves_tile: false,
            edgeinfo_index: 0,
            line_id,
            local_edge_idx: 0,
            opp_index: 0,
        }
    }

    fn departure(line_id: u32, time: u32, route_index: u32) -> TransitDeparture {
        TransitDeparture {
            line_id,
            trip_id: 1,
            block_id: 0,
            route_index,
            departure_time: time,
            elapsed_time: 600,
            schedule_days: u64::MAX,
            dow_mask: 0x7f,
            wheelchair_accessible: true,
            bicycle_accessible: true,
        }
    }

    #[test]
    fn test_transit_edge_cost_includes_wait() {
        let costing = TransitCost::new();
        let dep = departure(3, 30_000, 0);
        // Board at 29_700: 300 s wait + 600 s riding
        let cost = costing.transit_edge_cost(&line_edge(3), &dep, 29_700);
        assert_eq!(cost.secs, 900.0);
        // Board after the scheduled time: no negative wait
        let cost = costing.transit_edge_cost(&line_edge(3), &dep, 30_100);
        assert_eq!(cost.secs, 600.0);
    }

    #[test]
    fn test_operator_filter_builds_exclusion() {
        let tile = GraphTile {
            header: TileHeader {
                graph_id: GraphId::new(0, 5, 0),
                date_created: 0,
            },
            nodes: vec![],
            directededges: vec![],
            edgeinfo: vec![],
            routes: vec![
                TransitRoute {
                    operator_name_index: 1,
                },
                TransitRoute {
                    operator_name_index: 2,
                },
            ],
            departures: vec![departure(3, 30_000, 0), departure(4, 31_000, 1)],
            names: vec![String::new(), "metro-east".into(), "metro-west".into()],
        };

        let mut costing = TransitCost::new();
        costing.filter_operator("metro-east");
        costing.add_to_exclude_list(&tile);

        assert!(costing.is_excluded_edge(&tile, &line_edge(3)));
        assert!(!costing.is_excluded_edge(&tile, &line_edge(4)));
    }
}
