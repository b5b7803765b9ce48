//! Reverse expansion
//!
//! Mirror of the forward loop, seeded on the opposing edges of each
//! destination. Expansion still walks candidate edges away from the
//! settled node, but access is gated on their reverse-access bits and the
//! price comes from the opposing direction, so the surface answers "how
//! long to get *to* the destination" on asymmetric networks.

use std::sync::Arc;

use log::debug;

use super::Isochrone;
use crate::costing::{ModeCosting, TravelMode};
use crate::edgestatus::EdgeSet;
use crate::graph::GraphReader;
use crate::isogrid::IsoGrid;
use crate::label::EdgeLabel;
use crate::location::Location;

impl Isochrone {
    pub fn compute_reverse<R: GraphReader>(
        &mut self,
        reader: &R,
        destinations: &mut [Location],
        max_minutes: u32,
        mode_costing: &ModeCosting,
        mode: TravelMode,
    ) -> Arc<IsoGrid> {
        self.mode = mode;
        let costing = &mode_costing[mode.index()];
        self.access_mode = costing.access_mode();
        let max_seconds = (max_minutes * 60) as f32;

        self.initialize(costing.unit_size());
        self.construct_grid(false, max_minutes, destinations);
        self.set_destination_locations(reader, destinations, &**costing);

        let mut n = 0u32;
        loop {
            let Some(pred_idx) = self.pop_next() else {
                return self.take_grid();
            };

            let pred = self.labels[pred_idx as usize];
            self.edge_status.update(pred.edge_id, EdgeSet::Permanent);

            let Some(tile) = reader.tile(pred.end_node.tile_base()) else {
                continue;
            };
            let Some(node) = tile.node(pred.end_node) else {
                continue;
            };

            self.update_grid(&pred, reader);
            n += 1;

            if pred.cost.secs > max_seconds {
                debug!("time horizon exceeded after {n} settled labels");
                return self.take_grid();
            }

            if !costing.allowed_at_node(node) {
                continue;
            }

            // The reverse transition-cost callback wants the opposing of
            // the predecessor edge, which may live in another tile
            let opp_pred_edge = if pred.opp_edge_id.tile_base() == tile.id().tile_base() {
                tile.directededge(pred.opp_edge_id.index())
            } else {
                reader
                    .tile(pred.opp_edge_id.tile_base())
                    .and_then(|t| t.directededge(pred.opp_edge_id.index()))
            };
            let Some(opp_pred_edge) = opp_pred_edge else {
                continue;
            };

            for i in 0..node.edge_count {
                let edge_index = node.edge_index + i;
                let edge_id = pred.end_node.with_index(edge_index);
                let Some(edge) = tile.directededge(edge_index) else {
                    break;
                };

                // Early rejection on the reverse-access bit saves the
                // opposing-edge lookup
                if edge.reverse_access & self.access_mode == 0 || edge.shortcut {
                    continue;
                }
                let status = self.edge_status.get(edge_id);
                if status.set == EdgeSet::Permanent {
                    continue;
                }

                if edge.is_transition() {
                    let idx = self.labels.len() as u32;
                    self.queue.push(idx, pred.sort_cost);
                    self.edge_status.set(edge_id, EdgeSet::Temporary, idx);
                    self.labels.push(EdgeLabel::from_transition(
                        pred_idx,
                        edge_id,
                        edge.end_node,
                        &pred,
                    ));
                    continue;
                }

                // Resolve the opposing edge, cross-tile if needed
                let end_tile = if edge.leaves_tile {
                    match reader.tile(edge.end_node.tile_base()) {
                        Some(t) => t,
                        None => continue,
                    }
                } else {
                    tile
                };
                let Some(end_node_info) = end_tile.node(edge.end_node) else {
                    continue;
                };
                let opp_edge_id = edge
                    .end_node
                    .with_index(end_node_info.edge_index + edge.opp_index);
                let Some(opp_edge) = end_tile.directededge(opp_edge_id.index()) else {
                    continue;
                };

                if !costing.allowed_reverse(edge, &pred, opp_edge, tile, edge_id) {
                    continue;
                }
                if costing.restricted(edge, &pred, &self.labels, tile, edge_id, false) {
                    continue;
                }

                // Edge cost on the opposing direction; the transition
                // penalty applies to the weighted objective only
                let tc = costing.transition_cost_reverse(
                    edge.local_edge_idx,
                    node,
                    opp_edge,
                    opp_pred_edge,
                );
                let mut newcost = pred.cost + costing.edge_cost(opp_edge);
                newcost.weighted += tc.weighted;

                if status.set == EdgeSet::Temporary {
                    self.check_if_lower_cost_path(status.index, pred_idx, newcost);
                    continue;
                }

                let idx = self.labels.len() as u32;
                self.queue.push(idx, newcost.weighted);
                self.edge_status.set(edge_id, EdgeSet::Temporary, idx);
                self.labels.push(EdgeLabel::new_reverse(
                    pred_idx,
                    edge_id,
                    opp_edge_id,
                    edge,
                    newcost,
                    newcost.weighted,
                    self.mode,
                ));
            }
        }
    }
}
