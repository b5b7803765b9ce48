//! Forward expansion

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
    /// Expand forward from `origins` until the queue drains or a settled
    /// label crosses the horizon. One settlement past the horizon is
    /// rasterized so the surface reaches the boundary.
    pub fn compute<R: GraphReader>(
        &mut self,
        reader: &R,
        origins: &mut [Location],
        max_minutes: u32,
        mode_costing: &ModeCosting,
        mode: TravelMode,
    ) -> Arc<IsoGrid> {
        self.mode = mode;
        let costing = &mode_costing[mode.index()];
        let max_seconds = (max_minutes * 60) as f32;

        self.initialize(costing.unit_size());
        self.construct_grid(false, max_minutes, origins);
        self.set_origin_locations(reader, origins, &**costing);

        let mut n = 0u32;
        loop {
            // Queue exhausted: every reachable edge is settled
            let Some(pred_idx) = self.pop_next() else {
                return self.take_grid();
            };

            // Settle
            let pred = self.labels[pred_idx as usize];
            self.edge_status.update(pred.edge_id, EdgeSet::Permanent);

            // Missing end-node tile happens with regional extracts; the
            // frontier just stops there
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

            // Expand from the end node
            for i in 0..node.edge_count {
                let edge_index = node.edge_index + i;
                let edge_id = pred.end_node.with_index(edge_index);
                let Some(edge) = tile.directededge(edge_index) else {
                    break;
                };

                // Shortcuts compress chains we rasterize individually
                if edge.shortcut {
                    continue;
                }
                let status = self.edge_status.get(edge_id);
                if status.set == EdgeSet::Permanent {
                    continue;
                }

                // Level transitions are free: carry the predecessor's
                // cost and state forward
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

                if !costing.allowed(edge, &pred, tile, edge_id)
                    || costing.restricted(edge, &pred, &self.labels, tile, edge_id, true)
                {
                    continue;
                }

                let newcost = pred.cost
                    + costing.edge_cost(edge)
                    + costing.transition_cost(edge, node, &pred);

                if status.set == EdgeSet::Temporary {
                    self.check_if_lower_cost_path(status.index, pred_idx, newcost);
                    continue;
                }

                let idx = self.labels.len() as u32;
                self.queue.push(idx, newcost.weighted);
                self.edge_status.set(edge_id, EdgeSet::Temporary, idx);
                self.labels.push(EdgeLabel::new(
                    pred_idx,
                    edge_id,
                    edge,
                    newcost,
                    newcost.weighted,
                    self.mode,
                    0,
                ));
            }
        }
    }
}
