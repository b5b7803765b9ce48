//! Multimodal expansion
//!
//! Forward expansion with a transit state machine layered on top:
//! pedestrian travel between stops, scheduled departures on transit line
//! edges, transfer and operator-change penalties, and a walking-distance
//! cap between boardings. Unlike the single-mode loops, crossing the
//! horizon on one branch only prunes that branch — a slow bus line beyond
//! the horizon must not cut off a faster line still inside it.
//!
//! Local time is the origin's seconds-from-midnight plus elapsed seconds;
//! it deliberately ignores time-zone changes along the path (open
//! question inherited from the schedule model).

use std::sync::Arc;

use log::{debug, error};
use rustc_hash::{FxHashMap, FxHashSet};

use super::Isochrone;
use crate::costing::{ModeCosting, TravelMode};
use crate::datetime;
use crate::edgestatus::EdgeSet;
use crate::graph::{GraphReader, GraphTile, NodeType, Use};
use crate::isogrid::IsoGrid;
use crate::label::EdgeLabel;
use crate::location::Location;

/// Small-integer id for a transit operator name, assigned per run on
/// first sight. 0 means unknown.
fn operator_id_for(
    tile: &GraphTile,
    route_index: u32,
    operators: &mut FxHashMap<String, u32>,
) -> u32 {
    let Some(route) = tile.route(route_index) else {
        return 0;
    };
    if route.operator_name_index == 0 {
        return 0;
    }
    let name = tile.name(route.operator_name_index);
    if name.is_empty() {
        return 0;
    }
    if let Some(&id) = operators.get(name) {
        return id;
    }
    let id = operators.len() as u32 + 1;
    operators.insert(name.to_string(), id);
    id
}

impl Isochrone {
    /// Multimodal expansion from `origins`, which must carry a departure
    /// date-time. Without one the grid is returned in its seed state.
    pub fn compute_multimodal<R: GraphReader>(
        &mut self,
        reader: &R,
        origins: &mut [Location],
        max_minutes: u32,
        mode_costing: &mut ModeCosting,
        mode: TravelMode,
    ) -> Arc<IsoGrid> {
        // Pedestrian legs may use transit connections, and walk under the
        // tighter multimodal distance cap
        let pc = &mut mode_costing[TravelMode::Pedestrian.index()];
        pc.set_allow_transit_connections(true);
        pc.use_max_multimodal_distance();

        self.mode = mode;
        let max_seconds = (max_minutes * 60) as f32;
        let wheelchair = mode_costing[TravelMode::Transit.index()].wheelchair();
        let bicycle = mode_costing[TravelMode::Transit.index()].bicycle();
        let max_transfer_distance = self.config.max_transfer_distance;

        self.initialize(mode_costing[mode.index()].unit_size());
        self.construct_grid(true, max_minutes, origins);
        self.set_origin_locations(reader, origins, &*mode_costing[mode.index()]);

        // Departure schedules are keyed to the origin's clock
        let Some(date_time) = origins.first().and_then(|o| o.date_time.clone()) else {
            error!("no date-time set on the origin location");
            return self.take_grid();
        };
        let (start_time, date, dow) = match (
            datetime::seconds_from_midnight(&date_time),
            datetime::days_from_pivot_date(&date_time),
            datetime::day_of_week_mask(&date_time),
        ) {
            (Ok(t), Ok(d), Ok(w)) => (t, d, w),
            _ => {
                error!("unparseable origin date-time {date_time:?}");
                return self.take_grid();
            }
        };

        // The service-day index is anchored at the schedule date of the
        // first transit tile reached, so it is resolved lazily
        let mut date_set = false;
        let mut date_before_tile = false;
        let mut day = 0u32;

        let mut operators: FxHashMap<String, u32> = FxHashMap::default();
        let mut processed_tiles: FxHashSet<u32> = FxHashSet::default();
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

            if !mode_costing[mode.index()].allowed_at_node(node) {
                continue;
            }

            let mut local_time = start_time + pred.cost.secs as u32;
            let mut transfer_cost = mode_costing[TravelMode::Transit.index()].default_transfer_cost();
            let mode_at_node = pred.mode;
            let mut prior_stop = pred.prior_stop;

            if node.node_type == NodeType::TransitStop {
                // Walking into a station mid-journey is a transfer
                if mode_at_node == TravelMode::Pedestrian
                    && prior_stop.is_valid()
                    && pred.has_transit
                {
                    transfer_cost = mode_costing[TravelMode::Transit.index()].transfer_cost();
                }

                if processed_tiles.insert(tile.id().tile()) {
                    mode_costing[TravelMode::Transit.index()].add_to_exclude_list(tile);
                }
                if mode_costing[TravelMode::Transit.index()].is_excluded_node(tile, pred.end_node) {
                    continue;
                }

                // Entering the stop on foot eats the transfer time before
                // any departure can be caught
                if mode_at_node == TravelMode::Pedestrian {
                    local_time += transfer_cost.secs as u32;
                }

                prior_stop = pred.end_node;

                // The schedule anchor comes from the transit tile, not
                // the origin tile
                if !date_set {
                    let date_created = tile.header.date_created;
                    if date < date_created {
                        date_before_tile = true;
                    } else {
                        day = date - date_created;
                    }
                    date_set = true;
                }
            }

            for i in 0..node.edge_count {
                let edge_index = node.edge_index + i;
                let edge_id = pred.end_node.with_index(edge_index);
                let Some(edge) = tile.directededge(edge_index) else {
                    break;
                };

                if edge.shortcut {
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

                let mut edge_mode = mode_at_node;
                let mut mode_change = false;
                let mut newcost = pred.cost;
                let mut walking_distance = pred.path_distance;
                let mut trip_id = 0u32;
                let mut block_id = 0u32;
                let mut operator_id = pred.transit_operator;
                let mut has_transit = pred.has_transit;

                if edge.is_transit_line() {
                    let tc = &mode_costing[TravelMode::Transit.index()];
                    if !tc.allowed(edge, &pred, tile, edge_id) {
                        continue;
                    }
                    if tc.is_excluded_edge(tile, edge) {
                        continue;
                    }

                    let Some(mut departure) = tile.next_departure(
                        edge.line_id,
                        local_time,
                        day,
                        dow,
                        date_before_tile,
                        wheelchair,
                        bicycle,
                    ) else {
                        // This line is done for the day; others may not be
                        continue;
                    };

                    mode_change = edge_mode == TravelMode::Pedestrian;
                    trip_id = departure.trip_id;
                    block_id = departure.block_id;
                    has_transit = true;

                    if trip_id == pred.trip_id
                        || (block_id != 0 && block_id == pred.block_id)
                    {
                        // Staying on the vehicle is free; same operator
                        operator_id = pred.transit_operator;
                    } else {
                        if pred.trip_id > 0 {
                            // In-station change: if the connection is too
                            // tight, look for the next departure after
                            // the transfer slack
                            let retry = self.config.in_station_retry_secs;
                            if local_time + retry > departure.departure_time {
                                match tile.next_departure(
                                    edge.line_id,
                                    local_time + retry,
                                    day,
                                    dow,
                                    date_before_tile,
                                    wheelchair,
                                    bicycle,
                                ) {
                                    Some(d) => {
                                        departure = d;
                                        trip_id = departure.trip_id;
                                        block_id = departure.block_id;
                                    }
                                    None => continue,
                                }
                            }
                        }

                        operator_id = operator_id_for(tile, departure.route_index, &mut operators);

                        newcost.weighted += transfer_cost.weighted;
                        if pred.transit_operator > 0 && pred.transit_operator != operator_id {
                            newcost.weighted += self.config.operator_change_penalty;
                        }
                    }

                    edge_mode = TravelMode::Transit;
                    newcost += mode_costing[TravelMode::Transit.index()].transit_edge_cost(
                        edge,
                        departure,
                        local_time,
                    );
                } else {
                    // Leaving a transit line means getting off the
                    // vehicle; the walking budget starts over
                    if edge_mode == TravelMode::Transit {
                        edge_mode = TravelMode::Pedestrian;
                        walking_distance = 0;
                        mode_change = true;
                    }

                    // The current mode's costing gates access; for
                    // pedestrians this enforces the walking cap
                    if !mode_costing[edge_mode.index()].allowed(edge, &pred, tile, edge_id) {
                        continue;
                    }

                    let mut c = mode_costing[edge_mode.index()].edge_cost(edge);
                    c.weighted *= mode_costing[edge_mode.index()].mode_weight();
                    newcost += c;

                    if edge_mode == TravelMode::Pedestrian {
                        walking_distance += edge.length as u32;

                        // Walking into a station and straight out again
                        // is not a path anyone wants
                        if node.node_type == NodeType::TransitStop
                            && pred.edge_use == Use::TransitConnection
                            && edge.edge_use == Use::TransitConnection
                        {
                            continue;
                        }
                    }
                }

                if mode_change {
                    // Boarding waits are priced by the departure; the
                    // residual mode-change cost is a knob, zero by default
                    newcost += self.config.mode_change_cost;
                } else {
                    newcost +=
                        mode_costing[edge_mode.index()].transition_cost(edge, node, &pred);
                }

                // Re-entering the station just left
                if edge.edge_use == Use::TransitConnection && edge.end_node == pred.prior_stop {
                    continue;
                }
                // Transferring farther on foot than the cap allows
                if edge.edge_use == Use::TransitConnection
                    && pred.prior_stop.is_valid()
                    && walking_distance as f32 > max_transfer_distance
                {
                    continue;
                }

                // Past the horizon on this branch only; other branches
                // may still fit
                if newcost.secs > max_seconds {
                    continue;
                }

                if status.set == EdgeSet::Temporary {
                    let idx = status.index;
                    let dc = self.labels[idx as usize].cost.weighted - newcost.weighted;
                    if dc > 0.0 {
                        let old_sort = self.labels[idx as usize].sort_cost;
                        let new_sort = old_sort - dc;
                        self.labels[idx as usize].update_multimodal(
                            pred_idx,
                            newcost,
                            new_sort,
                            walking_distance,
                            trip_id,
                            block_id,
                        );
                        self.queue.decrease(idx, new_sort, old_sort);
                    }
                    continue;
                }

                let idx = self.labels.len() as u32;
                self.queue.push(idx, newcost.weighted);
                self.edge_status.set(edge_id, EdgeSet::Temporary, idx);
                self.labels.push(EdgeLabel::new_multimodal(
                    pred_idx,
                    edge_id,
                    edge,
                    newcost,
                    newcost.weighted,
                    edge_mode,
                    walking_distance,
                    trip_id,
                    prior_stop,
                    block_id,
                    operator_id,
                    has_transit,
                ));
            }
        }
    }
}
