//! Isochrone expansion engine
//!
//! Computes a gridded time-to-reach surface from one or more locations on
//! the tiled graph. Three variants share one skeleton — initialize, seed,
//! then pop/settle/expand until the queue drains or the time horizon is
//! crossed:
//!
//! - [`Isochrone::compute`] — forward single-mode expansion from origins
//! - [`Isochrone::compute_reverse`] — reverse expansion toward destinations
//! - [`Isochrone::compute_multimodal`] — pedestrian + scheduled transit
//!
//! The engine owns all per-run state (label store, bucket queue, edge
//! status, grid); a run releases it on [`Isochrone::clear`] or when the
//! next run reinitializes. The product is a shared read-only grid handle;
//! cells never reached stay at the grid sentinel.

mod forward;
mod multimodal;
mod reverse;

use std::sync::Arc;

use crate::config::IsochroneConfig;
use crate::costing::{Cost, DynamicCost, TravelMode};
use crate::datetime;
use crate::edgestatus::{EdgeSet, EdgeStatus};
use crate::geo::{meters_per_lng_degree, resample_polyline, Aabb, METERS_PER_DEGREE_LAT};
use crate::graph::GraphReader;
use crate::isogrid::IsoGrid;
use crate::label::{EdgeLabel, INVALID_LABEL};
use crate::location::Location;
use crate::queue::BucketQueue;

const TO_MINUTES: f32 = 1.0 / 60.0;
const MPH_TO_MPS: f32 = 0.44704;

pub struct Isochrone {
    config: IsochroneConfig,
    mode: TravelMode,
    access_mode: u32,
    /// Spacing of resampled shape points, `cell size × 0.25`.
    shape_interval: f32,
    tile_creation_date: u32,
    labels: Vec<EdgeLabel>,
    queue: BucketQueue,
    edge_status: EdgeStatus,
    grid: IsoGrid,
}

impl Default for Isochrone {
    fn default() -> Self {
        Self::new()
    }
}

impl Isochrone {
    pub fn new() -> Self {
        Self::with_config(IsochroneConfig::default())
    }

    pub fn with_config(config: IsochroneConfig) -> Self {
        Self {
            config,
            mode: TravelMode::Drive,
            access_mode: crate::graph::access::AUTO,
            shape_interval: 50.0,
            tile_creation_date: 0,
            labels: Vec::new(),
            queue: BucketQueue::new(0.0, 1.0, 1.0),
            edge_status: EdgeStatus::new(),
            grid: IsoGrid::default(),
        }
    }

    /// Drop all per-run state.
    pub fn clear(&mut self) {
        self.labels = Vec::new();
        self.queue.clear();
        self.edge_status.clear();
        self.grid = IsoGrid::default();
    }

    /// The label store of the last run. Valid until the next run starts.
    pub fn labels(&self) -> &[EdgeLabel] {
        &self.labels
    }

    /// Creation date (days from pivot) of the first seeded tile.
    pub fn tile_creation_date(&self) -> u32 {
        self.tile_creation_date
    }

    /// Fresh label store, queue and status table for a run.
    fn initialize(&mut self, bucket_size: f32) {
        self.labels = Vec::with_capacity(self.config.initial_label_count);
        let range = self.config.bucket_count as f32 * bucket_size;
        self.queue = BucketQueue::new(0.0, range, bucket_size);
        self.edge_status.clear();
        self.tile_creation_date = 0;
    }

    /// Size the grid from the travel mode and horizon: cell size per the
    /// mode, reach envelope from an assumed max average speed.
    fn construct_grid(&mut self, multimodal: bool, max_minutes: u32, locations: &[Location]) {
        let max_seconds = (max_minutes * 60) as f32;
        let (cell_meters, speed_mps) = if multimodal {
            // Crow-flies bound for the fastest leg a transit trip can take
            (200.0, 70.0 * MPH_TO_MPS)
        } else {
            match self.mode {
                TravelMode::Pedestrian => (200.0, 5.0 * MPH_TO_MPS),
                TravelMode::Bicycle => (200.0, 20.0 * MPH_TO_MPS),
                _ => (400.0, 70.0 * MPH_TO_MPS),
            }
        };
        self.shape_interval = cell_meters * 0.25;

        let max_distance = max_seconds * speed_mps;
        let cell_degrees = cell_meters / METERS_PER_DEGREE_LAT;
        let dlat = max_distance / METERS_PER_DEGREE_LAT;

        let mut bounds = Aabb::empty();
        for loc in locations {
            let center = loc.latlng;
            let dlng = max_distance / meters_per_lng_degree(center.lat);
            bounds.expand(&Aabb::new(
                center.lng - dlng,
                center.lat - dlat,
                center.lng + dlng,
                center.lat + dlat,
            ));
        }
        self.grid = IsoGrid::new(bounds, cell_degrees, (max_minutes + 5) as f32);
    }

    fn pop_next(&mut self) -> Option<u32> {
        let labels = &self.labels;
        self.queue.pop(|idx| labels[idx as usize].sort_cost)
    }

    fn take_grid(&mut self) -> Arc<IsoGrid> {
        Arc::new(std::mem::take(&mut self.grid))
    }

    /// Stamp the settled label's edge shape onto the grid: resample,
    /// interpolate time linearly along the edge, and monotone-write every
    /// crossed cell.
    fn update_grid(&mut self, pred: &EdgeLabel, reader: &impl GraphReader) {
        // If the opposing edge has settled, its pass already wrote these
        // cells at equal or lower times.
        let opp = reader.opposing_edge_id(pred.edge_id);
        if opp.is_valid() && self.edge_status.get(opp).set == EdgeSet::Permanent {
            return;
        }

        let Some(tile) = reader.tile(pred.edge_id.tile_base()) else {
            return;
        };
        let Some(edge) = tile.directededge(pred.edge_id.index()) else {
            return;
        };
        // Cells between stops are passed through, not reached
        if edge.is_transit_line() || edge.length <= 0.0 {
            return;
        }

        let secs1 = pred.cost.secs;
        let secs0 = if pred.predecessor == INVALID_LABEL {
            // Seed label: the shape start stands in for the origin point
            0.0
        } else {
            self.labels[pred.predecessor as usize].cost.secs
        };

        let Some(info) = tile.edgeinfo(edge) else {
            return;
        };
        let mut shape = info.shape.clone();
        if !edge.forward {
            shape.reverse();
        }
        let resampled = resample_polyline(&shape, self.shape_interval);

        let delta = self.shape_interval * (secs1 - secs0) / edge.length;
        let mut secs = secs0;
        for pair in resampled.windows(2) {
            secs += delta;
            for cell in self.grid.intersect(pair[0], pair[1]) {
                self.grid.set_if_less_than(cell, secs * TO_MINUTES);
            }
        }
    }

    /// Relax: if the temporary label at `idx` is costlier than `newcost`,
    /// repoint it at `pred_idx` and decrease its queue key by the real
    /// cost difference.
    fn check_if_lower_cost_path(&mut self, idx: u32, pred_idx: u32, newcost: Cost) {
        let dc = self.labels[idx as usize].cost.weighted - newcost.weighted;
        if dc > 0.0 {
            let old_sort = self.labels[idx as usize].sort_cost;
            let new_sort = old_sort - dc;
            self.labels[idx as usize].update(pred_idx, newcost, new_sort);
            self.queue.decrease(idx, new_sort, old_sort);
        }
    }

    /// Seed the queue with the candidate edges of each origin. Edges
    /// whose snap point sits at their end node are inbound-only and
    /// skipped; the rest get a partial-edge cost scaled by the remaining
    /// fraction.
    fn set_origin_locations(
        &mut self,
        reader: &impl GraphReader,
        origins: &mut [Location],
        costing: &dyn DynamicCost,
    ) {
        for origin in origins {
            self.grid.set(origin.latlng, 0.0);

            let mut seeded_tz: Option<i32> = None;
            for edge in &origin.edges {
                if edge.end_node() {
                    continue;
                }
                let Some(tile) = reader.tile(edge.id.tile_base()) else {
                    continue;
                };
                let Some(directededge) = tile.directededge(edge.id.index()) else {
                    continue;
                };
                self.tile_creation_date = tile.header.date_created;

                // Without the end node's tile this edge cannot expand
                let Some(end_tile) = reader.tile(directededge.end_node.tile_base()) else {
                    continue;
                };
                let Some(nodeinfo) = end_tile.node(directededge.end_node) else {
                    continue;
                };

                let cost = costing.edge_cost(directededge) * (1.0 - edge.dist);
                let remaining = (directededge.length * (1.0 - edge.dist)) as u32;

                let idx = self.labels.len() as u32;
                self.queue.push(idx, cost.weighted);
                self.edge_status.set(edge.id, EdgeSet::Temporary, idx);
                let mut label = EdgeLabel::new(
                    INVALID_LABEL,
                    edge.id,
                    directededge,
                    cost,
                    cost.weighted,
                    self.mode,
                    remaining,
                );
                label.origin = true;
                self.labels.push(label);

                seeded_tz = Some(nodeinfo.timezone_offset_secs);
            }

            // Resolve a "current" departure time against the time zone of
            // the snapped node, now that we know it
            if let Some(tz) = seeded_tz {
                if origin.date_time.as_deref() == Some("current") {
                    origin.date_time = Some(datetime::iso_date_time(tz));
                }
            }
        }
    }

    /// Seed the queue with the opposing edges of each destination's
    /// candidates. Edges snapped at their begin node are outbound-only
    /// and skipped, as are candidates whose opposing edge cannot be
    /// resolved.
    fn set_destination_locations(
        &mut self,
        reader: &impl GraphReader,
        destinations: &[Location],
        costing: &dyn DynamicCost,
    ) {
        for dest in destinations {
            self.grid.set(dest.latlng, 0.0);

            for edge in &dest.edges {
                if edge.begin_node() {
                    continue;
                }
                let Some(tile) = reader.tile(edge.id.tile_base()) else {
                    continue;
                };
                let Some(directededge) = tile.directededge(edge.id.index()) else {
                    continue;
                };

                let opp_edge_id = reader.opposing_edge_id(edge.id);
                if !opp_edge_id.is_valid() {
                    continue;
                }
                let Some(opp_dir_edge) = reader.opposing_edge(edge.id) else {
                    continue;
                };

                // Cost the forward direction along the snapped fraction
                let cost = costing.edge_cost(directededge) * edge.dist;

                let idx = self.labels.len() as u32;
                self.queue.push(idx, cost.weighted);
                self.edge_status.set(opp_edge_id, EdgeSet::Temporary, idx);
                self.labels.push(EdgeLabel::new_reverse(
                    INVALID_LABEL,
                    opp_edge_id,
                    edge.id,
                    opp_dir_edge,
                    cost,
                    cost.weighted,
                    self.mode,
                ));
            }
        }
    }
}
