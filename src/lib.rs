//! Reachgrid: gridded time-to-reach surfaces over a tiled road graph
//!
//! Pipeline for one request:
//! - Seed: snap-resolved origin (or destination) edges enter the bucket
//!   queue with partial-edge costs
//! - Expand: Dijkstra-style pop/settle/expand bounded by the time
//!   horizon, with per-mode costing, turn restrictions and hierarchy
//!   transitions
//! - Rasterize: each settled edge's resampled shape stamps minimum times
//!   into a geographic grid
//!
//! Three expansion variants share the skeleton: forward, reverse (toward
//! destinations, on opposing edges) and multimodal (pedestrian plus
//! scheduled transit). The product is the grid itself — contour
//! extraction, path reconstruction and serving are for other layers.
//!
//! Key principle: the label store is an arena addressed by stable `u32`
//! indices. Queue entries, edge status and predecessor links all speak
//! label indices, which is what makes decrease-key safe and cheap.

pub mod config;
pub mod costing;
pub mod datetime;
pub mod edgestatus;
pub mod geo;
pub mod graph;
pub mod isochrone;
pub mod isogrid;
pub mod label;
pub mod location;
pub mod queue;

pub use config::IsochroneConfig;
pub use costing::{AutoCost, BicycleCost, Cost, DynamicCost, ModeCosting, PedestrianCost,
                  TransitCost, TravelMode};
pub use edgestatus::{EdgeSet, EdgeStatus, EdgeStatusInfo};
pub use geo::{Aabb, LatLng};
pub use graph::{DirectedEdge, EdgeInfo, GraphId, GraphReader, GraphTile, NodeInfo, NodeType,
                TileSet, Use};
pub use isochrone::Isochrone;
pub use isogrid::IsoGrid;
pub use label::{EdgeLabel, INVALID_LABEL};
pub use location::{Location, LocationEdge};
pub use queue::BucketQueue;
