//! Tiled graph model
//!
//! The routing graph is sharded into tiles, each holding a slice of nodes
//! and directed edges, and partitioned into hierarchy levels connected by
//! transition edges. This module defines the packed [`GraphId`], the
//! per-tile records, the [`GraphReader`] access trait and an in-memory
//! [`TileSet`] reader.
//!
//! Tile loading from disk, caching and location snapping live outside this
//! crate; everything here is the data contract the expansion loops consume.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::geo::LatLng;

// GraphId bit layout: 3 bits level, 22 bits tile, 39 bits index.
const LEVEL_BITS: u64 = 3;
const TILE_BITS: u64 = 22;
const LEVEL_MASK: u64 = (1 << LEVEL_BITS) - 1;
const TILE_MASK: u64 = (1 << TILE_BITS) - 1;
const BASE_MASK: u64 = (1 << (LEVEL_BITS + TILE_BITS)) - 1;

/// Identifier of a node or directed edge: `(level, tile, index)` packed
/// into 64 bits. The level/tile pair addresses the tile, the index is the
/// slot within that tile's node or edge array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphId(u64);

impl GraphId {
    pub const INVALID: GraphId = GraphId(u64::MAX);

    pub fn new(level: u32, tile: u32, index: u32) -> Self {
        GraphId(
            (level as u64 & LEVEL_MASK)
                | ((tile as u64 & TILE_MASK) << LEVEL_BITS)
                | ((index as u64) << (LEVEL_BITS + TILE_BITS)),
        )
    }

    pub fn level(&self) -> u32 {
        (self.0 & LEVEL_MASK) as u32
    }

    pub fn tile(&self) -> u32 {
        ((self.0 >> LEVEL_BITS) & TILE_MASK) as u32
    }

    pub fn index(&self) -> u32 {
        (self.0 >> (LEVEL_BITS + TILE_BITS)) as u32
    }

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// The id of this id's tile: same level/tile, index 0.
    pub fn tile_base(&self) -> GraphId {
        GraphId(self.0 & BASE_MASK)
    }

    /// Same tile, different slot.
    pub fn with_index(&self, index: u32) -> GraphId {
        GraphId((self.0 & BASE_MASK) | ((index as u64) << (LEVEL_BITS + TILE_BITS)))
    }
}

/// Node classification. Only the distinction between plain street
/// intersections and transit stops matters to the expansion loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    Street,
    /// A station node served by one or more transit lines.
    TransitStop,
}

/// Edge classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Use {
    Road,
    /// Scheduled transit service between two stops.
    TransitLine,
    /// Pedestrian link between the street network and a stop platform.
    TransitConnection,
}

/// Access bits for nodes and directed edges.
pub mod access {
    pub const AUTO: u32 = 1;
    pub const PEDESTRIAN: u32 = 2;
    pub const BICYCLE: u32 = 4;
    pub const TRANSIT: u32 = 8;
    pub const ALL: u32 = AUTO | PEDESTRIAN | BICYCLE | TRANSIT;
}

/// A graph node: position plus the contiguous run of outbound edges in the
/// owning tile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    pub latlng: LatLng,
    /// Index of the first outbound directed edge in the tile.
    pub edge_index: u32,
    pub edge_count: u32,
    pub node_type: NodeType,
    pub access: u32,
    /// UTC offset of the node's time zone, in seconds.
    pub timezone_offset_secs: i32,
}

/// A directed edge. Opposing direction is a separate record at the end
/// node; `opp_index` is its slot among the end node's edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectedEdge {
    pub end_node: GraphId,
    /// Length in meters.
    pub length: f32,
    pub speed_kmh: f32,
    pub edge_use: Use,
    pub forward_access: u32,
    pub reverse_access: u32,
    pub shortcut: bool,
    /// Transition to the next level up / down in the hierarchy.
    pub trans_up: bool,
    pub trans_down: bool,
    /// Whether the stored shape runs in this edge's travel direction.
    pub forward: bool,
    /// End node lies in a different tile.
    pub leaves_tile: bool,
    pub edgeinfo_index: u32,
    /// Transit line id; 0 for non-transit edges.
    pub line_id: u32,
    /// Slot of this edge among its begin node's edges.
    pub local_edge_idx: u32,
    /// Slot of the opposing edge among the end node's edges.
    pub opp_index: u32,
}

impl DirectedEdge {
    pub fn is_transition(&self) -> bool {
        self.trans_up || self.trans_down
    }

    pub fn is_transit_line(&self) -> bool {
        self.edge_use == Use::TransitLine
    }
}

/// Shared shape record, referenced by both directions of an edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeInfo {
    pub shape: Vec<LatLng>,
}

/// A scheduled departure on a transit line edge.
///
/// Service validity is a 64-day bitmask relative to the tile's creation
/// date plus a day-of-week mask; when the query date precedes the tile the
/// bitmask cannot apply and lookups fall back to day-of-week alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitDeparture {
    pub line_id: u32,
    pub trip_id: u32,
    /// Trips sharing a nonzero block continue on the same vehicle.
    pub block_id: u32,
    pub route_index: u32,
    /// Seconds from midnight.
    pub departure_time: u32,
    /// In-vehicle travel seconds to the far stop.
    pub elapsed_time: u32,
    pub schedule_days: u64,
    pub dow_mask: u8,
    pub wheelchair_accessible: bool,
    pub bicycle_accessible: bool,
}

impl TransitDeparture {
    fn services(&self, day: u32, dow_mask: u8, date_before_tile: bool) -> bool {
        if self.dow_mask & dow_mask == 0 {
            return false;
        }
        if date_before_tile {
            // Schedule bitmask is anchored at the tile date; only the
            // day-of-week pattern is usable.
            return true;
        }
        day < 64 && self.schedule_days & (1u64 << day) != 0
    }
}

/// A transit route record; carries the offset of the operator's one-stop
/// name in the tile's name table (0 = no operator).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitRoute {
    pub operator_name_index: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileHeader {
    pub graph_id: GraphId,
    /// Days from the pivot date when this tile's schedules were built.
    pub date_created: u32,
}

/// One tile of the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphTile {
    pub header: TileHeader,
    pub nodes: Vec<NodeInfo>,
    pub directededges: Vec<DirectedEdge>,
    pub edgeinfo: Vec<EdgeInfo>,
    pub routes: Vec<TransitRoute>,
    pub departures: Vec<TransitDeparture>,
    /// Name table; index 0 is reserved for the empty string.
    pub names: Vec<String>,
}

impl GraphTile {
    pub fn id(&self) -> GraphId {
        self.header.graph_id
    }

    pub fn node(&self, id: GraphId) -> Option<&NodeInfo> {
        self.nodes.get(id.index() as usize)
    }

    pub fn directededge(&self, index: u32) -> Option<&DirectedEdge> {
        self.directededges.get(index as usize)
    }

    pub fn edgeinfo(&self, edge: &DirectedEdge) -> Option<&EdgeInfo> {
        self.edgeinfo.get(edge.edgeinfo_index as usize)
    }

    pub fn route(&self, index: u32) -> Option<&TransitRoute> {
        self.routes.get(index as usize)
    }

    pub fn name(&self, index: u32) -> &str {
        self.names.get(index as usize).map(String::as_str).unwrap_or("")
    }

    /// Earliest departure on `line_id` at or after `current_time`
    /// (seconds from midnight) valid for the given service day, filtered
    /// by accessibility needs. Returns `None` when the line has no more
    /// service — the caller skips the edge.
    pub fn next_departure(
        &self,
        line_id: u32,
        current_time: u32,
        day: u32,
        dow_mask: u8,
        date_before_tile: bool,
        wheelchair: bool,
        bicycle: bool,
    ) -> Option<&TransitDeparture> {
        self.departures
            .iter()
            .filter(|d| {
                d.line_id == line_id
                    && d.departure_time >= current_time
                    && d.services(day, dow_mask, date_before_tile)
                    && (!wheelchair || d.wheelchair_accessible)
                    && (!bicycle || d.bicycle_accessible)
            })
            .min_by_key(|d| d.departure_time)
    }
}

/// Read access to graph tiles.
///
/// Implementations own the tiles; a returned borrow is valid for as long
/// as the reader is. The expansion loops never hold a tile borrow past the
/// step that acquired it.
pub trait GraphReader {
    fn tile(&self, id: GraphId) -> Option<&GraphTile>;

    /// Resolve the opposing directed edge id, crossing tiles as needed.
    /// Returns [`GraphId::INVALID`] when any piece is missing.
    fn opposing_edge_id(&self, edge_id: GraphId) -> GraphId {
        let Some(tile) = self.tile(edge_id.tile_base()) else {
            return GraphId::INVALID;
        };
        let Some(edge) = tile.directededge(edge_id.index()) else {
            return GraphId::INVALID;
        };
        let Some(end_tile) = self.tile(edge.end_node.tile_base()) else {
            return GraphId::INVALID;
        };
        let Some(node) = end_tile.node(edge.end_node) else {
            return GraphId::INVALID;
        };
        edge.end_node.with_index(node.edge_index + edge.opp_index)
    }

    fn opposing_edge(&self, edge_id: GraphId) -> Option<&DirectedEdge> {
        let opp = self.opposing_edge_id(edge_id);
        if !opp.is_valid() {
            return None;
        }
        self.tile(opp.tile_base())?.directededge(opp.index())
    }
}

/// In-memory tile store keyed by level/tile.
#[derive(Debug, Default)]
pub struct TileSet {
    tiles: FxHashMap<u64, GraphTile>,
}

impl TileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tile: GraphTile) {
        self.tiles.insert(tile.id().tile_base().0, tile);
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl GraphReader for TileSet {
    fn tile(&self, id: GraphId) -> Option<&GraphTile> {
        self.tiles.get(&id.tile_base().0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphid_roundtrip() {
        let id = GraphId::new(2, 1234, 56789);
        assert_eq!(id.level(), 2);
        assert_eq!(id.tile(), 1234);
        assert_eq!(id.index(), 56789);
        assert!(id.is_valid());
    }

    #[test]
    fn test_graphid_tile_base() {
        let id = GraphId::new(1, 42, 7);
        assert_eq!(id.tile_base(), GraphId::new(1, 42, 0));
        assert_eq!(id.with_index(9), GraphId::new(1, 42, 9));
        assert_eq!(id.tile_base(), id.with_index(9).tile_base());
    }

    #[test]
    fn test_graphid_invalid() {
        assert!(!GraphId::INVALID.is_valid());
        assert!(GraphId::new(0, 0, 0).is_valid());
    }

    fn departure(line_id: u32, time: u32, dow_mask: u8, days: u64) -> TransitDeparture {
        TransitDeparture {
            line_id,
            trip_id: 1,
            block_id: 0,
            route_index: 0,
            departure_time: time,
            elapsed_time: 300,
            schedule_days: days,
            dow_mask,
            wheelchair_accessible: true,
            bicycle_accessible: false,
        }
    }

    fn tile_with_departures(departures: Vec<TransitDeparture>) -> GraphTile {
        GraphTile {
            header: TileHeader {
                graph_id: GraphId::new(0, 0, 0),
                date_created: 100,
            },
            nodes: vec![],
            directededges: vec![],
            edgeinfo: vec![],
            routes: vec![],
            departures,
            names: vec![String::new()],
        }
    }

    #[test]
    fn test_next_departure_picks_earliest() {
        let tile = tile_with_departures(vec![
            departure(7, 30_000, 0x7f, u64::MAX),
            departure(7, 28_000, 0x7f, u64::MAX),
            departure(7, 29_000, 0x7f, u64::MAX),
        ]);
        let dep = tile.next_departure(7, 28_500, 0, 0x7f, false, false, false);
        assert_eq!(dep.map(|d| d.departure_time), Some(29_000));
    }

    #[test]
    fn test_next_departure_filters_line_and_day() {
        let tile = tile_with_departures(vec![
            departure(7, 28_000, 0b0000001, 1), // day 0 only, Sunday only
            departure(8, 28_000, 0x7f, u64::MAX),
        ]);
        // Wrong line
        assert!(tile.next_departure(9, 0, 0, 0x7f, false, false, false).is_none());
        // Right line, wrong service day
        assert!(tile.next_departure(7, 0, 3, 0b0000001, false, false, false).is_none());
        // Right line, right day
        assert!(tile.next_departure(7, 0, 0, 0b0000001, false, false, false).is_some());
    }

    #[test]
    fn test_next_departure_date_before_tile_uses_dow_only() {
        // Bitmask would reject day 63, but date_before_tile falls back to dow
        let tile = tile_with_departures(vec![departure(7, 28_000, 0b0000010, 0)]);
        assert!(tile
            .next_departure(7, 0, 63, 0b0000010, true, false, false)
            .is_some());
        assert!(tile
            .next_departure(7, 0, 63, 0b0000010, false, false, false)
            .is_none());
    }

    #[test]
    fn test_next_departure_accessibility_filters() {
        let mut dep = departure(7, 28_000, 0x7f, u64::MAX);
        dep.wheelchair_accessible = false;
        let tile = tile_with_departures(vec![dep]);
        assert!(tile.next_departure(7, 0, 0, 0x7f, false, true, false).is_none());
        assert!(tile.next_departure(7, 0, 0, 0x7f, false, false, false).is_some());
    }
}
