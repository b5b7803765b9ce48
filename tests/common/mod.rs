//! Shared test fixtures: small in-memory tile graphs
//!
//! The builder wires up opposing-edge pairs, per-node edge runs and shared
//! shape records the way real tiles lay them out, so the expansion code
//! sees honest topology without any file I/O.

#![allow(dead_code)]

use reachgrid::costing::{AutoCost, BicycleCost, ModeCosting, PedestrianCost, TransitCost};
use reachgrid::geo::METERS_PER_DEGREE_LAT;
use reachgrid::graph::{
    access, DirectedEdge, EdgeInfo, GraphId, GraphTile, NodeInfo, NodeType, TileHeader,
    TransitDeparture, TransitRoute, Use,
};
use reachgrid::label::EdgeLabel;
use reachgrid::location::{Location, LocationEdge};
use reachgrid::{LatLng, TileSet};

pub const LEVEL: u32 = 0;
pub const TILE: u32 = 0;

/// A point expressed in meters east/north of the fixture origin, on the
/// same flat-degree approximation the grid uses.
pub fn ll(east_m: f32, north_m: f32) -> LatLng {
    LatLng::new(north_m / METERS_PER_DEGREE_LAT, east_m / METERS_PER_DEGREE_LAT)
}

struct PendingEdge {
    from: usize,
    to: usize,
    length: f32,
    speed_kmh: f32,
    edge_use: Use,
    fwd_access: u32,
    rev_access: u32,
    line_id: u32,
    partner: usize,
    forward: bool,
    edgeinfo: usize,
}

pub struct FixtureBuilder {
    date_created: u32,
    nodes: Vec<(LatLng, NodeType, u32)>,
    edges: Vec<PendingEdge>,
    shapes: Vec<Vec<LatLng>>,
    routes: Vec<TransitRoute>,
    departures: Vec<TransitDeparture>,
    names: Vec<String>,
}

impl FixtureBuilder {
    pub fn new() -> Self {
        Self {
            date_created: 0,
            nodes: Vec::new(),
            edges: Vec::new(),
            shapes: Vec::new(),
            routes: Vec::new(),
            departures: Vec::new(),
            names: vec![String::new()],
        }
    }

    pub fn date_created(mut self, days_from_pivot: u32) -> Self {
        self.date_created = days_from_pivot;
        self
    }

    pub fn node(&mut self, at: LatLng) -> usize {
        self.nodes.push((at, NodeType::Street, access::ALL));
        self.nodes.len() - 1
    }

    pub fn stop(&mut self, at: LatLng) -> usize {
        self.nodes
            .push((at, NodeType::TransitStop, access::PEDESTRIAN | access::TRANSIT));
        self.nodes.len() - 1
    }

    /// An edge pair traversable both ways. Returns the handles of the two
    /// directions (`a→b`, `b→a`).
    pub fn two_way(
        &mut self,
        a: usize,
        b: usize,
        length: f32,
        speed_kmh: f32,
        mask: u32,
    ) -> (usize, usize) {
        self.pair(a, b, length, speed_kmh, Use::Road, mask, mask, 0, 0)
    }

    /// An edge pair traversable `a→b` only.
    pub fn one_way(
        &mut self,
        a: usize,
        b: usize,
        length: f32,
        speed_kmh: f32,
        mask: u32,
    ) -> (usize, usize) {
        self.pair(a, b, length, speed_kmh, Use::Road, mask, 0, 0, 0)
    }

    /// Pedestrian link between the street network and a stop platform.
    pub fn connection(&mut self, a: usize, b: usize, length: f32) -> (usize, usize) {
        self.pair(
            a,
            b,
            length,
            5.1,
            Use::TransitConnection,
            access::PEDESTRIAN,
            access::PEDESTRIAN,
            0,
            0,
        )
    }

    /// A scheduled transit edge `a→b` on `line_id`. The opposing record
    /// exists for topology but carries no line, so it can never board.
    pub fn transit_line(
        &mut self,
        a: usize,
        b: usize,
        length: f32,
        line_id: u32,
    ) -> (usize, usize) {
        self.pair(
            a,
            b,
            length,
            40.0,
            Use::TransitLine,
            access::TRANSIT,
            0,
            line_id,
            0,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn pair(
        &mut self,
        a: usize,
        b: usize,
        length: f32,
        speed_kmh: f32,
        edge_use: Use,
        fwd_mask: u32,
        rev_mask: u32,
        line_id: u32,
        rev_line_id: u32,
    ) -> (usize, usize) {
        let shape = vec![self.nodes[a].0, self.nodes[b].0];
        self.shapes.push(shape);
        let edgeinfo = self.shapes.len() - 1;

        let fwd = self.edges.len();
        let rev = fwd + 1;
        self.edges.push(PendingEdge {
            from: a,
            to: b,
            length,
            speed_kmh,
            edge_use,
            fwd_access: fwd_mask,
            rev_access: rev_mask,
            line_id,
            partner: rev,
            forward: true,
            edgeinfo,
        });
        self.edges.push(PendingEdge {
            from: b,
            to: a,
            length,
            speed_kmh,
            edge_use,
            fwd_access: rev_mask,
            rev_access: fwd_mask,
            line_id: rev_line_id,
            partner: fwd,
            forward: false,
            edgeinfo,
        });
        (fwd, rev)
    }

    /// Register an operator; returns the route index for departures.
    pub fn route(&mut self, operator: &str) -> u32 {
        self.names.push(operator.to_string());
        self.routes.push(TransitRoute {
            operator_name_index: self.names.len() as u32 - 1,
        });
        self.routes.len() as u32 - 1
    }

    pub fn departure(
        &mut self,
        line_id: u32,
        route_index: u32,
        trip_id: u32,
        block_id: u32,
        departure_time: u32,
        elapsed_time: u32,
    ) {
        self.departures.push(TransitDeparture {
            line_id,
            trip_id,
            block_id,
            route_index,
            departure_time,
            elapsed_time,
            schedule_days: u64::MAX,
            dow_mask: 0x7f,
            wheelchair_accessible: true,
            bicycle_accessible: true,
        });
    }

    pub fn build(self) -> GraphFixture {
        let n_nodes = self.nodes.len();

        // Group edges by begin node, preserving insertion order
        let mut per_node: Vec<Vec<usize>> = vec![Vec::new(); n_nodes];
        for (i, e) in self.edges.iter().enumerate() {
            per_node[e.from].push(i);
        }

        // Global slot and local index for every pending edge
        let mut slot = vec![0u32; self.edges.len()];
        let mut local = vec![0u32; self.edges.len()];
        let mut next = 0u32;
        let mut node_edge_index = vec![0u32; n_nodes];
        for (node, list) in per_node.iter().enumerate() {
            node_edge_index[node] = next;
            for (j, &e) in list.iter().enumerate() {
                slot[e] = next;
                local[e] = j as u32;
                next += 1;
            }
        }

        let nodes: Vec<NodeInfo> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &(latlng, node_type, node_access))| NodeInfo {
                latlng,
                edge_index: node_edge_index[i],
                edge_count: per_node[i].len() as u32,
                node_type,
                access: node_access,
                timezone_offset_secs: 0,
            })
            .collect();

        let mut directededges: Vec<Option<DirectedEdge>> = vec![None; self.edges.len()];
        for (i, e) in self.edges.iter().enumerate() {
            directededges[slot[i] as usize] = Some(DirectedEdge {
                end_node: GraphId::new(LEVEL, TILE, e.to as u32),
                length: e.length,
                speed_kmh: e.speed_kmh,
                edge_use: e.edge_use,
                forward_access: e.fwd_access,
                reverse_access: e.rev_access,
                shortcut: false,
                trans_up: false,
                trans_down: false,
                forward: e.forward,
                leaves_tile: false,
                edgeinfo_index: e.edgeinfo as u32,
                line_id: e.line_id,
                local_edge_idx: local[i],
                opp_index: local[e.partner],
            });
        }

        let tile = GraphTile {
            header: TileHeader {
                graph_id: GraphId::new(LEVEL, TILE, 0),
                date_created: self.date_created,
            },
            nodes,
            directededges: directededges.into_iter().map(Option::unwrap).collect(),
            edgeinfo: self.shapes.into_iter().map(|shape| EdgeInfo { shape }).collect(),
            routes: self.routes,
            departures: self.departures,
            names: self.names,
        };

        let mut tiles = TileSet::new();
        tiles.insert(tile);

        GraphFixture {
            tiles,
            node_pos: self.nodes.iter().map(|n| n.0).collect(),
            edge_ids: (0..self.edges.len())
                .map(|i| GraphId::new(LEVEL, TILE, slot[i]))
                .collect(),
        }
    }
}

pub struct GraphFixture {
    pub tiles: TileSet,
    pub node_pos: Vec<LatLng>,
    /// GraphId per builder edge handle.
    pub edge_ids: Vec<GraphId>,
}

impl GraphFixture {
    pub fn edge_id(&self, handle: usize) -> GraphId {
        self.edge_ids[handle]
    }

    pub fn node_id(&self, node: usize) -> GraphId {
        GraphId::new(LEVEL, TILE, node as u32)
    }

    /// A location snapped to edges at given fractions, positioned at `at`.
    pub fn location(&self, at: LatLng, edges: &[(usize, f32)]) -> Location {
        let mut loc = Location::new(at);
        loc.edges = edges
            .iter()
            .map(|&(handle, dist)| LocationEdge {
                id: self.edge_id(handle),
                dist,
            })
            .collect();
        loc
    }

    /// A location at a node, snapped to outgoing edges at `dist = 0`.
    pub fn node_location(&self, node: usize, outgoing: &[usize]) -> Location {
        self.location(
            self.node_pos[node],
            &outgoing.iter().map(|&e| (e, 0.0)).collect::<Vec<_>>(),
        )
    }
}

/// Default costing table: one model per mode slot.
pub fn mode_costing() -> ModeCosting {
    [
        Box::new(AutoCost::new()),
        Box::new(PedestrianCost::new()),
        Box::new(BicycleCost::new()),
        Box::new(TransitCost::new()),
    ]
}

/// Costing table with a custom auto model (turn restriction tests).
pub fn mode_costing_with_auto(auto: AutoCost) -> ModeCosting {
    [
        Box::new(auto),
        Box::new(PedestrianCost::new()),
        Box::new(BicycleCost::new()),
        Box::new(TransitCost::new()),
    ]
}

/// Costing table with a custom transit model (transfer cost tests).
pub fn mode_costing_with_transit(transit: TransitCost) -> ModeCosting {
    [
        Box::new(AutoCost::new()),
        Box::new(PedestrianCost::new()),
        Box::new(BicycleCost::new()),
        Box::new(transit),
    ]
}

pub fn find_label(labels: &[EdgeLabel], edge_id: GraphId) -> Option<&EdgeLabel> {
    labels.iter().find(|l| l.edge_id == edge_id)
}
