//! Edge status table
//!
//! Tracks which directed edges the expansion has touched and where their
//! label lives. Absent edges read as unreached; once permanent an edge is
//! never revisited.

use rustc_hash::FxHashMap;

use crate::graph::GraphId;

/// Dijkstra edge states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeSet {
    Unreached,
    /// Labeled and in the queue; may still be relaxed.
    Temporary,
    /// Settled; the label's cost is final.
    Permanent,
}

#[derive(Debug, Clone, Copy)]
pub struct EdgeStatusInfo {
    pub set: EdgeSet,
    pub index: u32,
}

#[derive(Debug, Default)]
pub struct EdgeStatus {
    map: FxHashMap<GraphId, EdgeStatusInfo>,
}

impl EdgeStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, edge_id: GraphId) -> EdgeStatusInfo {
        self.map.get(&edge_id).copied().unwrap_or(EdgeStatusInfo {
            set: EdgeSet::Unreached,
            index: 0,
        })
    }

    pub fn set(&mut self, edge_id: GraphId, set: EdgeSet, index: u32) {
        self.map.insert(edge_id, EdgeStatusInfo { set, index });
    }

    /// Change the state, keeping the label index.
    pub fn update(&mut self, edge_id: GraphId, set: EdgeSet) {
        if let Some(info) = self.map.get_mut(&edge_id) {
            info.set = set;
        }
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}
