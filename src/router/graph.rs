use std::{collections::HashMap, sync::Arc};

pub type VertexId = u32;
pub type EdgeId = u32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: VertexId,
    pub to: VertexId,
    /// Minutes.
    pub weight: f64,
}

impl Edge {
    pub fn is_loop(&self) -> bool {
        self.from == self.to
    }
}

/// What an edge stands for. Stored next to the graph, indexed by edge id.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeMetadata {
    /// Waiting for a bus at a stop.
    Wait,
    /// Riding `bus` for `span_count` stops without getting off.
    Ride {
        bus: Arc<str>,
        span_count: u32,
        /// Id of the edge this entry belongs to.
        position: EdgeId,
    },
}

impl EdgeMetadata {
    pub fn is_wait(&self) -> bool {
        matches!(self, EdgeMetadata::Wait)
    }
}

/// Directed weighted graph stored as an edge list plus outgoing incidence lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    edges: Vec<Edge>,
    incidence_lists: Vec<Vec<EdgeId>>,
}

impl Graph {
    pub fn new() -> Self {
        Default::default()
    }

    /// Rebuilds a graph from stored parts. The caller is trusted to pass
    /// incidence lists that match the edges.
    pub(crate) fn from_parts(edges: Vec<Edge>, incidence_lists: Vec<Vec<EdgeId>>) -> Self {
        Self {
            edges,
            incidence_lists,
        }
    }

    pub fn add_vertex(&mut self) -> VertexId {
        self.incidence_lists.push(Vec::new());
        (self.incidence_lists.len() - 1) as VertexId
    }

    pub fn add_edge(&mut self, edge: Edge) -> EdgeId {
        let id = self.edges.len() as EdgeId;
        self.incidence_lists[edge.from as usize].push(id);
        self.edges.push(edge);
        id
    }

    pub fn vertex_count(&self) -> usize {
        self.incidence_lists.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id as usize)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges leaving `vertex`.
    pub fn incident_edges(&self, vertex: VertexId) -> &[EdgeId] {
        self.incidence_lists
            .get(vertex as usize)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn incidence_lists(&self) -> &[Vec<EdgeId>] {
        &self.incidence_lists
    }
}

/// The graph the router searches, together with everything needed to
/// translate vertices and edges back into stops and buses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingGraph {
    pub graph: Graph,
    /// Indexed by edge id.
    pub metadata: Vec<EdgeMetadata>,
    pub stop_to_vertex: HashMap<Arc<str>, VertexId>,
    /// Indexed by vertex id.
    pub vertex_to_stop: Vec<Arc<str>>,
}

impl RoutingGraph {
    pub fn vertex_by_stop(&self, name: &str) -> Option<VertexId> {
        self.stop_to_vertex.get(name).copied()
    }

    pub fn stop_by_vertex(&self, vertex: VertexId) -> Option<&Arc<str>> {
        self.vertex_to_stop.get(vertex as usize)
    }
}
