use std::{
    cmp::Ordering,
    collections::BinaryHeap,
    time::Instant,
};

use rayon::prelude::*;
use tracing::debug;

use crate::router::{
    Error,
    graph::{EdgeId, Graph, VertexId},
};

/// Best known way of reaching a vertex from a fixed source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathEntry {
    /// Total minutes from the source.
    pub weight: f64,
    /// Last edge of the path, None for the source itself.
    pub prev_edge: Option<EdgeId>,
}

/// One entry per target vertex, None when the target is unreachable.
pub type PathRow = Vec<Option<PathEntry>>;

/// A path found in the table.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteInfo {
    pub weight: f64,
    pub edges: Vec<EdgeId>,
}

/// Shortest paths between every pair of vertices, computed once per graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathTable {
    rows: Vec<PathRow>,
}

impl PathTable {
    /// Runs one search per source vertex. Sources are independent so they
    /// are spread over the rayon pool.
    pub fn build(graph: &Graph) -> Self {
        debug!("Building shortest path table...");
        let now = Instant::now();
        let rows: Vec<PathRow> = (0..graph.vertex_count() as VertexId)
            .into_par_iter()
            .map(|source| shortest_paths_from(graph, source))
            .collect();
        debug!(
            "Building shortest path table took {:?} ({} rows)",
            now.elapsed(),
            rows.len()
        );
        Self { rows }
    }

    pub(crate) fn from_rows(rows: Vec<PathRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[PathRow] {
        &self.rows
    }

    pub fn entry(&self, from: VertexId, to: VertexId) -> Option<&PathEntry> {
        self.rows.get(from as usize)?.get(to as usize)?.as_ref()
    }

    /// Walks the predecessor edges back from `to` until the source is reached.
    pub fn query(&self, graph: &Graph, from: VertexId, to: VertexId) -> Result<RouteInfo, Error> {
        let target = self.entry(from, to).ok_or(Error::NoRouteFound)?;
        let mut edges = Vec::new();
        let mut current = target;
        while let Some(edge_id) = current.prev_edge {
            if edges.len() >= graph.vertex_count() {
                return Err(Error::FailedToBuildRoute);
            }
            edges.push(edge_id);
            let edge = graph.edge(edge_id).ok_or(Error::FailedToBuildRoute)?;
            current = self
                .entry(from, edge.from)
                .ok_or(Error::FailedToBuildRoute)?;
        }
        edges.reverse();
        Ok(RouteInfo {
            weight: target.weight,
            edges,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    weight: f64,
    vertex: VertexId,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Flipped so the max-heap pops the lightest candidate first,
        // ties go to the lower vertex id.
        other
            .weight
            .total_cmp(&self.weight)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn shortest_paths_from(graph: &Graph, source: VertexId) -> PathRow {
    let mut row: PathRow = vec![None; graph.vertex_count()];
    row[source as usize] = Some(PathEntry {
        weight: 0.0,
        prev_edge: None,
    });

    let mut heap = BinaryHeap::new();
    heap.push(Candidate {
        weight: 0.0,
        vertex: source,
    });

    while let Some(Candidate { weight, vertex }) = heap.pop() {
        // Skip stale heap entries
        if let Some(best) = row[vertex as usize]
            && weight > best.weight
        {
            continue;
        }

        for edge_id in graph.incident_edges(vertex) {
            let Some(edge) = graph.edge(*edge_id) else {
                continue;
            };
            let next = weight + edge.weight;
            let improves = match row[edge.to as usize] {
                Some(best) => next < best.weight,
                None => true,
            };
            if improves {
                row[edge.to as usize] = Some(PathEntry {
                    weight: next,
                    prev_edge: Some(*edge_id),
                });
                heap.push(Candidate {
                    weight: next,
                    vertex: edge.to,
                });
            }
        }
    }
    row
}
