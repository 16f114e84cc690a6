use std::{collections::HashMap, sync::Arc, time::Instant};

use tracing::{debug, warn};

use crate::{
    repository::{Bus, Repository, Stop},
    router::{
        Error,
        graph::{Edge, EdgeId, EdgeMetadata, Graph, RoutingGraph, VertexId},
    },
    shared::settings::RoutingSettings,
};

/// Turns the bus lines of a repository into a routing graph.
///
/// Every stop position on a line gets a wait edge looping on its vertex and
/// one ride edge to every later position of the same trip. A ride edge weighs
/// the wait at the boarding stop plus the riding time, accumulated hop by hop.
pub struct GraphBuilder<'a> {
    repository: &'a Repository,
    settings: RoutingSettings,
    graph: Graph,
    metadata: Vec<EdgeMetadata>,
    stop_to_vertex: HashMap<Arc<str>, VertexId>,
    vertex_to_stop: Vec<Arc<str>>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(repository: &'a Repository, settings: RoutingSettings) -> Self {
        Self {
            repository,
            settings,
            graph: Graph::new(),
            metadata: Vec::new(),
            stop_to_vertex: HashMap::new(),
            vertex_to_stop: Vec::new(),
        }
    }

    /// Fails when the velocity is so small that some travel time overflows.
    pub fn build(mut self) -> Result<RoutingGraph, Error> {
        debug!("Building routing graph...");
        let now = Instant::now();
        let repository = self.repository;
        repository
            .buses()
            .iter()
            .try_for_each(|bus| self.add_bus(bus))?;
        debug!(
            "Building routing graph took {:?} ({} vertices, {} edges)",
            now.elapsed(),
            self.graph.vertex_count(),
            self.graph.edge_count()
        );
        Ok(RoutingGraph {
            graph: self.graph,
            metadata: self.metadata,
            stop_to_vertex: self.stop_to_vertex,
            vertex_to_stop: self.vertex_to_stop,
        })
    }

    fn add_bus(&mut self, bus: &Bus) -> Result<(), Error> {
        let repository = self.repository;
        let stops: Vec<&Stop> = repository.stops_by_bus(bus).collect();
        let wait = self.settings.wait_minutes();

        for (i, stop) in stops.iter().enumerate() {
            let from = self.vertex(stop);
            self.push_edge(
                Edge {
                    from,
                    to: from,
                    weight: wait,
                },
                EdgeMetadata::Wait,
            );

            let mut weight = wait;
            for (span, hop) in stops[i..].windows(2).enumerate() {
                weight += self.ride_minutes(hop[0], hop[1], bus);
                if !weight.is_finite() {
                    return Err(Error::InvalidSettings(self.settings.bus_velocity));
                }
                let to = self.vertex(hop[1]);
                let position = self.graph.edge_count() as EdgeId;
                self.push_edge(
                    Edge { from, to, weight },
                    EdgeMetadata::Ride {
                        bus: bus.name.clone(),
                        span_count: span as u32 + 1,
                        position,
                    },
                );
            }
        }
        Ok(())
    }

    fn push_edge(&mut self, edge: Edge, metadata: EdgeMetadata) {
        self.graph.add_edge(edge);
        self.metadata.push(metadata);
    }

    /// Vertex of a stop, handing out the next id the first time a stop shows up.
    fn vertex(&mut self, stop: &Stop) -> VertexId {
        if let Some(vertex) = self.stop_to_vertex.get(&stop.name) {
            return *vertex;
        }
        let vertex = self.graph.add_vertex();
        self.stop_to_vertex.insert(stop.name.clone(), vertex);
        self.vertex_to_stop.push(stop.name.clone());
        vertex
    }

    fn ride_minutes(&self, from: &Stop, to: &Stop, bus: &Bus) -> f64 {
        match self.repository.distance(from.index, to.index) {
            Some(distance) => distance.travel_minutes(self.settings.bus_velocity),
            None => {
                warn!(
                    "No road distance between {} and {} on bus {}, counting it as 0",
                    from.name, to.name, bus.name
                );
                0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(is_circular: bool) -> Repository {
        let mut repository = Repository::new();
        repository.add_stop("A", (55.0, 37.0).into()).unwrap();
        repository.add_stop("B", (55.01, 37.0).into()).unwrap();
        repository.add_stop("C", (55.02, 37.0).into()).unwrap();
        repository.add_distance("A", "B", 1000).unwrap();
        repository.add_distance("B", "C", 2000).unwrap();
        repository.add_bus("1", &["A", "B", "C"], is_circular).unwrap();
        repository
    }

    #[test]
    fn emits_wait_and_every_later_ride() {
        let routing = GraphBuilder::new(&line(true), RoutingSettings::new(2, 60.0)).build().unwrap();
        // 3 waits + rides A->B, A->C, B->C
        assert_eq!(routing.graph.edge_count(), 6);
        assert_eq!(routing.metadata.len(), 6);
        assert_eq!(routing.metadata.iter().filter(|m| m.is_wait()).count(), 3);
        assert_eq!(routing.vertex_to_stop.len(), 3);

        let a_to_c = routing
            .graph
            .edges()
            .iter()
            .position(|edge| edge.from == 0 && edge.to == 2)
            .unwrap();
        assert_eq!(routing.graph.edges()[a_to_c].weight, 2.0 + 1.0 + 2.0);
        assert_eq!(
            routing.metadata[a_to_c],
            EdgeMetadata::Ride {
                bus: "1".into(),
                span_count: 2,
                position: a_to_c as EdgeId,
            }
        );
    }

    #[test]
    fn vertices_follow_first_encounter() {
        let mut repository = Repository::new();
        repository.add_stop("X", (55.0, 37.0).into()).unwrap();
        repository.add_stop("Y", (55.01, 37.0).into()).unwrap();
        repository.add_stop("Z", (55.02, 37.0).into()).unwrap();
        repository.add_bus("1", &["Z", "Y"], true).unwrap();
        repository.add_bus("2", &["X", "Y"], true).unwrap();
        let routing = GraphBuilder::new(&repository, RoutingSettings::new(1, 10.0)).build().unwrap();
        let order: Vec<_> = routing.vertex_to_stop.iter().map(|s| s.as_ref()).collect();
        assert_eq!(order, ["Z", "Y", "X"]);
        for (vertex, name) in routing.vertex_to_stop.iter().enumerate() {
            assert_eq!(routing.vertex_by_stop(name), Some(vertex as VertexId));
        }
    }

    #[test]
    fn overflowing_travel_time_is_rejected() {
        let settings = RoutingSettings::new(2, 1e-310);
        assert!(settings.is_valid());
        assert_eq!(
            GraphBuilder::new(&line(true), settings).build(),
            Err(Error::InvalidSettings(1e-310))
        );
    }

    #[test]
    fn ride_weight_grows_with_span() {
        let routing = GraphBuilder::new(&line(false), RoutingSettings::new(3, 30.0)).build().unwrap();
        let from_first: Vec<(u32, f64)> = routing
            .metadata
            .iter()
            .zip(routing.graph.edges())
            .filter_map(|(metadata, edge)| match metadata {
                EdgeMetadata::Ride { span_count, .. } if edge.from == 0 => {
                    Some((*span_count, edge.weight))
                }
                _ => None,
            })
            .collect();
        // A appears twice on A B C B A, the first boarding rides up to 4 stops
        assert!(from_first.iter().any(|(span, _)| *span == 4));
        for window in from_first.windows(2) {
            if window[1].0 == window[0].0 + 1 {
                assert!(window[0].1 <= window[1].1);
            }
        }
    }
}
