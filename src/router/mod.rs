pub mod builder;
pub mod graph;
pub mod itinerary;
pub mod table;

pub use builder::*;
pub use graph::*;
pub use itinerary::*;
pub use table::*;

use thiserror::Error;

use crate::{repository::Repository, shared::settings::RoutingSettings};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Bus velocity must be a positive number with finite travel times, got {0}")]
    InvalidSettings(f64),
    #[error("Stop {0} is not served by any bus")]
    UnknownStop(String),
    #[error("A route was found but failed to build it")]
    FailedToBuildRoute,
    #[error("Could not find a route")]
    NoRouteFound,
}

/// The frozen routing graph and its precomputed shortest path table.
/// Nothing changes after construction, so one router can be shared by any
/// number of readers.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRouter {
    settings: RoutingSettings,
    routing: RoutingGraph,
    table: PathTable,
}

impl TransportRouter {
    /// Builds the graph for every bus line and precomputes all shortest paths.
    pub fn new(repository: &Repository, settings: RoutingSettings) -> Result<Self, self::Error> {
        if !settings.is_valid() {
            return Err(self::Error::InvalidSettings(settings.bus_velocity));
        }
        let routing = GraphBuilder::new(repository, settings).build()?;
        let table = PathTable::build(&routing.graph);
        Ok(Self {
            settings,
            routing,
            table,
        })
    }

    /// Puts a router back together from stored parts, skipping both the
    /// graph construction and the search.
    pub(crate) fn from_parts(
        settings: RoutingSettings,
        routing: RoutingGraph,
        table: PathTable,
    ) -> Self {
        Self {
            settings,
            routing,
            table,
        }
    }

    pub fn settings(&self) -> &RoutingSettings {
        &self.settings
    }

    pub fn routing_graph(&self) -> &RoutingGraph {
        &self.routing
    }

    pub fn table(&self) -> &PathTable {
        &self.table
    }

    /// Fastest way from one stop to another.
    pub fn find_route(&self, from: &str, to: &str) -> Result<Itinerary, self::Error> {
        let from_vertex = self
            .routing
            .vertex_by_stop(from)
            .ok_or_else(|| self::Error::UnknownStop(from.into()))?;
        let to_vertex = self
            .routing
            .vertex_by_stop(to)
            .ok_or_else(|| self::Error::UnknownStop(to.into()))?;
        let route = self
            .table
            .query(&self.routing.graph, from_vertex, to_vertex)?;
        let from = self
            .routing
            .stop_by_vertex(from_vertex)
            .ok_or(self::Error::FailedToBuildRoute)?;
        let to = self
            .routing
            .stop_by_vertex(to_vertex)
            .ok_or(self::Error::FailedToBuildRoute)?;
        Itinerary::new(
            from.clone(),
            to.clone(),
            route,
            &self.routing,
            &self.settings,
        )
    }
}
