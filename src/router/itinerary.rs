use std::sync::Arc;

use crate::{
    router::{
        Error,
        graph::{EdgeMetadata, RoutingGraph},
        table::RouteInfo,
    },
    shared::settings::RoutingSettings,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Leg {
    /// Waiting for a bus at `stop_name`.
    Wait { stop_name: Arc<str>, time: f64 },
    /// Riding `bus` over `span_count` stops.
    Ride {
        bus: Arc<str>,
        time: f64,
        span_count: u32,
    },
}

impl Leg {
    pub fn time(&self) -> f64 {
        match self {
            Leg::Wait { time, .. } | Leg::Ride { time, .. } => *time,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    pub from: Arc<str>,
    pub to: Arc<str>,
    /// Minutes from boarding at `from` to getting off at `to`.
    pub total_time: f64,
    pub legs: Vec<Leg>,
}

impl Itinerary {
    /// Splits every ride edge back into the wait at its boarding stop and
    /// the riding time itself.
    pub fn new(
        from: Arc<str>,
        to: Arc<str>,
        route: RouteInfo,
        routing: &RoutingGraph,
        settings: &RoutingSettings,
    ) -> Result<Self, Error> {
        let wait = settings.wait_minutes();
        let mut legs = Vec::with_capacity(route.edges.len() * 2);
        for edge_id in route.edges.iter() {
            let edge = routing
                .graph
                .edge(*edge_id)
                .ok_or(Error::FailedToBuildRoute)?;
            let stop_name = routing
                .stop_by_vertex(edge.from)
                .ok_or(Error::FailedToBuildRoute)?
                .clone();
            legs.push(Leg::Wait {
                stop_name,
                time: wait,
            });
            match routing.metadata.get(*edge_id as usize) {
                Some(EdgeMetadata::Ride {
                    bus, span_count, ..
                }) => legs.push(Leg::Ride {
                    bus: bus.clone(),
                    time: edge.weight - wait,
                    span_count: *span_count,
                }),
                Some(EdgeMetadata::Wait) => {}
                None => return Err(Error::FailedToBuildRoute),
            }
        }
        Ok(Self {
            from,
            to,
            total_time: route.weight,
            legs,
        })
    }
}
