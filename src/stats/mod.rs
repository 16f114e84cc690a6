use std::time::Instant;

use tracing::{debug, warn};

mod responses;
pub use responses::*;

use crate::{
    repository::Repository,
    requests::{StatKind, StatRequest},
    router::{self, TransportRouter},
};

/// Answers stat requests against a loaded network. A name that matches
/// nothing is folded into the response instead of failing the batch.
pub struct RequestHandler<'a> {
    repository: &'a Repository,
    router: &'a TransportRouter,
}

impl<'a> RequestHandler<'a> {
    pub fn new(repository: &'a Repository, router: &'a TransportRouter) -> Self {
        Self { repository, router }
    }

    pub fn handle(&self, request: &StatRequest) -> StatResponse {
        let id = request.id;
        match &request.kind {
            StatKind::Bus { name } => match self.repository.bus_stat(name) {
                Some(stat) => StatResponse::bus(id, stat),
                None => StatResponse::error(id, NOT_FOUND),
            },
            StatKind::Stop { name } => match self.repository.buses_by_stop(name) {
                Some(buses) => StatResponse::stop(id, buses),
                None => StatResponse::error(id, NOT_FOUND),
            },
            StatKind::Route { from, to } => match self.router.find_route(from, to) {
                Ok(itinerary) => StatResponse::route(id, itinerary),
                Err(router::Error::FailedToBuildRoute) => {
                    warn!("Route {from} -> {to} was found but could not be built");
                    StatResponse::error(id, NOT_FOUND)
                }
                Err(_) => StatResponse::error(id, NOT_FOUND),
            },
            StatKind::Map => StatResponse::error(id, MAP_UNSUPPORTED),
        }
    }

    /// Answers every request in order.
    pub fn handle_all(&self, requests: &[StatRequest]) -> Vec<StatResponse> {
        debug!("Answering {} stat requests...", requests.len());
        let now = Instant::now();
        let responses: Vec<_> = requests.iter().map(|request| self.handle(request)).collect();
        debug!("Answering stat requests took {:?}", now.elapsed());
        responses
    }
}
