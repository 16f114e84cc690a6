use serde::Serialize;

use crate::{
    repository::BusStat,
    router::{Itinerary, Leg},
};

pub const NOT_FOUND: &str = "not found";
pub const MAP_UNSUPPORTED: &str = "map rendering is not supported";

/// One answer per stat request, serialised in the shape the request
/// document's consumers expect.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatResponse {
    Bus {
        curvature: f64,
        request_id: i64,
        route_length: u64,
        stop_count: usize,
        unique_stop_count: usize,
    },
    Stop {
        buses: Vec<String>,
        request_id: i64,
    },
    Route {
        items: Vec<RouteItem>,
        request_id: i64,
        total_time: f64,
    },
    Error {
        error_message: String,
        request_id: i64,
    },
}

impl StatResponse {
    pub fn bus(request_id: i64, stat: BusStat) -> Self {
        Self::Bus {
            curvature: stat.curvature,
            request_id,
            route_length: stat.route_length,
            stop_count: stat.stop_count,
            unique_stop_count: stat.unique_stop_count,
        }
    }

    pub fn stop(request_id: i64, buses: Vec<&str>) -> Self {
        Self::Stop {
            buses: buses.into_iter().map(String::from).collect(),
            request_id,
        }
    }

    pub fn route(request_id: i64, itinerary: Itinerary) -> Self {
        Self::Route {
            items: itinerary.legs.into_iter().map(RouteItem::from).collect(),
            request_id,
            total_time: itinerary.total_time,
        }
    }

    pub fn error(request_id: i64, message: &str) -> Self {
        Self::Error {
            error_message: message.into(),
            request_id,
        }
    }

    pub fn request_id(&self) -> i64 {
        match self {
            Self::Bus { request_id, .. }
            | Self::Stop { request_id, .. }
            | Self::Route { request_id, .. }
            | Self::Error { request_id, .. } => *request_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum RouteItem {
    Wait {
        stop_name: String,
        time: f64,
    },
    Bus {
        bus: String,
        span_count: u32,
        time: f64,
    },
}

impl From<Leg> for RouteItem {
    fn from(leg: Leg) -> Self {
        match leg {
            Leg::Wait { stop_name, time } => RouteItem::Wait {
                stop_name: stop_name.to_string(),
                time,
            },
            Leg::Ride {
                bus,
                time,
                span_count,
            } => RouteItem::Bus {
                bus: bus.to_string(),
                span_count,
                time,
            },
        }
    }
}
