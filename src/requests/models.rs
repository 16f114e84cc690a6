use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct StopRequest {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Road distance in meters from this stop to its neighbours.
    #[serde(default)]
    pub road_distances: BTreeMap<String, u32>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BusRequest {
    pub name: String,
    pub stops: Vec<String>,
    pub is_roundtrip: bool,
}

/// An entry of `base_requests`, describing the network itself.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum BaseRequest {
    Stop(StopRequest),
    Bus(BusRequest),
}

/// An entry of `stat_requests`, a question asked about the network.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct StatRequest {
    pub id: i64,
    #[serde(flatten)]
    pub kind: StatKind,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum StatKind {
    Bus { name: String },
    Stop { name: String },
    Map,
    Route { from: String, to: String },
}
