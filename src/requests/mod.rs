use std::{io::Read, str::FromStr, time::Instant};

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub mod models;
pub use models::*;

use crate::{
    repository::{self, Repository},
    shared::{
        geo::Coordinate,
        settings::{RenderSettings, RoutingSettings, SerializationSettings},
    },
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Entry {index} of {section} is malformed: {source}")]
    MalformedRequest {
        section: &'static str,
        index: usize,
        source: serde_json::Error,
    },
    #[error("Base request {index} was rejected: {source}")]
    Rejected {
        index: usize,
        source: repository::Error,
    },
    #[error("Document has no {0} section")]
    MissingSection(&'static str),
}

const BASE_REQUESTS: &str = "base_requests";
const STAT_REQUESTS: &str = "stat_requests";
const ROUTING_SETTINGS: &str = "routing_settings";
const RENDER_SETTINGS: &str = "render_settings";
const SERIALIZATION_SETTINGS: &str = "serialization_settings";

/// The sections are kept as raw values so every entry can be decoded on its
/// own and a bad one reported by position.
#[derive(Deserialize, Default)]
struct RawDocument {
    #[serde(default)]
    base_requests: Vec<Value>,
    #[serde(default)]
    stat_requests: Vec<Value>,
    routing_settings: Option<Value>,
    render_settings: Option<Value>,
    serialization_settings: Option<Value>,
}

/// A parsed input document. Every section is optional, the build step and
/// the query step each need a different subset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub base_requests: Vec<BaseRequest>,
    pub stat_requests: Vec<StatRequest>,
    pub routing_settings: Option<RoutingSettings>,
    pub render_settings: Option<RenderSettings>,
    pub serialization_settings: Option<SerializationSettings>,
}

impl FromStr for Document {
    type Err = self::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_raw(serde_json::from_str(s)?)
    }
}

impl Document {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, self::Error> {
        Self::from_raw(serde_json::from_reader(reader)?)
    }

    fn from_raw(raw: RawDocument) -> Result<Self, self::Error> {
        Ok(Self {
            base_requests: decode_all(BASE_REQUESTS, raw.base_requests)?,
            stat_requests: decode_all(STAT_REQUESTS, raw.stat_requests)?,
            routing_settings: decode_section(ROUTING_SETTINGS, raw.routing_settings)?,
            render_settings: decode_section(RENDER_SETTINGS, raw.render_settings)?,
            serialization_settings: decode_section(
                SERIALIZATION_SETTINGS,
                raw.serialization_settings,
            )?,
        })
    }

    pub fn routing_settings(&self) -> Result<RoutingSettings, self::Error> {
        self.routing_settings
            .ok_or(self::Error::MissingSection(ROUTING_SETTINGS))
    }

    pub fn serialization_settings(&self) -> Result<&SerializationSettings, self::Error> {
        self.serialization_settings
            .as_ref()
            .ok_or(self::Error::MissingSection(SERIALIZATION_SETTINGS))
    }

    /// Fills a repository from the base requests. Stops go in first, then
    /// road distances, then buses, so a bus or a distance may name a stop
    /// declared further down the document.
    pub fn build_repository(&self) -> Result<Repository, self::Error> {
        let mut repository = Repository::new();

        debug!("Loading stops...");
        let now = Instant::now();
        for (index, stop) in self.stops() {
            let coordinate = Coordinate::from((stop.latitude, stop.longitude));
            repository
                .add_stop(&stop.name, coordinate)
                .map_err(|source| self::Error::Rejected { index, source })?;
        }
        debug!("Loading stops took {:?}", now.elapsed());

        debug!("Loading road distances...");
        let now = Instant::now();
        for (index, stop) in self.stops() {
            for (to, meters) in stop.road_distances.iter() {
                repository
                    .add_distance(&stop.name, to, *meters)
                    .map_err(|source| self::Error::Rejected { index, source })?;
            }
        }
        debug!("Loading road distances took {:?}", now.elapsed());

        debug!("Loading buses...");
        let now = Instant::now();
        for (index, request) in self.base_requests.iter().enumerate() {
            if let BaseRequest::Bus(bus) = request {
                repository
                    .add_bus(&bus.name, &bus.stops, bus.is_roundtrip)
                    .map_err(|source| self::Error::Rejected { index, source })?;
            }
        }
        debug!("Loading buses took {:?}", now.elapsed());

        Ok(repository)
    }

    fn stops(&self) -> impl Iterator<Item = (usize, &StopRequest)> {
        self.base_requests
            .iter()
            .enumerate()
            .filter_map(|(index, request)| match request {
                BaseRequest::Stop(stop) => Some((index, stop)),
                BaseRequest::Bus(_) => None,
            })
    }
}

fn decode_all<T: DeserializeOwned>(
    section: &'static str,
    values: Vec<Value>,
) -> Result<Vec<T>, self::Error> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value).map_err(|source| self::Error::MalformedRequest {
                section,
                index,
                source,
            })
        })
        .collect()
}

fn decode_section<T: DeserializeOwned>(
    section: &'static str,
    value: Option<Value>,
) -> Result<Option<T>, self::Error> {
    value
        .map(|value| {
            serde_json::from_value(value).map_err(|source| self::Error::MalformedRequest {
                section,
                index: 0,
                source,
            })
        })
        .transpose()
}
