//! Plain records written into the snapshot payload. Every cross reference is
//! a stop name or a dense id, never a pointer.

use serde::{Deserialize, Serialize};

use crate::{
    persistence::Snapshot,
    router::{EdgeMetadata, PathEntry},
    shared::settings::{Color, RenderSettings, RoutingSettings},
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CatalogueRecord {
    pub stops: Vec<StopRecord>,
    pub buses: Vec<BusRecord>,
    pub distances: Vec<DistanceRecord>,
    pub render_settings: RenderSettingsRecord,
    pub routing_settings: RoutingSettingsRecord,
    pub router: RouterRecord,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StopRecord {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BusRecord {
    pub name: String,
    pub is_circular: bool,
    pub last_stop_name: String,
    /// Full travel order, a line that is not circular is already expanded.
    pub stop_names: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DistanceRecord {
    pub from_stop: String,
    pub to_stop: String,
    pub meters: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ColorRecord {
    Named(String),
    Rgb { red: u8, green: u8, blue: u8 },
    Rgba {
        red: u8,
        green: u8,
        blue: u8,
        opacity: f64,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RenderSettingsRecord {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub line_width: f64,
    pub stop_radius: f64,
    pub bus_label_font_size: f64,
    pub bus_label_offset: [f64; 2],
    pub stop_label_font_size: f64,
    pub stop_label_offset: [f64; 2],
    pub underlayer_color: ColorRecord,
    pub underlayer_width: f64,
    pub color_palette: Vec<ColorRecord>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct RoutingSettingsRecord {
    pub wait_time_minutes: u32,
    pub velocity_kmh: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct EdgeRecord {
    pub from: u32,
    pub to: u32,
    pub weight: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum EdgeMetadataRecord {
    Wait,
    Bus {
        bus_name: String,
        span_count: u32,
        position: u32,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PathEntryRecord {
    pub weight: f64,
    pub prev_edge: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RouterRecord {
    pub edges: Vec<EdgeRecord>,
    pub incidence_lists: Vec<Vec<u32>>,
    /// Ordered by vertex id.
    pub stop_name_to_vertex_id: Vec<(String, u32)>,
    pub vertex_id_to_stop_name: Vec<String>,
    pub edge_metadata: Vec<EdgeMetadataRecord>,
    pub routing_settings: RoutingSettingsRecord,
    /// Indexed by source vertex, then by target vertex. None is unreached.
    pub path_table: Vec<Vec<Option<PathEntryRecord>>>,
}

impl From<&Color> for ColorRecord {
    fn from(value: &Color) -> Self {
        match value {
            Color::Named(name) => ColorRecord::Named(name.clone()),
            Color::Rgb { red, green, blue } => ColorRecord::Rgb {
                red: *red,
                green: *green,
                blue: *blue,
            },
            Color::Rgba {
                red,
                green,
                blue,
                opacity,
            } => ColorRecord::Rgba {
                red: *red,
                green: *green,
                blue: *blue,
                opacity: *opacity,
            },
        }
    }
}

impl From<ColorRecord> for Color {
    fn from(value: ColorRecord) -> Self {
        match value {
            ColorRecord::Named(name) => Color::Named(name),
            ColorRecord::Rgb { red, green, blue } => Color::Rgb { red, green, blue },
            ColorRecord::Rgba {
                red,
                green,
                blue,
                opacity,
            } => Color::Rgba {
                red,
                green,
                blue,
                opacity,
            },
        }
    }
}

impl From<&RenderSettings> for RenderSettingsRecord {
    fn from(value: &RenderSettings) -> Self {
        Self {
            width: value.width,
            height: value.height,
            padding: value.padding,
            line_width: value.line_width,
            stop_radius: value.stop_radius,
            bus_label_font_size: value.bus_label_font_size,
            bus_label_offset: value.bus_label_offset,
            stop_label_font_size: value.stop_label_font_size,
            stop_label_offset: value.stop_label_offset,
            underlayer_color: (&value.underlayer_color).into(),
            underlayer_width: value.underlayer_width,
            color_palette: value.color_palette.iter().map(ColorRecord::from).collect(),
        }
    }
}

impl From<RenderSettingsRecord> for RenderSettings {
    fn from(value: RenderSettingsRecord) -> Self {
        Self {
            width: value.width,
            height: value.height,
            padding: value.padding,
            line_width: value.line_width,
            stop_radius: value.stop_radius,
            bus_label_font_size: value.bus_label_font_size,
            bus_label_offset: value.bus_label_offset,
            stop_label_font_size: value.stop_label_font_size,
            stop_label_offset: value.stop_label_offset,
            underlayer_color: value.underlayer_color.into(),
            underlayer_width: value.underlayer_width,
            color_palette: value.color_palette.into_iter().map(Color::from).collect(),
        }
    }
}

impl From<RoutingSettings> for RoutingSettingsRecord {
    fn from(value: RoutingSettings) -> Self {
        Self {
            wait_time_minutes: value.bus_wait_time,
            velocity_kmh: value.bus_velocity,
        }
    }
}

impl From<RoutingSettingsRecord> for RoutingSettings {
    fn from(value: RoutingSettingsRecord) -> Self {
        RoutingSettings::new(value.wait_time_minutes, value.velocity_kmh)
    }
}

impl From<&EdgeMetadata> for EdgeMetadataRecord {
    fn from(value: &EdgeMetadata) -> Self {
        match value {
            EdgeMetadata::Wait => EdgeMetadataRecord::Wait,
            EdgeMetadata::Ride {
                bus,
                span_count,
                position,
            } => EdgeMetadataRecord::Bus {
                bus_name: bus.to_string(),
                span_count: *span_count,
                position: *position,
            },
        }
    }
}

impl From<&PathEntry> for PathEntryRecord {
    fn from(value: &PathEntry) -> Self {
        Self {
            weight: value.weight,
            prev_edge: value.prev_edge,
        }
    }
}

impl From<&Snapshot> for CatalogueRecord {
    fn from(snapshot: &Snapshot) -> Self {
        let repository = &snapshot.repository;
        let stop_name = |index: u32| repository.stops()[index as usize].name.to_string();

        let stops = repository
            .stops()
            .iter()
            .map(|stop| StopRecord {
                name: stop.name.to_string(),
                lat: stop.coordinate.latitude,
                lng: stop.coordinate.longitude,
            })
            .collect();

        let buses = repository
            .buses()
            .iter()
            .map(|bus| BusRecord {
                name: bus.name.to_string(),
                is_circular: bus.is_circular,
                last_stop_name: bus.last_stop.to_string(),
                stop_names: repository
                    .stops_by_bus(bus)
                    .map(|stop| stop.name.to_string())
                    .collect(),
            })
            .collect();

        let distances = repository
            .distances()
            .into_iter()
            .map(|(from, to, meters)| DistanceRecord {
                from_stop: stop_name(from),
                to_stop: stop_name(to),
                meters,
            })
            .collect();

        let routing = snapshot.router.routing_graph();
        let mut stop_name_to_vertex_id: Vec<(String, u32)> = routing
            .stop_to_vertex
            .iter()
            .map(|(name, vertex)| (name.to_string(), *vertex))
            .collect();
        stop_name_to_vertex_id.sort_unstable_by_key(|(_, vertex)| *vertex);

        let router = RouterRecord {
            edges: routing
                .graph
                .edges()
                .iter()
                .map(|edge| EdgeRecord {
                    from: edge.from,
                    to: edge.to,
                    weight: edge.weight,
                })
                .collect(),
            incidence_lists: routing.graph.incidence_lists().to_vec(),
            stop_name_to_vertex_id,
            vertex_id_to_stop_name: routing
                .vertex_to_stop
                .iter()
                .map(|name| name.to_string())
                .collect(),
            edge_metadata: routing.metadata.iter().map(EdgeMetadataRecord::from).collect(),
            routing_settings: (*snapshot.router.settings()).into(),
            path_table: snapshot
                .router
                .table()
                .rows()
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|entry| entry.as_ref().map(PathEntryRecord::from))
                        .collect()
                })
                .collect(),
        };

        Self {
            stops,
            buses,
            distances,
            render_settings: (&snapshot.render_settings).into(),
            routing_settings: snapshot.routing_settings.into(),
            router,
        }
    }
}
