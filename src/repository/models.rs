use std::sync::Arc;

use crate::shared::geo::Coordinate;

/// A named place where buses stop.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Stop {
    /// The index used for O(1) array lookups in the repository.
    pub index: u32,
    /// The unique stop name.
    pub name: Arc<str>,
    pub coordinate: Coordinate,
}

/// A bus line and the stops it serves.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Bus {
    /// The index used for O(1) array lookups in the repository.
    pub index: u32,
    /// The unique bus name.
    pub name: Arc<str>,
    /// Stop indexes in travel order. Lines that are not circular are already
    /// expanded into the full there-and-back trip.
    pub stops: Box<[u32]>,
    pub is_circular: bool,
    /// The last stop of the line as it was declared.
    pub last_stop: Arc<str>,
}

/// Statistics of a single bus line.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BusStat {
    /// Stops visited, counting repeats.
    pub stop_count: usize,
    pub unique_stop_count: usize,
    /// Road length in meters.
    pub route_length: u64,
    /// Road length divided by the great circle length.
    pub curvature: f64,
}
