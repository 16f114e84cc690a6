use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

mod models;
pub use models::*;
use thiserror::Error;

use crate::shared::geo::{Coordinate, Distance};

type NameToIndex = HashMap<Arc<str>, u32>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Stop {0} is declared more than once")]
    DuplicateStop(String),
    #[error("Bus {0} is declared more than once")]
    DuplicateBus(String),
    #[error("Stop {0} does not match any entry")]
    UnknownStop(String),
    #[error("Bus {0} has no stops")]
    EmptyRoute(String),
}

/// Owns every stop, bus line and road distance of the network.
/// Everything else refers to these records by index or by name.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    stops: Vec<Stop>,
    buses: Vec<Bus>,

    stop_lookup: NameToIndex,
    bus_lookup: NameToIndex,
    // Only the pairs that were given, never their reverse
    distances: HashMap<(u32, u32), u32>,
    stop_to_buses: Vec<Vec<u32>>,
}

impl Repository {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_stop(&mut self, name: &str, coordinate: Coordinate) -> Result<u32, self::Error> {
        if self.stop_lookup.contains_key(name) {
            return Err(self::Error::DuplicateStop(name.into()));
        }
        let index = self.stops.len() as u32;
        let name: Arc<str> = name.into();
        self.stop_lookup.insert(name.clone(), index);
        self.stops.push(Stop {
            index,
            name,
            coordinate,
        });
        self.stop_to_buses.push(Vec::new());
        Ok(index)
    }

    /// Stores the road distance going from `from` to `to`.
    /// The first value given for a pair is kept.
    pub fn add_distance(&mut self, from: &str, to: &str, meters: u32) -> Result<(), self::Error> {
        let from = self.stop_index(from)?;
        let to = self.stop_index(to)?;
        self.distances.entry((from, to)).or_insert(meters);
        Ok(())
    }

    /// Adds a bus line given by its declared stops. A line that is not
    /// circular goes back the way it came, so `[A, B, C]` is stored as
    /// `[A, B, C, B, A]`.
    pub fn add_bus<S: AsRef<str>>(
        &mut self,
        name: &str,
        stops: &[S],
        is_circular: bool,
    ) -> Result<u32, self::Error> {
        let last_stop = stops
            .last()
            .map(|stop| stop.as_ref().to_owned())
            .ok_or_else(|| self::Error::EmptyRoute(name.into()))?;
        let mut route = self.resolve_stops(stops)?;
        if !is_circular {
            let inward: Vec<u32> = route.iter().rev().skip(1).copied().collect();
            route.extend(inward);
        }
        self.push_bus(name, route, is_circular, &last_stop)
    }

    /// Adds a bus line whose stops are already in full travel order.
    pub(crate) fn insert_bus_route<S: AsRef<str>>(
        &mut self,
        name: &str,
        route: &[S],
        is_circular: bool,
        last_stop: &str,
    ) -> Result<u32, self::Error> {
        if route.is_empty() {
            return Err(self::Error::EmptyRoute(name.into()));
        }
        let route = self.resolve_stops(route)?;
        self.stop_index(last_stop)?;
        self.push_bus(name, route, is_circular, last_stop)
    }

    fn resolve_stops<S: AsRef<str>>(&self, stops: &[S]) -> Result<Vec<u32>, self::Error> {
        stops
            .iter()
            .map(|stop| self.stop_index(stop.as_ref()))
            .collect()
    }

    fn push_bus(
        &mut self,
        name: &str,
        route: Vec<u32>,
        is_circular: bool,
        last_stop: &str,
    ) -> Result<u32, self::Error> {
        if self.bus_lookup.contains_key(name) {
            return Err(self::Error::DuplicateBus(name.into()));
        }
        let index = self.buses.len() as u32;
        let last_stop = self.stops[self.stop_index(last_stop)? as usize].name.clone();
        let name: Arc<str> = name.into();
        for stop_idx in route.iter() {
            let serving = &mut self.stop_to_buses[*stop_idx as usize];
            if !serving.contains(&index) {
                serving.push(index);
            }
        }
        self.bus_lookup.insert(name.clone(), index);
        self.buses.push(Bus {
            index,
            name,
            stops: route.into(),
            is_circular,
            last_stop,
        });
        Ok(index)
    }

    fn stop_index(&self, name: &str) -> Result<u32, self::Error> {
        self.stop_lookup
            .get(name)
            .copied()
            .ok_or_else(|| self::Error::UnknownStop(name.into()))
    }

    /// All stops in the order they were added.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// All buses in the order they were added.
    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    pub fn stop_by_name(&self, name: &str) -> Option<&Stop> {
        let index = self.stop_lookup.get(name)?;
        Some(&self.stops[*index as usize])
    }

    pub fn bus_by_name(&self, name: &str) -> Option<&Bus> {
        let index = self.bus_lookup.get(name)?;
        Some(&self.buses[*index as usize])
    }

    /// Road distance between two stops. If only the opposite direction was
    /// given that value is used instead.
    pub fn distance(&self, from: u32, to: u32) -> Option<Distance> {
        self.distances
            .get(&(from, to))
            .or_else(|| self.distances.get(&(to, from)))
            .map(|meters| Distance::from(*meters))
    }

    pub fn distance_by_name(&self, from: &str, to: &str) -> Option<Distance> {
        let from = self.stop_lookup.get(from)?;
        let to = self.stop_lookup.get(to)?;
        self.distance(*from, *to)
    }

    /// The distances exactly as they were given, ordered by stop index.
    pub fn distances(&self) -> Vec<(u32, u32, u32)> {
        let mut distances: Vec<_> = self
            .distances
            .iter()
            .map(|((from, to), meters)| (*from, *to, *meters))
            .collect();
        distances.sort_unstable();
        distances
    }

    /// Returns the stops a bus passes in travel order.
    pub fn stops_by_bus<'a>(&'a self, bus: &'a Bus) -> impl Iterator<Item = &'a Stop> + 'a {
        bus.stops.iter().map(|index| &self.stops[*index as usize])
    }

    /// Returns the statistics of a bus line.
    /// If no bus is found with the given name None is returned.
    pub fn bus_stat(&self, name: &str) -> Option<BusStat> {
        let bus = self.bus_by_name(name)?;
        let unique_stop_count = bus.stops.iter().collect::<HashSet<_>>().len();

        let (road, geographic) = bus
            .stops
            .windows(2)
            .map(|pair| {
                let from = &self.stops[pair[0] as usize];
                let to = &self.stops[pair[1] as usize];
                let road = self.distance(pair[0], pair[1]).unwrap_or_default();
                (road, from.coordinate.great_circle_distance(&to.coordinate))
            })
            .fold(
                (Distance::default(), Distance::default()),
                |(road_acc, geo_acc), (road, geo)| (road_acc + road, geo_acc + geo),
            );

        let curvature = if geographic.as_meters() > 0.0 {
            road / geographic
        } else {
            0.0
        };
        Some(BusStat {
            stop_count: bus.stops.len(),
            unique_stop_count,
            route_length: road.as_meters() as u64,
            curvature,
        })
    }

    /// Returns the sorted names of the buses serving a stop.
    /// If no stop is found with the given name None is returned.
    pub fn buses_by_stop(&self, name: &str) -> Option<Vec<&str>> {
        let stop = self.stop_by_name(name)?;
        let mut names: Vec<&str> = self.stop_to_buses[stop.index as usize]
            .iter()
            .map(|bus_idx| self.buses[*bus_idx as usize].name.as_ref())
            .collect();
        names.sort_unstable();
        Some(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_stops() -> Repository {
        let mut repository = Repository::new();
        repository.add_stop("A", (55.0, 37.0).into()).unwrap();
        repository.add_stop("B", (55.01, 37.0).into()).unwrap();
        repository.add_stop("C", (55.02, 37.0).into()).unwrap();
        repository
    }

    #[test]
    fn non_circular_line_goes_back() {
        let mut repository = three_stops();
        repository.add_bus("1", &["A", "B", "C"], false).unwrap();
        let bus = repository.bus_by_name("1").unwrap();
        let names: Vec<_> = repository
            .stops_by_bus(bus)
            .map(|stop| stop.name.as_ref())
            .collect();
        assert_eq!(names, ["A", "B", "C", "B", "A"]);
        assert_eq!(bus.last_stop.as_ref(), "C");
    }

    #[test]
    fn circular_line_is_kept() {
        let mut repository = three_stops();
        repository.add_bus("1", &["A", "B", "C", "A"], true).unwrap();
        let bus = repository.bus_by_name("1").unwrap();
        assert_eq!(bus.stops.as_ref(), &[0, 1, 2, 0]);
    }

    #[test]
    fn reverse_distance_is_not_stored() {
        let mut repository = three_stops();
        repository.add_distance("A", "B", 2600).unwrap();
        assert_eq!(
            repository.distance_by_name("B", "A"),
            Some(Distance::from_meters(2600.0))
        );
        assert_eq!(repository.distances(), vec![(0, 1, 2600)]);
    }

    #[test]
    fn forward_distance_wins_over_reverse() {
        let mut repository = three_stops();
        repository.add_distance("A", "B", 100).unwrap();
        repository.add_distance("B", "A", 200).unwrap();
        assert_eq!(repository.distance(0, 1), Some(Distance::from_meters(100.0)));
        assert_eq!(repository.distance(1, 0), Some(Distance::from_meters(200.0)));
        assert_eq!(repository.distance(0, 2), None);
    }

    #[test]
    fn rejects_bad_input() {
        let mut repository = three_stops();
        assert_eq!(
            repository.add_stop("A", Coordinate::default()),
            Err(Error::DuplicateStop("A".into()))
        );
        assert_eq!(
            repository.add_bus("1", &["A", "Z"], true),
            Err(Error::UnknownStop("Z".into()))
        );
        assert_eq!(
            repository.add_bus::<&str>("1", &[], true),
            Err(Error::EmptyRoute("1".into()))
        );
        repository.add_bus("1", &["A"], true).unwrap();
        assert_eq!(
            repository.add_bus("1", &["B"], true),
            Err(Error::DuplicateBus("1".into()))
        );
        assert!(repository.add_distance("A", "Z", 5).is_err());
    }

    #[test]
    fn bus_stat_counts_expanded_route() {
        let mut repository = three_stops();
        repository.add_distance("A", "B", 1200).unwrap();
        repository.add_distance("B", "C", 1300).unwrap();
        repository.add_distance("C", "B", 1500).unwrap();
        repository.add_bus("1", &["A", "B", "C"], false).unwrap();
        let stat = repository.bus_stat("1").unwrap();
        assert_eq!(stat.stop_count, 5);
        assert_eq!(stat.unique_stop_count, 3);
        assert_eq!(stat.route_length, 1200 + 1300 + 1500 + 1200);
        assert!(stat.curvature > 1.0);
        assert!(repository.bus_stat("2").is_none());
    }

    #[test]
    fn buses_by_stop_are_sorted() {
        let mut repository = three_stops();
        repository.add_bus("b", &["A", "B"], false).unwrap();
        repository.add_bus("a", &["B", "C"], false).unwrap();
        assert_eq!(repository.buses_by_stop("B"), Some(vec!["a", "b"]));
        assert_eq!(repository.buses_by_stop("A"), Some(vec!["b"]));
        assert_eq!(repository.buses_by_stop("Z"), None);
    }
}
