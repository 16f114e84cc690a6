use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::{
    persistence::{
        Error, Snapshot,
        schema::{CatalogueRecord, EdgeMetadataRecord, PathEntryRecord, RouterRecord},
    },
    repository::Repository,
    router::{Edge, EdgeMetadata, Graph, PathEntry, PathRow, PathTable, RoutingGraph, TransportRouter},
    shared::{geo::Coordinate, settings::RoutingSettings},
};

macro_rules! corrupt {
    ($($arg:tt)*) => {
        Error::Corrupt(format!($($arg)*))
    };
}

impl TryFrom<CatalogueRecord> for Snapshot {
    type Error = Error;

    /// Checks every cross reference of the record before any part of it is
    /// handed out.
    fn try_from(record: CatalogueRecord) -> Result<Self, Self::Error> {
        let repository = restore_repository(&record)?;

        let routing_settings = RoutingSettings::from(record.routing_settings);
        if !routing_settings.is_valid() {
            return Err(corrupt!(
                "bus velocity {} is not positive",
                routing_settings.bus_velocity
            ));
        }
        if record.router.routing_settings != record.routing_settings {
            return Err(corrupt!("router was built with different routing settings"));
        }

        let router = restore_router(record.router, &repository, routing_settings)?;
        Ok(Snapshot {
            repository,
            render_settings: record.render_settings.into(),
            routing_settings,
            router,
        })
    }
}

fn restore_repository(record: &CatalogueRecord) -> Result<Repository, Error> {
    let mut repository = Repository::new();
    for stop in record.stops.iter() {
        let coordinate = Coordinate::from((stop.lat, stop.lng));
        repository
            .add_stop(&stop.name, coordinate)
            .map_err(|e| corrupt!("{e}"))?;
    }

    let mut pairs = HashSet::with_capacity(record.distances.len());
    for distance in record.distances.iter() {
        if !pairs.insert((distance.from_stop.as_str(), distance.to_stop.as_str())) {
            return Err(corrupt!(
                "distance from {} to {} is stored twice",
                distance.from_stop,
                distance.to_stop
            ));
        }
        repository
            .add_distance(&distance.from_stop, &distance.to_stop, distance.meters)
            .map_err(|e| corrupt!("{e}"))?;
    }

    for bus in record.buses.iter() {
        repository
            .insert_bus_route(
                &bus.name,
                &bus.stop_names,
                bus.is_circular,
                &bus.last_stop_name,
            )
            .map_err(|e| corrupt!("{e}"))?;
    }
    Ok(repository)
}

fn restore_router(
    record: RouterRecord,
    repository: &Repository,
    settings: RoutingSettings,
) -> Result<TransportRouter, Error> {
    let vertex_count = record.vertex_id_to_stop_name.len();
    let edge_count = record.edges.len();

    // Vertex names point at real stops and both maps agree
    let mut vertex_to_stop: Vec<Arc<str>> = Vec::with_capacity(vertex_count);
    for name in record.vertex_id_to_stop_name.iter() {
        let stop = repository
            .stop_by_name(name)
            .ok_or_else(|| corrupt!("vertex names unknown stop {name}"))?;
        vertex_to_stop.push(stop.name.clone());
    }
    if record.stop_name_to_vertex_id.len() != vertex_count {
        return Err(corrupt!(
            "{} stop to vertex entries for {vertex_count} vertices",
            record.stop_name_to_vertex_id.len()
        ));
    }
    let mut stop_to_vertex = HashMap::with_capacity(vertex_count);
    for (name, vertex) in record.stop_name_to_vertex_id.iter() {
        let stop_name = vertex_to_stop
            .get(*vertex as usize)
            .filter(|stop_name| &***stop_name == name.as_str())
            .ok_or_else(|| corrupt!("stop {name} maps to mismatched vertex {vertex}"))?;
        if stop_to_vertex.insert(stop_name.clone(), *vertex).is_some() {
            return Err(corrupt!("stop {name} is mapped twice"));
        }
    }

    let mut edges = Vec::with_capacity(edge_count);
    for (id, edge) in record.edges.iter().enumerate() {
        if edge.from as usize >= vertex_count || edge.to as usize >= vertex_count {
            return Err(corrupt!("edge {id} leaves the graph"));
        }
        if !edge.weight.is_finite() || edge.weight < 0.0 {
            return Err(corrupt!("edge {id} has weight {}", edge.weight));
        }
        edges.push(Edge {
            from: edge.from,
            to: edge.to,
            weight: edge.weight,
        });
    }

    if record.incidence_lists.len() != vertex_count {
        return Err(corrupt!(
            "{} incidence lists for {vertex_count} vertices",
            record.incidence_lists.len()
        ));
    }
    let mut listed = vec![false; edge_count];
    for (vertex, list) in record.incidence_lists.iter().enumerate() {
        for edge_id in list.iter() {
            let edge = edges
                .get(*edge_id as usize)
                .ok_or_else(|| corrupt!("vertex {vertex} lists unknown edge {edge_id}"))?;
            if edge.from as usize != vertex {
                return Err(corrupt!("edge {edge_id} does not start at vertex {vertex}"));
            }
            if std::mem::replace(&mut listed[*edge_id as usize], true) {
                return Err(corrupt!("edge {edge_id} is listed twice"));
            }
        }
    }
    if let Some(missing) = listed.iter().position(|seen| !seen) {
        return Err(corrupt!("edge {missing} is in no incidence list"));
    }

    if record.edge_metadata.len() != edge_count {
        return Err(corrupt!(
            "{} metadata entries for {edge_count} edges",
            record.edge_metadata.len()
        ));
    }
    let mut metadata = Vec::with_capacity(edge_count);
    for (id, entry) in record.edge_metadata.into_iter().enumerate() {
        metadata.push(restore_metadata(id, entry, &edges, repository)?);
    }

    let table = restore_table(record.path_table, &edges, vertex_count)?;
    let routing = RoutingGraph {
        graph: Graph::from_parts(edges, record.incidence_lists),
        metadata,
        stop_to_vertex,
        vertex_to_stop,
    };
    Ok(TransportRouter::from_parts(settings, routing, table))
}

fn restore_metadata(
    id: usize,
    entry: EdgeMetadataRecord,
    edges: &[Edge],
    repository: &Repository,
) -> Result<EdgeMetadata, Error> {
    match entry {
        EdgeMetadataRecord::Wait => {
            if !edges[id].is_loop() {
                return Err(corrupt!("wait edge {id} is not a loop"));
            }
            Ok(EdgeMetadata::Wait)
        }
        EdgeMetadataRecord::Bus {
            bus_name,
            span_count,
            position,
        } => {
            let bus = repository
                .bus_by_name(&bus_name)
                .ok_or_else(|| corrupt!("edge {id} rides unknown bus {bus_name}"))?;
            if position as usize != id {
                return Err(corrupt!("edge {id} claims position {position}"));
            }
            if span_count == 0 {
                return Err(corrupt!("edge {id} spans no stops"));
            }
            Ok(EdgeMetadata::Ride {
                bus: bus.name.clone(),
                span_count,
                position,
            })
        }
    }
}

fn restore_table(
    rows: Vec<Vec<Option<PathEntryRecord>>>,
    edges: &[Edge],
    vertex_count: usize,
) -> Result<PathTable, Error> {
    if rows.len() != vertex_count {
        return Err(corrupt!(
            "{} table rows for {vertex_count} vertices",
            rows.len()
        ));
    }
    let mut table: Vec<PathRow> = Vec::with_capacity(vertex_count);
    for (source, row) in rows.into_iter().enumerate() {
        if row.len() != vertex_count {
            return Err(corrupt!("table row {source} has {} entries", row.len()));
        }
        let restored: PathRow = row
            .into_iter()
            .map(|entry| {
                entry.map(|entry| PathEntry {
                    weight: entry.weight,
                    prev_edge: entry.prev_edge,
                })
            })
            .collect();

        for (target, entry) in restored.iter().enumerate() {
            let Some(entry) = entry else {
                if target == source {
                    return Err(corrupt!("vertex {source} does not reach itself"));
                }
                continue;
            };
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(corrupt!(
                    "path {source} -> {target} has weight {}",
                    entry.weight
                ));
            }
            match entry.prev_edge {
                None if target == source && entry.weight == 0.0 => {}
                None => {
                    return Err(corrupt!("path {source} -> {target} has no last edge"));
                }
                Some(_) if target == source => {
                    return Err(corrupt!("vertex {source} reaches itself through an edge"));
                }
                Some(edge_id) => {
                    let edge = edges
                        .get(edge_id as usize)
                        .ok_or_else(|| corrupt!("path {source} -> {target} ends with unknown edge {edge_id}"))?;
                    if edge.to as usize != target {
                        return Err(corrupt!(
                            "path {source} -> {target} ends with edge {edge_id} going elsewhere"
                        ));
                    }
                    let Some(before) = restored[edge.from as usize] else {
                        return Err(corrupt!(
                            "path {source} -> {target} comes from an unreached vertex"
                        ));
                    };
                    // The search stores exactly this sum, so no tolerance
                    if before.weight + edge.weight != entry.weight {
                        return Err(corrupt!(
                            "path {source} -> {target} weighs {} but its edges add up to {}",
                            entry.weight,
                            before.weight + edge.weight
                        ));
                    }
                }
            }
        }
        check_chains(&restored, edges, source)?;
        table.push(restored);
    }
    Ok(PathTable::from_rows(table))
}

#[derive(Clone, Copy, PartialEq)]
enum Walk {
    Unseen,
    Open,
    Rooted,
}

/// Every predecessor chain of a row has to lead back to its source. Each
/// vertex is walked once, a chain running into itself is a cycle.
fn check_chains(row: &PathRow, edges: &[Edge], source: usize) -> Result<(), Error> {
    let mut state = vec![Walk::Unseen; row.len()];
    state[source] = Walk::Rooted;
    let mut walk = Vec::new();

    for target in 0..row.len() {
        let mut current = target;
        while let Some(entry) = row[current]
            && state[current] == Walk::Unseen
        {
            state[current] = Walk::Open;
            walk.push(current);
            let edge = entry
                .prev_edge
                .and_then(|edge_id| edges.get(edge_id as usize))
                .ok_or_else(|| corrupt!("path {source} -> {current} has no last edge"))?;
            current = edge.from as usize;
        }
        if state[current] == Walk::Open {
            return Err(corrupt!(
                "path {source} -> {target} never leads back to {source}"
            ));
        }
        walk.drain(..).for_each(|vertex| state[vertex] = Walk::Rooted);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::settings::RenderSettings;

    fn snapshot() -> Snapshot {
        let mut repository = Repository::new();
        repository.add_stop("A", (55.0, 37.0).into()).unwrap();
        repository.add_stop("B", (55.01, 37.0).into()).unwrap();
        repository.add_distance("A", "B", 1000).unwrap();
        repository.add_bus("1", &["A", "B"], false).unwrap();
        let settings = RoutingSettings::new(2, 30.0);
        let router = TransportRouter::new(&repository, settings).unwrap();
        Snapshot {
            repository,
            render_settings: RenderSettings::default(),
            routing_settings: settings,
            router,
        }
    }

    fn record() -> CatalogueRecord {
        CatalogueRecord::from(&snapshot())
    }

    #[test]
    fn untouched_record_restores() {
        let restored = Snapshot::try_from(record()).unwrap();
        assert_eq!(restored.router, snapshot().router);
    }

    #[test]
    fn dangling_predecessor_is_rejected() {
        let mut record = record();
        let edge_count = record.router.edges.len() as u32;
        let entry = record.router.path_table[0][1].as_mut().unwrap();
        entry.prev_edge = Some(edge_count + 3);
        assert!(matches!(Snapshot::try_from(record), Err(Error::Corrupt(_))));
    }

    #[test]
    fn predecessor_must_end_at_target() {
        let mut record = record();
        // Edge 0 is the wait loop at vertex 0
        record.router.path_table[0][1].as_mut().unwrap().prev_edge = Some(0);
        assert!(matches!(Snapshot::try_from(record), Err(Error::Corrupt(_))));
    }

    #[test]
    fn path_weight_must_match_its_edges() {
        let mut record = record();
        record.router.path_table[0][1].as_mut().unwrap().weight = 0.5;
        assert!(matches!(Snapshot::try_from(record), Err(Error::Corrupt(_))));

        let mut record = self::record();
        record.router.path_table[1][0].as_mut().unwrap().weight += 1.0;
        assert!(matches!(Snapshot::try_from(record), Err(Error::Corrupt(_))));
    }

    #[test]
    fn predecessor_cycle_is_rejected() {
        // No wait and no road distances, so every edge weighs nothing
        let mut repository = Repository::new();
        repository.add_stop("A", (55.0, 37.0).into()).unwrap();
        repository.add_stop("B", (55.01, 37.0).into()).unwrap();
        repository.add_bus("1", &["A", "B"], false).unwrap();
        let settings = RoutingSettings::new(0, 30.0);
        let router = TransportRouter::new(&repository, settings).unwrap();
        let snapshot = Snapshot {
            repository,
            render_settings: RenderSettings::default(),
            routing_settings: settings,
            router,
        };
        let mut record = CatalogueRecord::from(&snapshot);
        assert!(Snapshot::try_from(record.clone()).is_ok());

        // A B A: edge 3 is the wait loop at B
        assert_eq!(record.router.edges[3].from, 1);
        assert_eq!(record.router.edges[3].to, 1);
        record.router.path_table[0][1].as_mut().unwrap().prev_edge = Some(3);
        assert!(matches!(Snapshot::try_from(record), Err(Error::Corrupt(_))));
    }

    #[test]
    fn unknown_names_are_rejected() {
        let mut record = record();
        record.router.vertex_id_to_stop_name[0] = "Z".into();
        assert!(matches!(Snapshot::try_from(record), Err(Error::Corrupt(_))));

        let mut record = self::record();
        if let EdgeMetadataRecord::Bus { bus_name, .. } = &mut record.router.edge_metadata[1] {
            *bus_name = "missing".into();
        }
        assert!(matches!(Snapshot::try_from(record), Err(Error::Corrupt(_))));

        let mut record = self::record();
        record.buses[0].stop_names.push("Z".into());
        assert!(matches!(Snapshot::try_from(record), Err(Error::Corrupt(_))));
    }

    #[test]
    fn graph_shape_is_checked() {
        let mut record = record();
        record.router.edges[1].to = 7;
        assert!(matches!(Snapshot::try_from(record), Err(Error::Corrupt(_))));

        let mut record = self::record();
        record.router.incidence_lists.pop();
        assert!(matches!(Snapshot::try_from(record), Err(Error::Corrupt(_))));

        let mut record = self::record();
        record.router.edge_metadata[1] = EdgeMetadataRecord::Wait;
        assert!(matches!(Snapshot::try_from(record), Err(Error::Corrupt(_))));

        let mut record = self::record();
        record.router.routing_settings.wait_time_minutes += 1;
        assert!(matches!(Snapshot::try_from(record), Err(Error::Corrupt(_))));
    }
}
