use criterion::{Criterion, criterion_group, criterion_main};
use std::{hint::black_box, time::Duration};
use transport_catalogue::{
    persistence::{self, Snapshot},
    prelude::{RenderSettings, Repository, RoutingSettings, TransportRouter},
};

const GRID: usize = 12;

/// A grid of stops with one line per row and one per column.
fn grid_network() -> Repository {
    let name = |row: usize, col: usize| format!("Stop {row}-{col}");
    let mut repository = Repository::new();
    for row in 0..GRID {
        for col in 0..GRID {
            let coordinate = (55.0 + row as f64 * 0.005, 37.0 + col as f64 * 0.005).into();
            let _ = repository.add_stop(&name(row, col), coordinate);
        }
    }
    for row in 0..GRID {
        for col in 0..GRID - 1 {
            let _ = repository.add_distance(&name(row, col), &name(row, col + 1), 450);
            let _ = repository.add_distance(&name(col, row), &name(col + 1, row), 520);
        }
    }
    for line in 0..GRID {
        let across: Vec<_> = (0..GRID).map(|col| name(line, col)).collect();
        let down: Vec<_> = (0..GRID).map(|row| name(row, line)).collect();
        let _ = repository.add_bus(&format!("R{line}"), &across, false);
        let _ = repository.add_bus(&format!("C{line}"), &down, false);
    }
    repository
}

fn criterion_benchmark(c: &mut Criterion) {
    let repository = grid_network();
    let settings = RoutingSettings::new(6, 40.0);
    let Ok(router) = TransportRouter::new(&repository, settings) else {
        println!("Failed to build the router");
        return;
    };
    let snapshot = Snapshot {
        repository: repository.clone(),
        render_settings: RenderSettings::default(),
        routing_settings: settings,
        router: router.clone(),
    };
    let Ok(bytes) = persistence::encode(&snapshot) else {
        println!("Failed to encode the snapshot");
        return;
    };

    let mut group = c.benchmark_group("Catalogue");

    group.warm_up_time(Duration::from_secs(3));

    group.measurement_time(Duration::from_secs(10));

    group.bench_function("Build router", |b| {
        b.iter(|| black_box(TransportRouter::new(&repository, settings)))
    });

    group.bench_function("Find route", |b| {
        b.iter(|| black_box(router.find_route("Stop 0-0", "Stop 11-11")))
    });

    group.bench_function("Decode snapshot", |b| {
        b.iter(|| black_box(persistence::decode(&bytes)))
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
