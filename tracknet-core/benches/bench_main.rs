use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tracknet_core::prelude::*;

/// Square grid of `side * side` nodes one unit apart, every other row one way
fn grid(side: usize) -> Network {
    let mut network = Network::new();
    let id = |i: usize, j: usize| format!("{i}_{j}");
    #[allow(clippy::cast_precision_loss)]
    let position = |i: usize, j: usize| Position::planar(i as f64, j as f64);

    for i in 0..side {
        for j in 0..side {
            network.add_node(Node::new(id(i, j), position(i, j))).unwrap();
        }
    }
    for i in 0..side {
        for j in 0..side {
            let mut neighbours = Vec::new();
            if i + 1 < side {
                neighbours.push((i + 1, j));
            }
            if j + 1 < side {
                neighbours.push((i, j + 1));
            }
            for (k, l) in neighbours {
                let geometry = Track::with_observations(
                    "edge",
                    vec![
                        Observation::untimed(position(i, j)),
                        Observation::untimed(position(k, l)),
                    ],
                );
                let orientation = if j % 2 == 0 && l == j {
                    Orientation::Forward
                } else {
                    Orientation::Double
                };
                let edge = Edge::new(format!("{}-{}", id(i, j), id(k, l)), geometry)
                    .with_orientation(orientation);
                network.add_edge(edge, &id(i, j), &id(k, l)).unwrap();
            }
        }
    }
    network
}

/// Walk with a stop every 50 points
fn stop_and_go(size: usize) -> Track {
    let mut x = 0.0;
    let observations = (0..size)
        .map(|t| {
            if (t / 50) % 2 == 0 {
                x += 5.0;
            }
            #[allow(clippy::cast_precision_loss)]
            let time = timestamp_from_secs(t as f64);
            Observation::new(Position::planar(x, 0.0), time)
        })
        .collect();
    Track::with_observations("bench", observations)
}

fn bench_shortest_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("shortest_path");
    for side in [20, 50] {
        let network = grid(side);
        let target = format!("{}_{}", side - 1, side - 1);
        group.bench_with_input(BenchmarkId::new("corner_to_corner", side), &side, |b, _| {
            b.iter(|| black_box(network.shortest_path("0_0", &target, 0.0).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("all_distances", side), &side, |b, _| {
            b.iter(|| black_box(network.shortest_path_all_distances("0_0", 0.0).unwrap()));
        });
    }
    group.finish();
}

fn bench_stops(c: &mut Criterion) {
    let mut group = c.benchmark_group("stops");
    for size in [200, 600] {
        let track = stop_and_go(size);
        group.bench_with_input(BenchmarkId::new("global", size), &track, |b, track| {
            b.iter(|| black_box(find_stops_global(track, 2.0, 20.0, 1).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("local", size), &track, |b, track| {
            b.iter(|| black_box(find_stops_local(track, 1.0, 20.0).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_shortest_path, bench_stops);
criterion_main!(benches);
