use criterion::{black_box, criterion_group, criterion_main, Criterion};

use planesweep::{intersection_points, subcurves};

type Input = ((f64, f64), (f64, f64));

/// An n-by-n grid: every horizontal crosses every vertical.
fn grid(n: usize) -> Vec<Input> {
    let mut ret = Vec::new();
    for i in 0..n {
        let c = i as f64 + 0.5;
        ret.push(((0.0, c), (n as f64, c)));
        ret.push(((c, 0.0), (c, n as f64)));
    }
    ret
}

/// Chords of a convex polygon: lots of pairwise crossings in the middle.
fn chords(n: usize) -> Vec<Input> {
    let vertex = |i: usize| {
        let a = (i as f64) / (n as f64) * std::f64::consts::TAU;
        // Snap to a coarse grid so coordinate size stays manageable under
        // exact arithmetic.
        (((a.cos() * 64.0).round()) / 8.0, ((a.sin() * 64.0).round()) / 8.0)
    };
    let mut ret = Vec::new();
    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            ret.push((vertex(i), vertex(j)));
        }
    }
    ret
}

fn sweep_benches(c: &mut Criterion) {
    let grid_input = grid(12);
    c.bench_function("grid-12 subcurves", |b| {
        b.iter(|| subcurves(black_box(grid_input.iter().copied()), false).unwrap())
    });
    c.bench_function("grid-12 points", |b| {
        b.iter(|| intersection_points(black_box(grid_input.iter().copied()), false).unwrap())
    });

    let chord_input = chords(12);
    c.bench_function("chords-12 subcurves", |b| {
        b.iter(|| subcurves(black_box(chord_input.iter().copied()), false).unwrap())
    });
    c.bench_function("chords-12 points", |b| {
        b.iter(|| intersection_points(black_box(chord_input.iter().copied()), false).unwrap())
    });
}

criterion_group!(benches, sweep_benches);
criterion_main!(benches);
