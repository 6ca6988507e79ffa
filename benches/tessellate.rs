use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vgmesh::{
    Batch, CapStyle, JoinStyle, Matrix, PaintModes, Path, PathSegment, RenderState, SegmentKind::*, StrokeMode,
    StrokeStyle, TessConfig,
};

/// A rounded star: arcs between straight spikes, plus a cubic notch.
fn star(points: usize) -> Path {
    let mut path = Path::new();
    let mut segs = vec![PathSegment::abs(MoveTo)];
    let mut coords = vec![50.0, 0.0];
    for i in 1..=points {
        let a = (i as f32 / points as f32) * std::f32::consts::TAU;
        let inner = a - std::f32::consts::PI / points as f32;
        segs.push(PathSegment::abs(LineTo));
        coords.extend([20.0 * inner.cos(), 20.0 * inner.sin()]);
        segs.push(PathSegment::abs(SmallCCWArcTo));
        coords.extend([40.0, 40.0, 0.0, 50.0 * a.cos(), 50.0 * a.sin()]);
    }
    segs.push(PathSegment::rel(CubicTo));
    coords.extend([-5.0, 5.0, -10.0, 5.0, -15.0, 0.0]);
    segs.push(PathSegment::abs(ClosePath));
    path.append_segments(&segs, &coords);
    path.set_stroke_style(StrokeStyle { width: 4.0, cap: CapStyle::Round, join: JoinStyle::Round, miter_limit: 4.0 });
    path
}

fn fill(c: &mut Criterion) {
    let mut g = c.benchmark_group("fill");
    for n in [8usize, 64] {
        g.bench_function(format!("star {n}"), |b| {
            b.iter(|| {
                let mut path = star(n);
                black_box(path.fill_geometry(16).map(|g| g.triangles.len()).unwrap_or(0))
            })
        });
    }
}

fn stroke(c: &mut Criterion) {
    let mut g = c.benchmark_group("stroke");
    for (name, mode) in [("simple", StrokeMode::Simple), ("full", StrokeMode::Full)] {
        g.bench_function(name, |b| {
            b.iter(|| {
                let mut path = star(32);
                black_box(path.stroke_geometry(4, mode).triangles.len())
            })
        });
    }
}

fn batch(c: &mut Criterion) {
    let config = TessConfig::default();
    let mut paths: Vec<Path> = (0..50).map(|i| star(5 + i % 7)).collect();
    c.bench_function("batch 50 paths", |b| {
        b.iter(|| {
            let mut batch = Batch::new(&config);
            let mut state = RenderState::new(config);
            for (i, path) in paths.iter_mut().enumerate() {
                state.transform = Matrix::translate((i % 10) as f32 * 120.0, (i / 10) as f32 * 120.0);
                let _ = batch.add(path, PaintModes::BOTH, &state);
            }
            black_box(batch.finish().map(|m| m.triangle_count()).unwrap_or(0))
        })
    });
}

criterion_group!(f, fill);
criterion_group!(s, stroke);
criterion_group!(b, batch);
criterion_main!(f, s, b);
