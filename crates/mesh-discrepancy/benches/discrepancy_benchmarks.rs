//! Benchmarks for the discrepancy engine.
//!
//! Run with: cargo bench -p mesh-discrepancy
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p mesh-discrepancy -- --save-baseline main
//! 2. After changes: cargo bench -p mesh-discrepancy -- --baseline main

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use mesh_discrepancy::{
    DiscrepancyParams, Mesh, MissingDistancePolicy, PlacedMesh, ThresholdConfig, Vertex,
    build_weight_map, compute_discrepancy, compute_distances_at,
};

// =============================================================================
// Test Mesh Generation
// =============================================================================

/// Create an icosphere of the given radius and subdivision level, with
/// computed vertex normals.
fn create_sphere(subdivisions: u32, radius: f64) -> Mesh {
    let mut mesh = Mesh::new();

    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let a = 1.0;
    let b = 1.0 / phi;

    let ico_verts = [
        [0.0, b, -a],
        [b, a, 0.0],
        [-b, a, 0.0],
        [0.0, b, a],
        [0.0, -b, a],
        [-a, 0.0, b],
        [0.0, -b, -a],
        [a, 0.0, -b],
        [a, 0.0, b],
        [-a, 0.0, -b],
        [b, -a, 0.0],
        [-b, -a, 0.0],
    ];

    for v in &ico_verts {
        let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        mesh.vertices
            .push(Vertex::from_coords(v[0] / len, v[1] / len, v[2] / len));
    }

    let ico_faces: [[u32; 3]; 20] = [
        [0, 1, 2],
        [3, 2, 1],
        [3, 4, 5],
        [3, 8, 4],
        [0, 6, 7],
        [0, 9, 6],
        [4, 10, 11],
        [6, 11, 10],
        [2, 5, 9],
        [11, 9, 5],
        [1, 7, 8],
        [10, 8, 7],
        [3, 5, 2],
        [3, 1, 8],
        [0, 2, 9],
        [0, 7, 1],
        [6, 9, 11],
        [6, 10, 7],
        [4, 11, 5],
        [4, 8, 10],
    ];
    mesh.faces.extend_from_slice(&ico_faces);

    for _ in 0..subdivisions {
        mesh = subdivide_sphere(&mesh);
    }

    for v in &mut mesh.vertices {
        v.position.coords *= radius;
    }
    mesh.compute_vertex_normals();
    mesh
}

fn subdivide_sphere(mesh: &Mesh) -> Mesh {
    use std::collections::HashMap;

    let mut new_mesh = Mesh::new();
    new_mesh.vertices = mesh.vertices.clone();

    let mut edge_midpoints: HashMap<(u32, u32), u32> = HashMap::new();

    let mut get_midpoint = |v1: u32, v2: u32, vertices: &mut Vec<Vertex>| -> u32 {
        let key = if v1 < v2 { (v1, v2) } else { (v2, v1) };

        if let Some(&idx) = edge_midpoints.get(&key) {
            return idx;
        }

        let mid = (vertices[v1 as usize].position.coords + vertices[v2 as usize].position.coords) / 2.0;
        let mid = mid.normalize();

        let idx = vertices.len() as u32;
        vertices.push(Vertex::from_coords(mid.x, mid.y, mid.z));
        edge_midpoints.insert(key, idx);
        idx
    };

    for &[v0, v1, v2] in &mesh.faces {
        let m01 = get_midpoint(v0, v1, &mut new_mesh.vertices);
        let m12 = get_midpoint(v1, v2, &mut new_mesh.vertices);
        let m20 = get_midpoint(v2, v0, &mut new_mesh.vertices);

        new_mesh.faces.push([v0, m01, m20]);
        new_mesh.faces.push([v1, m12, m01]);
        new_mesh.faces.push([v2, m20, m12]);
        new_mesh.faces.push([m01, m12, m20]);
    }

    new_mesh
}

// =============================================================================
// Single Pass Benchmarks
// =============================================================================

fn bench_single_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("SinglePass");

    let target = create_sphere(4, 1.02); // 2562 vertices
    let test_cases = [
        ("probe_42v", create_sphere(1, 1.0)),
        ("probe_162v", create_sphere(2, 1.0)),
        ("probe_642v", create_sphere(3, 1.0)),
    ];

    for (name, probe) in &test_cases {
        group.throughput(Throughput::Elements((probe.vertex_count() * target.vertex_count()) as u64));

        group.bench_with_input(BenchmarkId::new("sequential", name), probe, |b, probe| {
            b.iter(|| compute_distances_at(black_box(probe), black_box(&target), 1.0, false))
        });
        group.bench_with_input(BenchmarkId::new("parallel", name), probe, |b, probe| {
            b.iter(|| compute_distances_at(black_box(probe), black_box(&target), 1.0, true))
        });
    }

    group.finish();
}

// =============================================================================
// Full Check Benchmarks
// =============================================================================

fn bench_full_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("FullCheck");
    group.sample_size(20);

    let low = create_sphere(2, 1.0);
    let high = create_sphere(4, 1.01);

    for (name, params) in [
        ("sequential", DiscrepancyParams::sequential()),
        ("parallel", DiscrepancyParams::default()),
    ] {
        group.bench_function(BenchmarkId::new("sphere_162v_vs_2562v", name), |b| {
            b.iter(|| {
                let result = compute_discrepancy(
                    &PlacedMesh::identity(black_box(&low)),
                    &PlacedMesh::identity(black_box(&high)),
                    &params,
                );
                build_weight_map(
                    &result.field,
                    &ThresholdConfig::default(),
                    MissingDistancePolicy::Skip,
                )
            })
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_single_pass, bench_full_check);

criterion_main!(benches);
