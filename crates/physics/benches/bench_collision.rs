use std::hint::black_box;
use std::time::Instant;

use cubescene_math::Vector3;
use cubescene_physics::Aabb;

fn make_boxes(count: usize, spacing: f32) -> Vec<Aabb> {
    let side = (count as f32).sqrt().ceil() as usize;
    (0..count)
        .map(|i| {
            let x = (i % side) as f32 * spacing;
            let z = (i / side) as f32 * spacing;
            Aabb::from_center_half_extent(Vector3::new(x, 0.0, z), 0.6)
        })
        .collect()
}

fn bench_collide_all(box_count: usize, iterations: usize) {
    let boxes = make_boxes(box_count, 3.0);
    let mut hits = 0usize;

    let start = Instant::now();
    for i in 0..iterations {
        let t = i as f32 * 0.01;
        let center = Vector3::new(t.sin() * 10.0, 0.5, t.cos() * 10.0);
        if black_box(&boxes)
            .iter()
            .any(|b| b.intersects_sphere(black_box(center), 0.3))
        {
            hits += 1;
        }
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  collide ({box_count} boxes, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}, hits {hits}"
    );
}

fn main() {
    println!("sphere-vs-box collision benchmarks");
    for &count in &[10, 100, 1_000, 10_000] {
        bench_collide_all(count, 1_000);
    }
}
