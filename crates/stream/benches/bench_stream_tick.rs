use std::hint::black_box;
use std::time::Instant;

use glam::Vec3;
use horizon_common::{Observer, ObserverId};
use horizon_kernel::Scene;
use horizon_stream::{
    RegionCoord, SessionHooks, Spiral, StreamConfig, StreamingController, TickHistory,
};

fn make_controller(retention_radius: i32, occluders: usize) -> StreamingController<Scene> {
    let scene = Scene::new()
        .with_template("ground", Vec3::ONE)
        .with_template("occluder", Vec3::splat(100.0));
    let config = StreamConfig {
        retention_radius,
        occluders_per_region: occluders,
        ..StreamConfig::default()
    }
    .with_templates("ground", "occluder");
    StreamingController::new(config, scene, SessionHooks::default())
        .expect("bench config is valid")
}

fn bench_spiral(ring_limit: i32, iterations: usize) {
    let start = Instant::now();
    for _ in 0..iterations {
        let visits = Spiral::new(black_box(RegionCoord::new(3, -4)), black_box(ring_limit)).count();
        black_box(visits);
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  spiral walk (limit={ring_limit}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_stationary(retention_radius: i32, occluders: usize, ticks: usize) {
    let mut controller = make_controller(retention_radius, occluders);
    let observer = Observer::new(ObserverId(0), Vec3::ZERO);
    let mut history = TickHistory::new(ticks);

    for _ in 0..ticks {
        let stats = controller.tick(black_box(Some(&observer)));
        history.record(stats);
    }
    println!(
        "  stationary (r={retention_radius}, occluders={occluders}, {ticks} ticks): avg {:?}, max {:?}, live regions {}",
        history.average_time(),
        history.max_time(),
        controller.grid().len()
    );
}

fn bench_moving(retention_radius: i32, speed: f32, ticks: usize) {
    let mut controller = make_controller(retention_radius, 4);
    let mut history = TickHistory::new(ticks);

    for i in 0..ticks {
        // Simulate observer walking east
        let observer = Observer::new(ObserverId(0), Vec3::new(i as f32 * speed, 0.0, 0.0));
        let stats = controller.tick(black_box(Some(&observer)));
        history.record(stats);
    }
    println!(
        "  moving (r={retention_radius}, speed={speed}/tick, {ticks} ticks): avg {:?}, max {:?}, live objects {}",
        history.average_time(),
        history.max_time(),
        controller.backend().object_count()
    );
}

fn main() {
    println!("=== Stream Tick Benchmarks ===\n");

    println!("Spiral walk:");
    bench_spiral(4, 100_000);
    bench_spiral(8, 10_000);
    bench_spiral(32, 1_000);

    println!("\nStationary observer (fill rings):");
    bench_stationary(8, 1, 300);
    bench_stationary(8, 16, 300);
    bench_stationary(16, 4, 1_200);

    println!("\nMoving observer (evict + populate):");
    bench_moving(8, 500.0, 2_000);
    bench_moving(8, 4_000.0, 2_000);

    println!("\n=== Done ===");
}
