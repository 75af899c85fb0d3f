//! # Drive Control Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use drive_lib::{
    drive_ctrl::{heading_error_deg, mix_straight, steer, DriveCommand, ImuDrive, MecanumDrive, Params},
    sim::{SimParams, SimWorld},
};

fn drive_ctrl_benchmark(c: &mut Criterion) {
    // ---- Pure steering maths ----

    c.bench_function("steering::error_steer_mix", |b| {
        b.iter(|| {
            let e = heading_error_deg(black_box(-170.0), black_box(175.0));
            mix_straight(0.5, steer(e, 0.15), false)
        })
    });

    // ---- Drive leg on the simulation ----

    let world = SimWorld::new(SimParams {
        drift_dps: 2.0,
        ..SimParams::default()
    });
    let mut drive = MecanumDrive::new(Params::default(), world.wheels(), world.imu(), world.clock());

    // Far enough away that the leg never finishes while being benchmarked
    let mut leg = ImuDrive::new(DriveCommand {
        speed: 0.5,
        distance_in: 1.0e6,
        heading_deg: 0.0,
    });
    leg.tick(&mut drive);

    c.bench_function("ImuDrive::tick", |b| {
        b.iter(|| {
            let done = leg.tick(&mut drive);
            world.step(0.001);
            done
        })
    });

    c.bench_function("MecanumDrive::on_heading", |b| {
        b.iter(|| drive.on_heading(0.5, black_box(90.0), 0.1))
    });
}

criterion_group!(benches, drive_ctrl_benchmark);
criterion_main!(benches);
