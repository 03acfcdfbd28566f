//! Physics drop — boxes and a ball fall onto a static ground plane.
//!
//! Uses the Rapier backend; run with `--features physics3d`.

use hearth::physics::rapier::RapierBackend;
use hearth::prelude::*;

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match EngineConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    let renderer = HeadlessRenderer::new();
    renderer.close_after(180);

    let world = World::builder()
        .config(config)
        .renderer(renderer)
        .physics_backend(RapierBackend::new())
        .build();

    let mut app = App::new(world).setup(setup);
    let watched: Vec<Entity> = app.world.query::<(Rigidbody, Transform)>();

    while !app.world.renderer().should_close() {
        app.frame();
        if app.world.time().frame_count() % 30 == 0 {
            for &entity in &watched {
                if let Some(t) = app.world.get::<Transform>(entity) {
                    println!(
                        "frame {:>3} {entity}: y = {:.3}",
                        app.world.time().frame_count(),
                        t.position.y
                    );
                }
            }
        }
    }
}

fn setup(world: &mut World) {
    world.spawn_with((
        Transform::from_xyz(0.0, -1.0, 0.0),
        Rigidbody::fixed().with_friction(0.8),
        Collider::plane(Vec3::Y, 0.0),
    ));

    for i in 0..3 {
        world.spawn_with((
            Transform::from_xyz(i as f32 * 1.5 - 1.5, 2.0 + i as f32, 0.0),
            Rigidbody::dynamic(),
            Collider::cuboid(0.5, 0.5, 0.5),
        ));
    }

    world.spawn_with((
        Transform::from_xyz(0.0, 6.0, 0.5),
        Rigidbody::dynamic().with_restitution(0.7).with_gravity_factor(0.5),
        Collider::sphere(0.4),
    ));

    add_default_systems(world);
}
