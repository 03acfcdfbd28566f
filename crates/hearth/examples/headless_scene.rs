//! Headless scene — the built-in systems without a window.
//!
//! Spawns a player with a follow camera and a child collider, a few
//! procedural primitives and a sun, then runs two seconds of frames with
//! scripted input and prints where everything ended up.
//!
//! Run with `RUST_LOG=debug` to see per-system detail.

use hearth::prelude::*;

fn main() {
    env_logger::init();

    let renderer = HeadlessRenderer::new();
    renderer.close_after(120);

    let mut app = App::new(World::builder().renderer(renderer.clone()).build()).setup(setup);

    // Hold D for the first second: the player turns right.
    renderer.press(Key::D);
    app.run_frames(60);
    renderer.release(Key::D);

    // F3 shows the debug overlay and collider wireframes.
    renderer.press(Key::F3);
    app.run();

    let state = renderer.state();
    println!(
        "{} frames, {} drawables, {} wireframes, {} lights",
        state.frames_rendered,
        state.entities.len(),
        state.debug_entities.len(),
        state.active_lights(),
    );
    if let Some(camera) = state.camera {
        println!("camera eye {:?} looking at {:?}", camera.eye, camera.target);
    }
}

fn setup(world: &mut World) {
    let player = world.spawn_with((
        Transform::default(),
        Movable::default(),
        Camera::default(),
        Collider::capsule(0.5, 0.2).with_debug_color(Color::BLUE),
    ));

    // A box collider that follows the player.
    let orange = Color::from_hex("#ff6600").unwrap_or(Color::YELLOW);
    let bumper = world.spawn_with((
        Transform::from_xyz(0.0, 0.0, 0.6),
        Collider::cuboid(0.3, 0.3, 0.1).with_debug_color(orange),
    ));
    world.insert(bumper, Hierarchy::child_of(player));

    world.spawn_with((Transform::default(), Light::directional(Vec3::new(1.0, 1.0, 1.0))));
    world.renderer_mut().set_ambient(0.15);

    let primitives = [
        (ProceduralMesh::Plane { width: 20.0, depth: 20.0 }, Color::GRAY, Vec3::new(0.0, -1.0, 0.0)),
        (ProceduralMesh::cube(1.0), Color::rgb(0.8, 0.2, 0.2), Vec3::new(-4.0, -0.5, 0.0)),
        (
            ProceduralMesh::Sphere { radius: 0.5, segments: 32, rings: 16 },
            Color::rgb(0.2, 0.8, 0.2),
            Vec3::new(-6.0, -0.5, 0.0),
        ),
        (
            ProceduralMesh::Cylinder { radius: 0.4, height: 1.0, segments: 32 },
            Color::rgb(0.2, 0.2, 0.8),
            Vec3::new(-8.0, -0.5, 0.0),
        ),
        (
            ProceduralMesh::Capsule { radius: 0.3, height: 0.6, segments: 32, rings: 16 },
            Color::rgb(0.9, 0.8, 0.2),
            Vec3::new(-10.0, -0.5, 0.0),
        ),
    ];
    for (mesh, color, position) in primitives {
        match world.renderer_mut().create_mesh(&mesh, color) {
            Ok(handle) => {
                world.spawn_mesh_entity(handle, Transform::from_xyz(position.x, position.y, position.z));
            }
            Err(e) => log::warn!("Skipping primitive: {e}"),
        }
    }

    let timer = world.spawn_with((Timer::repeating(0.5).with_tag("blink"),));
    log::info!("Scene ready: player {player}, timer {timer}");

    add_default_systems(world);
}
