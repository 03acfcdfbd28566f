//! Hot reload — swap a system while the loop is running.
//!
//! Watches `game_logic/` (or the directory named in a JSON config passed as
//! the first argument) for `.rs` changes. Each change reloads the `spin`
//! system, alternating between two compiled-in versions, so the cube's spin
//! direction flips every time you save a file there. Every third reload ships
//! a setup entry point instead and restarts the scene.
//!
//! If the config has a `build_command`, it runs before each reload and a
//! failing build leaves the current systems in place.

use std::time::Duration;

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

    let reload = match BuildCommand::from_config(&config.reload, load_unit) {
        Some(build) => HotReload::new(build, &config.reload),
        None => HotReload::new(load_unit, &config.reload),
    };
    let watch_dir = config.reload.watch_dir.clone();

    let renderer = HeadlessRenderer::new();
    renderer.close_after(60 * 60);
    let world = World::builder().config(config).renderer(renderer).build();

    let mut app = App::new(world).setup(setup).with_hot_reload(reload);
    if let Some(reload) = app.hot_reload_mut() {
        if let Err(e) = reload.watch(&watch_dir) {
            log::error!("{e}");
            std::process::exit(1);
        }
    }

    while !app.world.renderer().should_close() {
        if let Some(outcome) = app.frame() {
            println!("{outcome:?}");
        }
        std::thread::sleep(Duration::from_millis(16));
    }
}

fn load_unit(version: u32) -> Result<SystemUnit, ReloadError> {
    let unit = if version % 3 == 0 {
        SystemUnit::new().with_setup(setup)
    } else if version % 2 == 0 {
        SystemUnit::new().with_system("spin", spin_clockwise)
    } else {
        SystemUnit::new().with_system("spin", spin_counter_clockwise)
    };
    Ok(unit)
}

fn setup(world: &mut World) {
    let cube = world
        .renderer_mut()
        .create_mesh(&ProceduralMesh::cube(1.0), Color::RED);
    match cube {
        Ok(mesh) => {
            world.spawn_mesh_entity(mesh, Transform::default());
        }
        Err(e) => log::warn!("No cube: {e}"),
    }

    world.add_named_system("spin", spin_clockwise);
    add_default_systems(world);
}

fn spin_clockwise(world: &mut World) {
    spin(world, -45.0);
}

fn spin_counter_clockwise(world: &mut World) {
    spin(world, 45.0);
}

fn spin(world: &mut World, degrees_per_second: f32) {
    let step = degrees_per_second * world.time().delta_secs();
    for entity in world.query::<(Transform, MeshComponent)>() {
        if let Some(t) = world.get_mut::<Transform>(entity) {
            t.rotation.y += step;
        }
    }
}
