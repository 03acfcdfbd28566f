//! # System — Functions That Operate on the World
//!
//! A system is just a function that takes `&mut World` and does something with
//! it: query entities, modify components, talk to the renderer.
//!
//! ## Design Philosophy
//!
//! - A system is `FnMut(&mut World)`.
//! - Systems run in the order they're added, once per frame, on the calling
//!   thread. Order is part of the contract: the hierarchy resolver must run
//!   before render sync, physics must create bodies before stepping.
//! - Every system carries a name. Names are how hot reload finds the entry to
//!   rebind ([`Schedule::swap_by_name`]).
//!
//! ## Naming
//!
//! [`Schedule::add_system`] derives the name from the function's type name
//! (`my_game::spin_system` → `spin_system`). Closures all share the name
//! `<closure>`, so give them one explicitly with
//! [`Schedule::add_named_system`] if they need to be swappable.
//!
//! ## Comparison
//!
//! - **hecs**: no built-in system/schedule concept at all.
//! - **bevy_ecs**: parameter injection, parallel execution, run conditions.
//!
//! We're closer to hecs, plus a name on every entry.

use std::collections::HashMap;

use super::world::World;

/// A system that can be executed on a [`World`].
///
/// Any `FnMut(&mut World)` implements this trait, so you can use closures or
/// function pointers directly.
pub trait System {
    fn run(&mut self, world: &mut World);
}

/// Blanket impl: any `FnMut(&mut World)` is a `System`.
impl<F: FnMut(&mut World)> System for F {
    fn run(&mut self, world: &mut World) {
        (self)(world);
    }
}

/// Plain function pointer form of a system, as supplied by reloaded code.
pub type SystemFn = fn(&mut World);

struct NamedSystem {
    name: String,
    system: Box<dyn System>,
}

/// Per-system timing recorded during a single run.
#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone)]
pub struct SystemTiming {
    pub name: String,
    pub duration_us: f64,
}

/// An ordered list of named systems.
pub struct Schedule {
    systems: Vec<NamedSystem>,
    /// Per-system timings from the most recent `run()` call.
    #[cfg(feature = "diagnostics")]
    timings: Vec<SystemTiming>,
}

impl Schedule {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
            #[cfg(feature = "diagnostics")]
            timings: Vec::new(),
        }
    }

    /// Add a system to the end of the schedule, named after its type.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        let name = short_system_name(std::any::type_name::<S>());
        self.add_named_system(name, system);
    }

    /// Add a system to the end of the schedule under an explicit name.
    pub fn add_named_system<S: System + 'static>(&mut self, name: impl Into<String>, system: S) {
        self.systems.push(NamedSystem {
            name: name.into(),
            system: Box::new(system),
        });
    }

    /// Run all systems in order on the given world.
    pub fn run(&mut self, world: &mut World) {
        #[cfg(feature = "diagnostics")]
        {
            self.timings.clear();
            for ns in &mut self.systems {
                let start = std::time::Instant::now();
                ns.system.run(world);
                let elapsed = start.elapsed();
                self.timings.push(SystemTiming {
                    name: ns.name.clone(),
                    duration_us: elapsed.as_secs_f64() * 1_000_000.0,
                });
            }
        }
        #[cfg(not(feature = "diagnostics"))]
        {
            for ns in &mut self.systems {
                ns.system.run(world);
            }
        }
    }

    /// Rebind every entry whose name appears in `table`.
    ///
    /// Order and unmatched entries are left untouched. Returns the number of
    /// entries replaced. Nothing checks that a replacement behaves like the
    /// function it replaces; only the signature is enforced.
    pub fn swap_by_name(&mut self, table: &HashMap<String, SystemFn>) -> usize {
        let mut swapped = 0;
        for ns in &mut self.systems {
            if let Some(replacement) = table.get(&ns.name) {
                ns.system = Box::new(*replacement);
                swapped += 1;
            }
        }
        swapped
    }

    /// Move every system of `other` to the end of this schedule.
    pub(crate) fn append(&mut self, mut other: Schedule) {
        self.systems.append(&mut other.systems);
    }

    /// Remove every system.
    pub fn clear(&mut self) {
        self.systems.clear();
        #[cfg(feature = "diagnostics")]
        self.timings.clear();
    }

    /// System names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.systems.iter().map(|ns| ns.name.as_str()).collect()
    }

    /// Returns the number of systems in this schedule.
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Timings from the most recent run, in execution order.
    #[cfg(feature = "diagnostics")]
    pub fn timings(&self) -> &[SystemTiming] {
        &self.timings
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip the module path from a fully-qualified type name, keeping only the
/// last meaningful segment (e.g. `my_game::spin_system` → `spin_system`,
/// `{{closure}}` → `<closure>`).
fn short_system_name(full: &str) -> String {
    let name = full.rsplit("::").next().unwrap_or(full);
    if name.contains("closure") {
        "<closure>".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Transform;

    fn dummy_system(_world: &mut World) {}

    fn first(world: &mut World) {
        log_call(world, "first");
    }

    fn second(world: &mut World) {
        log_call(world, "second");
    }

    fn third(world: &mut World) {
        log_call(world, "third");
    }

    fn second_v2(world: &mut World) {
        log_call(world, "second_v2");
    }

    fn third_v2(world: &mut World) {
        log_call(world, "third_v2");
    }

    #[derive(Default)]
    struct CallLog(Vec<&'static str>);

    fn log_call(world: &mut World, name: &'static str) {
        world.resource_or_default::<CallLog>().0.push(name);
    }

    #[test]
    fn schedule_captures_system_name() {
        let mut schedule = Schedule::new();
        schedule.add_system(dummy_system);
        assert_eq!(schedule.names(), vec!["dummy_system"]);
    }

    #[test]
    fn closure_system_name() {
        let mut schedule = Schedule::new();
        schedule.add_system(|_world: &mut World| {});
        schedule.add_named_system("spawner", |_world: &mut World| {});
        assert_eq!(schedule.names(), vec!["<closure>", "spawner"]);
    }

    #[test]
    fn runs_in_registration_order() {
        let mut world = World::new();
        let mut schedule = Schedule::new();
        schedule.add_system(third);
        schedule.add_system(first);
        schedule.add_system(second);

        schedule.run(&mut world);

        assert_eq!(world.resource::<CallLog>().0, vec!["third", "first", "second"]);
    }

    #[test]
    fn swap_by_name_preserves_order_and_counts_matches() {
        let mut world = World::new();
        let mut schedule = Schedule::new();
        schedule.add_system(first);
        schedule.add_system(second);
        schedule.add_system(third);

        let mut table: HashMap<String, SystemFn> = HashMap::new();
        table.insert("second".to_string(), second_v2);
        table.insert("third".to_string(), third_v2);
        table.insert("not_registered".to_string(), dummy_system);

        assert_eq!(schedule.swap_by_name(&table), 2);
        assert_eq!(schedule.names(), vec!["first", "second", "third"]);

        schedule.run(&mut world);
        assert_eq!(
            world.resource::<CallLog>().0,
            vec!["first", "second_v2", "third_v2"]
        );
    }

    #[test]
    fn swap_with_empty_table_is_noop() {
        let mut schedule = Schedule::new();
        schedule.add_system(first);
        assert_eq!(schedule.swap_by_name(&HashMap::new()), 0);
        assert_eq!(schedule.len(), 1);
    }

    #[test]
    fn stateful_closures_keep_state_between_runs() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, Transform::default());

        let mut schedule = Schedule::new();
        let mut calls = 0.0;
        schedule.add_system(move |world: &mut World| {
            calls += 1.0;
            world.get_mut::<Transform>(e).unwrap().position.x = calls;
        });

        schedule.run(&mut world);
        schedule.run(&mut world);
        assert_eq!(world.get::<Transform>(e).unwrap().position.x, 2.0);
    }

    #[cfg(feature = "diagnostics")]
    #[test]
    fn records_timings_per_system() {
        let mut world = World::new();
        let mut schedule = Schedule::new();
        schedule.add_system(first);
        schedule.add_system(second);
        schedule.run(&mut world);
        let names: Vec<_> = schedule.timings().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}
