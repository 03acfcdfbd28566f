//! Hot reload of gameplay systems.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        HotReload                         │
//! │                                                          │
//! │  watcher ──► background thread (notify crate)            │
//! │              sends events over mpsc channel              │
//! │                         │                                │
//! │  poll() ◄───────────────┘  each matching event restarts  │
//! │     │                      the debounce window           │
//! │     ▼                                                    │
//! │  pending ──► apply(world) at the top of the next frame   │
//! │                 │                                        │
//! │                 ▼                                        │
//! │  SystemSource::load(version) ──► SystemUnit              │
//! │     ├── has setup:  world.reset(), then setup(world)     │
//! │     └── otherwise:  swap systems by registered name      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Where new code comes from is up to the [`SystemSource`]. A plain closure
//! works; [`BuildCommand`] runs an external build first and only asks its
//! inner source for the unit when the build succeeds.
//!
//! A failed reload is logged and returned. The running systems are left as
//! they were.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::ReloadConfig;
use crate::ecs::{SystemFn, World};
use crate::error::ReloadError;

/// A freshly loaded set of systems.
#[derive(Debug, Clone, Default)]
pub struct SystemUnit {
    setup: Option<SystemFn>,
    systems: HashMap<String, SystemFn>,
}

impl SystemUnit {
    pub fn new() -> Self {
        Self::default()
    }

    /// A unit with a setup entry point restarts the scene instead of
    /// swapping systems.
    pub fn with_setup(mut self, setup: SystemFn) -> Self {
        self.setup = Some(setup);
        self
    }

    pub fn with_system(mut self, name: impl Into<String>, system: SystemFn) -> Self {
        self.systems.insert(name.into(), system);
        self
    }

    pub fn setup(&self) -> Option<SystemFn> {
        self.setup
    }

    pub fn systems(&self) -> &HashMap<String, SystemFn> {
        &self.systems
    }
}

/// Produces a [`SystemUnit`] for reload number `version`.
pub trait SystemSource {
    fn load(&mut self, version: u32) -> Result<SystemUnit, ReloadError>;
}

impl<F> SystemSource for F
where
    F: FnMut(u32) -> Result<SystemUnit, ReloadError>,
{
    fn load(&mut self, version: u32) -> Result<SystemUnit, ReloadError> {
        self(version)
    }
}

/// Runs a build command, then loads from the inner source.
///
/// The reload version is exported to the command as `HEARTH_RELOAD_VERSION`.
pub struct BuildCommand<S> {
    program: String,
    args: Vec<String>,
    dir: Option<PathBuf>,
    inner: S,
}

impl<S: SystemSource> BuildCommand<S> {
    pub fn new(program: impl Into<String>, inner: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            dir: None,
            inner,
        }
    }

    /// Build from `reload.build_command`, or `None` if it is empty.
    pub fn from_config(config: &ReloadConfig, inner: S) -> Option<Self> {
        let (program, args) = config.build_command.split_first()?;
        Some(Self::new(program.clone(), inner).args(args.iter().cloned()))
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn build(&self, version: u32) -> Result<(), ReloadError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .env("HEARTH_RELOAD_VERSION", version.to_string());
        if let Some(dir) = &self.dir {
            command.current_dir(dir);
        }

        log::info!("Building v{version}: {}", self.command_line());
        let output = command.output().map_err(|source| ReloadError::Spawn {
            command: self.command_line(),
            source,
        })?;

        if !output.status.success() {
            let mut text = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
            let stdout = String::from_utf8_lossy(&output.stdout);
            if !stdout.trim().is_empty() {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(stdout.trim_end());
            }
            return Err(ReloadError::BuildFailed {
                code: output.status.code(),
                output: text,
            });
        }
        Ok(())
    }
}

impl<S: SystemSource> SystemSource for BuildCommand<S> {
    fn load(&mut self, version: u32) -> Result<SystemUnit, ReloadError> {
        self.build(version)?;
        self.inner.load(version)
    }
}

/// What a successful reload did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The world was reset and the unit's setup ran.
    SceneRestarted { version: u32 },
    /// `count` registered systems were replaced by name.
    SystemsSwapped { version: u32, count: usize },
}

/// Watches a source directory and applies reloads between frames.
pub struct HotReload {
    source: Box<dyn SystemSource>,
    /// `None` until [`watch`](Self::watch) succeeds.
    watcher: Option<RecommendedWatcher>,
    tx: mpsc::Sender<notify::Result<notify::Event>>,
    rx: mpsc::Receiver<notify::Result<notify::Event>>,
    extension: String,
    debounce: Duration,
    /// Time of the most recent change not yet turned into a pending reload.
    last_change: Option<Instant>,
    pending: bool,
    version: u32,
}

impl HotReload {
    pub fn new(source: impl SystemSource + 'static, config: &ReloadConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source: Box::new(source),
            watcher: None,
            tx,
            rx,
            extension: config.extension.clone(),
            debounce: config.debounce(),
            last_change: None,
            pending: false,
            version: 0,
        }
    }

    /// Start watching `dir` recursively for files with the configured
    /// extension.
    pub fn watch(&mut self, dir: impl AsRef<Path>) -> Result<(), ReloadError> {
        let dir = dir.as_ref();
        let watch_error = |source| ReloadError::Watch {
            path: dir.to_path_buf(),
            source,
        };

        let tx = self.tx.clone();
        let mut watcher = notify::recommended_watcher(move |res| {
            // Receiver gone means the coordinator was dropped.
            let _ = tx.send(res);
        })
        .map_err(watch_error)?;
        watcher
            .watch(dir, RecursiveMode::Recursive)
            .map_err(watch_error)?;

        log::info!("Watching {} for *.{} changes", dir.display(), self.extension);
        self.watcher = Some(watcher);
        Ok(())
    }

    /// Record a change by hand, as if the watcher had reported one.
    pub fn notify_changed(&mut self) {
        self.last_change = Some(Instant::now());
    }

    /// Drain watcher events and promote a quiet change to a pending reload.
    pub fn poll(&mut self) {
        while let Ok(res) = self.rx.try_recv() {
            match res {
                Ok(event) => {
                    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                        continue;
                    }
                    if event.paths.iter().any(|p| self.is_watched_file(p)) {
                        log::debug!("Source change: {:?}", event.paths);
                        self.notify_changed();
                    }
                }
                Err(e) => log::warn!("File watcher error: {e}"),
            }
        }

        if self
            .last_change
            .is_some_and(|changed| changed.elapsed() >= self.debounce)
        {
            self.last_change = None;
            self.pending = true;
        }
    }

    fn is_watched_file(&self, path: &Path) -> bool {
        path.extension() == Some(OsStr::new(&self.extension))
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Number of reloads attempted so far.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Load and install new systems if a reload is pending.
    pub fn apply(&mut self, world: &mut World) -> Result<Option<ReloadOutcome>, ReloadError> {
        if !self.pending {
            return Ok(None);
        }
        self.pending = false;
        self.version += 1;
        let version = self.version;

        let unit = match self.source.load(version) {
            Ok(unit) => unit,
            Err(e) => {
                log::error!("Reload v{version} failed, keeping current systems: {e}");
                return Err(e);
            }
        };

        if let Some(setup) = unit.setup {
            world.reset();
            setup(world);
            log::info!("Reload v{version}: scene restarted");
            Ok(Some(ReloadOutcome::SceneRestarted { version }))
        } else {
            let count = world.swap_systems(&unit.systems);
            log::info!("Reload v{version}: swapped {count} systems");
            Ok(Some(ReloadOutcome::SystemsSwapped { version, count }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::ModifyKind;

    #[derive(Default)]
    struct Calls(Vec<&'static str>);

    fn spin_v1(world: &mut World) {
        world.resource_or_default::<Calls>().0.push("spin_v1");
    }

    fn spin_v2(world: &mut World) {
        world.resource_or_default::<Calls>().0.push("spin_v2");
    }

    fn render(world: &mut World) {
        world.resource_or_default::<Calls>().0.push("render");
    }

    fn setup_scene(world: &mut World) {
        world.spawn();
        world.add_named_system("spin", spin_v2);
    }

    fn empty_unit(_version: u32) -> Result<SystemUnit, ReloadError> {
        Ok(SystemUnit::new())
    }

    fn instant_config() -> ReloadConfig {
        ReloadConfig {
            debounce_ms: 0,
            ..ReloadConfig::default()
        }
    }

    fn world_with_systems() -> World {
        let mut world = World::new();
        world.add_named_system("spin", spin_v1);
        world.add_named_system("render", render);
        world
    }

    #[test]
    fn nothing_pending_is_noop() {
        let mut reload = HotReload::new(empty_unit, &instant_config());
        let mut world = World::new();
        assert!(reload.apply(&mut world).unwrap().is_none());
        assert_eq!(reload.version(), 0);
    }

    #[test]
    fn swap_replaces_by_name() {
        let source = |_: u32| -> Result<SystemUnit, ReloadError> {
            Ok(SystemUnit::new().with_system("spin", spin_v2))
        };
        let mut reload = HotReload::new(source, &instant_config());
        let mut world = world_with_systems();

        reload.notify_changed();
        reload.poll();
        let outcome = reload.apply(&mut world).unwrap();
        assert_eq!(
            outcome,
            Some(ReloadOutcome::SystemsSwapped { version: 1, count: 1 })
        );

        world.run_systems();
        assert_eq!(world.resource::<Calls>().0, ["spin_v2", "render"]);
        assert!(!reload.is_pending());
    }

    #[test]
    fn setup_restarts_scene() {
        let source = |_: u32| -> Result<SystemUnit, ReloadError> {
            Ok(SystemUnit::new().with_setup(setup_scene))
        };
        let mut reload = HotReload::new(source, &instant_config());
        let mut world = world_with_systems();
        for _ in 0..5 {
            world.spawn();
        }

        reload.notify_changed();
        reload.poll();
        let outcome = reload.apply(&mut world).unwrap();

        assert_eq!(outcome, Some(ReloadOutcome::SceneRestarted { version: 1 }));
        assert_eq!(world.entity_count(), 1);
        assert_eq!(world.system_names(), ["spin"]);
    }

    #[test]
    fn failure_keeps_running_systems() {
        let source = |v: u32| -> Result<SystemUnit, ReloadError> {
            Err(ReloadError::Load(format!("bad unit {v}")))
        };
        let mut reload = HotReload::new(source, &instant_config());
        let mut world = world_with_systems();

        reload.notify_changed();
        reload.poll();
        assert!(matches!(reload.apply(&mut world), Err(ReloadError::Load(_))));
        assert_eq!(world.system_names(), ["spin", "render"]);
        assert!(!reload.is_pending());
        assert_eq!(reload.version(), 1);
    }

    #[test]
    fn debounce_holds_back_recent_changes() {
        let config = ReloadConfig {
            debounce_ms: 60_000,
            ..ReloadConfig::default()
        };
        let mut reload = HotReload::new(empty_unit, &config);
        reload.notify_changed();
        reload.poll();
        assert!(!reload.is_pending());
    }

    #[test]
    fn only_matching_extension_triggers() {
        let mut reload = HotReload::new(empty_unit, &instant_config());
        let event = |path: &str| {
            Ok(notify::Event::new(EventKind::Modify(ModifyKind::Any)).add_path(PathBuf::from(path)))
        };

        reload.tx.send(event("game_logic/notes.txt")).unwrap();
        reload.poll();
        assert!(!reload.is_pending());

        reload.tx.send(event("game_logic/systems.rs")).unwrap();
        reload.poll();
        assert!(reload.is_pending());
    }

    #[test]
    fn removal_events_are_ignored() {
        let mut reload = HotReload::new(empty_unit, &instant_config());
        let removed = notify::Event::new(EventKind::Remove(notify::event::RemoveKind::File))
            .add_path(PathBuf::from("game_logic/old.rs"));
        reload.tx.send(Ok(removed)).unwrap();
        reload.poll();
        assert!(!reload.is_pending());
    }

    #[test]
    fn watching_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut reload = HotReload::new(empty_unit, &instant_config());
        let err = reload.watch(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, ReloadError::Watch { .. }));
        assert!(!reload.is_watching());
    }

    #[test]
    fn build_command_from_empty_config_is_none() {
        assert!(BuildCommand::from_config(&ReloadConfig::default(), empty_unit).is_none());
    }

    #[test]
    fn unknown_program_is_spawn_error() {
        let mut source = BuildCommand::new("hearth-no-such-build-tool", empty_unit);
        assert!(matches!(source.load(1), Err(ReloadError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn failed_build_reports_output_and_skips_load() {
        let mut loaded = false;
        let config = ReloadConfig {
            build_command: vec![
                "sh".into(),
                "-c".into(),
                "echo broken >&2; exit 3".into(),
            ],
            ..ReloadConfig::default()
        };
        let mut source = BuildCommand::from_config(&config, |_: u32| -> Result<SystemUnit, ReloadError> {
            loaded = true;
            Ok(SystemUnit::new())
        })
        .unwrap();

        match source.load(1) {
            Err(ReloadError::BuildFailed { code, output }) => {
                assert_eq!(code, Some(3));
                assert_eq!(output, "broken");
            }
            other => panic!("expected build failure, got {:?}", other.map(|_| ())),
        }
        drop(source);
        assert!(!loaded);
    }

    #[cfg(unix)]
    #[test]
    fn successful_build_sees_version() {
        let dir = tempfile::tempdir().unwrap();
        let inner = |v: u32| -> Result<SystemUnit, ReloadError> {
            Ok(SystemUnit::new().with_system(format!("v{v}"), render))
        };
        let mut source = BuildCommand::new("sh", inner)
            .args(["-c", "echo $HEARTH_RELOAD_VERSION > version.txt"])
            .current_dir(dir.path());

        let unit = source.load(7).unwrap();
        assert!(unit.systems().contains_key("v7"));
        let written = std::fs::read_to_string(dir.path().join("version.txt")).unwrap();
        assert_eq!(written.trim(), "7");
    }
}
