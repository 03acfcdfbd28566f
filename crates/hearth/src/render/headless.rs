//! A [`Renderer`] that never opens a window.
//!
//! Every call is recorded in a shared [`HeadlessState`], so a test or a
//! headless server can hand one clone to the [`World`](crate::ecs::World) and
//! keep another to inspect what was uploaded or to script input.

use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::{
    CameraParams, DebugEntityId, LightParams, MeshHandle, ProceduralMesh, RenderEntityId,
    Renderer,
};
use crate::error::RenderError;
use crate::input::Key;
use crate::light::MAX_LIGHTS;
use crate::math::{Color, DVec2, Vec2};

/// Where a mesh came from.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshSource {
    File(PathBuf),
    Procedural(ProceduralMesh, Color),
}

/// A drawable and the last matrix uploaded for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedEntity {
    pub mesh: MeshHandle,
    pub transform: [f32; 16],
}

impl RenderedEntity {
    fn new(mesh: MeshHandle) -> Self {
        Self {
            mesh,
            transform: crate::math::Mat4::IDENTITY.to_cols_array(),
        }
    }
}

/// Everything the headless renderer has been told.
#[derive(Debug)]
pub struct HeadlessState {
    /// Live meshes. Handles are never reused after [`Renderer::remove_mesh`].
    pub meshes: BTreeMap<MeshHandle, MeshSource>,
    pub entities: BTreeMap<RenderEntityId, RenderedEntity>,
    pub debug_entities: BTreeMap<DebugEntityId, RenderedEntity>,
    pub lights: [Option<LightParams>; MAX_LIGHTS],
    pub ambient: f32,
    pub camera: Option<CameraParams>,
    pub keys: HashSet<Key>,
    pub cursor: DVec2,
    pub cursor_locked: bool,
    pub scroll: Vec2,
    pub debug_overlay: bool,
    pub frames_rendered: u64,
    pub events_polled: u64,
    /// Seconds added to `total_time` by each `update_time`.
    pub frame_time: f32,
    pub total_time: f32,
    /// Report `should_close` once this many frames were rendered.
    pub close_after: Option<u64>,
    pub fail_mesh_loads: bool,
    next_id: u32,
    next_mesh: u32,
}

impl HeadlessState {
    fn new(frame_time: f32) -> Self {
        Self {
            meshes: BTreeMap::new(),
            entities: BTreeMap::new(),
            debug_entities: BTreeMap::new(),
            lights: [None; MAX_LIGHTS],
            ambient: 0.0,
            camera: None,
            keys: HashSet::new(),
            cursor: DVec2::ZERO,
            cursor_locked: false,
            scroll: Vec2::ZERO,
            debug_overlay: false,
            frames_rendered: 0,
            events_polled: 0,
            frame_time,
            total_time: 0.0,
            close_after: None,
            fail_mesh_loads: false,
            next_id: 0,
            next_mesh: 0,
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn add_mesh(&mut self, source: MeshSource) -> MeshHandle {
        let handle = MeshHandle(self.next_mesh);
        self.next_mesh += 1;
        self.meshes.insert(handle, source);
        handle
    }

    fn check_mesh(&self, mesh: MeshHandle) -> Result<(), RenderError> {
        if self.meshes.contains_key(&mesh) {
            Ok(())
        } else {
            Err(RenderError::UnknownMesh(mesh.0))
        }
    }

    /// Number of light slots currently holding a light.
    pub fn active_lights(&self) -> usize {
        self.lights.iter().flatten().count()
    }
}

/// Shared handle to a recording renderer. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct HeadlessRenderer {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessRenderer {
    /// Advances time by 1/60 s per frame.
    pub fn new() -> Self {
        Self::with_frame_time(1.0 / 60.0)
    }

    pub fn with_frame_time(frame_time: f32) -> Self {
        Self {
            state: Rc::new(RefCell::new(HeadlessState::new(frame_time))),
        }
    }

    pub fn state(&self) -> Ref<'_, HeadlessState> {
        self.state.borrow()
    }

    pub fn press(&self, key: Key) {
        self.state.borrow_mut().keys.insert(key);
    }

    pub fn release(&self, key: Key) {
        self.state.borrow_mut().keys.remove(&key);
    }

    pub fn move_cursor(&self, x: f64, y: f64) {
        self.state.borrow_mut().cursor = DVec2::new(x, y);
    }

    /// Accumulate wheel movement until the next `reset_scroll_offset`.
    pub fn scroll(&self, dx: f32, dy: f32) {
        self.state.borrow_mut().scroll += Vec2::new(dx, dy);
    }

    pub fn close_after(&self, frames: u64) {
        self.state.borrow_mut().close_after = Some(frames);
    }

    pub fn set_fail_mesh_loads(&self, fail: bool) {
        self.state.borrow_mut().fail_mesh_loads = fail;
    }
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for HeadlessRenderer {
    fn poll_events(&mut self) {
        self.state.borrow_mut().events_polled += 1;
    }

    fn should_close(&self) -> bool {
        let state = self.state.borrow();
        state
            .close_after
            .is_some_and(|frames| state.frames_rendered >= frames)
    }

    fn render_frame(&mut self) {
        self.state.borrow_mut().frames_rendered += 1;
    }

    fn update_time(&mut self) {
        let mut state = self.state.borrow_mut();
        state.total_time += state.frame_time;
    }

    fn delta_time(&self) -> f32 {
        self.state.borrow().frame_time
    }

    fn total_time(&self) -> f32 {
        self.state.borrow().total_time
    }

    fn load_mesh(&mut self, path: &Path) -> Result<MeshHandle, RenderError> {
        let mut state = self.state.borrow_mut();
        if state.fail_mesh_loads {
            return Err(RenderError::MeshLoad {
                path: path.to_path_buf(),
                reason: "mesh loading disabled".to_string(),
            });
        }
        if !path.is_file() {
            return Err(RenderError::MeshLoad {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }

        let handle = state.add_mesh(MeshSource::File(path.to_path_buf()));
        log::debug!("Loaded mesh {handle:?} from {}", path.display());
        Ok(handle)
    }

    fn create_mesh(&mut self, mesh: &ProceduralMesh, color: Color) -> Result<MeshHandle, RenderError> {
        mesh.validate()?;
        let mut state = self.state.borrow_mut();
        let handle = state.add_mesh(MeshSource::Procedural(*mesh, color));
        Ok(handle)
    }

    fn create_entity(&mut self, mesh: MeshHandle) -> Result<RenderEntityId, RenderError> {
        let mut state = self.state.borrow_mut();
        state.check_mesh(mesh)?;
        let id = RenderEntityId(state.next_id());
        state.entities.insert(id, RenderedEntity::new(mesh));
        Ok(id)
    }

    fn remove_mesh(&mut self, mesh: MeshHandle) {
        self.state.borrow_mut().meshes.remove(&mesh);
    }

    fn remove_entity(&mut self, entity: RenderEntityId) {
        self.state.borrow_mut().entities.remove(&entity);
    }

    fn set_entity_transform(&mut self, entity: RenderEntityId, matrix: &[f32; 16]) {
        if let Some(rendered) = self.state.borrow_mut().entities.get_mut(&entity) {
            rendered.transform = *matrix;
        }
    }

    fn set_light(&mut self, slot: usize, light: &LightParams) {
        if let Some(entry) = self.state.borrow_mut().lights.get_mut(slot) {
            *entry = Some(*light);
        }
    }

    fn clear_light(&mut self, slot: usize) {
        if let Some(entry) = self.state.borrow_mut().lights.get_mut(slot) {
            *entry = None;
        }
    }

    fn set_ambient(&mut self, intensity: f32) {
        self.state.borrow_mut().ambient = intensity;
    }

    fn set_camera(&mut self, camera: &CameraParams) {
        self.state.borrow_mut().camera = Some(*camera);
    }

    fn cursor_position(&self) -> DVec2 {
        self.state.borrow().cursor
    }

    fn is_cursor_locked(&self) -> bool {
        self.state.borrow().cursor_locked
    }

    fn set_cursor_locked(&mut self, locked: bool) {
        self.state.borrow_mut().cursor_locked = locked;
    }

    fn is_key_pressed(&self, key: Key) -> bool {
        self.state.borrow().keys.contains(&key)
    }

    fn scroll_offset(&self) -> Vec2 {
        self.state.borrow().scroll
    }

    fn reset_scroll_offset(&mut self) {
        self.state.borrow_mut().scroll = Vec2::ZERO;
    }

    fn set_debug_overlay(&mut self, enabled: bool) {
        self.state.borrow_mut().debug_overlay = enabled;
    }

    fn create_debug_entity(&mut self, mesh: MeshHandle) -> Result<DebugEntityId, RenderError> {
        let mut state = self.state.borrow_mut();
        state.check_mesh(mesh)?;
        let id = DebugEntityId(state.next_id());
        state.debug_entities.insert(id, RenderedEntity::new(mesh));
        Ok(id)
    }

    fn remove_debug_entity(&mut self, entity: DebugEntityId) {
        self.state.borrow_mut().debug_entities.remove(&entity);
    }

    fn set_debug_entity_transform(&mut self, entity: DebugEntityId, matrix: &[f32; 16]) {
        if let Some(rendered) = self.state.borrow_mut().debug_entities.get_mut(&entity) {
            rendered.transform = *matrix;
        }
    }

    fn clear_debug_entities(&mut self) {
        self.state.borrow_mut().debug_entities.clear();
    }
}
