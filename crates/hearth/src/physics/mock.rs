//! Scriptable in-memory backend for tests.

use std::cell::{Ref, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::{BodyDesc, BodyHandle, ColliderShape, PhysicsBackend, ShapeHandle};
use crate::error::PhysicsError;
use crate::math::{Quat, Vec3};

#[derive(Debug, Clone)]
pub(crate) struct MockBody {
    pub desc: BodyDesc,
    pub position: Vec3,
    pub rotation: Quat,
    pub active: bool,
}

#[derive(Debug, Default)]
pub(crate) struct MockState {
    pub fail_init: bool,
    pub fail_shapes: bool,
    pub fail_bodies: bool,
    pub shape_attempts: u32,
    pub live_shapes: usize,
    pub bodies_created: u32,
    pub bodies: HashMap<BodyHandle, MockBody>,
    pub steps: u32,
    pub step_sizes: Vec<f32>,
    pub broad_phase_optimizations: u32,
    pub shut_down: bool,
    shapes: HashSet<ShapeHandle>,
    next_id: u32,
}

/// Cloning shares state, so a test can keep a handle after moving the
/// backend into a world.
#[derive(Clone, Default)]
pub(crate) struct MockBackend {
    state: Rc<RefCell<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Ref<'_, MockState> {
        self.state.borrow()
    }

    pub fn fail_init(&self, fail: bool) {
        self.state.borrow_mut().fail_init = fail;
    }

    pub fn fail_shapes(&self, fail: bool) {
        self.state.borrow_mut().fail_shapes = fail;
    }

    pub fn fail_bodies(&self, fail: bool) {
        self.state.borrow_mut().fail_bodies = fail;
    }

    pub fn set_pose(&self, body: BodyHandle, position: Vec3, rotation: Quat) {
        if let Some(b) = self.state.borrow_mut().bodies.get_mut(&body) {
            b.position = position;
            b.rotation = rotation;
        }
    }

    pub fn set_active(&self, body: BodyHandle, active: bool) {
        if let Some(b) = self.state.borrow_mut().bodies.get_mut(&body) {
            b.active = active;
        }
    }
}

impl PhysicsBackend for MockBackend {
    fn init(&mut self, _gravity: Vec3) -> Result<(), PhysicsError> {
        if self.state.borrow().fail_init {
            return Err(PhysicsError::InitFailed("mock refused".to_string()));
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        let mut state = self.state.borrow_mut();
        state.bodies.clear();
        state.shapes.clear();
        state.live_shapes = 0;
        state.shut_down = true;
    }

    fn create_shape(&mut self, shape: &ColliderShape) -> Result<ShapeHandle, PhysicsError> {
        let mut state = self.state.borrow_mut();
        state.shape_attempts += 1;
        if state.fail_shapes {
            return Err(PhysicsError::UnsupportedShape(format!("{shape:?}")));
        }
        shape.validate()?;
        state.next_id += 1;
        let handle = ShapeHandle(state.next_id);
        state.shapes.insert(handle);
        state.live_shapes = state.shapes.len();
        Ok(handle)
    }

    fn release_shape(&mut self, shape: ShapeHandle) {
        let mut state = self.state.borrow_mut();
        state.shapes.remove(&shape);
        state.live_shapes = state.shapes.len();
    }

    fn create_body(
        &mut self,
        shape: ShapeHandle,
        desc: &BodyDesc,
    ) -> Result<BodyHandle, PhysicsError> {
        let mut state = self.state.borrow_mut();
        if !state.shapes.contains(&shape) {
            return Err(PhysicsError::UnknownShape(shape.0));
        }
        if state.fail_bodies {
            return Err(PhysicsError::BodyCreation("mock refused".to_string()));
        }
        state.next_id += 1;
        let handle = BodyHandle(state.next_id);
        state.bodies.insert(
            handle,
            MockBody {
                desc: *desc,
                position: desc.position,
                rotation: desc.rotation,
                active: true,
            },
        );
        state.bodies_created += 1;
        Ok(handle)
    }

    fn step(&mut self, dt: f32) {
        let mut state = self.state.borrow_mut();
        state.steps += 1;
        state.step_sizes.push(dt);
    }

    fn is_active(&self, body: BodyHandle) -> bool {
        self.state.borrow().bodies.get(&body).is_some_and(|b| b.active)
    }

    fn position(&self, body: BodyHandle) -> Option<Vec3> {
        self.state.borrow().bodies.get(&body).map(|b| b.position)
    }

    fn rotation(&self, body: BodyHandle) -> Option<Quat> {
        self.state.borrow().bodies.get(&body).map(|b| b.rotation)
    }

    fn remove_body(&mut self, body: BodyHandle) {
        self.state.borrow_mut().bodies.remove(&body);
    }

    fn optimize_broad_phase(&mut self) {
        self.state.borrow_mut().broad_phase_optimizations += 1;
    }
}
