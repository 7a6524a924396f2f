//! Scene graph collaborator.
//!
//! The engine owns the component model and computes every transform itself;
//! the scene only receives visual updates and supplies the transform of the
//! layer components live in.

use crate::component::{Component, ComponentId};
use crate::config::Tint;
use kurbo::{Affine, Line, Point, Rect};
use std::collections::HashMap;

/// Visual side of the canvas, driven by the engine.
pub trait Scene {
    /// Transform from the component layer's local space to scene coordinates.
    fn parent_transform(&self) -> Affine {
        Affine::IDENTITY
    }

    /// Bounds of the trash region, if the scene lays one out itself.
    fn deletion_bounds(&self) -> Option<Rect> {
        None
    }

    /// A component was registered and needs a node.
    fn attach(&mut self, component: &Component);

    /// A component was removed; drop its node.
    fn detach(&mut self, id: ComponentId);

    /// Position (parent-local) and rotation of a component node.
    fn set_transform(&mut self, id: ComponentId, position: Point, rotation: f64);

    fn set_alpha(&mut self, id: ComponentId, alpha: f64);

    /// Apply (`Some`) or clear (`None`) a tint.
    fn set_tint(&mut self, id: ComponentId, tint: Option<Tint>);

    /// Redraw a wire's body between its joints (scene coordinates).
    fn redraw_wire(&mut self, id: ComponentId, body: Line);

    /// Show or hide the trash overlay.
    fn set_deletion_overlay(&mut self, active: bool);
}

/// Scene that ignores every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullScene;

impl Scene for NullScene {
    fn attach(&mut self, _component: &Component) {}
    fn detach(&mut self, _id: ComponentId) {}
    fn set_transform(&mut self, _id: ComponentId, _position: Point, _rotation: f64) {}
    fn set_alpha(&mut self, _id: ComponentId, _alpha: f64) {}
    fn set_tint(&mut self, _id: ComponentId, _tint: Option<Tint>) {}
    fn redraw_wire(&mut self, _id: ComponentId, _body: Line) {}
    fn set_deletion_overlay(&mut self, _active: bool) {}
}

/// Last visual state written for one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeState {
    pub position: Point,
    pub rotation: f64,
    pub alpha: f64,
    pub tint: Option<Tint>,
    pub wire_body: Option<Line>,
}

/// In-memory scene for headless hosts and testing.
///
/// Keeps the latest state of each attached node instead of drawing it.
#[derive(Debug, Clone, Default)]
pub struct RecordingScene {
    parent: Affine,
    deletion_bounds: Option<Rect>,
    nodes: HashMap<ComponentId, NodeState>,
    detached: Vec<ComponentId>,
    overlay_active: bool,
}

impl RecordingScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the component layer under a parent transform (e.g. a scrolled canvas).
    pub fn with_parent_transform(mut self, parent: Affine) -> Self {
        self.parent = parent;
        self
    }

    /// Report a trash region from the scene layout.
    pub fn with_deletion_bounds(mut self, bounds: Rect) -> Self {
        self.deletion_bounds = Some(bounds);
        self
    }

    pub fn node(&self, id: ComponentId) -> Option<&NodeState> {
        self.nodes.get(&id)
    }

    pub fn is_attached(&self, id: ComponentId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Ids detached so far, oldest first.
    pub fn detached(&self) -> &[ComponentId] {
        &self.detached
    }

    pub fn overlay_active(&self) -> bool {
        self.overlay_active
    }
}

impl Scene for RecordingScene {
    fn parent_transform(&self) -> Affine {
        self.parent
    }

    fn deletion_bounds(&self) -> Option<Rect> {
        self.deletion_bounds
    }

    fn attach(&mut self, component: &Component) {
        let wire_body = if component.kind.supports_rotation() {
            None
        } else {
            component.body_segment(self.parent)
        };
        self.nodes.insert(
            component.id(),
            NodeState {
                position: component.position,
                rotation: component.rotation,
                alpha: 1.0,
                tint: None,
                wire_body,
            },
        );
    }

    fn detach(&mut self, id: ComponentId) {
        if self.nodes.remove(&id).is_some() {
            self.detached.push(id);
        }
    }

    fn set_transform(&mut self, id: ComponentId, position: Point, rotation: f64) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.position = position;
            node.rotation = rotation;
        }
    }

    fn set_alpha(&mut self, id: ComponentId, alpha: f64) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.alpha = alpha;
        }
    }

    fn set_tint(&mut self, id: ComponentId, tint: Option<Tint>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.tint = tint;
        }
    }

    fn redraw_wire(&mut self, id: ComponentId, body: Line) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.wire_body = Some(body);
        }
    }

    fn set_deletion_overlay(&mut self, active: bool) {
        self.overlay_active = active;
    }
}
