//! Pointer events delivered by the host's input dispatcher.

use crate::component::{Component, ComponentId};
use crate::drag::DragController;
use crate::scene::Scene;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerTarget {
    pub component: ComponentId,
    /// Grabbed joint index (None = the body).
    pub joint: Option<usize>,
}

impl PointerTarget {
    pub fn body(component: ComponentId) -> Self {
        Self {
            component,
            joint: None,
        }
    }

    pub fn joint(component: ComponentId, index: usize) -> Self {
        Self {
            component,
            joint: Some(index),
        }
    }
}

/// Pointer event in scene coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        /// Hit result from the scene graph, if it did the hit test.
        target: Option<PointerTarget>,
    },
    Move {
        position: Point,
    },
    Up {
        position: Point,
    },
    /// Release outside the canvas; ends the drag exactly like `Up`.
    UpOutside {
        position: Point,
    },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position }
            | PointerEvent::UpOutside { position } => *position,
        }
    }
}

impl<S: Scene> DragController<S> {
    /// Route a pointer event into the drag state machine.
    ///
    /// Returns the components deleted by a release.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> Vec<Component> {
        match event {
            PointerEvent::Down {
                position,
                target: Some(target),
            } => {
                self.begin_drag(position, target.component, target.joint);
                Vec::new()
            }
            PointerEvent::Down { target: None, .. } => Vec::new(),
            PointerEvent::Move { position } => {
                self.update_drag(position);
                Vec::new()
            }
            PointerEvent::Up { .. } | PointerEvent::UpOutside { .. } => self.end_drag(),
        }
    }
}
