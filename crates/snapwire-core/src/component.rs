//! Component and joint model.

use crate::error::{EngineError, EngineResult};
use kurbo::{Affine, Line, Point, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for placed components.
pub type ComponentId = Uuid;

/// Group label assigned by the connectivity resolver.
///
/// Only meaningful until the next recompute; never store or compare across calls.
pub type GroupId = u32;

/// Closed set of component kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Two-terminal rigid power source.
    Battery,
    /// Flexible conductor whose body follows its joints.
    Wire,
    /// Any other two-terminal rigid part (resistor, bulb, switch...).
    Generic,
}

impl ComponentKind {
    /// Number of joints a well-formed component of this kind carries.
    pub const fn joint_count(self) -> usize {
        match self {
            ComponentKind::Battery | ComponentKind::Wire | ComponentKind::Generic => 2,
        }
    }

    /// Whether dragging a joint rotates the whole body around the other joint.
    ///
    /// Wires answer `false`: their joints move independently.
    pub const fn supports_rotation(self) -> bool {
        match self {
            ComponentKind::Battery | ComponentKind::Generic => true,
            ComponentKind::Wire => false,
        }
    }
}

/// A connection point local to its owning component.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    /// Offset from the owner's origin, in the owner's local space.
    pub offset: Point,
    /// Whether the last recompute found another joint within threshold.
    /// Diagnostic only.
    pub connected: bool,
    owner: ComponentId,
}

impl Joint {
    fn new(owner: ComponentId, offset: Point) -> Self {
        Self {
            offset,
            connected: false,
            owner,
        }
    }

    /// The component this joint belongs to.
    pub fn owner(&self) -> ComponentId {
        self.owner
    }
}

/// A placed part on the canvas.
#[derive(Debug, Clone)]
pub struct Component {
    id: ComponentId,
    /// Kind tag.
    pub kind: ComponentKind,
    /// Origin in the parent layer's local space.
    pub position: Point,
    /// Rotation in radians.
    pub rotation: f64,
    joints: Vec<Joint>,
    /// Group assigned by the last recompute (`None` = not connected).
    pub connected_group: Option<GroupId>,
}

impl Component {
    /// Create a component with joints at the given local offsets.
    ///
    /// Fails if the number of offsets does not match the kind's joint count.
    pub fn new(kind: ComponentKind, position: Point, offsets: &[Point]) -> EngineResult<Self> {
        if offsets.len() != kind.joint_count() {
            return Err(EngineError::JointCount {
                kind,
                expected: kind.joint_count(),
                found: offsets.len(),
            });
        }
        let id = Uuid::new_v4();
        Ok(Self {
            id,
            kind,
            position,
            rotation: 0.0,
            joints: offsets.iter().map(|&o| Joint::new(id, o)).collect(),
            connected_group: None,
        })
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    pub(crate) fn joints_mut(&mut self) -> &mut [Joint] {
        &mut self.joints
    }

    /// Whether the joint count matches what the kind requires.
    pub fn is_well_formed(&self) -> bool {
        self.joints.len() == self.kind.joint_count()
    }

    /// Index of the joint opposite `index` on a two-joint component.
    pub fn other_joint(&self, index: usize) -> Option<usize> {
        match (self.joints.len(), index) {
            (2, 0) => Some(1),
            (2, 1) => Some(0),
            _ => None,
        }
    }

    /// Transform from component-local space to the parent layer.
    pub fn local_transform(&self) -> Affine {
        Affine::translate(self.position.to_vec2()) * Affine::rotate(self.rotation)
    }

    /// Transform from component-local space to scene coordinates.
    pub fn global_transform(&self, parent: Affine) -> Affine {
        parent * self.local_transform()
    }

    /// Component origin in scene coordinates.
    pub fn global_origin(&self, parent: Affine) -> Point {
        parent * self.position
    }

    /// Scene position of a joint.
    pub fn joint_position(&self, index: usize, parent: Affine) -> Option<Point> {
        let transform = self.global_transform(parent);
        self.joints.get(index).map(|j| transform * j.offset)
    }

    /// Scene positions of all joints, in joint order.
    pub fn joint_positions(&self, parent: Affine) -> Vec<Point> {
        let transform = self.global_transform(parent);
        self.joints.iter().map(|j| transform * j.offset).collect()
    }

    /// Move a joint to a new local offset. Returns false if the index is out of range.
    pub fn set_joint_offset(&mut self, index: usize, offset: Point) -> bool {
        match self.joints.get_mut(index) {
            Some(joint) => {
                joint.offset = offset;
                true
            }
            None => false,
        }
    }

    /// Segment between the first two joints, in scene coordinates.
    ///
    /// For wires this is the visual body.
    pub fn body_segment(&self, parent: Affine) -> Option<Line> {
        let a = self.joint_position(0, parent)?;
        let b = self.joint_position(1, parent)?;
        Some(Line::new(a, b))
    }

    /// Translate the component in its parent's space.
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Build a component with an arbitrary joint list, bypassing the count check.
    #[cfg(test)]
    pub(crate) fn malformed(kind: ComponentKind, position: Point, offsets: &[Point]) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            kind,
            position,
            rotation: 0.0,
            joints: offsets.iter().map(|&o| Joint::new(id, o)).collect(),
            connected_group: None,
        }
    }
}
