//! Canvas facade: factory, drag controller and hit testing for one diagram.

use crate::component::{Component, ComponentId};
use crate::config::EngineConfig;
use crate::connectivity::ConnectivityResolver;
use crate::drag::DragController;
use crate::error::EngineResult;
use crate::factory::{ComponentFactory, JointTable};
use crate::input::{PointerEvent, PointerTarget};
use crate::registry::ComponentRegistry;
use crate::scene::Scene;
use kurbo::{Line, Point};

/// Distance from a point to a line segment.
fn point_to_segment_dist(point: Point, segment: Line) -> f64 {
    let seg = segment.p1 - segment.p0;
    let pv = point - segment.p0;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance(segment.p0 + seg * t)
}

/// One independent diagram: its components, scene and interaction state.
#[derive(Debug)]
pub struct Canvas<S: Scene> {
    config: EngineConfig,
    factory: ComponentFactory,
    controller: DragController<S>,
}

impl<S: Scene> Canvas<S> {
    /// Create a canvas with the default configuration and joint table.
    pub fn new(scene: S) -> Self {
        let config = EngineConfig::default();
        Self {
            controller: DragController::new(scene, &config),
            factory: ComponentFactory::default(),
            config,
        }
    }

    /// Create a canvas with a custom configuration and joint table.
    pub fn with_config(scene: S, config: EngineConfig, table: JointTable) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            controller: DragController::new(scene, &config),
            factory: ComponentFactory::new(table),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn factory(&self) -> &ComponentFactory {
        &self.factory
    }

    pub fn controller(&self) -> &DragController<S> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut DragController<S> {
        &mut self.controller
    }

    pub fn registry(&self) -> &ComponentRegistry {
        self.controller.registry()
    }

    pub fn scene(&self) -> &S {
        self.controller.scene()
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.registry().get(id)
    }

    /// Stamp out a component of the named type and place it on the canvas.
    pub fn spawn(&mut self, type_name: &str, position: Point) -> EngineResult<ComponentId> {
        let component = self.factory.create(type_name, position)?;
        let id = self.controller.add_component(component)?;
        log::debug!("Spawned {} {} at {:?}", type_name, id, position);
        Ok(id)
    }

    /// Find what lies under `point` (scene coordinates), frontmost first.
    ///
    /// Joints win over bodies so that a joint sitting on another part's body can
    /// still be grabbed.
    pub fn hit_test(&self, point: Point) -> Option<PointerTarget> {
        let parent = self.scene().parent_transform();
        let tolerance = self.config.joint_hit_tolerance;
        let registry = self.registry();

        for id in registry.ids().iter().rev() {
            let Some(component) = registry.get(*id) else {
                continue;
            };
            let hit = component
                .joint_positions(parent)
                .iter()
                .position(|joint| joint.distance(point) <= tolerance);
            if let Some(index) = hit {
                return Some(PointerTarget::joint(*id, index));
            }
        }

        registry.ids().iter().rev().find_map(|id| {
            let body = registry.get(*id)?.body_segment(parent)?;
            (point_to_segment_dist(point, body) <= tolerance).then(|| PointerTarget::body(*id))
        })
    }

    /// Route a pointer event, hit testing pointer-downs that carry no target.
    ///
    /// Returns the components deleted by a release.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> Vec<Component> {
        let event = match event {
            PointerEvent::Down {
                position,
                target: None,
            } => PointerEvent::Down {
                position,
                target: self.hit_test(position),
            },
            other => other,
        };
        self.controller.handle_pointer_event(event)
    }

    /// Current group membership partition (ids sorted, groups sorted).
    pub fn groups(&self) -> Vec<Vec<ComponentId>> {
        ConnectivityResolver::partition(self.registry())
    }
}
