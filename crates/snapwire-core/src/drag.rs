//! Drag state machine.
//!
//! A single session at a time drives one of three behaviors:
//! - body drag: the component follows the pointer and its group follows by
//!   the same delta;
//! - joint drag on a wire: the grabbed joint follows the pointer;
//! - joint drag on a rigid part: the part rotates about its other joint.
//!
//! Releasing commits the deletion zone first and then recomputes groups, so
//! deleted parts never take part in the new grouping.

use crate::component::{Component, ComponentId};
use crate::config::EngineConfig;
use crate::connectivity::ConnectivityResolver;
use crate::deletion::DeletionZone;
use crate::error::EngineResult;
use crate::registry::ComponentRegistry;
use crate::rotation::{rotate_about, rotation_delta};
use crate::scene::Scene;
use kurbo::{Affine, Point, Vec2};

/// Current state of the drag machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragMode {
    #[default]
    Idle,
    DraggingBody,
    DraggingJoint,
}

/// State of the active drag.
#[derive(Debug, Clone)]
pub struct DragSession {
    /// The component being dragged.
    pub target: ComponentId,
    /// The grabbed joint (None = whole body).
    pub joint: Option<usize>,
    /// Pointer position when the drag began.
    pub start_pointer: Point,
    /// Component origin minus pointer, both in scene coordinates.
    pub offset: Vec2,
    /// Pointer position at the previous update.
    pub baseline_pointer: Point,
    /// Component rotation at the previous update.
    pub baseline_rotation: f64,
}

impl DragSession {
    pub fn mode(&self) -> DragMode {
        match self.joint {
            Some(_) => DragMode::DraggingJoint,
            None => DragMode::DraggingBody,
        }
    }
}

/// Owns the live components of one canvas and drives them from pointer input.
#[derive(Debug)]
pub struct DragController<S: Scene> {
    registry: ComponentRegistry,
    zone: DeletionZone,
    resolver: ConnectivityResolver,
    scene: S,
    session: Option<DragSession>,
    drag_alpha: f64,
}

impl<S: Scene> DragController<S> {
    /// Create an empty controller.
    ///
    /// Valid trash bounds reported by the scene win over the configured ones.
    pub fn new(scene: S, config: &EngineConfig) -> Self {
        let rect = match scene.deletion_bounds() {
            Some(bounds) => match EngineConfig::validate_zone(bounds) {
                Ok(()) => bounds,
                Err(err) => {
                    log::warn!("Ignoring scene trash bounds: {}", err);
                    config.deletion_zone
                }
            },
            None => config.deletion_zone,
        };
        Self {
            registry: ComponentRegistry::new(),
            zone: DeletionZone::new(rect, config.deletion_tint),
            resolver: ConnectivityResolver::new(config.overlap_threshold),
            scene,
            session: None,
            drag_alpha: config.drag_alpha,
        }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn zone(&self) -> &DeletionZone {
        &self.zone
    }

    pub fn resolver(&self) -> &ConnectivityResolver {
        &self.resolver
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn mode(&self) -> DragMode {
        self.session.as_ref().map_or(DragMode::Idle, DragSession::mode)
    }

    /// Register a component, attach it to the scene and regroup.
    pub fn add_component(&mut self, component: Component) -> EngineResult<ComponentId> {
        let id = self.registry.add(component)?;
        if let Some(component) = self.registry.get(id) {
            self.scene.attach(component);
        }
        self.recompute();
        Ok(id)
    }

    /// Rebuild connectivity groups from the current layout.
    ///
    /// Ignored while a drag is active: groups only change once the drag settles.
    pub fn recompute(&mut self) {
        if let Some(active) = &self.session {
            log::debug!("Deferring recompute: {} is still dragging", active.target);
            return;
        }
        let parent = self.scene.parent_transform();
        self.resolver.recompute(&mut self.registry, parent);
    }

    /// Start a drag on `component`, grabbing `joint` if given.
    ///
    /// Returns false (and changes nothing) when a session is already active or
    /// the target is gone.
    pub fn begin_drag(
        &mut self,
        pointer: Point,
        component: ComponentId,
        joint: Option<usize>,
    ) -> bool {
        if let Some(active) = &self.session {
            log::debug!("Ignoring drag on {}: {} is already dragging", component, active.target);
            return false;
        }
        let parent = self.scene.parent_transform();
        let Some(target) = self.registry.get(component) else {
            log::debug!("Ignoring drag on stale component {}", component);
            return false;
        };
        if let Some(index) = joint {
            if target.joint(index).is_none() {
                log::debug!("Ignoring drag on missing joint {} of {}", index, component);
                return false;
            }
        }

        let session = DragSession {
            target: component,
            joint,
            start_pointer: pointer,
            offset: target.global_origin(parent) - pointer,
            baseline_pointer: pointer,
            baseline_rotation: target.rotation,
        };
        log::debug!("Begin {:?} on {:?} {}", session.mode(), target.kind, component);
        self.session = Some(session);

        self.scene.set_deletion_overlay(true);
        self.scene.set_alpha(component, self.drag_alpha);
        true
    }

    /// Move the active drag to `pointer`. No-op when idle or the target is gone.
    pub fn update_drag(&mut self, pointer: Point) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let parent = self.scene.parent_transform();
        let Some(component) = self.registry.get_mut(session.target) else {
            log::debug!("Drag target {} vanished", session.target);
            return;
        };

        match session.joint {
            Some(index) if component.kind.supports_rotation() => {
                let Some(pivot) = component
                    .other_joint(index)
                    .and_then(|other| component.joint_position(other, parent))
                else {
                    return;
                };
                let theta = rotation_delta(pivot, session.baseline_pointer, pointer);
                // The parent transform is angle preserving, so rotating in its
                // local space about the mapped pivot matches the scene rotation.
                let pivot_local = parent.inverse() * pivot;
                component.position = rotate_about(component.position, pivot_local, theta);
                component.rotation += theta;
                session.baseline_pointer = pointer;
                session.baseline_rotation = component.rotation;
                sync_node(&mut self.scene, component, parent);
            }
            Some(index) => {
                let local = component.global_transform(parent).inverse() * pointer;
                if component.set_joint_offset(index, local) {
                    sync_node(&mut self.scene, component, parent);
                }
                session.baseline_pointer = pointer;
            }
            None => {
                let target_local = parent.inverse() * (pointer + session.offset);
                let delta = target_local - component.position;
                component.position = target_local;
                session.baseline_pointer = pointer;
                sync_node(&mut self.scene, component, parent);

                let group = component.connected_group;
                if let Some(group) = group {
                    let target = session.target;
                    for id in self.registry.group_members(group) {
                        if id == target {
                            continue;
                        }
                        if let Some(member) = self.registry.get_mut(id) {
                            member.translate(delta);
                            sync_node(&mut self.scene, member, parent);
                        }
                    }
                }
            }
        }

        self.zone.scan(&self.registry, &mut self.scene);
    }

    /// Finish the active drag: drop feedback, delete what sits in the trash, regroup.
    ///
    /// Returns the deleted components. No-op when idle.
    pub fn end_drag(&mut self) -> Vec<Component> {
        let Some(session) = self.session.take() else {
            return Vec::new();
        };
        log::debug!("End {:?} on {}", session.mode(), session.target);

        if self.registry.contains(session.target) {
            self.scene.set_alpha(session.target, 1.0);
        }
        self.zone.clear_feedback(&mut self.scene);
        self.scene.set_deletion_overlay(false);

        let parent = self.scene.parent_transform();
        self.zone.refresh(&self.registry, parent);
        let removed = self.zone.commit(&mut self.registry, &mut self.scene);
        self.recompute();
        removed
    }
}

/// Push a component's transform (and wire body) to the scene.
fn sync_node<S: Scene>(scene: &mut S, component: &Component, parent: Affine) {
    scene.set_transform(component.id(), component.position, component.rotation);
    if !component.kind.supports_rotation() {
        if let Some(body) = component.body_segment(parent) {
            scene.redraw_wire(component.id(), body);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentKind;
    use crate::config::Tint;
    use crate::scene::RecordingScene;
    use kurbo::{Line, Rect};
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    fn controller() -> DragController<RecordingScene> {
        let config = EngineConfig {
            deletion_zone: Rect::new(700.0, 500.0, 900.0, 700.0),
            ..EngineConfig::default()
        };
        DragController::new(RecordingScene::new(), &config)
    }

    fn add(
        controller: &mut DragController<RecordingScene>,
        kind: ComponentKind,
        x: f64,
        y: f64,
        half: f64,
    ) -> ComponentId {
        let component = Component::new(
            kind,
            Point::new(x, y),
            &[Point::new(-half, 0.0), Point::new(half, 0.0)],
        )
        .unwrap();
        controller.add_component(component).unwrap()
    }

    fn assert_point_eq(a: Point, b: Point) {
        assert!((a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6, "{a:?} != {b:?}");
    }

    #[test]
    fn test_mode_transitions() {
        let mut controller = controller();
        let id = add(&mut controller, ComponentKind::Generic, 100.0, 100.0, 30.0);
        assert_eq!(controller.mode(), DragMode::Idle);

        assert!(controller.begin_drag(Point::new(100.0, 100.0), id, None));
        assert_eq!(controller.mode(), DragMode::DraggingBody);
        controller.end_drag();
        assert_eq!(controller.mode(), DragMode::Idle);

        assert!(controller.begin_drag(Point::new(130.0, 100.0), id, Some(1)));
        assert_eq!(controller.mode(), DragMode::DraggingJoint);
        controller.end_drag();
        assert_eq!(controller.mode(), DragMode::Idle);
    }

    #[test]
    fn test_second_begin_is_ignored() {
        let mut controller = controller();
        let a = add(&mut controller, ComponentKind::Generic, 100.0, 100.0, 30.0);
        let b = add(&mut controller, ComponentKind::Generic, 300.0, 100.0, 30.0);

        assert!(controller.begin_drag(Point::new(100.0, 100.0), a, None));
        assert!(!controller.begin_drag(Point::new(300.0, 100.0), b, Some(0)));
        let session = controller.session().unwrap();
        assert_eq!(session.target, a);
        assert_eq!(session.joint, None);
    }

    #[test]
    fn test_begin_rejects_stale_target_and_joint() {
        let mut controller = controller();
        let id = add(&mut controller, ComponentKind::Generic, 100.0, 100.0, 30.0);
        assert!(!controller.begin_drag(Point::ZERO, uuid::Uuid::new_v4(), None));
        assert!(!controller.begin_drag(Point::ZERO, id, Some(5)));
        assert_eq!(controller.mode(), DragMode::Idle);
        assert!(!controller.scene().overlay_active());
    }

    #[test]
    fn test_idle_updates_are_noops() {
        let mut controller = controller();
        let id = add(&mut controller, ComponentKind::Generic, 100.0, 100.0, 30.0);
        controller.update_drag(Point::new(500.0, 500.0));
        assert!(controller.end_drag().is_empty());
        assert_eq!(controller.registry().get(id).unwrap().position, Point::new(100.0, 100.0));
    }

    #[test]
    fn test_feedback_during_drag() {
        let mut controller = controller();
        let id = add(&mut controller, ComponentKind::Battery, 100.0, 100.0, 50.0);
        controller.begin_drag(Point::new(100.0, 100.0), id, None);
        assert!(controller.scene().overlay_active());
        assert!((controller.scene().node(id).unwrap().alpha - 0.5).abs() < EPS);

        controller.end_drag();
        assert!(!controller.scene().overlay_active());
        assert!((controller.scene().node(id).unwrap().alpha - 1.0).abs() < EPS);
    }

    #[test]
    fn test_body_drag_keeps_grab_offset() {
        let mut controller = controller();
        let id = add(&mut controller, ComponentKind::Generic, 100.0, 100.0, 30.0);
        controller.begin_drag(Point::new(110.0, 95.0), id, None);
        controller.update_drag(Point::new(160.0, 75.0));

        let component = controller.registry().get(id).unwrap();
        assert_point_eq(component.position, Point::new(150.0, 80.0));
        assert_point_eq(controller.scene().node(id).unwrap().position, Point::new(150.0, 80.0));
    }

    #[test]
    fn test_group_moves_rigidly() {
        let mut controller = controller();
        let a = add(&mut controller, ComponentKind::Generic, 100.0, 100.0, 30.0);
        let b = add(&mut controller, ComponentKind::Battery, 180.0, 100.0, 50.0);
        let far = add(&mut controller, ComponentKind::Generic, 400.0, 400.0, 30.0);
        assert_eq!(
            controller.registry().get(a).unwrap().connected_group,
            controller.registry().get(b).unwrap().connected_group
        );
        controller.begin_drag(Point::new(180.0, 100.0), b, Some(1));
        controller.update_drag(Point::new(180.0, 200.0));
        // Rotating one member leaves the rest of its group in place.
        assert_point_eq(controller.registry().get(a).unwrap().position, Point::new(100.0, 100.0));
        assert!(controller.registry().get(a).unwrap().rotation.abs() < EPS);
        controller.end_drag();
        let b_rotation = controller.registry().get(b).unwrap().rotation;
        let b_position = controller.registry().get(b).unwrap().position;
        assert_eq!(
            controller.registry().get(a).unwrap().connected_group,
            controller.registry().get(b).unwrap().connected_group
        );

        controller.begin_drag(Point::new(100.0, 100.0), a, None);
        controller.update_drag(Point::new(125.0, 90.0));
        controller.update_drag(Point::new(150.0, 80.0));

        let moved = controller.registry().get(b).unwrap();
        assert_point_eq(moved.position, b_position + Vec2::new(50.0, -20.0));
        assert!((moved.rotation - b_rotation).abs() < EPS);
        assert_point_eq(controller.registry().get(far).unwrap().position, Point::new(400.0, 400.0));
    }

    #[test]
    fn test_rigid_joint_drag_rotates_about_pivot() {
        let mut controller = controller();
        let id = add(&mut controller, ComponentKind::Battery, 100.0, 100.0, 50.0);
        let pivot = controller
            .registry()
            .get(id)
            .unwrap()
            .joint_position(0, Affine::IDENTITY)
            .unwrap();

        controller.begin_drag(Point::new(150.0, 100.0), id, Some(1));
        // Sweep a quarter turn in small steps.
        let steps = 12;
        for step in 1..=steps {
            let angle = FRAC_PI_2 * f64::from(step) / f64::from(steps);
            controller.update_drag(Point::new(
                50.0 + 100.0 * angle.cos(),
                100.0 + 100.0 * angle.sin(),
            ));
        }

        let component = controller.registry().get(id).unwrap();
        assert!((component.rotation - FRAC_PI_2).abs() < 1e-9);
        assert_point_eq(component.joint_position(0, Affine::IDENTITY).unwrap(), pivot);
        assert_point_eq(
            component.joint_position(1, Affine::IDENTITY).unwrap(),
            Point::new(50.0, 200.0),
        );
        assert!((controller.session().unwrap().baseline_rotation - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_under_scaled_parent_keeps_pivot() {
        let scene = RecordingScene::new()
            .with_parent_transform(Affine::translate((40.0, -10.0)) * Affine::scale(2.0));
        let mut controller = DragController::new(scene, &EngineConfig::default());
        let component = Component::new(
            ComponentKind::Generic,
            Point::new(100.0, 100.0),
            &[Point::new(-30.0, 0.0), Point::new(30.0, 0.0)],
        )
        .unwrap();
        let id = controller.add_component(component).unwrap();
        let parent = controller.scene().parent_transform();
        let pivot = controller.registry().get(id).unwrap().joint_position(0, parent).unwrap();
        let grab = controller.registry().get(id).unwrap().joint_position(1, parent).unwrap();

        controller.begin_drag(grab, id, Some(1));
        controller.update_drag(Point::new(pivot.x, pivot.y + 60.0));

        let component = controller.registry().get(id).unwrap();
        assert!((component.rotation - FRAC_PI_2).abs() < 1e-9);
        assert_point_eq(component.joint_position(0, parent).unwrap(), pivot);
        assert_point_eq(component.position, Point::new(70.0, 130.0));
    }

    #[test]
    fn test_wire_joint_follows_pointer() {
        let mut controller = controller();
        let id = add(&mut controller, ComponentKind::Wire, 300.0, 300.0, 40.0);
        controller.begin_drag(Point::new(260.0, 300.0), id, Some(0));
        controller.update_drag(Point::new(250.0, 340.0));

        let wire = controller.registry().get(id).unwrap();
        assert!(wire.rotation.abs() < EPS);
        assert_point_eq(wire.position, Point::new(300.0, 300.0));
        assert_point_eq(
            wire.joint_position(0, Affine::IDENTITY).unwrap(),
            Point::new(250.0, 340.0),
        );
        assert_point_eq(
            wire.joint_position(1, Affine::IDENTITY).unwrap(),
            Point::new(340.0, 300.0),
        );
        assert_eq!(
            controller.scene().node(id).unwrap().wire_body,
            Some(Line::new((250.0, 340.0), (340.0, 300.0)))
        );
    }

    #[test]
    fn test_scan_runs_on_every_update() {
        let mut controller = controller();
        let id = add(&mut controller, ComponentKind::Generic, 100.0, 100.0, 30.0);
        controller.begin_drag(Point::new(100.0, 100.0), id, None);
        controller.update_drag(Point::new(800.0, 600.0));
        assert_eq!(controller.zone().candidates(), &[id]);
        assert_eq!(controller.scene().node(id).unwrap().tint, Some(Tint::red()));

        controller.update_drag(Point::new(600.0, 600.0));
        assert!(controller.zone().candidates().is_empty());
        assert_eq!(controller.scene().node(id).unwrap().tint, None);
    }

    #[test]
    fn test_release_in_zone_deletes_before_regrouping() {
        let mut controller = controller();
        // `keeper` reaches into the zone with one joint only.
        let keeper = add(&mut controller, ComponentKind::Generic, 690.0, 600.0, 30.0);
        let doomed = add(&mut controller, ComponentKind::Generic, 100.0, 100.0, 30.0);

        controller.begin_drag(Point::new(100.0, 100.0), doomed, None);
        // Left joint lands on keeper's right joint.
        controller.update_drag(Point::new(750.0, 600.0));
        let removed = controller.end_drag();

        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id(), doomed);
        assert!(!controller.registry().contains(doomed));
        assert!(!controller.scene().is_attached(doomed));
        assert!(controller.registry().contains(keeper));
        assert_eq!(controller.registry().get(keeper).unwrap().connected_group, None);
        assert_eq!(controller.scene().node(keeper).unwrap().tint, None);
    }

    #[test]
    fn test_partial_containment_survives_release() {
        let mut controller = controller();
        let id = add(&mut controller, ComponentKind::Generic, 100.0, 100.0, 30.0);
        controller.begin_drag(Point::new(100.0, 100.0), id, None);
        controller.update_drag(Point::new(710.0, 600.0)); // left joint at 680, outside
        assert!(controller.end_drag().is_empty());
        assert!(controller.registry().contains(id));
    }

    #[test]
    fn test_drag_on_deleted_component_is_ignored() {
        let mut controller = controller();
        let id = add(&mut controller, ComponentKind::Generic, 800.0, 600.0, 30.0);
        let other = add(&mut controller, ComponentKind::Generic, 100.0, 100.0, 30.0);

        // First drag drops `id` (already inside) into the trash.
        controller.begin_drag(Point::new(100.0, 100.0), other, None);
        controller.end_drag();
        assert!(!controller.registry().contains(id));

        assert!(!controller.begin_drag(Point::new(800.0, 600.0), id, None));
        controller.update_drag(Point::new(0.0, 0.0));
        assert_eq!(controller.mode(), DragMode::Idle);
    }

    #[test]
    fn test_recompute_waits_for_drag_to_settle() {
        let mut controller = controller();
        let battery = add(&mut controller, ComponentKind::Battery, 600.0, 300.0, 50.0);
        let wire = add(&mut controller, ComponentKind::Wire, 300.0, 300.0, 40.0);

        controller.begin_drag(Point::new(260.0, 300.0), wire, Some(0));
        controller.update_drag(Point::new(650.0, 300.0));
        controller.recompute();
        assert_eq!(controller.mode(), DragMode::DraggingJoint);
        assert_eq!(controller.registry().get(wire).unwrap().connected_group, None);
        assert_eq!(controller.registry().get(battery).unwrap().connected_group, None);

        controller.end_drag();
        let group = controller.registry().get(battery).unwrap().connected_group;
        assert!(group.is_some());
        assert_eq!(controller.registry().get(wire).unwrap().connected_group, group);
    }

    #[test]
    fn test_invalid_scene_bounds_fall_back_to_config() {
        let config = EngineConfig {
            deletion_zone: Rect::new(700.0, 500.0, 900.0, 700.0),
            ..EngineConfig::default()
        };
        let scene = RecordingScene::new().with_deletion_bounds(Rect::new(0.0, 0.0, f64::NAN, 50.0));
        let controller = DragController::new(scene, &config);
        assert_eq!(controller.zone().rect(), config.deletion_zone);

        let scene = RecordingScene::new().with_deletion_bounds(Rect::new(0.0, 0.0, 50.0, 50.0));
        let controller = DragController::new(scene, &config);
        assert_eq!(controller.zone().rect(), Rect::new(0.0, 0.0, 50.0, 50.0));
    }
}
