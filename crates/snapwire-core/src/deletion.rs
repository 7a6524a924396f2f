//! Trash region: live feedback while dragging, removal on release.

use crate::component::{Component, ComponentId};
use crate::config::Tint;
use crate::registry::ComponentRegistry;
use crate::scene::Scene;
use kurbo::{Affine, Point, Rect};

/// A fixed rectangle in scene coordinates that deletes what is dropped in it.
#[derive(Debug, Clone)]
pub struct DeletionZone {
    rect: Rect,
    tint: Tint,
    candidates: Vec<ComponentId>,
}

impl DeletionZone {
    pub fn new(rect: Rect, tint: Tint) -> Self {
        Self {
            rect,
            tint,
            candidates: Vec::new(),
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn contains(&self, point: Point) -> bool {
        self.rect.contains(point)
    }

    /// Components marked by the last scan or refresh.
    pub fn candidates(&self) -> &[ComponentId] {
        &self.candidates
    }

    /// Whether every joint of `component` is inside the zone.
    ///
    /// A component without joints never qualifies.
    pub fn encloses(&self, component: &Component, parent: Affine) -> bool {
        let joints = component.joint_positions(parent);
        !joints.is_empty() && joints.iter().all(|&p| self.contains(p))
    }

    fn collect(&self, registry: &ComponentRegistry, parent: Affine) -> Vec<ComponentId> {
        registry
            .iter()
            .filter(|component| {
                debug_assert!(
                    component.is_well_formed(),
                    "{:?} {} has {} joints",
                    component.kind,
                    component.id(),
                    component.joints().len()
                );
                if !component.is_well_formed() {
                    log::warn!("Skipping malformed component {} in deletion scan", component.id());
                    return false;
                }
                self.encloses(component, parent)
            })
            .map(Component::id)
            .collect()
    }

    /// Re-evaluate candidates and tint them; clear the tint on everything else.
    pub fn scan(&mut self, registry: &ComponentRegistry, scene: &mut dyn Scene) -> &[ComponentId] {
        let candidates = self.collect(registry, scene.parent_transform());
        if candidates != self.candidates {
            log::debug!("Deletion candidates: {:?}", candidates);
        }
        for id in registry.ids() {
            let tint = candidates.contains(id).then_some(self.tint);
            scene.set_tint(*id, tint);
        }
        self.candidates = candidates;
        &self.candidates
    }

    /// Re-evaluate candidates without touching visuals.
    pub fn refresh(&mut self, registry: &ComponentRegistry, parent: Affine) {
        self.candidates = self.collect(registry, parent);
    }

    /// Clear the tint of every current candidate.
    pub fn clear_feedback(&self, scene: &mut dyn Scene) {
        for id in &self.candidates {
            scene.set_tint(*id, None);
        }
    }

    /// Remove every candidate from the registry and the scene, then forget them.
    pub fn commit(
        &mut self,
        registry: &mut ComponentRegistry,
        scene: &mut dyn Scene,
    ) -> Vec<Component> {
        let mut removed = Vec::with_capacity(self.candidates.len());
        for id in self.candidates.drain(..) {
            if let Some(component) = registry.remove(id) {
                log::info!("Deleted {:?} {}", component.kind, id);
                scene.detach(id);
                removed.push(component);
            }
        }
        removed
    }
}
