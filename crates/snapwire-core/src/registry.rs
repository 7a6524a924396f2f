//! Registry of live components.

use crate::component::{Component, ComponentId, GroupId};
use crate::error::{EngineError, EngineResult};
use std::collections::HashMap;

/// Live components of one canvas, kept in insertion (back to front) order.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: HashMap<ComponentId, Component>,
    order: Vec<ComponentId>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component. Malformed components are refused.
    pub fn add(&mut self, component: Component) -> EngineResult<ComponentId> {
        if !component.is_well_formed() {
            log::warn!(
                "Refusing {:?} {} with {} joints",
                component.kind,
                component.id(),
                component.joints().len()
            );
            return Err(EngineError::JointCount {
                kind: component.kind,
                expected: component.kind.joint_count(),
                found: component.joints().len(),
            });
        }
        let id = component.id();
        if self.components.insert(id, component).is_none() {
            self.order.push(id);
        }
        Ok(id)
    }

    /// Remove a component, returning it if it was registered.
    pub fn remove(&mut self, id: ComponentId) -> Option<Component> {
        self.order.retain(|&other| other != id);
        self.components.remove(&id)
    }

    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    pub fn get_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.get_mut(&id)
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.components.contains_key(&id)
    }

    /// Component ids in registration order.
    pub fn ids(&self) -> &[ComponentId] {
        &self.order
    }

    /// Components in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.order.iter().filter_map(|id| self.components.get(id))
    }

    /// Mutable access to every component (unordered).
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Component> {
        self.components.values_mut()
    }

    /// Ids of every component currently carrying `group`.
    pub fn group_members(&self, group: GroupId) -> Vec<ComponentId> {
        self.iter()
            .filter(|c| c.connected_group == Some(group))
            .map(|c| c.id())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
