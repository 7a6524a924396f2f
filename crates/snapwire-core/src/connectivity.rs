//! Proximity-based grouping of components.
//!
//! Every recompute rebuilds the grouping from scratch: no union-find forest or
//! spatial index survives between calls. The cost is O(n² · k²) joint distance
//! checks for n components with k joints each, which is fine at the scale of a
//! hand-built diagram.

use crate::component::{ComponentId, GroupId};
use crate::registry::ComponentRegistry;
use kurbo::{Affine, Point};
use std::collections::BTreeMap;

/// Joints closer than this distance (scene units) are connected.
pub const OVERLAP_THRESHOLD: f64 = 10.0;

/// Rebuilds `connected_group` labels from joint proximity.
#[derive(Debug, Clone, Copy)]
pub struct ConnectivityResolver {
    threshold: f64,
}

impl Default for ConnectivityResolver {
    fn default() -> Self {
        Self::new(OVERLAP_THRESHOLD)
    }
}

impl ConnectivityResolver {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Recompute group labels and joint `connected` flags for every component.
    ///
    /// The resulting partition is the transitive closure of "some joint pair is
    /// within threshold". Numeric ids depend on registry order.
    pub fn recompute(&self, registry: &mut ComponentRegistry, parent: Affine) {
        for component in registry.iter_mut() {
            component.connected_group = None;
            for joint in component.joints_mut() {
                joint.connected = false;
            }
        }

        // Snapshot scene positions in registry order, skipping malformed parts.
        let mut ids: Vec<ComponentId> = Vec::with_capacity(registry.len());
        let mut positions: Vec<Vec<Point>> = Vec::with_capacity(registry.len());
        for component in registry.iter() {
            debug_assert!(
                component.is_well_formed(),
                "{:?} {} has {} joints",
                component.kind,
                component.id(),
                component.joints().len()
            );
            if !component.is_well_formed() {
                log::warn!("Skipping malformed component {} in recompute", component.id());
                continue;
            }
            ids.push(component.id());
            positions.push(component.joint_positions(parent));
        }

        let mut groups: Vec<Option<GroupId>> = vec![None; ids.len()];
        let mut connected: Vec<Vec<bool>> =
            positions.iter().map(|p| vec![false; p.len()]).collect();
        let mut next_group: GroupId = 0;

        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                for (ji, a) in positions[i].iter().enumerate() {
                    for (jj, b) in positions[j].iter().enumerate() {
                        if a.distance(*b) >= self.threshold {
                            continue;
                        }
                        connected[i][ji] = true;
                        connected[j][jj] = true;
                        match (groups[i], groups[j]) {
                            (None, None) => {
                                groups[i] = Some(next_group);
                                groups[j] = Some(next_group);
                                next_group += 1;
                            }
                            (Some(g), None) => groups[j] = Some(g),
                            (None, Some(g)) => groups[i] = Some(g),
                            (Some(keep), Some(merge)) if keep != merge => {
                                log::debug!("Merging group {} into {}", merge, keep);
                                for label in groups.iter_mut() {
                                    if *label == Some(merge) {
                                        *label = Some(keep);
                                    }
                                }
                            }
                            (Some(_), Some(_)) => {}
                        }
                    }
                }
            }
        }

        for (index, id) in ids.iter().enumerate() {
            if let Some(component) = registry.get_mut(*id) {
                component.connected_group = groups[index];
                for (joint, &flag) in component.joints_mut().iter_mut().zip(&connected[index]) {
                    joint.connected = flag;
                }
            }
        }
    }

    /// Current membership partition, independent of numeric group ids.
    ///
    /// Each group is sorted, and the list of groups is sorted. Ungrouped
    /// components are not listed.
    pub fn partition(registry: &ComponentRegistry) -> Vec<Vec<ComponentId>> {
        let mut by_group: BTreeMap<GroupId, Vec<ComponentId>> = BTreeMap::new();
        for component in registry.iter() {
            if let Some(group) = component.connected_group {
                by_group.entry(group).or_default().push(component.id());
            }
        }
        let mut groups: Vec<Vec<ComponentId>> = by_group
            .into_values()
            .map(|mut members| {
                members.sort_unstable();
                members
            })
            .collect();
        groups.sort_unstable();
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, ComponentKind};

    fn add_generic(registry: &mut ComponentRegistry, x: f64, y: f64) -> ComponentId {
        let component = Component::new(
            ComponentKind::Generic,
            Point::new(x, y),
            &[Point::new(-30.0, 0.0), Point::new(30.0, 0.0)],
        )
        .unwrap();
        registry.add(component).unwrap()
    }

    fn group_of(registry: &ComponentRegistry, id: ComponentId) -> Option<GroupId> {
        registry.get(id).unwrap().connected_group
    }

    #[test]
    fn test_touching_joints_share_group() {
        let mut registry = ComponentRegistry::new();
        let a = add_generic(&mut registry, 0.0, 0.0);
        // Left joint at 35, 5 away from a's right joint.
        let b = add_generic(&mut registry, 65.0, 0.0);
        ConnectivityResolver::default().recompute(&mut registry, Affine::IDENTITY);

        assert!(group_of(&registry, a).is_some());
        assert_eq!(group_of(&registry, a), group_of(&registry, b));
        assert!(registry.get(a).unwrap().joints()[1].connected);
        assert!(registry.get(b).unwrap().joints()[0].connected);
        assert!(!registry.get(a).unwrap().joints()[0].connected);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut registry = ComponentRegistry::new();
        let a = add_generic(&mut registry, 0.0, 0.0);
        let b = add_generic(&mut registry, 70.0, 0.0); // exactly 10 apart
        ConnectivityResolver::default().recompute(&mut registry, Affine::IDENTITY);
        assert_eq!(group_of(&registry, a), None);
        assert_eq!(group_of(&registry, b), None);
    }

    #[test]
    fn test_isolated_component_has_no_group() {
        let mut registry = ComponentRegistry::new();
        let a = add_generic(&mut registry, 0.0, 0.0);
        let b = add_generic(&mut registry, 60.0, 0.0);
        let lonely = add_generic(&mut registry, 500.0, 500.0);
        ConnectivityResolver::default().recompute(&mut registry, Affine::IDENTITY);
        assert!(group_of(&registry, a).is_some());
        assert!(group_of(&registry, b).is_some());
        assert_eq!(group_of(&registry, lonely), None);
    }

    #[test]
    fn test_groups_merge_transitively() {
        // a and c are registered first and land in different groups; b bridges them.
        let mut registry = ComponentRegistry::new();
        let a = add_generic(&mut registry, 0.0, 0.0);
        let c = add_generic(&mut registry, 120.0, 0.0);
        let d = add_generic(&mut registry, 180.0, 0.0);
        let e = add_generic(&mut registry, -60.0, 0.0);
        let b = add_generic(&mut registry, 60.0, 0.0);
        ConnectivityResolver::default().recompute(&mut registry, Affine::IDENTITY);

        let partition = ConnectivityResolver::partition(&registry);
        assert_eq!(partition.len(), 1);
        let mut expected = vec![a, b, c, d, e];
        expected.sort_unstable();
        assert_eq!(partition[0], expected);
    }

    #[test]
    fn test_previous_groups_are_cleared() {
        let mut registry = ComponentRegistry::new();
        let a = add_generic(&mut registry, 0.0, 0.0);
        let b = add_generic(&mut registry, 60.0, 0.0);
        let resolver = ConnectivityResolver::default();
        resolver.recompute(&mut registry, Affine::IDENTITY);
        assert!(group_of(&registry, a).is_some());

        registry.get_mut(b).unwrap().position = Point::new(400.0, 0.0);
        resolver.recompute(&mut registry, Affine::IDENTITY);
        assert_eq!(group_of(&registry, a), None);
        assert_eq!(group_of(&registry, b), None);
        assert!(!registry.get(a).unwrap().joints()[1].connected);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut registry = ComponentRegistry::new();
        add_generic(&mut registry, 0.0, 0.0);
        add_generic(&mut registry, 60.0, 0.0);
        add_generic(&mut registry, 300.0, 0.0);
        add_generic(&mut registry, 362.0, 3.0);
        add_generic(&mut registry, 1000.0, 0.0);
        let resolver = ConnectivityResolver::default();

        resolver.recompute(&mut registry, Affine::IDENTITY);
        let first = ConnectivityResolver::partition(&registry);
        resolver.recompute(&mut registry, Affine::IDENTITY);
        let second = ConnectivityResolver::partition(&registry);
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_parent_transform_scales_distances() {
        // Joints 6 local units apart become 12 scene units apart under 2x scale.
        let mut registry = ComponentRegistry::new();
        let a = add_generic(&mut registry, 0.0, 0.0);
        let b = add_generic(&mut registry, 66.0, 0.0);
        let resolver = ConnectivityResolver::default();

        resolver.recompute(&mut registry, Affine::IDENTITY);
        assert!(group_of(&registry, a).is_some());

        resolver.recompute(&mut registry, Affine::scale(2.0));
        assert_eq!(group_of(&registry, a), None);
        assert_eq!(group_of(&registry, b), None);
    }
}
