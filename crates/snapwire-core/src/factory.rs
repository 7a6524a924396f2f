//! Component factory and the static per-type joint table.

use crate::component::{Component, ComponentKind};
use crate::error::{EngineError, EngineResult};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind and joint layout for one component type name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointSpec {
    pub kind: ComponentKind,
    /// Local joint offsets, in joint order.
    pub offsets: Vec<Point>,
}

impl JointSpec {
    /// Two joints mirrored on the local x axis.
    pub fn symmetric(kind: ComponentKind, half_length: f64) -> Self {
        Self {
            kind,
            offsets: vec![Point::new(-half_length, 0.0), Point::new(half_length, 0.0)],
        }
    }
}

/// Type name to joint layout mapping consulted when stamping out components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointTable {
    entries: BTreeMap<String, JointSpec>,
}

impl Default for JointTable {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert("battery".to_string(), JointSpec::symmetric(ComponentKind::Battery, 50.0));
        entries.insert("wire".to_string(), JointSpec::symmetric(ComponentKind::Wire, 40.0));
        entries.insert("generic".to_string(), JointSpec::symmetric(ComponentKind::Generic, 30.0));
        entries.insert("resistor".to_string(), JointSpec::symmetric(ComponentKind::Generic, 30.0));
        entries.insert("bulb".to_string(), JointSpec::symmetric(ComponentKind::Generic, 30.0));
        Self { entries }
    }
}

impl JointTable {
    /// An empty table.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Load a table from JSON, rejecting entries with the wrong joint count.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let table: Self = serde_json::from_str(json)?;
        for spec in table.entries.values() {
            check_spec(spec)?;
        }
        Ok(table)
    }

    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, type_name: impl Into<String>, spec: JointSpec) -> EngineResult<()> {
        check_spec(&spec)?;
        self.entries.insert(type_name.into(), spec);
        Ok(())
    }

    pub fn get(&self, type_name: &str) -> Option<&JointSpec> {
        self.entries.get(type_name)
    }

    /// Known type names, sorted.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn check_spec(spec: &JointSpec) -> EngineResult<()> {
    if spec.offsets.len() != spec.kind.joint_count() {
        return Err(EngineError::JointCount {
            kind: spec.kind,
            expected: spec.kind.joint_count(),
            found: spec.offsets.len(),
        });
    }
    Ok(())
}

/// Builds components from a [`JointTable`].
#[derive(Debug, Clone, Default)]
pub struct ComponentFactory {
    table: JointTable,
}

impl ComponentFactory {
    pub fn new(table: JointTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &JointTable {
        &self.table
    }

    /// Create an unregistered component of the named type at `position`.
    pub fn create(&self, type_name: &str, position: Point) -> EngineResult<Component> {
        let spec = self
            .table
            .get(type_name)
            .ok_or_else(|| EngineError::UnknownComponentType(type_name.to_string()))?;
        Component::new(spec.kind, position, &spec.offsets)
    }
}
