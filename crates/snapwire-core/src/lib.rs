//! Snapwire Core Library
//!
//! Interactive connectivity and manipulation engine for snap-together circuit
//! diagrams: components are dragged, rotated around a pivot joint, grouped by
//! joint proximity and deleted by dropping them on a trash region.

pub mod canvas;
pub mod component;
pub mod config;
pub mod connectivity;
pub mod deletion;
pub mod drag;
pub mod error;
pub mod factory;
pub mod input;
pub mod registry;
pub mod rotation;
pub mod scene;

pub use canvas::Canvas;
pub use component::{Component, ComponentId, ComponentKind, GroupId, Joint};
pub use config::{EngineConfig, Tint};
pub use connectivity::{ConnectivityResolver, OVERLAP_THRESHOLD};
pub use deletion::DeletionZone;
pub use drag::{DragController, DragMode, DragSession};
pub use error::{EngineError, EngineResult};
pub use factory::{ComponentFactory, JointSpec, JointTable};
pub use input::{PointerEvent, PointerTarget};
pub use registry::ComponentRegistry;
pub use rotation::{rotate_about, rotation_delta};
pub use scene::{NodeState, NullScene, RecordingScene, Scene};
