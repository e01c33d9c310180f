//! Typed data model shared across every component of the reasoning kernel.
//!
//! - [`license`] — license nodes, policy category, copyleft strength.
//! - [`obligation`] — obligation nodes, effort/scope lattices, distribution scope.
//! - [`edge`] — the tagged-variant edge sum type and compatibility level ordinal.
//! - [`dependency`] — the external dependency-record schema the tree analyzer consumes.

pub mod dependency;
pub mod edge;
pub mod license;
pub mod obligation;

pub use dependency::DependencyRecord;
pub use edge::{
    CompatibilityEdge, CompatibilityLevel, ConditionEdge, Direction, GraphEdge, LimitationEdge,
    ObligationEdge, RightEdge, UseCaseExemptionEdge, UseCaseTriggerEdge,
};
pub use license::{CopyleftStrength, LicenseCategory, LicenseNode};
pub use obligation::{DistributionScope, Effort, ObligationNode, ObligationScope, ObligationTrigger};
