use serde::{Deserialize, Serialize};

use super::obligation::{ObligationScope, ObligationTrigger};

/// Degree to which two licenses can coexist in the same combined work.
///
/// Ordinal order (used for path-minimum calculations) is the declaration
/// order below: `Full < Conditional < OneWay < Incompatible < Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CompatibilityLevel {
    Full,
    Conditional,
    OneWay,
    Incompatible,
    Unknown,
}

impl CompatibilityLevel {
    /// `false` for `Incompatible` and `Unknown` — an unresolved pairing is
    /// not a cleared one, only a deferred one.
    pub fn is_compatible(self) -> bool {
        !matches!(self, CompatibilityLevel::Incompatible | CompatibilityLevel::Unknown)
    }
}

/// Which side(s) a compatibility edge's terms apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Bidirectional,
    Forward,
    Reverse,
}

/// `source → target` compatibility judgment, with supporting citations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub compatibility: CompatibilityLevel,
    pub direction: Direction,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl CompatibilityEdge {
    /// Build the derived reverse entry stored under `(target, source)` for a
    /// `Bidirectional` edge. Same conditions/sources, swapped endpoints.
    pub fn reversed(&self) -> CompatibilityEdge {
        CompatibilityEdge {
            id: format!("{}-reverse", self.id),
            source: self.target.clone(),
            target: self.source.clone(),
            compatibility: self.compatibility,
            direction: self.direction,
            conditions: self.conditions.clone(),
            sources: self.sources.clone(),
        }
    }
}

/// `license → obligation` edge: this license triggers this obligation under
/// the given scope/trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObligationEdge {
    pub id: String,
    pub license_id: String,
    pub obligation_id: String,
    pub trigger: ObligationTrigger,
    pub scope: ObligationScope,
}

/// Informational edges referencing `Right` / `Condition` / `Limitation` /
/// `UseCase` nodes. Not consulted by the compatibility or obligation
/// algorithms; carried for completeness of the knowledge graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RightEdge {
    pub id: String,
    pub license_id: String,
    pub right_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionEdge {
    pub id: String,
    pub license_id: String,
    pub condition_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitationEdge {
    pub id: String,
    pub license_id: String,
    pub limitation_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UseCaseTriggerEdge {
    pub id: String,
    pub license_id: String,
    pub use_case_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UseCaseExemptionEdge {
    pub id: String,
    pub license_id: String,
    pub use_case_id: String,
}

fn canon(id: &str) -> String {
    id.trim().to_uppercase()
}

/// Sum type over every edge kind the graph stores.
///
/// Represented as a tagged variant rather than a trait-object hierarchy: each
/// kind carries its own discriminant, and call sites pattern-match on it
/// instead of going through dynamic dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum GraphEdge {
    Compatibility(CompatibilityEdge),
    Obligation(ObligationEdge),
    Right(RightEdge),
    Condition(ConditionEdge),
    Limitation(LimitationEdge),
    UseCaseTrigger(UseCaseTriggerEdge),
    UseCaseExemption(UseCaseExemptionEdge),
}

impl GraphEdge {
    pub fn id(&self) -> &str {
        match self {
            GraphEdge::Compatibility(e) => &e.id,
            GraphEdge::Obligation(e) => &e.id,
            GraphEdge::Right(e) => &e.id,
            GraphEdge::Condition(e) => &e.id,
            GraphEdge::Limitation(e) => &e.id,
            GraphEdge::UseCaseTrigger(e) => &e.id,
            GraphEdge::UseCaseExemption(e) => &e.id,
        }
    }

    pub fn source(&self) -> &str {
        match self {
            GraphEdge::Compatibility(e) => &e.source,
            GraphEdge::Obligation(e) => &e.license_id,
            GraphEdge::Right(e) => &e.license_id,
            GraphEdge::Condition(e) => &e.license_id,
            GraphEdge::Limitation(e) => &e.license_id,
            GraphEdge::UseCaseTrigger(e) => &e.license_id,
            GraphEdge::UseCaseExemption(e) => &e.license_id,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            GraphEdge::Compatibility(e) => &e.target,
            GraphEdge::Obligation(e) => &e.obligation_id,
            GraphEdge::Right(e) => &e.right_id,
            GraphEdge::Condition(e) => &e.condition_id,
            GraphEdge::Limitation(e) => &e.limitation_id,
            GraphEdge::UseCaseTrigger(e) => &e.use_case_id,
            GraphEdge::UseCaseExemption(e) => &e.use_case_id,
        }
    }

    /// Discriminant used as part of the `(edgeKind, source, target)` multigraph key.
    pub fn kind_tag(&self) -> &'static str {
        match self {
            GraphEdge::Compatibility(_) => "compatibility",
            GraphEdge::Obligation(_) => "obligation",
            GraphEdge::Right(_) => "right",
            GraphEdge::Condition(_) => "condition",
            GraphEdge::Limitation(_) => "limitation",
            GraphEdge::UseCaseTrigger(_) => "use-case-trigger",
            GraphEdge::UseCaseExemption(_) => "use-case-exemption",
        }
    }

    /// Canonicalize every field of this edge that names a *license* id
    /// (trimmed, uppercased), matching [`KnowledgeGraph::add_license`]'s own
    /// normalization so an edge inserted with a mixed-case license id still
    /// resolves against canonicalized lookups. Fields naming a non-license
    /// node (an obligation, right, condition, limitation or use-case id) are
    /// left untouched — those namespaces aren't SPDX-style identifiers and
    /// are under no such canonicalization rule.
    ///
    /// [`KnowledgeGraph::add_license`]: crate::graph::KnowledgeGraph::add_license
    pub fn canonicalize_license_ids(&mut self) {
        match self {
            GraphEdge::Compatibility(e) => {
                e.source = canon(&e.source);
                e.target = canon(&e.target);
            }
            GraphEdge::Obligation(e) => e.license_id = canon(&e.license_id),
            GraphEdge::Right(e) => e.license_id = canon(&e.license_id),
            GraphEdge::Condition(e) => e.license_id = canon(&e.license_id),
            GraphEdge::Limitation(e) => e.license_id = canon(&e.license_id),
            GraphEdge::UseCaseTrigger(e) => e.license_id = canon(&e.license_id),
            GraphEdge::UseCaseExemption(e) => e.license_id = canon(&e.license_id),
        }
    }
}
