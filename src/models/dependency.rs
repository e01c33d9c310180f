use serde::{Deserialize, Serialize};

/// An already-resolved dependency, as handed to the engine by an external
/// discovery/SBOM step. The engine does not discover or fetch these itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub dependency_id: String,
    pub dependency_name: String,
    pub version: String,
    /// A string in the expression grammar of the expression evaluator, e.g.
    /// `"MIT"`, `"MIT OR Apache-2.0"`, `"(MIT AND BSD-3-Clause)"`.
    pub license: String,
    #[serde(default)]
    pub scope: Option<super::obligation::DistributionScope>,
    #[serde(default)]
    pub transitive: bool,
    #[serde(default)]
    pub path: Vec<String>,
}
