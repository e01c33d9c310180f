//! Built-in seed knowledge base and the YAML ingestion surface for overlaying
//! a user-supplied catalog on top of it.
//!
//! The built-in catalog is intentionally small: enough of the common SPDX
//! identifiers and their inference-relevant properties to exercise every
//! rule in the compatibility cascade, not an exhaustive SPDX mirror. A
//! deployment that needs more ships its own overlay file; see [`load_overlay`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LreResult;
use crate::graph::KnowledgeGraph;
use crate::models::{
    CompatibilityEdge, CompatibilityLevel, CopyleftStrength, Direction, GraphEdge, LicenseCategory,
    LicenseNode, ObligationEdge, ObligationNode, ObligationScope, ObligationTrigger,
};

struct Seed {
    id: &'static str,
    name: &'static str,
    category: LicenseCategory,
    copyleft: CopyleftStrength,
    family: Option<&'static str>,
    version: Option<f64>,
    osi: bool,
    fsf: bool,
}

const LICENSES: &[Seed] = &[
    Seed { id: "PUBLIC-DOMAIN", name: "Public Domain", category: LicenseCategory::PublicDomain, copyleft: CopyleftStrength::None, family: None, version: None, osi: false, fsf: true },
    Seed { id: "CC0-1.0", name: "Creative Commons Zero v1.0 Universal", category: LicenseCategory::PublicDomain, copyleft: CopyleftStrength::None, family: Some("CC"), version: Some(1.0), osi: false, fsf: true },
    Seed { id: "MIT", name: "MIT License", category: LicenseCategory::Permissive, copyleft: CopyleftStrength::None, family: Some("MIT"), version: None, osi: true, fsf: true },
    Seed { id: "APACHE-2.0", name: "Apache License 2.0", category: LicenseCategory::Permissive, copyleft: CopyleftStrength::None, family: Some("Apache"), version: Some(2.0), osi: true, fsf: true },
    Seed { id: "BSD-2-CLAUSE", name: "BSD 2-Clause License", category: LicenseCategory::Permissive, copyleft: CopyleftStrength::None, family: Some("BSD"), version: None, osi: true, fsf: true },
    Seed { id: "BSD-3-CLAUSE", name: "BSD 3-Clause License", category: LicenseCategory::Permissive, copyleft: CopyleftStrength::None, family: Some("BSD"), version: None, osi: true, fsf: true },
    Seed { id: "ISC", name: "ISC License", category: LicenseCategory::Permissive, copyleft: CopyleftStrength::None, family: Some("ISC"), version: None, osi: true, fsf: true },
    Seed { id: "MPL-2.0", name: "Mozilla Public License 2.0", category: LicenseCategory::WeakCopyleft, copyleft: CopyleftStrength::File, family: Some("MPL"), version: Some(2.0), osi: true, fsf: true },
    Seed { id: "EPL-2.0", name: "Eclipse Public License 2.0", category: LicenseCategory::WeakCopyleft, copyleft: CopyleftStrength::File, family: Some("EPL"), version: Some(2.0), osi: true, fsf: false },
    Seed { id: "LGPL-2.1-ONLY", name: "GNU Lesser General Public License v2.1 only", category: LicenseCategory::WeakCopyleft, copyleft: CopyleftStrength::Library, family: Some("GPL"), version: Some(2.1), osi: true, fsf: true },
    Seed { id: "LGPL-2.1-OR-LATER", name: "GNU Lesser General Public License v2.1 or later", category: LicenseCategory::WeakCopyleft, copyleft: CopyleftStrength::Library, family: Some("GPL"), version: Some(2.1), osi: true, fsf: true },
    Seed { id: "LGPL-3.0-ONLY", name: "GNU Lesser General Public License v3.0 only", category: LicenseCategory::WeakCopyleft, copyleft: CopyleftStrength::Library, family: Some("GPL"), version: Some(3.0), osi: true, fsf: true },
    Seed { id: "LGPL-3.0-OR-LATER", name: "GNU Lesser General Public License v3.0 or later", category: LicenseCategory::WeakCopyleft, copyleft: CopyleftStrength::Library, family: Some("GPL"), version: Some(3.0), osi: true, fsf: true },
    Seed { id: "GPL-2.0-ONLY", name: "GNU General Public License v2.0 only", category: LicenseCategory::StrongCopyleft, copyleft: CopyleftStrength::Strong, family: Some("GPL"), version: Some(2.0), osi: true, fsf: true },
    Seed { id: "GPL-2.0-OR-LATER", name: "GNU General Public License v2.0 or later", category: LicenseCategory::StrongCopyleft, copyleft: CopyleftStrength::Strong, family: Some("GPL"), version: Some(2.0), osi: true, fsf: true },
    Seed { id: "GPL-3.0-ONLY", name: "GNU General Public License v3.0 only", category: LicenseCategory::StrongCopyleft, copyleft: CopyleftStrength::Strong, family: Some("GPL"), version: Some(3.0), osi: true, fsf: true },
    Seed { id: "GPL-3.0-OR-LATER", name: "GNU General Public License v3.0 or later", category: LicenseCategory::StrongCopyleft, copyleft: CopyleftStrength::Strong, family: Some("GPL"), version: Some(3.0), osi: true, fsf: true },
    Seed { id: "AGPL-3.0-ONLY", name: "GNU Affero General Public License v3.0 only", category: LicenseCategory::NetworkCopyleft, copyleft: CopyleftStrength::Network, family: Some("GPL"), version: Some(3.0), osi: true, fsf: true },
    Seed { id: "AGPL-3.0-OR-LATER", name: "GNU Affero General Public License v3.0 or later", category: LicenseCategory::NetworkCopyleft, copyleft: CopyleftStrength::Network, family: Some("GPL"), version: Some(3.0), osi: true, fsf: true },
    Seed { id: "PROPRIETARY", name: "Proprietary / All Rights Reserved", category: LicenseCategory::Proprietary, copyleft: CopyleftStrength::None, family: None, version: None, osi: false, fsf: false },
];

struct ObligationSeed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    trigger: ObligationTrigger,
    effort: crate::models::Effort,
}

const OBLIGATIONS: &[ObligationSeed] = &[
    ObligationSeed {
        id: "attribution-notice",
        name: "Preserve attribution notice",
        description: "Reproduce the original copyright notice and license text in distributed copies.",
        trigger: ObligationTrigger::OnDistribution,
        effort: crate::models::Effort::Low,
    },
    ObligationSeed {
        id: "weak-copyleft-notice",
        name: "Retain weak-copyleft notice and relinking mechanism",
        description: "Always keep the library's license text and, for static linking, provide a means to relink against a modified version of the library.",
        trigger: ObligationTrigger::Always,
        effort: crate::models::Effort::High,
    },
    ObligationSeed {
        id: "source-disclosure",
        name: "Disclose corresponding source",
        description: "Make the complete corresponding source of the distributed work available under the same license.",
        trigger: ObligationTrigger::OnDistribution,
        effort: crate::models::Effort::VeryHigh,
    },
    ObligationSeed {
        id: "network-source-disclosure",
        name: "Disclose source to network users",
        description: "Offer the complete corresponding source to anyone interacting with the software over a network.",
        trigger: ObligationTrigger::OnNetworkUse,
        effort: crate::models::Effort::High,
    },
];

/// `(license id, obligation id, scope)` edges wiring licenses to the
/// obligations above.
const OBLIGATION_EDGES: &[(&str, &str, ObligationScope)] = &[
    ("MIT", "attribution-notice", ObligationScope::Component),
    ("APACHE-2.0", "attribution-notice", ObligationScope::Component),
    ("BSD-2-CLAUSE", "attribution-notice", ObligationScope::Component),
    ("BSD-3-CLAUSE", "attribution-notice", ObligationScope::Component),
    ("ISC", "attribution-notice", ObligationScope::Component),
    ("MPL-2.0", "weak-copyleft-notice", ObligationScope::ModifiedFiles),
    ("LGPL-2.1-ONLY", "weak-copyleft-notice", ObligationScope::Component),
    ("LGPL-2.1-OR-LATER", "weak-copyleft-notice", ObligationScope::Component),
    ("LGPL-3.0-ONLY", "weak-copyleft-notice", ObligationScope::Component),
    ("LGPL-3.0-OR-LATER", "weak-copyleft-notice", ObligationScope::Component),
    ("GPL-2.0-ONLY", "attribution-notice", ObligationScope::Component),
    ("GPL-2.0-OR-LATER", "attribution-notice", ObligationScope::Component),
    ("GPL-3.0-ONLY", "attribution-notice", ObligationScope::Component),
    ("GPL-3.0-OR-LATER", "attribution-notice", ObligationScope::Component),
    ("GPL-2.0-ONLY", "source-disclosure", ObligationScope::DistributedWork),
    ("GPL-2.0-OR-LATER", "source-disclosure", ObligationScope::DistributedWork),
    ("GPL-3.0-ONLY", "source-disclosure", ObligationScope::DistributedWork),
    ("GPL-3.0-OR-LATER", "source-disclosure", ObligationScope::DistributedWork),
    ("AGPL-3.0-ONLY", "attribution-notice", ObligationScope::Component),
    ("AGPL-3.0-OR-LATER", "attribution-notice", ObligationScope::Component),
    ("AGPL-3.0-ONLY", "source-disclosure", ObligationScope::DistributedWork),
    ("AGPL-3.0-OR-LATER", "source-disclosure", ObligationScope::DistributedWork),
    ("AGPL-3.0-ONLY", "network-source-disclosure", ObligationScope::DistributedWork),
    ("AGPL-3.0-OR-LATER", "network-source-disclosure", ObligationScope::DistributedWork),
];

/// Build the built-in knowledge graph: the license catalog above, their
/// obligations, and the handful of compatibility edges worth stating
/// directly rather than leaving to the inference cascade.
pub fn seed() -> KnowledgeGraph {
    let graph = KnowledgeGraph::new();

    for s in LICENSES {
        graph.add_license(LicenseNode {
            id: s.id.to_string(),
            name: s.name.to_string(),
            category: s.category,
            copyleft_strength: s.copyleft,
            family: s.family.map(str::to_string),
            version: s.version,
            is_osi_approved: s.osi,
            is_fsf_free: s.fsf,
            is_deprecated: false,
        });
    }

    for o in OBLIGATIONS {
        graph.add_obligation(ObligationNode {
            id: o.id.to_string(),
            name: o.name.to_string(),
            description: o.description.to_string(),
            trigger: o.trigger,
            effort: o.effort,
        });
    }

    for (i, (license_id, obligation_id, scope)) in OBLIGATION_EDGES.iter().enumerate() {
        let obligation = OBLIGATIONS.iter().find(|o| &o.id == obligation_id).expect("seeded obligation id");
        graph.add_edge(GraphEdge::Obligation(ObligationEdge {
            id: format!("{license_id}-{obligation_id}-{i}"),
            license_id: license_id.to_string(),
            obligation_id: obligation_id.to_string(),
            trigger: obligation.trigger,
            scope: *scope,
        }));
    }

    graph.add_edge(GraphEdge::Compatibility(CompatibilityEdge {
        id: "mit-bsd3".to_string(),
        source: "MIT".to_string(),
        target: "BSD-3-CLAUSE".to_string(),
        compatibility: CompatibilityLevel::Full,
        direction: Direction::Bidirectional,
        conditions: vec![],
        sources: vec!["SPDX license matrix".to_string()],
    }));

    graph
}

/// Overlay document accepted by [`load_overlay`]: the ingestion surface of
/// the knowledge graph's ingestion surface, not a policy-YAML parser (that
/// surface is explicitly out of scope).
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Overlay {
    #[serde(default)]
    pub licenses: Vec<LicenseNode>,
    #[serde(default)]
    pub obligations: Vec<ObligationNode>,
    #[serde(default)]
    pub obligation_edges: Vec<OverlayObligationEdge>,
    #[serde(default)]
    pub compatibility_edges: Vec<CompatibilityEdge>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct OverlayObligationEdge {
    pub id: String,
    pub license_id: String,
    pub obligation_id: String,
    pub trigger: ObligationTrigger,
    pub scope: ObligationScope,
}

/// Parse a YAML overlay document and apply it on top of `graph`, additively:
/// existing entries not mentioned in the overlay are left untouched,
/// entries with an id already present are replaced.
pub fn apply_overlay(graph: &KnowledgeGraph, overlay: Overlay) {
    for license in overlay.licenses {
        graph.add_license(license);
    }
    for obligation in overlay.obligations {
        graph.add_obligation(obligation);
    }
    for edge in overlay.obligation_edges {
        graph.add_edge(GraphEdge::Obligation(ObligationEdge {
            id: edge.id,
            license_id: edge.license_id,
            obligation_id: edge.obligation_id,
            trigger: edge.trigger,
            scope: edge.scope,
        }));
    }
    for edge in overlay.compatibility_edges {
        graph.add_edge(GraphEdge::Compatibility(edge));
    }
}

/// Read and parse a YAML overlay file, then apply it to `graph`.
pub fn load_overlay_file(graph: &KnowledgeGraph, path: &Path) -> LreResult<()> {
    let contents = std::fs::read_to_string(path)?;
    let overlay: Overlay = serde_yaml::from_str(&contents)?;
    log::info!("applying knowledge-base overlay from {}", path.display());
    apply_overlay(graph, overlay);
    Ok(())
}

/// Build the built-in graph and, if `overlay_path` is given, apply that
/// overlay on top of it.
pub fn load(overlay_path: Option<&Path>) -> LreResult<KnowledgeGraph> {
    let graph = seed();
    if let Some(path) = overlay_path {
        load_overlay_file(&graph, path)?;
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_populates_expected_counts() {
        let graph = seed();
        let stats = graph.statistics();
        assert_eq!(stats.license_count, LICENSES.len());
        assert_eq!(stats.obligation_count, OBLIGATIONS.len());
        assert!(stats.compatibility_edge_count >= 1);
    }

    #[test]
    fn mit_bsd_edge_is_bidirectional_and_full() {
        let graph = seed();
        let forward = graph.compatibility("MIT", "BSD-3-CLAUSE").unwrap();
        let reverse = graph.compatibility("BSD-3-CLAUSE", "MIT").unwrap();
        assert_eq!(forward.compatibility, CompatibilityLevel::Full);
        assert_eq!(reverse.compatibility, CompatibilityLevel::Full);
    }

    #[test]
    fn overlay_adds_new_license_without_disturbing_existing() {
        let graph = seed();
        let before = graph.statistics().license_count;
        let overlay = Overlay {
            licenses: vec![LicenseNode {
                id: "CUSTOM-1.0".to_string(),
                name: "Custom Test License".to_string(),
                category: LicenseCategory::SourceAvailable,
                copyleft_strength: CopyleftStrength::None,
                family: None,
                version: Some(1.0),
                is_osi_approved: false,
                is_fsf_free: false,
                is_deprecated: false,
            }],
            ..Default::default()
        };
        apply_overlay(&graph, overlay);
        let after = graph.statistics().license_count;
        assert_eq!(after, before + 1);
        assert!(graph.has_license("MIT"));
    }

    #[test]
    fn overlay_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.yaml");
        let overlay = Overlay {
            licenses: vec![LicenseNode {
                id: "CUSTOM-2.0".to_string(),
                name: "Another Custom License".to_string(),
                category: LicenseCategory::SourceAvailable,
                copyleft_strength: CopyleftStrength::None,
                family: None,
                version: Some(2.0),
                is_osi_approved: false,
                is_fsf_free: false,
                is_deprecated: false,
            }],
            ..Default::default()
        };
        std::fs::write(&path, serde_yaml::to_string(&overlay).unwrap()).unwrap();

        let graph = seed();
        load_overlay_file(&graph, &path).unwrap();
        assert!(graph.has_license("CUSTOM-2.0"));
    }
}
