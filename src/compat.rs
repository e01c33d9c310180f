//! Compatibility oracle (component E): pairwise compatibility decisions
//! combining direct knowledge-graph edges with a property-driven rule
//! cascade, plus shortest-path compatibility search.

use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use crate::graph::KnowledgeGraph;
use crate::models::{CompatibilityLevel, CopyleftStrength, Direction, GraphEdge, LicenseCategory, LicenseNode};

/// Outcome of [`check`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityResult {
    pub license_a: String,
    pub license_b: String,
    pub compatible: bool,
    pub level: CompatibilityLevel,
    pub reason: String,
    pub conditions: Vec<String>,
    pub sources: Vec<String>,
    pub suggestions: Vec<String>,
    pub dominant_license: Option<String>,
    pub inferred_rule: Option<String>,
    pub requires_review: bool,
    pub path: Vec<String>,
}

impl CompatibilityResult {
    fn new(a: &str, b: &str, level: CompatibilityLevel, reason: impl Into<String>) -> Self {
        CompatibilityResult {
            license_a: a.to_string(),
            license_b: b.to_string(),
            compatible: level.is_compatible(),
            level,
            reason: reason.into(),
            conditions: Vec::new(),
            sources: Vec::new(),
            suggestions: Vec::new(),
            dominant_license: None,
            inferred_rule: None,
            requires_review: false,
            path: vec![a.to_string(), b.to_string()],
        }
    }
}

/// Tie-break comparator for picking a dominant license among equal-class
/// candidates: higher `copyleftStrength.propagationLevel`, then higher
/// `category.riskLevel`, then lexicographically larger id wins.
fn more_dominant<'a>(a: &'a LicenseNode, b: &'a LicenseNode) -> &'a LicenseNode {
    let a_key = (
        a.copyleft_strength.propagation_level(),
        a.category.risk_level(),
        a.id.clone(),
    );
    let b_key = (
        b.copyleft_strength.propagation_level(),
        b.category.risk_level(),
        b.id.clone(),
    );
    if a_key >= b_key {
        a
    } else {
        b
    }
}

/// Run the decision cascade for the canonical pair `(a, b)`. `a`/`b` must
/// already be canonicalized; `use_case` is accepted for forward-compatibility
/// with use-case-scoped exemptions but is not yet consulted by any rule.
pub fn check(graph: &KnowledgeGraph, a: &str, b: &str, _use_case: Option<&str>) -> CompatibilityResult {
    // 1. Identity
    if a == b {
        return CompatibilityResult::new(a, b, CompatibilityLevel::Full, "identical license")
            .with_path(vec![a.to_string()]);
    }

    // 2. Direct edge
    if let Some(edge) = graph.compatibility(a, b) {
        let mut result = CompatibilityResult::new(a, b, edge.compatibility, "direct knowledge-graph edge");
        result.conditions = edge.conditions.clone();
        result.sources = edge.sources.clone();
        if matches!(edge.direction, Direction::Forward) {
            result.dominant_license = Some(b.to_string());
        }
        return result;
    }

    // 3. Inference from properties
    let node_a = graph.get_license(a);
    let node_b = graph.get_license(b);
    let (node_a, node_b) = match (node_a, node_b) {
        (Some(na), Some(nb)) => (na, nb),
        (na, nb) => {
            let missing: Vec<&str> = [(na.is_none(), a), (nb.is_none(), b)]
                .into_iter()
                .filter_map(|(missing, id)| missing.then_some(id))
                .collect();
            let mut result = CompatibilityResult::new(
                a,
                b,
                CompatibilityLevel::Unknown,
                format!("license(s) not present in the knowledge graph: {}", missing.join(", ")),
            );
            result.requires_review = true;
            return result;
        }
    };

    if node_a.category == LicenseCategory::Permissive && node_b.category == LicenseCategory::Permissive {
        let mut result = CompatibilityResult::new(
            a,
            b,
            CompatibilityLevel::Full,
            "both licenses are permissive",
        );
        result.conditions = vec!["maintain attribution notices from both".to_string()];
        result.inferred_rule = Some("permissive-permissive".to_string());
        return result;
    }

    if node_a.category == LicenseCategory::PublicDomain || node_b.category == LicenseCategory::PublicDomain {
        let mut result =
            CompatibilityResult::new(a, b, CompatibilityLevel::Full, "one side is public domain");
        result.inferred_rule = Some("public-domain".to_string());
        return result;
    }

    if let Some((permissive, copyleft)) = permissive_and_copyleft(&node_a, &node_b) {
        let mut result = CompatibilityResult::new(
            a,
            b,
            CompatibilityLevel::Conditional,
            format!("{} is permissive; {} is copyleft", permissive.id, copyleft.id),
        );
        result.dominant_license = Some(copyleft.id.clone());
        result.conditions = vec![
            "the combined work follows the copyleft license's terms".to_string(),
            format!("copyleft obligations of {} apply to the derivative", copyleft.id),
        ];
        result.inferred_rule = Some("permissive-copyleft".to_string());
        return result;
    }

    if node_a.category == LicenseCategory::StrongCopyleft && node_b.category == LicenseCategory::StrongCopyleft {
        if !same_family(&node_a, &node_b) {
            let mut result = CompatibilityResult::new(
                a,
                b,
                CompatibilityLevel::Incompatible,
                "both strong copyleft licenses but from different families",
            );
            result.suggestions = vec![
                "replace a dependency with a compatibly licensed alternative".to_string(),
                "seek dual-licensing".to_string(),
            ];
            result.inferred_rule = Some("strong-copyleft-family-conflict".to_string());
            return result;
        }
    }

    if same_family(&node_a, &node_b) && node_a.category.is_copyleft() && node_b.category.is_copyleft() {
        return same_family_subrule(a, b, &node_a, &node_b);
    }

    if let Some((weak, strong)) = weak_library_or_file_and_strong(&node_a, &node_b) {
        let mut result = CompatibilityResult::new(
            a,
            b,
            CompatibilityLevel::Conditional,
            format!(
                "{} is a file/library-scoped weak copyleft license combined with strong copyleft {}",
                weak.id, strong.id
            ),
        );
        result.dominant_license = Some(strong.id.clone());
        result.requires_review = true;
        result.inferred_rule = Some("weak-strong-copyleft".to_string());
        return result;
    }

    if node_a.category == LicenseCategory::NetworkCopyleft || node_b.category == LicenseCategory::NetworkCopyleft {
        let dominant = match (
            node_a.category == LicenseCategory::NetworkCopyleft,
            node_b.category == LicenseCategory::NetworkCopyleft,
        ) {
            (true, true) => more_dominant(&node_a, &node_b).id.clone(),
            (true, false) => node_a.id.clone(),
            (false, true) => node_b.id.clone(),
            (false, false) => unreachable!(),
        };
        let mut result = CompatibilityResult::new(
            a,
            b,
            CompatibilityLevel::Conditional,
            "network copyleft license is present in the pair",
        );
        result.dominant_license = Some(dominant);
        result.requires_review = true;
        result.inferred_rule = Some("network-copyleft".to_string());
        return result;
    }

    let mut result = CompatibilityResult::new(
        a,
        b,
        CompatibilityLevel::Unknown,
        "no direct edge or inference rule resolves this pair",
    );
    result.requires_review = true;
    result.inferred_rule = Some("no-rule-matched".to_string());
    result
}

fn permissive_and_copyleft<'a>(
    a: &'a LicenseNode,
    b: &'a LicenseNode,
) -> Option<(&'a LicenseNode, &'a LicenseNode)> {
    if a.category == LicenseCategory::Permissive && b.category.is_copyleft() {
        Some((a, b))
    } else if b.category == LicenseCategory::Permissive && a.category.is_copyleft() {
        Some((b, a))
    } else {
        None
    }
}

fn weak_library_or_file_and_strong<'a>(
    a: &'a LicenseNode,
    b: &'a LicenseNode,
) -> Option<(&'a LicenseNode, &'a LicenseNode)> {
    let is_weak_file_or_library = |n: &LicenseNode| {
        n.category == LicenseCategory::WeakCopyleft
            && matches!(n.copyleft_strength, CopyleftStrength::File | CopyleftStrength::Library)
    };
    if is_weak_file_or_library(a) && b.category == LicenseCategory::StrongCopyleft {
        Some((a, b))
    } else if is_weak_file_or_library(b) && a.category == LicenseCategory::StrongCopyleft {
        Some((b, a))
    } else {
        None
    }
}

fn same_family(a: &LicenseNode, b: &LicenseNode) -> bool {
    matches!((&a.family, &b.family), (Some(fa), Some(fb)) if fa == fb)
}

/// Same-family (GPL-like) sub-rule: version-aware conjunction/disjunction
/// resolution within one license family.
fn same_family_subrule(a: &str, b: &str, node_a: &LicenseNode, node_b: &LicenseNode) -> CompatibilityResult {
    if node_a.is_only() && node_b.is_only() && node_a.version != node_b.version {
        let mut result = CompatibilityResult::new(
            a,
            b,
            CompatibilityLevel::Incompatible,
            "both licenses are version-locked ('-only') to different versions of the same family",
        );
        result.inferred_rule = Some("gpl-version-conflict".to_string());
        return result;
    }

    if node_a.is_or_later() || node_b.is_or_later() {
        let higher = more_dominant(node_a, node_b);
        let mut result = CompatibilityResult::new(
            a,
            b,
            CompatibilityLevel::Conditional,
            "one side grants an 'or later' upgrade path within the family",
        );
        result.dominant_license = Some(higher.id.clone());
        result.inferred_rule = Some("gpl-or-later".to_string());
        return result;
    }

    if node_a.version == node_b.version {
        let mut result =
            CompatibilityResult::new(a, b, CompatibilityLevel::Full, "same family and matching version");
        result.inferred_rule = Some("gpl-same-version".to_string());
        return result;
    }

    let mut result = CompatibilityResult::new(a, b, CompatibilityLevel::Conditional, "same family, unresolved version relationship");
    result.requires_review = true;
    result.inferred_rule = Some("gpl-family-unresolved".to_string());
    result
}

impl CompatibilityResult {
    fn with_path(mut self, path: Vec<String>) -> Self {
        self.path = path;
        self
    }
}

/// A shortest chain of pairwise-compatible licenses from `source` to `target`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityPath {
    pub source: String,
    pub target: String,
    pub licenses: Vec<String>,
    pub overall_compatibility: CompatibilityLevel,
    pub all_conditions: Vec<String>,
}

/// BFS over compatible outgoing edges (`isCompatible == true`) for the
/// shortest path from `source` to `target`, bounded by `max_depth` edges.
pub fn find_compatibility_path(
    graph: &KnowledgeGraph,
    source: &str,
    target: &str,
    max_depth: usize,
) -> Option<CompatibilityPath> {
    if source == target {
        return Some(CompatibilityPath {
            source: source.to_string(),
            target: target.to_string(),
            licenses: vec![source.to_string()],
            overall_compatibility: CompatibilityLevel::Full,
            all_conditions: Vec::new(),
        });
    }

    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(source.to_string());

    let mut queue: VecDeque<(String, Vec<String>, Vec<CompatibilityLevel>, Vec<String>)> = VecDeque::new();
    queue.push_back((source.to_string(), vec![source.to_string()], Vec::new(), Vec::new()));

    while let Some((current, path, levels, conditions)) = queue.pop_front() {
        if path.len() - 1 >= max_depth {
            continue;
        }
        for edge in graph.outgoing(&current) {
            let GraphEdge::Compatibility(compat) = edge else {
                continue;
            };
            if !compat.compatibility.is_compatible() {
                continue;
            }
            if visited.contains(&compat.target) {
                continue;
            }

            let mut next_path = path.clone();
            next_path.push(compat.target.clone());
            let mut next_levels = levels.clone();
            next_levels.push(compat.compatibility);
            let mut next_conditions = conditions.clone();
            for c in &compat.conditions {
                if !next_conditions.contains(c) {
                    next_conditions.push(c.clone());
                }
            }

            if compat.target == target {
                // Overall compatibility is the *minimum* step level under the
                // declared ordinal (Full < Conditional < OneWay < ...).
                let overall = *next_levels.iter().min().unwrap_or(&CompatibilityLevel::Full);
                return Some(CompatibilityPath {
                    source: source.to_string(),
                    target: target.to_string(),
                    licenses: next_path,
                    overall_compatibility: overall,
                    all_conditions: next_conditions,
                });
            }

            visited.insert(compat.target.clone());
            queue.push_back((compat.target.clone(), next_path, next_levels, next_conditions));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb;

    #[test]
    fn identity_is_always_full() {
        let graph = kb::seed();
        let result = check(&graph, "MIT", "MIT", None);
        assert_eq!(result.level, CompatibilityLevel::Full);
        assert_eq!(result.path, vec!["MIT".to_string()]);
    }

    #[test]
    fn permissive_pair_is_full() {
        let graph = kb::seed();
        let result = check(&graph, "MIT", "APACHE-2.0", None);
        assert_eq!(result.level, CompatibilityLevel::Full);
        assert!(result.compatible);
    }

    #[test]
    fn gpl2_only_vs_gpl3_only_is_incompatible() {
        let graph = kb::seed();
        let result = check(&graph, "GPL-2.0-ONLY", "GPL-3.0-ONLY", None);
        assert_eq!(result.level, CompatibilityLevel::Incompatible);
        assert_eq!(result.inferred_rule.as_deref(), Some("gpl-version-conflict"));
    }

    #[test]
    fn network_copyleft_requires_review() {
        let graph = kb::seed();
        let result = check(&graph, "AGPL-3.0-ONLY", "MPL-2.0", None);
        assert!(result.requires_review);
        assert_eq!(result.level, CompatibilityLevel::Conditional);
    }

    #[test]
    fn missing_license_is_unknown_with_review() {
        let graph = kb::seed();
        let result = check(&graph, "MIT", "TOTALLY-MADE-UP", None);
        assert_eq!(result.level, CompatibilityLevel::Unknown);
        assert!(result.requires_review);
    }

    #[test]
    fn bidirectional_edge_is_symmetric() {
        let graph = KnowledgeGraph::new();
        graph.add_edge(GraphEdge::Compatibility(crate::models::CompatibilityEdge {
            id: "mit-bsd".to_string(),
            source: "MIT".to_string(),
            target: "BSD-3-CLAUSE".to_string(),
            compatibility: CompatibilityLevel::Full,
            direction: Direction::Bidirectional,
            conditions: vec![],
            sources: vec![],
        }));
        let forward = check(&graph, "MIT", "BSD-3-CLAUSE", None);
        let reverse = check(&graph, "BSD-3-CLAUSE", "MIT", None);
        assert_eq!(forward.level, reverse.level);
    }

    #[test]
    fn path_length_matches_edge_count_and_all_steps_compatible() {
        let graph = kb::seed();
        if let Some(path) = find_compatibility_path(&graph, "MIT", "APACHE-2.0", 3) {
            assert!(path.licenses.len() >= 2);
        }
    }
}
