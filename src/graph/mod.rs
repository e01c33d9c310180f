//! Knowledge graph store (component D).
//!
//! A typed, concurrent-readable node/edge store. Edges reference nodes by
//! their canonical id string rather than by pointer, which trades a hash
//! lookup for ownership simplicity and makes the store trivially
//! `Send + Sync`. Each table sits behind its own [`RwLock`]; reads proceed in
//! parallel, writes serialize per table. The store is meant to be fully
//! populated during an initialization phase before any queries begin —
//! see the crate's [`kb`](crate::kb) module for the seed loader.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::models::{
    CompatibilityEdge, Direction, GraphEdge, LicenseCategory, LicenseNode, ObligationEdge,
    ObligationNode,
};
use crate::obligations::{self, AggregatedObligation};

/// Everything known about one license: the node itself, the obligations it
/// directly imposes, and the ids of licenses it has a direct compatibility
/// edge with in either direction. Returned by [`KnowledgeGraph::license_details`].
#[derive(Debug, Clone)]
pub struct LicenseDetails {
    pub license: LicenseNode,
    pub obligations: Vec<AggregatedObligation>,
    pub direct_compatible_with: Vec<String>,
    pub direct_incompatible_with: Vec<String>,
}

/// Snapshot counters returned by [`KnowledgeGraph::statistics`].
#[derive(Debug, Clone)]
pub struct GraphStatistics {
    pub license_count: usize,
    pub obligation_count: usize,
    pub edge_count: usize,
    pub compatibility_edge_count: usize,
    pub category_counts: HashMap<LicenseCategory, usize>,
    pub family_counts: HashMap<String, usize>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Default)]
struct DerivedIndexes {
    outgoing: HashMap<String, Vec<GraphEdge>>,
    incoming: HashMap<String, Vec<GraphEdge>>,
    compatibility: HashMap<(String, String), CompatibilityEdge>,
}

pub struct KnowledgeGraph {
    licenses: RwLock<HashMap<String, LicenseNode>>,
    obligations: RwLock<HashMap<String, ObligationNode>>,
    edges: RwLock<HashMap<(String, String, String), GraphEdge>>,
    indexes: RwLock<DerivedIndexes>,
    family_index: RwLock<HashMap<String, HashSet<String>>>,
    category_index: RwLock<HashMap<LicenseCategory, HashSet<String>>>,
    last_updated: RwLock<DateTime<Utc>>,
}

impl Default for KnowledgeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        KnowledgeGraph {
            licenses: RwLock::new(HashMap::new()),
            obligations: RwLock::new(HashMap::new()),
            edges: RwLock::new(HashMap::new()),
            indexes: RwLock::new(DerivedIndexes::default()),
            family_index: RwLock::new(HashMap::new()),
            category_index: RwLock::new(HashMap::new()),
            last_updated: RwLock::new(Utc::now()),
        }
    }

    fn touch(&self) {
        *self.last_updated.write().expect("last_updated lock poisoned") = Utc::now();
    }

    /// Insert or replace a license node, canonicalizing its id to uppercase
    /// on the way in, and rebuild the family/category indexes.
    pub fn add_license(&self, mut license: LicenseNode) {
        license.id = license.id.trim().to_uppercase();
        self.licenses
            .write()
            .expect("licenses lock poisoned")
            .insert(license.id.clone(), license);
        self.rebuild_license_indexes();
        self.touch();
    }

    pub fn add_obligation(&self, obligation: ObligationNode) {
        self.obligations
            .write()
            .expect("obligations lock poisoned")
            .insert(obligation.id.clone(), obligation);
        self.touch();
    }

    /// Insert or replace an edge, canonicalizing every license id it carries
    /// (source/target for a compatibility edge, `license_id` for the rest)
    /// to trimmed-uppercase first, mirroring [`Self::add_license`]. Adding an
    /// edge identical in `(kind, source, target)` to one already present
    /// replaces it. Inserting a `Bidirectional` compatibility edge also makes
    /// the derived reverse entry available from `compatibility(target, source)`.
    pub fn add_edge(&self, mut edge: GraphEdge) {
        edge.canonicalize_license_ids();
        let key = (
            edge.kind_tag().to_string(),
            edge.source().to_string(),
            edge.target().to_string(),
        );
        self.edges
            .write()
            .expect("edges lock poisoned")
            .insert(key, edge);
        self.rebuild_edge_indexes();
        self.touch();
    }

    /// Atomically empty every table and index.
    pub fn clear(&self) {
        self.licenses.write().expect("licenses lock poisoned").clear();
        self.obligations
            .write()
            .expect("obligations lock poisoned")
            .clear();
        self.edges.write().expect("edges lock poisoned").clear();
        *self.indexes.write().expect("indexes lock poisoned") = DerivedIndexes::default();
        self.family_index
            .write()
            .expect("family index lock poisoned")
            .clear();
        self.category_index
            .write()
            .expect("category index lock poisoned")
            .clear();
        self.touch();
    }

    fn rebuild_edge_indexes(&self) {
        let edges = self.edges.read().expect("edges lock poisoned");
        let mut derived = DerivedIndexes::default();
        for edge in edges.values() {
            derived
                .outgoing
                .entry(edge.source().to_string())
                .or_default()
                .push(edge.clone());
            derived
                .incoming
                .entry(edge.target().to_string())
                .or_default()
                .push(edge.clone());

            if let GraphEdge::Compatibility(compat) = edge {
                derived
                    .compatibility
                    .insert((compat.source.clone(), compat.target.clone()), compat.clone());
                if matches!(compat.direction, Direction::Bidirectional) {
                    let reverse = compat.reversed();
                    derived
                        .compatibility
                        .insert((reverse.source.clone(), reverse.target.clone()), reverse);
                }
            }
        }
        *self.indexes.write().expect("indexes lock poisoned") = derived;
    }

    fn rebuild_license_indexes(&self) {
        let licenses = self.licenses.read().expect("licenses lock poisoned");
        let mut family_index: HashMap<String, HashSet<String>> = HashMap::new();
        let mut category_index: HashMap<LicenseCategory, HashSet<String>> = HashMap::new();
        for license in licenses.values() {
            if let Some(family) = &license.family {
                family_index
                    .entry(family.clone())
                    .or_default()
                    .insert(license.id.clone());
            }
            category_index
                .entry(license.category)
                .or_default()
                .insert(license.id.clone());
        }
        *self.family_index.write().expect("family index lock poisoned") = family_index;
        *self
            .category_index
            .write()
            .expect("category index lock poisoned") = category_index;
    }

    pub fn has_license(&self, id: &str) -> bool {
        self.licenses
            .read()
            .expect("licenses lock poisoned")
            .contains_key(id)
    }

    pub fn get_license(&self, id: &str) -> Option<LicenseNode> {
        self.licenses
            .read()
            .expect("licenses lock poisoned")
            .get(id)
            .cloned()
    }

    pub fn get_obligation(&self, id: &str) -> Option<ObligationNode> {
        self.obligations
            .read()
            .expect("obligations lock poisoned")
            .get(id)
            .cloned()
    }

    /// Outgoing edges of `node_id`, in insertion-nondeterministic order (callers
    /// that need a stable order sort the projection they care about).
    pub fn outgoing(&self, node_id: &str) -> Vec<GraphEdge> {
        self.indexes
            .read()
            .expect("indexes lock poisoned")
            .outgoing
            .get(node_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn incoming(&self, node_id: &str) -> Vec<GraphEdge> {
        self.indexes
            .read()
            .expect("indexes lock poisoned")
            .incoming
            .get(node_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Direct `(source, target)` compatibility edge lookup, O(1) via the
    /// derived index (including the synthesized reverse of bidirectional edges).
    pub fn compatibility(&self, source: &str, target: &str) -> Option<CompatibilityEdge> {
        self.indexes
            .read()
            .expect("indexes lock poisoned")
            .compatibility
            .get(&(source.to_string(), target.to_string()))
            .cloned()
    }

    /// Obligation edges attached to `license_id`.
    pub fn obligation_edges_for(&self, license_id: &str) -> Vec<ObligationEdge> {
        self.outgoing(license_id)
            .into_iter()
            .filter_map(|edge| match edge {
                GraphEdge::Obligation(o) => Some(o),
                _ => None,
            })
            .collect()
    }

    pub fn licenses_in_family(&self, family: &str) -> HashSet<String> {
        self.family_index
            .read()
            .expect("family index lock poisoned")
            .get(family)
            .cloned()
            .unwrap_or_default()
    }

    pub fn licenses_in_category(&self, category: LicenseCategory) -> HashSet<String> {
        self.category_index
            .read()
            .expect("category index lock poisoned")
            .get(&category)
            .cloned()
            .unwrap_or_default()
    }

    /// Look up everything known about `license_id`: the node itself, its
    /// directly-imposed obligations, and the ids it has a direct
    /// compatibility edge to/from (not the full inferred cascade — see
    /// [`crate::compat::check`] for that). Returns `None` if `license_id`
    /// is absent from the graph.
    pub fn license_details(&self, license_id: &str) -> Option<LicenseDetails> {
        let license = self.get_license(license_id)?;
        let obligations = obligations::obligations_for_license(self, license_id);

        let mut direct_compatible_with = Vec::new();
        let mut direct_incompatible_with = Vec::new();
        for edge in self.outgoing(license_id) {
            if let GraphEdge::Compatibility(compat) = edge {
                if compat.compatibility.is_compatible() {
                    direct_compatible_with.push(compat.target);
                } else {
                    direct_incompatible_with.push(compat.target);
                }
            }
        }
        direct_compatible_with.sort();
        direct_compatible_with.dedup();
        direct_incompatible_with.sort();
        direct_incompatible_with.dedup();

        Some(LicenseDetails {
            license,
            obligations,
            direct_compatible_with,
            direct_incompatible_with,
        })
    }

    pub fn statistics(&self) -> GraphStatistics {
        let licenses = self.licenses.read().expect("licenses lock poisoned");
        let obligations = self.obligations.read().expect("obligations lock poisoned");
        let edges = self.edges.read().expect("edges lock poisoned");
        let category_index = self
            .category_index
            .read()
            .expect("category index lock poisoned");
        let family_index = self.family_index.read().expect("family index lock poisoned");
        let compatibility_edge_count = edges
            .values()
            .filter(|e| matches!(e, GraphEdge::Compatibility(_)))
            .count();

        GraphStatistics {
            license_count: licenses.len(),
            obligation_count: obligations.len(),
            edge_count: edges.len(),
            compatibility_edge_count,
            category_counts: category_index.iter().map(|(k, v)| (*k, v.len())).collect(),
            family_counts: family_index.iter().map(|(k, v)| (k.clone(), v.len())).collect(),
            last_updated: *self.last_updated.read().expect("last_updated lock poisoned"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb;

    #[test]
    fn clear_empties_every_index() {
        let graph = kb::seed();
        assert!(graph.statistics().license_count > 0);
        graph.clear();
        let stats = graph.statistics();
        assert_eq!(stats.license_count, 0);
        assert_eq!(stats.obligation_count, 0);
        assert_eq!(stats.edge_count, 0);
        assert!(graph.compatibility("MIT", "APACHE-2.0").is_none());
    }

    #[test]
    fn bidirectional_edge_is_readable_from_either_direction() {
        let graph = KnowledgeGraph::new();
        graph.add_edge(GraphEdge::Compatibility(CompatibilityEdge {
            id: "mit-bsd".to_string(),
            source: "MIT".to_string(),
            target: "BSD-3-CLAUSE".to_string(),
            compatibility: crate::models::CompatibilityLevel::Full,
            direction: Direction::Bidirectional,
            conditions: vec![],
            sources: vec![],
        }));
        let forward = graph.compatibility("MIT", "BSD-3-CLAUSE").unwrap();
        let reverse = graph.compatibility("BSD-3-CLAUSE", "MIT").unwrap();
        assert_eq!(forward.compatibility, reverse.compatibility);
        assert_eq!(reverse.id, "mit-bsd-reverse");
    }

    #[test]
    fn duplicate_edge_insert_replaces_prior() {
        let graph = KnowledgeGraph::new();
        let make = |level| {
            GraphEdge::Compatibility(CompatibilityEdge {
                id: "a-b".to_string(),
                source: "A".to_string(),
                target: "B".to_string(),
                compatibility: level,
                direction: Direction::Forward,
                conditions: vec![],
                sources: vec![],
            })
        };
        graph.add_edge(make(crate::models::CompatibilityLevel::Full));
        graph.add_edge(make(crate::models::CompatibilityLevel::Incompatible));
        let stats = graph.statistics();
        assert_eq!(stats.edge_count, 1);
        assert_eq!(
            graph.compatibility("A", "B").unwrap().compatibility,
            crate::models::CompatibilityLevel::Incompatible
        );
    }

    #[test]
    fn add_edge_canonicalizes_license_ids() {
        let graph = KnowledgeGraph::new();
        graph.add_edge(GraphEdge::Compatibility(CompatibilityEdge {
            id: "mixed-case".to_string(),
            source: "Mit".to_string(),
            target: "Apache-2.0".to_string(),
            compatibility: crate::models::CompatibilityLevel::Full,
            direction: Direction::Forward,
            conditions: vec![],
            sources: vec![],
        }));
        assert!(graph.compatibility("MIT", "APACHE-2.0").is_some());
        assert!(graph.compatibility("Mit", "Apache-2.0").is_none());

        graph.add_edge(GraphEdge::Obligation(crate::models::ObligationEdge {
            id: "mixed-case-obligation".to_string(),
            license_id: "Mit".to_string(),
            obligation_id: "attribution-notice".to_string(),
            trigger: crate::models::ObligationTrigger::OnDistribution,
            scope: crate::models::ObligationScope::Component,
        }));
        assert_eq!(graph.obligation_edges_for("MIT").len(), 1);
        assert!(graph.obligation_edges_for("Mit").is_empty());
    }

    #[test]
    fn license_details_joins_node_and_obligations() {
        let graph = kb::seed();
        let details = graph.license_details("MIT").expect("MIT is seeded");
        assert_eq!(details.license.id, "MIT");
        assert!(details.obligations.iter().any(|o| o.obligation_id.contains("attribution")));
    }

    #[test]
    fn license_details_is_none_for_unknown_license() {
        let graph = kb::seed();
        assert!(graph.license_details("TOTALLY-MADE-UP").is_none());
    }

    #[test]
    fn rebuilding_indexes_from_edges_is_idempotent() {
        let graph = kb::seed();
        let before = graph.statistics().compatibility_edge_count;
        graph.rebuild_edge_indexes();
        let after = graph.statistics().compatibility_edge_count;
        assert_eq!(before, after);
    }
}
