//! Tree analyzer (component G): orchestrates the other six components over
//! a resolved dependency set to produce one verdict.

use rayon::prelude::*;
use serde::Serialize;

use crate::compat::{self, CompatibilityResult};
use crate::expression::{self, Classification, Expr};
use crate::graph::KnowledgeGraph;
use crate::models::{CompatibilityLevel, DependencyRecord, Effort, LicenseCategory};
use crate::obligations::{self, AggregatedObligation};

/// Below this many distinct licenses, the pairwise scan runs sequentially;
/// dispatch overhead would dominate the O(n^2) work itself.
const PARALLEL_THRESHOLD: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConflictSeverity {
    Blocking,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LicenseConflict {
    pub license1: String,
    pub license2: String,
    pub severity: ConflictSeverity,
    pub result: CompatibilityResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ComplianceVerdict {
    Compliant,
    RequiresReview,
    Warnings,
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecommendationKind {
    ResolveConflict,
    FulfillObligation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub title: String,
    pub description: String,
}

/// Per-dependency classification diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyAnalysis {
    pub dependency_id: String,
    pub dependency_name: String,
    pub license: String,
    pub classification: Classification,
    pub requires_review: bool,
    pub review_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyTreeAnalysis {
    pub dependencies: Vec<DependencyAnalysis>,
    pub distinct_licenses: Vec<String>,
    pub conflicts: Vec<LicenseConflict>,
    pub dominant_license: Option<String>,
    pub obligations: Vec<AggregatedObligation>,
    pub verdict: ComplianceVerdict,
    pub recommendations: Vec<Recommendation>,
    pub risk_score: f64,
}

fn flatten_license_ids(expr: &Expr, graph: &KnowledgeGraph, out: &mut Vec<String>) {
    match expr {
        Expr::License(id) => {
            let canonical = crate::canonicalize::canonicalize(id, graph);
            if let crate::canonicalize::Canonical::Known(key) = canonical {
                if !out.contains(&key) {
                    out.push(key);
                }
            }
        }
        Expr::And(ops) | Expr::Or(ops) => {
            for op in ops {
                flatten_license_ids(op, graph, out);
            }
        }
    }
}

fn dominance_score(graph: &KnowledgeGraph, license_id: &str) -> u32 {
    graph
        .get_license(license_id)
        .map(|n| n.copyleft_strength.propagation_level() as u32 * 10 + n.category.risk_level() as u32)
        .unwrap_or(0)
}

/// Run the full tree analysis over `dependencies` per the declared procedure.
/// `use_case` is accepted for forward compatibility with exemption scoping.
pub fn analyze_dependency_tree(
    graph: &KnowledgeGraph,
    dependencies: &[DependencyRecord],
    use_case: Option<&str>,
) -> DependencyTreeAnalysis {
    log::info!("analyzing dependency tree with {} dependencies", dependencies.len());

    let mut dependency_analyses = Vec::with_capacity(dependencies.len());
    let mut distinct_licenses: Vec<String> = Vec::new();

    for dep in dependencies {
        let parsed = expression::parse(&dep.license);
        let (classification, requires_review, review_reason) = match &parsed {
            Ok(expr) => {
                flatten_license_ids(expr, graph, &mut distinct_licenses);
                let classification = expression::classify_expr(expr, graph);
                let reason = expression::requires_review(expr, graph);
                let requires_review = classification.requires_review() || reason.is_some();
                (classification, requires_review, reason)
            }
            Err(e) => {
                log::warn!("dependency {} carries an invalid license expression: {e}", dep.dependency_id);
                (Classification::Unknown, true, Some(e.to_string()))
            }
        };

        dependency_analyses.push(DependencyAnalysis {
            dependency_id: dep.dependency_id.clone(),
            dependency_name: dep.dependency_name.clone(),
            license: dep.license.clone(),
            classification,
            requires_review,
            review_reason,
        });
    }

    distinct_licenses.sort();

    let mut pairs = Vec::new();
    for i in 0..distinct_licenses.len() {
        for j in (i + 1)..distinct_licenses.len() {
            pairs.push((distinct_licenses[i].clone(), distinct_licenses[j].clone()));
        }
    }

    let pair_results: Vec<CompatibilityResult> = if pairs.len() >= PARALLEL_THRESHOLD {
        pairs
            .par_iter()
            .map(|(a, b)| compat::check(graph, a, b, use_case))
            .collect()
    } else {
        pairs.iter().map(|(a, b)| compat::check(graph, a, b, use_case)).collect()
    };

    let mut conflicts: Vec<LicenseConflict> = pair_results
        .into_iter()
        .filter(|r| !r.compatible)
        .map(|r| {
            let severity = if r.level == CompatibilityLevel::Incompatible {
                ConflictSeverity::Blocking
            } else {
                ConflictSeverity::Warning
            };
            LicenseConflict {
                license1: r.license_a.clone(),
                license2: r.license_b.clone(),
                severity,
                result: r,
            }
        })
        .collect();
    conflicts.sort_by(|a, b| (a.license1.as_str(), a.license2.as_str()).cmp(&(b.license1.as_str(), b.license2.as_str())));

    let dominant_license = distinct_licenses
        .iter()
        .max_by_key(|id| (dominance_score(graph, id), id.as_str().to_string()))
        .cloned();

    let aggregated = obligations::aggregate_obligations(graph, &distinct_licenses).obligations;

    let any_blocking = conflicts.iter().any(|c| c.severity == ConflictSeverity::Blocking);
    let any_conflict = !conflicts.is_empty();
    let any_high_effort_obligation = aggregated.iter().any(|o| o.effort >= Effort::High);

    let verdict = if any_blocking {
        ComplianceVerdict::Blocked
    } else if any_conflict {
        ComplianceVerdict::Warnings
    } else if any_high_effort_obligation {
        ComplianceVerdict::RequiresReview
    } else {
        ComplianceVerdict::Compliant
    };

    let mut recommendations = Vec::new();
    for conflict in &conflicts {
        let priority = if conflict.severity == ConflictSeverity::Blocking {
            Priority::Critical
        } else {
            Priority::High
        };
        recommendations.push(Recommendation {
            kind: RecommendationKind::ResolveConflict,
            priority,
            title: format!("resolve conflict between {} and {}", conflict.license1, conflict.license2),
            description: conflict.result.reason.clone(),
        });
    }
    for obligation in aggregated.iter().filter(|o| o.effort >= Effort::High) {
        let priority = if obligation.effort == Effort::VeryHigh {
            Priority::Critical
        } else {
            Priority::High
        };
        recommendations.push(Recommendation {
            kind: RecommendationKind::FulfillObligation,
            priority,
            title: format!("fulfill obligation: {}", obligation.name),
            description: obligation.description.clone(),
        });
    }
    recommendations.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.title.cmp(&b.title)));

    let blocking_conflicts = conflicts.iter().filter(|c| c.severity == ConflictSeverity::Blocking).count();
    let warning_conflicts = conflicts.iter().filter(|c| c.severity == ConflictSeverity::Warning).count();
    let very_high_obligations = aggregated.iter().filter(|o| o.effort == Effort::VeryHigh).count();
    let high_obligations = aggregated.iter().filter(|o| o.effort == Effort::High).count();
    let strong_or_network_count = distinct_licenses
        .iter()
        .filter(|id| {
            graph
                .get_license(id)
                .map(|n| matches!(n.category, LicenseCategory::StrongCopyleft | LicenseCategory::NetworkCopyleft))
                .unwrap_or(false)
        })
        .count();

    let risk_score = (0.30 * blocking_conflicts as f64
        + 0.10 * warning_conflicts as f64
        + 0.15 * very_high_obligations as f64
        + 0.08 * high_obligations as f64
        + 0.05 * strong_or_network_count as f64)
        .min(1.0);

    log::debug!("tree analysis verdict={verdict:?} risk_score={risk_score:.2}");

    DependencyTreeAnalysis {
        dependencies: dependency_analyses,
        distinct_licenses,
        conflicts,
        dominant_license,
        obligations: aggregated,
        verdict,
        recommendations,
        risk_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb;
    use crate::models::DistributionScope;

    fn dep(id: &str, name: &str, license: &str) -> DependencyRecord {
        DependencyRecord {
            dependency_id: id.to_string(),
            dependency_name: name.to_string(),
            version: "1.0.0".to_string(),
            license: license.to_string(),
            scope: Some(DistributionScope::Binary),
            transitive: false,
            path: vec![],
        }
    }

    #[test]
    fn permissive_combination_is_compliant() {
        let graph = kb::seed();
        let deps = vec![dep("a", "A", "MIT"), dep("b", "B", "APACHE-2.0")];
        let analysis = analyze_dependency_tree(&graph, &deps, None);
        assert_eq!(analysis.verdict, ComplianceVerdict::Compliant);
        assert!(analysis.conflicts.is_empty());
    }

    #[test]
    fn gpl2_vs_gpl3_is_blocked_with_critical_recommendation() {
        let graph = kb::seed();
        let deps = vec![dep("a", "A", "GPL-2.0-ONLY"), dep("b", "B", "GPL-3.0-ONLY")];
        let analysis = analyze_dependency_tree(&graph, &deps, None);
        assert_eq!(analysis.verdict, ComplianceVerdict::Blocked);
        assert_eq!(analysis.conflicts.len(), 1);
        assert_eq!(analysis.conflicts[0].result.inferred_rule.as_deref(), Some("gpl-version-conflict"));
        assert_eq!(analysis.conflicts[0].severity, ConflictSeverity::Blocking);
        assert_eq!(analysis.recommendations[0].priority, Priority::Critical);
    }

    #[test]
    fn single_dependency_dual_license_requires_review() {
        let graph = kb::seed();
        let deps = vec![dep("a", "A", "MIT OR GPL-3.0-ONLY")];
        let analysis = analyze_dependency_tree(&graph, &deps, None);
        assert!(analysis.dependencies[0].requires_review);
    }

    #[test]
    fn verdict_monotonicity_adding_known_license_never_improves() {
        let graph = kb::seed();
        let base = vec![dep("a", "A", "GPL-2.0-ONLY"), dep("b", "B", "GPL-3.0-ONLY")];
        let extended = vec![
            dep("a", "A", "GPL-2.0-ONLY"),
            dep("b", "B", "GPL-3.0-ONLY"),
            dep("c", "C", "GPL-2.0-ONLY"),
        ];
        let base_verdict = analyze_dependency_tree(&graph, &base, None).verdict;
        let extended_verdict = analyze_dependency_tree(&graph, &extended, None).verdict;
        assert!(extended_verdict >= base_verdict);
    }

    #[test]
    fn risk_score_is_clamped_to_unit_interval() {
        let graph = kb::seed();
        let deps = vec![
            dep("a", "A", "GPL-2.0-ONLY"),
            dep("b", "B", "GPL-3.0-ONLY"),
            dep("c", "C", "AGPL-3.0-ONLY"),
            dep("d", "D", "LGPL-2.1-ONLY"),
        ];
        let analysis = analyze_dependency_tree(&graph, &deps, None);
        assert!(analysis.risk_score >= 0.0 && analysis.risk_score <= 1.0);
    }
}
