//! Obligation aggregator (component F): per-license obligation lookup,
//! cross-license aggregation, and distribution-scope filtering/adjustment.

use std::collections::HashMap;

use serde::Serialize;

use crate::graph::KnowledgeGraph;
use crate::models::{CopyleftStrength, DistributionScope, Effort, ObligationNode, ObligationScope, ObligationTrigger};

/// One obligation after aggregation across a set of licenses: the node's
/// intrinsic description plus the most restrictive scope/trigger observed
/// and the licenses that impose it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedObligation {
    pub obligation_id: String,
    pub name: String,
    pub description: String,
    pub trigger: ObligationTrigger,
    pub scope: ObligationScope,
    pub effort: Effort,
    pub source_licenses: Vec<String>,
}

/// Result of [`aggregate_obligations`]: the de-duplicated, most-restrictive
/// obligation list for a license set, plus the two summary figures the
/// aggregator is required to emit alongside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedObligations {
    pub obligations: Vec<AggregatedObligation>,
    /// Max effort across every obligation in the list; `Effort::Trivial` when
    /// the list is empty.
    pub highest_effort: Effort,
    pub unique_obligation_count: usize,
}

/// Every obligation directly attached to `license_id`, joined against the
/// obligation node table. Edges whose target obligation id is absent from
/// the node table are skipped.
pub fn obligations_for_license(graph: &KnowledgeGraph, license_id: &str) -> Vec<AggregatedObligation> {
    graph
        .obligation_edges_for(license_id)
        .into_iter()
        .filter_map(|edge| {
            let node = graph.get_obligation(&edge.obligation_id)?;
            Some(AggregatedObligation {
                obligation_id: node.id,
                name: node.name,
                description: node.description,
                trigger: edge.trigger,
                scope: edge.scope,
                effort: node.effort,
                source_licenses: vec![license_id.to_string()],
            })
        })
        .collect()
}

/// Union the obligations of every license in `license_ids`. Obligations that
/// recur across licenses (same obligation id) collapse into one entry whose
/// scope is the most restrictive of the contributing edges and whose
/// `source_licenses` lists every license that imposes it. Sorted by effort
/// descending, ties broken by obligation id ascending.
fn merge_obligations(graph: &KnowledgeGraph, license_ids: &[String]) -> Vec<AggregatedObligation> {
    let mut merged: HashMap<String, AggregatedObligation> = HashMap::new();

    for license_id in license_ids {
        for obligation in obligations_for_license(graph, license_id) {
            merged
                .entry(obligation.obligation_id.clone())
                .and_modify(|existing| {
                    if obligation.scope.restrictiveness() > existing.scope.restrictiveness() {
                        existing.scope = obligation.scope;
                        existing.trigger = obligation.trigger;
                    }
                    if !existing.source_licenses.contains(license_id) {
                        existing.source_licenses.push(license_id.clone());
                    }
                })
                .or_insert(obligation);
        }
    }

    let mut result: Vec<AggregatedObligation> = merged.into_values().collect();
    result.sort_by(|a, b| b.effort.cmp(&a.effort).then_with(|| a.obligation_id.cmp(&b.obligation_id)));
    result
}

/// Aggregate the obligations of every license in `license_ids` into the
/// de-duplicated, most-restrictive list, alongside the highest effort
/// observed across it and its length.
pub fn aggregate_obligations(graph: &KnowledgeGraph, license_ids: &[String]) -> AggregatedObligations {
    let obligations = merge_obligations(graph, license_ids);
    let highest_effort = obligations.iter().map(|o| o.effort).max().unwrap_or(Effort::Trivial);
    let unique_obligation_count = obligations.len();
    AggregatedObligations {
        obligations,
        highest_effort,
        unique_obligation_count,
    }
}

/// `true` if any license in `license_ids` carries `CopyleftStrength::Network`.
fn any_network_copyleft(graph: &KnowledgeGraph, license_ids: &[String]) -> bool {
    license_ids.iter().any(|id| {
        graph
            .get_license(id)
            .map(|n| matches!(n.copyleft_strength, CopyleftStrength::Network))
            .unwrap_or(false)
    })
}

/// `true` if any license in `license_ids` carries copyleft strength other
/// than `None`.
fn any_copyleft(graph: &KnowledgeGraph, license_ids: &[String]) -> bool {
    license_ids.iter().any(|id| {
        graph
            .get_license(id)
            .map(|n| !matches!(n.copyleft_strength, CopyleftStrength::None))
            .unwrap_or(false)
    })
}

/// Aggregate obligations across `license_ids`, then filter to the triggers
/// admitted under `scope` and adjust effort for the operational context.
///
/// The SaaS + network-copyleft override admits every trigger regardless of
/// [`DistributionScope::admitted_triggers`] — a network-copyleft license
/// reaching users over a network is always in scope for its disclosure terms.
pub fn obligations_for_distribution(
    graph: &KnowledgeGraph,
    license_ids: &[String],
    scope: DistributionScope,
) -> Vec<AggregatedObligation> {
    let network_override = scope == DistributionScope::SaaS && any_network_copyleft(graph, license_ids);
    let admitted = scope.admitted_triggers();
    let copyleft_present = any_copyleft(graph, license_ids);

    merge_obligations(graph, license_ids)
        .into_iter()
        .filter(|o| network_override || admitted.contains(&o.trigger))
        .map(|mut o| {
            o.effort = adjust_effort(scope, network_override, copyleft_present, o.effort);
            o
        })
        .collect()
}

fn adjust_effort(scope: DistributionScope, network_override: bool, copyleft_present: bool, effort: Effort) -> Effort {
    if network_override {
        return Effort::VeryHigh;
    }
    match scope {
        DistributionScope::Internal => match effort {
            Effort::High => Effort::Medium,
            Effort::VeryHigh => Effort::High,
            other => other,
        },
        DistributionScope::Embedded if copyleft_present => match effort {
            Effort::Medium => Effort::High,
            Effort::High => Effort::VeryHigh,
            other => other,
        },
        _ => effort,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb;

    #[test]
    fn mit_has_attribution_obligation() {
        let graph = kb::seed();
        let obligations = obligations_for_license(&graph, "MIT");
        assert!(obligations.iter().any(|o| o.obligation_id.contains("attribution")));
    }

    #[test]
    fn gpl_source_disclosure_survives_binary_distribution_filter() {
        let graph = kb::seed();
        let license_ids = vec!["GPL-3.0-ONLY".to_string()];
        let filtered = obligations_for_distribution(&graph, &license_ids, DistributionScope::Binary);
        assert!(!filtered.is_empty());
    }

    #[test]
    fn internal_distribution_reduces_high_effort() {
        let graph = kb::seed();
        let license_ids = vec!["AGPL-3.0-ONLY".to_string()];
        let all = aggregate_obligations(&graph, &license_ids);
        let has_high_or_above = all.obligations.iter().any(|o| o.effort >= Effort::High);
        if has_high_or_above {
            let internal = obligations_for_distribution(&graph, &license_ids, DistributionScope::Internal);
            assert!(internal.iter().all(|o| o.effort != Effort::VeryHigh));
        }
    }

    #[test]
    fn saas_with_network_copyleft_admits_all_triggers_at_very_high_effort() {
        let graph = kb::seed();
        let license_ids = vec!["AGPL-3.0-ONLY".to_string()];
        let saas = obligations_for_distribution(&graph, &license_ids, DistributionScope::SaaS);
        let unfiltered = aggregate_obligations(&graph, &license_ids);
        assert_eq!(saas.len(), unfiltered.obligations.len());
        assert!(saas.iter().all(|o| o.effort == Effort::VeryHigh));
    }

    #[test]
    fn aggregation_merges_shared_obligation_and_lists_both_sources() {
        let graph = kb::seed();
        let license_ids = vec!["GPL-2.0-ONLY".to_string(), "GPL-3.0-ONLY".to_string()];
        let merged = aggregate_obligations(&graph, &license_ids);
        for obligation in &merged.obligations {
            assert!(!obligation.source_licenses.is_empty());
        }
    }

    #[test]
    fn aggregate_obligations_reports_highest_effort_and_unique_count() {
        let graph = kb::seed();
        let license_ids = vec!["AGPL-3.0-ONLY".to_string()];
        let aggregated = aggregate_obligations(&graph, &license_ids);
        assert_eq!(aggregated.unique_obligation_count, aggregated.obligations.len());
        let expected_highest = aggregated.obligations.iter().map(|o| o.effort).max().unwrap();
        assert_eq!(aggregated.highest_effort, expected_highest);
    }

    #[test]
    fn aggregate_obligations_on_empty_set_has_trivial_highest_effort() {
        let graph = kb::seed();
        let aggregated = aggregate_obligations(&graph, &[]);
        assert_eq!(aggregated.unique_obligation_count, 0);
        assert_eq!(aggregated.highest_effort, Effort::Trivial);
    }
}
