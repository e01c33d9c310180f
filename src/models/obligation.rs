use serde::{Deserialize, Serialize};

/// Event that causes an obligation to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObligationTrigger {
    Always,
    OnDistribution,
    OnModification,
    OnDerivative,
    OnNetworkUse,
    OnStaticLinking,
    OnDynamicLinking,
    OnPatentClaim,
    Conditional,
}

impl std::fmt::Display for ObligationTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ObligationTrigger::Always => "always",
            ObligationTrigger::OnDistribution => "on-distribution",
            ObligationTrigger::OnModification => "on-modification",
            ObligationTrigger::OnDerivative => "on-derivative",
            ObligationTrigger::OnNetworkUse => "on-network-use",
            ObligationTrigger::OnStaticLinking => "on-static-linking",
            ObligationTrigger::OnDynamicLinking => "on-dynamic-linking",
            ObligationTrigger::OnPatentClaim => "on-patent-claim",
            ObligationTrigger::Conditional => "conditional",
        };
        write!(f, "{s}")
    }
}

/// Effort required to discharge an obligation, strictly ordered by `level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Effort {
    Trivial,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Effort {
    pub fn level(self) -> u8 {
        match self {
            Effort::Trivial => 0,
            Effort::Low => 1,
            Effort::Medium => 2,
            Effort::High => 3,
            Effort::VeryHigh => 4,
        }
    }
}

impl std::fmt::Display for Effort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Effort::Trivial => "trivial",
            Effort::Low => "low",
            Effort::Medium => "medium",
            Effort::High => "high",
            Effort::VeryHigh => "very high",
        };
        write!(f, "{s}")
    }
}

/// Portion of the work an obligation attaches to, strictly ordered by `restrictiveness`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ObligationScope {
    ModifiedFiles,
    Component,
    DerivativeWork,
    DistributedWork,
}

impl ObligationScope {
    pub fn restrictiveness(self) -> u8 {
        match self {
            ObligationScope::ModifiedFiles => 1,
            ObligationScope::Component => 2,
            ObligationScope::DerivativeWork => 3,
            ObligationScope::DistributedWork => 4,
        }
    }
}

impl std::fmt::Display for ObligationScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ObligationScope::ModifiedFiles => "modified files",
            ObligationScope::Component => "component",
            ObligationScope::DerivativeWork => "derivative work",
            ObligationScope::DistributedWork => "distributed work",
        };
        write!(f, "{s}")
    }
}

/// A single obligation a license may impose (attribution, source disclosure, …).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObligationNode {
    pub id: String,
    pub name: String,
    pub description: String,
    pub trigger: ObligationTrigger,
    pub effort: Effort,
}

/// The operational context in which a combined work reaches users.
///
/// Determines which obligation triggers are admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DistributionScope {
    Internal,
    Binary,
    Source,
    #[serde(rename = "saas")]
    SaaS,
    Embedded,
}

impl std::fmt::Display for DistributionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DistributionScope::Internal => "internal",
            DistributionScope::Binary => "binary",
            DistributionScope::Source => "source",
            DistributionScope::SaaS => "saas",
            DistributionScope::Embedded => "embedded",
        };
        write!(f, "{s}")
    }
}

impl DistributionScope {
    /// Triggers admitted under this scope, ignoring the `Network` copyleft override.
    pub fn admitted_triggers(self) -> &'static [ObligationTrigger] {
        use ObligationTrigger::*;
        match self {
            DistributionScope::Internal => &[Always],
            DistributionScope::Binary => &[Always, OnDistribution, OnStaticLinking, OnDynamicLinking],
            DistributionScope::Source => &[
                Always,
                OnDistribution,
                OnModification,
                OnDerivative,
                OnStaticLinking,
                OnDynamicLinking,
            ],
            DistributionScope::SaaS => &[Always, OnNetworkUse],
            DistributionScope::Embedded => &[
                Always,
                OnDistribution,
                OnModification,
                OnDerivative,
                OnNetworkUse,
                OnStaticLinking,
                OnDynamicLinking,
                OnPatentClaim,
                Conditional,
            ],
        }
    }
}
