use serde::{Deserialize, Serialize};

/// Policy category a license (or an evaluated expression) falls into.
///
/// `riskLevel` is part of the observable contract (dominant-license scoring,
/// OR/AND expression monotonicity) and must match the values below exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LicenseCategory {
    PublicDomain,
    Permissive,
    WeakCopyleft,
    StrongCopyleft,
    NetworkCopyleft,
    Proprietary,
    SourceAvailable,
    Unknown,
}

impl LicenseCategory {
    pub fn risk_level(self) -> u8 {
        match self {
            LicenseCategory::PublicDomain => 1,
            LicenseCategory::Permissive => 2,
            LicenseCategory::WeakCopyleft => 3,
            LicenseCategory::StrongCopyleft => 4,
            LicenseCategory::NetworkCopyleft => 5,
            LicenseCategory::Proprietary => 5,
            LicenseCategory::SourceAvailable => 5,
            LicenseCategory::Unknown => 6,
        }
    }

    pub fn is_copyleft(self) -> bool {
        matches!(
            self,
            LicenseCategory::WeakCopyleft
                | LicenseCategory::StrongCopyleft
                | LicenseCategory::NetworkCopyleft
        )
    }
}

impl std::fmt::Display for LicenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseCategory::PublicDomain => write!(f, "Public Domain"),
            LicenseCategory::Permissive => write!(f, "Permissive"),
            LicenseCategory::WeakCopyleft => write!(f, "Weak Copyleft"),
            LicenseCategory::StrongCopyleft => write!(f, "Strong Copyleft"),
            LicenseCategory::NetworkCopyleft => write!(f, "Network Copyleft"),
            LicenseCategory::Proprietary => write!(f, "Proprietary"),
            LicenseCategory::SourceAvailable => write!(f, "Source Available"),
            LicenseCategory::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Degree to which a license propagates its terms to derivative works.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CopyleftStrength {
    None,
    File,
    Library,
    Strong,
    Network,
}

impl CopyleftStrength {
    pub fn propagation_level(self) -> u8 {
        match self {
            CopyleftStrength::None => 0,
            CopyleftStrength::File => 1,
            CopyleftStrength::Library => 2,
            CopyleftStrength::Strong => 3,
            CopyleftStrength::Network => 4,
        }
    }
}

impl std::fmt::Display for CopyleftStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CopyleftStrength::None => write!(f, "none"),
            CopyleftStrength::File => write!(f, "file"),
            CopyleftStrength::Library => write!(f, "library"),
            CopyleftStrength::Strong => write!(f, "strong"),
            CopyleftStrength::Network => write!(f, "network"),
        }
    }
}

/// A single canonical license in the knowledge graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseNode {
    /// Canonical identifier, e.g. `"GPL-3.0-ONLY"`. Unique key.
    pub id: String,
    pub name: String,
    pub category: LicenseCategory,
    pub copyleft_strength: CopyleftStrength,
    /// License family, e.g. `"GPL"`, `"BSD"`, `"Apache"`.
    pub family: Option<String>,
    /// Version segment, comparable as a decimal where possible (e.g. `3.0`).
    pub version: Option<f64>,
    pub is_osi_approved: bool,
    pub is_fsf_free: bool,
    pub is_deprecated: bool,
}

impl LicenseNode {
    /// `true` if `id` carries the `-OR-LATER` suffix (GPL-family "or later" grant).
    pub fn is_or_later(&self) -> bool {
        self.id.ends_with("-OR-LATER")
    }

    /// `true` if `id` carries the `-ONLY` suffix.
    pub fn is_only(&self) -> bool {
        self.id.ends_with("-ONLY")
    }
}
