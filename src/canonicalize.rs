//! Identifier canonicalization (component A).
//!
//! Normalizes an arbitrary license token to a key the knowledge graph
//! recognizes: direct lookup first, then a suffix-strip ladder so it works
//! against whatever the graph has actually ingested, not a fixed table of
//! known SPDX aliases.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::graph::KnowledgeGraph;

/// Result of canonicalizing a single license token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Canonical {
    /// Resolved to a key present in the graph.
    Known(String),
    /// Could not be resolved; the original token is preserved for diagnostics.
    Unknown { original: String },
}

impl Canonical {
    pub fn as_str(&self) -> &str {
        match self {
            Canonical::Known(id) => id,
            Canonical::Unknown { .. } => "UNKNOWN",
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Canonical::Known(_))
    }
}

static VERSION_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-[0-9]+(\.[0-9]+)*(-ONLY|-OR-LATER)?$").expect("static regex"));

/// Canonicalize `raw` against `graph`'s known license keys.
///
/// Applies, in order: trim + uppercase; the `NOASSERTION`/`UNKNOWN`/empty
/// shortcut; a direct lookup; then the suffix-strip ladder (strip
/// `-ONLY`/`-OR-LATER`, strip a trailing version segment, strip from the
/// first `-`, strip from the first `+`), re-looking-up after each strip.
pub fn canonicalize(raw: &str, graph: &KnowledgeGraph) -> Canonical {
    let original = raw.to_string();
    let trimmed = raw.trim();

    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("noassertion")
        || trimmed.eq_ignore_ascii_case("unknown")
    {
        return Canonical::Unknown { original };
    }

    let upper: String = trimmed.split_whitespace().collect::<String>().to_uppercase();

    if graph.has_license(&upper) {
        return Canonical::Known(upper);
    }

    // (a) strip -ONLY or -OR-LATER
    for suffix in ["-ONLY", "-OR-LATER"] {
        if let Some(stripped) = upper.strip_suffix(suffix) {
            if graph.has_license(stripped) {
                return Canonical::Known(stripped.to_string());
            }
        }
    }

    // (b) strip trailing -<digits>(.<digits>)*(-only|-or-later)?
    if let Some(m) = VERSION_SUFFIX.find(&upper) {
        let stripped = &upper[..m.start()];
        if !stripped.is_empty() && graph.has_license(stripped) {
            return Canonical::Known(stripped.to_string());
        }
    }

    // (c) strip from first '-'
    if let Some(idx) = upper.find('-') {
        let stripped = &upper[..idx];
        if graph.has_license(stripped) {
            return Canonical::Known(stripped.to_string());
        }
    }

    // (d) strip from first '+'
    if let Some(idx) = upper.find('+') {
        let stripped = &upper[..idx];
        if graph.has_license(stripped) {
            return Canonical::Known(stripped.to_string());
        }
    }

    Canonical::Unknown { original }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb;

    #[test]
    fn idempotent_on_known_id() {
        let graph = kb::seed();
        let once = canonicalize("mit", &graph);
        assert_eq!(once, Canonical::Known("MIT".to_string()));
        let twice = canonicalize(once.as_str(), &graph);
        assert_eq!(twice, once);
    }

    #[test]
    fn empty_and_noassertion_are_unknown() {
        let graph = kb::seed();
        assert!(!canonicalize("", &graph).is_known());
        assert!(!canonicalize("NOASSERTION", &graph).is_known());
        assert!(!canonicalize("  unknown  ", &graph).is_known());
    }

    #[test]
    fn suffix_strip_ladder_resolves_unsuffixed_family_member() {
        let graph = kb::seed();
        // GPL-2.0-ONLY is seeded; GPL-2.0 (no suffix) should resolve to it
        // only if the ladder's earlier steps don't already match a direct key.
        let direct = canonicalize("GPL-3.0-ONLY", &graph);
        assert_eq!(direct, Canonical::Known("GPL-3.0-ONLY".to_string()));
    }

    #[test]
    fn case_insensitive_lookup() {
        let graph = kb::seed();
        assert_eq!(
            canonicalize("apache-2.0", &graph),
            Canonical::Known("APACHE-2.0".to_string())
        );
    }
}
