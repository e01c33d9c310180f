//! License Reasoning Engine (LRE) — the reasoning kernel behind a
//! software-supply-chain license compliance system.
//!
//! Given a set of already-resolved dependency records, each annotated with
//! a (possibly compound) license expression, this crate answers:
//!
//! 1. **Classification** — [`expression`] / [`canonicalize`]
//! 2. **Compatibility** — [`compat`]
//! 3. **Obligation aggregation** — [`obligations`]
//! 4. **Tree-level verdict** — [`tree`]
//!
//! all backed by a typed, concurrent-readable knowledge graph ([`graph`])
//! that a caller populates once via [`kb`] before running any queries.
//!
//! This crate performs no I/O beyond the optional YAML knowledge-base
//! overlay in [`kb::load_overlay_file`]: no dependency discovery, no
//! registry fetching, no SBOM parsing, no persistence. Those are external
//! collaborators the `lre` binary (in `src/main.rs`) composes this library
//! with.

pub mod canonicalize;
pub mod compat;
pub mod error;
pub mod expression;
pub mod graph;
pub mod kb;
pub mod models;
pub mod obligations;
pub mod tree;

pub use error::{LreError, LreResult};
pub use graph::KnowledgeGraph;
