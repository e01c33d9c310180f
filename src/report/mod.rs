//! Renderers for a [`lre::tree::DependencyTreeAnalysis`](crate::).
//!
//! - [`terminal`] — colored, tabular output with a summary box; respects
//!   `--verbose` / `--quiet`. JSON output does not need a renderer of its
//!   own: the binary serializes the analysis directly with `serde_json`.

pub mod terminal;
