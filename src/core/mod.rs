// src/core/mod.rs
mod engine;
mod patterns;

// Snapshot and per-file facts
mod layer;
mod snapshot;
mod revision;

// Per-field analysis
mod discoverer;
mod aliases;
mod scanner;
mod graph;
mod impact;
mod process_diff;

// Records and their persistence
mod record;
mod extractor;
mod output;

// Export the main engine
pub use engine::{Engine, SourceOutcome};
