// ============================================================
// Layer 4 — Data Layer
// ============================================================
// Everything between raw files on disk and GPU-ready tensors:
//
//   loader.rs       — reads .csv recordings into EcgRecords
//   preprocessor.rs — per-record amplitude normalisation
//   segmenter.rs    — cuts recordings into fixed-length windows
//                     and derives per-timestep targets
//   splitter.rs     — shuffled train/validation split
//   dataset.rs      — Burn Dataset over the prepared segments
//   batcher.rs      — stacks segments into batch tensors
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §4 (Datasets and Batchers)

/// CSV recording loader
pub mod loader;

/// Signal normalisation
pub mod preprocessor;

/// Fixed-length windowing with per-timestep label derivation
pub mod segmenter;

/// Train/validation splitting
pub mod splitter;

/// Burn Dataset implementation
pub mod dataset;

/// Burn Batcher implementation
pub mod batcher;
