// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles cross-cutting concerns that don't belong in any
// specific business layer:
//
//   checkpoint.rs — Saving and loading model weights
//                   Uses Burn's CompactRecorder to serialise
//                   model parameters to disk. Also saves/loads
//                   TrainConfig as JSON so inference can
//                   rebuild the exact same architecture.
//
//   metrics.rs    — Training metrics logging
//                   Writes epoch-level metrics (loss, accuracy)
//                   to a CSV file for later analysis and
//                   plotting.
//
// Why is this a separate layer?
//   These concerns are used by multiple other layers but
//   don't belong to any one of them. Keeping them here
//   prevents duplication and makes swapping implementations
//   (e.g. file checkpoints for object storage) painless.
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
