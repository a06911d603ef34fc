// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer imports from burn directly — only this one
// (plus the dataset/batcher glue in Layer 4).
//
// What's in this layer:
//
//   network.rs    — The residual network builder
//                   Assembles the full 16-block stack with:
//                   • Conv1d stem (32 channels, kernel 16)
//                   • Pre-activation residual blocks
//                   • Max-pooled shortcuts with zero-pad
//                     channel doubling at tier transitions
//                   • Time-distributed classification head
//                   and wires in the cross-entropy loss and
//                   Adam optimizer configuration.
//
//   trainer.rs    — The training loop
//                   Handles forward pass, loss computation,
//                   backward pass, optimiser step, validation
//                   and checkpoint saving per epoch
//
//   inferencer.rs — The inference engine
//                   Loads a checkpoint, windows a recording,
//                   runs the model, decodes per-window labels
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            He et al. (2016) Identity Mappings in Deep
//              Residual Networks
//            Hannun et al. (2019) Cardiologist-level arrhythmia
//              detection with a deep neural network

/// Residual network architecture and builder
pub mod network;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Inference engine — loads checkpoint and classifies recordings
pub mod inferencer;
