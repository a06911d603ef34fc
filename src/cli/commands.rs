// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `classify`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;
use crate::ml::network::NetworkConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the rhythm classifier on .csv recordings
    Train(TrainArgs),

    /// Classify a recording using a trained checkpoint
    Classify(ClassifyArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// Directory containing .csv recordings (sample,label rows)
    #[arg(long, default_value = "data/records")]
    pub data_dir: String,

    /// Directory to save model checkpoints and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Training window length in samples.
    /// Must be a multiple of 256 — the network downsamples by
    /// 2^8 across its eight stride-2 blocks
    #[arg(long, default_value_t = 2048)]
    pub segment_len: usize,

    /// Number of windows processed together in one forward pass
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 20)]
    pub epochs: usize,

    /// Adam learning rate — too high causes instability,
    /// too low causes slow convergence
    #[arg(long, default_value_t = 1e-3)]
    pub learning_rate: f64,

    /// Nonlinearity for the stem layer (relu, gelu, tanh, sigmoid).
    /// The residual blocks always use ReLU
    #[arg(long, default_value = "relu")]
    pub conv_activation: String,

    /// Number of rhythm categories in the annotation stream
    #[arg(long, default_value_t = 4)]
    pub num_categories: usize,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:       a.data_dir,
            checkpoint_dir: a.checkpoint_dir,
            segment_len:    a.segment_len,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            network: NetworkConfig {
                conv_activation: a.conv_activation,
                num_categories:  a.num_categories,
                learning_rate:   a.learning_rate,
            },
        }
    }
}

/// All arguments for the `classify` command
#[derive(Args, Debug, Clone)]
pub struct ClassifyArgs {
    /// The .csv recording to classify
    #[arg(long)]
    pub record: String,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}
