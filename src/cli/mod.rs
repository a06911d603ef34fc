// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`    — trains the model on .csv recordings
//   2. `classify` — loads a checkpoint and labels a recording
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{ClassifyArgs, Commands, TrainArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "ecg-resnet",
    version = "0.1.0",
    about = "Train a deep residual CNN on ECG recordings, then classify rhythm segments."
)]
pub struct Cli {
    /// The subcommand to run (train or classify)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match &self.command {
            Commands::Train(args)    => self.run_train(args.clone()),
            Commands::Classify(args) => self.run_classify(args.clone()),
        }
    }

    /// Handles the `train` subcommand.
    /// Converts CLI args into a TrainConfig and hands off to Layer 2.
    fn run_train(&self, args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting training on recordings in: {}", args.data_dir);

        // Convert CLI args → application config (separates presentation from domain)
        let use_case = TrainUseCase::new(args.into());
        use_case.execute()?;

        println!("Training complete. Checkpoint saved.");
        Ok(())
    }

    /// Handles the `classify` subcommand.
    /// Loads the model from checkpoint and prints per-window labels.
    fn run_classify(&self, args: ClassifyArgs) -> Result<()> {
        use crate::application::classify_use_case::ClassifyUseCase;
        use crate::domain::rhythm::class_name;

        let use_case    = ClassifyUseCase::new(args.checkpoint_dir.clone())?;
        let predictions = use_case.classify_file(std::path::Path::new(&args.record))?;
        let categories  = use_case.num_categories();

        println!(
            "\n{} — {} windows of {} samples:",
            args.record,
            predictions.len(),
            use_case.segment_len(),
        );

        for (w, prediction) in predictions.iter().enumerate() {
            let rendered: Vec<String> = prediction
                .classes
                .iter()
                .zip(prediction.confidences.iter())
                .map(|(&c, &p)| format!("{} ({:.0}%)", class_name(c, categories), p * 100.0))
                .collect();
            println!("  window {:>3}: {}", w, rendered.join(", "));
        }

        Ok(())
    }
}
