// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load .csv recordings        (Layer 4 - data)
//   Step 2: Normalise each signal       (Layer 4 - data)
//   Step 3: Cut into training windows   (Layer 4 - data)
//   Step 4: Split train/validation      (Layer 4 - data)
//   Step 5: Build datasets              (Layer 4 - data)
//   Step 6: Save config                 (Layer 6 - infra)
//   Step 7: Run training loop           (Layer 5 - ml)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::EcgDataset,
    loader::CsvRecordLoader,
    preprocessor::Normalizer,
    segmenter::Segmenter,
    splitter::split_train_val,
};
use crate::domain::traits::RecordSource;
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::network::{NetworkConfig, DOWNSAMPLE_FACTOR};
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run. Serialisable so it
// can be saved to disk and reloaded for inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:       String,
    pub checkpoint_dir: String,
    /// Window length in samples — must be a multiple of 256
    pub segment_len:    usize,
    pub batch_size:     usize,
    pub epochs:         usize,
    /// The network builder's hyperparameter record
    pub network:        NetworkConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:       "data/records".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            segment_len:    2048,
            batch_size:     32,
            epochs:         20,
            network:        NetworkConfig::default(),
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Validate configuration up front ───────────────────────────────────
        // Both checks surface builder errors (InvalidConfig /
        // ShapeMismatch) before any data is loaded
        cfg.network.validate()?;
        let steps_per_window = cfg.network.output_length(cfg.segment_len)?;
        tracing::info!(
            "Each {}-sample window produces {} output timesteps",
            cfg.segment_len,
            steps_per_window
        );

        // ── Step 1: Load all recordings ───────────────────────────────────────
        tracing::info!("Loading .csv recordings from '{}'", cfg.data_dir);
        let loader  = CsvRecordLoader::new(&cfg.data_dir);
        let records = loader.load_all()?;
        ensure!(!records.is_empty(), "no recordings found in '{}'", cfg.data_dir);

        // Every annotation must fit the configured category count
        for record in &records {
            if let Some(max) = record.max_label() {
                ensure!(
                    max < cfg.network.num_categories,
                    "'{}' contains label {} but the network has only {} categories",
                    record.source,
                    max,
                    cfg.network.num_categories
                );
            }
        }

        // ── Step 2 + 3: Normalise and window each recording ───────────────────
        let normalizer = Normalizer::new();
        let segmenter  = Segmenter::new(cfg.segment_len, DOWNSAMPLE_FACTOR)?;

        let mut segments = Vec::new();
        for record in &records {
            let mut normalised = record.clone();
            normalised.samples = normalizer.normalize(&record.samples);
            segments.extend(segmenter.segment(&normalised)?);
        }
        ensure!(
            !segments.is_empty(),
            "no recording is long enough for a {}-sample window",
            cfg.segment_len
        );
        tracing::info!("Prepared {} training windows", segments.len());

        // ── Step 4: Train / validation split (80/20) ──────────────────────────
        let (train_segments, val_segments) = split_train_val(segments, 0.8);
        tracing::info!(
            "Split: {} train, {} validation",
            train_segments.len(),
            val_segments.len()
        );

        // ── Step 5: Build Burn datasets ───────────────────────────────────────
        let train_dataset = EcgDataset::new(train_segments);
        let val_dataset   = EcgDataset::new(val_segments);

        // ── Step 6: Save config for inference ─────────────────────────────────
        // The inferencer needs the network hyperparameters to
        // rebuild the same graph before loading weights
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;

        // ── Step 7: Run training loop (Layer 5) ───────────────────────────────
        run_training(cfg, train_dataset, val_dataset, ckpt_manager, metrics)?;

        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = TrainConfig::default();
        assert!(cfg.network.validate().is_ok());
        // 2048 / 256 = 8 output timesteps
        assert_eq!(cfg.network.output_length(cfg.segment_len).unwrap(), 8);
    }

    #[test]
    fn test_unaligned_segment_len_fails_early() {
        let mut cfg = TrainConfig::default();
        cfg.segment_len = 2000;
        assert!(cfg.network.output_length(cfg.segment_len).is_err());
    }
}
