// ============================================================
// Layer 2 — Classify Use Case
// ============================================================
// Loads the trained checkpoint and classifies one recording:
//   1. Rebuild the network from the saved config
//   2. Restore the latest weights
//   3. Normalise + window the recording exactly as in training
//   4. Run the model and decode per-window rhythm labels
//
// The window length comes from the saved TrainConfig, NOT from
// the command line — a model trained on 2048-sample windows
// must see 2048-sample windows at inference time.

use anyhow::{ensure, Result};
use std::path::Path;

use crate::data::{loader::load_single_record, preprocessor::Normalizer, segmenter::Segmenter};
use crate::domain::record::EcgRecord;
use crate::domain::traits::SegmentClassifier;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::{Inferencer, WindowPrediction};
use crate::ml::network::DOWNSAMPLE_FACTOR;

pub struct ClassifyUseCase {
    inferencer:  Inferencer,
    segment_len: usize,
}

impl ClassifyUseCase {
    pub fn new(checkpoint_dir: String) -> Result<Self> {
        let ckpt       = CheckpointManager::new(&checkpoint_dir);
        let cfg        = ckpt.load_config()?;
        let inferencer = Inferencer::from_checkpoint(&ckpt)?;
        Ok(Self {
            inferencer,
            segment_len: cfg.segment_len,
        })
    }

    /// Number of rhythm categories the loaded model predicts
    pub fn num_categories(&self) -> usize {
        self.inferencer.config().num_categories
    }

    /// Window length (in samples) the loaded model was trained on
    pub fn segment_len(&self) -> usize {
        self.segment_len
    }

    /// Classify every full window of the recording at `path`.
    pub fn classify_file(&self, path: &Path) -> Result<Vec<WindowPrediction>> {
        let record = load_single_record(path)?;
        ensure!(
            record.len() >= self.segment_len,
            "'{}' has {} samples but the model needs windows of {}",
            record.source,
            record.len(),
            self.segment_len
        );
        self.classify_record(&record)
    }

    fn classify_record(&self, record: &EcgRecord) -> Result<Vec<WindowPrediction>> {
        let normalizer = Normalizer::new();
        let segmenter  = Segmenter::new(self.segment_len, DOWNSAMPLE_FACTOR)?;

        let mut normalised = record.clone();
        normalised.samples = normalizer.normalize(&record.samples);
        // Inference doesn't need annotations; the segmenter
        // insists on a parallel label stream, so synthesise one
        if normalised.labels.len() != normalised.samples.len() {
            normalised.labels = vec![0; normalised.samples.len()];
        }

        let segments = segmenter.segment(&normalised)?;
        self.inferencer.classify(&segments)
    }
}

impl SegmentClassifier for ClassifyUseCase {
    fn classify(&self, record: &EcgRecord) -> Result<Vec<Vec<usize>>> {
        let predictions = self.classify_record(record)?;
        Ok(predictions.into_iter().map(|p| p.classes).collect())
    }
}
