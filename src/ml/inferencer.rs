// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Loads the trained network from its checkpoint and classifies
// the windows of a recording one batch at a time.
//
// The checkpoint directory carries the NetworkConfig that was
// used during training, so the exact same graph is rebuilt
// before the weights are restored — a mismatched architecture
// fails at load time rather than producing garbage.

use anyhow::Result;
use burn::prelude::*;

use crate::data::dataset::EcgSegment;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::network::{EcgResNet, NetworkConfig};

type InferBackend = burn::backend::Wgpu;

pub struct Inferencer {
    model:   EcgResNet<InferBackend>,
    config:  NetworkConfig,
    device:  burn::backend::wgpu::WgpuDevice,
}

/// The classification of one window: the predicted class per
/// output timestep and the softmax confidence behind each.
#[derive(Debug, Clone)]
pub struct WindowPrediction {
    pub classes:     Vec<usize>,
    pub confidences: Vec<f32>,
}

impl Inferencer {
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager) -> Result<Self> {
        let device  = burn::backend::wgpu::WgpuDevice::default();
        let cfg     = ckpt_manager.load_config()?;
        let network = cfg.network.clone();

        let model: EcgResNet<InferBackend> = network.init(&device)?;
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint");

        Ok(Self { model, config: network, device })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Classify prepared windows. All windows must share the
    /// same length (the Segmenter guarantees it).
    pub fn classify(&self, segments: &[EcgSegment]) -> Result<Vec<WindowPrediction>> {
        let mut predictions = Vec::with_capacity(segments.len());

        for segment in segments {
            let segment_len = segment.samples.len();
            // Re-check the length against the network's schedule:
            // a foreign segment would otherwise panic mid-graph
            let steps = self.config.output_length(segment_len)?;

            let input = Tensor::<InferBackend, 1>::from_floats(
                segment.samples.as_slice(), &self.device,
            ).reshape([1, segment_len, 1]);

            // Per-timestep probability distributions [1, steps, C]
            let probs = self.model.forward_probabilities(input);
            let flat: Vec<f32> = probs.into_data().to_vec().unwrap_or_default();

            let categories = self.config.num_categories;
            let mut classes     = Vec::with_capacity(steps);
            let mut confidences = Vec::with_capacity(steps);

            for step in 0..steps {
                let row = &flat[step * categories..(step + 1) * categories];
                let (best, confidence) = row
                    .iter()
                    .enumerate()
                    .fold((0, f32::MIN), |(bi, bv), (i, &v)| {
                        if v > bv { (i, v) } else { (bi, bv) }
                    });
                classes.push(best);
                confidences.push(confidence);
            }

            tracing::debug!(
                "Window classified: {:?} (mean confidence {:.3})",
                classes,
                confidences.iter().sum::<f32>() / confidences.len().max(1) as f32,
            );

            predictions.push(WindowPrediction { classes, confidences });
        }

        Ok(predictions)
    }
}
