// ============================================================
// Layer 4 — Segment Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<EcgSegment>
// into GPU-ready tensors.
//
// How batching works here:
//   Input:  Vec of N segments, each with T signal samples and
//           T/256 targets
//   Output: EcgBatch with
//             signals [N, T, 1]   (float, one channel)
//             targets [N, T/256]  (int, one class per timestep)
//
//   We flatten all samples into one long Vec, then reshape.
//   This is easy because every segment has the same length —
//   the Segmenter guarantees it.
//
// The [batch, time, 1] layout is the network's input contract;
// the model itself swaps to Burn's channels-first layout
// internally before the convolution stack.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::EcgSegment;

// ─── EcgBatch ─────────────────────────────────────────────────────────────────
/// A batch of segments ready for the model forward pass.
///
/// B is the Burn Backend (e.g. Wgpu, NdArray) —
/// generic so the same batcher works on any device.
#[derive(Debug, Clone)]
pub struct EcgBatch<B: Backend> {
    /// Signal windows — shape: [batch_size, segment_len, 1]
    pub signals: Tensor<B, 3>,

    /// Per-timestep class targets — shape: [batch_size, segment_len / 256]
    pub targets: Tensor<B, 2, Int>,
}

// ─── EcgBatcher ───────────────────────────────────────────────────────────────
/// The batcher struct — holds the target device so tensors
/// are created on the correct GPU/CPU.
#[derive(Clone, Debug)]
pub struct EcgBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> EcgBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<EcgSegment, EcgBatch<B>> for EcgBatcher<B> {
    /// Stack a Vec of segments into a single EcgBatch.
    fn batch(&self, items: Vec<EcgSegment>) -> EcgBatch<B> {
        let batch_size  = items.len();
        // All segments have the same length (Segmenter invariant)
        let segment_len = items[0].samples.len();
        let num_targets = items[0].targets.len();

        let signal_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.samples.iter().copied())
            .collect();

        // Burn uses i32 for Int tensor construction
        let target_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.targets.iter().map(|&t| t as i32))
            .collect();

        let signals = Tensor::<B, 1>::from_floats(
            signal_flat.as_slice(), &self.device,
        ).reshape([batch_size, segment_len, 1]);

        let targets = Tensor::<B, 1, Int>::from_ints(
            target_flat.as_slice(), &self.device,
        ).reshape([batch_size, num_targets]);

        EcgBatch { signals, targets }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_batch_shapes() {
        let batcher = EcgBatcher::<TestBackend>::new(Default::default());

        let segments = vec![
            EcgSegment { samples: vec![0.0; 512], targets: vec![0, 1] },
            EcgSegment { samples: vec![1.0; 512], targets: vec![1, 1] },
            EcgSegment { samples: vec![2.0; 512], targets: vec![2, 0] },
        ];

        let batch = batcher.batch(segments);
        assert_eq!(batch.signals.dims(), [3, 512, 1]);
        assert_eq!(batch.targets.dims(), [3, 2]);
    }

    #[test]
    fn test_batch_preserves_values() {
        let batcher = EcgBatcher::<TestBackend>::new(Default::default());

        let segments = vec![EcgSegment {
            samples: vec![0.5, -0.5, 1.5, -1.5],
            targets: vec![3],
        }];

        let batch = batcher.batch(segments);
        let signal: Vec<f32> = batch.signals.into_data().to_vec().unwrap();
        assert_eq!(signal, vec![0.5, -0.5, 1.5, -1.5]);

        let target: Vec<i64> = batch.targets.into_data().to_vec().unwrap();
        assert_eq!(target, vec![3]);
    }
}
