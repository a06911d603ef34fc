// ============================================================
// Layer 4 — Record Segmenter
// ============================================================
// Cuts a normalised recording into fixed-length, non-overlapping
// training windows and derives the per-timestep targets.
//
// Two resolutions are in play:
//   - the signal resolution: one sample per timestep
//   - the network's output resolution: one prediction per
//     `downsample` samples (256 with the standard schedule,
//     i.e. 2^8 from the eight stride-2 blocks)
//
// The annotation stream is per-sample, so each target is the
// majority annotation within its `downsample`-wide span:
//
//   samples:  [... 256 ...][... 256 ...][... 256 ...]
//   targets:      t0            t1           t2
//
// A trailing partial window (shorter than segment_len) is
// dropped — the network requires exact multiples of the total
// downsampling factor, and rhythm datasets are long enough that
// the loss of under one window per record is negligible.
//
// Reference: Rust Book §8 (Slices)
//            Hannun et al. (2019) — per-segment rhythm labels

use anyhow::{ensure, Result};

use crate::data::dataset::EcgSegment;
use crate::domain::record::EcgRecord;

pub struct Segmenter {
    /// Window length in samples — a multiple of `downsample`
    segment_len: usize,
    /// Samples per output timestep (the network's total
    /// temporal downsampling factor)
    downsample: usize,
}

impl Segmenter {
    /// Create a new Segmenter. Fails if `segment_len` cannot
    /// pass through the network without fractional positions.
    pub fn new(segment_len: usize, downsample: usize) -> Result<Self> {
        ensure!(downsample > 0, "downsample factor must be positive");
        ensure!(
            segment_len > 0 && segment_len % downsample == 0,
            "segment_len ({segment_len}) must be a positive multiple of \
             the downsampling factor ({downsample})"
        );
        Ok(Self { segment_len, downsample })
    }

    /// Number of target timesteps per window
    pub fn targets_per_segment(&self) -> usize {
        self.segment_len / self.downsample
    }

    /// Cut `record` into training windows. The record's label
    /// stream must be as long as its signal.
    pub fn segment(&self, record: &EcgRecord) -> Result<Vec<EcgSegment>> {
        ensure!(
            record.samples.len() == record.labels.len(),
            "'{}': {} samples but {} labels",
            record.source,
            record.samples.len(),
            record.labels.len()
        );

        let num_windows = record.len() / self.segment_len;
        let mut segments = Vec::with_capacity(num_windows);

        for w in 0..num_windows {
            let start = w * self.segment_len;
            let end   = start + self.segment_len;

            let samples = record.samples[start..end].to_vec();

            // One target per downsample-wide span, by majority vote
            let targets: Vec<usize> = record.labels[start..end]
                .chunks(self.downsample)
                .map(majority_label)
                .collect();

            segments.push(EcgSegment { samples, targets });
        }

        if record.len() % self.segment_len != 0 {
            tracing::debug!(
                "'{}': dropped trailing {} samples (< one window)",
                record.source,
                record.len() % self.segment_len
            );
        }

        Ok(segments)
    }
}

/// The most frequent label in a span. Ties resolve to the label
/// that reached the winning count first, which keeps the result
/// deterministic.
fn majority_label(span: &[usize]) -> usize {
    let mut counts: Vec<(usize, usize)> = Vec::new();

    for &label in span {
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, c)) => *c += 1,
            None => counts.push((label, 1)),
        }
    }

    counts
        .iter()
        .max_by_key(|(_, c)| *c)
        .map(|(l, _)| *l)
        .unwrap_or(0)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn record(samples: usize, label: usize) -> EcgRecord {
        EcgRecord::new("test.csv", vec![0.0; samples], vec![label; samples])
    }

    #[test]
    fn test_window_count_and_target_resolution() {
        let seg = Segmenter::new(512, 256).unwrap();
        let segments = seg.segment(&record(1024 + 100, 1)).unwrap();

        // 1124 samples / 512 → 2 full windows, trailing 100 dropped
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].samples.len(), 512);
        // 512 / 256 = 2 targets per window
        assert_eq!(segments[0].targets, vec![1, 1]);
    }

    #[test]
    fn test_majority_vote_per_span() {
        let seg = Segmenter::new(8, 4).unwrap();
        let rec = EcgRecord::new(
            "t.csv",
            vec![0.0; 8],
            // First span: three 2s, one 0 → 2.
            // Second span: majority 1.
            vec![2, 2, 0, 2, 1, 1, 0, 1],
        );
        let segments = seg.segment(&rec).unwrap();
        assert_eq!(segments[0].targets, vec![2, 1]);
    }

    #[test]
    fn test_rejects_unaligned_segment_len() {
        // 300 is not a multiple of 256 — the network would fail
        // at the shortcut/transform combination partway down
        assert!(Segmenter::new(300, 256).is_err());
        assert!(Segmenter::new(0, 256).is_err());
    }

    #[test]
    fn test_rejects_label_signal_length_mismatch() {
        let seg = Segmenter::new(4, 2).unwrap();
        let rec = EcgRecord::new("t.csv", vec![0.0; 8], vec![0; 7]);
        assert!(seg.segment(&rec).is_err());
    }

    #[test]
    fn test_short_record_yields_no_segments() {
        let seg = Segmenter::new(512, 256).unwrap();
        let segments = seg.segment(&record(100, 0)).unwrap();
        assert!(segments.is_empty());
    }
}
