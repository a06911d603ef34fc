// ============================================================
// Layer 3 — EcgRecord Domain Type
// ============================================================
// Represents one single-lead ECG recording loaded from disk,
// together with its sample-by-sample annotation stream.
//
// The annotation stream is parallel to the signal: labels[i] is
// the rhythm category active at samples[i]. The network itself
// predicts at a coarser resolution (one label per 256 samples);
// the Segmenter in Layer 4 is responsible for collapsing the
// per-sample stream down to per-timestep targets.
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

/// A raw recording loaded from disk. By the time an EcgRecord
/// exists, the signal has already been extracted from its file
/// format — this type is format-agnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcgRecord {
    /// The filename — kept for traceability so classifications
    /// can be attributed to a specific recording
    pub source: String,

    /// The signal: one real-valued sample per timestep, in mV
    pub samples: Vec<f32>,

    /// Per-sample rhythm annotations, same length as `samples`
    pub labels: Vec<usize>,
}

impl EcgRecord {
    pub fn new(source: impl Into<String>, samples: Vec<f32>, labels: Vec<usize>) -> Self {
        Self {
            source: source.into(),
            samples,
            labels,
        }
    }

    /// Number of samples in the recording
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The highest annotation class index present in this
    /// recording. Used to sanity-check a record against the
    /// configured number of categories before training.
    pub fn max_label(&self) -> Option<usize> {
        self.labels.iter().copied().max()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_and_max_label() {
        let record = EcgRecord::new("a.csv", vec![0.1, 0.2, 0.3], vec![0, 2, 1]);
        assert_eq!(record.len(), 3);
        assert_eq!(record.max_label(), Some(2));
    }

    #[test]
    fn test_empty_record() {
        let record = EcgRecord::new("empty.csv", Vec::new(), Vec::new());
        assert!(record.is_empty());
        assert_eq!(record.max_label(), None);
    }
}
