use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One fully prepared training window: a normalised signal of
/// fixed length and one integer target per output timestep
/// (signal length / 256 with the standard schedule).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcgSegment {
    pub samples: Vec<f32>,
    pub targets: Vec<usize>,
}

impl EcgSegment {
    /// Samples per target — the temporal downsampling the
    /// segment was prepared for
    pub fn samples_per_target(&self) -> usize {
        self.samples.len() / self.targets.len().max(1)
    }
}

pub struct EcgDataset {
    segments: Vec<EcgSegment>,
}

impl EcgDataset {
    pub fn new(segments: Vec<EcgSegment>) -> Self {
        Self { segments }
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

impl Dataset<EcgSegment> for EcgDataset {
    fn get(&self, index: usize) -> Option<EcgSegment> {
        self.segments.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.segments.len()
    }
}
