// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Randomly shuffles segments and splits them into two sets:
//   - Training set:   used to update model weights
//   - Validation set: used to measure performance on unseen data
//
// Why shuffle before splitting?
//   Segments arrive grouped by recording, and rhythm is highly
//   autocorrelated within a recording. Without shuffling, the
//   validation set would be dominated by whichever recordings
//   happened to be loaded last.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom,
// the standard unbiased shuffle algorithm.
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation

use rand::seq::SliceRandom;

/// Randomly shuffle `segments` and split into (train, validation).
///
/// # Arguments
/// * `segments`       - All available segments (consumed)
/// * `train_fraction` - Proportion for training, e.g. 0.8 = 80%
pub fn split_train_val<T>(mut segments: Vec<T>, train_fraction: f64) -> (Vec<T>, Vec<T>) {
    let mut rng = rand::thread_rng();
    segments.shuffle(&mut rng);

    let total    = segments.len();
    let split_at = ((total as f64) * train_fraction).round() as usize;
    // Clamp to valid range to avoid panics on tiny datasets
    let split_at = split_at.min(total);

    // split_off(n) removes elements [n..] and returns them
    let val = segments.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation",
        segments.len(),
        val.len(),
    );

    (segments, val)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, val)      = split_train_val(items, 0.8);
        assert_eq!(train.len(), 80);
        assert_eq!(val.len(),   20);
    }

    #[test]
    fn test_all_items_preserved() {
        let items: Vec<usize> = (0..50).collect();
        let (train, val)      = split_train_val(items, 0.7);
        assert_eq!(train.len() + val.len(), 50);
    }

    #[test]
    fn test_empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, val)      = split_train_val(items, 0.8);
        assert!(train.is_empty());
        assert!(val.is_empty());
    }

    #[test]
    fn test_full_training_split() {
        let items: Vec<usize> = (0..10).collect();
        let (train, val)      = split_train_val(items, 1.0);
        assert_eq!(train.len(), 10);
        assert!(val.is_empty());
    }
}
