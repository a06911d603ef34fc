// ============================================================
// Layer 4 — Signal Normaliser
// ============================================================
// Scales each recording to zero mean and unit variance before
// segmentation.
//
// Why normalise per record rather than globally?
//   Electrode contact quality, skin impedance and amplifier
//   gain vary between recordings, so the same rhythm can sit
//   at very different amplitude scales in different files.
//   Per-record standardisation removes that nuisance variation
//   while preserving the morphology the network learns from.
//
// Recordings with (near-)zero variance — a flat-lined or
// disconnected lead — are centred but not scaled, to avoid
// dividing by zero.
//
// Reference: Rust Book §13 (Iterators)

/// Minimum standard deviation below which a signal is treated
/// as constant and left unscaled
const MIN_STD: f32 = 1e-6;

pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Return a zero-mean, unit-variance copy of `signal`.
    pub fn normalize(&self, signal: &[f32]) -> Vec<f32> {
        if signal.is_empty() {
            return Vec::new();
        }

        let n    = signal.len() as f32;
        let mean = signal.iter().sum::<f32>() / n;

        let variance = signal
            .iter()
            .map(|x| {
                let d = x - mean;
                d * d
            })
            .sum::<f32>()
            / n;
        let std = variance.sqrt();

        if std < MIN_STD {
            // Flat signal: centre only
            return signal.iter().map(|x| x - mean).collect();
        }

        signal.iter().map(|x| (x - mean) / std).collect()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_mean_unit_variance() {
        let norm = Normalizer::new();
        let out  = norm.normalize(&[1.0, 2.0, 3.0, 4.0]);

        let mean: f32 = out.iter().sum::<f32>() / out.len() as f32;
        let var: f32 = out.iter().map(|x| (x - mean).powi(2)).sum::<f32>()
            / out.len() as f32;

        assert!(mean.abs() < 1e-5);
        assert!((var - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_flat_signal_is_centred_not_scaled() {
        let norm = Normalizer::new();
        let out  = norm.normalize(&[5.0, 5.0, 5.0]);
        assert_eq!(out, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_empty_signal() {
        let norm = Normalizer::new();
        assert!(norm.normalize(&[]).is_empty());
    }

    #[test]
    fn test_preserves_shape() {
        let norm = Normalizer::new();
        // Monotone input stays monotone after an affine transform
        let out = norm.normalize(&[0.0, 1.0, 2.0, 10.0]);
        assert!(out.windows(2).all(|w| w[0] < w[1]));
    }
}
