// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:      the epoch number (1, 2, 3, ...)
//   - train_loss: average cross-entropy loss on training set
//   - val_loss:   average cross-entropy loss on validation set
//   - val_acc:    fraction of output timesteps classified
//                 correctly on the validation set
//
// Output file: checkpoints/metrics.csv
//
// Example:
//   epoch,train_loss,val_loss,val_acc
//   1,1.312450,1.289200,0.413000
//   2,0.990100,1.054300,0.584000
//   ...
//
// How to read the metrics:
//   - Loss should decrease each epoch (model is learning);
//     random initialisation gives ~ln(num_categories)
//   - If val_loss rises while train_loss falls → overfitting
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average cross-entropy loss over all training batches
    pub train_loss: f64,

    /// Average cross-entropy loss on the validation set.
    /// Should track train_loss — divergence indicates overfitting
    pub val_loss: f64,

    /// Fraction of validation timesteps predicted correctly.
    /// Range: [0.0, 1.0]
    pub val_acc: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, val_acc: f64) -> Self {
        Self { epoch, train_loss, val_loss, val_acc }
    }

    /// Returns true if this epoch improved over the previous best val_loss
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");

        // Write the header only if the file is new — this allows
        // appending across runs
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,val_loss,val_acc")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6}",
            m.epoch, m.train_loss, m.val_loss, m.val_acc,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch, m.train_loss, m.val_loss,
        );

        Ok(())
    }

    /// Return the path to the metrics CSV file
    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_is_improvement() {
        let m = EpochMetrics::new(2, 1.1, 0.9, 0.6);
        assert!(m.is_improvement(1.0));
        assert!(!m.is_improvement(0.8));
    }

    #[test]
    fn test_logs_header_and_rows() {
        let dir    = tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path().to_str().unwrap()).unwrap();

        logger.log(&EpochMetrics::new(1, 1.5, 1.4, 0.4)).unwrap();
        logger.log(&EpochMetrics::new(2, 1.2, 1.1, 0.5)).unwrap();

        let body = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[0], "epoch,train_loss,val_loss,val_acc");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1,1.5"));
    }
}
