// ============================================================
// Layer 4 — Record Loader
// ============================================================
// Loads ECG recordings from a directory of .csv files using
// the csv crate.
//
// Expected file format — one row per signal sample:
//
//   sample,label
//   -0.145,0
//   -0.120,0
//   0.855,1
//   ...
//
// `sample` is the lead amplitude in mV, `label` the integer
// rhythm annotation active at that sample. The annotation
// stream is therefore exactly as long as the signal; the
// Segmenter later collapses it to the network's coarser output
// resolution.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

use crate::domain::record::EcgRecord;
use crate::domain::traits::RecordSource;

/// One CSV row: a signal sample and its annotation.
#[derive(Debug, Deserialize)]
struct SampleRow {
    sample: f32,
    label:  usize,
}

/// Loads all .csv recordings from a given directory.
/// Implements the RecordSource trait from Layer 3.
pub struct CsvRecordLoader {
    /// Path to the directory containing .csv recordings
    dir: String,
}

impl CsvRecordLoader {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: dir.into() }
    }
}

impl RecordSource for CsvRecordLoader {
    fn load_all(&self) -> Result<Vec<EcgRecord>> {
        let dir = Path::new(&self.dir);

        // A missing directory is not fatal — the caller decides
        // whether an empty corpus is acceptable
        if !dir.exists() {
            tracing::warn!(
                "Data directory '{}' does not exist — returning empty corpus",
                self.dir
            );
            return Ok(Vec::new());
        }

        let mut records = Vec::new();

        for entry in fs::read_dir(dir)
            .with_context(|| format!("Cannot read directory '{}'", self.dir))?
        {
            let entry = entry?;
            let path  = entry.path();

            if path.extension().and_then(|e| e.to_str()) == Some("csv") {
                match load_single_record(&path) {
                    Ok(record) => {
                        tracing::debug!(
                            "Loaded: {} ({} samples)",
                            record.source,
                            record.len()
                        );
                        records.push(record);
                    }
                    // Log a warning but continue — don't fail on one bad file
                    Err(e) => {
                        tracing::warn!("Skipping '{}': {}", path.display(), e);
                    }
                }
            }
        }

        tracing::info!("Successfully loaded {} recordings", records.len());
        Ok(records)
    }
}

/// Parse a single .csv recording into an EcgRecord.
pub fn load_single_record(path: &Path) -> Result<EcgRecord> {
    let file = fs::File::open(path)
        .with_context(|| format!("Cannot open '{}'", path.display()))?;

    let mut reader  = csv::Reader::from_reader(file);
    let mut samples = Vec::new();
    let mut labels  = Vec::new();

    for row in reader.deserialize() {
        let row: SampleRow = row
            .with_context(|| format!("Malformed row in '{}'", path.display()))?;
        samples.push(row.sample);
        labels.push(row.label);
    }

    if samples.is_empty() {
        anyhow::bail!("'{}' contains no samples", path.display());
    }

    let source = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();

    Ok(EcgRecord::new(source, samples, labels))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_csv(dir: &Path, name: &str, body: &str) {
        let mut f = fs::File::create(dir.join(name)).unwrap();
        writeln!(f, "sample,label").unwrap();
        write!(f, "{body}").unwrap();
    }

    #[test]
    fn test_loads_valid_recording() {
        let dir = tempdir().unwrap();
        write_csv(dir.path(), "rec.csv", "0.1,0\n0.2,1\n-0.3,1\n");

        let loader  = CsvRecordLoader::new(dir.path().to_str().unwrap());
        let records = loader.load_all().unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].samples, vec![0.1, 0.2, -0.3]);
        assert_eq!(records[0].labels, vec![0, 1, 1]);
    }

    #[test]
    fn test_skips_malformed_file() {
        let dir = tempdir().unwrap();
        write_csv(dir.path(), "good.csv", "0.1,0\n");
        write_csv(dir.path(), "bad.csv", "not-a-number,zero\n");

        let loader  = CsvRecordLoader::new(dir.path().to_str().unwrap());
        let records = loader.load_all().unwrap();

        // The malformed file is skipped with a warning, not fatal
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, "good.csv");
    }

    #[test]
    fn test_missing_directory_is_empty_corpus() {
        let loader  = CsvRecordLoader::new("/definitely/not/here");
        let records = loader.load_all().unwrap();
        assert!(records.is_empty());
    }
}
