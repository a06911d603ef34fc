// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// By programming against traits instead of concrete types,
// we can swap implementations without changing the code
// that uses them. For example:
//   - CsvRecordLoader implements RecordSource
//   - A future WfdbLoader could also implement RecordSource
//   - The application layer only sees RecordSource
//     and works with both without any changes
//
// This is the Dependency Inversion Principle from SOLID,
// applied using Rust's trait system.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Rust Book §17 (Object Oriented Patterns)

use anyhow::Result;
use crate::domain::record::EcgRecord;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can load ECG recordings from a source.
///
/// Implementations:
///   - CsvRecordLoader → loads from a directory of .csv files
///   - (future) WfdbLoader → loads PhysioNet WFDB records
pub trait RecordSource {
    /// Load all available recordings from this source.
    fn load_all(&self) -> Result<Vec<EcgRecord>>;
}

// ─── SegmentClassifier ────────────────────────────────────────────────────────
/// Any component that can assign rhythm categories to the
/// windows of a recording.
///
/// Implementations:
///   - ClassifyUseCase → uses the trained residual network
///   - (future) RuleBasedClassifier → uses RR-interval heuristics
pub trait SegmentClassifier {
    /// Classify every window of `record`, returning one class
    /// index per output timestep of each window.
    fn classify(&self, record: &EcgRecord) -> Result<Vec<Vec<usize>>>;
}
