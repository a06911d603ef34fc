// ============================================================
// Layer 3 — Rhythm Categories
// ============================================================
// The default four-category labelling used when training on
// single-lead rhythm data, following the PhysioNet/CinC 2017
// challenge classes:
//
//   0 → Normal sinus rhythm
//   1 → Atrial fibrillation
//   2 → Other rhythm
//   3 → Noisy / unclassifiable
//
// The network itself is category-count agnostic — num_categories
// is a hyperparameter — so this enum only exists to render
// human-readable output for the default setup. When a model is
// trained with a different category count, the CLI falls back
// to printing raw class indices.
//
// Reference: Clifford et al. (2017) AF classification from a
//            short single lead ECG recording

use std::fmt;

/// The default rhythm classes, in annotation-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RhythmClass {
    Normal,
    Afib,
    Other,
    Noisy,
}

impl RhythmClass {
    /// Number of classes in the default labelling
    pub const COUNT: usize = 4;

    /// Map an annotation index back to its class.
    /// Returns None for indices outside the default labelling.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Normal),
            1 => Some(Self::Afib),
            2 => Some(Self::Other),
            3 => Some(Self::Noisy),
            _ => None,
        }
    }

    /// Short display name used in CLI output
    pub fn name(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Afib   => "afib",
            Self::Other  => "other",
            Self::Noisy  => "noisy",
        }
    }
}

impl fmt::Display for RhythmClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Render a predicted class index for the user: the class name
/// when the default labelling applies, the raw index otherwise.
pub fn class_name(index: usize, num_categories: usize) -> String {
    if num_categories == RhythmClass::COUNT {
        if let Some(class) = RhythmClass::from_index(index) {
            return class.to_string();
        }
    }
    format!("class {index}")
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_indices() {
        for i in 0..RhythmClass::COUNT {
            assert!(RhythmClass::from_index(i).is_some());
        }
        assert!(RhythmClass::from_index(4).is_none());
    }

    #[test]
    fn test_class_name_fallback() {
        // Default four-class labelling → names
        assert_eq!(class_name(1, 4), "afib");
        // Non-default category count → raw index
        assert_eq!(class_name(1, 6), "class 1");
    }
}
