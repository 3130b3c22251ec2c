use super::Overlap;

/// Acceptance band for a source region's total accounted share.
///
/// A data-quality audit knob, independent of the converter's one-sided
/// coverage threshold: the band flags suspicious *source* regions for
/// inspection and never suppresses or alters converted values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageBand {
    pub min: f64,
    pub max: f64,
}

impl Default for CoverageBand {
    fn default() -> Self {
        Self { min: 0.95, max: 1.05 }
    }
}

impl Overlap {
    /// Indices of source regions whose total share accounted for by the
    /// target partition falls outside `band`, in ascending order.
    ///
    /// A sum well below 1 means the target partition does not cover the
    /// region (boundary mismatch, missing target geometry); a sum above 1
    /// means target geometries overlap each other on top of it.
    pub fn coverage_outliers(&self, band: CoverageBand) -> Vec<usize> {
        self.source_coverage().iter().enumerate()
            .filter(|&(_, &sum)| sum < band.min || sum > band.max)
            .map(|(idx, _)| idx)
            .collect()
    }
}
