mod coverage;

use geo::{Area, BooleanOps, BoundingRect, Intersects};
use ndarray::{Array1, Array2, Axis};
use rstar::AABB;

use crate::partition::Partition;

pub use coverage::CoverageBand;

/// Round a share to 3 decimal places.
///
/// Bounds floating-point noise in the area ratios at the cost of capping
/// interpolation fidelity. The rounding is part of the observable contract:
/// stored shares are exact multiples of 0.001.
#[inline]
fn round_share(share: f64) -> f64 {
    (share * 1000.0).round() / 1000.0
}

/// Pairwise area-overlap shares between a source and a target partition.
///
/// Both matrices have one row per target region and one column per source
/// region. Every entry is in [0, 1], and is exactly zero whenever the two
/// regions do not intersect. Derived data: rebuilt per conversion, never
/// persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlap {
    by_source: Array2<f64>, // [i, j] = intersection area / area of source region j
    by_target: Array2<f64>, // [i, j] = intersection area / area of target region i
}

impl Overlap {
    /// Compute both share matrices for a (source, target) pair of partitions.
    ///
    /// Candidate pairs come from the target's R-tree, so pairs whose bounding
    /// boxes are disjoint are skipped without touching the geometry library;
    /// the result is identical to the exhaustive double loop. For each
    /// intersecting pair the intersection area is computed once and
    /// normalized by either region's own area.
    ///
    /// Both partitions must be expressed in the same planar equal-area CRS
    /// (caller's responsibility); area ratios are meaningless otherwise.
    /// Geometry-library failures on malformed input propagate untranslated.
    pub fn build(source: &Partition, target: &Partition) -> Self {
        let mut by_source = Array2::<f64>::zeros((target.len(), source.len()));
        let mut by_target = Array2::<f64>::zeros((target.len(), source.len()));

        for (j, a) in source.shapes().iter().enumerate() {
            let rect = a.bounding_rect().unwrap();
            let search = AABB::from_corners(rect.min().into(), rect.max().into());

            for cand in target.query(&search) {
                let i = cand.idx();
                let b = &target.shapes()[i];
                if !a.intersects(b) { continue; }

                let isect = a.intersection(b).unsigned_area();
                by_source[[i, j]] = round_share(isect / source.area(j));
                by_target[[i, j]] = round_share(isect / target.area(i));
            }
        }

        Self { by_source, by_target }
    }

    /// Get the number of source regions (columns).
    #[inline] pub fn n_source(&self) -> usize { self.by_source.ncols() }

    /// Get the number of target regions (rows).
    #[inline] pub fn n_target(&self) -> usize { self.by_source.nrows() }

    /// Shares normalized by each source region's own area.
    #[inline] pub fn by_source(&self) -> &Array2<f64> { &self.by_source }

    /// Shares normalized by each target region's own area.
    #[inline] pub fn by_target(&self) -> &Array2<f64> { &self.by_target }

    /// Per source region, the fraction of its area accounted for across the
    /// whole target partition (column sums of the source-normalized shares).
    pub fn source_coverage(&self) -> Array1<f64> {
        self.by_source.sum_axis(Axis(0))
    }

    /// Per target region, the fraction of its own area covered by some source
    /// region (row sums of the target-normalized shares).
    pub fn target_coverage(&self) -> Array1<f64> {
        self.by_target.sum_axis(Axis(1))
    }
}

#[cfg(test)]
mod tests {
    use geo::{LineString, MultiPolygon, Polygon};
    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![Polygon::new(
            LineString::from(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]),
            vec![],
        )])
    }

    fn partition(shapes: Vec<MultiPolygon<f64>>) -> Partition {
        Partition::from_shapes(shapes).unwrap()
    }

    /// Exhaustive double loop with the same arithmetic, no spatial pruning.
    fn build_unpruned(source: &Partition, target: &Partition) -> Overlap {
        let mut by_source = Array2::<f64>::zeros((target.len(), source.len()));
        let mut by_target = Array2::<f64>::zeros((target.len(), source.len()));
        for (j, a) in source.shapes().iter().enumerate() {
            for (i, b) in target.shapes().iter().enumerate() {
                if a.intersects(b) {
                    let isect = a.intersection(b).unsigned_area();
                    by_source[[i, j]] = round_share(isect / source.area(j));
                    by_target[[i, j]] = round_share(isect / target.area(i));
                }
            }
        }
        Overlap { by_source, by_target }
    }

    #[test]
    fn disjoint_regions_share_zero() {
        let source = partition(vec![rect(0.0, 0.0, 1.0, 1.0)]);
        let target = partition(vec![rect(5.0, 5.0, 6.0, 6.0)]);
        let overlap = Overlap::build(&source, &target);
        assert_eq!(overlap.by_source()[[0, 0]], 0.0);
        assert_eq!(overlap.by_target()[[0, 0]], 0.0);
    }

    #[test]
    fn identical_partitions_give_identity_shares() {
        let shapes = vec![rect(0.0, 0.0, 1.0, 1.0), rect(1.0, 0.0, 2.0, 1.0)];
        let source = partition(shapes.clone());
        let target = partition(shapes);
        let overlap = Overlap::build(&source, &target);
        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_eq!(overlap.by_source()[[i, j]], expected);
                assert_eq!(overlap.by_target()[[i, j]], expected);
            }
        }
    }

    #[test]
    fn split_source_region_shares_by_area() {
        // One 2x1 source region split evenly across two unit target regions.
        let source = partition(vec![rect(0.0, 0.0, 2.0, 1.0)]);
        let target = partition(vec![rect(0.0, 0.0, 1.0, 1.0), rect(1.0, 0.0, 2.0, 1.0)]);
        let overlap = Overlap::build(&source, &target);
        assert_eq!(overlap.by_source()[[0, 0]], 0.5);
        assert_eq!(overlap.by_source()[[1, 0]], 0.5);
        assert_eq!(overlap.by_target()[[0, 0]], 1.0);
        assert_eq!(overlap.by_target()[[1, 0]], 1.0);
    }

    #[test]
    fn shares_are_rounded_to_three_decimals() {
        // A third of the source region falls in the target region.
        let source = partition(vec![rect(0.0, 0.0, 3.0, 1.0)]);
        let target = partition(vec![rect(0.0, 0.0, 1.0, 1.0)]);
        let overlap = Overlap::build(&source, &target);
        assert_eq!(overlap.by_source()[[0, 0]], 0.333);
        assert_eq!(overlap.by_target()[[0, 0]], 1.0);
    }

    #[test]
    fn shares_stay_within_unit_interval() {
        let source = partition(vec![
            rect(0.0, 0.0, 1.5, 1.5), rect(1.5, 0.0, 3.0, 1.5),
            rect(0.0, 1.5, 1.5, 3.0), rect(1.5, 1.5, 3.0, 3.0),
        ]);
        let target = partition(vec![
            rect(0.0, 0.0, 1.0, 1.0), rect(1.0, 0.0, 2.0, 1.0), rect(2.0, 0.0, 3.0, 1.0),
            rect(0.0, 1.0, 1.0, 2.0), rect(1.0, 1.0, 2.0, 2.0), rect(2.0, 1.0, 3.0, 2.0),
        ]);
        let overlap = Overlap::build(&source, &target);
        for &share in overlap.by_source().iter().chain(overlap.by_target().iter()) {
            assert!((0.0..=1.0).contains(&share));
            assert_eq!(share, round_share(share));
        }
    }

    #[test]
    fn pruned_build_matches_exhaustive_loop() {
        let source = partition(vec![
            rect(0.0, 0.0, 1.0, 1.0), rect(1.0, 0.0, 2.0, 1.0), rect(2.0, 0.0, 3.0, 1.0),
            rect(0.0, 1.0, 1.0, 2.0), rect(1.0, 1.0, 2.0, 2.0), rect(2.0, 1.0, 3.0, 2.0),
        ]);
        let target = partition(vec![
            rect(0.0, 0.0, 1.5, 1.5), rect(1.5, 0.0, 3.0, 1.5),
            rect(0.0, 1.5, 1.5, 2.0), rect(1.5, 1.5, 3.0, 2.0),
        ]);
        assert_eq!(Overlap::build(&source, &target), build_unpruned(&source, &target));
    }

    #[test]
    fn coverage_sums() {
        // Source region 1 is only half covered by the target partition.
        let source = partition(vec![rect(0.0, 0.0, 1.0, 1.0), rect(1.0, 0.0, 3.0, 1.0)]);
        let target = partition(vec![rect(0.0, 0.0, 2.0, 1.0)]);
        let overlap = Overlap::build(&source, &target);

        let source_cov = overlap.source_coverage();
        assert_eq!(source_cov[0], 1.0);
        assert_eq!(source_cov[1], 0.5);

        let target_cov = overlap.target_coverage();
        assert_eq!(target_cov[0], 1.0); // 0.5 from each source region
    }

    #[test]
    fn rebuild_is_deterministic() {
        let source = partition(vec![rect(0.0, 0.0, 2.0, 1.0), rect(2.0, 0.0, 4.0, 1.0)]);
        let target = partition(vec![rect(0.5, 0.0, 2.5, 1.0), rect(2.5, 0.0, 3.5, 1.0)]);
        assert_eq!(Overlap::build(&source, &target), Overlap::build(&source, &target));
    }
}
