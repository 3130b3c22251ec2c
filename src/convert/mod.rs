use anyhow::{bail, Context, Result};
use ndarray::Array1;
use polars::prelude::{DataType, NamedFrom, Series};

use crate::{overlap::Overlap, partition::Partition};

/// Default minimum fraction of a target region's own area that must be
/// covered by the source partition for its converted value to be kept.
pub const DEFAULT_COVERAGE_THRESHOLD: f64 = 0.80;

/// Converts extensive attribute columns from a source partition onto a
/// target partition, weighting each source value by the share of its
/// region's area falling in each target region.
///
/// Only extensive (additive) quantities survive area weighting: counts,
/// revenue totals, and the like. Converting densities or rates this way is a
/// caller error that no amount of geometry can detect.
#[derive(Debug, Clone)]
pub struct Converter {
    /// Target regions covered below this fraction get a null value.
    pub coverage_threshold: f64,
}

impl Default for Converter {
    fn default() -> Self {
        Self { coverage_threshold: DEFAULT_COVERAGE_THRESHOLD }
    }
}

impl Converter {
    /// Convert `columns` from `source` onto `target` using precomputed
    /// overlap shares. Returns the target partition with one new (or
    /// overwritten) column per requested attribute.
    ///
    /// Per column, each target region's value is the share-weighted sum of
    /// the source values. The value is null when either
    /// - any intersecting source region has a null value (nulls contaminate
    ///   every target region they overlap, however small the share), or
    /// - the target region's incoming coverage is below `coverage_threshold`.
    ///
    /// Both gates are value states, not errors; a conversion only fails on
    /// missing/non-numeric columns or mismatched dimensions. Source data is
    /// read through a private copy and never mutated.
    pub fn convert(
        &self,
        source: &Partition,
        target: &Partition,
        overlap: &Overlap,
        columns: &[&str],
    ) -> Result<Partition> {
        if overlap.n_source() != source.len() || overlap.n_target() != target.len() {
            bail!(
                "overlap shape is {}x{}, partitions have {} target and {} source regions",
                overlap.n_target(), overlap.n_source(), target.len(), source.len(),
            );
        }

        let coverage = overlap.target_coverage();
        let mut data = target.data().clone();

        for &name in columns {
            let column = source.data().column(name)
                .with_context(|| format!("source partition has no column {name:?}"))?;
            let values = column.as_materialized_series()
                .cast(&DataType::Float64)
                .with_context(|| format!("column {name:?} is not numeric"))?;

            // Nulls contribute zero to the weighted sums; the indicator
            // vector carries their positions through the same product.
            let mut known = Vec::with_capacity(source.len());
            let mut missing = Vec::with_capacity(source.len());
            for value in values.f64()?.into_iter() {
                known.push(value.unwrap_or(0.0));
                missing.push(if value.is_none() { 1.0 } else { 0.0 });
            }

            let totals = overlap.by_source().dot(&Array1::from_vec(known));
            let tainted = overlap.by_source().dot(&Array1::from_vec(missing));

            let converted = (0..target.len())
                .map(|i| (tainted[i] == 0.0 && coverage[i] >= self.coverage_threshold)
                    .then(|| totals[i]))
                .collect::<Vec<_>>();
            data.with_column(Series::new(name.into(), converted))?;
        }

        target.with_data(data)
    }
}

/// Build the overlap shares for a (source, target) pair and convert
/// `columns` with the default coverage threshold. Returns the augmented
/// target partition together with the raw share matrices for auditing.
pub fn interpolate(
    source: &Partition,
    target: &Partition,
    columns: &[&str],
) -> Result<(Partition, Overlap)> {
    let overlap = Overlap::build(source, target);
    let converted = Converter::default().convert(source, target, &overlap, columns)?;
    Ok((converted, overlap))
}
