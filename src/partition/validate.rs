use anyhow::{bail, Result};
use geo::{Area, MultiPolygon, Validation};

/// Check that every region geometry is present, well-formed, and has positive
/// area. The error names the first offending region by index.
///
/// Invalid input aborts the whole pipeline here, before any intersection or
/// area computation runs; downstream code assumes clean geometry and does not
/// re-validate.
pub fn check_consistency(shapes: &[MultiPolygon<f64>]) -> Result<()> {
    for (idx, shape) in shapes.iter().enumerate() {
        if shape.0.is_empty() {
            bail!("region {idx}: geometry is empty");
        }
        if !shape.is_valid() {
            bail!("region {idx}: geometry is invalid (self-intersecting or malformed rings)");
        }
        if shape.unsigned_area() <= 0.0 {
            bail!("region {idx}: geometry has zero area");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use geo::{LineString, Polygon};
    use super::*;

    fn ring(coords: Vec<(f64, f64)>) -> MultiPolygon<f64> {
        MultiPolygon(vec![Polygon::new(LineString::from(coords), vec![])])
    }

    #[test]
    fn valid_square_passes() {
        let square = ring(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]);
        assert!(check_consistency(&[square]).is_ok());
    }

    #[test]
    fn empty_geometry_is_rejected() {
        let square = ring(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]);
        let empty = MultiPolygon::<f64>(vec![]);
        let err = check_consistency(&[square, empty]).unwrap_err();
        assert!(err.to_string().contains("region 1"));
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn bowtie_is_rejected() {
        // Exterior ring crosses itself at (1, 1).
        let bowtie = ring(vec![(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0), (0.0, 0.0)]);
        let err = check_consistency(&[bowtie]).unwrap_err();
        assert!(err.to_string().contains("region 0"));
    }

    #[test]
    fn failure_reports_first_offender() {
        let square = ring(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]);
        let empty = MultiPolygon::<f64>(vec![]);
        let err = check_consistency(&[square.clone(), empty.clone(), empty]).unwrap_err();
        assert!(err.to_string().contains("region 1"));
    }
}
