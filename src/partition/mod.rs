mod validate;

use anyhow::{bail, Result};
use geo::{Area, BoundingRect, MultiPolygon, Rect};
use polars::{frame::DataFrame, prelude::Column};
use rstar::{RTree, RTreeObject, AABB};

pub use validate::check_consistency;

/// A bounding box in an R-tree, associated with a region by index.
#[derive(Debug, Clone)]
pub(crate) struct BoundingBox {
    idx: usize, // Index of corresponding region in shapes
    bbox: Rect<f64>,
}

impl BoundingBox {
    /// Get the index of the corresponding region.
    #[inline] pub(crate) fn idx(&self) -> usize { self.idx }
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// An ordered collection of polygonal regions covering one territory under
/// one administrative scheme, with an attribute table row per region.
///
/// Region identity is positional: row i of the attribute table describes
/// shape i, and the overlap matrices use the same index. Construction runs
/// the geometry consistency check, so a `Partition` only ever holds valid,
/// non-empty geometries.
#[derive(Debug, Clone)]
pub struct Partition {
    shapes: Vec<MultiPolygon<f64>>,
    areas: Vec<f64>, // Cached unsigned areas, same order as shapes
    rtree: RTree<BoundingBox>,
    data: DataFrame,
    epsg: Option<u32>, // Declared CRS, if known
}

impl Partition {
    /// Build a partition from region geometries and their attribute table.
    /// Fails if any geometry is empty or invalid, or if the table row count
    /// does not match the number of regions.
    pub fn new(shapes: Vec<MultiPolygon<f64>>, data: DataFrame) -> Result<Self> {
        if data.height() != shapes.len() {
            bail!("attribute table has {} rows for {} regions", data.height(), shapes.len());
        }
        check_consistency(&shapes)?;

        let areas = shapes.iter().map(|shape| shape.unsigned_area()).collect();
        let rtree = RTree::bulk_load(shapes.iter().enumerate()
            .map(|(idx, shape)| BoundingBox { idx, bbox: shape.bounding_rect().unwrap() })
            .collect());

        Ok(Self { shapes, areas, rtree, data, epsg: None })
    }

    /// Build a partition with a bare `region` index column as its table.
    pub fn from_shapes(shapes: Vec<MultiPolygon<f64>>) -> Result<Self> {
        let index = (0..shapes.len() as u32).collect::<Vec<_>>();
        let data = DataFrame::new(vec![Column::new("region".into(), index)])?;
        Self::new(shapes, data)
    }

    /// Record the EPSG code the geometries are expressed in. Area ratios are
    /// only meaningful in a planar equal-area CRS; reprojection is up to the
    /// caller.
    pub fn with_epsg(mut self, epsg: u32) -> Self {
        self.epsg = Some(epsg);
        self
    }

    /// Replace the attribute table, keeping geometries and spatial index.
    pub fn with_data(&self, data: DataFrame) -> Result<Self> {
        if data.height() != self.shapes.len() {
            bail!("attribute table has {} rows for {} regions", data.height(), self.shapes.len());
        }
        Ok(Self { data, ..self.clone() })
    }

    /// Get the number of regions.
    #[inline] pub fn len(&self) -> usize { self.shapes.len() }

    /// Check if there are no regions.
    #[inline] pub fn is_empty(&self) -> bool { self.shapes.is_empty() }

    /// Get a reference to the region geometries.
    #[inline] pub fn shapes(&self) -> &[MultiPolygon<f64>] { &self.shapes }

    /// Get a reference to the attribute table.
    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    /// Get the declared EPSG code, if any.
    #[inline] pub fn epsg(&self) -> Option<u32> { self.epsg }

    /// Unsigned area of region `idx`.
    #[inline] pub fn area(&self, idx: usize) -> f64 { self.areas[idx] }

    /// Query the R-tree for regions whose bounding boxes intersect the given
    /// envelope.
    #[inline]
    pub(crate) fn query(&self, envelope: &AABB<[f64; 2]>) -> impl Iterator<Item = &BoundingBox> {
        self.rtree.locate_in_envelope_intersecting(envelope)
    }
}

#[cfg(test)]
mod tests {
    use geo::{LineString, Polygon};
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![Polygon::new(
            LineString::from(vec![
                (x0, y0), (x0 + size, y0), (x0 + size, y0 + size), (x0, y0 + size), (x0, y0),
            ]),
            vec![],
        )])
    }

    #[test]
    fn from_shapes_builds_index_column() {
        let partition = Partition::from_shapes(vec![square(0.0, 0.0, 1.0), square(1.0, 0.0, 1.0)]).unwrap();
        assert_eq!(partition.len(), 2);
        assert_eq!(partition.data().height(), 2);
        assert!(partition.data().column("region").is_ok());
    }

    #[test]
    fn areas_are_cached() {
        let partition = Partition::from_shapes(vec![square(0.0, 0.0, 1.0), square(0.0, 0.0, 2.0)]).unwrap();
        assert_eq!(partition.area(0), 1.0);
        assert_eq!(partition.area(1), 4.0);
    }

    #[test]
    fn row_count_mismatch_is_rejected() {
        let data = DataFrame::new(vec![Column::new("pop".into(), vec![1.0, 2.0, 3.0])]).unwrap();
        let err = Partition::new(vec![square(0.0, 0.0, 1.0)], data).unwrap_err();
        assert!(err.to_string().contains("3 rows"));
    }

    #[test]
    fn epsg_is_recorded() {
        let partition = Partition::from_shapes(vec![square(0.0, 0.0, 1.0)]).unwrap();
        assert_eq!(partition.epsg(), None);
        assert_eq!(partition.with_epsg(3035).epsg(), Some(3035));
    }

    #[test]
    fn with_data_replaces_table() {
        let partition = Partition::from_shapes(vec![square(0.0, 0.0, 1.0)]).unwrap();
        let data = DataFrame::new(vec![Column::new("pop".into(), vec![7.0])]).unwrap();
        let swapped = partition.with_data(data).unwrap();
        assert!(swapped.data().column("pop").is_ok());

        let too_long = DataFrame::new(vec![Column::new("pop".into(), vec![7.0, 8.0])]).unwrap();
        assert!(partition.with_data(too_long).is_err());
    }
}
