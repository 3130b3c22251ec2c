use std::path::Path;

use anyhow::{bail, Context, Result};
use geo::MultiPolygon;
use polars::frame::DataFrame;
use shapefile as shp;
use shp::dbase::{FieldValue, Record};

use crate::partition::Partition;
use super::TableColumn;

/// Reads a shapefile (with its dbase attribute table) into a partition.
///
/// Only polygonal shapes are accepted. Numeric dbase fields become Float64
/// columns (null where the stored value is absent), character fields become
/// String, logical fields become Boolean. Field names are sorted to give the
/// table a stable column order.
pub fn read_shapefile(path: &Path) -> Result<Partition> {
    let mut reader = shp::Reader::from_path(path)
        .with_context(|| format!("Failed to open shapefile: {}", path.display()))?;

    let mut shapes = Vec::with_capacity(reader.shape_count()?);
    let mut records = Vec::with_capacity(shapes.capacity());
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result.context("Error reading shape+record")?;
        shapes.push(to_multi_polygon(shape)?);
        records.push(record);
    }

    let data = records_to_dataframe(&records)?;
    if data.width() == 0 && !shapes.is_empty() {
        // Attribute table with no fields: fall back to a bare index column.
        return Partition::from_shapes(shapes);
    }
    Partition::new(shapes, data)
}

fn to_multi_polygon(shape: shp::Shape) -> Result<MultiPolygon<f64>> {
    match shape {
        shp::Shape::Polygon(polygon) => Ok(polygon_to_geo(&polygon)),
        other => bail!("Unsupported shape type: {}", other.shapetype()),
    }
}

/// Convert shapefile::Polygon to geo::MultiPolygon<f64>.
///
/// Shapefile rings are stored flat, each exterior (CW by convention)
/// followed by its holes; geo wants them grouped per polygon.
fn polygon_to_geo(polygon: &shp::Polygon) -> MultiPolygon<f64> {
    /// Ensure first and last are the same for geo::LineString coords
    fn ensure_closed(coords: &mut Vec<geo::Coord<f64>>) {
        if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
            if first != last {
                coords.push(first);
            }
        }
    }

    /// Get the signed area of a geo::Coord list (negative for exterior here,
    /// since Shapefile exteriors wind clockwise)
    fn signed_area(coords: &[geo::Coord<f64>]) -> f64 {
        let mut area = 0.0;
        for pair in coords.windows(2) {
            area += pair[0].x * pair[1].y - pair[1].x * pair[0].y;
        }
        area / 2.0
    }

    let mut polys: Vec<geo::Polygon<f64>> = Vec::new();
    let mut exterior: Option<geo::LineString<f64>> = None;
    let mut holes: Vec<geo::LineString<f64>> = Vec::new();

    for ring in polygon.rings() {
        let mut coords: Vec<geo::Coord<f64>> = ring.points().iter()
            .map(|point| geo::Coord { x: point.x, y: point.y })
            .collect();
        ensure_closed(&mut coords);
        let is_exterior = signed_area(&coords) < 0.0;
        let line = geo::LineString(coords);

        if is_exterior {
            // flush previous polygon
            if let Some(ext) = exterior.take() {
                polys.push(geo::Polygon::new(ext, std::mem::take(&mut holes)));
            }
            exterior = Some(line);
        } else {
            holes.push(line);
        }
    }
    if let Some(ext) = exterior {
        polys.push(geo::Polygon::new(ext, holes));
    }

    geo::MultiPolygon(polys)
}

fn records_to_dataframe(records: &[Record]) -> Result<DataFrame> {
    let Some(first) = records.first() else {
        return Ok(DataFrame::empty());
    };

    let mut names: Vec<String> = first.clone().into_iter().map(|(name, _)| name).collect();
    names.sort();

    let mut columns = Vec::with_capacity(names.len());
    for name in &names {
        let mut column = match first.get(name) {
            Some(FieldValue::Character(_) | FieldValue::Memo(_) | FieldValue::Date(_)) => {
                TableColumn::Str(Vec::with_capacity(records.len()))
            }
            Some(FieldValue::Logical(_)) => TableColumn::Bool(Vec::with_capacity(records.len())),
            _ => TableColumn::Float(Vec::with_capacity(records.len())),
        };
        for record in records {
            push_field(&mut column, record.get(name));
        }
        columns.push(column.into_column(name));
    }

    Ok(DataFrame::new(columns)?)
}

fn push_field(column: &mut TableColumn, value: Option<&FieldValue>) {
    match column {
        TableColumn::Float(values) => values.push(match value {
            Some(FieldValue::Numeric(v)) => *v,
            Some(FieldValue::Float(v)) => v.map(f64::from),
            Some(FieldValue::Integer(v)) => Some(*v as f64),
            Some(FieldValue::Double(v) | FieldValue::Currency(v)) => Some(*v),
            _ => None,
        }),
        TableColumn::Str(values) => values.push(match value {
            Some(FieldValue::Character(v)) => v.clone(),
            Some(FieldValue::Memo(v)) => Some(v.clone()),
            Some(FieldValue::Date(v)) => v.as_ref()
                .map(|date| format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())),
            _ => None,
        }),
        TableColumn::Bool(values) => values.push(match value {
            Some(FieldValue::Logical(v)) => *v,
            _ => None,
        }),
    }
}
