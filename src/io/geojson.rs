use std::{fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use polars::{frame::DataFrame, prelude::AnyValue};
use serde_json::{json, Map, Value};

use crate::partition::Partition;
use super::TableColumn;

/// Reads a GeoJSON FeatureCollection file into a partition.
pub fn read_geojson(path: &Path) -> Result<Partition> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read GeoJSON file: {}", path.display()))?;
    read_geojson_bytes(&bytes)
}

/// Read a partition from GeoJSON FeatureCollection bytes.
///
/// Accepts Polygon and MultiPolygon features. Feature properties become the
/// attribute table: numbers as Float64, strings as String, booleans as
/// Boolean; a property type decided by the first feature carrying it.
pub fn read_geojson_bytes(bytes: &[u8]) -> Result<Partition> {
    let value: Value = serde_json::from_slice(bytes).context("Failed to parse GeoJSON bytes")?;
    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("GeoJSON has no features array"))?;

    let mut shapes = Vec::with_capacity(features.len());
    let mut properties = Vec::with_capacity(features.len());
    for feature in features {
        shapes.push(parse_geometry(&feature["geometry"])?);
        properties.push(feature["properties"].as_object().cloned().unwrap_or_default());
    }

    let data = properties_to_dataframe(&properties)?;
    if data.width() == 0 {
        // No properties anywhere: fall back to a bare index column.
        return Partition::from_shapes(shapes);
    }
    Partition::new(shapes, data)
}

/// Writes a partition to a GeoJSON FeatureCollection file at `path`.
pub fn write_geojson(path: &Path, partition: &Partition) -> Result<()> {
    let bytes = write_geojson_bytes(partition)?;
    fs::write(path, bytes)
        .with_context(|| format!("Failed to write GeoJSON file: {}", path.display()))
}

/// Write a partition to GeoJSON FeatureCollection bytes, one MultiPolygon
/// feature per region carrying its attribute-table row as properties.
pub fn write_geojson_bytes(partition: &Partition) -> Result<Vec<u8>> {
    let columns = partition.data().get_columns();
    let features = partition.shapes().iter().enumerate().map(|(idx, shape)| {
        let mut properties = Map::new();
        for column in columns {
            let value = column.as_materialized_series().get(idx)?;
            properties.insert(column.name().to_string(), any_value_to_json(&value));
        }
        Ok(json!({
            "type": "Feature",
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": multi_polygon_coords(shape),
            },
            "properties": properties,
        }))
    }).collect::<Result<Vec<_>>>()?;

    serde_json::to_vec(&json!({
        "type": "FeatureCollection",
        "features": features,
    })).context("Failed to serialize GeoJSON to bytes")
}

fn parse_geometry(geometry: &Value) -> Result<MultiPolygon<f64>> {
    let coords = geometry["coordinates"].as_array()
        .ok_or_else(|| anyhow!("feature geometry has no coordinates"))?;
    match geometry["type"].as_str() {
        Some("Polygon") => Ok(MultiPolygon(vec![parse_polygon(coords)?])),
        Some("MultiPolygon") => {
            let polys = coords.iter()
                .map(|rings| {
                    let rings = rings.as_array()
                        .ok_or_else(|| anyhow!("malformed MultiPolygon coordinates"))?;
                    parse_polygon(rings)
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(MultiPolygon(polys))
        }
        other => bail!("Unsupported geometry type: {other:?}"),
    }
}

fn parse_polygon(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut lines = rings.iter().map(parse_ring).collect::<Result<Vec<_>>>()?;
    if lines.is_empty() {
        bail!("polygon has no rings");
    }
    let exterior = lines.remove(0);
    Ok(Polygon::new(exterior, lines))
}

fn parse_ring(ring: &Value) -> Result<LineString<f64>> {
    let points = ring.as_array().ok_or_else(|| anyhow!("malformed ring"))?;
    let coords = points.iter().map(|point| {
        let xy = point.as_array().filter(|xy| xy.len() >= 2)
            .ok_or_else(|| anyhow!("malformed coordinate"))?;
        let x = xy[0].as_f64().ok_or_else(|| anyhow!("non-numeric coordinate"))?;
        let y = xy[1].as_f64().ok_or_else(|| anyhow!("non-numeric coordinate"))?;
        Ok(Coord { x, y })
    }).collect::<Result<Vec<_>>>()?;
    Ok(LineString(coords))
}

fn properties_to_dataframe(properties: &[Map<String, Value>]) -> Result<DataFrame> {
    // Union of property names across features, in first-seen order.
    let mut names: Vec<&str> = Vec::new();
    for props in properties {
        for key in props.keys() {
            if !names.contains(&key.as_str()) {
                names.push(key);
            }
        }
    }

    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let first = properties.iter().find_map(|props| {
            props.get(name).filter(|value| !value.is_null())
        });
        let mut column = match first {
            Some(Value::String(_)) => TableColumn::Str(Vec::with_capacity(properties.len())),
            Some(Value::Bool(_)) => TableColumn::Bool(Vec::with_capacity(properties.len())),
            _ => TableColumn::Float(Vec::with_capacity(properties.len())),
        };
        for props in properties {
            push_property(&mut column, props.get(name));
        }
        columns.push(column.into_column(name));
    }

    Ok(DataFrame::new(columns)?)
}

fn push_property(column: &mut TableColumn, value: Option<&Value>) {
    match column {
        TableColumn::Float(values) => values.push(value.and_then(Value::as_f64)),
        TableColumn::Str(values) => {
            values.push(value.and_then(Value::as_str).map(str::to_string))
        }
        TableColumn::Bool(values) => values.push(value.and_then(Value::as_bool)),
    }
}

fn multi_polygon_coords(shape: &MultiPolygon<f64>) -> Vec<Value> {
    shape.0.iter().map(|polygon| {
        let mut rings = vec![ring_coords(polygon.exterior())];
        rings.extend(polygon.interiors().iter().map(ring_coords));
        json!(rings)
    }).collect()
}

fn ring_coords(ring: &LineString<f64>) -> Vec<Vec<f64>> {
    ring.coords().map(|coord| vec![coord.x, coord.y]).collect()
}

fn any_value_to_json(value: &AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Float64(v) => json!(*v),
        AnyValue::Float32(v) => json!(*v),
        AnyValue::Int64(v) => json!(*v),
        AnyValue::Int32(v) => json!(*v),
        AnyValue::UInt32(v) => json!(*v),
        AnyValue::UInt64(v) => json!(*v),
        AnyValue::Boolean(v) => json!(*v),
        AnyValue::String(v) => json!(*v),
        AnyValue::StringOwned(v) => json!(v.as_str()),
        other => json!(other.to_string()),
    }
}
