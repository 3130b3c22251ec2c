mod geojson;
mod shp;

use std::{fs::File, io::BufWriter, path::Path};

use anyhow::{Context, Result};
use polars::{
    frame::DataFrame,
    io::{SerReader, SerWriter},
    prelude::{Column, CsvReader, CsvWriter},
};

pub use geojson::{read_geojson, read_geojson_bytes, write_geojson, write_geojson_bytes};
pub use shp::read_shapefile;

/// Writes an attribute table to a CSV file at `path`.
pub fn write_csv(path: &Path, df: &DataFrame) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    let writer: BufWriter<File> = BufWriter::new(file);
    CsvWriter::new(writer).finish(&mut df.clone())?;
    Ok(())
}

/// Write an attribute table to CSV bytes.
pub fn write_csv_bytes(df: &DataFrame) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    CsvWriter::new(&mut out).finish(&mut df.clone())?;
    Ok(out)
}

/// Reads an attribute table from a CSV file at `path`.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("Failed to read CSV file: {}", path.display()))?;
    let df = CsvReader::new(file).finish()?;
    Ok(df)
}

/// Column accumulator used when assembling attribute tables from dbase
/// records or GeoJSON feature properties. The first observed value decides
/// the column type; values of any other type become nulls.
pub(crate) enum TableColumn {
    Float(Vec<Option<f64>>),
    Str(Vec<Option<String>>),
    Bool(Vec<Option<bool>>),
}

impl TableColumn {
    pub(crate) fn into_column(self, name: &str) -> Column {
        match self {
            TableColumn::Float(values) => Column::new(name.into(), values),
            TableColumn::Str(values) => Column::new(name.into(), values),
            TableColumn::Bool(values) => Column::new(name.into(), values),
        }
    }
}
