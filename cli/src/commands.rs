pub mod convert;
pub mod diagnose;

use std::path::Path;

use anyhow::{bail, Result};
use areawalk::{io, Partition};

/// Pick the partition reader from the file extension.
pub(crate) fn read_partition(path: &Path, epsg: Option<u32>) -> Result<Partition> {
    let partition = match extension(path) {
        Some("shp") => io::read_shapefile(path)?,
        Some("geojson") | Some("json") => io::read_geojson(path)?,
        _ => bail!("Unsupported input format: {}", path.display()),
    };
    Ok(match epsg {
        Some(code) => partition.with_epsg(code),
        None => partition,
    })
}

/// Pick the partition writer from the file extension.
pub(crate) fn write_partition(path: &Path, partition: &Partition) -> Result<()> {
    match extension(path) {
        Some("csv") => io::write_csv(path, partition.data()),
        Some("geojson") | Some("json") => io::write_geojson(path, partition),
        _ => bail!("Unsupported output format: {}", path.display()),
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}
