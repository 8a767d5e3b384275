pub mod csv;
pub mod index;
#[cfg(feature = "netcdf")]
pub mod netcdf;
pub mod tecplot;

use crate::config::MeshFormat;
use crate::mesh::StructuredZone;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// A mesh container holding one structured zone and any number of
/// cell-centred solutions on it. Calls arrive in order: the zone, then each
/// solution followed by its fields.
pub trait MeshWriter {
    fn write_zone(&mut self, zone: &StructuredZone) -> Result<()>;

    /// Registers a solution and returns its 1-based id
    fn write_solution(&mut self, name: &str, time: f64) -> Result<usize>;

    fn write_field(&mut self, solution: usize, name: &str, values: &[f64]) -> Result<()>;

    fn close(self: Box<Self>) -> Result<()>;
}

pub fn open_mesh_writer(format: MeshFormat, path: &Path) -> Result<Box<dyn MeshWriter>> {
    match format {
        MeshFormat::Tecplot => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create mesh file: {:?}", path))?;
            Ok(Box::new(tecplot::TecplotWriter::new(BufWriter::new(file))))
        }
        #[cfg(feature = "netcdf")]
        MeshFormat::Netcdf => Ok(Box::new(self::netcdf::NetcdfWriter::create(path)?)),
    }
}
