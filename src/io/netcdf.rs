use super::MeshWriter;
use crate::config::BASE_NAME;
use crate::mesh::StructuredZone;
use anyhow::{Context, Result, anyhow};
use netcdf::types::NcVariableType;
use netcdf::{self, FileMut};
use std::path::Path;

const NODE_DIMS: [&str; 3] = ["k_node", "j_node", "i_node"];
const CELL_FIELD_DIMS: [&str; 4] = ["solution", "k_cell", "j_cell", "i_cell"];

// NetCDF-4 mesh: node coordinates plus one record per solution along an
// unlimited `solution` dimension
pub struct NetcdfWriter {
    file: FileMut,
    solutions: usize,
    has_zone: bool,
}

impl NetcdfWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let mut file = netcdf::create(path)
            .with_context(|| format!("Failed to create NetCDF file: {:?}", path))?;
        file.add_attribute("TITLE", BASE_NAME)?;
        file.add_unlimited_dimension("solution")?;

        let mut time_var = file.add_variable::<f64>("time", &["solution"])?;
        time_var.put_attribute("long_name", "solution time")?;
        time_var.put_attribute("units", "seconds since base date")?;

        let mut name_var =
            file.add_variable_with_type("solution_name", &["solution"], &NcVariableType::String)?;
        name_var.put_attribute("long_name", "solution display name (MM-DD-YYYY HH:MM:SS)")?;

        Ok(NetcdfWriter {
            file,
            solutions: 0,
            has_zone: false,
        })
    }
}

impl MeshWriter for NetcdfWriter {
    fn write_zone(&mut self, zone: &StructuredZone) -> Result<()> {
        if self.has_zone {
            return Err(anyhow!("the mesh already has a zone"));
        }
        let [ni, nj, nk] = zone.dims.nodes();
        self.file.add_dimension("i_node", ni)?;
        self.file.add_dimension("j_node", nj)?;
        self.file.add_dimension("k_node", nk)?;
        self.file.add_dimension("i_cell", zone.dims.ni)?;
        self.file.add_dimension("j_cell", zone.dims.nj)?;
        self.file.add_dimension("k_cell", zone.dims.nk)?;
        self.file.add_attribute("zone_name", zone.name.as_str())?;

        for (name, values) in [
            ("CoordinateX", &zone.x),
            ("CoordinateY", &zone.y),
            ("CoordinateZ", &zone.z),
        ] {
            let mut var = self.file.add_variable::<f64>(name, &NODE_DIMS)?;
            var.put_attribute("units", "m")?;
            var.put_values(values, ..)?;
        }

        self.has_zone = true;
        Ok(())
    }

    fn write_solution(&mut self, name: &str, time: f64) -> Result<usize> {
        let index = self.solutions;
        self.file
            .variable_mut("time")
            .ok_or_else(|| anyhow!("time variable missing"))?
            .put_values(&[time], (index,))?;
        self.file
            .variable_mut("solution_name")
            .ok_or_else(|| anyhow!("solution_name variable missing"))?
            .put_string(name, (index,))?;
        self.solutions += 1;
        Ok(self.solutions)
    }

    fn write_field(&mut self, solution: usize, name: &str, values: &[f64]) -> Result<()> {
        if !self.has_zone {
            return Err(anyhow!("field {} written before the zone", name));
        }
        if solution == 0 || solution > self.solutions {
            return Err(anyhow!("unknown solution {} for field {}", solution, name));
        }
        if self.file.variable(name).is_none() {
            let mut var = self.file.add_variable::<f64>(name, &CELL_FIELD_DIMS)?;
            var.put_attribute("location", "CellCenter")?;
        }
        let mut var = self
            .file
            .variable_mut(name)
            .ok_or_else(|| anyhow!("field variable {} missing", name))?;
        var.put_values(values, (solution - 1, .., .., ..))?;
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.file.close().context("Failed to close NetCDF file")?;
        Ok(())
    }
}
