use crate::config::BaseDate;
use crate::io::MeshWriter;
use crate::io::index::{IndexRecord, SolutionIndex};
use crate::mesh::{CellDims, StructuredZone, adjust_positions, cell_average};
use crate::profile::Profile;
use anyhow::{Context, Result};
use std::io::Write;
use tracing::{debug, info, warn};

pub const VELOCITY_X: &str = "VelocityX";
pub const VELOCITY_Y: &str = "VelocityY";
pub const VELOCITY_Z: &str = "VelocityZ";
pub const DISCHARGE: &str = "Discharge";
pub const STAGE: &str = "Stage";

/// Writes each profile as a solution on the shared mesh and records it in
/// the index. The mesh is built from the first profile emitted.
pub struct SolutionEmitter<W: Write> {
    mesh: Box<dyn MeshWriter>,
    index: SolutionIndex<W>,
    mesh_label: String,
    base_date: BaseDate,
    fudge: f64,
    dims: Option<CellDims>,
}

impl<W: Write> SolutionEmitter<W> {
    pub fn new(
        mesh: Box<dyn MeshWriter>,
        index: W,
        mesh_label: &str,
        base_date: BaseDate,
        fudge: f64,
    ) -> Self {
        SolutionEmitter {
            mesh,
            index: SolutionIndex::new(index),
            mesh_label: mesh_label.to_string(),
            base_date,
            fudge,
            dims: None,
        }
    }

    fn zone_dims(&mut self, profile: &Profile) -> Result<CellDims> {
        if let Some(dims) = self.dims {
            return Ok(dims);
        }
        let x = adjust_positions(&profile.position, self.fudge);
        if x.windows(2).any(|w| w[1] <= w[0]) {
            warn!(
                "station positions of \"{}\" are not strictly increasing after adjustment",
                profile.display_name()
            );
        }
        let zone = StructuredZone::ribbon(&x)
            .with_context(|| format!("Failed to build zone from \"{}\"", profile.display_name()))?;
        self.mesh.write_zone(&zone)?;
        info!(
            "{}: wrote zone with {} x {} x {} cells",
            self.mesh_label, zone.dims.ni, zone.dims.nj, zone.dims.nk
        );
        self.dims = Some(zone.dims);
        Ok(zone.dims)
    }

    pub fn emit(&mut self, profile: &Profile) -> Result<IndexRecord> {
        let dims = self.zone_dims(profile)?;
        let name = profile.display_name();
        let seconds = self.base_date.offset_seconds(profile.timestamp());
        let solution = self.mesh.write_solution(&name, seconds as f64)?;

        // Stations run downstream; upstream is positive X on the mesh
        let velocity_x: Vec<f64> = profile.velocity.iter().map(|v| -v).collect();
        let zeros = vec![0.0; profile.len()];
        let fields: [(&str, &[f64]); 5] = [
            (VELOCITY_X, velocity_x.as_slice()),
            (VELOCITY_Y, zeros.as_slice()),
            (VELOCITY_Z, zeros.as_slice()),
            (DISCHARGE, profile.discharge.as_slice()),
            (STAGE, profile.stage.as_slice()),
        ];
        for (field, values) in fields {
            let cells = cell_average(values, dims)
                .with_context(|| format!("Failed to write {} for \"{}\"", field, name))?;
            self.mesh.write_field(solution, field, &cells)?;
        }

        let record = IndexRecord {
            seconds,
            mesh_file: self.mesh_label.clone(),
            solution,
            name,
        };
        self.index
            .append(&record)
            .context("Failed to write solution index")?;
        debug!(
            "{}: wrote solution {}, \"{}\"",
            self.mesh_label, record.solution, record.name
        );
        Ok(record)
    }

    pub fn solutions_written(&self) -> usize {
        self.index.len()
    }

    /// Closes the mesh and returns the index writer
    pub fn finish(self) -> Result<W> {
        self.mesh.close()?;
        Ok(self.index.into_inner()?)
    }
}
