//! Tecplot ASCII output.
//!
//! Each solution becomes an ordered BLOCK zone tagged with its solution
//! time. Coordinates are written with the first zone only; later zones share
//! them through `VARSHARELIST`. Solutions are buffered until the next one
//! starts, because a zone's fields must all follow its header.

use super::MeshWriter;
use crate::config::BASE_NAME;
use crate::mesh::StructuredZone;
use anyhow::{Result, anyhow, bail};
use std::io::Write;

const COORDINATES: [&str; 3] = ["CoordinateX", "CoordinateY", "CoordinateZ"];
const VALUES_PER_LINE: usize = 5;

struct PendingSolution {
    id: usize,
    name: String,
    time: f64,
    fields: Vec<(String, Vec<f64>)>,
}

pub struct TecplotWriter<W: Write> {
    out: W,
    zone: Option<StructuredZone>,
    variables: Vec<String>,
    pending: Option<PendingSolution>,
    solutions: usize,
    zones_written: usize,
}

impl<W: Write> TecplotWriter<W> {
    pub fn new(out: W) -> Self {
        TecplotWriter {
            out,
            zone: None,
            variables: Vec::new(),
            pending: None,
            solutions: 0,
            zones_written: 0,
        }
    }

    /// Writes anything still buffered and hands back the underlying writer.
    /// A file without solutions still gets its title and variable list.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush_pending()?;
        if self.zones_written == 0 {
            self.write_file_header()?;
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_file_header(&mut self) -> Result<()> {
        writeln!(self.out, "TITLE = \"{}\"", BASE_NAME)?;
        let names: Vec<String> = COORDINATES
            .iter()
            .map(|s| s.to_string())
            .chain(self.variables.iter().cloned())
            .map(|name| format!("\"{}\"", name))
            .collect();
        writeln!(self.out, "VARIABLES = {}", names.join(" "))?;
        Ok(())
    }

    fn write_values(&mut self, values: &[f64]) -> Result<()> {
        for chunk in values.chunks(VALUES_PER_LINE) {
            let line: Vec<String> = chunk.iter().map(|v| v.to_string()).collect();
            writeln!(self.out, "{}", line.join(" "))?;
        }
        Ok(())
    }

    fn write_coordinates(&mut self, zone: &StructuredZone) -> Result<()> {
        self.write_values(&zone.x)?;
        self.write_values(&zone.y)?;
        self.write_values(&zone.z)
    }

    fn flush_pending(&mut self) -> Result<()> {
        let Some(solution) = self.pending.take() else {
            return Ok(());
        };
        let zone = self
            .zone
            .take()
            .ok_or_else(|| anyhow!("solution \"{}\" written before the zone", solution.name))?;

        let names: Vec<String> = solution.fields.iter().map(|(n, _)| n.clone()).collect();
        if self.zones_written == 0 {
            self.variables = names;
            self.write_file_header()?;
        } else if names != self.variables {
            bail!(
                "solution \"{}\" has fields {:?}, expected {:?}",
                solution.name,
                names,
                self.variables
            );
        }

        let [i, j, k] = zone.dims.nodes();
        writeln!(
            self.out,
            "ZONE T=\"{}\", I={}, J={}, K={}, ZONETYPE=Ordered, DATAPACKING=BLOCK",
            solution.name, i, j, k
        )?;
        if !self.variables.is_empty() {
            let first = COORDINATES.len() + 1;
            let last = COORDINATES.len() + self.variables.len();
            let range = if first == last {
                format!("[{}]", first)
            } else {
                format!("[{}-{}]", first, last)
            };
            writeln!(self.out, " VARLOCATION=({}=CELLCENTERED)", range)?;
        }
        writeln!(
            self.out,
            " STRANDID=1, SOLUTIONTIME={}",
            solution.time
        )?;

        if self.zones_written == 0 {
            self.write_coordinates(&zone)?;
        } else {
            writeln!(self.out, " VARSHARELIST=([1-3]=1)")?;
        }
        for (_, values) in &solution.fields {
            self.write_values(values)?;
        }

        self.zone = Some(zone);
        self.zones_written += 1;
        Ok(())
    }
}

impl<W: Write> MeshWriter for TecplotWriter<W> {
    fn write_zone(&mut self, zone: &StructuredZone) -> Result<()> {
        if self.zone.is_some() || self.zones_written > 0 {
            bail!("the mesh already has a zone");
        }
        self.zone = Some(zone.clone());
        Ok(())
    }

    fn write_solution(&mut self, name: &str, time: f64) -> Result<usize> {
        self.flush_pending()?;
        self.solutions += 1;
        self.pending = Some(PendingSolution {
            id: self.solutions,
            name: name.to_string(),
            time,
            fields: Vec::new(),
        });
        Ok(self.solutions)
    }

    fn write_field(&mut self, solution: usize, name: &str, values: &[f64]) -> Result<()> {
        let expected = self
            .zone
            .as_ref()
            .map(|z| z.dims.cell_count())
            .ok_or_else(|| anyhow!("field {} written before the zone", name))?;
        if values.len() != expected {
            bail!(
                "field {} has {} values, the zone has {} cells",
                name,
                values.len(),
                expected
            );
        }
        match self.pending.as_mut() {
            Some(pending) if pending.id == solution => {
                pending.fields.push((name.to_string(), values.to_vec()));
                Ok(())
            }
            _ => bail!("solution {} is not open for field {}", solution, name),
        }
    }

    fn close(self: Box<Self>) -> Result<()> {
        (*self).into_inner().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone() -> StructuredZone {
        StructuredZone::ribbon(&[0.0, 10.0, 20.0]).unwrap()
    }

    fn written(writer: TecplotWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_two_solutions_share_coordinates() {
        let mut writer = TecplotWriter::new(Vec::new());
        writer.write_zone(&zone()).unwrap();
        let first = writer.write_solution("01-01-2000 00:00:00", 0.0).unwrap();
        writer.write_field(first, "Stage", &[1.5, 2.5]).unwrap();
        writer.write_field(first, "Discharge", &[10.0, 20.0]).unwrap();
        let second = writer.write_solution("01-01-2000 01:00:00", 3600.0).unwrap();
        writer.write_field(second, "Stage", &[3.5, 4.5]).unwrap();
        writer.write_field(second, "Discharge", &[30.0, 40.0]).unwrap();
        assert_eq!((first, second), (1, 2));

        let text = written(writer);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "TITLE = \"FromMASS1\"");
        assert_eq!(
            lines[1],
            "VARIABLES = \"CoordinateX\" \"CoordinateY\" \"CoordinateZ\" \"Stage\" \"Discharge\""
        );
        assert_eq!(
            lines[2],
            "ZONE T=\"01-01-2000 00:00:00\", I=3, J=2, K=2, ZONETYPE=Ordered, DATAPACKING=BLOCK"
        );
        assert_eq!(lines[3], " VARLOCATION=([4-5]=CELLCENTERED)");
        assert_eq!(lines[4], " STRANDID=1, SOLUTIONTIME=0");
        // 12 nodes per coordinate, five to a line
        assert_eq!(lines[5], "0 10 20 0 10");
        assert_eq!(lines[14], "1.5 2.5");
        assert_eq!(lines[15], "10 20");
        assert_eq!(text.matches("ZONE T=").count(), 2);
        assert!(text.contains(" STRANDID=1, SOLUTIONTIME=3600\n VARSHARELIST=([1-3]=1)\n3.5 4.5\n30 40\n"));
    }

    #[test]
    fn test_field_before_zone_fails() {
        let mut writer = TecplotWriter::new(Vec::new());
        assert!(writer.write_field(1, "Stage", &[1.0]).is_err());
    }

    #[test]
    fn test_field_size_must_match_cells() {
        let mut writer = TecplotWriter::new(Vec::new());
        writer.write_zone(&zone()).unwrap();
        let id = writer.write_solution("s", 0.0).unwrap();
        assert!(writer.write_field(id, "Stage", &[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_fields_must_match_first_solution() {
        let mut writer = TecplotWriter::new(Vec::new());
        writer.write_zone(&zone()).unwrap();
        let id = writer.write_solution("a", 0.0).unwrap();
        writer.write_field(id, "Stage", &[1.0, 2.0]).unwrap();
        let id = writer.write_solution("b", 1.0).unwrap();
        writer.write_field(id, "Velocity", &[1.0, 2.0]).unwrap();
        assert!(writer.into_inner().is_err());
    }

    #[test]
    fn test_empty_mesh_keeps_title() {
        let text = written(TecplotWriter::new(Vec::new()));
        assert_eq!(
            text,
            "TITLE = \"FromMASS1\"\nVARIABLES = \"CoordinateX\" \"CoordinateY\" \"CoordinateZ\"\n"
        );
    }
}
