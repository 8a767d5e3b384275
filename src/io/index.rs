use std::fmt;
use std::io::{self, Write};

// One line of the solution index
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRecord {
    pub seconds: i64,
    pub mesh_file: String,
    pub solution: usize,
    pub name: String,
}

impl fmt::Display for IndexRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:12} {} {:10} # {}",
            self.seconds, self.mesh_file, self.solution, self.name
        )
    }
}

// Writes index records in the order solutions are emitted
pub struct SolutionIndex<W: Write> {
    out: W,
    records: usize,
}

impl<W: Write> SolutionIndex<W> {
    pub fn new(out: W) -> Self {
        SolutionIndex { out, records: 0 }
    }

    pub fn append(&mut self, record: &IndexRecord) -> io::Result<()> {
        writeln!(self.out, "{}", record)?;
        self.records += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records
    }

    pub fn into_inner(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}
