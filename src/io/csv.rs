use crate::profile::Profile;
use anyhow::{Context, Result};
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

// Station table row; temperature and conductivity only reach this export
#[derive(Debug, Serialize)]
struct StationRow<'a> {
    solution: usize,
    profile: usize,
    time: &'a str,
    station: usize,
    position_m: f64,
    stage_m: f64,
    discharge_m3s: f64,
    velocity_ms: f64,
    temperature: f64,
    conductivity: f64,
}

// Create CSV writer for the station export; the header row comes from StationRow
pub fn create_csv_writer(path: &Path) -> Result<Writer<File>> {
    WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to create station file: {:?}", path))
}

pub fn write_profile_rows<W: Write>(
    wtr: &mut Writer<W>,
    profile: &Profile,
    solution: usize,
) -> Result<()> {
    let time = profile.display_name();
    for station in 0..profile.len() {
        wtr.serialize(StationRow {
            solution,
            profile: profile.ordinal,
            time: &time,
            station: station + 1,
            position_m: profile.position[station],
            stage_m: profile.stage[station],
            discharge_m3s: profile.discharge[station],
            velocity_ms: profile.velocity[station],
            temperature: profile.temperature[station],
            conductivity: profile.conductivity[station],
        })?;
    }
    Ok(())
}
