use crate::config::{CFS_TO_CMS, FEET_TO_METERS};
use crate::error::{RecordError, ScanError};
use crate::header::ProfileHeader;
use chrono::NaiveDateTime;

// Zero-based columns of a station row
const POSITION_COLUMN: usize = 3;
const STAGE_COLUMN: usize = 4;
const DISCHARGE_COLUMN: usize = 5;
const VELOCITY_COLUMN: usize = 6;
const CONDUCTIVITY_COLUMN: usize = 8;
const TEMPERATURE_COLUMN: usize = 9;
const MIN_FIELDS: usize = TEMPERATURE_COLUMN + 1;

// One station row, already converted to SI units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationRecord {
    pub position: f64,
    pub stage: f64,
    pub discharge: f64,
    pub velocity: f64,
    pub conductivity: f64,
    pub temperature: f64,
}

impl StationRecord {
    /// `distance_factor` converts the position column to meters; stage and
    /// velocity are always feet based.
    pub fn parse(line: &str, distance_factor: f64) -> Result<Self, RecordError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_FIELDS {
            return Err(RecordError::TooFewFields {
                expected: MIN_FIELDS,
                found: fields.len(),
            });
        }

        let number = |column: usize| -> Result<f64, RecordError> {
            fields[column]
                .parse::<f64>()
                .map_err(|_| RecordError::InvalidNumber {
                    column,
                    value: fields[column].to_string(),
                })
        };

        Ok(StationRecord {
            position: number(POSITION_COLUMN)? * distance_factor,
            stage: number(STAGE_COLUMN)? * FEET_TO_METERS,
            discharge: number(DISCHARGE_COLUMN)? * CFS_TO_CMS,
            velocity: number(VELOCITY_COLUMN)? * FEET_TO_METERS,
            conductivity: number(CONDUCTIVITY_COLUMN)?,
            temperature: number(TEMPERATURE_COLUMN)?,
        })
    }
}

/// One dated cross-section. Velocity keeps the sign of the input file,
/// positive downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub ordinal: usize,
    pub header: ProfileHeader,
    pub position: Vec<f64>,
    pub stage: Vec<f64>,
    pub discharge: Vec<f64>,
    pub velocity: Vec<f64>,
    pub conductivity: Vec<f64>,
    pub temperature: Vec<f64>,
}

impl Profile {
    pub fn display_name(&self) -> String {
        self.header.display_name()
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.header.timestamp
    }

    pub fn len(&self) -> usize {
        self.position.len()
    }
}

// Collects station rows for a profile whose header has been read
#[derive(Debug)]
pub struct ProfileBuilder {
    profile: Profile,
}

impl ProfileBuilder {
    // Arrays grow row by row; the declared point count is only checked
    pub fn new(ordinal: usize, header: ProfileHeader) -> Self {
        ProfileBuilder {
            profile: Profile {
                ordinal,
                header,
                position: Vec::new(),
                stage: Vec::new(),
                discharge: Vec::new(),
                velocity: Vec::new(),
                conductivity: Vec::new(),
                temperature: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> String {
        self.profile.display_name()
    }

    pub fn push_line(
        &mut self,
        line: &str,
        line_no: usize,
        distance_factor: f64,
    ) -> Result<(), ScanError> {
        let expected = self.profile.header.points;
        if self.profile.len() >= expected {
            return Err(ScanError::TooManyPoints {
                line: line_no,
                name: self.name(),
                expected,
            });
        }
        let record = StationRecord::parse(line, distance_factor).map_err(|source| {
            ScanError::Record {
                line: line_no,
                source,
            }
        })?;
        self.push(record);
        Ok(())
    }

    fn push(&mut self, record: StationRecord) {
        let p = &mut self.profile;
        p.position.push(record.position);
        p.stage.push(record.stage);
        p.discharge.push(record.discharge);
        p.velocity.push(record.velocity);
        p.conductivity.push(record.conductivity);
        p.temperature.push(record.temperature);
    }

    pub fn finish(self) -> Result<Profile, ScanError> {
        let expected = self.profile.header.points;
        let found = self.profile.len();
        if found != expected {
            return Err(ScanError::TooFewPoints {
                name: self.name(),
                expected,
                found,
            });
        }
        Ok(self.profile)
    }
}
