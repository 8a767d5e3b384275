use chrono::{Datelike, NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use std::path::PathBuf;

pub const FEET_TO_METERS: f64 = 0.3048;
pub const FEET_PER_MILE: f64 = 5280.0;
pub const CFS_TO_CMS: f64 = 0.0283168;

/// Format shared by profile display names and `--base-date`
pub const TIMESTAMP_FORMAT: &str = "%m-%d-%Y %H:%M:%S";

pub const DEFAULT_FUDGE: f64 = 5.0;
pub const RIBBON_WIDTH: f64 = 120.0;
pub const BASE_NAME: &str = "FromMASS1";
pub const ZONE_NAME: &str = "Zone";

// Units of the profile distance column
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DistanceUnits {
    Mile,
    Foot,
}

impl DistanceUnits {
    pub fn to_meters(self) -> f64 {
        match self {
            DistanceUnits::Mile => FEET_TO_METERS * FEET_PER_MILE,
            DistanceUnits::Foot => FEET_TO_METERS,
        }
    }
}

// Output mesh container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MeshFormat {
    #[default]
    Tecplot,
    #[cfg(feature = "netcdf")]
    Netcdf,
}

// Inclusive, 1-based range of profiles to convert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileRange {
    pub start: usize,
    pub end: usize,
}

impl ProfileRange {
    /// An `end` before `start` collapses the range to the single `start` profile.
    pub fn new(start: usize, end: usize) -> Self {
        ProfileRange {
            start,
            end: end.max(start),
        }
    }

    pub fn contains(&self, ordinal: usize) -> bool {
        ordinal >= self.start && ordinal <= self.end
    }

    pub fn is_past(&self, ordinal: usize) -> bool {
        ordinal > self.end
    }
}

// Time zero for solution offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseDate {
    /// Midnight on January 1 of each solution's own year
    YearStart,
    Fixed(NaiveDateTime),
}

impl BaseDate {
    pub fn resolve(&self, timestamp: NaiveDateTime) -> NaiveDateTime {
        match self {
            BaseDate::Fixed(base) => *base,
            BaseDate::YearStart => NaiveDate::from_ymd_opt(timestamp.year(), 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap_or(timestamp),
        }
    }

    /// Signed whole seconds from the base date to `timestamp`
    pub fn offset_seconds(&self, timestamp: NaiveDateTime) -> i64 {
        (timestamp - self.resolve(timestamp)).num_seconds()
    }
}

// Fully resolved run configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub profile_path: PathBuf,
    pub mesh_path: PathBuf,
    pub index_path: PathBuf,
    pub verbose: bool,
    pub range: ProfileRange,
    pub units: DistanceUnits,
    pub base_date: BaseDate,
    pub fudge: f64,
    pub format: MeshFormat,
    pub stations_path: Option<PathBuf>,
    pub flush_last: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn test_distance_factors() {
        assert_eq!(DistanceUnits::Mile.to_meters(), 0.3048 * 5280.0);
        assert_eq!(DistanceUnits::Foot.to_meters(), 0.3048);
    }

    #[test]
    fn test_end_before_start_is_clamped() {
        let range = ProfileRange::new(4, 2);
        assert_eq!(range.end, 4);
        assert!(range.contains(4));
        assert!(!range.contains(3));
        assert!(range.is_past(5));
    }

    #[test]
    fn test_year_start_offset() {
        let t = at("01-02-2000 06:30:00");
        assert_eq!(BaseDate::YearStart.resolve(t), at("01-01-2000 00:00:00"));
        assert_eq!(BaseDate::YearStart.offset_seconds(t), 86400 + 6 * 3600 + 1800);
    }

    #[test]
    fn test_fixed_offset_is_signed() {
        let base = BaseDate::Fixed(at("06-01-2001 00:00:00"));
        assert_eq!(base.offset_seconds(at("06-01-2001 00:01:00")), 60);
        assert_eq!(base.offset_seconds(at("05-31-2001 23:59:00")), -60);
    }
}
