use crate::config::{
    BaseDate, Config, DEFAULT_FUDGE, DistanceUnits, MeshFormat, ProfileRange, TIMESTAMP_FORMAT,
};
use chrono::NaiveDateTime;
use clap::Parser;
use std::path::PathBuf;

/// Convert MASS1 profile output into a structured mesh with one solution per profile
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Profile text file to read
    profile: PathBuf,

    /// Mesh file to write
    output_mesh: PathBuf,

    /// Solution index file to write
    output_index: PathBuf,

    /// Log progress messages to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Start with the nth profile in the input
    #[arg(short, long, value_name = "N", default_value_t = 1, value_parser = parse_profile_index)]
    start: usize,

    /// End with the nth profile in the input
    #[arg(short, long, value_name = "N", default_value_t = 1, value_parser = parse_profile_index)]
    end: usize,

    /// Units of the profile distance column
    #[arg(short, long, value_enum, default_value_t = DistanceUnits::Mile)]
    units: DistanceUnits,

    /// Date/time representing time = 0s, "MM-DD-YYYY HH:MM:SS"
    #[arg(short = 'B', long, value_name = "DATE", value_parser = parse_base_date)]
    base_date: Option<NaiveDateTime>,

    /// Amount to move stations in zero length segments, m
    #[arg(short, long, value_name = "FACTOR", default_value_t = DEFAULT_FUDGE, value_parser = parse_fudge)]
    fudge: f64,

    /// Mesh file format
    #[arg(long, value_enum, default_value_t)]
    format: MeshFormat,

    /// Also write every converted station to this CSV file
    #[arg(long, value_name = "PATH")]
    stations: Option<PathBuf>,

    /// Write the last selected profile even if no header follows it
    #[arg(long)]
    flush_last: bool,
}

fn parse_profile_index(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("profile index must be a positive integer, got {:?}", s)),
    }
}

fn parse_base_date(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|e| format!("specified base date ({}) not understood: {}", s, e))
}

fn parse_fudge(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f > 0.0 => Ok(f),
        _ => Err(format!("fudge must be a positive number of meters, got {:?}", s)),
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            profile_path: args.profile,
            mesh_path: args.output_mesh,
            index_path: args.output_index,
            verbose: args.verbose,
            range: ProfileRange::new(args.start, args.end),
            units: args.units,
            base_date: args.base_date.map_or(BaseDate::YearStart, BaseDate::Fixed),
            fudge: args.fudge,
            format: args.format,
            stations_path: args.stations,
            flush_last: args.flush_last,
        }
    }
}

pub fn get_args() -> Config {
    Args::parse().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> Config {
        let argv = ["profile2mesh", "in.dat", "out.plt", "out.list"]
            .iter()
            .chain(args.iter());
        Args::try_parse_from(argv).unwrap().into()
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.range, ProfileRange { start: 1, end: 1 });
        assert_eq!(config.units, DistanceUnits::Mile);
        assert_eq!(config.base_date, BaseDate::YearStart);
        assert_eq!(config.fudge, 5.0);
        assert_eq!(config.format, MeshFormat::Tecplot);
        assert!(!config.flush_last);
        assert_eq!(config.index_path, PathBuf::from("out.list"));
    }

    #[test]
    fn test_short_options() {
        let config = config(&["-v", "-s", "2", "-e", "6", "-u", "foot", "-f", "2.5"]);
        assert!(config.verbose);
        assert_eq!(config.range, ProfileRange { start: 2, end: 6 });
        assert_eq!(config.units, DistanceUnits::Foot);
        assert_eq!(config.fudge, 2.5);
    }

    #[test]
    fn test_end_clamped_to_start() {
        let config = config(&["--start", "3", "--end", "1"]);
        assert_eq!(config.range, ProfileRange { start: 3, end: 3 });
    }

    #[test]
    fn test_base_date() {
        let config = config(&["-B", "10-01-1999 12:00:00"]);
        let expected =
            NaiveDateTime::parse_from_str("1999-10-01 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(config.base_date, BaseDate::Fixed(expected));
    }

    #[test]
    fn test_rejects_bad_values() {
        let base = ["profile2mesh", "in.dat", "out.plt", "out.list"];
        for bad in [
            &["-B", "1999-10-01"][..],
            &["--start", "0"][..],
            &["--units", "furlong"][..],
            &["--fudge", "-1"][..],
        ] {
            let argv = base.iter().chain(bad.iter());
            assert!(Args::try_parse_from(argv).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_requires_three_paths() {
        assert!(Args::try_parse_from(["profile2mesh", "in.dat", "out.plt"]).is_err());
    }
}
