use crate::config::ProfileRange;
use crate::error::ScanError;
use crate::header::{LineKind, classify_line, parse_header};
use crate::profile::{Profile, ProfileBuilder};
use std::io::{BufRead, Lines};
use tracing::{debug, warn};

// Where the scanner is between two lines of input
#[derive(Debug)]
pub enum ScanState {
    /// Before the first header
    Idle,
    /// Inside a profile outside the selected range
    Skipping,
    Accumulating(ProfileBuilder),
    Finished,
}

/// Yields each selected profile once the header that follows it has been
/// read. The profile still accumulating at end of input is only yielded
/// when `flush_last` is set.
pub struct ProfileScanner<R> {
    lines: Lines<R>,
    range: ProfileRange,
    distance_factor: f64,
    flush_last: bool,
    state: ScanState,
    pending: Option<ScanError>,
    line_no: usize,
    profiles_seen: usize,
}

impl<R: BufRead> ProfileScanner<R> {
    pub fn new(reader: R, range: ProfileRange, distance_factor: f64, flush_last: bool) -> Self {
        ProfileScanner {
            lines: reader.lines(),
            range,
            distance_factor,
            flush_last,
            state: ScanState::Idle,
            pending: None,
            line_no: 0,
            profiles_seen: 0,
        }
    }

    /// Number of header lines read so far
    pub fn profiles_seen(&self) -> usize {
        self.profiles_seen
    }

    fn fail(&mut self, err: ScanError) -> Option<Result<Profile, ScanError>> {
        self.state = ScanState::Finished;
        Some(Err(err))
    }

    fn end_of_input(&mut self) -> Option<Result<Profile, ScanError>> {
        match std::mem::replace(&mut self.state, ScanState::Finished) {
            ScanState::Accumulating(builder) if self.flush_last => Some(builder.finish()),
            ScanState::Accumulating(builder) => {
                warn!(
                    "profile {} (\"{}\") not written: input ended before another profile header",
                    self.profiles_seen,
                    builder.name()
                );
                None
            }
            _ => None,
        }
    }

    // Returns the profile completed by this header, if any
    fn on_header(&mut self, line: &str) -> Option<Result<Profile, ScanError>> {
        let completed = match std::mem::replace(&mut self.state, ScanState::Skipping) {
            ScanState::Accumulating(builder) => Some(builder),
            _ => None,
        };

        self.profiles_seen += 1;
        debug!("found profile record {} at line {}", self.profiles_seen, self.line_no);

        if self.range.is_past(self.profiles_seen) {
            self.state = ScanState::Finished;
        } else if self.range.contains(self.profiles_seen) {
            match parse_header(line) {
                Ok(header) => {
                    self.state =
                        ScanState::Accumulating(ProfileBuilder::new(self.profiles_seen, header));
                }
                Err(source) => {
                    let err = ScanError::Header {
                        line: self.line_no,
                        source,
                    };
                    self.state = ScanState::Finished;
                    if completed.is_none() {
                        return Some(Err(err));
                    }
                    self.pending = Some(err);
                }
            }
        }

        completed.map(ProfileBuilder::finish)
    }
}

impl<R: BufRead> Iterator for ProfileScanner<R> {
    type Item = Result<Profile, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending.take() {
            return Some(Err(err));
        }

        loop {
            if matches!(self.state, ScanState::Finished) {
                return None;
            }

            let line = match self.lines.next() {
                None => return self.end_of_input(),
                Some(Err(e)) => return self.fail(e.into()),
                Some(Ok(line)) => line,
            };
            self.line_no += 1;

            match classify_line(&line) {
                LineKind::Header => {
                    if let Some(result) = self.on_header(&line) {
                        return Some(result);
                    }
                }
                LineKind::Skip => continue,
                LineKind::Data => {
                    let line_no = self.line_no;
                    let factor = self.distance_factor;
                    if let ScanState::Accumulating(builder) = &mut self.state {
                        if let Err(e) = builder.push_line(&line, line_no, factor) {
                            return self.fail(e);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const INPUT: &str = "\
# MASS1 profile output
Profile 1   Date: 01-01-2000  Time: 00:00:00   Number of points = 2
    1    1    1   0.000   400.0   1000.0   2.0   3.0   150.0   12.5

    1    2    1   1.000   401.0   1000.0   2.5   3.0   150.0   12.5
Profile 2   Date: 01-01-2000  Time: 01:00:00   Number of points = 2
    1    1    1   0.000   402.0   1100.0   2.0   3.0   150.0   12.5
    1    2    1   1.000   403.0   1100.0   2.5   3.0   150.0   12.5
Profile 3   Date: 01-01-2000  Time: 02:00:00   Number of points = 2
    1    1    1   0.000   404.0   1200.0   2.0   3.0   150.0   12.5
    1    2    1   1.000   405.0   1200.0   2.5   3.0   150.0   12.5
";

    fn scan(input: &str, start: usize, end: usize, flush_last: bool) -> Vec<Profile> {
        ProfileScanner::new(Cursor::new(input), ProfileRange::new(start, end), 1.0, flush_last)
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    fn names(profiles: &[Profile]) -> Vec<String> {
        profiles.iter().map(Profile::display_name).collect()
    }

    fn first_two_profiles() -> String {
        INPUT.lines().take(8).map(|l| format!("{}\n", l)).collect()
    }

    #[test]
    fn test_profile_finalized_by_next_header() {
        let profiles = scan(&first_two_profiles(), 1, 2, false);
        assert_eq!(names(&profiles), vec!["01-01-2000 00:00:00"]);
        assert_eq!(profiles[0].ordinal, 1);
        assert_eq!(profiles[0].position, vec![0.0, 1.0]);
    }

    #[test]
    fn test_header_past_range_finalizes_last_selected() {
        let profiles = scan(INPUT, 1, 2, false);
        assert_eq!(
            names(&profiles),
            vec!["01-01-2000 00:00:00", "01-01-2000 01:00:00"]
        );
    }

    #[test]
    fn test_range_end_stops_scanning() {
        let profiles = scan(INPUT, 1, 1, false);
        assert_eq!(names(&profiles), vec!["01-01-2000 00:00:00"]);
    }

    #[test]
    fn test_skipped_profiles_are_ignored() {
        let profiles = scan(INPUT, 2, 2, false);
        assert_eq!(names(&profiles), vec!["01-01-2000 01:00:00"]);
        assert_eq!(profiles[0].ordinal, 2);
    }

    #[test]
    fn test_last_profile_dropped_without_flush() {
        let profiles = scan(INPUT, 1, 3, false);
        assert_eq!(profiles.len(), 2);
    }

    #[test]
    fn test_last_profile_flushed() {
        let profiles = scan(INPUT, 1, 3, true);
        assert_eq!(
            names(&profiles),
            vec![
                "01-01-2000 00:00:00",
                "01-01-2000 01:00:00",
                "01-01-2000 02:00:00"
            ]
        );
    }

    #[test]
    fn test_malformed_header_after_completed_profile() {
        let input = INPUT.replace(
            "Number of points = 2\n    1    1    1   0.000   402.0",
            "\n    1    1    1   0.000   402.0",
        );
        let mut scanner =
            ProfileScanner::new(Cursor::new(input), ProfileRange::new(1, 2), 1.0, false);
        assert!(scanner.next().unwrap().is_ok());
        let err = scanner.next().unwrap().unwrap_err();
        assert!(matches!(err, ScanError::Header { line: 6, .. }));
        assert!(scanner.next().is_none());
    }

    #[test]
    fn test_malformed_header_outside_range_is_not_parsed() {
        let input = INPUT.replace(
            "Profile 2   Date: 01-01-2000  Time: 01:00:00   Number of points = 2",
            "Profile 2   Date: garbage",
        );
        let profiles = scan(&input, 1, 1, false);
        assert_eq!(profiles.len(), 1);
    }

    #[test]
    fn test_data_error_reports_line() {
        let input = INPUT.replace("401.0", "bad");
        let err = ProfileScanner::new(Cursor::new(input), ProfileRange::new(1, 1), 1.0, false)
            .next()
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, ScanError::Record { line: 5, .. }));
    }

    #[test]
    fn test_counts_headers() {
        let mut scanner =
            ProfileScanner::new(Cursor::new(INPUT), ProfileRange::new(1, 5), 1.0, false);
        while scanner.next().is_some() {}
        assert_eq!(scanner.profiles_seen(), 3);
    }

    #[test]
    fn test_huge_point_count_is_an_error() {
        let input = INPUT.replace(
            "Time: 00:00:00   Number of points = 2",
            "Time: 00:00:00   Number of points = 18446744073709551615",
        );
        let err = ProfileScanner::new(Cursor::new(input), ProfileRange::new(1, 1), 1.0, false)
            .next()
            .unwrap()
            .unwrap_err();
        assert!(matches!(
            err,
            ScanError::TooFewPoints { expected: usize::MAX, found: 2, .. }
        ));
    }
}
