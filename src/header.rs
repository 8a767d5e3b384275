//! Profile header recognition.
//!
//! A MASS1 profile file interleaves header lines such as
//!
//! ```text
//! Profile 1   Date: 01-02-2000  Time: 06:30:00   Number of points = 5
//! ```
//!
//! with whitespace-delimited station rows and `#` comments. The date and
//! time sit at fixed offsets after the `Date:` marker; the point count
//! follows the first `=`.

use crate::config::TIMESTAMP_FORMAT;
use crate::error::HeaderError;
use chrono::NaiveDateTime;

pub const HEADER_MARKER: &str = "Date:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Header,
    Skip,
    Data,
}

pub fn classify_line(line: &str) -> LineKind {
    if line.contains(HEADER_MARKER) {
        LineKind::Header
    } else if line.contains('#') || line.trim().is_empty() {
        LineKind::Skip
    } else {
        LineKind::Data
    }
}

/// A field located relative to a marker string. `width: None` takes the
/// rest of the line.
#[derive(Debug, Clone, Copy)]
pub struct LabeledField {
    pub name: &'static str,
    pub marker: &'static str,
    pub offset: usize,
    pub width: Option<usize>,
}

impl LabeledField {
    pub fn extract<'l>(&self, line: &'l str) -> Option<&'l str> {
        let start = line.find(self.marker)? + self.marker.len() + self.offset;
        let rest = line.get(start..)?;
        match self.width {
            Some(width) => rest.get(..width),
            None => Some(rest),
        }
    }

    fn require<'l>(&self, line: &'l str) -> Result<&'l str, HeaderError> {
        self.extract(line)
            .ok_or(HeaderError::MissingField(self.name))
    }
}

pub const DATE_FIELD: LabeledField = LabeledField {
    name: "date",
    marker: HEADER_MARKER,
    offset: 1,
    width: Some(10),
};

pub const TIME_FIELD: LabeledField = LabeledField {
    name: "time",
    marker: HEADER_MARKER,
    offset: 19,
    width: Some(8),
};

pub const POINTS_FIELD: LabeledField = LabeledField {
    name: "point count",
    marker: "=",
    offset: 0,
    width: None,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileHeader {
    pub date: String,
    pub time: String,
    pub points: usize,
    pub timestamp: NaiveDateTime,
}

impl ProfileHeader {
    /// "MM-DD-YYYY HH:MM:SS", as it appears in the header
    pub fn display_name(&self) -> String {
        format!("{} {}", self.date, self.time)
    }
}

pub fn parse_header(line: &str) -> Result<ProfileHeader, HeaderError> {
    let date = DATE_FIELD.require(line)?;
    let time = TIME_FIELD.require(line)?;
    let points_text = POINTS_FIELD.require(line)?.trim();
    let points = points_text
        .parse::<usize>()
        .map_err(|_| HeaderError::InvalidPointCount(points_text.to_string()))?;

    let name = format!("{} {}", date, time);
    let timestamp = NaiveDateTime::parse_from_str(&name, TIMESTAMP_FORMAT).map_err(|source| {
        HeaderError::InvalidTimestamp {
            value: name.clone(),
            source,
        }
    })?;

    Ok(ProfileHeader {
        date: date.to_string(),
        time: time.to_string(),
        points,
        timestamp,
    })
}
