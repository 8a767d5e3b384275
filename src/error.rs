//! Error types for profile parsing and mesh construction.
//!
//! Any of these aborts the conversion; partial output would misrepresent
//! the profile data.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("profile header is missing its {0} field")]
    MissingField(&'static str),

    #[error("invalid point count {0:?}")]
    InvalidPointCount(String),

    #[error("profile timestamp {value:?} not understood")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("field {column} ({value:?}) is not a number")]
    InvalidNumber { column: usize, value: String },
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("line {line}: {source}")]
    Header {
        line: usize,
        #[source]
        source: HeaderError,
    },

    #[error("line {line}: {source}")]
    Record {
        line: usize,
        #[source]
        source: RecordError,
    },

    #[error("line {line}: profile \"{name}\" declares {expected} points but has more data rows")]
    TooManyPoints {
        line: usize,
        name: String,
        expected: usize,
    },

    #[error("profile \"{name}\" declares {expected} points but only {found} data rows were read")]
    TooFewPoints {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum MeshError {
    #[error("a structured zone needs at least 2 stations, found {0}")]
    TooFewStations(usize),

    #[error("field has {found} values but the mesh has {expected} nodes along the profile")]
    LengthMismatch { expected: usize, found: usize },
}
