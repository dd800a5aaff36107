// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Error taxonomy shared by the converter, the map renderer and the KML bridge.

use std::{error::Error, fmt::Display, path::PathBuf};

use crate::models::coords::CoordinateSystem;

/// Why a coordinate field could not be read as a number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseIssue {
    /// The field was left empty.
    Empty,
    /// A decimal comma was used instead of a decimal point.
    DecimalComma,
    /// The text is not a number at all.
    NotANumber,
    /// The text parsed to infinity or NaN.
    NotFinite,
}

/// Error from the coordinate, map and KML layers.
#[derive(Debug)]
pub enum GeoError {
    /// A coordinate field did not hold a usable number.
    Parse {
        /// Human-readable field name, e.g. "EOV Y".
        field: String,
        issue: ParseIssue,
    },
    /// A coordinate lies outside the plausible domain of its system.
    Range {
        system: CoordinateSystem,
        first: f64,
        second: f64,
        /// Extra hint appended to the message.
        hint: Option<&'static str>,
    },
    /// A pair was handed to an operation expecting another system.
    SystemMismatch {
        expected: CoordinateSystem,
        found: CoordinateSystem,
    },
    /// The map cannot be centered on the given input.
    Render(String),
    /// KML file does not exist.
    FileNotFound(PathBuf),
    /// KML file is not a well-formed placemark list.
    Format(String),
    /// Error forwarded from std.
    Io(std::io::Error),
}

impl Display for GeoError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        use crate::errors::GeoError::*;

        match self {
            Parse { field, issue } => match issue {
                ParseIssue::Empty => write!(f, "{} coordinate is required", field),
                ParseIssue::DecimalComma => write!(
                    f,
                    "{} coordinate: use a decimal point instead of a comma",
                    field
                ),
                ParseIssue::NotANumber => write!(f, "{} coordinate is not a number", field),
                ParseIssue::NotFinite => write!(f, "{} coordinate must be a finite number", field),
            },
            Range {
                system,
                first,
                second,
                hint,
            } => {
                write!(
                    f,
                    "{} coordinates ({}, {}) are outside the valid {} domain",
                    system.name(),
                    first,
                    second,
                    system.domain_description()
                )?;
                if let Some(hint) = hint {
                    write!(f, "; {}", hint)?;
                }
                Ok(())
            }
            SystemMismatch { expected, found } => write!(
                f,
                "expected {} coordinates, got {}",
                expected.name(),
                found.name()
            ),
            Render(msg) => write!(f, "cannot render map: {}", msg),
            FileNotFound(path) => write!(f, "file not found: {}", path.display()),
            Format(msg) => write!(f, "invalid KML: {}", msg),
            Io(err) => write!(f, "i/o error: {}", err),
        }
    }
}

impl Error for GeoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GeoError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GeoError {
    fn from(err: std::io::Error) -> GeoError {
        GeoError::Io(err)
    }
}

impl From<quick_xml::Error> for GeoError {
    fn from(err: quick_xml::Error) -> GeoError {
        GeoError::Format(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_messages_name_the_field() {
        let err = GeoError::Parse {
            field: "EOV Y".into(),
            issue: ParseIssue::DecimalComma,
        };
        assert_eq!(
            err.to_string(),
            "EOV Y coordinate: use a decimal point instead of a comma"
        );
    }

    #[test]
    fn range_message_carries_hint() {
        let err = GeoError::Range {
            system: CoordinateSystem::Eov,
            first: 240000.0,
            second: 650000.0,
            hint: Some("Y and X look swapped"),
        };
        let text = err.to_string();
        assert!(text.starts_with("EOV coordinates (240000, 650000)"));
        assert!(text.ends_with("Y and X look swapped"));
    }

    #[test]
    fn io_errors_keep_their_source() {
        let err = GeoError::from(std::io::Error::other("disk full"));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("disk full"));
    }
}
