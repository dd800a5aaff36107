// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Coordinate pairs tagged with the reference system they belong to.
//! Parsing and domain checks are kept pure so the controller and the
//! KML bridge share one definition of a valid point.

use std::ops::RangeInclusive;

use crate::errors::{GeoError, ParseIssue};

/// EOV easting ("Y") accepted by the Hungarian grid, in meters.
pub const EOV_EASTING_RANGE: RangeInclusive<f64> = 400_000.0..=950_000.0;
/// EOV northing ("X") accepted by the Hungarian grid, in meters.
pub const EOV_NORTHING_RANGE: RangeInclusive<f64> = 30_000.0..=400_000.0;
const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// Reference systems the application converts between.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordinateSystem {
    /// Hungarian national grid (EPSG:23700), easting/northing in meters.
    Eov,
    /// World Geodetic System 1984 (EPSG:4326), latitude/longitude in degrees.
    Wgs84,
}

impl CoordinateSystem {
    /// Short display name.
    pub fn name(&self) -> &'static str {
        match self {
            CoordinateSystem::Eov => "EOV",
            CoordinateSystem::Wgs84 => "WGS'84",
        }
    }

    pub(crate) fn domain_description(&self) -> &'static str {
        match self {
            CoordinateSystem::Eov => {
                "Hungarian grid (Y 400000..950000 m, X 30000..400000 m)"
            }
            CoordinateSystem::Wgs84 => "range (latitude -90..90, longitude -180..180)",
        }
    }

    /// Field names of the two components, in pair order.
    pub fn field_names(&self) -> (&'static str, &'static str) {
        match self {
            CoordinateSystem::Eov => ("EOV Y", "EOV X"),
            CoordinateSystem::Wgs84 => ("Latitude", "Longitude"),
        }
    }
}

/// Two numbers tagged with exactly one coordinate system.
///
/// EOV pairs are `(easting, northing)`; WGS'84 pairs are `(latitude, longitude)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinatePair {
    system: CoordinateSystem,
    first: f64,
    second: f64,
}

impl CoordinatePair {
    /// Tag two raw values. Domain checks happen in [`CoordinatePair::validate`].
    pub fn new(system: CoordinateSystem, first: f64, second: f64) -> Self {
        Self {
            system,
            first,
            second,
        }
    }

    /// EOV pair from easting ("Y") and northing ("X").
    pub fn eov(easting: f64, northing: f64) -> Self {
        Self::new(CoordinateSystem::Eov, easting, northing)
    }

    /// WGS'84 pair from latitude and longitude in decimal degrees.
    pub fn wgs84(latitude: f64, longitude: f64) -> Self {
        Self::new(CoordinateSystem::Wgs84, latitude, longitude)
    }

    /// Build a pair from raw form text.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Parse`] naming the offending field when it is empty,
    /// uses a decimal comma, or does not hold a finite number.
    pub fn parse(system: CoordinateSystem, first: &str, second: &str) -> Result<Self, GeoError> {
        let (first_name, second_name) = system.field_names();
        let first = parse_component(first_name, first)?;
        let second = parse_component(second_name, second)?;
        Ok(Self::new(system, first, second))
    }

    pub fn system(&self) -> CoordinateSystem {
        self.system
    }

    /// Values in pair order.
    pub fn values(&self) -> (f64, f64) {
        (self.first, self.second)
    }

    pub fn easting(&self) -> f64 {
        self.first
    }

    pub fn northing(&self) -> f64 {
        self.second
    }

    pub fn latitude(&self) -> f64 {
        self.first
    }

    pub fn longitude(&self) -> f64 {
        self.second
    }

    /// Whether both values lie inside the domain of the tagged system.
    pub fn in_domain(&self) -> bool {
        match self.system {
            CoordinateSystem::Eov => {
                EOV_EASTING_RANGE.contains(&self.first) && EOV_NORTHING_RANGE.contains(&self.second)
            }
            CoordinateSystem::Wgs84 => {
                LATITUDE_RANGE.contains(&self.first) && LONGITUDE_RANGE.contains(&self.second)
            }
        }
    }

    /// Check the pair against its system's domain.
    ///
    /// NaN never lies inside a range, so non-finite values fail here too.
    pub fn validate(&self) -> Result<(), GeoError> {
        if self.in_domain() {
            return Ok(());
        }
        let swapped = Self::new(self.system, self.second, self.first);
        let hint = if swapped.in_domain() {
            Some(match self.system {
                CoordinateSystem::Eov => "EOV Y and X look swapped",
                CoordinateSystem::Wgs84 => "latitude and longitude look swapped",
            })
        } else {
            None
        };
        Err(GeoError::Range {
            system: self.system,
            first: self.first,
            second: self.second,
            hint,
        })
    }

    /// Fail with [`GeoError::SystemMismatch`] unless tagged with `expected`.
    pub fn expect_system(&self, expected: CoordinateSystem) -> Result<(), GeoError> {
        if self.system == expected {
            Ok(())
        } else {
            Err(GeoError::SystemMismatch {
                expected,
                found: self.system,
            })
        }
    }

    /// Format both values with a fixed number of decimals.
    pub fn format(&self, decimals: usize) -> (String, String) {
        (
            format!("{:.*}", decimals, self.first),
            format!("{:.*}", decimals, self.second),
        )
    }
}

fn parse_component(field: &str, text: &str) -> Result<f64, GeoError> {
    let trimmed = text.trim();
    let issue = if trimmed.is_empty() {
        ParseIssue::Empty
    } else if trimmed.contains(',') {
        ParseIssue::DecimalComma
    } else {
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => return Ok(value),
            Ok(_) => ParseIssue::NotFinite,
            Err(_) => ParseIssue::NotANumber,
        }
    };
    Err(GeoError::Parse {
        field: field.to_string(),
        issue,
    })
}

/// Split a pasted `"lat, lon"` pair (the format map sites copy to the clipboard).
///
/// Returns `None` unless the text holds exactly two comma-separated parts.
pub fn split_pasted_pair(text: &str) -> Option<(String, String)> {
    let mut parts = text.split(',').map(str::trim);
    let first = parts.next()?;
    let second = parts.next()?;
    if parts.next().is_some() || first.is_empty() || second.is_empty() {
        return None;
    }
    Some((first.to_string(), second.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_issue(result: Result<CoordinatePair, GeoError>) -> (String, ParseIssue) {
        match result {
            Err(GeoError::Parse { field, issue }) => (field, issue),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn parse_accepts_trimmed_decimal_text() {
        let pair = CoordinatePair::parse(CoordinateSystem::Eov, " 650000.5 ", "240000").unwrap();
        assert_eq!(pair.values(), (650000.5, 240000.0));
        assert_eq!(pair.system(), CoordinateSystem::Eov);
    }

    #[test]
    fn parse_reports_field_and_issue() {
        let (field, issue) = parse_issue(CoordinatePair::parse(CoordinateSystem::Eov, "", "1"));
        assert_eq!(field, "EOV Y");
        assert_eq!(issue, ParseIssue::Empty);

        let (field, issue) =
            parse_issue(CoordinatePair::parse(CoordinateSystem::Eov, "650000", "240000,5"));
        assert_eq!(field, "EOV X");
        assert_eq!(issue, ParseIssue::DecimalComma);

        let (field, issue) =
            parse_issue(CoordinatePair::parse(CoordinateSystem::Wgs84, "abc", "19"));
        assert_eq!(field, "Latitude");
        assert_eq!(issue, ParseIssue::NotANumber);

        let (_, issue) = parse_issue(CoordinatePair::parse(CoordinateSystem::Wgs84, "47", "inf"));
        assert_eq!(issue, ParseIssue::NotFinite);
    }

    #[test]
    fn validate_checks_system_domain() {
        assert!(CoordinatePair::eov(650000.0, 240000.0).validate().is_ok());
        assert!(CoordinatePair::eov(100000.0, 50000.0).validate().is_err());
        assert!(CoordinatePair::wgs84(47.5, 19.0).validate().is_ok());
        assert!(CoordinatePair::wgs84(91.0, 19.0).validate().is_err());
        assert!(CoordinatePair::wgs84(f64::NAN, 19.0).validate().is_err());
    }

    #[test]
    fn validate_hints_swapped_eov_axes() {
        match CoordinatePair::eov(240000.0, 650000.0).validate() {
            Err(GeoError::Range { hint, .. }) => {
                assert_eq!(hint, Some("EOV Y and X look swapped"));
            }
            other => panic!("expected range error, got {:?}", other),
        }
    }

    #[test]
    fn expect_system_rejects_mismatch() {
        let pair = CoordinatePair::wgs84(47.5, 19.0);
        assert!(pair.expect_system(CoordinateSystem::Wgs84).is_ok());
        assert!(matches!(
            pair.expect_system(CoordinateSystem::Eov),
            Err(GeoError::SystemMismatch { .. })
        ));
    }

    #[test]
    fn split_pasted_pair_handles_map_clipboard_format() {
        assert_eq!(
            split_pasted_pair("47.50393208, 19.0474447"),
            Some(("47.50393208".into(), "19.0474447".into()))
        );
        assert_eq!(split_pasted_pair("47.5"), None);
        assert_eq!(split_pasted_pair("1,2,3"), None);
        assert_eq!(split_pasted_pair("47.5, "), None);
    }

    #[test]
    fn format_uses_fixed_decimals() {
        let pair = CoordinatePair::eov(650000.123, 240000.0);
        assert_eq!(pair.format(2), ("650000.12".to_string(), "240000.00".to_string()));
    }
}
