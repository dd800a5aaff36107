// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! EOV ↔ WGS'84 coordinate conversion.
//!
//! EOV (EPSG:23700) is a Swiss-style oblique Mercator projection of the
//! GRS67 ellipsoid (HD72 datum). Converting to WGS'84 runs the inverse
//! projection, then shifts the datum through geocentric coordinates.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::errors::GeoError;
use crate::logic::datum::{self, Ellipsoid, GRS67, HD72_TO_WGS84, WGS84};
use crate::models::coords::{CoordinatePair, CoordinateSystem};

const INVERSE_ITERATIONS: usize = 6;
const INVERSE_TOLERANCE: f64 = 1e-10;

/// Conversion between EOV and WGS'84 pairs.
///
/// Implementations are pure: the same input always gives the same output.
pub trait Projection {
    /// Convert an EOV pair to WGS'84 latitude/longitude.
    fn to_wgs84(&self, eov: &CoordinatePair) -> Result<CoordinatePair, GeoError>;
    /// Convert a WGS'84 pair to EOV easting/northing.
    fn to_eov(&self, wgs: &CoordinatePair) -> Result<CoordinatePair, GeoError>;
}

/// Parameters of a Swiss oblique Mercator grid.
#[derive(Clone, Copy, Debug)]
pub struct GridParams {
    pub ellipsoid: Ellipsoid,
    /// Latitude of the projection center, degrees.
    pub lat_0: f64,
    /// Longitude of the projection center, degrees.
    pub lon_0: f64,
    pub scale: f64,
    pub false_easting: f64,
    pub false_northing: f64,
}

/// EPSG:23700 grid definition.
pub const EOV_GRID: GridParams = GridParams {
    ellipsoid: GRS67,
    lat_0: 47.144_393_722_222_22,
    lon_0: 19.048_571_777_777_78,
    scale: 0.99993,
    false_easting: 650_000.0,
    false_northing: 200_000.0,
};

/// Swiss oblique Mercator (double projection through a Gauss sphere) with
/// its constants precomputed.
#[derive(Clone, Copy, Debug)]
pub struct ObliqueMercator {
    params: GridParams,
    e: f64,
    half_e: f64,
    lam_0: f64,
    c: f64,
    k: f64,
    k_r: f64,
    sin_p0: f64,
    cos_p0: f64,
}

impl ObliqueMercator {
    pub fn new(params: GridParams) -> Self {
        let es = params.ellipsoid.es;
        let e = params.ellipsoid.e();
        let half_e = 0.5 * e;
        let phi_0 = params.lat_0.to_radians();

        let cos2 = phi_0.cos().powi(2);
        let c = (1.0 + es * cos2 * cos2 / (1.0 - es)).sqrt();
        let sin_p0 = phi_0.sin() / c;
        let phi_p0 = sin_p0.asin();
        let cos_p0 = phi_p0.cos();
        let sp = e * phi_0.sin();
        let k = (FRAC_PI_4 + 0.5 * phi_p0).tan().ln()
            - c * ((FRAC_PI_4 + 0.5 * phi_0).tan().ln()
                - half_e * ((1.0 + sp) / (1.0 - sp)).ln());
        let k_r = params.scale * (1.0 - es).sqrt() / (1.0 - sp * sp);

        Self {
            params,
            e,
            half_e,
            lam_0: params.lon_0.to_radians(),
            c,
            k,
            k_r,
            sin_p0,
            cos_p0,
        }
    }

    /// Geodetic latitude/longitude (radians) to grid easting/northing.
    pub fn forward(&self, phi: f64, lam: f64) -> (f64, f64) {
        let lam = lam - self.lam_0;
        let sp = self.e * phi.sin();
        let phi_p = 2.0
            * (self.c
                * ((FRAC_PI_4 + 0.5 * phi).tan().ln()
                    - self.half_e * ((1.0 + sp) / (1.0 - sp)).ln())
                + self.k)
                .exp()
                .atan()
            - FRAC_PI_2;
        let lam_p = self.c * lam;
        let cp = phi_p.cos();
        let phi_pp = clamped_asin(self.cos_p0 * phi_p.sin() - self.sin_p0 * cp * lam_p.cos());
        let lam_pp = clamped_asin(cp * lam_p.sin() / phi_pp.cos());

        let a = self.params.ellipsoid.a;
        (
            a * self.k_r * lam_pp + self.params.false_easting,
            a * self.k_r * (FRAC_PI_4 + 0.5 * phi_pp).tan().ln() + self.params.false_northing,
        )
    }

    /// Grid easting/northing to geodetic latitude/longitude (radians).
    ///
    /// Returns `None` when the latitude iteration does not converge.
    pub fn inverse(&self, easting: f64, northing: f64) -> Option<(f64, f64)> {
        let a = self.params.ellipsoid.a;
        let x = (easting - self.params.false_easting) / a;
        let y = (northing - self.params.false_northing) / a;

        let phi_pp = 2.0 * ((y / self.k_r).exp().atan() - FRAC_PI_4);
        let lam_pp = x / self.k_r;
        let cp = phi_pp.cos();
        let mut phi_p = clamped_asin(self.cos_p0 * phi_pp.sin() + self.sin_p0 * cp * lam_pp.cos());
        let lam_p = clamped_asin(cp * lam_pp.sin() / phi_p.cos());
        let con = (self.k - (FRAC_PI_4 + 0.5 * phi_p).tan().ln()) / self.c;

        let rone_es = 1.0 / (1.0 - self.params.ellipsoid.es);
        for _ in 0..INVERSE_ITERATIONS {
            let esp = self.e * phi_p.sin();
            let delta = (con + (FRAC_PI_4 + 0.5 * phi_p).tan().ln()
                - self.half_e * ((1.0 + esp) / (1.0 - esp)).ln())
                * (1.0 - esp * esp)
                * phi_p.cos()
                * rone_es;
            phi_p -= delta;
            if delta.abs() < INVERSE_TOLERANCE {
                return Some((phi_p, lam_p / self.c + self.lam_0));
            }
        }
        None
    }
}

fn clamped_asin(v: f64) -> f64 {
    v.clamp(-1.0, 1.0).asin()
}

/// EOV grid on HD72 with the translation-only shift to WGS 84.
#[derive(Clone, Copy, Debug)]
pub struct EovProjection {
    grid: ObliqueMercator,
    local: Ellipsoid,
    to_wgs84: [f64; 3],
}

impl Default for EovProjection {
    fn default() -> Self {
        Self::new(EOV_GRID, HD72_TO_WGS84)
    }
}

impl EovProjection {
    pub fn new(grid: GridParams, to_wgs84: [f64; 3]) -> Self {
        Self {
            grid: ObliqueMercator::new(grid),
            local: grid.ellipsoid,
            to_wgs84,
        }
    }
}

impl Projection for EovProjection {
    fn to_wgs84(&self, eov: &CoordinatePair) -> Result<CoordinatePair, GeoError> {
        eov.expect_system(CoordinateSystem::Eov)?;
        eov.validate()?;

        let (phi, lam) = self
            .grid
            .inverse(eov.easting(), eov.northing())
            .ok_or_else(|| range_error(eov))?;
        let (phi, lam) = datum::shift_datum(phi, lam, &self.local, &WGS84, self.to_wgs84);
        let wgs = CoordinatePair::wgs84(phi.to_degrees(), lam.to_degrees());
        wgs.validate()?;

        tracing::debug!(
            easting = eov.easting(),
            northing = eov.northing(),
            latitude = wgs.latitude(),
            longitude = wgs.longitude(),
            "EOV -> WGS84"
        );
        Ok(wgs)
    }

    fn to_eov(&self, wgs: &CoordinatePair) -> Result<CoordinatePair, GeoError> {
        wgs.expect_system(CoordinateSystem::Wgs84)?;
        wgs.validate()?;

        let (phi, lam) = datum::shift_datum(
            wgs.latitude().to_radians(),
            wgs.longitude().to_radians(),
            &WGS84,
            &self.local,
            datum::inverse(self.to_wgs84),
        );
        let (easting, northing) = self.grid.forward(phi, lam);
        let eov = CoordinatePair::eov(easting, northing);
        eov.validate()?;

        tracing::debug!(
            latitude = wgs.latitude(),
            longitude = wgs.longitude(),
            easting,
            northing,
            "WGS84 -> EOV"
        );
        Ok(eov)
    }
}

fn range_error(pair: &CoordinatePair) -> GeoError {
    let (first, second) = pair.values();
    GeoError::Range {
        system: pair.system(),
        first,
        second,
        hint: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} ± {tolerance}, got {actual}"
        );
    }

    #[test]
    fn grid_origin_maps_near_projection_center() {
        let wgs = EovProjection::default()
            .to_wgs84(&CoordinatePair::eov(650000.0, 200000.0))
            .unwrap();

        assert_close(wgs.latitude(), 47.144125, 1e-5);
        assert_close(wgs.longitude(), 19.047452, 1e-5);
    }

    #[test]
    fn reference_point_matches_published_pair() {
        let projection = EovProjection::default();

        let eov = projection
            .to_eov(&CoordinatePair::wgs84(47.50393208, 19.0474447))
            .unwrap();
        assert_close(eov.easting(), 650000.0, 0.01);
        assert_close(eov.northing(), 240000.0, 0.01);

        let wgs = projection
            .to_wgs84(&CoordinatePair::eov(650000.0, 240000.0))
            .unwrap();
        assert_close(wgs.latitude(), 47.503932, 1e-6);
        assert_close(wgs.longitude(), 19.047445, 1e-6);
    }

    #[test]
    fn budapest_sample_lands_in_budapest() {
        let wgs = EovProjection::default()
            .to_wgs84(&CoordinatePair::eov(650000.0, 237000.0))
            .unwrap();

        assert_close(wgs.latitude(), 47.476948, 1e-5);
        assert_close(wgs.longitude(), 19.047445, 1e-5);
    }

    #[test]
    fn eov_round_trip_across_grid() {
        let projection = EovProjection::default();
        for easting in [420_000.0, 500_000.0, 650_000.0, 780_000.0, 930_000.0] {
            for northing in [50_000.0, 120_000.0, 200_000.0, 290_000.0, 360_000.0] {
                let eov = CoordinatePair::eov(easting, northing);
                let back = projection
                    .to_eov(&projection.to_wgs84(&eov).unwrap())
                    .unwrap();
                assert_close(back.easting(), easting, 1e-3);
                assert_close(back.northing(), northing, 1e-3);
            }
        }
    }

    #[test]
    fn wgs_round_trip_within_micro_degrees() {
        let projection = EovProjection::default();
        let wgs = CoordinatePair::wgs84(46.2530, 20.1414);
        let back = projection
            .to_wgs84(&projection.to_eov(&wgs).unwrap())
            .unwrap();

        assert_close(back.latitude(), wgs.latitude(), 1e-6);
        assert_close(back.longitude(), wgs.longitude(), 1e-6);
    }

    #[test]
    fn out_of_grid_eov_is_a_range_error() {
        let result = EovProjection::default().to_wgs84(&CoordinatePair::eov(100000.0, 50000.0));
        assert!(matches!(result, Err(GeoError::Range { .. })));
    }

    #[test]
    fn far_away_wgs_is_a_range_error() {
        // Paris projects far outside the Hungarian grid.
        let result = EovProjection::default().to_eov(&CoordinatePair::wgs84(48.8566, 2.3522));
        match result {
            Err(GeoError::Range { system, .. }) => assert_eq!(system, CoordinateSystem::Eov),
            other => panic!("expected range error, got {:?}", other),
        }
    }

    #[test]
    fn wrong_system_tag_is_rejected() {
        let projection = EovProjection::default();
        assert!(matches!(
            projection.to_wgs84(&CoordinatePair::wgs84(47.5, 19.0)),
            Err(GeoError::SystemMismatch { .. })
        ));
        assert!(matches!(
            projection.to_eov(&CoordinatePair::eov(650000.0, 240000.0)),
            Err(GeoError::SystemMismatch { .. })
        ));
    }
}
