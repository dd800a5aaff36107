// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Reference ellipsoids and the geocentric datum shift between them.

/// Reference ellipsoid given by semi-major axis and inverse flattening.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis in meters.
    pub a: f64,
    /// First eccentricity squared.
    pub es: f64,
}

/// Geodetic Reference System 1967, used by the HD72 datum behind EOV.
pub const GRS67: Ellipsoid = Ellipsoid::from_inverse_flattening(6_378_160.0, 298.247_167_427);
/// WGS 84 ellipsoid.
pub const WGS84: Ellipsoid = Ellipsoid::from_inverse_flattening(6_378_137.0, 298.257_223_563);

/// HD72 → WGS 84 geocentric translation in meters.
pub const HD72_TO_WGS84: [f64; 3] = [52.17, -71.82, -14.9];

const GEOCENTRIC_ITERATIONS: usize = 10;

impl Ellipsoid {
    pub const fn from_inverse_flattening(a: f64, rf: f64) -> Self {
        let f = 1.0 / rf;
        Self {
            a,
            es: 2.0 * f - f * f,
        }
    }

    /// First eccentricity.
    pub fn e(&self) -> f64 {
        self.es.sqrt()
    }

    /// Prime vertical radius of curvature at latitude `phi` (radians).
    fn prime_vertical(&self, phi: f64) -> f64 {
        let s = phi.sin();
        self.a / (1.0 - self.es * s * s).sqrt()
    }

    /// Geodetic (radians, meters) to geocentric cartesian coordinates.
    pub fn to_geocentric(&self, phi: f64, lam: f64, h: f64) -> [f64; 3] {
        let n = self.prime_vertical(phi);
        [
            (n + h) * phi.cos() * lam.cos(),
            (n + h) * phi.cos() * lam.sin(),
            (n * (1.0 - self.es) + h) * phi.sin(),
        ]
    }

    /// Geocentric cartesian coordinates back to geodetic `(phi, lam, h)`.
    pub fn from_geocentric(&self, xyz: [f64; 3]) -> (f64, f64, f64) {
        let [x, y, z] = xyz;
        let p = x.hypot(y);
        let lam = y.atan2(x);
        let mut phi = z.atan2(p * (1.0 - self.es));
        let mut h = 0.0;
        for _ in 0..GEOCENTRIC_ITERATIONS {
            let n = self.prime_vertical(phi);
            h = p / phi.cos() - n;
            phi = z.atan2(p * (1.0 - self.es * n / (n + h)));
        }
        (phi, lam, h)
    }
}

/// Move a geodetic position from one datum to another through a geocentric
/// translation. Heights are dropped: input is taken on the ellipsoid surface.
pub fn shift_datum(
    phi: f64,
    lam: f64,
    from: &Ellipsoid,
    to: &Ellipsoid,
    translation: [f64; 3],
) -> (f64, f64) {
    let [x, y, z] = from.to_geocentric(phi, lam, 0.0);
    let (phi, lam, _) = to.from_geocentric([
        x + translation[0],
        y + translation[1],
        z + translation[2],
    ]);
    (phi, lam)
}

/// Negated translation for the reverse shift.
pub fn inverse(translation: [f64; 3]) -> [f64; 3] {
    [-translation[0], -translation[1], -translation[2]]
}
