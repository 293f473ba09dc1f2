//! WGS-84 to state-plane Lambert Conformal Conic projection.
//!
//! Zoning layers are stored in a state-plane system; parcels are geocoded
//! in latitude/longitude. Query points are projected into the layer's plane
//! before containment testing. Polygon vertices are never re-projected.

use std::f64::consts::FRAC_PI_4;

use acquisitions_geography_models::{GeoPoint, LambertParams, PlanarPoint};

/// A two-parallel Lambert Conformal Conic projection with its derived
/// constants precomputed.
#[derive(Debug, Clone, Copy)]
pub struct LambertConformalConic {
    params: LambertParams,
    eccentricity: f64,
    /// Cone constant.
    n: f64,
    /// Scale factor, in output units.
    f: f64,
    /// Radius of the origin parallel, in output units.
    rho0: f64,
}

impl LambertConformalConic {
    /// Derives the cone constant, scale factor and origin radius from the
    /// defining parallels.
    #[must_use]
    pub fn new(params: LambertParams) -> Self {
        let e2 = params.eccentricity_squared;
        let eccentricity = e2.sqrt();

        let phi0 = params.origin_latitude.to_radians();
        let phi1 = params.standard_parallel_1.to_radians();
        let phi2 = params.standard_parallel_2.to_radians();

        let m1 = meridian_factor(phi1, e2);
        let m2 = meridian_factor(phi2, e2);
        let t0 = isometric_t(phi0, eccentricity);
        let t1 = isometric_t(phi1, eccentricity);
        let t2 = isometric_t(phi2, eccentricity);

        // Tangent cone when both parallels coincide.
        let n = if (phi1 - phi2).abs() < f64::EPSILON {
            phi1.sin()
        } else {
            (m1 / m2).ln() / (t1 / t2).ln()
        };

        let a = params.semi_major_axis_m * params.units_per_meter;
        let f = a * m1 / (n * t1.powf(n));
        let rho0 = f * t0.powf(n);

        log::debug!("Lambert projection: n={n}, F={f}, rho0={rho0}");

        Self {
            params,
            eccentricity,
            n,
            f,
            rho0,
        }
    }

    /// NAD83 / Texas North Central, the system the Fort Worth zoning layers
    /// are published in.
    #[must_use]
    pub fn texas_north_central() -> Self {
        Self::new(LambertParams::TEXAS_NORTH_CENTRAL)
    }

    /// The defining parameters.
    #[must_use]
    pub const fn params(&self) -> &LambertParams {
        &self.params
    }

    /// Cone constant `n`.
    #[must_use]
    pub const fn cone_constant(&self) -> f64 {
        self.n
    }

    /// Scale factor `F`, in output units.
    #[must_use]
    pub const fn scale_factor(&self) -> f64 {
        self.f
    }

    /// Radius of the origin parallel `rho0`, in output units.
    #[must_use]
    pub const fn origin_radius(&self) -> f64 {
        self.rho0
    }

    /// Projects a WGS-84 point into the plane.
    ///
    /// Latitudes at or beyond the poles, and non-finite input, cannot be
    /// represented and yield [`PlanarPoint::nan`].
    #[must_use]
    pub fn project(&self, point: GeoPoint) -> PlanarPoint {
        if !point.lat.is_finite() || !point.lon.is_finite() || point.lat.abs() >= 90.0 {
            return PlanarPoint::nan();
        }

        let phi = point.lat.to_radians();
        let lambda = point.lon.to_radians();
        let lambda0 = self.params.central_meridian.to_radians();

        let t = isometric_t(phi, self.eccentricity);
        let rho = self.f * t.powf(self.n);
        let theta = self.n * (lambda - lambda0);

        PlanarPoint {
            easting: rho.mul_add(theta.sin(), self.params.false_easting),
            northing: rho.mul_add(-theta.cos(), self.rho0) + self.params.false_northing,
        }
    }
}

/// `m = cos φ / sqrt(1 - e² sin² φ)`
fn meridian_factor(phi: f64, e2: f64) -> f64 {
    let sin = phi.sin();
    phi.cos() / (e2 * sin).mul_add(-sin, 1.0).sqrt()
}

/// `t = tan(π/4 - φ/2) / ((1 - e sin φ) / (1 + e sin φ))^(e/2)`
fn isometric_t(phi: f64, eccentricity: f64) -> f64 {
    let e_sin = eccentricity * phi.sin();
    (FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - e_sin) / (1.0 + e_sin)).powf(eccentricity / 2.0)
}
