extern crate nalgebra as na;

use std::f64::consts;

use self::na::base::{Matrix3, Vector3};
use serde::{Serialize, Deserialize};

use crate::constants::{WGS84_SEMI_MAJOR_AXIS_METERS, WGS84_FLATTENING};

#[cfg(test)]
mod tests;

const ECEF_TO_GEODETIC_TOLERANCE:f64 = 1.0e-9;	// [m]
const ECEF_TO_GEODETIC_MAX_ITER:usize = 20;

/// Reference ellipsoid.  Passed by value into every conversion so nothing depends on a global.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
	pub a:f64,	// [m] semi-major axis
	pub f:f64,	// [] flattening
}

impl Ellipsoid {

	pub const WGS84:Ellipsoid = Ellipsoid{ a: WGS84_SEMI_MAJOR_AXIS_METERS, f: WGS84_FLATTENING };

	pub fn b(&self) -> f64 { self.a * (1.0 - self.f) }

	/// First eccentricity squared
	pub fn e_sq(&self) -> f64 { self.f * (2.0 - self.f) }

	/// Prime-vertical radius of curvature at geodetic latitude phi [m]
	pub fn prime_vertical_radius(&self, phi:f64) -> f64 {
		self.a / (1.0 - self.e_sq()*phi.sin().powi(2)).sqrt()
	}

	pub fn geodetic_to_ecef(&self, pos:&Geodetic) -> Vector3<f64> {
		let n = self.prime_vertical_radius(pos.latitude);
		let (sin_phi, cos_phi) = pos.latitude.sin_cos();
		let (sin_lam, cos_lam) = pos.longitude.sin_cos();

		Vector3::new(
			(n + pos.height)*cos_phi*cos_lam,
			(n + pos.height)*cos_phi*sin_lam,
			(n*(1.0 - self.e_sq()) + pos.height)*sin_phi)
	}

	/// Iterates on the latitude and height until the height settles below a nanometer
	pub fn ecef_to_geodetic(&self, xyz:&Vector3<f64>) -> Geodetic {
		let e_sq = self.e_sq();
		let (x, y, z) = (xyz[0], xyz[1], xyz[2]);

		if xyz.norm() < 1.0e-3 {
			// Degenerate point at the center of the earth
			return Geodetic{ latitude: 0.0, longitude: 0.0, height: -self.a };
		}

		let rho_sq:f64 = x*x + y*y;
		let mut dz:f64 = e_sq*z;
		let mut n:f64 = self.a;

		for _ in 0..ECEF_TO_GEODETIC_MAX_ITER {
			let zdz = z + dz;
			let nh = (rho_sq + zdz*zdz).sqrt();
			let sin_phi = zdz / nh;
			n = self.prime_vertical_radius(sin_phi.asin());
			let dz_new = n*e_sq*sin_phi;

			if (dz - dz_new).abs() < ECEF_TO_GEODETIC_TOLERANCE {
				dz = dz_new;
				break;
			}
			dz = dz_new;
		}

		let zdz = z + dz;
		let latitude = zdz.atan2(rho_sq.sqrt());
		let longitude = y.atan2(x);
		let height = (rho_sq + zdz*zdz).sqrt() - n;

		Geodetic{ latitude, longitude, height }
	}

}

impl Default for Ellipsoid {
	fn default() -> Self { Self::WGS84 }
}

/// Geodetic coordinates; latitude and longitude in radians, height above the ellipsoid in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geodetic {
	pub latitude:f64,
	pub longitude:f64,
	pub height:f64,
}

impl Geodetic {

	pub fn from_degrees(lat_deg:f64, lon_deg:f64, height:f64) -> Self {
		Self{ latitude: lat_deg.to_radians(), longitude: lon_deg.to_radians(), height }
	}

	pub fn latitude_deg(&self) -> f64 { self.latitude.to_degrees() }
	pub fn longitude_deg(&self) -> f64 { self.longitude.to_degrees() }

}

pub fn geodetic_to_ecef(pos:&Geodetic) -> Vector3<f64> { Ellipsoid::WGS84.geodetic_to_ecef(pos) }

pub fn ecef_to_geodetic(xyz:&Vector3<f64>) -> Geodetic { Ellipsoid::WGS84.ecef_to_geodetic(xyz) }

/// Rotation taking ECEF vectors into the local East-North-Up frame at (lat, lon)
pub fn ecef_to_enu_rotation(lat:f64, lon:f64) -> Matrix3<f64> {
	let (sin_phi, cos_phi) = lat.sin_cos();
	let (sin_lam, cos_lam) = lon.sin_cos();

	Matrix3::new(-sin_lam,          cos_lam,         0.0,
	             -sin_phi*cos_lam, -sin_phi*sin_lam, cos_phi,
	              cos_phi*cos_lam,  cos_phi*sin_lam, sin_phi)
}

/// Azimuth in [0, 2pi) measured clockwise from north and elevation in [-pi/2, pi/2], both [rad]
pub fn enu_to_az_el(enu:&Vector3<f64>) -> (f64, f64) {
	let r_horizontal:f64 = (enu[0].powi(2) + enu[1].powi(2)).sqrt();

	let mut az:f64 = enu[0].atan2(enu[1]);
	if az < 0.0 {
		az += 2.0*consts::PI;
	}
	let el:f64 = enu[2].atan2(r_horizontal);

	(az, el)
}
