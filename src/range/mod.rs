extern crate nalgebra as na;

use self::na::base::Vector3;

use crate::constants::{C, OMEGA_E};
use crate::ephemeris::{Ephemeris, SatelliteState};
use crate::error::PropagationError;
use crate::geodesy::{self, Ellipsoid};
use crate::ionosphere::IonoUtcModel;
use crate::time::GnssTime;

#[cfg(test)]
mod tests;

/// Geometry and delays between one satellite and the receiver at one epoch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeObservation {
	pub time:GnssTime,
	pub pseudorange:f64,	// [m]
	pub range_rate:f64,		// [m/s]
	pub distance:f64,		// [m] geometric, after light-time and earth rotation corrections
	pub azimuth:f64,		// [rad]
	pub elevation:f64,		// [rad]
	pub iono_delay:f64,		// [m]
}

/// Shared, read-only inputs to every range computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeModel {
	pub iono:IonoUtcModel,
	pub ellipsoid:Ellipsoid,
	pub receiver_clock_bias:f64,	// [sec]
}

impl RangeModel {

	pub fn new(iono:IonoUtcModel) -> Self {
		Self{ iono, ellipsoid: Ellipsoid::WGS84, receiver_clock_bias: 0.0 }
	}

	pub fn compute_range(&self, sat:&SatelliteState, rx_pos:&Vector3<f64>, rx_vel:&Vector3<f64>, t:&GnssTime) -> RangeObservation {
		let tau:f64 = (sat.position - rx_pos).norm() / C;

		// Back to the transmit time, then rotate the earth-fixed frame by the rotation during flight
		let p = sat.position - sat.velocity*tau;
		let sat_pos = Vector3::new(p[0] + p[1]*OMEGA_E*tau, p[1] - p[0]*OMEGA_E*tau, p[2]);

		let los = sat_pos - rx_pos;
		let distance = los.norm();
		let range_rate = (sat.velocity - rx_vel).dot(&los) / distance;

		let rx_llh = self.ellipsoid.ecef_to_geodetic(rx_pos);
		let enu = geodesy::ecef_to_enu_rotation(rx_llh.latitude, rx_llh.longitude) * los;
		let (azimuth, elevation) = geodesy::enu_to_az_el(&enu);

		let iono_delay = self.iono.delay(&rx_llh, azimuth, elevation, t);
		let pseudorange = distance - C*sat.clock_bias + iono_delay - C*self.receiver_clock_bias;

		RangeObservation{ time: *t, pseudorange, range_rate, distance, azimuth, elevation, iono_delay }
	}

	/// Propagates the ephemeris to t and computes the range to the receiver
	pub fn observe(&self, eph:&Ephemeris, rx_pos:&Vector3<f64>, rx_vel:&Vector3<f64>, t:&GnssTime) -> Result<RangeObservation, PropagationError> {
		let sat = eph.propagate(t)?;
		Ok(self.compute_range(&sat, rx_pos, rx_vel, t))
	}

}

impl Default for RangeModel {
	fn default() -> Self { Self::new(IonoUtcModel::default()) }
}
