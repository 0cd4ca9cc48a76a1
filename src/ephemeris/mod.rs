extern crate nalgebra as na;

use serde::{Serialize, Deserialize};
use self::na::base::Vector3;

use crate::constants::{MU, OMEGA_E, F, SECONDS_IN_HALF_WEEK, SECONDS_IN_WEEK};
use crate::error::{InputError, PropagationError};
use crate::time::GnssTime;

mod store;
pub use self::store::{EphemerisStore, NavigationData, DEFAULT_MAX_AGE_S};

#[cfg(test)]
pub(crate) mod fixtures;


pub const KEPLER_TOLERANCE:f64 = 1.0e-12;	// [rad]
pub const KEPLER_MAX_ITER:usize = 30;

/// Broadcast orbit and clock parameters for one satellite over one validity interval.  Angles are in
/// radians and rates in radians per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EphemerisRecord {
	pub prn:u8,
	pub valid:bool,
	pub toc:GnssTime,
	pub toe:GnssTime,
	pub iodc:u16,
	pub iode:u8,
	pub deltan:f64,
	pub cuc:f64, pub cus:f64,
	pub cic:f64, pub cis:f64,
	pub crc:f64, pub crs:f64,
	pub ecc:f64,
	pub sqrta:f64,		// [sqrt(m)]
	pub m0:f64,
	pub omg0:f64,
	pub inc0:f64,
	pub aop:f64,
	pub omgdot:f64,
	pub idot:f64,
	pub af0:f64,		// [sec]
	pub af1:f64,		// [sec/sec]
	pub af2:f64,		// [sec/sec^2]
	pub tgd:f64,		// [sec]
	#[serde(default)]
	pub svhlth:u8,
	#[serde(default)]
	pub code_l2:u8,
}

impl EphemerisRecord {

	pub fn check(&self, index:usize) -> Result<(), InputError> {
		let fail = |reason:String| Err(InputError::Ephemeris{ index, prn: self.prn, reason });

		if self.prn == 0 || self.prn > 63 {
			return fail(format!("PRN {} outside 1-63", self.prn));
		}
		if !(0.0..1.0).contains(&self.ecc) {
			return fail(format!("eccentricity {} outside [0, 1)", self.ecc));
		}
		if !(self.sqrta > 0.0) {
			return fail(format!("sqrt(A) {} is not positive", self.sqrta));
		}
		if self.toe.week < 0 || self.toc.week < 0 {
			return fail("negative week number".to_string());
		}

		let values = [self.deltan, self.cuc, self.cus, self.cic, self.cis, self.crc, self.crs, self.m0, self.omg0,
			self.inc0, self.aop, self.omgdot, self.idot, self.af0, self.af1, self.af2, self.tgd, self.toe.sow, self.toc.sow];
		if values.iter().any(|v| !v.is_finite()) {
			return fail("non-finite parameter".to_string());
		}

		Ok(())
	}

}

/// Position, velocity and clock of a satellite at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatelliteState {
	pub position:Vector3<f64>,		// [m] ECEF
	pub velocity:Vector3<f64>,		// [m/s] ECEF
	pub clock_bias:f64,				// [sec]
	pub clock_drift:f64,			// [sec/sec]
}

/// An ephemeris record together with the working values every propagation needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ephemeris {
	record:EphemerisRecord,
	a:f64,			// [m] semi-major axis
	n:f64,			// [rad/s] corrected mean motion
	sq1e2:f64,		// sqrt(1 - e^2)
	omgkdot:f64,	// [rad/s] Omega dot minus the earth rotation rate
}

impl Ephemeris {

	pub fn new(record:EphemerisRecord) -> Self {
		let a = record.sqrta.powi(2);
		let n = (MU / a.powi(3)).sqrt() + record.deltan;
		let sq1e2 = (1.0 - record.ecc.powi(2)).sqrt();
		let omgkdot = record.omgdot - OMEGA_E;
		Self{ record, a, n, sq1e2, omgkdot }
	}

	pub fn record(&self) -> &EphemerisRecord { &self.record }
	pub fn prn(&self) -> u8 { self.record.prn }
	pub fn semi_major_axis(&self) -> f64 { self.a }
	pub fn mean_motion(&self) -> f64 { self.n }
	pub fn is_healthy(&self) -> bool { self.record.valid && self.record.svhlth == 0 }

	/// Eccentric anomaly for a mean anomaly, by Newton iteration
	pub fn eccentric_anomaly(&self, mk:f64) -> Result<f64, PropagationError> {
		let ecc = self.record.ecc;
		let mut ek = mk;
		for _ in 0..KEPLER_MAX_ITER {
			let step = (ek - ecc*ek.sin() - mk) / (1.0 - ecc*ek.cos());
			ek -= step;
			if step.abs() < KEPLER_TOLERANCE {
				return Ok(ek);
			}
		}
		Err(PropagationError::KeplerNonConvergence{ prn: self.record.prn, iterations: KEPLER_MAX_ITER })
	}

	/// Satellite state at GPS time t, following IS-GPS-200 Table 20-IV
	pub fn propagate(&self, t:&GnssTime) -> Result<SatelliteState, PropagationError> {
		let eph = &self.record;
		if !eph.valid {
			return Err(PropagationError::InvalidEphemeris{ prn: eph.prn });
		}

		let tk = wrap_half_week(t.seconds_since(&eph.toe));

		let mk = eph.m0 + self.n*tk;
		let ek = self.eccentric_anomaly(mk)?;
		let (sek, cek) = ek.sin_cos();

		let one_minus_ecos_e = 1.0 - eph.ecc*cek;
		let ekdot = self.n / one_minus_ecos_e;

		// Argument of latitude before corrections
		let pk = (self.sq1e2*sek).atan2(cek - eph.ecc) + eph.aop;
		let pkdot = self.sq1e2*ekdot / one_minus_ecos_e;

		let (s2pk, c2pk) = (2.0*pk).sin_cos();

		let uk = pk + eph.cus*s2pk + eph.cuc*c2pk;
		let (suk, cuk) = uk.sin_cos();
		let ukdot = pkdot*(1.0 + 2.0*(eph.cus*c2pk - eph.cuc*s2pk));

		let rk = self.a*one_minus_ecos_e + eph.crc*c2pk + eph.crs*s2pk;
		let rkdot = self.a*eph.ecc*sek*ekdot + 2.0*pkdot*(eph.crs*c2pk - eph.crc*s2pk);

		let ik = eph.inc0 + eph.idot*tk + eph.cic*c2pk + eph.cis*s2pk;
		let (sik, cik) = ik.sin_cos();
		let ikdot = eph.idot + 2.0*pkdot*(eph.cis*c2pk - eph.cic*s2pk);

		// Position in the orbital plane
		let xpk = rk*cuk;
		let ypk = rk*suk;
		let xpkdot = rkdot*cuk - ypk*ukdot;
		let ypkdot = rkdot*suk + xpk*ukdot;

		// Corrected longitude of the ascending node
		let ok = eph.omg0 + tk*self.omgkdot - OMEGA_E*eph.toe.sow;
		let (sok, cok) = ok.sin_cos();

		let position = Vector3::new(
			xpk*cok - ypk*cik*sok,
			xpk*sok + ypk*cik*cok,
			ypk*sik);

		let tmp = ypkdot*cik - ypk*sik*ikdot;
		let velocity = Vector3::new(
			-self.omgkdot*position[1] + xpkdot*cok - tmp*sok,
			 self.omgkdot*position[0] + xpkdot*sok + tmp*cok,
			 ypk*cik*ikdot + ypkdot*sik);

		// Clock polynomial is referenced to toc, not toe
		let dt = wrap_half_week(t.seconds_since(&eph.toc));
		let relativistic = F*eph.ecc*eph.sqrta*sek;
		let clock_bias = eph.af0 + dt*(eph.af1 + dt*eph.af2) + relativistic - eph.tgd;
		let clock_drift = eph.af1 + 2.0*dt*eph.af2;

		Ok(SatelliteState{ position, velocity, clock_bias, clock_drift })
	}

}

impl From<EphemerisRecord> for Ephemeris {
	fn from(record:EphemerisRecord) -> Self { Self::new(record) }
}

/// Wraps a time difference into [-302400, 302400] [sec]
pub fn wrap_half_week(dt:f64) -> f64 {
	if dt > SECONDS_IN_HALF_WEEK {
		dt - SECONDS_IN_WEEK
	} else if dt < -SECONDS_IN_HALF_WEEK {
		dt + SECONDS_IN_WEEK
	} else {
		dt
	}
}
