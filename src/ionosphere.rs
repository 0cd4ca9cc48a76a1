use std::f64::consts;

use serde::{Serialize, Deserialize};

use crate::constants::{C, SECONDS_IN_DAY};
use crate::error::InputError;
use crate::geodesy::Geodetic;
use crate::time::GnssTime;

const NIGHT_DELAY_S:f64 = 5.0e-9;

/// Broadcast Klobuchar coefficients plus the UTC parameters that travel with them in subframe 4
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IonoUtcModel {
	pub enable:bool,
	/// Set when the coefficients below were actually broadcast
	pub valid:bool,
	pub alpha0:f64, pub alpha1:f64, pub alpha2:f64, pub alpha3:f64,
	pub beta0:f64,  pub beta1:f64,  pub beta2:f64,  pub beta3:f64,
	pub a0:f64,		// [sec]
	pub a1:f64,		// [sec/sec]
	pub tot:i32,	// [sec] reference time of the UTC parameters
	pub wnt:i32,	// [week]
	pub dtls:i32,	// [sec] current leap seconds
	pub dtlsf:i32,	// [sec] leap seconds after the pending event
	pub dn:i32,		// [day of week, 1-7] end of which the pending event takes effect
	pub wnlsf:i32,	// [week]
	pub leap_event_enabled:bool,
}

impl Default for IonoUtcModel {
	fn default() -> Self {
		Self {
			enable: true, valid: false,
			alpha0: 0.0, alpha1: 0.0, alpha2: 0.0, alpha3: 0.0,
			beta0: 0.0,  beta1: 0.0,  beta2: 0.0,  beta3: 0.0,
			a0: 0.0, a1: 0.0, tot: 0, wnt: 0,
			dtls: 18, dtlsf: 18, dn: 7, wnlsf: 0,
			leap_event_enabled: false,
		}
	}
}

impl IonoUtcModel {

	pub fn validate(&self) -> Result<(), InputError> {
		let coefficients = [self.alpha0, self.alpha1, self.alpha2, self.alpha3, self.beta0, self.beta1, self.beta2, self.beta3, self.a0, self.a1];
		if coefficients.iter().any(|c| !c.is_finite()) {
			return Err(InputError::IonoUtc("non-finite coefficient".to_string()));
		}
		if self.tot < 0 || self.tot >= 604800 {
			return Err(InputError::IonoUtc(format!("tot {} outside the week", self.tot)));
		}
		if self.leap_event_enabled && (self.dn < 1 || self.dn > 7) {
			return Err(InputError::IonoUtc(format!("leap second day number {} outside 1-7", self.dn)));
		}
		Ok(())
	}

	/// Klobuchar slant delay [m] for a receiver at `rx` looking at azimuth `az` and elevation `el` [rad]
	pub fn delay(&self, rx:&Geodetic, az:f64, el:f64, t:&GnssTime) -> f64 {
		if !self.enable {
			return 0.0;
		}

		// Algorithm from IS-GPS-200, Figure 20-4; angles in semicircles unless they are trig arguments
		let el_sc:f64 = el / consts::PI;
		let f_obl:f64 = 1.0 + 16.0*(0.53 - el_sc).powi(3);

		if !self.valid {
			return f_obl * NIGHT_DELAY_S * C;
		}

		let phi_u:f64 = rx.latitude  / consts::PI;
		let lam_u:f64 = rx.longitude / consts::PI;

		let psi:f64 = (0.0137/(el_sc + 0.11)) - 0.022;							// [semicircles]
		let phi_i:f64 = (phi_u + psi*az.cos()).max(-0.416).min(0.416);			// [semicircles]
		let lam_i:f64 = lam_u + (psi*az.sin()) / (phi_i*consts::PI).cos();		// [semicircles]
		let phi_m:f64 = phi_i + 0.064*((lam_i - 1.617)*consts::PI).cos();		// [semicircles]

		let amp:f64 = (self.alpha0 + self.alpha1*phi_m + self.alpha2*phi_m.powi(2) + self.alpha3*phi_m.powi(3)).max(0.0);
		let per:f64 = (self.beta0 + self.beta1*phi_m + self.beta2*phi_m.powi(2) + self.beta3*phi_m.powi(3)).max(72000.0);

		// Local time of the pierce point wrapped into one day [sec]
		let t_lcl:f64 = (4.32e4*lam_i + t.sow).rem_euclid(SECONDS_IN_DAY);

		let x:f64 = 2.0*consts::PI*(t_lcl - 50400.0) / per;		// [rad]
		if x.abs() < 1.57 {
			f_obl * (NIGHT_DELAY_S + amp*(1.0 - x.powi(2)/2.0 + x.powi(4)/24.0)) * C
		} else {
			f_obl * NIGHT_DELAY_S * C
		}
	}

	/// Leap seconds in force at t, including a pending event once it has taken effect
	pub fn leap_seconds(&self, t:&GnssTime) -> i32 {
		if self.leap_event_enabled && t.seconds_since(&self.leap_event_time()) >= 0.0 {
			self.dtlsf
		} else {
			self.dtls
		}
	}

	/// GPS minus UTC [sec]
	pub fn utc_offset(&self, t:&GnssTime) -> f64 {
		let t_ref = GnssTime::new(self.wnt, self.tot as f64);
		(self.leap_seconds(t) as f64) + self.a0 + self.a1*t.seconds_since(&t_ref)
	}

	fn leap_event_time(&self) -> GnssTime { GnssTime::new(self.wnlsf, (self.dn as f64)*SECONDS_IN_DAY) }

}
