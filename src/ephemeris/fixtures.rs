use std::f64::consts;

use crate::ionosphere::IonoUtcModel;
use crate::time::GnssTime;

use super::{EphemerisRecord, EphemerisStore, NavigationData, DEFAULT_MAX_AGE_S};

pub const TOE:GnssTime = GnssTime{ week: 2094, sow: 302400.0 };

pub fn record(prn:u8) -> EphemerisRecord {
	EphemerisRecord {
		prn, valid: true,
		toc: TOE, toe: TOE,
		iodc: 91, iode: 91,
		deltan: 4.5e-9,
		cuc: -1.2e-6, cus: 8.1e-6,
		cic: 1.1e-7,  cis: -5.2e-8,
		crc: 220.5,   crs: -23.1,
		ecc: 0.0065,
		sqrta: 5153.65,
		m0: 0.42,
		omg0: -1.93,
		inc0: 0.957,
		aop: 0.71,
		omgdot: -8.1e-9,
		idot: 2.3e-10,
		af0: 1.9e-4, af1: 3.4e-12, af2: 0.0,
		tgd: 5.1e-9,
		svhlth: 0, code_l2: 1,
	}
}

/// A record with every harmonic correction zeroed
pub fn keplerian(prn:u8) -> EphemerisRecord {
	EphemerisRecord{ cuc: 0.0, cus: 0.0, cic: 0.0, cis: 0.0, crc: 0.0, crs: 0.0, ..record(prn) }
}

/// 24 satellites in six evenly spaced planes of four, enough for several to be visible anywhere
pub fn constellation() -> Vec<EphemerisRecord> {
	let mut ret = vec![];
	for plane in 0..6 {
		for slot in 0..4 {
			let prn = (plane*4 + slot + 1) as u8;
			let omg0 = (plane as f64)*consts::PI/3.0 - consts::PI;
			let m0 = ((slot as f64)*consts::FRAC_PI_2 + (plane as f64)*0.26).rem_euclid(2.0*consts::PI) - consts::PI;
			ret.push(EphemerisRecord{ omg0, m0, ..record(prn) });
		}
	}
	ret
}

pub fn broadcast_iono() -> IonoUtcModel {
	IonoUtcModel {
		valid: true,
		alpha0: 0.1118e-07, alpha1: -0.7451e-08, alpha2: -0.5961e-07, alpha3: 0.1192e-06,
		beta0: 0.1167e+06,  beta1: -0.2294e+06,  beta2: -0.1311e+06,  beta3: 0.1049e+07,
		a0: 1.86e-9, a1: 8.9e-15, tot: 405504, wnt: 2094,
		..IonoUtcModel::default()
	}
}

pub fn navigation_data() -> NavigationData {
	NavigationData{ iono_utc: broadcast_iono(), ephemerides: constellation() }
}

pub fn store() -> EphemerisStore { EphemerisStore::new(constellation(), DEFAULT_MAX_AGE_S) }
