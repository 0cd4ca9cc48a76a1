use std::collections::BTreeMap;
use std::io::Read;

use log::debug;
use serde::{Serialize, Deserialize};

use crate::error::{InputError, PropagationError};
use crate::ionosphere::IonoUtcModel;
use crate::time::GnssTime;

use super::{Ephemeris, EphemerisRecord};

pub const DEFAULT_MAX_AGE_S:f64 = 7200.0;

/// Everything a broadcast navigation file provides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationData {
	#[serde(default)]
	pub iono_utc:IonoUtcModel,
	pub ephemerides:Vec<EphemerisRecord>,
}

impl NavigationData {

	pub fn from_reader<R:Read>(reader:R) -> Result<Self, InputError> {
		let nav:NavigationData = serde_json::from_reader(reader)?;
		nav.validate()?;
		Ok(nav)
	}

	pub fn from_json(s:&str) -> Result<Self, InputError> {
		let nav:NavigationData = serde_json::from_str(s)?;
		nav.validate()?;
		Ok(nav)
	}

	pub fn validate(&self) -> Result<(), InputError> {
		self.iono_utc.validate()?;
		if self.ephemerides.is_empty() {
			return Err(InputError::NoEphemerides);
		}
		for (idx, eph) in self.ephemerides.iter().enumerate() {
			eph.check(idx)?;
		}
		Ok(())
	}

	pub fn store(&self, max_age:f64) -> EphemerisStore {
		EphemerisStore::new(self.ephemerides.iter().cloned(), max_age)
	}

}

/// Ephemerides for every satellite, each satellite's sets ordered by time of ephemeris
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisStore {
	sets:BTreeMap<u8, Vec<Ephemeris>>,
	max_age:f64,
}

impl EphemerisStore {

	pub fn new<I:IntoIterator<Item=EphemerisRecord>>(records:I, max_age:f64) -> Self {
		let mut sets:BTreeMap<u8, Vec<Ephemeris>> = BTreeMap::new();
		for rec in records {
			sets.entry(rec.prn).or_insert_with(Vec::new).push(Ephemeris::new(rec));
		}

		for (prn, v) in sets.iter_mut() {
			v.sort_by(|a, b| a.record().toe.partial_cmp(&b.record().toe).unwrap_or(std::cmp::Ordering::Equal));
			debug!("PRN {:02}: {} ephemeris sets", prn, v.len());
		}

		Self{ sets, max_age }
	}

	pub fn max_age(&self) -> f64 { self.max_age }

	/// Satellites with at least one set, ascending
	pub fn prns(&self) -> impl Iterator<Item=u8> + '_ { self.sets.keys().cloned() }

	pub fn len(&self) -> usize { self.sets.len() }
	pub fn is_empty(&self) -> bool { self.sets.is_empty() }

	/// Set whose time of ephemeris is closest to t, provided it is within the maximum age
	pub fn select(&self, prn:u8, t:&GnssTime) -> Result<&Ephemeris, PropagationError> {
		let candidates = self.sets.get(&prn).ok_or(PropagationError::NoEphemeris{ prn })?;

		let mut best:Option<(&Ephemeris, f64)> = None;
		for eph in candidates.iter() {
			let age = t.seconds_since(&eph.record().toe).abs();
			match best {
				Some((_, best_age)) if best_age <= age => {},
				_ => best = Some((eph, age)),
			}
		}

		match best {
			Some((eph, age)) if age <= self.max_age => Ok(eph),
			Some((_, age)) => Err(PropagationError::StaleEphemeris{ prn, age_s: age }),
			None => Err(PropagationError::NoEphemeris{ prn }),
		}
	}

	/// Earliest time of clock over all sets, the natural start of a run when none is given
	pub fn earliest_toc(&self) -> Option<GnssTime> {
		self.sets.values().flat_map(|v| v.iter())
			.map(|eph| eph.record().toc)
			.fold(None, |acc:Option<GnssTime>, t| match acc {
				Some(a) if a.seconds_since(&t) <= 0.0 => Some(a),
				_ => Some(t),
			})
	}

	/// True when some satellite has a set close enough to t to be selected
	pub fn covers(&self, t:&GnssTime) -> bool {
		self.sets.values().flat_map(|v| v.iter())
			.any(|eph| t.seconds_since(&eph.record().toe).abs() <= self.max_age)
	}

}
