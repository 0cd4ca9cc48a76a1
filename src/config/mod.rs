//! Run configuration.  A `SimConfig` is read from JSON (or built by the binaries from the command
//! line) and validated as a whole before any input is touched.

use std::convert::TryFrom;
use std::path::PathBuf;

use regex::Regex;
use serde::{Serialize, Deserialize};

use crate::constants::{L1_CARRIER_HZ, MAX_CHANNELS, STATIC_MAX_DURATION_S, SignalParameters};
use crate::ephemeris::{EphemerisStore, DEFAULT_MAX_AGE_S};
use crate::error::{ConfigError, InputError};
use crate::geodesy::Geodetic;
use crate::io::SampleFormat;
use crate::synth::{CarrierMode, SignalPlan, SynthSettings};
use crate::time::{CalendarTime, GnssTime};
use crate::trajectory::{Trajectory, DEFAULT_INTERVAL_S};


pub const DEFAULT_SAMPLE_RATE_HZ:f64 = 2.6e6;
pub const DEFAULT_DURATION_S:f64 = 300.0;
pub const MIN_SAMPLE_RATE_HZ:f64 = 1.0e6;

/// Largest Doppler shift the center frequency check leaves room for
pub const MAX_DOPPLER_HZ:f64 = 10.0e3;

// Relative tolerance for "is a whole number" checks on products of decimal values
const INTEGER_TOLERANCE:f64 = 1.0e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
	pub duration_s:f64,
	pub sample_rate_hz:f64,
	pub bit_depth:u8,
	pub center_frequency_hz:f64,
	/// GPS time as YYYY/MM/DD,hh:mm:ss; the earliest time of clock in the navigation data when absent
	pub start_time:Option<String>,
	pub elevation_mask_deg:f64,
	pub max_channels:usize,
	pub epoch_interval_s:f64,
	/// Latitude [deg], longitude [deg] and height [m] of a static receiver
	pub static_location:Option<[f64; 3]>,
	pub output:PathBuf,
	pub path_loss:bool,
	pub ionosphere:bool,
	pub carrier_mode:CarrierMode,
	pub threads:usize,
	pub receiver_clock_bias_s:f64,
	pub max_ephemeris_age_s:f64,
}

impl Default for SimConfig {
	fn default() -> Self {
		Self {
			duration_s: DEFAULT_DURATION_S,
			sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
			bit_depth: 16,
			center_frequency_hz: L1_CARRIER_HZ,
			start_time: None,
			elevation_mask_deg: 0.0,
			max_channels: MAX_CHANNELS,
			epoch_interval_s: DEFAULT_INTERVAL_S,
			static_location: None,
			output: PathBuf::from("gpssim.bin"),
			path_loss: true,
			ionosphere: true,
			carrier_mode: CarrierMode::Quantized,
			threads: 0,
			receiver_clock_bias_s: 0.0,
			max_ephemeris_age_s: DEFAULT_MAX_AGE_S,
		}
	}
}

fn is_whole(x:f64) -> bool { (x - x.round()).abs() <= INTEGER_TOLERANCE * x.abs().max(1.0) }

impl SimConfig {

	pub fn from_json(s:&str) -> Result<Self, InputError> {
		Ok(serde_json::from_str(s)?)
	}

	/// Checks the settings that do not depend on the inputs
	pub fn validate(&self) -> Result<(), ConfigError> {
		SampleFormat::try_from(self.bit_depth)?;

		if !(self.duration_s > 0.0) {
			return Err(ConfigError::NonPositiveDuration(self.duration_s));
		}
		if !(self.sample_rate_hz > 0.0) {
			return Err(ConfigError::NonPositiveSampleRate(self.sample_rate_hz));
		}
		if self.sample_rate_hz < MIN_SAMPLE_RATE_HZ {
			return Err(ConfigError::SampleRateTooLow(self.sample_rate_hz));
		}
		if !(self.epoch_interval_s > 0.0) {
			return Err(ConfigError::NonPositiveEpochInterval(self.epoch_interval_s));
		}
		if !is_whole(self.sample_rate_hz * self.epoch_interval_s) {
			return Err(ConfigError::FractionalEpoch{ sample_rate: self.sample_rate_hz, interval: self.epoch_interval_s });
		}
		if !is_whole(self.duration_s / self.epoch_interval_s) {
			return Err(ConfigError::FractionalDuration{ duration: self.duration_s, interval: self.epoch_interval_s });
		}
		if self.is_static() && self.duration_s > STATIC_MAX_DURATION_S {
			return Err(ConfigError::StaticDurationTooLong(self.duration_s, STATIC_MAX_DURATION_S));
		}
		if !(-90.0..=90.0).contains(&self.elevation_mask_deg) {
			return Err(ConfigError::ElevationMask(self.elevation_mask_deg));
		}
		if self.max_channels == 0 {
			return Err(ConfigError::NoChannels);
		}

		let offset_hz = self.intermediate_frequency().abs();
		if offset_hz + MAX_DOPPLER_HZ >= 0.5*self.sample_rate_hz {
			return Err(ConfigError::CenterFrequency{ offset_hz, sample_rate: self.sample_rate_hz });
		}

		self.start()?;
		Ok(())
	}

	/// Checks the configuration against the loaded trajectory and ephemerides
	pub fn check_inputs(&self, trajectory:&Trajectory, store:&EphemerisStore, start:&GnssTime) -> Result<(), ConfigError> {
		if (trajectory.interval() - self.epoch_interval_s).abs() > 1.0e-9 {
			return Err(ConfigError::IntervalMismatch{ trajectory: trajectory.interval(), epoch: self.epoch_interval_s });
		}

		let required = self.synth_settings().epochs();
		if trajectory.is_static() {
			if self.duration_s > STATIC_MAX_DURATION_S {
				return Err(ConfigError::StaticDurationTooLong(self.duration_s, STATIC_MAX_DURATION_S));
			}
		} else if trajectory.len() < required {
			return Err(ConfigError::TrajectoryTooShort{ available: trajectory.len(), required });
		}

		let end = start.add_seconds(self.duration_s);
		if !store.covers(start) || !store.covers(&end) {
			return Err(ConfigError::StartTimeOutOfRange{ week: start.week, sow: start.sow });
		}
		Ok(())
	}

	pub fn is_static(&self) -> bool { self.static_location.is_some() }

	pub fn static_location(&self) -> Option<Geodetic> {
		self.static_location.map(|llh| Geodetic::from_degrees(llh[0], llh[1], llh[2]))
	}

	pub fn sample_format(&self) -> Result<SampleFormat, ConfigError> { SampleFormat::try_from(self.bit_depth) }

	/// Carrier frequency of a satellite with no Doppler, relative to the output center frequency
	pub fn intermediate_frequency(&self) -> f64 { L1_CARRIER_HZ - self.center_frequency_hz }

	/// Parsed start time, if one was given
	pub fn start(&self) -> Result<Option<GnssTime>, ConfigError> {
		match &self.start_time {
			Some(s) => GnssTime::try_from(parse_start_time(s)?)
				.map(Some)
				.map_err(|_| ConfigError::StartTime(s.clone())),
			None => Ok(None),
		}
	}

	pub fn synth_settings(&self) -> SynthSettings {
		SynthSettings {
			plan: SignalPlan {
				signal: SignalParameters::L1C,
				sample_rate: self.sample_rate_hz,
				intermediate_freq: self.intermediate_frequency(),
				path_loss: self.path_loss,
			},
			duration: self.duration_s,
			epoch_interval: self.epoch_interval_s,
			elevation_mask: self.elevation_mask_deg.to_radians(),
			max_channels: self.max_channels,
			threads: self.threads,
		}
	}

}

/// Parses `YYYY/MM/DD,hh:mm:ss` with optional fractional seconds
pub fn parse_start_time(s:&str) -> Result<CalendarTime, ConfigError> {
	let re = Regex::new(r"^\s*(\d{4})/(\d{1,2})/(\d{1,2}),(\d{1,2}):(\d{1,2}):(\d{1,2}(?:\.\d*)?)\s*$")
		.map_err(|e| ConfigError::StartTime(e.to_string()))?;
	let bad = || ConfigError::StartTime(s.to_string());

	let capts = re.captures(s).ok_or_else(bad)?;
	let t = CalendarTime {
		year:   capts[1].parse().map_err(|_| bad())?,
		month:  capts[2].parse().map_err(|_| bad())?,
		day:    capts[3].parse().map_err(|_| bad())?,
		hour:   capts[4].parse().map_err(|_| bad())?,
		minute: capts[5].parse().map_err(|_| bad())?,
		second: capts[6].parse().map_err(|_| bad())?,
	};

	if t.is_valid() { Ok(t) } else { Err(bad()) }
}
