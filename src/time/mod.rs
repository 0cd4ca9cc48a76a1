//! GPS system time as week number plus seconds of week, and the calendar it maps onto.
//!
//! Calendar conversion goes through `hifitime` in the GPST scale, so it is exact to the
//! nanosecond in both directions.  Leap seconds only enter when a calendar time is interpreted as
//! UTC, and then the broadcast count is used rather than hifitime's own table.

use std::convert::TryFrom;
use std::fmt;

use hifitime::{Duration, Epoch, HifitimeError, TimeScale, Unit};
use serde::{Serialize, Deserialize};

use crate::constants::SECONDS_IN_WEEK;

#[cfg(test)]
mod tests;

const NANOS_IN_WEEK:i128 = 604_800_000_000_000;

// GPS time runs a fixed 19 s behind TAI
const GPST_BEHIND_TAI_S:i64 = 19;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct GnssTime {
	pub week:i32,
	pub sow:f64,
}

impl GnssTime {

	/// Builds a normalized time; seconds outside [0, 604800) roll the week forward or back
	pub fn new(week:i32, sow:f64) -> Self {
		let rollover:f64 = (sow / SECONDS_IN_WEEK).floor();
		let mut week = week + (rollover as i32);
		let mut sow = sow - rollover*SECONDS_IN_WEEK;

		// Rounding in the subtraction can land exactly on the upper bound
		if sow >= SECONDS_IN_WEEK {
			sow -= SECONDS_IN_WEEK;
			week += 1;
		}

		Self{ week, sow }
	}

	pub fn add_seconds(&self, dt:f64) -> Self { Self::new(self.week, self.sow + dt) }

	/// Signed difference self - other [sec]
	pub fn seconds_since(&self, other:&GnssTime) -> f64 {
		((self.week - other.week) as f64)*SECONDS_IN_WEEK + (self.sow - other.sow)
	}

	pub fn total_seconds(&self) -> f64 { (self.week as f64)*SECONDS_IN_WEEK + self.sow }

	/// Same instant as a GPST `Epoch`
	pub fn to_epoch(&self) -> Epoch {
		let nanos:i128 = (self.week as i128)*NANOS_IN_WEEK + (self.sow*1.0e9).round() as i128;
		Epoch::from_duration(Duration::from_total_nanoseconds(nanos), TimeScale::GPST)
	}

	/// Interprets a calendar time as UTC and shifts it onto GPS time
	pub fn from_utc(utc:&CalendarTime, leap_seconds:i32) -> Result<Self, HifitimeError> {
		Ok(Self::try_from(*utc)?.add_seconds(leap_seconds as f64))
	}

	pub fn to_utc(&self, leap_seconds:i32) -> CalendarTime {
		CalendarTime::from(self.add_seconds(-(leap_seconds as f64)))
	}

}

impl From<Epoch> for GnssTime {
	fn from(epoch:Epoch) -> Self {
		let nanos:i128 = epoch.to_time_scale(TimeScale::GPST).duration.total_nanoseconds();
		let week = nanos.div_euclid(NANOS_IN_WEEK);
		let sow_nanos = nanos.rem_euclid(NANOS_IN_WEEK);
		GnssTime::new(week as i32, (sow_nanos as f64) / 1.0e9)
	}
}

impl fmt::Display for GnssTime {
	fn fmt(&self, f:&mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "week {} sow {:.3}", self.week, self.sow)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalendarTime {
	pub year:i32,
	pub month:u32,
	pub day:u32,
	pub hour:u32,
	pub minute:u32,
	pub second:f64,
}

impl CalendarTime {

	pub fn new(year:i32, month:u32, day:u32, hour:u32, minute:u32, second:f64) -> Self {
		Self{ year, month, day, hour, minute, second }
	}

	pub fn is_valid(&self) -> bool {
		(1..=12).contains(&self.month) && (1..=31).contains(&self.day) && self.hour < 24 && self.minute < 60 &&
			self.second >= 0.0 && self.second < 60.0 && self.to_epoch().is_ok()
	}

	/// Same calendar labels read in the GPST scale
	pub fn to_epoch(&self) -> Result<Epoch, HifitimeError> {
		let whole:f64 = self.second.floor();
		let nanos:u32 = (((self.second - whole)*1.0e9).round() as u32).min(999_999_999);
		Epoch::maybe_from_gregorian(self.year, self.month as u8, self.day as u8, self.hour as u8, self.minute as u8, whole as u8, nanos, TimeScale::GPST)
	}

}

impl fmt::Display for CalendarTime {
	fn fmt(&self, f:&mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:04}/{:02}/{:02},{:02}:{:02}:{:06.3}", self.year, self.month, self.day, self.hour, self.minute, self.second)
	}
}

impl TryFrom<CalendarTime> for GnssTime {
	type Error = HifitimeError;

	fn try_from(t:CalendarTime) -> Result<Self, HifitimeError> { Ok(GnssTime::from(t.to_epoch()?)) }
}

impl From<GnssTime> for CalendarTime {
	fn from(g:GnssTime) -> Self {
		// Gregorian labels of a GPST instant are the TAI labels of the instant 19 s earlier
		let shifted = g.to_epoch() - GPST_BEHIND_TAI_S*Unit::Second;
		let (year, month, day, hour, minute, second, nanos) = shifted.to_gregorian_tai();
		CalendarTime {
			year,
			month: month as u32,
			day: day as u32,
			hour: hour as u32,
			minute: minute as u32,
			second: (second as f64) + (nanos as f64) / 1.0e9,
		}
	}
}
