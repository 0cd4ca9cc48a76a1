//! Process-wide physical and signal constants.  Nothing in here is mutable; components that need
//! a family of related values (the ellipsoid, the signal plan) take them as injected structs instead.

pub const SECONDS_IN_WEEK:f64 = 604800.0;
pub const SECONDS_IN_HALF_WEEK:f64 = 302400.0;
pub const SECONDS_IN_DAY:f64 = 86400.0;

pub const MU:f64 = 3.986005e14;                  // [m^3/s^2] WGS-84 value of the earth's gravitational constant
pub const OMEGA_E:f64 = 7.2921151467e-5;         // [rad/s] WGS-84 value of the earth's rotation rate
pub const C:f64 = 2.99792458e8;                  // [m/s] speed of light
pub const F:f64 = -4.442807633e-10;              // [sec/root-meter] relativistic correction constant

pub const WGS84_SEMI_MAJOR_AXIS_METERS:f64 = 6378137.0;
pub const WGS84_FLATTENING:f64 = 1.0 / 298.257223563;

// Scale factors used by the legacy navigation message
pub const POW2_M5:f64  = 0.03125;
pub const POW2_M19:f64 = 1.907348632812500e-6;
pub const POW2_M24:f64 = 5.960464477539063e-8;
pub const POW2_M27:f64 = 7.450580596923828e-9;
pub const POW2_M29:f64 = 1.862645149230957e-9;
pub const POW2_M30:f64 = 9.313225746154785e-10;
pub const POW2_M31:f64 = 4.656612873077393e-10;
pub const POW2_M33:f64 = 1.164153218269348e-10;
pub const POW2_M43:f64 = 1.136868377216160e-13;
pub const POW2_M50:f64 = 8.881784197001252e-16;
pub const POW2_M55:f64 = 2.775557561562891e-17;

pub const L1_CARRIER_HZ:f64 = 1575.42e6;
pub const L1C_CODE_LENGTH:usize = 10230;
pub const L1C_CHIP_RATE:f64 = 1.023e6;          // [chips/s]
pub const L1C_SYMBOL_RATE:f64 = 100.0;          // [symbols/s]

pub const MAX_CHANNELS:usize = 16;
pub const STATIC_MAX_DURATION_S:f64 = 86400.0;

/// Carrier and code parameters of the simulated signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalParameters {
	pub carrier_hz:f64,
	pub chip_rate:f64,
	pub code_length:usize,
	pub symbol_rate:f64,
	/// Fraction of the total signal power carried by the data component
	pub data_power_fraction:f64,
}

impl SignalParameters {

	pub const L1C:SignalParameters = SignalParameters {
		carrier_hz: L1_CARRIER_HZ,
		chip_rate: L1C_CHIP_RATE,
		code_length: L1C_CODE_LENGTH,
		symbol_rate: L1C_SYMBOL_RATE,
		data_power_fraction: 0.25,
	};

	pub fn wavelength(&self) -> f64 { C / self.carrier_hz }

	/// Number of carrier cycles per code chip (1540 for L1)
	pub fn carrier_to_code(&self) -> f64 { self.carrier_hz / self.chip_rate }

	pub fn code_period(&self) -> f64 { (self.code_length as f64) / self.chip_rate }

	pub fn data_amplitude(&self) -> f64 { self.data_power_fraction.sqrt() }
	pub fn pilot_amplitude(&self) -> f64 { (1.0 - self.data_power_fraction).sqrt() }

}

impl Default for SignalParameters {
	fn default() -> Self { Self::L1C }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn l1c_plan() {
		let s = SignalParameters::L1C;
		assert!((s.carrier_to_code() - 1540.0).abs() < 1e-9);
		assert!((s.code_period() - 0.01).abs() < 1e-12);
		assert!((s.data_amplitude().powi(2) + s.pilot_amplitude().powi(2) - 1.0).abs() < 1e-12);
		assert!((s.wavelength() - 0.190293672798365).abs() < 1e-12);
	}

}
