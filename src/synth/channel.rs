use num_complex::Complex;
use log::debug;

use crate::constants::{C, SignalParameters};
use crate::ephemeris::Ephemeris;
use crate::error::ConfigError;
use crate::ionosphere::IonoUtcModel;
use crate::navigation::code::CodePair;
use crate::navigation::message::{self, NavFrame, Subframes, SUBFRAME_PERIOD_S};
use crate::navigation::symbols::encode_symbols;
use crate::range::RangeObservation;
use crate::time::GnssTime;

use super::phase::PhaseAccumulator;

/// Distance at which a satellite is simulated with unit amplitude
pub const REFERENCE_RANGE_M:f64 = 20200.0e3;

/// Sampling and signal parameters shared by every channel of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalPlan {
	pub signal:SignalParameters,
	pub sample_rate:f64,		// [samples/sec]
	pub intermediate_freq:f64,	// [Hz] carrier frequency minus the output center frequency
	pub path_loss:bool,
}

impl SignalPlan {

	pub fn amplitude(&self, distance:f64) -> f64 {
		if self.path_loss { REFERENCE_RANGE_M / distance } else { 1.0 }
	}

}

/// Signal state of one satellite.  Code, carrier and symbol timing are re-derived from the range
/// observations once per epoch and then run open loop at the sample rate.
#[derive(Debug, Clone)]
pub struct Channel<P:PhaseAccumulator> {
	prn:u8,
	codes:CodePair,
	iode:u8,
	toe:GnssTime,
	subframes:Subframes,
	frame:NavFrame,
	symbols:Vec<i8>,
	sym_idx:usize,
	code_phase:f64,		// [chips]
	code_step:f64,		// [chips/sample]
	carrier:P,
	f_carr:f64,			// [Hz]
	f_code:f64,			// [chips/sec]
	gain:f64,
	gain_step:f64,
	rho0:RangeObservation,
	buffer:Vec<Complex<f64>>,
	epochs:usize,
}

impl<P:PhaseAccumulator> Channel<P> {

	/// Starts a channel from the observation at the beginning of the current epoch.  The carrier
	/// phase starts from the fractional pseudorange in cycles.
	pub fn new(eph:&Ephemeris, iono:&IonoUtcModel, rho0:RangeObservation, mut carrier:P, plan:&SignalPlan) -> Result<Self, ConfigError> {
		let rec = eph.record();
		let codes = CodePair::new(rec.prn)?;
		let subframes = Subframes::encode(rec, iono);
		let frame = NavFrame::generate(&subframes, &rho0.time);
		let symbols = encode_symbols(&frame);

		carrier.reset(-rho0.pseudorange / plan.signal.wavelength());

		Ok(Self {
			prn: rec.prn, codes, iode: rec.iode, toe: rec.toe, subframes, frame, symbols,
			sym_idx: 0, code_phase: 0.0, code_step: 0.0,
			carrier, f_carr: 0.0, f_code: 0.0,
			gain: 0.0, gain_step: 0.0,
			rho0, buffer: vec![], epochs: 0,
		})
	}

	pub fn prn(&self) -> u8 { self.prn }
	pub fn observation(&self) -> &RangeObservation { &self.rho0 }
	pub fn azimuth(&self) -> f64 { self.rho0.azimuth }
	pub fn elevation(&self) -> f64 { self.rho0.elevation }
	pub fn frame(&self) -> &NavFrame { &self.frame }
	pub fn symbol_index(&self) -> usize { self.sym_idx }
	pub fn code_phase(&self) -> f64 { self.code_phase }
	pub fn carrier_frequency(&self) -> f64 { self.f_carr }
	pub fn code_frequency(&self) -> f64 { self.f_code }
	pub fn carrier_phase(&self) -> f64 { self.carrier.cycles() }
	pub fn gain(&self) -> f64 { self.gain }
	pub fn samples(&self) -> &[Complex<f64>] { &self.buffer }

	/// Number of epochs this channel has contributed to
	pub fn epochs(&self) -> usize { self.epochs }

	/// Moves to the next navigation frame once t has crossed a 30 s boundary, re-encoding the
	/// subframes if a different ephemeris set has been selected since.  Returns true on a new frame.
	pub fn refresh_frame(&mut self, eph:&Ephemeris, iono:&IonoUtcModel, t:&GnssTime) -> bool {
		if message::frame_start(t) == self.frame.g0 {
			return false;
		}

		let rec = eph.record();
		if rec.iode != self.iode || rec.toe != self.toe {
			debug!("PRN {:02}: new ephemeris IODE {} (was {})", self.prn, rec.iode, self.iode);
			self.subframes = Subframes::encode(rec, iono);
			self.iode = rec.iode;
			self.toe = rec.toe;
		}

		self.frame = self.frame.next(&self.subframes, t);
		self.symbols = encode_symbols(&self.frame);
		true
	}

	/// Sets frequencies, code phase, symbol index and the amplitude ramp for the epoch running from
	/// the stored observation to rho1.  The pseudorange is taken as linear over the epoch, so the
	/// code Doppler here carries the code phase exactly onto the value re-derived next epoch.
	pub fn update_epoch(&mut self, rho1:RangeObservation, plan:&SignalPlan, n_samples:usize) {
		let dt = rho1.time.seconds_since(&self.rho0.time);
		let rate = (rho1.pseudorange - self.rho0.pseudorange) / dt;
		let doppler = -rate / plan.signal.wavelength();

		self.f_carr = plan.intermediate_freq + doppler;
		self.f_code = plan.signal.chip_rate + doppler / plan.signal.carrier_to_code();
		self.carrier.set_frequency(self.f_carr, plan.sample_rate);
		self.code_step = self.f_code / plan.sample_rate;

		// Transmit time counted from the start of the carried subframe 5
		let t_tx = self.rho0.time.seconds_since(&self.frame.g0) + SUBFRAME_PERIOD_S - self.rho0.pseudorange / C;
		let symbols = (t_tx * plan.signal.symbol_rate).max(0.0);
		self.sym_idx = symbols.floor() as usize;
		self.code_phase = (symbols - symbols.floor()) * (plan.signal.code_length as f64);

		let a0 = plan.amplitude(self.rho0.distance);
		let a1 = plan.amplitude(rho1.distance);
		self.gain = a0;
		self.gain_step = (a1 - a0) / (n_samples as f64);

		self.rho0 = rho1;
		self.epochs += 1;
		self.buffer.resize(n_samples, Complex{ re: 0.0, im: 0.0 });
	}

	/// Fills the channel's own buffer with this epoch's samples
	pub fn generate(&mut self, plan:&SignalPlan) {
		let mut buffer = std::mem::replace(&mut self.buffer, vec![]);
		self.generate_into(&mut buffer, plan);
		self.buffer = buffer;
	}

	pub fn generate_into(&mut self, out:&mut [Complex<f64>], plan:&SignalPlan) {
		let n_chips = plan.signal.code_length;
		let chips = n_chips as f64;
		let last_symbol = self.symbols.len() - 1;
		let data_amp = plan.signal.data_amplitude();
		let pilot_amp = plan.signal.pilot_amplitude();

		for s in out.iter_mut() {
			let chip = (self.code_phase as usize).min(n_chips - 1);
			let symbol = self.symbols[self.sym_idx.min(last_symbol)] as f64;

			let baseband = data_amp*symbol*(self.codes.data[chip] as f64) + pilot_amp*(self.codes.pilot[chip] as f64);
			*s = self.carrier.advance() * (baseband * self.gain);

			self.gain += self.gain_step;
			self.code_phase += self.code_step;
			if self.code_phase >= chips {
				self.code_phase -= chips;
				self.sym_idx += 1;
			}
		}
	}

}
