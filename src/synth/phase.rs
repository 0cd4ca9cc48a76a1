//! Carrier phase accumulators.  Both keep the phase in cycles modulo one; they differ only in how the
//! phase is stored and how the phasor is evaluated.

use std::f64::consts;
use std::sync::Arc;

use num_complex::Complex;
use serde::{Serialize, Deserialize};

pub const TABLE_BITS:u32 = 9;
pub const TABLE_SIZE:usize = 1 << TABLE_BITS;

const PHASE_SCALE:f64 = 4294967296.0;	// 2^32 counts per cycle

pub trait PhaseAccumulator: Clone + Send {
	/// Sets the phase, in cycles; only the fractional part is kept
	fn reset(&mut self, cycles:f64);

	fn set_frequency(&mut self, freq_hz:f64, sample_rate:f64);

	/// Current phase in [0, 1) cycles
	fn cycles(&self) -> f64;

	/// Phasor at the current phase, then advances by one sample
	fn advance(&mut self) -> Complex<f64>;
}

/// Selects the accumulator used for every channel of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarrierMode {
	Quantized,
	Continuous,
}

impl Default for CarrierMode {
	fn default() -> Self { CarrierMode::Quantized }
}

/// 32-bit fixed point phase with a 512-entry cos/sin lookup on the top nine bits
#[derive(Debug, Clone)]
pub struct QuantizedPhase {
	phase:u32,
	step:u32,
	table:Arc<Vec<Complex<f64>>>,
}

impl QuantizedPhase {

	pub fn new() -> Self {
		let table:Vec<Complex<f64>> = (0..TABLE_SIZE).map(|k| {
			let theta = 2.0 * consts::PI * (k as f64) / (TABLE_SIZE as f64);
			Complex{ re: theta.cos(), im: theta.sin() }
		}).collect();
		Self{ phase: 0, step: 0, table: Arc::new(table) }
	}

	pub fn step(&self) -> u32 { self.step }

	// Wraps a possibly negative number of cycles onto the u32 circle
	fn to_counts(cycles:f64) -> u32 {
		((cycles - cycles.floor()) * PHASE_SCALE).round() as u64 as u32
	}

}

impl Default for QuantizedPhase {
	fn default() -> Self { Self::new() }
}

impl PhaseAccumulator for QuantizedPhase {

	fn reset(&mut self, cycles:f64) { self.phase = Self::to_counts(cycles); }

	fn set_frequency(&mut self, freq_hz:f64, sample_rate:f64) {
		self.step = Self::to_counts(freq_hz / sample_rate);
	}

	fn cycles(&self) -> f64 { (self.phase as f64) / PHASE_SCALE }

	fn advance(&mut self) -> Complex<f64> {
		let ans = self.table[(self.phase >> (32 - TABLE_BITS)) as usize];
		self.phase = self.phase.wrapping_add(self.step);
		ans
	}

}

/// Phase in f64 cycles with exact trigonometry; slower but free of table quantization
#[derive(Debug, Clone, Copy, Default)]
pub struct ContinuousPhase {
	phase:f64,
	step:f64,
}

impl ContinuousPhase {
	pub fn new() -> Self { Self::default() }
}

impl PhaseAccumulator for ContinuousPhase {

	fn reset(&mut self, cycles:f64) { self.phase = cycles - cycles.floor(); }

	fn set_frequency(&mut self, freq_hz:f64, sample_rate:f64) { self.step = freq_hz / sample_rate; }

	fn cycles(&self) -> f64 { self.phase }

	fn advance(&mut self) -> Complex<f64> {
		let theta = 2.0 * consts::PI * self.phase;
		let ans = Complex{ re: theta.cos(), im: theta.sin() };
		self.phase += self.step;
		self.phase -= self.phase.floor();
		ans
	}

}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case(0.25, 1.0e6)]
	#[case(-1234.5, 2.6e6)]
	#[case(4.092e6, 16.368e6)]
	fn accumulators_agree(#[case] freq_hz:f64, #[case] sample_rate:f64) {
		let mut q = QuantizedPhase::new();
		let mut c = ContinuousPhase::new();
		q.reset(0.3);
		c.reset(0.3);
		q.set_frequency(freq_hz, sample_rate);
		c.set_frequency(freq_hz, sample_rate);

		// One table step is 2*pi/512 rad, so the phasors differ by at most about 0.0123
		for _ in 0..10000 {
			let a = q.advance();
			let b = c.advance();
			assert!((a - b).norm() < 0.013);
		}
		let dc = (q.cycles() - c.cycles()).abs();
		assert!(dc < 1e-5 || (1.0 - dc) < 1e-5);
	}

	#[test]
	fn negative_phase_wraps() {
		let mut q = QuantizedPhase::new();
		q.reset(-0.25);
		assert!((q.cycles() - 0.75).abs() < 1e-9);

		let mut c = ContinuousPhase::new();
		c.reset(-2.25);
		assert!((c.cycles() - 0.75).abs() < 1e-12);
	}

	#[test]
	fn quarter_cycle_steps() {
		let mut q = QuantizedPhase::new();
		q.set_frequency(0.25, 1.0);
		assert_eq!(q.step(), 1 << 30);

		let expected = [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0), (1.0, 0.0)];
		for (re, im) in expected.iter() {
			let p = q.advance();
			assert!((p.re - re).abs() < 1e-12 && (p.im - im).abs() < 1e-12);
		}
	}

	#[test]
	fn clones_share_table() {
		let q = QuantizedPhase::new();
		let r = q.clone();
		assert!(Arc::ptr_eq(&q.table, &r.table));
		assert_eq!(CarrierMode::default(), CarrierMode::Quantized);
	}

}
