//! Baseband synthesis.  Once per epoch the satellites are re-observed and every channel's code,
//! carrier and symbol timing is refreshed; the channels then run at the sample rate on the worker
//! pool and their buffers are summed in ascending PRN order into the composite output.

extern crate nalgebra as na;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};
use num_complex::Complex;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};
use self::na::base::Vector3;

use crate::config::SimConfig;
use crate::ephemeris::{EphemerisStore, NavigationData};
use crate::error::{Error, InputError, Result};
use crate::io::SampleSink;
use crate::ionosphere::IonoUtcModel;
use crate::range::RangeModel;
use crate::time::GnssTime;
use crate::trajectory::Trajectory;

pub mod channel;
pub mod phase;

pub use self::channel::{Channel, SignalPlan, REFERENCE_RANGE_M};
pub use self::phase::{CarrierMode, ContinuousPhase, PhaseAccumulator, QuantizedPhase};


/// Everything the epoch loop needs besides its inputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthSettings {
	pub plan:SignalPlan,
	pub duration:f64,			// [sec]
	pub epoch_interval:f64,		// [sec]
	pub elevation_mask:f64,		// [rad]
	pub max_channels:usize,
	/// Worker threads; zero lets rayon decide
	pub threads:usize,
}

impl SynthSettings {

	pub fn samples_per_epoch(&self) -> usize { (self.plan.sample_rate * self.epoch_interval).round() as usize }

	pub fn epochs(&self) -> usize { (self.duration / self.epoch_interval).round() as usize }

	pub fn total_samples(&self) -> usize { self.samples_per_epoch() * self.epochs() }

}

/// What a finished run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
	pub start:GnssTime,
	pub epochs:usize,
	pub samples:usize,
	/// Number of epochs each PRN contributed to
	pub contributions:BTreeMap<u8, usize>,
}

pub struct Synthesizer<'a, P:PhaseAccumulator> {
	settings:SynthSettings,
	store:&'a EphemerisStore,
	model:RangeModel,
	trajectory:&'a Trajectory,
	start:GnssTime,
	carrier:P,
	channels:Vec<Channel<P>>,
	composite:Vec<Complex<f64>>,
	pool:rayon::ThreadPool,
	cancel:Arc<AtomicBool>,
}

impl<'a, P:PhaseAccumulator> Synthesizer<'a, P> {

	/// `carrier` is the prototype every new channel's phase accumulator is cloned from
	pub fn new(settings:SynthSettings, store:&'a EphemerisStore, model:RangeModel, trajectory:&'a Trajectory, start:GnssTime, carrier:P) -> Result<Self> {
		let pool = rayon::ThreadPoolBuilder::new()
			.num_threads(settings.threads)
			.build()
			.map_err(|e| Error::WorkerPool(e.to_string()))?;

		Ok(Self {
			settings, store, model, trajectory, start, carrier,
			channels: vec![],
			composite: vec![],
			pool,
			cancel: Arc::new(AtomicBool::new(false)),
		})
	}

	/// Shares an externally owned cancellation flag, checked between epochs
	pub fn with_cancel_flag(mut self, cancel:Arc<AtomicBool>) -> Self {
		self.cancel = cancel;
		self
	}

	pub fn cancel_flag(&self) -> Arc<AtomicBool> { self.cancel.clone() }

	pub fn settings(&self) -> &SynthSettings { &self.settings }

	/// Active channels in ascending PRN order
	pub fn channels(&self) -> &[Channel<P>] { &self.channels }

	pub fn run<S:SampleSink>(&mut self, sink:&mut S) -> Result<GenerationSummary> {
		let n_epochs = self.settings.epochs();
		let n = self.settings.samples_per_epoch();
		let mut contributions:BTreeMap<u8, usize> = BTreeMap::new();

		info!("Generating {} epochs of {} samples from {}", n_epochs, n, self.start);

		for k in 0..n_epochs {
			if self.cancel.load(Ordering::Relaxed) {
				warn!("Cancelled at epoch {}", k);
				return Err(Error::Cancelled{ epoch: k });
			}

			self.step(k);
			for ch in self.channels.iter() {
				*contributions.entry(ch.prn()).or_insert(0) += 1;
			}

			sink.write_samples(&self.composite).map_err(|source| Error::Io{ epoch: k, sample: k*n, source })?;

			if k % 300 == 0 {
				let prns:Vec<String> = self.channels.iter().map(|ch| format!("{:02}", ch.prn())).collect();
				debug!("Epoch {}: {} channels [{}]", k, self.channels.len(), prns.join(" "));
			}
		}

		sink.finish().map_err(|source| Error::Io{ epoch: n_epochs, sample: n_epochs*n, source })?;

		let summary = GenerationSummary{ start: self.start, epochs: n_epochs, samples: n_epochs*n, contributions };
		info!("Wrote {} samples, {} satellites contributed", summary.samples, summary.contributions.len());
		Ok(summary)
	}

	/// Advances the channel set by one epoch and leaves the epoch's composite samples in the buffer
	pub fn step(&mut self, k:usize) -> &[Complex<f64>] {
		let dt = self.settings.epoch_interval;
		let t0 = self.start.add_seconds((k as f64)*dt);
		let t1 = self.start.add_seconds(((k + 1) as f64)*dt);

		let rx0 = (self.trajectory.position_clamped(k), self.trajectory.velocity_at(k));
		let rx1 = (self.trajectory.position_clamped(k + 1), self.trajectory.velocity_at(k + 1));

		self.update_channels(&t0, &t1, &rx1);
		self.allocate_channels(&t0, &t1, &rx0, &rx1);

		let plan = self.settings.plan;
		let channels = &mut self.channels;
		self.pool.install(|| channels.par_iter_mut().for_each(|ch| ch.generate(&plan)));

		// Fixed summation order keeps the output independent of the thread count
		let n = self.settings.samples_per_epoch();
		self.composite.clear();
		self.composite.resize(n, Complex{ re: 0.0, im: 0.0 });
		for ch in self.channels.iter() {
			for (c, s) in self.composite.iter_mut().zip(ch.samples().iter()) {
				*c += s;
			}
		}

		&self.composite
	}

	// Drops channels that fell below the mask or lost their ephemeris, then refreshes the rest
	fn update_channels(&mut self, t0:&GnssTime, t1:&GnssTime, rx1:&(Vector3<f64>, Vector3<f64>)) {
		let settings = self.settings;
		let n = settings.samples_per_epoch();
		let store = self.store;
		let model = &self.model;

		self.channels.retain_mut(|ch| {
			if ch.elevation() < settings.elevation_mask {
				info!("PRN {:02} dropped below the elevation mask ({:.1} deg)", ch.prn(), ch.elevation().to_degrees());
				return false;
			}

			let eph = match store.select(ch.prn(), t0) {
				Ok(eph) if eph.is_healthy() => eph,
				Ok(_) => {
					warn!("PRN {:02} dropped: unhealthy", ch.prn());
					return false;
				},
				Err(e) => {
					warn!("PRN {:02} dropped: {}", ch.prn(), e);
					return false;
				},
			};

			ch.refresh_frame(eph, &model.iono, t0);

			match model.observe(eph, &rx1.0, &rx1.1, t1) {
				Ok(rho1) => {
					ch.update_epoch(rho1, &settings.plan, n);
					true
				},
				Err(e) => {
					warn!("PRN {:02} dropped: {}", ch.prn(), e);
					false
				},
			}
		});
	}

	// Fills free channel slots with healthy satellites above the mask, lowest PRN first
	fn allocate_channels(&mut self, t0:&GnssTime, t1:&GnssTime, rx0:&(Vector3<f64>, Vector3<f64>), rx1:&(Vector3<f64>, Vector3<f64>)) {
		let settings = self.settings;
		let n = settings.samples_per_epoch();
		let store = self.store;

		for prn in store.prns() {
			if self.channels.len() >= settings.max_channels {
				break;
			}

			let pos = match self.channels.binary_search_by_key(&prn, |ch| ch.prn()) {
				Ok(_) => continue,
				Err(pos) => pos,
			};

			let eph = match store.select(prn, t0) {
				Ok(eph) if eph.is_healthy() => eph,
				Ok(_) => continue,
				Err(e) => {
					debug!("PRN {:02} not allocated: {}", prn, e);
					continue;
				},
			};

			let observed = self.model.observe(eph, &rx0.0, &rx0.1, t0)
				.and_then(|rho0| self.model.observe(eph, &rx1.0, &rx1.1, t1).map(|rho1| (rho0, rho1)));
			let (rho0, rho1) = match observed {
				Ok(pair) => pair,
				Err(e) => {
					warn!("PRN {:02} not allocated: {}", prn, e);
					continue;
				},
			};

			if rho0.elevation < settings.elevation_mask {
				continue;
			}

			match Channel::new(eph, &self.model.iono, rho0, self.carrier.clone(), &settings.plan) {
				Ok(mut ch) => {
					ch.update_epoch(rho1, &settings.plan, n);
					info!("PRN {:02} allocated: az {:5.1} deg el {:4.1} deg, range {:.1} km",
						prn, rho0.azimuth.to_degrees(), rho0.elevation.to_degrees(), rho0.distance / 1.0e3);
					self.channels.insert(pos, ch);
				},
				Err(e) => warn!("PRN {:02} not allocated: {}", prn, e),
			}
		}
	}

}

/// Validates a configuration against its inputs and runs it to completion with the carrier
/// accumulator the configuration selects
pub fn simulate<S:SampleSink>(config:&SimConfig, nav:&NavigationData, trajectory:&Trajectory, sink:&mut S, cancel:Arc<AtomicBool>) -> Result<GenerationSummary> {
	config.validate()?;

	let store = nav.store(config.max_ephemeris_age_s);
	let start = match config.start()? {
		Some(t) => t,
		None => store.earliest_toc().ok_or(InputError::NoEphemerides)?,
	};
	config.check_inputs(trajectory, &store, &start)?;

	let iono = IonoUtcModel{ enable: config.ionosphere, ..nav.iono_utc };
	let model = RangeModel{ receiver_clock_bias: config.receiver_clock_bias_s, ..RangeModel::new(iono) };
	let settings = config.synth_settings();

	match config.carrier_mode {
		CarrierMode::Quantized => Synthesizer::new(settings, &store, model, trajectory, start, QuantizedPhase::new())?
			.with_cancel_flag(cancel)
			.run(sink),
		CarrierMode::Continuous => Synthesizer::new(settings, &store, model, trajectory, start, ContinuousPhase::new())?
			.with_cancel_flag(cancel)
			.run(sink),
	}
}
