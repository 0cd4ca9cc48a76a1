use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Malformed input records.  Always raised before generation starts.
#[derive(Debug, Error)]
pub enum InputError {
	#[error("trajectory line {line}: {reason}")]
	Trajectory { line:usize, reason:String },

	#[error("trajectory line {line}: elapsed time {elapsed} does not follow the fixed {interval} s interval")]
	IrregularInterval { line:usize, elapsed:f64, interval:f64 },

	#[error("trajectory contains no points")]
	EmptyTrajectory,

	#[error("navigation data contains no ephemerides")]
	NoEphemerides,

	#[error("ephemeris record {index} (PRN {prn}): {reason}")]
	Ephemeris { index:usize, prn:u8, reason:String },

	#[error("ionosphere/UTC model: {0}")]
	IonoUtc(String),

	#[error("unable to parse navigation data: {0}")]
	Json(#[from] serde_json::Error),

	#[error("unable to read input: {0}")]
	Read(#[from] std::io::Error),
}

/// Per-satellite failures.  These exclude one satellite for one epoch and never abort the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropagationError {
	#[error("PRN {prn}: ephemeris is flagged invalid")]
	InvalidEphemeris { prn:u8 },

	#[error("PRN {prn}: no ephemeris available")]
	NoEphemeris { prn:u8 },

	#[error("PRN {prn}: closest ephemeris is {age_s:.0} s from the requested time")]
	StaleEphemeris { prn:u8, age_s:f64 },

	#[error("PRN {prn}: Kepler's equation did not converge after {iterations} iterations")]
	KeplerNonConvergence { prn:u8, iterations:usize },
}

/// Invalid run configuration.  Always raised before generation starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
	#[error("unsupported output bit depth {0} (expected 1, 8 or 16)")]
	UnsupportedBitDepth(u8),

	#[error("duration must be positive, got {0} s")]
	NonPositiveDuration(f64),

	#[error("sample rate must be positive, got {0} Hz")]
	NonPositiveSampleRate(f64),

	#[error("sample rate {0} Hz is below the 1 MHz minimum")]
	SampleRateTooLow(f64),

	#[error("epoch interval must be positive, got {0} s")]
	NonPositiveEpochInterval(f64),

	#[error("sample rate {sample_rate} Hz times epoch interval {interval} s is not an integer sample count")]
	FractionalEpoch { sample_rate:f64, interval:f64 },

	#[error("duration {duration} s is not a whole number of {interval} s epochs")]
	FractionalDuration { duration:f64, interval:f64 },

	#[error("static mode duration {0} s exceeds the {1} s limit")]
	StaticDurationTooLong(f64, f64),

	#[error("trajectory covers {available} epochs but {required} are needed")]
	TrajectoryTooShort { available:usize, required:usize },

	#[error("trajectory interval {trajectory} s does not match the epoch interval {epoch} s")]
	IntervalMismatch { trajectory:f64, epoch:f64 },

	#[error("elevation mask {0} deg is outside [-90, 90]")]
	ElevationMask(f64),

	#[error("signal at {offset_hz} Hz from the center frequency aliases at {sample_rate} Hz sampling")]
	CenterFrequency { offset_hz:f64, sample_rate:f64 },

	#[error("at least one channel is required")]
	NoChannels,

	#[error("PRN {0} has no L1C ranging code (expected 1-63)")]
	InvalidPrn(u8),

	#[error("start time week {week} sow {sow:.1} is outside the ephemeris coverage")]
	StartTimeOutOfRange { week:i32, sow:f64 },

	#[error("invalid start time '{0}'")]
	StartTime(String),
}

#[derive(Debug, Error)]
pub enum Error {
	#[error("input error: {0}")]
	Input(#[from] InputError),

	#[error("configuration error: {0}")]
	Config(#[from] ConfigError),

	#[error("propagation error: {0}")]
	Propagation(#[from] PropagationError),

	#[error("output error at epoch {epoch}, sample {sample}: {source}")]
	Io { epoch:usize, sample:usize, source:std::io::Error },

	#[error("unable to start worker pool: {0}")]
	WorkerPool(String),

	#[error("generation cancelled at epoch {epoch}")]
	Cancelled { epoch:usize },
}
