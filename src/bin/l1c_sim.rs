extern crate clap;
extern crate colored;
extern crate ctrlc;
extern crate env_logger;
extern crate l1c_sim;
extern crate nalgebra as na;
extern crate serde_json;

use std::fs::File;
use std::io::BufReader;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{Arg, App, ArgMatches};
use self::na::base::Vector3;
use colored::*;
use l1c_sim::config::SimConfig;
use l1c_sim::ephemeris::NavigationData;
use l1c_sim::geodesy::{self, Ellipsoid};
use l1c_sim::io::FileSink;
use l1c_sim::synth::{self, CarrierMode};
use l1c_sim::trajectory::{CsvFormat, Trajectory};
use l1c_sim::Error;

type BoxResult<T> = Result<T, Box<dyn std::error::Error>>;

// Conventional status for a run interrupted by SIGINT
const EXIT_CANCELLED:i32 = 130;

/// How a run that did not fail ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
	Completed,
	Cancelled{ epoch:usize },
}

impl Outcome {
	fn exit_code(&self) -> i32 {
		match self {
			Outcome::Completed => 0,
			Outcome::Cancelled{ .. } => EXIT_CANCELLED,
		}
	}
}

// Tokyo Station, used when no receiver position or motion is given
const DEFAULT_LOCATION:[f64; 3] = [35.681298, 139.766247, 10.0];

fn parse_value<T:FromStr>(matches:&ArgMatches, name:&str) -> BoxResult<Option<T>> {
	match matches.value_of(name) {
		Some(s) => match s.trim().parse::<T>() {
			Ok(x) => Ok(Some(x)),
			Err(_) => Err(format!("invalid value '{}' for --{}", s, name).into()),
		},
		None => Ok(None),
	}
}

fn parse_triplet(matches:&ArgMatches, name:&str) -> BoxResult<Option<[f64; 3]>> {
	match matches.value_of(name) {
		Some(s) => {
			let v:Vec<f64> = s.split(',').map(|x| x.trim().parse::<f64>()).collect::<Result<Vec<f64>, _>>()
				.map_err(|_| format!("invalid value '{}' for --{}", s, name))?;
			if v.len() != 3 {
				return Err(format!("--{} expects three comma-separated values, got '{}'", name, s).into());
			}
			Ok(Some([v[0], v[1], v[2]]))
		},
		None => Ok(None),
	}
}

fn build_config(matches:&ArgMatches) -> BoxResult<SimConfig> {
	let mut config = match matches.value_of("config") {
		Some(fname) => SimConfig::from_json(&std::fs::read_to_string(fname)?)?,
		None => SimConfig::default(),
	};

	if let Some(x) = parse_value(matches, "duration")?    { config.duration_s = x; }
	if let Some(x) = parse_value(matches, "sample_rate")? { config.sample_rate_hz = x; }
	if let Some(x) = parse_value(matches, "bits")?        { config.bit_depth = x; }
	if let Some(x) = parse_value(matches, "center_freq")? { config.center_frequency_hz = x; }
	if let Some(x) = parse_value(matches, "mask")?        { config.elevation_mask_deg = x; }
	if let Some(x) = parse_value(matches, "channels")?    { config.max_channels = x; }
	if let Some(x) = parse_value(matches, "threads")?     { config.threads = x; }
	if let Some(s) = matches.value_of("start")  { config.start_time = Some(s.to_string()); }
	if let Some(s) = matches.value_of("output") { config.output = s.into(); }
	if matches.is_present("continuous_phase") { config.carrier_mode = CarrierMode::Continuous; }
	if matches.is_present("no_iono")          { config.ionosphere = false; }
	if matches.is_present("no_path_loss")     { config.path_loss = false; }

	if let Some(llh) = parse_triplet(matches, "static_llh")? {
		config.static_location = Some(llh);
	} else if let Some(xyz) = parse_triplet(matches, "static_ecef")? {
		let g = geodesy::ecef_to_geodetic(&Vector3::new(xyz[0], xyz[1], xyz[2]));
		config.static_location = Some([g.latitude_deg(), g.longitude_deg(), g.height]);
	} else if config.static_location.is_none() && !matches.is_present("motion_ecef") && !matches.is_present("motion_llh") {
		config.static_location = Some(DEFAULT_LOCATION);
	}

	Ok(config)
}

fn load_trajectory(matches:&ArgMatches, config:&SimConfig) -> BoxResult<Trajectory> {
	let (fname, format) = match (matches.value_of("motion_ecef"), matches.value_of("motion_llh")) {
		(Some(f), _) => (f, CsvFormat::Ecef),
		(None, Some(f)) => (f, CsvFormat::Geodetic),
		(None, None) => {
			let location = config.static_location().ok_or("no receiver position or motion given")?;
			return Ok(Trajectory::fixed(geodesy::geodetic_to_ecef(&location), config.epoch_interval_s, config.duration_s));
		}
	};
	let reader = BufReader::new(File::open(fname)?);
	Ok(Trajectory::read_csv(reader, format, &Ellipsoid::WGS84)?)
}

fn run() -> BoxResult<Outcome> {

	let matches = App::new("GPS L1C Signal Simulator")
		.version("0.1.0")
		.author("John Stanford (johnwstanford@gmail.com)")
		.about("Synthesizes GPS L1C baseband I/Q samples for a static or moving receiver")
		.arg(Arg::with_name("nav")
			.short("e").long("nav")
			.help("Navigation data (ephemerides and ionosphere/UTC parameters) as JSON")
			.required(true).takes_value(true))
		.arg(Arg::with_name("motion_ecef")
			.short("u").long("motion_ecef")
			.help("User motion CSV, t,x,y,z in ECEF meters at the epoch interval")
			.takes_value(true))
		.arg(Arg::with_name("motion_llh")
			.short("x").long("motion_llh")
			.help("User motion CSV, t,lat,lon,h in degrees and meters")
			.takes_value(true).conflicts_with("motion_ecef"))
		.arg(Arg::with_name("static_ecef")
			.short("c").long("static_ecef")
			.help("Static receiver position x,y,z in ECEF meters")
			.takes_value(true).allow_hyphen_values(true).conflicts_with_all(&["motion_ecef", "motion_llh"]))
		.arg(Arg::with_name("static_llh")
			.short("l").long("static_llh")
			.help("Static receiver position lat,lon,h in degrees and meters")
			.takes_value(true).allow_hyphen_values(true).conflicts_with_all(&["motion_ecef", "motion_llh", "static_ecef"]))
		.arg(Arg::with_name("start")
			.short("t").long("start")
			.help("Start time as YYYY/MM/DD,hh:mm:ss (GPS time), default is the first time of clock in the navigation data")
			.takes_value(true))
		.arg(Arg::with_name("duration")
			.short("d").long("duration")
			.help("Duration [sec]")
			.takes_value(true))
		.arg(Arg::with_name("sample_rate")
			.short("s").long("sample_rate")
			.help("Sample rate [Hz], default 2600000")
			.takes_value(true))
		.arg(Arg::with_name("bits")
			.short("b").long("bits")
			.help("I/Q bit depth: 1, 8 or 16")
			.takes_value(true))
		.arg(Arg::with_name("output")
			.short("o").long("output")
			.help("Output filename, default gpssim.bin")
			.takes_value(true))
		.arg(Arg::with_name("center_freq")
			.short("f").long("center_freq")
			.help("Center frequency of the output stream [Hz], default 1575420000")
			.takes_value(true))
		.arg(Arg::with_name("mask")
			.short("m").long("mask")
			.help("Elevation mask [deg]")
			.takes_value(true).allow_hyphen_values(true))
		.arg(Arg::with_name("channels")
			.short("n").long("channels")
			.help("Maximum number of simultaneous channels")
			.takes_value(true))
		.arg(Arg::with_name("threads")
			.long("threads")
			.help("Worker threads, 0 for one per core")
			.takes_value(true))
		.arg(Arg::with_name("continuous_phase")
			.long("continuous_phase")
			.help("Use a floating point carrier phase instead of the 512-entry table"))
		.arg(Arg::with_name("no_iono")
			.long("no_iono")
			.help("Disable the ionospheric delay"))
		.arg(Arg::with_name("no_path_loss")
			.long("no_path_loss")
			.help("Keep every channel at unit gain"))
		.arg(Arg::with_name("config")
			.long("config")
			.help("JSON run configuration; command line options override it")
			.takes_value(true))
		.arg(Arg::with_name("summary")
			.long("summary")
			.help("Write a JSON summary of the run to this file")
			.takes_value(true))
		.arg(Arg::with_name("verbose")
			.short("v").long("verbose")
			.help("Log channel allocation and progress"))
		.get_matches();

	let level = if matches.is_present("verbose") { "debug" } else { "info" };
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

	let config = build_config(&matches)?;
	config.validate()?;

	let nav_fname = matches.value_of("nav").ok_or("navigation data is required")?;
	let nav = NavigationData::from_reader(BufReader::new(File::open(nav_fname)?))?;
	let trajectory = load_trajectory(&matches, &config)?;

	let cancel = Arc::new(AtomicBool::new(false));
	let handler_flag = cancel.clone();
	ctrlc::set_handler(move || {
		handler_flag.store(true, Ordering::SeqCst);
	})?;

	eprintln!("Generating {:.1} s at {:.0} Hz into {}", config.duration_s, config.sample_rate_hz, config.output.display());

	let mut sink = FileSink::create(&config.output, config.sample_format()?)?;
	let summary = match synth::simulate(&config, &nav, &trajectory, &mut sink, cancel) {
		Ok(summary) => summary,
		Err(Error::Cancelled{ epoch }) => {
			drop(sink);
			eprintln!("{}", format!("Cancelled at epoch {}, partial output removed", epoch).yellow());
			return Ok(Outcome::Cancelled{ epoch });
		},
		Err(e) => return Err(e.into()),
	};

	eprintln!("{}", format!("Wrote {} samples ({} epochs) to {}", summary.samples, summary.epochs, config.output.display()).green());
	eprintln!("Start time: {}", summary.start);
	for (prn, epochs) in summary.contributions.iter() {
		eprintln!("  PRN {:2}: {:6} epochs", prn, epochs);
	}

	if let Some(fname) = matches.value_of("summary") {
		serde_json::to_writer_pretty(File::create(fname)?, &summary)?;
	}

	Ok(Outcome::Completed)
}

fn main() {
	match run() {
		Ok(outcome) => std::process::exit(outcome.exit_code()),
		Err(e) => {
			eprintln!("{}", format!("Error: {}", e).red());
			std::process::exit(1);
		}
	}
}
