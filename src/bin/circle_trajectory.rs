extern crate clap;
extern crate colored;
extern crate env_logger;
extern crate l1c_sim;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::str::FromStr;

use clap::{Arg, App, ArgMatches};
use colored::*;
use l1c_sim::geodesy::Geodetic;
use l1c_sim::trajectory::{CircularPath, Trajectory, DEFAULT_INTERVAL_S};

fn parse_or<T:FromStr>(matches:&ArgMatches, name:&str, default:T) -> Result<T, String> {
	match matches.value_of(name) {
		Some(s) => s.parse::<T>().map_err(|_| format!("invalid value '{}' for --{}", s, name)),
		None => Ok(default),
	}
}

fn run() -> Result<(), Box<dyn std::error::Error>> {

	let matches = App::new("Circle Trajectory")
		.version("0.1.0")
		.about("Writes a receiver moving around a horizontal circle as t,x,y,z ECEF rows at 10 Hz")
		.arg(Arg::with_name("output")
			.short("o").long("output")
			.help("Output CSV filename, default circle_l1c.csv")
			.takes_value(true))
		.arg(Arg::with_name("lat").long("lat").takes_value(true).allow_hyphen_values(true)
			.help("Center latitude [deg], default 35.681298"))
		.arg(Arg::with_name("lon").long("lon").takes_value(true).allow_hyphen_values(true)
			.help("Center longitude [deg], default 139.766247"))
		.arg(Arg::with_name("height").long("height").takes_value(true).allow_hyphen_values(true)
			.help("Height above the ellipsoid [m], default 100"))
		.arg(Arg::with_name("radius").short("r").long("radius").takes_value(true)
			.help("Circle radius [m], default 100"))
		.arg(Arg::with_name("period").short("p").long("period").takes_value(true)
			.help("Time for one lap [sec], default 60"))
		.arg(Arg::with_name("duration").short("d").long("duration").takes_value(true)
			.help("Length of the trajectory [sec], default 300"))
		.get_matches();

	env_logger::init();

	let fname:&str = matches.value_of("output").unwrap_or("circle_l1c.csv");
	let center = Geodetic::from_degrees(
		parse_or(&matches, "lat", 35.681298)?,
		parse_or(&matches, "lon", 139.766247)?,
		parse_or(&matches, "height", 100.0)?);
	let radius:f64 = parse_or(&matches, "radius", 100.0)?;
	let period:f64 = parse_or(&matches, "period", 60.0)?;
	let duration:f64 = parse_or(&matches, "duration", 300.0)?;

	if !(radius > 0.0 && period > 0.0 && duration > 0.0) {
		return Err("radius, period and duration must be positive".into());
	}

	let trajectory = Trajectory::circular(CircularPath::new(center, radius, period), DEFAULT_INTERVAL_S, duration);

	let mut writer = BufWriter::new(File::create(fname)?);
	trajectory.write_csv(&mut writer)?;
	writer.flush()?;

	eprintln!("{}", format!("Generated circular motion data: {}", fname).green());
	eprintln!("Duration: {:.1} seconds", trajectory.duration());
	eprintln!("Sample rate: {:.0} Hz", 1.0 / trajectory.interval());
	eprintln!("Circle radius: {:.1} meters", radius);

	Ok(())
}

fn main() {
	if let Err(e) = run() {
		eprintln!("{}", format!("Error: {}", e).red());
		std::process::exit(1);
	}
}
