extern crate nalgebra as na;

use std::f64::consts;
use std::io::{BufRead, Write};

use log::warn;
use self::na::base::Vector3;
use serde::{Serialize, Deserialize};

use crate::error::InputError;
use crate::geodesy::{Ellipsoid, Geodetic};

#[cfg(test)]
mod tests;

pub const DEFAULT_INTERVAL_S:f64 = 0.1;

/// Radius above which the small-angle circle conversion is reported as inaccurate
pub const SMALL_ANGLE_RADIUS_LIMIT_M:f64 = 10.0e3;

const INTERVAL_TOLERANCE_S:f64 = 1.0e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
	pub elapsed:f64,				// [sec]
	pub position:Vector3<f64>,		// [m] ECEF
}

/// Column layout of a trajectory CSV file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvFormat {
	/// `t,x,y,z` in ECEF meters
	Ecef,
	/// `t,lat,lon,h` in degrees and meters
	Geodetic,
}

/// Analytic circle around a fixed geodetic center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularPath {
	pub center:Geodetic,
	pub radius:f64,		// [m]
	pub period:f64,		// [sec]
	pub ellipsoid:Ellipsoid,
}

impl CircularPath {

	pub fn new(center:Geodetic, radius:f64, period:f64) -> Self {
		if radius > SMALL_ANGLE_RADIUS_LIMIT_M {
			warn!("Circle radius {:.0} m exceeds {:.0} m; the small-angle lat/lon conversion will distort the path", radius, SMALL_ANGLE_RADIUS_LIMIT_M);
		}
		Self{ center, radius, period, ellipsoid: Ellipsoid::WGS84 }
	}

	/// Local ENU offset at time t [m]
	pub fn enu_offset(&self, t:f64) -> (f64, f64) {
		let theta:f64 = 2.0*consts::PI*t/self.period;
		(self.radius*theta.cos(), self.radius*theta.sin())
	}

	/// Flat-earth conversion of an east/north offset into latitude and longitude deltas.  Every degree is
	/// treated as a fixed arc on a sphere of radius a, which only holds for offsets that are small compared
	/// to the radius of the earth.  Height is left unchanged.
	pub fn small_angle_offset(&self, east:f64, north:f64) -> Geodetic {
		let deg2rad = consts::PI / 180.0;
		let dlat_deg:f64 = north / (self.ellipsoid.a*deg2rad);
		let dlon_deg:f64 = east / (self.ellipsoid.a*self.center.latitude.cos()*deg2rad);

		Geodetic::from_degrees(self.center.latitude_deg() + dlat_deg, self.center.longitude_deg() + dlon_deg, self.center.height)
	}

	pub fn position_at(&self, t:f64) -> Vector3<f64> {
		let (east, north) = self.enu_offset(t);
		self.ellipsoid.geodetic_to_ecef(&self.small_angle_offset(east, north))
	}

}

#[derive(Debug, Clone, PartialEq)]
enum Motion {
	Static(Vector3<f64>),
	Sampled(Vec<TrajectoryPoint>),
	Circular(CircularPath),
}

/// Receiver positions at a fixed interval.  Finite and restartable; positions are produced on demand
/// except for the sampled variant, which owns the points it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
	motion:Motion,
	interval:f64,
	len:usize,
}

impl Trajectory {

	pub fn fixed(position:Vector3<f64>, interval:f64, duration:f64) -> Self {
		Self{ motion: Motion::Static(position), interval, len: point_count(duration, interval) }
	}

	pub fn circular(path:CircularPath, interval:f64, duration:f64) -> Self {
		Self{ motion: Motion::Circular(path), interval, len: point_count(duration, interval) }
	}

	/// Wraps already-sampled points; they may start at any time but must advance at one fixed interval
	pub fn sampled(points:Vec<TrajectoryPoint>) -> Result<Self, InputError> {
		let interval = check_intervals(points.iter().enumerate().map(|(i, p)| (i+1, p.elapsed)))?;
		let len = points.len();
		Ok(Self{ motion: Motion::Sampled(points), interval, len })
	}

	pub fn is_static(&self) -> bool {
		match self.motion {
			Motion::Static(_) => true,
			_ => false
		}
	}

	pub fn interval(&self) -> f64 { self.interval }
	pub fn len(&self) -> usize { self.len }
	pub fn is_empty(&self) -> bool { self.len == 0 }
	pub fn duration(&self) -> f64 { (self.len as f64)*self.interval }

	pub fn point(&self, idx:usize) -> Option<TrajectoryPoint> {
		if idx >= self.len {
			return None;
		}

		let elapsed = (idx as f64)*self.interval;
		Some(match &self.motion {
			Motion::Static(p) => TrajectoryPoint{ elapsed, position: *p },
			Motion::Sampled(pts) => pts[idx],
			Motion::Circular(c) => TrajectoryPoint{ elapsed, position: c.position_at(elapsed) },
		})
	}

	/// Position at an index, holding the last point once the trajectory runs out
	pub fn position_clamped(&self, idx:usize) -> Vector3<f64> {
		let idx = idx.min(self.len.saturating_sub(1));
		self.point(idx).map(|p| p.position).unwrap_or_else(Vector3::zeros)
	}

	/// Finite-difference velocity over the interval that starts at idx [m/s]
	pub fn velocity_at(&self, idx:usize) -> Vector3<f64> {
		if self.is_static() || self.len < 2 {
			return Vector3::zeros();
		}

		let (i0, i1) = if idx + 1 < self.len { (idx, idx + 1) } else { (self.len - 2, self.len - 1) };
		(self.position_clamped(i1) - self.position_clamped(i0)) / self.interval
	}

	pub fn iter(&self) -> TrajectoryIter<'_> {
		TrajectoryIter{ trajectory: self, idx: 0 }
	}

	/// Reads `t,x,y,z` or `t,lat,lon,h` rows.  Blank lines and lines starting with '#' are skipped.
	pub fn read_csv<R:BufRead>(reader:R, format:CsvFormat, ellipsoid:&Ellipsoid) -> Result<Self, InputError> {
		let mut points:Vec<TrajectoryPoint> = vec![];
		let mut lines:Vec<usize> = vec![];

		for (n, line_result) in reader.lines().enumerate() {
			let line_num = n + 1;
			let line = line_result?;
			let trimmed = line.trim();
			if trimmed.is_empty() || trimmed.starts_with('#') {
				continue;
			}

			let fields:Vec<f64> = trimmed.split(',')
				.map(|s| s.trim().parse::<f64>())
				.collect::<Result<Vec<f64>, _>>()
				.map_err(|e| InputError::Trajectory{ line: line_num, reason: format!("{}", e) })?;

			if fields.len() != 4 {
				return Err(InputError::Trajectory{ line: line_num, reason: format!("expected 4 fields, found {}", fields.len()) });
			}

			let position = match format {
				CsvFormat::Ecef => Vector3::new(fields[1], fields[2], fields[3]),
				CsvFormat::Geodetic => {
					if fields[1].abs() > 90.0 || fields[2].abs() > 180.0 {
						return Err(InputError::Trajectory{ line: line_num, reason: format!("latitude/longitude ({}, {}) out of range", fields[1], fields[2]) });
					}
					ellipsoid.geodetic_to_ecef(&Geodetic::from_degrees(fields[1], fields[2], fields[3]))
				}
			};

			points.push(TrajectoryPoint{ elapsed: fields[0], position });
			lines.push(line_num);
		}

		let interval = check_intervals(lines.iter().cloned().zip(points.iter().map(|p| p.elapsed)))?;
		let len = points.len();
		Ok(Self{ motion: Motion::Sampled(points), interval, len })
	}

	pub fn write_csv<W:Write>(&self, writer:&mut W) -> std::io::Result<()> {
		for p in self.iter() {
			writeln!(writer, "{:.1},{:.3},{:.3},{:.3}", p.elapsed, p.position[0], p.position[1], p.position[2])?;
		}
		Ok(())
	}

}

pub struct TrajectoryIter<'a> {
	trajectory:&'a Trajectory,
	idx:usize,
}

impl<'a> Iterator for TrajectoryIter<'a> {
	type Item = TrajectoryPoint;

	fn next(&mut self) -> Option<TrajectoryPoint> {
		let p = self.trajectory.point(self.idx)?;
		self.idx += 1;
		Some(p)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		let remaining = self.trajectory.len().saturating_sub(self.idx);
		(remaining, Some(remaining))
	}
}

impl<'a> ExactSizeIterator for TrajectoryIter<'a> {}

fn point_count(duration:f64, interval:f64) -> usize {
	if duration <= 0.0 || interval <= 0.0 { 0 } else { (duration / interval).round() as usize }
}

// Returns the common interval, or the default one for a single point
fn check_intervals<I:Iterator<Item=(usize, f64)>>(mut elapsed:I) -> Result<f64, InputError> {
	let (_, t0) = elapsed.next().ok_or(InputError::EmptyTrajectory)?;
	let (line1, t1) = match elapsed.next() {
		Some(x) => x,
		None => return Ok(DEFAULT_INTERVAL_S),
	};

	let interval = t1 - t0;
	if interval <= 0.0 {
		return Err(InputError::Trajectory{ line: line1, reason: format!("elapsed time {} does not increase", t1) });
	}

	let mut t_prev = t1;
	for (line, t) in elapsed {
		if ((t - t_prev) - interval).abs() > INTERVAL_TOLERANCE_S {
			return Err(InputError::IrregularInterval{ line, elapsed: t, interval });
		}
		t_prev = t;
	}

	Ok(interval)
}
