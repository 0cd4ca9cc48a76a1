use crate::constants::WGS84_SEMI_MAJOR_AXIS_METERS;
use crate::ephemeris::fixtures;
use crate::geodesy::{geodetic_to_ecef, Geodetic};

use super::*;

fn no_iono() -> RangeModel {
	RangeModel::new(IonoUtcModel{ enable: false, ..IonoUtcModel::default() })
}

fn overhead(velocity:Vector3<f64>, clock_bias:f64) -> SatelliteState {
	SatelliteState {
		position: Vector3::new(WGS84_SEMI_MAJOR_AXIS_METERS + 20.0e6, 0.0, 0.0),
		velocity,
		clock_bias,
		clock_drift: 0.0,
	}
}

#[test]
fn satellite_overhead() {
	let rx = Vector3::new(WGS84_SEMI_MAJOR_AXIS_METERS, 0.0, 0.0);
	let obs = no_iono().compute_range(&overhead(Vector3::zeros(), 0.0), &rx, &Vector3::zeros(), &fixtures::TOE);

	assert!(obs.elevation.to_degrees() > 89.99);
	assert!((obs.distance - 20.0e6).abs() < 1.0);
	assert_eq!(obs.pseudorange, obs.distance);
	assert_eq!(obs.iono_delay, 0.0);
	assert_eq!(obs.time, fixtures::TOE);
}

#[test]
fn clock_terms_enter_pseudorange() {
	let rx = Vector3::new(WGS84_SEMI_MAJOR_AXIS_METERS, 0.0, 0.0);
	let sat = overhead(Vector3::zeros(), 1.0e-6);

	let model = RangeModel{ receiver_clock_bias: 2.0e-6, ..no_iono() };
	let obs = model.compute_range(&sat, &rx, &Vector3::zeros(), &fixtures::TOE);
	assert!((obs.pseudorange - (obs.distance - C*1.0e-6 - C*2.0e-6)).abs() < 1e-6);
}

#[test]
fn receding_satellite_has_positive_rate() {
	let rx = Vector3::new(WGS84_SEMI_MAJOR_AXIS_METERS, 0.0, 0.0);
	let obs = no_iono().compute_range(&overhead(Vector3::new(500.0, 0.0, 0.0), 0.0), &rx, &Vector3::zeros(), &fixtures::TOE);
	assert!((obs.range_rate - 500.0).abs() < 1e-3);

	// A receiver chasing the satellite at the same speed sees no range change
	let obs = no_iono().compute_range(&overhead(Vector3::new(500.0, 0.0, 0.0), 0.0), &rx, &Vector3::new(500.0, 0.0, 0.0), &fixtures::TOE);
	assert!(obs.range_rate.abs() < 1e-3);
}

#[test]
fn iono_delay_lengthens_pseudorange() {
	let rx = geodetic_to_ecef(&Geodetic::from_degrees(35.681298, 139.766247, 100.0));
	let model = RangeModel::new(fixtures::broadcast_iono());
	let eph = fixtures::store();

	let mut seen = 0;
	for prn in eph.prns() {
		let e = eph.select(prn, &fixtures::TOE).unwrap();
		let obs = model.observe(e, &rx, &Vector3::zeros(), &fixtures::TOE).unwrap();
		if obs.elevation > 0.0 {
			seen += 1;
			assert!(obs.iono_delay > 0.0 && obs.iono_delay < 100.0);
			let sat = e.propagate(&fixtures::TOE).unwrap();
			assert!((obs.pseudorange - (obs.distance - C*sat.clock_bias + obs.iono_delay)).abs() < 1e-6);
		}
		assert!(obs.distance > 19.0e6 && obs.distance < 34.0e6);
		assert!(obs.azimuth >= 0.0 && obs.azimuth < 2.0*std::f64::consts::PI);
	}
	assert!(seen >= 4, "only {} satellites visible", seen);
}

#[test]
fn observe_propagates_failures() {
	let rx = Vector3::new(WGS84_SEMI_MAJOR_AXIS_METERS, 0.0, 0.0);
	let eph = Ephemeris::new(crate::ephemeris::EphemerisRecord{ valid: false, ..fixtures::record(4) });
	assert_eq!(
		no_iono().observe(&eph, &rx, &Vector3::zeros(), &fixtures::TOE),
		Err(PropagationError::InvalidEphemeris{ prn: 4 }));
}
