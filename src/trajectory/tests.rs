use std::io::Cursor;

use crate::geodesy::{ecef_to_enu_rotation, geodetic_to_ecef};

use super::*;

fn tokyo_circle() -> CircularPath {
	CircularPath::new(Geodetic::from_degrees(35.681298, 139.766247, 100.0), 100.0, 60.0)
}

#[test]
fn circle_point_count() {
	let traj = Trajectory::circular(tokyo_circle(), 0.1, 300.0);
	assert_eq!(traj.len(), 3000);
	assert_eq!(traj.iter().count(), 3000);
	assert_eq!(traj.iter().len(), 3000);
	assert!((traj.duration() - 300.0).abs() < 1e-9);

	let last = traj.iter().last().unwrap();
	assert!((last.elapsed - 299.9).abs() < 1e-9);
}

#[test]
fn circle_closes_after_one_period() {
	let path = tokyo_circle();
	let start = path.position_at(0.0);
	let end = path.position_at(60.0);
	assert!((end - start).norm() < 1e-6);

	let traj = Trajectory::circular(path, 0.1, 300.0);
	let p0 = traj.point(0).unwrap().position;
	let p600 = traj.point(600).unwrap().position;
	assert!((p600 - p0).norm() < 1e-6);
}

#[test]
fn circle_starts_east_of_center() {
	let path = tokyo_circle();
	let center = geodetic_to_ecef(&path.center);
	let rot = ecef_to_enu_rotation(path.center.latitude, path.center.longitude);

	let enu = rot * (path.position_at(0.0) - center);
	assert!((enu[0] - 100.0).abs() < 0.5, "east offset {}", enu[0]);
	assert!(enu[1].abs() < 0.01, "north offset {}", enu[1]);
	assert!(enu[2].abs() < 0.01, "up offset {}", enu[2]);
}

#[test]
fn half_period_is_diametrically_opposite() {
	let traj = Trajectory::circular(tokyo_circle(), 0.1, 300.0);
	let center = geodetic_to_ecef(&tokyo_circle().center);

	let p0 = traj.point(0).unwrap();
	let p300 = traj.point(300).unwrap();
	assert!((p300.elapsed - 30.0).abs() < 1e-9);

	let midpoint = (p0.position + p300.position) / 2.0;
	assert!((midpoint - center).norm() < 0.01);
}

#[test]
fn iteration_restarts() {
	let traj = Trajectory::circular(tokyo_circle(), 0.1, 10.0);
	let a:Vec<TrajectoryPoint> = traj.iter().collect();
	let b:Vec<TrajectoryPoint> = traj.iter().collect();
	assert_eq!(a, b);
}

#[test]
fn csv_rows_match_fixed_format() {
	let traj = Trajectory::circular(tokyo_circle(), 0.1, 1.0);
	let mut buf:Vec<u8> = vec![];
	traj.write_csv(&mut buf).unwrap();

	let text = String::from_utf8(buf).unwrap();
	let rows:Vec<&str> = text.lines().collect();
	assert_eq!(rows.len(), 10);
	assert!(rows[0].starts_with("0.0,"));
	assert!(rows[9].starts_with("0.9,"));
	assert_eq!(rows[0].split(',').count(), 4);
	assert_eq!(rows[0].split(',').nth(1).unwrap().split('.').nth(1).unwrap().len(), 3);
}

#[test]
fn csv_reads_back_what_it_wrote() {
	let traj = Trajectory::circular(tokyo_circle(), 0.1, 5.0);
	let mut buf:Vec<u8> = vec![];
	traj.write_csv(&mut buf).unwrap();

	let read = Trajectory::read_csv(Cursor::new(buf), CsvFormat::Ecef, &Ellipsoid::WGS84).unwrap();
	assert_eq!(read.len(), 50);
	assert!((read.interval() - 0.1).abs() < 1e-9);
	for (a, b) in traj.iter().zip(read.iter()) {
		assert!((a.position - b.position).norm() < 1e-3);
	}
}

#[test]
fn geodetic_csv() {
	let text = "# t,lat,lon,h\n0.0,35.0,139.0,10.0\n0.5,35.0,139.0,10.0\n\n1.0,35.0,139.0,10.0\n";
	let traj = Trajectory::read_csv(Cursor::new(text), CsvFormat::Geodetic, &Ellipsoid::WGS84).unwrap();
	assert_eq!(traj.len(), 3);
	assert!((traj.interval() - 0.5).abs() < 1e-12);

	let expected = geodetic_to_ecef(&Geodetic::from_degrees(35.0, 139.0, 10.0));
	assert!((traj.point(2).unwrap().position - expected).norm() < 1e-6);
}

#[test]
fn csv_errors_carry_line_numbers() {
	let text = "0.0,1,2,3\n0.1,1,2\n";
	match Trajectory::read_csv(Cursor::new(text), CsvFormat::Ecef, &Ellipsoid::WGS84) {
		Err(InputError::Trajectory{ line, .. }) => assert_eq!(line, 2),
		other => panic!("unexpected {:?}", other),
	}

	let text = "0.0,1,2,3\n0.1,1,2,abc\n";
	match Trajectory::read_csv(Cursor::new(text), CsvFormat::Ecef, &Ellipsoid::WGS84) {
		Err(InputError::Trajectory{ line, .. }) => assert_eq!(line, 2),
		other => panic!("unexpected {:?}", other),
	}

	let text = "0.0,1,2,3\n0.1,1,2,3\n0.3,1,2,3\n";
	match Trajectory::read_csv(Cursor::new(text), CsvFormat::Ecef, &Ellipsoid::WGS84) {
		Err(InputError::IrregularInterval{ line, .. }) => assert_eq!(line, 3),
		other => panic!("unexpected {:?}", other),
	}

	let text = "0.2,1,2,3\n0.1,1,2,3\n";
	match Trajectory::read_csv(Cursor::new(text), CsvFormat::Ecef, &Ellipsoid::WGS84) {
		Err(InputError::Trajectory{ line, .. }) => assert_eq!(line, 2),
		other => panic!("unexpected {:?}", other),
	}

	match Trajectory::read_csv(Cursor::new(""), CsvFormat::Ecef, &Ellipsoid::WGS84) {
		Err(InputError::EmptyTrajectory) => {},
		other => panic!("unexpected {:?}", other),
	}
}

#[test]
fn static_and_velocity() {
	let p = Vector3::new(1.0, 2.0, 3.0);
	let traj = Trajectory::fixed(p, 0.1, 2.0);
	assert!(traj.is_static());
	assert_eq!(traj.len(), 20);
	assert_eq!(traj.position_clamped(500), p);
	assert_eq!(traj.velocity_at(3), Vector3::zeros());

	let pts:Vec<TrajectoryPoint> = (0..5).map(|i| TrajectoryPoint{ elapsed: (i as f64)*0.1, position: Vector3::new((i as f64)*2.0, 0.0, 0.0) }).collect();
	let traj = Trajectory::sampled(pts).unwrap();
	assert!((traj.velocity_at(0)[0] - 20.0).abs() < 1e-9);
	assert!((traj.velocity_at(4)[0] - 20.0).abs() < 1e-9);
	assert_eq!(traj.position_clamped(10)[0], 8.0);
}
