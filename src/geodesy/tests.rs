use rstest::rstest;

use super::*;

#[test]
fn equator_prime_meridian() {
	let xyz = geodetic_to_ecef(&Geodetic::from_degrees(0.0, 0.0, 0.0));
	assert!((xyz[0] - WGS84_SEMI_MAJOR_AXIS_METERS).abs() < 1e-6);
	assert!(xyz[1].abs() < 1e-6);
	assert!(xyz[2].abs() < 1e-6);
}

#[test]
fn north_pole_is_semi_minor_axis() {
	let xyz = geodetic_to_ecef(&Geodetic::from_degrees(90.0, 0.0, 0.0));
	assert!((xyz[2] - Ellipsoid::WGS84.b()).abs() < 1e-6);
}

#[rstest]
#[case(35.681298, 139.766247, 100.0)]
#[case(0.0, 0.0, 0.0)]
#[case(-33.8688, 151.2093, 58.0)]
#[case(89.9, -45.0, 1200.0)]
#[case(-89.5, 170.0, -30.0)]
#[case(51.4779, -0.0015, 45.0)]
#[case(10.0, -179.9, 20200000.0)]
fn geodetic_round_trip(#[case] lat:f64, #[case] lon:f64, #[case] h:f64) {
	let p = Geodetic::from_degrees(lat, lon, h);
	let q = ecef_to_geodetic(&geodetic_to_ecef(&p));

	assert!((q.latitude_deg() - lat).abs() < 1e-9, "latitude {} vs {}", q.latitude_deg(), lat);
	assert!((q.longitude_deg() - lon).abs() < 1e-9, "longitude {} vs {}", q.longitude_deg(), lon);
	assert!((q.height - h).abs() < 1e-3, "height {} vs {}", q.height, h);
}

#[test]
fn center_of_earth() {
	let p = ecef_to_geodetic(&Vector3::new(0.0, 0.0, 0.0));
	assert_eq!(p.height, -WGS84_SEMI_MAJOR_AXIS_METERS);
}

#[test]
fn enu_rotation_is_orthonormal() {
	let r = ecef_to_enu_rotation(0.6, 2.4);
	let eye = r * r.transpose();
	for i in 0..3 {
		for j in 0..3 {
			let expected = if i == j { 1.0 } else { 0.0 };
			assert!((eye[(i,j)] - expected).abs() < 1e-12);
		}
	}
}

#[test]
fn up_points_along_ecef_x_at_origin() {
	let r = ecef_to_enu_rotation(0.0, 0.0);
	let enu = r * Vector3::new(1.0, 0.0, 0.0);
	assert!((enu[2] - 1.0).abs() < 1e-12);

	let enu = r * Vector3::new(0.0, 1.0, 0.0);
	assert!((enu[0] - 1.0).abs() < 1e-12);

	let enu = r * Vector3::new(0.0, 0.0, 1.0);
	assert!((enu[1] - 1.0).abs() < 1e-12);
}

#[rstest]
#[case(Vector3::new(0.0, 1.0, 0.0), 0.0, 0.0)]
#[case(Vector3::new(1.0, 0.0, 0.0), consts::FRAC_PI_2, 0.0)]
#[case(Vector3::new(-1.0, 0.0, 1.0), 1.5*consts::PI, consts::FRAC_PI_4)]
#[case(Vector3::new(0.0, -1.0, -1.0), consts::PI, -consts::FRAC_PI_4)]
fn az_el(#[case] enu:Vector3<f64>, #[case] az:f64, #[case] el:f64) {
	let (a, e) = enu_to_az_el(&enu);
	assert!((a - az).abs() < 1e-12);
	assert!((e - el).abs() < 1e-12);
}
