use std::convert::TryFrom;

use hifitime::{Epoch, TimeScale};
use rstest::rstest;

use super::*;

#[test]
fn gps_epoch_is_week_zero() {
	let g = GnssTime::try_from(CalendarTime::new(1980, 1, 6, 0, 0, 0.0)).unwrap();
	assert_eq!(g.week, 0);
	assert_eq!(g.sow, 0.0);
}

#[rstest]
#[case(CalendarTime::new(2017, 1, 1, 0, 0, 0.0), 1930, 0.0)]
#[case(CalendarTime::new(1999, 8, 22, 0, 0, 0.0), 1024, 0.0)]
#[case(CalendarTime::new(2019, 4, 7, 0, 0, 0.0), 2048, 0.0)]
#[case(CalendarTime::new(2020, 2, 29, 12, 30, 15.0), 2094, 6.0*86400.0 + 45015.0)]
fn calendar_to_gnss(#[case] cal:CalendarTime, #[case] week:i32, #[case] sow:f64) {
	let g = GnssTime::try_from(cal).unwrap();
	assert_eq!(g.week, week);
	assert_eq!(g.sow, sow);
}

#[rstest]
#[case(GnssTime::new(1930, 0.0))]
#[case(GnssTime::new(2094, 563415.0))]
#[case(GnssTime::new(2347, 604799.0))]
#[case(GnssTime::new(1, 86400.0*3.0 + 7.0))]
fn gnss_to_calendar_and_back(#[case] g:GnssTime) {
	let cal = CalendarTime::from(g);
	assert!(cal.is_valid());
	assert_eq!(GnssTime::try_from(cal).unwrap(), g);
}

#[test]
fn normalization_rolls_week() {
	let g = GnssTime::new(100, 604800.0 + 12.5);
	assert_eq!(g.week, 101);
	assert!((g.sow - 12.5).abs() < 1e-9);

	let g = GnssTime::new(100, -1.0);
	assert_eq!(g.week, 99);
	assert!((g.sow - 604799.0).abs() < 1e-9);

	let g = GnssTime::new(2000, 604790.0).add_seconds(20.0);
	assert_eq!(g.week, 2001);
	assert!((g.sow - 10.0).abs() < 1e-9);
}

#[test]
fn difference_across_weeks() {
	let a = GnssTime::new(2000, 10.0);
	let b = GnssTime::new(1999, 604790.0);
	assert!((a.seconds_since(&b) - 20.0).abs() < 1e-9);
	assert!((b.seconds_since(&a) + 20.0).abs() < 1e-9);
}

#[test]
fn utc_offset_by_leap_seconds() {
	let utc = CalendarTime::new(2020, 1, 1, 0, 0, 0.0);
	let g = GnssTime::from_utc(&utc, 18).unwrap();
	assert_eq!(g.sow, GnssTime::try_from(utc).unwrap().sow + 18.0);
	assert_eq!(g.to_utc(18), utc);
}

#[test]
fn calendar_validity() {
	assert!(CalendarTime::new(2020, 2, 29, 0, 0, 0.0).is_valid());
	assert!(!CalendarTime::new(2019, 2, 29, 0, 0, 0.0).is_valid());
	assert!(!CalendarTime::new(2019, 13, 1, 0, 0, 0.0).is_valid());
	assert!(!CalendarTime::new(2019, 1, 1, 24, 0, 0.0).is_valid());
}

#[test]
fn epoch_time_of_week_agrees() {
	let g = GnssTime::new(2094, 302400.5);
	assert_eq!(g.to_epoch().to_time_of_week(), (2094, 302_400_500_000_000));
	assert_eq!(GnssTime::from(Epoch::from_time_of_week(2048, 7_000_000_000, TimeScale::GPST)), GnssTime::new(2048, 7.0));
}

#[test]
fn invalid_calendar_rejected() {
	assert!(GnssTime::try_from(CalendarTime::new(2019, 2, 29, 0, 0, 0.0)).is_err());
	assert!(CalendarTime::new(2019, 2, 29, 0, 0, 0.0).to_epoch().is_err());
}

#[test]
fn fractional_seconds_survive() {
	let cal = CalendarTime::new(2019, 4, 7, 1, 2, 3.5);
	let g = GnssTime::try_from(cal).unwrap();
	assert_eq!(g.week, 2048);
	assert_eq!(g.sow, 3723.5);
	assert_eq!(CalendarTime::from(g), cal);
}
