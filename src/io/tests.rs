use std::convert::TryFrom;

use byteorder::{ByteOrder, LittleEndian};
use rstest::rstest;

use super::*;

fn c(re:f64, im:f64) -> Complex<f64> { Complex{ re, im } }

fn scratch(name:&str) -> PathBuf {
	std::env::temp_dir().join(format!("l1c_sim_{}_{}.bin", name, std::process::id()))
}

#[rstest]
#[case(1, Some(SampleFormat::Bits1))]
#[case(8, Some(SampleFormat::Bits8))]
#[case(16, Some(SampleFormat::Bits16))]
#[case(4, None)]
#[case(32, None)]
fn bit_depths(#[case] bits:u8, #[case] expected:Option<SampleFormat>) {
	match (SampleFormat::try_from(bits), expected) {
		(Ok(f), Some(e)) => {
			assert_eq!(f, e);
			assert_eq!(f.bit_depth(), bits);
		},
		(Err(ConfigError::UnsupportedBitDepth(b)), None) => assert_eq!(b, bits),
		(other, _) => panic!("unexpected {:?}", other),
	}
}

#[test]
fn sixteen_bit_little_endian() {
	let mut w = IqWriter::new(vec![], SampleFormat::Bits16);
	w.write_samples(&[c(1.0, -0.5), c(0.004, -1000.0)]).unwrap();
	w.finish().unwrap();

	let bytes = w.into_inner();
	assert_eq!(bytes.len(), SampleFormat::Bits16.byte_len(2));
	assert_eq!(LittleEndian::read_i16(&bytes[0..2]), 250);
	assert_eq!(LittleEndian::read_i16(&bytes[2..4]), -125);
	assert_eq!(LittleEndian::read_i16(&bytes[4..6]), 1);
	assert_eq!(LittleEndian::read_i16(&bytes[6..8]), i16::MIN);
}

#[test]
fn eight_bit_is_sixteen_bit_over_sixteen() {
	let mut w = IqWriter::new(vec![], SampleFormat::Bits8);
	w.write_samples(&[c(1.0, -1.0), c(0.1, 3.0)]).unwrap();
	let bytes = w.into_inner();
	assert_eq!(bytes.iter().map(|b| *b as i8).collect::<Vec<i8>>(), vec![15, -16, 1, 46]);
}

#[test]
fn eight_bit_saturates_strong_composites() {
	let mut w = IqWriter::new(vec![], SampleFormat::Bits8);
	w.write_samples(&[c(9.0, -9.0), c(8.12, -8.2)]).unwrap();
	let bytes:Vec<i8> = w.into_inner().iter().map(|b| *b as i8).collect();
	assert_eq!(bytes, vec![127, -128, 126, -128]);
}

#[test]
fn one_bit_packs_msb_first() {
	let mut w = IqWriter::new(vec![], SampleFormat::Bits1);
	// I,Q signs: - +, + -, - -, + +, then a lone - - that needs padding
	w.write_samples(&[c(-1.0, 1.0), c(1.0, -1.0), c(-1.0, -1.0), c(1.0, 1.0), c(-1.0, -1.0)]).unwrap();
	w.finish().unwrap();
	assert_eq!(w.samples_written(), 5);
	assert_eq!(w.into_inner(), vec![0b1001_1100, 0b1100_0000]);
}

#[test]
fn file_sink_renames_on_finish() {
	let path = scratch("finish");
	let mut sink = FileSink::create(&path, SampleFormat::Bits16).unwrap();
	sink.write_samples(&[c(0.5, 0.5); 10]).unwrap();
	sink.finish().unwrap();
	drop(sink);

	let bytes = fs::read(&path).unwrap();
	assert_eq!(bytes.len(), 40);
	fs::remove_file(&path).unwrap();
}

#[test]
fn file_sink_discards_unfinished_output() {
	let path = scratch("discard");
	let mut part = path.clone().into_os_string();
	part.push(".part");

	{
		let mut sink = FileSink::create(&path, SampleFormat::Bits8).unwrap();
		sink.write_samples(&[c(0.5, 0.5); 10]).unwrap();
		assert!(Path::new(&part).exists());
	}

	assert!(!Path::new(&part).exists());
	assert!(!path.exists());
}

#[test]
fn memory_and_counting_sinks() {
	let mut m = MemorySink::default();
	let mut n = CountingSink::default();
	for sink in [&mut m as &mut dyn SampleSink, &mut n as &mut dyn SampleSink].iter_mut() {
		sink.write_samples(&[c(1.0, 0.0); 3]).unwrap();
		sink.finish().unwrap();
	}
	assert_eq!(m.samples.len(), 3);
	assert!(m.finished);
	assert_eq!(n.samples, 3);
}
