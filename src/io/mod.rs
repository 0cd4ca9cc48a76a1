use std::convert::TryFrom;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, warn};
use num_complex::Complex;
use serde::{Serialize, Deserialize};

use crate::error::ConfigError;

#[cfg(test)]
mod tests;

/// Counts per unit amplitude in 16-bit output
pub const FULL_SCALE_16:f64 = 250.0;

/// Interleaved I/Q sample encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleFormat {
	/// Sign bits, I then Q, packed most significant bit first
	Bits1,
	Bits8,
	Bits16,
}

impl SampleFormat {

	pub fn bit_depth(&self) -> u8 {
		match self {
			SampleFormat::Bits1 => 1,
			SampleFormat::Bits8 => 8,
			SampleFormat::Bits16 => 16,
		}
	}

	/// Output size in bytes for a number of complex samples
	pub fn byte_len(&self, samples:usize) -> usize {
		match self {
			SampleFormat::Bits1 => (2*samples + 7) / 8,
			SampleFormat::Bits8 => 2*samples,
			SampleFormat::Bits16 => 4*samples,
		}
	}

}

impl TryFrom<u8> for SampleFormat {
	type Error = ConfigError;

	fn try_from(bits:u8) -> Result<Self, ConfigError> {
		match bits {
			1  => Ok(SampleFormat::Bits1),
			8  => Ok(SampleFormat::Bits8),
			16 => Ok(SampleFormat::Bits16),
			_  => Err(ConfigError::UnsupportedBitDepth(bits)),
		}
	}
}

/// Destination of the composite baseband stream
pub trait SampleSink {
	fn write_samples(&mut self, samples:&[Complex<f64>]) -> io::Result<()>;

	/// Flushes everything written; a sink that is dropped without finishing discards its output
	fn finish(&mut self) -> io::Result<()>;
}

/// Quantizes samples into one of the interleaved I/Q formats
pub struct IqWriter<W:Write> {
	inner:W,
	format:SampleFormat,
	bit_buffer:u8,
	bit_count:u8,
	samples:usize,
}

impl<W:Write> IqWriter<W> {

	pub fn new(inner:W, format:SampleFormat) -> Self {
		Self{ inner, format, bit_buffer: 0, bit_count: 0, samples: 0 }
	}

	pub fn format(&self) -> SampleFormat { self.format }

	pub fn samples_written(&self) -> usize { self.samples }

	pub fn get_ref(&self) -> &W { &self.inner }

	pub fn into_inner(self) -> W { self.inner }

	fn quantize_16(x:f64) -> i16 {
		(x * FULL_SCALE_16).round().max(i16::MIN as f64).min(i16::MAX as f64) as i16
	}

	// 16-bit counts over sixteen, saturated rather than wrapped
	fn quantize_8(x:f64) -> i8 {
		(Self::quantize_16(x) >> 4).max(i8::MIN as i16).min(i8::MAX as i16) as i8
	}

	fn push_bit(&mut self, negative:bool) -> io::Result<()> {
		self.bit_buffer = (self.bit_buffer << 1) | (negative as u8);
		self.bit_count += 1;
		if self.bit_count == 8 {
			self.inner.write_u8(self.bit_buffer)?;
			self.bit_buffer = 0;
			self.bit_count = 0;
		}
		Ok(())
	}

	pub fn write_sample(&mut self, s:&Complex<f64>) -> io::Result<()> {
		match self.format {
			SampleFormat::Bits16 => {
				self.inner.write_i16::<LittleEndian>(Self::quantize_16(s.re))?;
				self.inner.write_i16::<LittleEndian>(Self::quantize_16(s.im))?;
			},
			SampleFormat::Bits8 => {
				self.inner.write_i8(Self::quantize_8(s.re))?;
				self.inner.write_i8(Self::quantize_8(s.im))?;
			},
			SampleFormat::Bits1 => {
				self.push_bit(s.re < 0.0)?;
				self.push_bit(s.im < 0.0)?;
			},
		}
		self.samples += 1;
		Ok(())
	}

	/// Pads and writes any partially filled 1-bit byte, then flushes
	pub fn flush(&mut self) -> io::Result<()> {
		if self.bit_count > 0 {
			let byte = self.bit_buffer << (8 - self.bit_count);
			self.inner.write_u8(byte)?;
			self.bit_buffer = 0;
			self.bit_count = 0;
		}
		self.inner.flush()
	}

}

impl<W:Write> SampleSink for IqWriter<W> {

	fn write_samples(&mut self, samples:&[Complex<f64>]) -> io::Result<()> {
		for s in samples {
			self.write_sample(s)?;
		}
		Ok(())
	}

	fn finish(&mut self) -> io::Result<()> { self.flush() }

}

/// Writes to `<path>.part` and only moves the file into place on `finish`.  Dropping an unfinished
/// sink removes the partial file.
pub struct FileSink {
	writer:IqWriter<BufWriter<File>>,
	part_path:PathBuf,
	path:PathBuf,
	finished:bool,
}

impl FileSink {

	pub fn create<P:AsRef<Path>>(path:P, format:SampleFormat) -> io::Result<Self> {
		let path = path.as_ref().to_path_buf();
		let mut part = path.clone().into_os_string();
		part.push(".part");
		let part_path = PathBuf::from(part);

		let file = File::create(&part_path)?;
		debug!("Writing {:?} samples to {}", format, part_path.display());
		Ok(Self{ writer: IqWriter::new(BufWriter::new(file), format), part_path, path, finished: false })
	}

	pub fn path(&self) -> &Path { &self.path }

	pub fn samples_written(&self) -> usize { self.writer.samples_written() }

}

impl SampleSink for FileSink {

	fn write_samples(&mut self, samples:&[Complex<f64>]) -> io::Result<()> { self.writer.write_samples(samples) }

	fn finish(&mut self) -> io::Result<()> {
		if self.finished {
			return Ok(());
		}
		self.writer.flush()?;
		self.writer.get_ref().get_ref().sync_all()?;
		fs::rename(&self.part_path, &self.path)?;
		self.finished = true;
		Ok(())
	}

}

impl Drop for FileSink {
	fn drop(&mut self) {
		if !self.finished {
			if let Err(e) = fs::remove_file(&self.part_path) {
				warn!("Unable to remove partial output {}: {}", self.part_path.display(), e);
			}
		}
	}
}

/// Keeps the composite samples in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
	pub samples:Vec<Complex<f64>>,
	pub finished:bool,
}

impl SampleSink for MemorySink {

	fn write_samples(&mut self, samples:&[Complex<f64>]) -> io::Result<()> {
		self.samples.extend_from_slice(samples);
		Ok(())
	}

	fn finish(&mut self) -> io::Result<()> {
		self.finished = true;
		Ok(())
	}

}

/// Discards the samples but counts them
#[derive(Debug, Clone, Copy, Default)]
pub struct CountingSink {
	pub samples:usize,
}

impl SampleSink for CountingSink {

	fn write_samples(&mut self, samples:&[Complex<f64>]) -> io::Result<()> {
		self.samples += samples.len();
		Ok(())
	}

	fn finish(&mut self) -> io::Result<()> { Ok(()) }

}
