//! Rate 1/2, constraint length 7 convolutional code (G1 = 171, G2 = 133 octal) turning 50 bps
//! navigation bits into 100 sps symbols.

use super::message::NavFrame;

pub const CONSTRAINT_LENGTH:usize = 7;
pub const SYMBOLS_PER_BIT:usize = 2;
pub const SYMBOL_RATE_HZ:f64 = 100.0;

fn fec(x:u8) -> (u8, u8) {

	let bit6:u8 = (x >> 6) & 0x1;
	let bit5:u8 = (x >> 5) & 0x1;
	let bit4:u8 = (x >> 4) & 0x1;
	let bit3:u8 = (x >> 3) & 0x1;

	// Both G1 and G2 skip bit2

	let bit1:u8 = (x >> 1) & 0x1;
	let bit0:u8 = x & 0x1;

	let g1:u8 = bit6 ^ bit5 ^ bit4 ^ bit3 ^        bit0;
	let g2:u8 = bit6 ^        bit4 ^ bit3 ^ bit1 ^ bit0;

	(g1, g2)

}

/// Shift register holding the newest bit in bit 6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConvolutionalEncoder {
	state:u8,
}

impl ConvolutionalEncoder {

	pub fn new() -> Self { Self::default() }

	pub fn state(&self) -> u8 { self.state }

	/// Shifts one bit in and returns the (G1, G2) symbol pair
	pub fn push(&mut self, bit:u8) -> (u8, u8) {
		self.state = (self.state >> 1) | ((bit & 0x1) << 6);
		fec(self.state)
	}

	pub fn encode(&mut self, bits:&[u8]) -> Vec<u8> {
		let mut ans:Vec<u8> = Vec::with_capacity(bits.len()*SYMBOLS_PER_BIT);
		for b in bits {
			let (g1, g2) = self.push(*b);
			ans.push(g1);
			ans.push(g2);
		}
		ans
	}

}

/// Encodes from a cleared register
pub fn encode(bits:&[u8]) -> Vec<u8> {
	ConvolutionalEncoder::new().encode(bits)
}

/// Symbols of a frame as signs ready to multiply the data code: 0 maps to +1 and 1 to -1
pub fn encode_symbols(frame:&NavFrame) -> Vec<i8> {
	encode(&frame.bits()).into_iter().map(|s| if s == 0 { 1 } else { -1 }).collect()
}
