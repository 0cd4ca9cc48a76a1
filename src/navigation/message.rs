//! Legacy navigation message: ten 30-bit words per subframe, five subframes per 30 s frame
//! (IS-GPS-200, section 20.3).  Words are held right-justified in a u32 with the data bits in
//! 29..6 and parity in 5..0; bits 31 and 30 carry D29* and D30* of the previous word while parity
//! is being computed.

use std::f64::consts;

use crate::constants::{POW2_M5, POW2_M19, POW2_M24, POW2_M27, POW2_M29, POW2_M30, POW2_M31,
	POW2_M33, POW2_M43, POW2_M50, POW2_M55};
use crate::ephemeris::EphemerisRecord;
use crate::ionosphere::IonoUtcModel;
use crate::time::GnssTime;

pub const WORDS_PER_SUBFRAME:usize = 10;
pub const SUBFRAMES_PER_FRAME:usize = 5;
pub const BITS_PER_WORD:usize = 30;

/// Previous subframe 5 followed by the five subframes of the current frame
pub const FRAME_WORDS:usize = WORDS_PER_SUBFRAME*(SUBFRAMES_PER_FRAME + 1);
pub const FRAME_BITS:usize = FRAME_WORDS*BITS_PER_WORD;

pub const SUBFRAME_PERIOD_S:f64 = 6.0;
pub const FRAME_PERIOD_S:f64 = 30.0;

const PREAMBLE:u32 = 0x8B;
const DATA_MASK:u32 = 0x3FFF_FFC0;

// Parity equations of IS-GPS-200 Table 20-XIV as masks over the data bits
const PARITY_MASK:[u32; 6] = [0x3B1F3480, 0x1D8F9A40, 0x2EC7CD00, 0x1763E680, 0x2BB1F340, 0x0B7A89C0];

const SBF4_PAGE18_SV_ID:u32 = 56;
const SBF4_PAGE25_SV_ID:u32 = 63;
const SBF5_PAGE25_SV_ID:u32 = 51;
const DATA_ID:u32 = 1;

fn parity_bit(prev:u32, mask:u32, d:u32) -> u32 { (prev + (mask & d).count_ones()) % 2 }

/// Appends the six parity bits to a word.  `source` holds the data bits in 29..6 and the previous
/// word's D29*/D30* in bits 31/30.  With `nib` set, bits 23 and 24 are solved so that D29 and D30
/// of the result are zero (words 2 and 10).  The returned data bits are inverted when D30* is set.
pub fn compute_parity(source:u32, nib:bool) -> u32 {
	let mut d:u32 = source & DATA_MASK;
	let d29:u32 = (source >> 31) & 0x1;
	let d30:u32 = (source >> 30) & 0x1;

	if nib {
		if parity_bit(d30, PARITY_MASK[4], d) == 1 {
			d ^= 0x1 << 6;
		}
		if parity_bit(d29, PARITY_MASK[5], d) == 1 {
			d ^= 0x1 << 7;
		}
	}

	let mut word:u32 = if d30 == 1 { d ^ DATA_MASK } else { d };

	word |= parity_bit(d29, PARITY_MASK[0], d) << 5;
	word |= parity_bit(d30, PARITY_MASK[1], d) << 4;
	word |= parity_bit(d29, PARITY_MASK[2], d) << 3;
	word |= parity_bit(d30, PARITY_MASK[3], d) << 2;
	word |= parity_bit(d30, PARITY_MASK[4], d) << 1;
	word |= parity_bit(d29, PARITY_MASK[5], d);

	word & 0x3FFF_FFFF
}

// Scales a value into a field and wraps it to the field width
fn field(x:f64, scale:f64, bits:u32) -> u32 {
	let raw = (x / scale).round() as i64;
	(raw as u32) & (((1u64 << bits) - 1) as u32)
}

/// Raw subframe words with the parity bits still zero.  The transmit week and TOW are added when a
/// frame is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subframes {
	pub words:[[u32; WORDS_PER_SUBFRAME]; SUBFRAMES_PER_FRAME],
}

impl Subframes {

	pub fn encode(eph:&EphemerisRecord, iono:&IonoUtcModel) -> Self {
		let pi = consts::PI;

		let toe = field(eph.toe.sow, 16.0, 16);
		let toc = field(eph.toc.sow, 16.0, 16);
		let iode = (eph.iode as u32) & 0xFF;
		let iodc = (eph.iodc as u32) & 0x3FF;
		let deltan = field(eph.deltan/pi, POW2_M43, 16);
		let cuc = field(eph.cuc, POW2_M29, 16);
		let cus = field(eph.cus, POW2_M29, 16);
		let cic = field(eph.cic, POW2_M29, 16);
		let cis = field(eph.cis, POW2_M29, 16);
		let crc = field(eph.crc, POW2_M5, 16);
		let crs = field(eph.crs, POW2_M5, 16);
		let ecc = field(eph.ecc, POW2_M33, 32);
		let sqrta = field(eph.sqrta, POW2_M19, 32);
		let m0 = field(eph.m0/pi, POW2_M31, 32);
		let omg0 = field(eph.omg0/pi, POW2_M31, 32);
		let inc0 = field(eph.inc0/pi, POW2_M31, 32);
		let aop = field(eph.aop/pi, POW2_M31, 32);
		let omgdot = field(eph.omgdot/pi, POW2_M43, 24);
		let idot = field(eph.idot/pi, POW2_M43, 14);
		let af0 = field(eph.af0, POW2_M31, 22);
		let af1 = field(eph.af1, POW2_M43, 16);
		let af2 = field(eph.af2, POW2_M55, 8);
		let tgd = field(eph.tgd, POW2_M31, 8);
		let svhlth = (eph.svhlth as u32) & 0x3F;
		let code_l2 = (eph.code_l2 as u32) & 0x3;
		let ura:u32 = 0;

		// Almanac reference for subframe 5 page 25
		let wna = (eph.toe.week.rem_euclid(256)) as u32;
		let toa = field(eph.toe.sow, 4096.0, 8);

		let tlm = PREAMBLE << 22;
		let how = |id:u32| id << 8;

		let mut words = [[0u32; WORDS_PER_SUBFRAME]; SUBFRAMES_PER_FRAME];

		// Subframe 1: clock and health.  Week number goes into word 3 at frame assembly.
		words[0] = [
			tlm, how(1),
			(code_l2 << 18) | (ura << 14) | (svhlth << 8) | ((iodc >> 8) << 6),
			0, 0, 0,
			tgd << 6,
			((iodc & 0xFF) << 22) | (toc << 6),
			(af2 << 22) | (af1 << 6),
			af0 << 8,
		];

		// Subframe 2: ephemeris part 1
		words[1] = [
			tlm, how(2),
			(iode << 22) | (crs << 6),
			(deltan << 14) | ((m0 >> 24) << 6),
			(m0 & 0xFFFFFF) << 6,
			(cuc << 14) | ((ecc >> 24) << 6),
			(ecc & 0xFFFFFF) << 6,
			(cus << 14) | ((sqrta >> 24) << 6),
			(sqrta & 0xFFFFFF) << 6,
			toe << 14,
		];

		// Subframe 3: ephemeris part 2
		words[2] = [
			tlm, how(3),
			(cic << 14) | ((omg0 >> 24) << 6),
			(omg0 & 0xFFFFFF) << 6,
			(cis << 14) | ((inc0 >> 24) << 6),
			(inc0 & 0xFFFFFF) << 6,
			(crc << 14) | ((aop >> 24) << 6),
			(aop & 0xFFFFFF) << 6,
			omgdot << 6,
			(iode << 22) | (idot << 8),
		];

		// Subframe 4: page 18 when ionosphere and UTC data are available, otherwise the dummy page 25
		words[3] = if iono.valid {
			let alpha0 = field(iono.alpha0, POW2_M30, 8);
			let alpha1 = field(iono.alpha1, POW2_M27, 8);
			let alpha2 = field(iono.alpha2, POW2_M24, 8);
			let alpha3 = field(iono.alpha3, POW2_M24, 8);
			let beta0 = field(iono.beta0, 2048.0, 8);
			let beta1 = field(iono.beta1, 16384.0, 8);
			let beta2 = field(iono.beta2, 65536.0, 8);
			let beta3 = field(iono.beta3, 65536.0, 8);
			let a0 = field(iono.a0, POW2_M30, 32);
			let a1 = field(iono.a1, POW2_M50, 24);
			let tot = field(iono.tot as f64, 4096.0, 8);
			let wnt = (iono.wnt.rem_euclid(256)) as u32;
			let dtls = (iono.dtls as u32) & 0xFF;
			let wnlsf = (iono.wnlsf.rem_euclid(256)) as u32;
			let dn = (iono.dn as u32) & 0xFF;
			let dtlsf = (iono.dtlsf as u32) & 0xFF;

			[
				tlm, how(4),
				(DATA_ID << 28) | (SBF4_PAGE18_SV_ID << 22) | (alpha0 << 14) | (alpha1 << 6),
				(alpha2 << 22) | (alpha3 << 14) | (beta0 << 6),
				(beta1 << 22) | (beta2 << 14) | (beta3 << 6),
				a1 << 6,
				(a0 >> 8) << 6,
				((a0 & 0xFF) << 22) | (tot << 14) | (wnt << 6),
				(dtls << 22) | (wnlsf << 14) | (dn << 6),
				dtlsf << 22,
			]
		} else {
			[tlm, how(4), (DATA_ID << 28) | (SBF4_PAGE25_SV_ID << 22), 0, 0, 0, 0, 0, 0, 0]
		};

		// Subframe 5: page 25 with the almanac reference time and week
		words[4] = [tlm, how(5), (DATA_ID << 28) | (SBF5_PAGE25_SV_ID << 22) | (toa << 14) | (wna << 6), 0, 0, 0, 0, 0, 0, 0];

		Self{ words }
	}

}

/// Start of the 30 s frame containing g
pub fn frame_start(g:&GnssTime) -> GnssTime {
	GnssTime::new(g.week, ((g.sow + 0.5) / FRAME_PERIOD_S).floor() * FRAME_PERIOD_S)
}

/// Parity-encoded words of one frame plus the subframe 5 that preceded it
#[derive(Debug, Clone, PartialEq)]
pub struct NavFrame {
	/// Start of the first new subframe; the carried subframe 5 began 6 s earlier
	pub g0:GnssTime,
	pub words:Vec<u32>,
}

impl NavFrame {

	/// Builds the first frame of a run, synthesizing the preceding subframe 5 as well
	pub fn generate(sbf:&Subframes, g:&GnssTime) -> Self {
		let g0 = frame_start(g);
		let mut words:Vec<u32> = Vec::with_capacity(FRAME_WORDS);

		let tow = (g0.sow as u32) / 6;
		let mut prev:u32 = 0;
		for (iwrd, raw) in sbf.words[4].iter().enumerate() {
			let mut w = *raw;
			if iwrd == 1 {
				w |= (tow & 0x1FFFF) << 13;
			}
			prev = compute_parity(w | ((prev << 30) & 0xC000_0000), iwrd == 1 || iwrd == 9);
			words.push(prev);
		}

		Self::append_subframes(g0, words, sbf)
	}

	/// Next frame, carrying over this frame's subframe 5 so the transmitted stream stays continuous
	pub fn next(&self, sbf:&Subframes, g:&GnssTime) -> Self {
		let g0 = frame_start(g);
		let start = WORDS_PER_SUBFRAME*SUBFRAMES_PER_FRAME;
		let mut words:Vec<u32> = Vec::with_capacity(FRAME_WORDS);
		words.extend_from_slice(&self.words[start..]);

		Self::append_subframes(g0, words, sbf)
	}

	fn append_subframes(g0:GnssTime, mut words:Vec<u32>, sbf:&Subframes) -> Self {
		let wn = (g0.week.rem_euclid(1024)) as u32;
		let mut tow = (g0.sow as u32) / 6;
		let mut prev:u32 = words.last().cloned().unwrap_or(0);

		for (isbf, subframe) in sbf.words.iter().enumerate() {
			tow += 1;
			for (iwrd, raw) in subframe.iter().enumerate() {
				let mut w = *raw;
				if isbf == 0 && iwrd == 2 {
					w |= (wn & 0x3FF) << 20;
				}
				if iwrd == 1 {
					w |= (tow & 0x1FFFF) << 13;
				}
				prev = compute_parity(w | ((prev << 30) & 0xC000_0000), iwrd == 1 || iwrd == 9);
				words.push(prev);
			}
		}

		Self{ g0, words }
	}

	/// Transmitted bits, most significant bit of each word first
	pub fn bits(&self) -> Vec<u8> {
		let mut ans:Vec<u8> = Vec::with_capacity(FRAME_BITS);
		for w in self.words.iter() {
			for shift in (0..BITS_PER_WORD).rev() {
				ans.push(((w >> shift) & 0x1) as u8);
			}
		}
		ans
	}

}
