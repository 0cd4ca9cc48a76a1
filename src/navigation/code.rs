//! L1C ranging codes (IS-GPS-800, section 3.2.2.1).  Each component code is a length 10223 Weil
//! sequence with a fixed 7-chip expansion inserted at a PRN-specific position.

use std::sync::Arc;

use crate::constants::L1C_CODE_LENGTH;
use crate::error::ConfigError;

pub const LEGENDRE_LENGTH:usize = 10223;
pub const EXPANSION:[u8; 7] = [0, 1, 1, 0, 1, 0, 0];

/// Which half of the L1C signal a code spreads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeComponent {
	Data,
	Pilot,
}

/// Weil index and 1-based insertion index of one ranging code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeilParameters {
	pub w:usize,
	pub p:usize,
}

// IS-GPS-800, Table 3.2-2: Weil index w and insertion index p for L1CD
const L1CD_WEIL_INDEX:[(usize, usize); 63] = [
	(5097,   181),	// PRN 01
	(5110,   359),	// PRN 02
	(5079,    72),	// PRN 03
	(4403,  1110),	// PRN 04
	(4121,  1480),	// PRN 05
	(5043,  5034),	// PRN 06
	(5042,  4622),	// PRN 07
	(5104,     1),	// PRN 08
	(4940,  4547),	// PRN 09
	(5035,   826),	// PRN 10
	(4372,  6284),	// PRN 11
	(5064,  4195),	// PRN 12
	(5084,   368),	// PRN 13
	(5048,     1),	// PRN 14
	(4950,  4796),	// PRN 15
	(5019,   523),	// PRN 16
	(5076,   151),	// PRN 17
	(3736,   713),	// PRN 18
	(4993,  9850),	// PRN 19
	(5060,  5734),	// PRN 20
	(5061,    34),	// PRN 21
	(5096,  6142),	// PRN 22
	(4983,   190),	// PRN 23
	(4783,   644),	// PRN 24
	(4991,   467),	// PRN 25
	(4815,  5384),	// PRN 26
	(4443,   801),	// PRN 27
	(4769,   594),	// PRN 28
	(4879,  4450),	// PRN 29
	(4894,  9437),	// PRN 30
	(4985,  4307),	// PRN 31
	(5056,  5906),	// PRN 32
	(4921,   378),	// PRN 33
	(5036,  9448),	// PRN 34
	(4812,  9432),	// PRN 35
	(4838,  5849),	// PRN 36
	(4855,  5547),	// PRN 37
	(4904,  9546),	// PRN 38
	(4753,  9132),	// PRN 39
	(4483,   403),	// PRN 40
	(4942,  3766),	// PRN 41
	(4813,     3),	// PRN 42
	(4957,   684),	// PRN 43
	(4618,  9711),	// PRN 44
	(4669,   333),	// PRN 45
	(4969,  6124),	// PRN 46
	(5031, 10216),	// PRN 47
	(5038,  4251),	// PRN 48
	(4740,  9893),	// PRN 49
	(4073,  9884),	// PRN 50
	(4843,  4627),	// PRN 51
	(4979,  4449),	// PRN 52
	(4867,  9798),	// PRN 53
	(4964,   985),	// PRN 54
	(5025,  4272),	// PRN 55
	(4579,   126),	// PRN 56
	(4390, 10024),	// PRN 57
	(4763,   434),	// PRN 58
	(4612,  1029),	// PRN 59
	(4784,   561),	// PRN 60
	(3716,   289),	// PRN 61
	(4703,   638),	// PRN 62
	(4851,  4353),	// PRN 63
];

// IS-GPS-800, Table 3.2-2: Weil index w and insertion index p for L1CP
const L1CP_WEIL_INDEX:[(usize, usize); 63] = [
	(5111,   412),	// PRN 01
	(5109,   161),	// PRN 02
	(5108,     1),	// PRN 03
	(5106,   303),	// PRN 04
	(5103,   207),	// PRN 05
	(5101,  4971),	// PRN 06
	(5100,  4496),	// PRN 07
	(5098,     5),	// PRN 08
	(5095,  4557),	// PRN 09
	(5094,   485),	// PRN 10
	(5093,   253),	// PRN 11
	(5091,  4676),	// PRN 12
	(5090,     1),	// PRN 13
	(5081,    66),	// PRN 14
	(5080,  4485),	// PRN 15
	(5069,   282),	// PRN 16
	(5068,   193),	// PRN 17
	(5054,  5211),	// PRN 18
	(5044,   729),	// PRN 19
	(5027,  4848),	// PRN 20
	(5026,   982),	// PRN 21
	(5014,  5955),	// PRN 22
	(5004,  9805),	// PRN 23
	(4980,   670),	// PRN 24
	(4915,   464),	// PRN 25
	(4909,    29),	// PRN 26
	(4893,   429),	// PRN 27
	(4885,   394),	// PRN 28
	(4832,   616),	// PRN 29
	(4824,  9457),	// PRN 30
	(4591,  4429),	// PRN 31
	(3706,  4771),	// PRN 32
	(5092,   365),	// PRN 33
	(4986,  9705),	// PRN 34
	(4965,  9489),	// PRN 35
	(4920,  4193),	// PRN 36
	(4917,  9947),	// PRN 37
	(4858,   824),	// PRN 38
	(4847,   864),	// PRN 39
	(4790,   347),	// PRN 40
	(4770,   677),	// PRN 41
	(4318,  6544),	// PRN 42
	(4126,  6312),	// PRN 43
	(3961,  9804),	// PRN 44
	(3790,   278),	// PRN 45
	(4911,  9461),	// PRN 46
	(4881,   444),	// PRN 47
	(4827,  4839),	// PRN 48
	(4795,  4144),	// PRN 49
	(4789,  9875),	// PRN 50
	(4725,   197),	// PRN 51
	(4675,  1156),	// PRN 52
	(4539,  4674),	// PRN 53
	(4535, 10035),	// PRN 54
	(4458,  4504),	// PRN 55
	(4197,     5),	// PRN 56
	(4096,  9937),	// PRN 57
	(3484,   430),	// PRN 58
	(3481,     5),	// PRN 59
	(3393,   355),	// PRN 60
	(3175,   909),	// PRN 61
	(2360,  1622),	// PRN 62
	(1852,  6284),	// PRN 63
];

pub fn weil_parameters(prn:u8, component:CodeComponent) -> Result<WeilParameters, ConfigError> {
	if prn < 1 || prn > 63 {
		return Err(ConfigError::InvalidPrn(prn));
	}

	let (w, p) = match component {
		CodeComponent::Data  => L1CD_WEIL_INDEX[(prn - 1) as usize],
		CodeComponent::Pilot => L1CP_WEIL_INDEX[(prn - 1) as usize],
	};
	Ok(WeilParameters{ w, p })
}

/// Legendre sequence: L(0) = 0, L(k) = 1 exactly when k is a nonzero quadratic residue mod 10223
pub fn legendre_sequence() -> Vec<u8> {
	let mut ans:Vec<u8> = vec![0; LEGENDRE_LENGTH];
	for i in 1..LEGENDRE_LENGTH {
		ans[(i*i) % LEGENDRE_LENGTH] = 1;
	}
	ans
}

/// W(k; w) = L(k) xor L((k + w) mod 10223)
pub fn weil_sequence(legendre:&[u8], w:usize) -> Vec<u8> {
	(0..LEGENDRE_LENGTH).map(|k| legendre[k] ^ legendre[(k + w) % LEGENDRE_LENGTH]).collect()
}

/// Code as 0/1 chips
pub fn l1c_code_bits(prn:u8, component:CodeComponent) -> Result<Vec<u8>, ConfigError> {
	let WeilParameters{ w, p } = weil_parameters(prn, component)?;
	let weil = weil_sequence(&legendre_sequence(), w);

	let mut ans:Vec<u8> = Vec::with_capacity(L1C_CODE_LENGTH);
	ans.extend_from_slice(&weil[..(p-1)]);
	ans.extend_from_slice(&EXPANSION);
	ans.extend_from_slice(&weil[(p-1)..]);
	Ok(ans)
}

/// Code as antipodal chips, 0 -> +1 and 1 -> -1
pub fn l1c_code(prn:u8, component:CodeComponent) -> Result<Vec<i8>, ConfigError> {
	Ok(l1c_code_bits(prn, component)?.into_iter().map(|b| if b == 0 { 1 } else { -1 }).collect())
}

pub fn l1c_data_code(prn:u8) -> Result<Vec<i8>, ConfigError> { l1c_code(prn, CodeComponent::Data) }

pub fn l1c_pilot_code(prn:u8) -> Result<Vec<i8>, ConfigError> { l1c_code(prn, CodeComponent::Pilot) }

/// Both component codes of one PRN, shared between the channel and anything else that needs them
#[derive(Debug, Clone)]
pub struct CodePair {
	pub data:Arc<Vec<i8>>,
	pub pilot:Arc<Vec<i8>>,
}

impl CodePair {

	pub fn new(prn:u8) -> Result<Self, ConfigError> {
		Ok(Self{ data: Arc::new(l1c_data_code(prn)?), pilot: Arc::new(l1c_pilot_code(prn)?) })
	}

}
