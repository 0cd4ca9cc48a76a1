//! GPS L1C ranging codes and the navigation data stream modulated onto the data component

pub mod code;
pub mod message;
pub mod symbols;

pub use self::code::{CodeComponent, CodePair, l1c_data_code, l1c_pilot_code};
pub use self::message::{NavFrame, Subframes};
pub use self::symbols::{ConvolutionalEncoder, encode_symbols};
