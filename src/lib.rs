pub mod constants;
pub mod error;

pub mod time;
pub mod geodesy;
pub mod trajectory;

pub mod ephemeris;
pub mod ionosphere;
pub mod range;

pub mod navigation;
pub mod synth;

pub mod config;
pub mod io;

pub use error::{Error, Result};

