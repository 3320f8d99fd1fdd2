//! Request gate handlers

pub mod object;
pub mod preflight;

pub use object::*;
pub use preflight::*;
