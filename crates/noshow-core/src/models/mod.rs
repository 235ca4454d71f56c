//! Domain models for appointment scoring.

mod appointment;
mod date_range;
mod scored;

pub use appointment::*;
pub use date_range::*;
pub use scored::*;
