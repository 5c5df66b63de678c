//! Terminal output for the build, rank and sensitivity commands.

mod format;

pub use format::*;
