//! Input/output helpers.
//!
//! - CSV ingest (`ingest`) and structural validation (`validate`)
//! - ranked/detail exports, CSV and JSON (`export`)
//! - the build metadata document (`meta`)

pub mod export;
pub mod ingest;
pub mod meta;
pub mod validate;

pub use export::*;
pub use ingest::*;
pub use meta::*;
pub use validate::*;
