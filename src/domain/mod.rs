//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input tables (`IndicatorDefinition`, `Record`, `Provider`)
//! - the resolved indicator value domain (`ValueDomain`) and `Score`
//! - scoring policies and ranked outputs (`Policy`, `RankedTable`)

pub mod types;

pub use types::*;
