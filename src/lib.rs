//! `aipi` library crate.
//!
//! The binary (`aipi`) is a thin wrapper around this library so that:
//!
//! - the scoring pipeline is testable without spawning processes
//! - the query service can be embedded or tested in-process

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod report;
pub mod scoring;
pub mod sensitivity;
pub mod server;
