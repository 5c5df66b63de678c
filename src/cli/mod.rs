//! Command-line parsing for the AI Pluralism Index.
//!
//! Argument parsing stays separate from the scoring code; `app` turns these
//! structs into `BuildConfig` / `ServeConfig`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Level, Policy};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "aipi", version, about = "AI Pluralism Index scoring pipeline")]
pub struct Cli {
    /// Log filter (e.g. `info`, `aipi=debug`). Falls back to AIPI_LOG.
    #[arg(long, global = true)]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score the coded records and write all build artifacts.
    Build(BuildArgs),
    /// Print a ranked table without writing anything.
    Rank(RankArgs),
    /// Compare policies and run pillar ablation on the provider ranking.
    Sensitivity(BuildArgs),
    /// Serve the build artifacts over HTTP.
    Serve(ServeArgs),
}

/// Where inputs are read from and artifacts written to.
#[derive(Debug, Args, Clone)]
pub struct BuildArgs {
    /// Project root; inputs are read from `<root>/data`. Falls back to AIPI_ROOT.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Output directory. Falls back to AIPI_BUILD_DIR, then `<root>/build`.
    #[arg(long)]
    pub build_dir: Option<PathBuf>,

    /// Rows shown per table in terminal summaries.
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

#[derive(Debug, Args, Clone)]
pub struct RankArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Treatment of Unknown values.
    #[arg(long, value_enum, default_value_t = Policy::Evidence)]
    pub policy: Policy,

    /// Rank providers or individual systems.
    #[arg(long, value_enum, default_value_t = Level::Provider)]
    pub level: Level,
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    /// Directory holding the build artifacts. Falls back to AIPI_BUILD_DIR.
    #[arg(long)]
    pub build_dir: Option<PathBuf>,

    /// Project root used to locate `<root>/build`. Falls back to AIPI_ROOT.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Listen address. Falls back to AIPI_BIND, then 127.0.0.1:8000.
    #[arg(long)]
    pub bind: Option<String>,
}
