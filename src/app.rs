//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the real main:
//! - parses CLI arguments and environment settings
//! - initializes logging
//! - dispatches to build / rank / sensitivity / serve

use clap::Parser;
use tracing::info;

use crate::cli::{BuildArgs, Command, RankArgs, ServeArgs};
use crate::config::Settings;
use crate::domain::{BuildConfig, Level, ServeConfig};
use crate::error::{AppError, EXIT_SERVE};

pub mod pipeline;

/// Entry point for the `aipi` binary.
pub fn run() -> Result<(), AppError> {
    let settings = Settings::from_env();
    let cli = crate::cli::Cli::parse();
    crate::logging::init_logging(&settings.resolve_log(cli.log.clone()));

    match cli.command {
        Command::Build(args) => handle_build(build_config(&args, &settings)),
        Command::Rank(args) => handle_rank(&args, &settings),
        Command::Sensitivity(args) => handle_sensitivity(build_config(&args, &settings)),
        Command::Serve(args) => handle_serve(serve_config(&args, &settings)),
    }
}

fn handle_build(config: BuildConfig) -> Result<(), AppError> {
    let run = pipeline::run_build(&config)?;
    let meta = pipeline::build_meta(&run.inputs, &run.build);
    let written = pipeline::write_artifacts(&config.build_dir, &run.build, &meta)?;

    println!(
        "{}",
        crate::report::format_build_summary(&run, &written, config.top_n)
    );
    Ok(())
}

fn handle_rank(args: &RankArgs, settings: &Settings) -> Result<(), AppError> {
    let config = build_config(&args.build, settings);
    let run = pipeline::run_build(&config)?;

    let table = match args.level {
        Level::Provider => run.build.providers(args.policy),
        Level::System => run.build.systems(args.policy),
    };
    println!("{}", crate::report::format_ranked_table(table, config.top_n));
    Ok(())
}

fn handle_sensitivity(config: BuildConfig) -> Result<(), AppError> {
    let run = pipeline::run_build(&config)?;
    let report = crate::sensitivity::analyze(&run.build);
    println!("{}", crate::report::format_sensitivity(&report));
    Ok(())
}

fn handle_serve(config: ServeConfig) -> Result<(), AppError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::new(EXIT_SERVE, format!("Failed to start runtime: {e}")))?;

    info!(bind = %config.bind, "starting query service");
    runtime.block_on(crate::server::run(config))
}

pub fn build_config(args: &BuildArgs, settings: &Settings) -> BuildConfig {
    let root = settings.resolve_root(args.root.clone());
    let build_dir = settings.resolve_build_dir(args.build_dir.clone(), &root);
    BuildConfig {
        root,
        build_dir,
        top_n: args.top,
    }
}

pub fn serve_config(args: &ServeArgs, settings: &Settings) -> ServeConfig {
    let root = settings.resolve_root(args.root.clone());
    ServeConfig {
        build_dir: settings.resolve_build_dir(args.build_dir.clone(), &root),
        bind: settings.resolve_bind(args.bind.clone()),
    }
}
