//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了CLI命令行接口。

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "oxembed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(long, global = true, default_value = "warn", help = "Log filter when RUST_LOG is unset")]
    pub log: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(name = "normalize", about = "Normalize a wire payload into a side-loaded document")]
    Normalize(NormalizeArgs),

    #[command(name = "check", about = "Validate a configuration file")]
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
pub struct NormalizeArgs {
    #[arg(short, long, help = "Path to the TOML configuration")]
    pub config: PathBuf,

    #[arg(short = 't', long = "type", help = "Primary model type (e.g. superVillain)")]
    pub type_key: String,

    #[arg(short, long, help = "Treat the payload as a collection response")]
    pub array: bool,

    #[arg(long, help = "Id of the requested record in a single-record response")]
    pub id: Option<String>,

    #[arg(short, long, help = "Pretty-print the output")]
    pub pretty: bool,

    #[arg(help = "Payload file; reads stdin when omitted")]
    pub input: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    #[arg(short, long, help = "Path to the TOML configuration")]
    pub config: PathBuf,

    #[arg(short, long, help = "Show relationships and embedded attributes")]
    pub verbose: bool,
}

mod check;
mod normalize;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    crate::telemetry::init_tracing(&cli.log);

    match &cli.command {
        Commands::Normalize(args) => normalize::execute(args),
        Commands::Check(args) => check::execute(args),
    }
}
