#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the mobility map toolchain.
//!
//! `compare` fetches two years of a dataset for a prefecture and either
//! writes a comparison map (`mdp`) or the labelled flow tables (`fromto`).
//! `prefectures` lists the prefecture codes accepted by `--prefecture`.
//!
//! Uses `indicatif-log-bridge` (via [`mobility_map_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and spinners never fight for the terminal.

mod compare;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mobility_map_geography_models::prefecture::PREFECTURES;

#[derive(Parser)]
#[command(name = "mobility_map", about = "Population mobility comparison maps")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two years of a dataset for a prefecture
    Compare(compare::CompareArgs),
    /// List prefecture codes, names, and regions
    Prefectures,
}

#[tokio::main]
async fn main() -> ExitCode {
    let multi = mobility_map_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Prefectures => {
            println!("{:<6} {:<10} REGION", "CODE", "NAME");
            println!("{}", "-".repeat(30));
            for p in &PREFECTURES {
                println!("{:<6} {:<10} {}", format!("{:02}", p.code), p.name, p.region);
            }
            ExitCode::SUCCESS
        }
        Commands::Compare(args) => match compare::run(args, &multi).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("{e}");
                eprintln!("{}", e.user_message());
                ExitCode::FAILURE
            }
        },
    }
}
