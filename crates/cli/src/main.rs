// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod calculator;
mod replay;

#[cfg(test)]
mod tests;

use avkorting_persistence::Persistence;
use calculator::LinearOffsetCalculator;
use clap::Parser;
use replay::{CaseReport, Script, replay};
use std::path::PathBuf;
use time::Month;
use tracing::info;

/// Avkorting Replay - runs case events through the income-offset ledger
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON script of cases and events.
    script: PathBuf,

    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Percentage of countable income that is offset.
    #[arg(long, default_value_t = 40)]
    rate_percent: i64,

    /// Annual income that is never offset.
    #[arg(long, default_value_t = 0)]
    exempt_amount: i64,

    /// Month (1-12) in which the base amount is regulated.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=12))]
    regulation_month: u8,

    /// Pretty-print the resulting ledgers.
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let calculator: LinearOffsetCalculator = LinearOffsetCalculator {
        rate_percent: args.rate_percent,
        exempt_amount: args.exempt_amount,
        regulation_month: Month::try_from(args.regulation_month)?,
    };

    let raw: String = std::fs::read_to_string(&args.script)?;
    let script: Script = serde_json::from_str(&raw)?;
    let reports: Vec<CaseReport> = replay(script, &calculator, &persistence)?;

    let output: String = if args.pretty {
        serde_json::to_string_pretty(&reports)?
    } else {
        serde_json::to_string(&reports)?
    };
    println!("{output}");

    Ok(())
}
