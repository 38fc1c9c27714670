//! Command-line interface for the lrtrace analysis engine.
//!
//! Analyzes an expression against the built-in arithmetic grammar (or a
//! grammar loaded from a rule file) and prints the full analysis report —
//! tokens, First/Follow sets, the encoded parsing table, and the step
//! trace — as JSON.

use anyhow::Result;
use clap::{Parser, Subcommand};
use lrtrace::{Engine, GrammarSpec};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyzes an expression and prints the report as JSON
    Analyze {
        /// Expression to analyze
        expression: String,

        /// Rule file with one `Lhs -> sym sym ...` production per line;
        /// defaults to the arithmetic expression grammar
        #[arg(short, long)]
        grammar: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Analyze {
            expression,
            grammar,
        } => {
            let spec = match grammar {
                Some(path) => GrammarSpec::parse(&std::fs::read_to_string(path)?)?,
                None => GrammarSpec::arithmetic(),
            };
            let engine = Engine::new(spec);
            let report = engine.analyze(&expression)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
