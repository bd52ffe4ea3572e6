//! kvtx CLI
//!
//! Command-line driver for the kvtx in-memory store.
//!
//! # Commands
//!
//! - `demo` - Write three keys from one thread and read one back from another
//! - `exec` - Apply sets in one update, then read keys in one view
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// kvtx command-line driver.
#[derive(Parser)]
#[command(name = "kvtx")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (lock acquire/release events)
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the writer/reader demo on two threads
    Demo {
        /// Start both threads at once instead of reading after the write
        #[arg(short, long)]
        race: bool,
    },

    /// Apply sets in one update transaction, then read keys in one view
    Exec {
        /// Entry to write, as KEY=VALUE (repeatable)
        #[arg(short, long = "set", value_name = "KEY=VALUE")]
        sets: Vec<String>,

        /// Key to read back (repeatable)
        #[arg(short, long = "get", value_name = "KEY")]
        gets: Vec<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Demo { race } => {
            commands::demo::run(race)?;
        }
        Commands::Exec {
            sets,
            gets,
            format,
        } => {
            commands::exec::run(&sets, &gets, &format)?;
        }
        Commands::Version => {
            println!("kvtx CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("kvtx Core v{}", kvtx_core::VERSION);
        }
    }

    Ok(())
}
