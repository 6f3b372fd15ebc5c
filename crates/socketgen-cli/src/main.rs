//! socketgen CLI - Packet dispatcher generator
//!
//! Commands:
//! - `socketgen init` - Write a starter packet.proto
//! - `socketgen gen` - Generate handlers and dispatchers for target languages
//! - `socketgen inspect` - Print the payloads detected in the schema
//! - `socketgen languages` - List supported language tags

use clap::{Parser, Subcommand};
use config::Overrides;
use std::path::PathBuf;

mod config;
mod generate;
mod init;
mod inspect;
mod logging;
mod protoc;

#[derive(Parser)]
#[command(name = "socketgen")]
#[command(author, version, about = "Generate packet dispatchers from a protobuf oneof", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter packet.proto
    Init {
        /// Schema file to create (default: packet.proto)
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Generate handlers and dispatchers
    Gen {
        /// Target languages (go, ts, python, csharp, dart, php, ruby, kotlin, java)
        #[arg(short, long, value_delimiter = ',')]
        lang: Vec<String>,

        /// Output directory (default: ./gen)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Schema file (default: packet.proto)
        #[arg(short, long)]
        proto: Option<PathBuf>,

        /// Pre-compiled FileDescriptorSet; skips running protoc on the schema
        #[arg(long)]
        descriptor_set: Option<PathBuf>,

        /// Also generate protobuf bindings with protoc
        #[arg(long)]
        protoc: bool,

        /// Skip the serve loop helpers
        #[arg(long)]
        no_serve: bool,

        /// Skip the send helpers
        #[arg(long)]
        no_send: bool,

        /// Path to socketgen.toml (default: ./socketgen.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the payloads detected in the schema
    Inspect {
        /// Schema file (default: packet.proto)
        #[arg(short, long)]
        proto: Option<PathBuf>,

        /// Pre-compiled FileDescriptorSet
        #[arg(long)]
        descriptor_set: Option<PathBuf>,

        /// Path to socketgen.toml (default: ./socketgen.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the model as JSON
        #[arg(long)]
        json: bool,
    },

    /// List supported language tags
    Languages,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_logging(logging::level_from_flags(cli.verbose, cli.quiet));

    match cli.command {
        Commands::Init { path, force } => {
            init::run(path, force)?;
        }
        Commands::Gen {
            lang,
            out,
            proto,
            descriptor_set,
            protoc,
            no_serve,
            no_send,
            config,
        } => {
            let overrides = Overrides {
                proto,
                out_dir: out,
                languages: lang,
                protoc,
                descriptor_set,
                no_serve,
                no_send,
            };
            generate::run(config, overrides)?;
        }
        Commands::Inspect {
            proto,
            descriptor_set,
            config,
            json,
        } => {
            let overrides = Overrides {
                proto,
                descriptor_set,
                ..Overrides::default()
            };
            inspect::run(config, overrides, json)?;
        }
        Commands::Languages => {
            for language in socketgen_core::EmitterRegistry::new().supported_languages() {
                println!("{language}");
            }
        }
    }

    Ok(())
}
