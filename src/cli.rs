// CLI definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "g67_driver")]
#[command(author, version, about = "Onikuma G67 per-key RGB driver")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Print every report sent to the keyboard
    #[arg(long, global = true)]
    pub monitor: bool,

    /// Show raw hex dump alongside decoded output (with --monitor)
    #[arg(long, global = true)]
    pub hex: bool,

    /// Do not touch hardware; record reports in memory instead
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Driver config file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Device profile (JSON), overrides the config file
    #[arg(long, global = true, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Chunk scheduling policy, overrides the config file
    #[arg(long, global = true, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Chunks per tick for the round-robin policy
    #[arg(long, global = true, value_name = "N")]
    pub per_tick: Option<usize>,

    /// Frames per second for streaming commands
    #[arg(long, global = true)]
    pub fps: Option<f32>,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Every active chunk on every tick
    Full,
    /// N chunks per tick in rotation
    RoundRobin,
    /// Only chunks that changed
    Dirty,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List connected keyboards
    #[command(visible_alias = "ls")]
    List {
        /// Show every HID interface of the keyboard, not just lighting
        #[arg(long)]
        all: bool,
    },

    /// Show profile, memory layout and active chunks
    #[command(visible_alias = "i")]
    Info,

    /// Show the key table
    #[command(visible_alias = "k")]
    Keys,

    /// Light every key with one color until Ctrl+C
    Solid {
        r: u8,
        g: u8,
        b: u8,
    },

    /// Light a single key until Ctrl+C, everything else black
    Key {
        /// Key name (see `keys`)
        name: String,
        r: u8,
        g: u8,
        b: u8,
    },

    /// Switch to host mode and blank every key
    Blank,

    /// Print encoded reports without sending them
    Dump {
        /// Only this chunk base
        #[arg(long)]
        chunk: Option<usize>,
        /// Color for every mapped key
        #[arg(long, num_args = 3, value_names = ["R", "G", "B"])]
        color: Option<Vec<u8>>,
    },
}
