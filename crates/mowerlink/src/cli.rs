//! Clap derive structures for the `mowerlink` CLI.

use clap::{Args, Parser, Subcommand};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// mowerlink -- pair and inspect Husqvarna Automower BLE devices
#[derive(Debug, Parser)]
#[command(
    name = "mowerlink",
    version,
    about = "Scan, probe, and pair Automower robots over Bluetooth LE",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Mower profile to use
    #[arg(long, short = 'p', env = "MOWERLINK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan for advertising mowers
    #[command(alias = "s")]
    Scan(ScanArgs),

    /// Read the identity of a device without pairing it
    Probe(ProbeArgs),

    /// Pair a mower and persist its profile
    Pair(PairArgs),

    /// Manage stored mower profiles
    #[command(alias = "prof")]
    Profiles(ProfilesArgs),
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Listening window in seconds
    #[arg(long, short = 'w', default_value = "10")]
    pub window: u64,

    /// Show every advertising device, not just supported mowers
    #[arg(long, short = 'a')]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// BLE address of the device (XX:XX:XX:XX:XX:XX)
    pub address: String,
}

#[derive(Debug, Args)]
pub struct PairArgs {
    /// BLE address of the mower (XX:XX:XX:XX:XX:XX)
    pub address: String,

    /// Operator PIN, if the mower has one
    #[arg(long)]
    pub pin: Option<String>,

    /// Profile name to store the pairing under
    #[arg(long, default_value = "mower")]
    pub name: String,
}

#[derive(Debug, Args)]
pub struct ProfilesArgs {
    #[command(subcommand)]
    pub command: ProfilesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfilesCommand {
    /// List stored profiles
    #[command(alias = "ls")]
    List,

    /// Show one profile in detail
    Show {
        /// Profile name (defaults to the active profile)
        name: Option<String>,
    },

    /// Remove a profile
    #[command(alias = "rm")]
    Remove {
        /// Profile name
        name: String,
    },
}
