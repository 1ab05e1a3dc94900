#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "credits-fin")]
#[command(about = "Record FIN-CLOSE deals and bid on open deals across branches")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "credits-fin.toml")]
    pub config: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: cli::Command,
}
