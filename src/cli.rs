use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments for parking-provision
#[derive(Parser, Debug)]
#[command(name = "parking-provision")]
#[command(version, about = "Provision the parking-scraper service on this host (run as root)")]
pub struct Args {
    /// TOML manifest overriding the default service name, paths and sources
    #[arg(long, short = 'm')]
    pub manifest: Option<PathBuf>,
}
