use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    about = "Hazard-spotting trainer that coordinates one attempt per player",
    version
)]
pub struct Args {
    /// Collaborator endpoint that tracks attempts
    #[arg(long, default_value = "http://127.0.0.1:8787/attempts")]
    pub endpoint: String,

    /// Participant name to claim an attempt for (falls back to the saved profile)
    #[arg(long)]
    pub player: Option<String>,

    /// Optional JSON scene catalog to train on instead of the built-in set
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// JSON click script to replay instead of an interactive session
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Optional JSON profile file remembering the last player between runs
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Path to write the session event log as JSON
    #[arg(long)]
    pub event_log_json: Option<PathBuf>,

    /// Path to write the finished-scene summary as JSON
    #[arg(long)]
    pub summary_json: Option<PathBuf>,

    /// Probe the collaborator endpoint and exit instead of running scenes
    #[arg(long)]
    pub probe: bool,

    /// Print scene transitions and misses instead of the compact view
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Debug)]
pub enum Command {
    Run(RunArgs),
    Probe(ProbeArgs),
}

#[derive(Debug)]
pub struct RunArgs {
    pub endpoint: String,
    pub player: Option<String>,
    pub catalog: Option<PathBuf>,
    pub script: Option<PathBuf>,
    pub profile: Option<PathBuf>,
    pub event_log_json: Option<PathBuf>,
    pub summary_json: Option<PathBuf>,
    pub verbose: bool,
}

#[derive(Debug)]
pub struct ProbeArgs {
    pub endpoint: String,
}

pub fn parse() -> Result<Command> {
    let args = Args::parse();
    args.into_command()
}

impl Args {
    fn into_command(self) -> Result<Command> {
        if !self.endpoint.starts_with("http://") {
            bail!("--endpoint must be a plain http:// URL");
        }
        if self.probe && (self.player.is_some() || self.script.is_some()) {
            bail!("--probe cannot be combined with --player or --script");
        }

        if self.probe {
            Ok(Command::Probe(ProbeArgs {
                endpoint: self.endpoint,
            }))
        } else {
            Ok(Command::Run(RunArgs {
                endpoint: self.endpoint,
                player: self.player,
                catalog: self.catalog,
                script: self.script,
                profile: self.profile,
                event_log_json: self.event_log_json,
                summary_json: self.summary_json,
                verbose: self.verbose,
            }))
        }
    }
}
