use anyhow::Result;

mod cli;
mod coordinator;
mod events;
mod geometry;
mod profile;
mod remote;
mod runner;
mod script;
mod session;

use cli::Command;

#[tokio::main]
async fn main() -> Result<()> {
    let command = cli::parse()?;

    env_logger::init();

    match command {
        Command::Run(args) => runner::execute(args).await,
        Command::Probe(args) => runner::probe(args).await,
    }
}
