use anyhow::Result;
use battprov::logging;
use battprov::writer::{run, WriterArgs};
use clap::Parser;

fn main() -> Result<()> {
    let args = WriterArgs::parse();
    logging::init();
    run(&args)
}
