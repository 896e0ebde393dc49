use anyhow::Result;
use battprov::keygen::{run, KeygenArgs};
use battprov::logging;
use clap::Parser;

fn main() -> Result<()> {
    let args = KeygenArgs::parse();
    logging::init();
    run(&args)
}
