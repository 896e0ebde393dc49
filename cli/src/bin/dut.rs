use anyhow::Result;
use battprov::dut::{run, DutArgs};
use battprov::logging;
use battprov_dut::CommandOutcome;
use clap::Parser;

fn main() -> Result<()> {
    let args = DutArgs::parse();
    logging::init();
    if let Some(CommandOutcome::Verified(report)) = run(&args)? {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
