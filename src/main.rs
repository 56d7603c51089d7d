use anyhow::Result;
use clap::Parser;

use phylosim::args::Args;
use phylosim::runner::Runner;

fn main() -> Result<()> {
    let args = Args::parse();
    let mut runner = Runner::new(args)?;
    runner.start()
}
