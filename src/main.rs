//! CLI entry point for the binomial noise reconstruction probe

use blackout::io::cli::{Cli, Runner, init_tracing};
use clap::Parser;

fn main() -> blackout::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    let runner = Runner::new(cli);
    runner.run().map(|_| ())
}
