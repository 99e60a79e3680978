//! Binary entry point for axle-chain.

use clap::Parser;

use axle_chain::cli;
use axle_chain::config::Cli;

fn main() {
    env_logger::init();

    // `Cli::parse()` would call `clap`'s own `.exit()` on a usage error,
    // which exits with code 2; spec.md's CLI contract wants 1 for both
    // usage and operational errors, so the usage-error path is handled
    // explicitly instead.
    let cli_args = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = cli::run(cli_args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
