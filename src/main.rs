use clap::Parser;
use etfbalance::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
