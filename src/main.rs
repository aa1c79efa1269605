use clap::Parser;
use stopsim::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
