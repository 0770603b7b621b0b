use clap::Parser;
use tickerlens::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    tickerlens::cli::init_tracing();
    run(Cli::parse())
}
