use clap::Parser;
use hemeroteca::cli::{Cli, run_cli};
use hemeroteca::output::OutputFormatter;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run_cli(cli) {
        OutputFormatter::error(&format!("Error: {}", e));
        std::process::exit(1);
    }
}
