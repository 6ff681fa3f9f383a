use clap::Parser;
use order_reconciler::cli::{self, Args};
use std::process;

fn main() {
    let args = Args::parse();
    cli::setup_logging(&args);

    if let Err(error) = cli::run(args) {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}
