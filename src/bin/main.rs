/// donotation CLI
///
/// Runs, checks and dumps `do function` source files.
use donotation_core::cli;

fn main() {
    if let Err(e) = cli::run_cli() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
