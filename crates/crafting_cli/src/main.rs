use std::env;
use std::io;
use std::process::ExitCode;

use crafting_cli::{parse_args, run, usage_text, ParsedArgs};
use tracing::info;

mod bootstrap;

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}

fn run_cli() -> Result<(), String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let (kind, config) = match parse_args(&args)? {
        ParsedArgs::Help => {
            println!("{}", usage_text());
            return Ok(());
        }
        ParsedArgs::Command { kind, config } => (kind, config),
    };

    bootstrap::init_tracing();
    info!(command = ?kind, "crafting_startup");
    run(kind, config, &mut io::stdout())
}
