//! Executable entry point of the `wcnf-wmaxsat` solver.

#![expect(
	unused_crate_dependencies,
	reason = "dependencies are used by the library part of the crate"
)]

use std::process::ExitCode;

use pico_args::Arguments;
use wcnf_wmaxsat::Cli;

/// Print the usage of the command and the given error message.
fn usage_error(msg: &str) -> ExitCode {
	eprintln!(
		"{msg}\n\nUSAGE: wcnf-wmaxsat [-v...] [-s] [-t <time limit>] [--default-phase <bool>] <FILE>"
	);
	ExitCode::FAILURE
}

fn main() -> ExitCode {
	let args = Arguments::from_env();
	let mut cli = match Cli::try_from(args) {
		Ok(cli) => cli,
		Err(msg) => return usage_error(&msg),
	};
	match cli.run() {
		Ok(()) => ExitCode::SUCCESS,
		Err(msg) => {
			eprintln!("error: {msg}");
			ExitCode::FAILURE
		}
	}
}
