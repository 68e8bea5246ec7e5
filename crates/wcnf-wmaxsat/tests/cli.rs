//! Tests of the command line interface on the instances in the corpus.

#![expect(
	unused_crate_dependencies,
	reason = "only dependencies for testing are used in this file"
)]

use std::{
	ffi::OsString,
	io::Write,
	path::PathBuf,
	sync::{Arc, Mutex},
};

use expect_test::{expect, expect_file};
use pico_args::Arguments;
use wcnf_wmaxsat::Cli;

#[derive(Debug, Clone, Copy)]
/// Output stream that immediately discards all data.
struct DummyOutput;

#[derive(Debug, Clone, Default)]
/// Output stream that collects all data in a shared buffer.
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

/// Create the arguments to run the solver with `flags` on the instance `name`
/// from the corpus.
fn arguments(flags: &[&str], name: &str) -> Arguments {
	let mut args: Vec<OsString> = flags.iter().map(OsString::from).collect();
	args.push(
		PathBuf::from("./corpus/")
			.join(name)
			.with_extension("wcnf")
			.into(),
	);
	Arguments::from_vec(args)
}

/// Run the solver and return its output, or the error message if it failed.
fn run_solver(flags: &[&str], name: &str) -> Result<String, String> {
	let cli: Cli<_, _> = arguments(flags, name).try_into()?;
	let mut out = Vec::new();
	{
		let mut cli = cli.with_stdout(&mut out).with_stderr(|| DummyOutput, false);
		cli.run()?;
	}
	Ok(String::from_utf8(out).expect("invalid utf-8"))
}

/// Run the solver and compare its output to the solution file of the
/// instance.
fn check_solution(name: &str) {
	let out = run_solver(&[], name).expect("unexpected error while running the solver");
	let sol = PathBuf::from("./corpus/")
		.join(name)
		.with_extension("sol")
		.canonicalize()
		.unwrap();
	expect_file![sol].assert_eq(&out);
}

impl Write for DummyOutput {
	fn flush(&mut self) -> std::io::Result<()> {
		Ok(())
	}
	fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
		Ok(buf.len())
	}
}

impl Write for SharedBuffer {
	fn flush(&mut self) -> std::io::Result<()> {
		Ok(())
	}
	fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
		self.0.lock().unwrap().extend_from_slice(buf);
		Ok(buf.len())
	}
}

#[test]
fn test_optimal_solutions() {
	check_solution("scenario");
	check_solution("classic");
	check_solution("unsat");
}

#[test]
fn test_random_instances() {
	for name in ["random_v12", "random_v16"] {
		let out = run_solver(&[], name).unwrap();
		let sol = PathBuf::from("./corpus/")
			.join(name)
			.with_extension("sol");
		let expected = std::fs::read_to_string(sol).unwrap();
		assert!(out.starts_with(&expected), "{name}: unexpected output {out}");
		let values = out.lines().last().unwrap();
		assert!(values.starts_with("v "));
	}
}

#[test]
fn test_statistics() {
	let out = run_solver(&["-s"], "scenario").unwrap();
	let names = out
		.lines()
		.filter_map(|l| l.strip_prefix("c stat "))
		.filter_map(|l| l.split_once('=').map(|(name, _)| name))
		.collect::<Vec<_>>()
		.join(" ");
	expect!["vars hard_clauses soft_clauses searches conflicts decisions propagations final_checks peak_depth blocks early_prunes improvements best_cost solve_time"]
		.assert_eq(&names);
	assert!(out.contains("c stat best_cost=2\n"));
	assert!(out.contains("c stat searches=2\n"));
}

#[test]
fn test_time_limit() {
	let out = run_solver(&["-t", "0"], "random_v16").unwrap();
	assert_eq!(out, "s UNKNOWN\n");
}

#[test]
fn test_default_phase() {
	let out = run_solver(&["--default-phase", "true"], "classic").unwrap();
	assert!(out.starts_with("o 3\ns OPTIMUM FOUND\n"));
}

#[test]
fn test_errors() {
	expect!["clause on line 2 is not terminated by `0'"]
		.assert_eq(&run_solver(&[], "invalid").unwrap_err());
	assert!(run_solver(&[], "missing")
		.unwrap_err()
		.starts_with("unable to open"));
	assert!(run_solver(&["-s", "extra"], "scenario")
		.unwrap_err()
		.starts_with("unexpected arguments: "));
	assert!(Cli::try_from(Arguments::from_vec(Vec::new())).is_err());
	assert!(run_solver(&["-t", "soon"], "scenario").is_err());
}

#[test]
fn test_log_names() {
	let log = SharedBuffer::default();
	let cli: Cli<_, _> = arguments(&["-v", "-v"], "scenario").try_into().unwrap();
	let mut out = Vec::new();
	{
		let buf = log.clone();
		let mut cli = cli
			.with_stdout(&mut out)
			.with_stderr(move || buf.clone(), false);
		cli.run().unwrap();
	}
	let log = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
	assert!(log.contains("bind guard lit=soft[0] soft=soft[0]"));
	assert!(log.contains("decide lit=¬x1"));
	assert!(log.contains("relax soft constraint soft=soft["));
}
