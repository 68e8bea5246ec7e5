//! Command line front-end for the `wmaxsat` solver, which finds optimal
//! solutions of weighted MaxSAT instances given in the weighted DIMACS (WCNF)
//! format.
//!
//! The output follows the conventions of the MaxSAT evaluations: the cost of
//! the solution is printed on a `o` line, the status on a `s` line, and the
//! values of the variables on a `v` line.

mod trace;

use std::{
	collections::HashMap,
	fmt::{self, Display},
	fs::File,
	io::{self, BufReader, Write},
	num::NonZeroI32,
	path::PathBuf,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc, Mutex, Once,
	},
	time::{Duration, Instant},
};

use itertools::Itertools;
use pico_args::Arguments;
use tracing::{debug, info, warn};
use tracing_subscriber::fmt::MakeWriter;
use wmaxsat::{
	weighted_maxsat, LoadedInstance, MaxSatHandle, SolveResult, Solver, TermId, TermSignal,
	WcnfInstance, Weight,
};

use crate::trace::{create_subscriber, lock_names, LitMap, LitName};
#[cfg(test)]
use codspeed_criterion_compat as _;

/// Set when the process has received an interrupt signal.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Ensures that the interrupt handler is installed only once per process.
static INTERRUPT_HANDLER: Once = Once::new();

#[derive(Debug, Clone)]
/// Command line interface for the `wcnf-wmaxsat` solver.
pub struct Cli<Stdout, Stderr> {
	/// Path to the WCNF instance file.
	path: PathBuf,
	/// Whether to print statistics about the search process.
	statistics: bool,
	/// Time limit after which the search is interrupted.
	time_limit: Option<Duration>,
	/// The value assigned to a variable when the search branches on it.
	default_phase: bool,
	/// Level of verbosity of the log messages.
	verbose: u8,

	/// Output stream for the solution.
	stdout: Stdout,
	/// Factory of output streams for the log messages.
	stderr: Stderr,
	/// Whether to use ANSI color codes in the log messages.
	ansi_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Status line printed when the search has ended.
enum Status {
	/// The solution is proven optimal.
	Optimal,
	/// A solution was found, but the search was interrupted before it was
	/// proven optimal.
	Satisfiable,
	/// The hard clauses cannot be satisfied.
	Unsatisfiable,
	/// The search was interrupted before any solution was found.
	Unknown,
}

impl<Stdout, Stderr> Cli<Stdout, Stderr>
where
	Stdout: Write,
	Stderr: for<'writer> MakeWriter<'writer> + Clone + Send + Sync + 'static,
{
	/// Print a line to the solution stream.
	fn output(&mut self, line: impl Display) -> Result<(), String> {
		writeln!(self.stdout, "{line}").map_err(|e| format!("unable to write output: {e}"))
	}

	/// Print the value of a statistic as a comment line.
	fn print_statistic(&mut self, name: &str, value: impl Display) -> Result<(), String> {
		self.output(format_args!("c stat {name}={value}"))
	}

	/// Read the instance, find an optimal solution, and print the result.
	pub fn run(&mut self) -> Result<(), String> {
		let start = Instant::now();
		let lit_map: LitMap = Arc::new(Mutex::new(HashMap::new()));
		let subscriber = create_subscriber(
			self.verbose,
			self.stderr.clone(),
			self.ansi_color,
			Arc::clone(&lit_map),
		);
		let _guard = tracing::subscriber::set_default(subscriber);

		INTERRUPT_HANDLER.call_once(|| {
			if let Err(err) = ctrlc::set_handler(|| INTERRUPTED.store(true, Ordering::SeqCst)) {
				warn!(%err, "unable to install interrupt handler");
			}
		});

		let file = File::open(&self.path)
			.map_err(|e| format!("unable to open `{}': {e}", self.path.display()))?;
		let instance = WcnfInstance::from_reader(BufReader::new(file)).map_err(|e| e.to_string())?;
		info!(
			file = %self.path.display(),
			num_vars = instance.num_vars(),
			num_hard = instance.hard().len(),
			num_soft = instance.soft().len(),
			"read instance"
		);

		let mut slv = Solver::default();
		slv.set_default_phase(self.default_phase);
		let loaded = instance.load(&mut slv);
		{
			let mut names = lock_names(&lit_map);
			for (i, &atom) in loaded.atoms().iter().enumerate() {
				if let Some(lit) = NonZeroI32::new(i32::from(slv.internalize(atom))) {
					let _ = names.insert(lit, LitName::Var(i + 1, true));
					let _ = names.insert(-lit, LitName::Var(i + 1, false));
				}
			}
		}

		let deadline = self.time_limit.map(|t| start + t);
		slv.set_terminate_callback(Some(move || {
			if INTERRUPTED.load(Ordering::SeqCst) || deadline.is_some_and(|d| Instant::now() >= d) {
				TermSignal::Terminate
			} else {
				TermSignal::Continue
			}
		}));

		let (result, selected) = weighted_maxsat(&mut slv, loaded.soft(), loaded.weights());
		let improvements = MaxSatHandle::lookup(&slv)
			.map_or(0, |h| h.get(&slv).statistics().improvements());
		let status = match result {
			SolveResult::Satisfied => Status::Optimal,
			SolveResult::Unsatisfiable => Status::Unsatisfiable,
			SolveResult::Unknown if improvements > 0 => {
				// The best solution is recreated without interruption
				slv.set_terminate_callback(None::<fn() -> TermSignal>);
				Status::Satisfiable
			}
			SolveResult::Unknown => Status::Unknown,
		};
		debug!(?result, ?status, selected = selected.len(), "optimisation ended");

		let status = if matches!(status, Status::Optimal | Status::Satisfiable) {
			self.print_solution(&mut slv, &loaded, &selected, status)?
		} else {
			status
		};
		if matches!(status, Status::Unsatisfiable | Status::Unknown) {
			self.output(format_args!("s {status}"))?;
		}

		if self.statistics {
			self.print_statistics(&slv, &instance, start.elapsed())?;
		}
		info!(%status, elapsed = ?start.elapsed(), "finished");
		Ok(())
	}

	/// Find an assignment in which the `selected` soft formulas hold, and print
	/// its cost, the given status, and the values of the variables.
	///
	/// Returns the status that was printed, which differs from `status` only if
	/// no such assignment could be found.
	fn print_solution(
		&mut self,
		slv: &mut Solver,
		loaded: &LoadedInstance,
		selected: &[TermId],
		status: Status,
	) -> Result<Status, String> {
		slv.push();
		for &formula in selected {
			slv.assert_term(formula);
		}
		let status = match slv.check_sat() {
			SolveResult::Satisfied => {
				let cost: Weight = loaded
					.soft()
					.iter()
					.zip_eq(loaded.weights())
					.filter(|&(&formula, _)| slv.value(formula) != Some(true))
					.map(|(_, w)| w)
					.sum();
				let values: String = loaded
					.atoms()
					.iter()
					.map(|&atom| if slv.value(atom) == Some(true) { '1' } else { '0' })
					.collect();
				self.output(format_args!("o {cost}"))?;
				self.output(format_args!("s {status}"))?;
				self.output(format_args!("v {values}"))?;
				status
			}
			SolveResult::Unsatisfiable => Status::Unsatisfiable,
			SolveResult::Unknown => Status::Unknown,
		};
		let _ = slv.pop();
		Ok(status)
	}

	/// Print the statistics of the instance and the search as comment lines.
	fn print_statistics(
		&mut self,
		slv: &Solver,
		instance: &WcnfInstance,
		elapsed: Duration,
	) -> Result<(), String> {
		self.print_statistic("vars", instance.num_vars())?;
		self.print_statistic("hard_clauses", instance.hard().len())?;
		self.print_statistic("soft_clauses", instance.soft().len())?;
		let stats = slv.search_statistics();
		self.print_statistic("searches", stats.searches())?;
		self.print_statistic("conflicts", stats.conflicts())?;
		self.print_statistic("decisions", stats.decisions())?;
		self.print_statistic("propagations", stats.propagations())?;
		self.print_statistic("final_checks", stats.final_checks())?;
		self.print_statistic("peak_depth", stats.peak_depth())?;
		if let Some(handle) = MaxSatHandle::lookup(slv) {
			let plugin = handle.get(slv);
			self.print_statistic("blocks", plugin.statistics().blocks())?;
			self.print_statistic("early_prunes", plugin.statistics().early_prunes())?;
			self.print_statistic("improvements", plugin.statistics().improvements())?;
			self.print_statistic("best_cost", plugin.best_cost())?;
		}
		self.print_statistic("solve_time", elapsed.as_secs_f64())
	}

	/// Replace the output stream for the solution.
	pub fn with_stdout<W: Write>(self, out: W) -> Cli<W, Stderr> {
		Cli {
			path: self.path,
			statistics: self.statistics,
			time_limit: self.time_limit,
			default_phase: self.default_phase,
			verbose: self.verbose,
			stdout: out,
			stderr: self.stderr,
			ansi_color: self.ansi_color,
		}
	}

	/// Replace the factory of output streams for the log messages.
	pub fn with_stderr<W>(self, err: W, ansi_color: bool) -> Cli<Stdout, W>
	where
		W: for<'writer> MakeWriter<'writer> + Clone + Send + Sync + 'static,
	{
		Cli {
			path: self.path,
			statistics: self.statistics,
			time_limit: self.time_limit,
			default_phase: self.default_phase,
			verbose: self.verbose,
			stdout: self.stdout,
			stderr: err,
			ansi_color,
		}
	}
}

impl TryFrom<Arguments> for Cli<io::Stdout, fn() -> io::Stderr> {
	type Error = String;

	fn try_from(mut args: Arguments) -> Result<Self, Self::Error> {
		let mut verbose = 0;
		while args.contains(["-v", "--verbose"]) {
			verbose += 1;
		}
		let statistics = args.contains(["-s", "--statistics"]);
		let time_limit = args
			.opt_value_from_fn(["-t", "--time-limit"], parse_time_limit)
			.map_err(|e| e.to_string())?;
		let default_phase = args
			.opt_value_from_str("--default-phase")
			.map_err(|e| e.to_string())?
			.unwrap_or(false);
		let path: PathBuf = args.free_from_str().map_err(|e| e.to_string())?;

		let remaining = args.finish();
		if !remaining.is_empty() {
			return Err(format!(
				"unexpected arguments: {}",
				remaining.iter().map(|a| a.to_string_lossy()).join(" ")
			));
		}

		Ok(Self {
			path,
			statistics,
			time_limit,
			default_phase,
			verbose,
			stdout: io::stdout(),
			stderr: io::stderr,
			ansi_color: true,
		})
	}
}

impl Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Status::Optimal => write!(f, "OPTIMUM FOUND"),
			Status::Satisfiable => write!(f, "SATISFIABLE"),
			Status::Unsatisfiable => write!(f, "UNSATISFIABLE"),
			Status::Unknown => write!(f, "UNKNOWN"),
		}
	}
}

/// Parse a time limit, given either as a number of seconds or as a
/// [`humantime`] duration.
fn parse_time_limit(s: &str) -> Result<Duration, humantime::DurationError> {
	if let Ok(secs) = s.parse::<u64>() {
		return Ok(Duration::from_secs(secs));
	}
	humantime::parse_duration(s)
}
