//! Reader for weighted DIMACS (WCNF) instances.
//!
//! Both the classic format, with a `p wcnf <vars> <clauses> [<top>]` header in
//! which clauses with a weight of at least `top` are hard, and the header-less
//! format of the 2022 MaxSAT evaluations, in which hard clauses start with `h`,
//! are accepted. Every clause is given on a single line and terminated by `0`.

use std::{
	io::{self, BufRead},
	str::FromStr,
};

use itertools::Itertools;
use num_traits::Signed;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{maxsat::Weight, term::TermId, Solver};

#[derive(Error, Debug)]
/// Errors that can occur when reading a [`WcnfInstance`].
pub enum WcnfError {
	#[error("invalid problem line `{header}' on line {line}")]
	/// The problem line is malformed.
	InvalidHeader {
		/// Line number of the problem line.
		line: usize,
		/// Content of the problem line.
		header: String,
	},
	#[error("invalid literal `{lit}' on line {line}")]
	/// A clause contained a token that is not a literal of a declared variable.
	InvalidLiteral {
		/// Line number of the clause.
		line: usize,
		/// The offending token.
		lit: String,
	},
	#[error("invalid weight `{weight}' on line {line}")]
	/// A clause started with a token that is not a non-negative weight.
	InvalidWeight {
		/// Line number of the clause.
		line: usize,
		/// The offending token.
		weight: String,
	},
	#[error("clause on line {line} is not terminated by `0'")]
	/// A clause did not end with the terminating `0`.
	MissingTerminator {
		/// Line number of the clause.
		line: usize,
	},
	#[error("unexpected problem line on line {line}")]
	/// A problem line was found after the first clause or after another problem
	/// line.
	UnexpectedHeader {
		/// Line number of the problem line.
		line: usize,
	},
	#[error("unable to read instance: {0}")]
	/// The instance could not be read.
	Io(#[from] io::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// A weighted MaxSAT instance in the form of hard and soft clauses over
/// DIMACS literals.
pub struct WcnfInstance {
	/// Number of variables, numbered from 1.
	num_vars: usize,
	/// Clauses that must be satisfied.
	hard: Vec<Vec<i32>>,
	/// Clauses that incur their weight when they are not satisfied.
	soft: Vec<(Weight, Vec<i32>)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The terms created for a [`WcnfInstance`] in a [`Solver`].
pub struct LoadedInstance {
	/// The atom of every variable: `x{i}` for variable `i`.
	atoms: Vec<TermId>,
	/// The formula of every soft clause.
	soft: Vec<TermId>,
	/// The weight of every soft clause.
	weights: Vec<Weight>,
}

#[derive(Debug)]
/// Contents of the problem line of the classic format.
struct Header {
	/// Declared number of variables.
	num_vars: usize,
	/// Declared number of clauses.
	num_clauses: usize,
	/// Weight from which clauses are considered hard.
	top: Option<Weight>,
}

impl WcnfInstance {
	/// Read an instance from the given reader.
	pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, WcnfError> {
		let mut header: Option<Header> = None;
		let mut instance = WcnfInstance::default();
		for (i, line) in reader.lines().enumerate() {
			let line_no = i + 1;
			let line = line?;
			let content = line.trim();
			if content.is_empty() || content.starts_with('c') {
				continue;
			}
			if content.starts_with('p') {
				if header.is_some() || !instance.hard.is_empty() || !instance.soft.is_empty() {
					return Err(WcnfError::UnexpectedHeader { line: line_no });
				}
				let h = Header::parse(line_no, content)?;
				instance.num_vars = h.num_vars;
				header = Some(h);
				continue;
			}

			let mut tokens = content.split_whitespace();
			let Some(first) = tokens.next() else {
				continue;
			};
			let weight = if first == "h" {
				None
			} else {
				let weight = Weight::from_str(first)
					.ok()
					.filter(|w| !w.is_negative())
					.ok_or_else(|| WcnfError::InvalidWeight {
						line: line_no,
						weight: first.to_owned(),
					})?;
				match header.as_ref().and_then(|h| h.top.as_ref()) {
					Some(top) if &weight >= top => None,
					_ => Some(weight),
				}
			};
			let max_var = header.as_ref().map(|h| h.num_vars);
			let clause = parse_clause(line_no, tokens, max_var)?;
			if header.is_none() {
				let used = clause.iter().map(|l| l.unsigned_abs() as usize).max();
				instance.num_vars = instance.num_vars.max(used.unwrap_or(0));
			}
			match weight {
				None => instance.hard.push(clause),
				Some(w) => instance.soft.push((w, clause)),
			}
		}

		if let Some(h) = header {
			let found = instance.hard.len() + instance.soft.len();
			if found != h.num_clauses {
				warn!(
					declared = h.num_clauses,
					found, "number of clauses does not match the problem line"
				);
			}
		}
		debug!(
			num_vars = instance.num_vars,
			num_hard = instance.hard.len(),
			num_soft = instance.soft.len(),
			"read WCNF instance"
		);
		Ok(instance)
	}

	/// Returns the hard clauses of the instance.
	pub fn hard(&self) -> &[Vec<i32>] {
		&self.hard
	}

	/// Create the atoms of the instance in `slv`, assert its hard clauses, and
	/// create the formulas of its soft clauses.
	///
	/// The soft clauses are not asserted: the returned formulas and weights are
	/// meant to be given to [`crate::weighted_maxsat`].
	pub fn load(&self, slv: &mut Solver) -> LoadedInstance {
		let atoms = (1..=self.num_vars)
			.map(|i| slv.atom(&format!("x{i}")))
			.collect_vec();
		for clause in &self.hard {
			let term = clause_term(slv, &atoms, clause);
			slv.assert_term(term);
		}
		let (weights, soft) = self
			.soft
			.iter()
			.map(|(w, clause)| (w.clone(), clause_term(slv, &atoms, clause)))
			.unzip();
		LoadedInstance {
			atoms,
			soft,
			weights,
		}
	}

	/// Returns the number of variables of the instance.
	pub fn num_vars(&self) -> usize {
		self.num_vars
	}

	/// Returns the soft clauses of the instance with their weights.
	pub fn soft(&self) -> &[(Weight, Vec<i32>)] {
		&self.soft
	}
}

impl FromStr for WcnfInstance {
	type Err = WcnfError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::from_reader(s.as_bytes())
	}
}

impl LoadedInstance {
	/// Returns the atoms of the variables, where the atom of variable `i` is
	/// found at index `i - 1`.
	pub fn atoms(&self) -> &[TermId] {
		&self.atoms
	}

	/// Returns the formulas of the soft clauses, in the order of the instance.
	pub fn soft(&self) -> &[TermId] {
		&self.soft
	}

	/// Returns the weights of the soft clauses, in the order of the instance.
	pub fn weights(&self) -> &[Weight] {
		&self.weights
	}
}

impl Header {
	/// Parse a problem line of the form `p wcnf <vars> <clauses> [<top>]`.
	fn parse(line: usize, content: &str) -> Result<Self, WcnfError> {
		let invalid = || WcnfError::InvalidHeader {
			line,
			header: content.to_owned(),
		};
		let tokens = content.split_whitespace().collect_vec();
		let (num_vars, num_clauses, top) = match tokens.as_slice() {
			["p", "wcnf", vars, clauses] => (vars, clauses, None),
			["p", "wcnf", vars, clauses, top] => (vars, clauses, Some(top)),
			_ => return Err(invalid()),
		};
		let top = match top {
			Some(t) => Some(
				Weight::from_str(t)
					.ok()
					.filter(|w| w.is_positive())
					.ok_or_else(invalid)?,
			),
			None => None,
		};
		Ok(Header {
			num_vars: num_vars.parse().map_err(|_| invalid())?,
			num_clauses: num_clauses.parse().map_err(|_| invalid())?,
			top,
		})
	}
}

/// Create the disjunction of the DIMACS literals of `clause`.
fn clause_term(slv: &mut Solver, atoms: &[TermId], clause: &[i32]) -> TermId {
	let lits = clause
		.iter()
		.map(|&l| {
			let atom = atoms[l.unsigned_abs() as usize - 1];
			if l < 0 {
				slv.not(atom)
			} else {
				atom
			}
		})
		.collect_vec();
	slv.or(lits)
}

/// Parse the literals of a clause, which must be terminated by a `0` as its
/// last token.
fn parse_clause<'a>(
	line: usize,
	tokens: impl Iterator<Item = &'a str>,
	max_var: Option<usize>,
) -> Result<Vec<i32>, WcnfError> {
	let mut clause = Vec::new();
	let mut terminated = false;
	for tok in tokens {
		let invalid = || WcnfError::InvalidLiteral {
			line,
			lit: tok.to_owned(),
		};
		if terminated {
			return Err(invalid());
		}
		let lit: i32 = tok.parse().map_err(|_| invalid())?;
		if lit == 0 {
			terminated = true;
			continue;
		}
		if max_var.is_some_and(|n| lit.unsigned_abs() as usize > n) {
			return Err(invalid());
		}
		clause.push(lit);
	}
	if !terminated {
		return Err(WcnfError::MissingTerminator { line });
	}
	Ok(clause)
}

#[cfg(test)]
mod tests {
	use expect_test::expect;
	use itertools::Itertools;
	use tracing_test::traced_test;

	use crate::{
		maxsat::Weight,
		wcnf::{WcnfError, WcnfInstance},
		weighted_maxsat, SolveResult, Solver,
	};

	/// Render the error of parsing `s` as an instance.
	fn parse_err(s: &str) -> String {
		s.parse::<WcnfInstance>()
			.expect_err("instance should be rejected")
			.to_string()
	}

	#[test]
	#[traced_test]
	fn test_classic_format() {
		let inst: WcnfInstance = "c hard clauses have weight 10
p wcnf 3 5 10
10 -1 -3 0
3 1 0
1 2 0
2 3 0
7/2 -2 0
"
		.parse()
		.unwrap();
		assert_eq!(inst.num_vars(), 3);
		assert_eq!(inst.hard(), &[vec![-1, -3]]);
		assert_eq!(inst.soft().len(), 4);
		assert_eq!(inst.soft()[3].0, Weight::new(7.into(), 2.into()));

		let mut slv = Solver::default();
		let loaded = inst.load(&mut slv);
		assert_eq!(loaded.atoms().len(), 3);
		let (res, selected) = weighted_maxsat(&mut slv, loaded.soft(), loaded.weights());
		assert_eq!(res, SolveResult::Satisfied);
		expect!["x1 (not x2)"].assert_eq(
			&selected
				.iter()
				.map(|&t| slv.terms().display(t).to_string())
				.join(" "),
		);
	}

	#[test]
	fn test_2022_format() {
		let inst: WcnfInstance = "c no problem line
h 1 2 0
h -1 -2 0
5 1 0
3 2 0

c weights can be zero
0 -4 3 0
"
		.parse()
		.unwrap();
		assert_eq!(inst.num_vars(), 4);
		assert_eq!(inst.hard().len(), 2);
		assert_eq!(
			inst.soft()
				.iter()
				.map(|(w, c)| format!("{w}:{c:?}"))
				.join(" "),
			"5:[1] 3:[2] 0:[-4, 3]"
		);

		let mut slv = Solver::default();
		let loaded = inst.load(&mut slv);
		let (res, selected) = weighted_maxsat(&mut slv, loaded.soft(), loaded.weights());
		assert_eq!(res, SolveResult::Satisfied);
		assert_eq!(selected, vec![loaded.soft()[0], loaded.soft()[2]]);
	}

	#[test]
	fn test_without_top() {
		let inst: WcnfInstance = "p wcnf 2 2\n100 1 0\n1 -1 2 0\n".parse().unwrap();
		assert!(inst.hard().is_empty());
		assert_eq!(inst.soft().len(), 2);
		assert_eq!(inst.soft()[1].1, vec![-1, 2]);
	}

	#[test]
	fn test_errors() {
		expect!["invalid problem line `p cnf 3 2' on line 1"].assert_eq(&parse_err("p cnf 3 2\n"));
		expect!["invalid problem line `p wcnf 3 2 -1' on line 2"]
			.assert_eq(&parse_err("c\np wcnf 3 2 -1\n"));
		expect!["invalid literal `4' on line 2"].assert_eq(&parse_err("p wcnf 3 1\n1 4 0\n"));
		expect!["invalid literal `x' on line 1"].assert_eq(&parse_err("h 1 x 0\n"));
		expect!["invalid literal `2' on line 1"].assert_eq(&parse_err("h 1 0 2\n"));
		expect!["invalid weight `-3' on line 1"].assert_eq(&parse_err("-3 1 0\n"));
		expect!["invalid weight `1/0' on line 1"].assert_eq(&parse_err("1/0 1 0\n"));
		expect!["clause on line 1 is not terminated by `0'"].assert_eq(&parse_err("h 1 2\n"));
		expect!["unexpected problem line on line 2"]
			.assert_eq(&parse_err("h 1 0\np wcnf 1 1 2\n"));
		assert!(matches!(
			"p wcnf 1 1\np wcnf 1 1\n".parse::<WcnfInstance>(),
			Err(WcnfError::UnexpectedHeader { line: 2 })
		));
	}

	#[test]
	fn test_empty_soft_clause() {
		let inst: WcnfInstance = "h 1 0\n4 0\n2 -1 0\n".parse().unwrap();
		let mut slv = Solver::default();
		let loaded = inst.load(&mut slv);
		let (res, selected) = weighted_maxsat(&mut slv, loaded.soft(), loaded.weights());
		assert_eq!(res, SolveResult::Satisfied);
		assert!(selected.is_empty());
	}
}
