//! Translation of terms into literals and clauses.
//!
//! Every non-atomic term is represented by a fresh literal whose meaning is
//! defined by clauses (a Tseitin encoding). These definitions are permanent:
//! they remain when the assertion scope in which they were created is closed.

use itertools::Itertools;
use tracing::trace;

use crate::{
	solver::{
		engine::{clause_db::ClauseKind, State},
		lit::Lit,
	},
	term::{Term, TermId},
};

impl State {
	/// Assert that `term` holds.
	///
	/// Disjunctions are added directly as clauses, and conjunctions are
	/// asserted one conjunct at a time.
	pub(crate) fn assert_term(&mut self, term: TermId) {
		match self.terms.get(term).clone() {
			Term::Const(true) => {}
			Term::Const(false) => self.add_clause(Vec::new(), ClauseKind::Asserted),
			Term::And(conj) => {
				for t in conj.iter() {
					self.assert_term(*t);
				}
			}
			Term::Or(disj) => {
				let clause = disj.iter().map(|&t| self.internalize(t)).collect_vec();
				self.add_clause(clause, ClauseKind::Asserted);
			}
			_ => {
				let lit = self.internalize(term);
				self.add_clause(vec![lit], ClauseKind::Asserted);
			}
		}
	}

	/// Evaluate `term` on the model of the last successful search.
	///
	/// Returns `None` if there is no model, or if the term contains atoms that
	/// were not part of the search.
	pub(crate) fn eval_term(&self, term: TermId) -> Option<bool> {
		let model = self.model.as_ref()?;
		let eval = |t: TermId| self.eval_term(t);
		match self.terms.get(term) {
			Term::Const(b) => Some(*b),
			Term::Atom(_) => {
				let lit = self.encoding.get(&term)?;
				let val = *model.get(lit.var())?;
				Some(val != lit.is_negated())
			}
			Term::Not(t) => eval(*t).map(|b| !b),
			Term::And(conj) => conj
				.iter()
				.map(|&t| eval(t))
				.try_fold(true, |acc, v| v.map(|b| acc && b)),
			Term::Or(disj) => disj
				.iter()
				.map(|&t| eval(t))
				.try_fold(false, |acc, v| v.map(|b| acc || b)),
			Term::Implies(a, b) => Some(!eval(*a)? || eval(*b)?),
			Term::Xor(a, b) => Some(eval(*a)? != eval(*b)?),
			Term::Equiv(a, b) => Some(eval(*a)? == eval(*b)?),
		}
	}

	/// Returns the literal that represents `term`, creating it (and its
	/// defining clauses) if it does not yet exist.
	pub(crate) fn internalize(&mut self, term: TermId) -> Lit {
		if let Some(&lit) = self.encoding.get(&term) {
			return lit;
		}
		let lit = match self.terms.get(term).clone() {
			Term::Const(b) => {
				let t = self.true_lit();
				if b {
					t
				} else {
					!t
				}
			}
			Term::Atom(_) => Lit::from(self.new_var()),
			Term::Not(t) => !self.internalize(t),
			Term::And(conj) => {
				let lits = conj.iter().map(|&t| self.internalize(t)).collect_vec();
				let x = Lit::from(self.new_var());
				// x → l, for every l
				for &l in &lits {
					self.add_definition(vec![!x, l]);
				}
				// (∧ l) → x
				self.add_definition(lits.iter().map(|&l| !l).chain([x]).collect());
				x
			}
			Term::Or(disj) => {
				let lits = disj.iter().map(|&t| self.internalize(t)).collect_vec();
				let x = Lit::from(self.new_var());
				// l → x, for every l
				for &l in &lits {
					self.add_definition(vec![x, !l]);
				}
				// x → (∨ l)
				self.add_definition(lits.into_iter().chain([!x]).collect());
				x
			}
			Term::Implies(a, b) => {
				let (a, b) = (self.internalize(a), self.internalize(b));
				let x = Lit::from(self.new_var());
				self.add_definition(vec![!x, !a, b]);
				self.add_definition(vec![x, a]);
				self.add_definition(vec![x, !b]);
				x
			}
			Term::Xor(a, b) => {
				let (a, b) = (self.internalize(a), self.internalize(b));
				let x = Lit::from(self.new_var());
				self.add_definition(vec![!x, a, b]);
				self.add_definition(vec![!x, !a, !b]);
				self.add_definition(vec![x, !a, b]);
				self.add_definition(vec![x, a, !b]);
				x
			}
			Term::Equiv(a, b) => {
				let (a, b) = (self.internalize(a), self.internalize(b));
				let x = Lit::from(self.new_var());
				self.add_definition(vec![!x, !a, b]);
				self.add_definition(vec![!x, a, !b]);
				self.add_definition(vec![x, a, b]);
				self.add_definition(vec![x, !a, !b]);
				x
			}
		};
		trace!(
			lit = i32::from(lit),
			term = %self.terms.display(term),
			"internalize term"
		);
		let _ = self.encoding.insert(term, lit);
		lit
	}

	/// Add a clause that defines the meaning of an internalised literal.
	fn add_definition(&mut self, clause: Vec<Lit>) {
		self.add_clause(clause, ClauseKind::Definition);
	}

	/// Returns the literal that is always true.
	fn true_lit(&mut self) -> Lit {
		if let Some(lit) = self.true_lit {
			return lit;
		}
		let lit = Lit::from(self.new_var());
		self.add_definition(vec![lit]);
		self.true_lit = Some(lit);
		lit
	}
}

#[cfg(test)]
mod tests {
	use expect_test::expect;
	use itertools::Itertools;

	use crate::{
		solver::{engine::State, lit::Lit},
		term::TermId,
	};

	/// Render the clauses known to the state in DIMACS notation.
	fn clauses(state: &State) -> String {
		let db = &state.clauses;
		(0..db.len())
			.map(|i| {
				db.get(i.into())
					.iter()
					.map(|&l| i32::from(l))
					.sorted_by_key(|l| l.abs())
					.join(" ")
			})
			.join("\n")
	}

	#[test]
	fn test_internalize_reuses_encoding() {
		let mut state = State::default();
		let a = state.terms.atom("a");
		let b = state.terms.atom("b");
		let or = state.terms.or([a, b]);
		let la = state.internalize(a);
		let l_or = state.internalize(or);
		assert_eq!(state.internalize(a), la);
		assert_eq!(state.internalize(or), l_or);
		let not_or = state.terms.not(or);
		assert_eq!(state.internalize(not_or), !l_or);
		assert_eq!(state.num_vars(), 3);
		expect![[r#"
			-1 3
			-2 3
			1 2 -3"#]]
		.assert_eq(&clauses(&state));
	}

	#[test]
	fn test_constants() {
		let mut state = State::default();
		let t = state.terms.constant(true);
		let f = state.terms.constant(false);
		let lt: Lit = state.internalize(t);
		assert_eq!(state.internalize(f), !lt);
		expect!["1"].assert_eq(&clauses(&state));
		assert_eq!(state.inconsistent, None);
		state.assert_term(f);
		assert_eq!(state.inconsistent, Some(0));
	}

	#[test]
	fn test_assert_term() {
		let mut state = State::default();
		let a = state.terms.atom("a");
		let b = state.terms.atom("b");
		let c = state.terms.atom("c");
		let nc = state.terms.not(c);
		let or = state.terms.or([a, nc]);
		let and = state.terms.and([or, b]);
		state.assert_term(and);
		let t: TermId = state.terms.constant(true);
		state.assert_term(t);
		expect![[r#"
			1 -2
			3"#]]
		.assert_eq(&clauses(&state));
	}
}
