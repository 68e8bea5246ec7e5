//! Hash-consed Boolean terms.
//!
//! Terms are the handles through which callers refer to formulas. Building
//! the same term twice always returns the same [`TermId`], so a term can be
//! used as a stable key (e.g., when the search engine caches the literal that
//! encodes it).

use std::{collections::HashMap, fmt};

use index_vec::IndexVec;
use itertools::Itertools;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// A Boolean formula whose sub-formulas are referenced by [`TermId`].
pub enum Term {
	/// A constant truth value.
	Const(bool),
	/// A named propositional atom.
	Atom(Box<str>),
	/// The negation of a term.
	Not(TermId),
	/// The conjunction of a list of terms.
	And(Box<[TermId]>),
	/// The disjunction of a list of terms.
	Or(Box<[TermId]>),
	/// The implication from the first to the second term.
	Implies(TermId, TermId),
	/// The exclusive disjunction of two terms.
	Xor(TermId, TermId),
	/// The equivalence of two terms.
	Equiv(TermId, TermId),
}

/// Helper structure used to display a term and its sub-terms.
#[derive(Debug, Clone, Copy)]
pub struct TermDisplay<'a> {
	/// The store in which the term was created.
	store: &'a TermStore,
	/// The term to display.
	term: TermId,
}

#[derive(Clone, Debug, Default)]
/// Storage of all terms created for a solver.
pub struct TermStore {
	/// The terms, indexed by their identifiers.
	terms: IndexVec<TermId, Term>,
	/// Reverse lookup used to reuse existing terms.
	lookup: HashMap<Term, TermId>,
	/// Counter used to generate the names of fresh constants.
	fresh: usize,
}

impl TermStore {
	/// Create (or retrieve) the conjunction of the given terms.
	///
	/// The empty conjunction is `true`, and a conjunction of a single term is
	/// that term.
	pub fn and<I: IntoIterator<Item = TermId>>(&mut self, terms: I) -> TermId {
		let terms = terms.into_iter().collect_vec();
		match terms.len() {
			0 => self.constant(true),
			1 => terms[0],
			_ => self.intern(Term::And(terms.into_boxed_slice())),
		}
	}

	/// Create (or retrieve) the atom with the given name.
	pub fn atom(&mut self, name: &str) -> TermId {
		self.intern(Term::Atom(name.into()))
	}

	/// Create (or retrieve) a constant term.
	pub fn constant(&mut self, value: bool) -> TermId {
		self.intern(Term::Const(value))
	}

	/// Returns a helper that displays the term in prefix notation.
	pub fn display(&self, term: TermId) -> TermDisplay<'_> {
		TermDisplay { store: self, term }
	}

	/// Create (or retrieve) the equivalence of two terms.
	pub fn equiv(&mut self, a: TermId, b: TermId) -> TermId {
		self.intern(Term::Equiv(a, b))
	}

	/// Create a new atom that is distinct from all existing terms.
	///
	/// The atom is named `{prefix}!{n}`.
	pub fn fresh_const(&mut self, prefix: &str) -> TermId {
		loop {
			let name = format!("{prefix}!{}", self.fresh);
			self.fresh += 1;
			let term = Term::Atom(name.into_boxed_str());
			if !self.lookup.contains_key(&term) {
				return self.intern(term);
			}
		}
	}

	/// Access the definition of a term.
	pub fn get(&self, term: TermId) -> &Term {
		&self.terms[term]
	}

	/// Create (or retrieve) the implication `a → b`.
	pub fn implies(&mut self, a: TermId, b: TermId) -> TermId {
		self.intern(Term::Implies(a, b))
	}

	/// Insert the term in the store, or return the identifier of an equal term
	/// that was inserted before.
	pub fn intern(&mut self, term: Term) -> TermId {
		if let Some(&id) = self.lookup.get(&term) {
			return id;
		}
		let id = self.terms.push(term.clone());
		let _ = self.lookup.insert(term, id);
		id
	}

	/// Returns whether the store contains no terms.
	pub fn is_empty(&self) -> bool {
		self.terms.is_empty()
	}

	/// Returns the number of distinct terms in the store.
	pub fn len(&self) -> usize {
		self.terms.len()
	}

	/// Create (or retrieve) the negation of a term.
	///
	/// Double negations are removed.
	pub fn not(&mut self, term: TermId) -> TermId {
		match self.terms[term] {
			Term::Not(inner) => inner,
			Term::Const(b) => self.constant(!b),
			_ => self.intern(Term::Not(term)),
		}
	}

	/// Create (or retrieve) the disjunction of the given terms.
	///
	/// The empty disjunction is `false`, and a disjunction of a single term is
	/// that term.
	pub fn or<I: IntoIterator<Item = TermId>>(&mut self, terms: I) -> TermId {
		let terms = terms.into_iter().collect_vec();
		match terms.len() {
			0 => self.constant(false),
			1 => terms[0],
			_ => self.intern(Term::Or(terms.into_boxed_slice())),
		}
	}

	/// Create (or retrieve) the exclusive disjunction of two terms.
	pub fn xor(&mut self, a: TermId, b: TermId) -> TermId {
		self.intern(Term::Xor(a, b))
	}
}

impl TermDisplay<'_> {
	/// Create a helper for a sub-term.
	fn sub(&self, term: TermId) -> Self {
		Self {
			store: self.store,
			term,
		}
	}
}

impl fmt::Display for TermDisplay<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let list = |f: &mut fmt::Formatter<'_>, op: &str, terms: &[TermId]| {
			write!(
				f,
				"({op} {})",
				terms.iter().map(|&t| self.sub(t)).format(" ")
			)
		};
		match self.store.get(self.term) {
			Term::Const(b) => write!(f, "{b}"),
			Term::Atom(name) => write!(f, "{name}"),
			Term::Not(t) => write!(f, "(not {})", self.sub(*t)),
			Term::And(ts) => list(f, "and", ts),
			Term::Or(ts) => list(f, "or", ts),
			Term::Implies(a, b) => list(f, "=>", &[*a, *b]),
			Term::Xor(a, b) => list(f, "xor", &[*a, *b]),
			Term::Equiv(a, b) => list(f, "=", &[*a, *b]),
		}
	}
}

index_vec::define_index_type! {
	/// Identifies a term within a [`TermStore`].
	pub struct TermId = u32;
}

#[cfg(test)]
mod tests {
	use expect_test::expect;

	use crate::term::{Term, TermStore};

	#[test]
	fn test_hash_consing() {
		let mut store = TermStore::default();
		let a = store.atom("a");
		let b = store.atom("b");
		assert_eq!(store.atom("a"), a);
		let ab = store.or([a, b]);
		assert_eq!(store.or([a, b]), ab);
		assert_ne!(store.or([b, a]), ab);
		let na = store.not(a);
		assert_eq!(store.not(na), a);
		assert_eq!(store.or([a]), a);
		let empty_or = store.or([]);
		assert_eq!(store.get(empty_or), &Term::Const(false));
		let empty_and = store.and([]);
		assert_eq!(store.get(empty_and), &Term::Const(true));
		let t = store.constant(true);
		let not_t = store.not(t);
		assert_eq!(store.get(not_t), &Term::Const(false));
	}

	#[test]
	fn test_fresh_const() {
		let mut store = TermStore::default();
		let taken = store.atom("w!1");
		let w0 = store.fresh_const("w");
		let w1 = store.fresh_const("w");
		assert_ne!(w1, taken);
		expect!["w!0 w!2"].assert_eq(&format!("{} {}", store.display(w0), store.display(w1)));
	}

	#[test]
	fn test_display() {
		let mut store = TermStore::default();
		let a = store.atom("a");
		let b = store.atom("b");
		let c = store.atom("c");
		let nb = store.not(b);
		let ab = store.and([a, nb]);
		let imp = store.implies(ab, c);
		let x = store.xor(a, c);
		let eq = store.equiv(imp, x);
		expect!["(= (=> (and a (not b)) c) (xor a c))"].assert_eq(&store.display(eq).to_string());
	}
}
