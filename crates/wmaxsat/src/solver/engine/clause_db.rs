//! Storage of the clauses known to the search engine, and the watched literal
//! scheme used to propagate them.

use std::{cmp::Reverse, mem};

use index_vec::IndexVec;
use itertools::Itertools;
use tracing::trace;

use crate::solver::{engine::trail::Trail, lit::Lit};

#[derive(Debug, Clone, Default)]
/// Clause database with two watched literals per clause.
pub(crate) struct ClauseDb {
	/// The stored clauses.
	clauses: IndexVec<ClauseRef, StoredClause>,
	/// For every literal, the clauses that currently watch it.
	watches: Vec<Vec<ClauseRef>>,
	/// Number of clauses stored when each of the open assertion scopes was
	/// opened.
	scopes: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The origin of a clause, which determines whether it survives the closing of
/// an assertion scope.
pub(crate) enum ClauseKind {
	/// A clause defining the meaning of a literal introduced by
	/// internalisation.
	Definition,
	/// A clause asserted by the user of the solver.
	Asserted,
	/// A clause added by a plugin.
	Axiom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Status of a clause with regards to the current (partial) assignment.
pub(crate) enum ClauseStatus {
	/// The clause is satisfied or has at least two unassigned literals.
	Open,
	/// All literals but one are false, and the remaining literal is unassigned.
	Unit(Lit),
	/// All literals in the clause are false.
	Conflict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A clause as stored in the database.
///
/// The first two literals of the clause are its watched literals.
struct StoredClause {
	/// The literals of the clause.
	lits: Vec<Lit>,
	/// The origin of the clause.
	kind: ClauseKind,
}

impl ClauseDb {
	/// Start watching `cref`, after reordering its literals such that the most
	/// useful literals are watched given the current assignment.
	///
	/// True literals are placed first, then unassigned literals, and finally
	/// false literals from the latest to the earliest assigned.
	pub(crate) fn attach(&mut self, cref: ClauseRef, trail: &Trail) -> ClauseStatus {
		let lits = &mut self.clauses[cref].lits;
		lits.sort_by_key(|&l| match trail.get_sat_value(l) {
			Some(true) => (0, Reverse(0)),
			None => (1, Reverse(0)),
			Some(false) => (2, Reverse(trail.position(l).unwrap_or(0))),
		});
		let status = match (
			trail.get_sat_value(lits[0]),
			lits.get(1).map(|&l| trail.get_sat_value(l)),
		) {
			(Some(false), _) => ClauseStatus::Conflict,
			(None, None | Some(Some(false))) => ClauseStatus::Unit(lits[0]),
			_ => ClauseStatus::Open,
		};
		let watched = lits.iter().take(2).copied().collect_vec();
		for l in watched {
			self.watch_list(l).push(cref);
		}
		status
	}

	/// Stop watching `cref`.
	pub(crate) fn detach(&mut self, cref: ClauseRef) {
		for &l in self.clauses[cref].lits.iter().take(2) {
			if let Some(list) = self.watches.get_mut(l.code()) {
				list.retain(|&c| c != cref);
			}
		}
	}

	/// Access the literals of a stored clause.
	pub(crate) fn get(&self, cref: ClauseRef) -> &[Lit] {
		&self.clauses[cref].lits
	}

	/// Returns the number of stored clauses.
	pub(crate) fn len(&self) -> usize {
		self.clauses.len()
	}

	/// Open a new assertion scope.
	pub(crate) fn push_scope(&mut self) {
		self.scopes.push(self.clauses.len());
	}

	/// Close the innermost assertion scope, removing all clauses that were added
	/// inside of it except those that define internalised literals.
	///
	/// Returns `false` if no scope was open. All watches are invalidated, and
	/// have to be rebuilt before the next search.
	pub(crate) fn pop_scope(&mut self) -> bool {
		let Some(mark) = self.scopes.pop() else {
			return false;
		};
		let clauses = mem::take(&mut self.clauses);
		let before = clauses.len();
		self.clauses = clauses
			.into_iter()
			.enumerate()
			.filter(|(i, c)| *i < mark || c.kind == ClauseKind::Definition)
			.map(|(_, c)| c)
			.collect();
		self.watches.clear();
		trace!(
			removed = before - self.clauses.len(),
			remaining = self.clauses.len(),
			"pop clause scope"
		);
		true
	}

	/// Propagate the consequences of `lit` becoming true.
	///
	/// Clauses watching `!lit` search for a replacement watch. If none exists,
	/// the clause is either unit, in which case its other watched literal is
	/// assigned on the `trail`, or it is in conflict, in which case its
	/// reference is returned as the error.
	pub(crate) fn propagate(&mut self, trail: &mut Trail, lit: Lit) -> Result<(), ClauseRef> {
		let false_lit = !lit;
		let Some(list) = self.watches.get_mut(false_lit.code()) else {
			return Ok(());
		};
		let mut watchers = mem::take(list);
		let mut result = Ok(());
		let (mut i, mut j) = (0, 0);
		while i < watchers.len() {
			let cref = watchers[i];
			i += 1;
			let lits = &mut self.clauses[cref].lits;
			if lits.len() == 1 {
				watchers[j] = cref;
				j += 1;
				result = Err(cref);
				break;
			}
			if lits[0] == false_lit {
				lits.swap(0, 1);
			}
			debug_assert_eq!(lits[1], false_lit);
			if trail.get_sat_value(lits[0]) == Some(true) {
				watchers[j] = cref;
				j += 1;
				continue;
			}
			if let Some(k) = (2..lits.len()).find(|&k| trail.get_sat_value(lits[k]) != Some(false)) {
				lits.swap(1, k);
				let new_watch = lits[1].code();
				if new_watch >= self.watches.len() {
					self.watches.resize_with(new_watch + 1, Vec::new);
				}
				self.watches[new_watch].push(cref);
				continue;
			}
			watchers[j] = cref;
			j += 1;
			if trail.get_sat_value(lits[0]) == Some(false) {
				result = Err(cref);
				break;
			}
			let _ = trail.assign_lit(lits[0]);
		}
		while i < watchers.len() {
			watchers[j] = watchers[i];
			i += 1;
			j += 1;
		}
		watchers.truncate(j);
		self.watches[false_lit.code()] = watchers;
		result
	}

	/// Add a clause to the database.
	///
	/// The clause is not watched. Use [`Self::attach`] to watch it during search,
	/// or [`Self::rebuild_watches`] before the start of a search.
	pub(crate) fn push(&mut self, lits: Vec<Lit>, kind: ClauseKind) -> ClauseRef {
		debug_assert!(!lits.is_empty());
		self.clauses.push(StoredClause { lits, kind })
	}

	/// Rebuild the watch lists of all stored clauses, watching their first two
	/// literals.
	pub(crate) fn rebuild_watches(&mut self, num_vars: usize) {
		self.watches.clear();
		self.watches.resize_with(num_vars * 2, Vec::new);
		for (cref, c) in self.clauses.iter_enumerated() {
			for &l in c.lits.iter().take(2) {
				self.watches[l.code()].push(cref);
			}
		}
	}

	/// Returns the number of open assertion scopes.
	pub(crate) fn scope_depth(&self) -> usize {
		self.scopes.len()
	}

	/// Iterate over the stored unit clauses.
	pub(crate) fn units(&self) -> impl Iterator<Item = (ClauseRef, Lit)> + '_ {
		self.clauses
			.iter_enumerated()
			.filter(|(_, c)| c.lits.len() == 1)
			.map(|(cref, c)| (cref, c.lits[0]))
	}

	/// Access the watch list of a literal, growing the watch lists when the
	/// literal was created after they were built.
	fn watch_list(&mut self, lit: Lit) -> &mut Vec<ClauseRef> {
		if lit.code() >= self.watches.len() {
			self.watches.resize_with(lit.code() + 1, Vec::new);
		}
		&mut self.watches[lit.code()]
	}
}

/// Normalise a list of literals into a clause by removing duplicate literals.
///
/// Returns `None` if the clause is a tautology.
pub(crate) fn normalize_clause(mut lits: Vec<Lit>) -> Option<Vec<Lit>> {
	lits.sort_unstable();
	lits.dedup();
	// Complementary literals are adjacent after sorting
	if lits.windows(2).any(|w| w[0].var() == w[1].var()) {
		return None;
	}
	Some(lits)
}

index_vec::define_index_type! {
	/// Reference to a clause stored in a [`ClauseDb`].
	pub(crate) struct ClauseRef = u32;
}

#[cfg(test)]
mod tests {
	use crate::solver::{
		engine::{
			clause_db::{normalize_clause, ClauseDb, ClauseKind, ClauseStatus},
			trail::Trail,
		},
		lit::{BoolVar, Lit},
	};

	/// Create the positive literal of variable `i`.
	fn lit(i: usize) -> Lit {
		Lit::from(BoolVar::new(i))
	}

	#[test]
	fn test_normalize_clause() {
		assert_eq!(
			normalize_clause(vec![lit(2), lit(0), lit(2)]),
			Some(vec![lit(0), lit(2)])
		);
		assert_eq!(normalize_clause(vec![lit(1), lit(0), !lit(1)]), None);
		assert_eq!(normalize_clause(Vec::new()), Some(Vec::new()));
	}

	#[test]
	fn test_propagate_unit_and_conflict() {
		let mut trail = Trail::default();
		trail.grow_to_boolvar(BoolVar::new(2));
		let mut db = ClauseDb::default();
		let c = db.push(vec![lit(0), lit(1), lit(2)], ClauseKind::Asserted);
		db.rebuild_watches(trail.num_vars());

		assert_eq!(trail.assign_lit(!lit(0)), None);
		assert_eq!(db.propagate(&mut trail, !lit(0)), Ok(()));
		assert_eq!(trail.assign_lit(!lit(1)), None);
		assert_eq!(db.propagate(&mut trail, !lit(1)), Ok(()));
		// The last literal is propagated
		assert_eq!(trail.get_sat_value(lit(2)), Some(true));
		assert_eq!(&db.get(c)[..2], &[lit(2), lit(1)]);

		let mut trail = Trail::default();
		trail.grow_to_boolvar(BoolVar::new(2));
		db.rebuild_watches(trail.num_vars());
		for i in 0..3 {
			assert_eq!(trail.assign_lit(!lit(i)), None);
		}
		let res = (0..3).try_for_each(|i| db.propagate(&mut trail, !lit(i)));
		assert_eq!(res, Err(c));
	}

	#[test]
	fn test_attach_during_search() {
		let mut trail = Trail::default();
		trail.grow_to_boolvar(BoolVar::new(3));
		let mut db = ClauseDb::default();
		db.rebuild_watches(trail.num_vars());
		assert_eq!(trail.assign_lit(!lit(0)), None);
		assert_eq!(trail.assign_lit(!lit(1)), None);

		let c = db.push(vec![lit(0), lit(1), lit(2)], ClauseKind::Axiom);
		assert_eq!(db.attach(c, &trail), ClauseStatus::Unit(lit(2)));
		assert_eq!(db.get(c), &[lit(2), lit(1), lit(0)]);

		let d = db.push(vec![lit(0), lit(1)], ClauseKind::Axiom);
		assert_eq!(db.attach(d, &trail), ClauseStatus::Conflict);
		db.detach(d);

		let e = db.push(vec![lit(0), lit(2), lit(3)], ClauseKind::Axiom);
		assert_eq!(db.attach(e, &trail), ClauseStatus::Open);
	}

	#[test]
	fn test_scopes() {
		let mut db = ClauseDb::default();
		let _ = db.push(vec![lit(0)], ClauseKind::Asserted);
		db.push_scope();
		let _ = db.push(vec![lit(1), lit(2)], ClauseKind::Asserted);
		let _ = db.push(vec![!lit(3), lit(1)], ClauseKind::Definition);
		let _ = db.push(vec![!lit(1)], ClauseKind::Axiom);
		assert_eq!(db.scope_depth(), 1);
		assert_eq!(db.len(), 4);
		assert!(db.pop_scope());
		assert!(!db.pop_scope());
		assert_eq!(db.len(), 2);
		assert_eq!(
			db.units().map(|(_, l)| l).collect::<Vec<_>>(),
			vec![lit(0)]
		);
	}
}
