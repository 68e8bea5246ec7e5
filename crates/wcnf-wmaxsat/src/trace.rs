//! Module that contains the implementation of a custom [`tracing::Subscriber`]
//! for `wcnf-wmaxsat`.

use std::{
	collections::HashMap,
	fmt::{self, Display},
	num::NonZeroI32,
	sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tracing::{
	field::{Field, Visit},
	Event, Level, Subscriber,
};
use tracing_subscriber::{
	field::{MakeVisitor, RecordFields, VisitOutput},
	fmt::{
		format::{DefaultFields, Writer},
		time::uptime,
		FormatFields, MakeWriter,
	},
	layer::{Context, SubscriberExt},
	Layer,
};

/// Type alias of an integer type that can be used to represent literals.
pub(crate) type LitInt = NonZeroI32;

/// Shared mapping from literals to the definitions of their names.
pub(crate) type LitMap = Arc<Mutex<HashMap<LitInt, LitName>>>;

/// A [`tracing_subscriber::FormatFields`] implementation that attempts to
/// format literals and soft constraints according to their WCNF names,
/// formatting all other fields using a `DefaultFields` formatter.
struct FmtLitFields {
	/// The inner formatter that will be used to format fields that are not
	/// literals or soft constraints.
	fmt: DefaultFields,
	/// The mapping from integers representing literals to the definitions of
	/// their names.
	lit_reverse_map: LitMap,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Definition of how a literal should be named.
pub(crate) enum LitName {
	/// The literal represents a variable of the WCNF instance.
	///
	/// The tuple contains the (1-based) number of the variable and whether the
	/// literal is the positive or negative version of the variable.
	Var(usize, bool),
	/// The literal represents the guard that relaxes a soft clause.
	///
	/// The tuple contains the index of the soft clause and whether the literal
	/// is the positive or negative version of the guard.
	Guard(usize, bool),
}

/// A visitor wrapper that ensures any fields containing literals or soft
/// constraints are renamed to use their WCNF names.
#[derive(Debug, Clone)]
struct LitNames<'a, V> {
	/// Inner visitor that will be used to format the fields.
	inner: V,
	/// The mapping from integers representing literals to the definitions of
	/// their names.
	lit_reverse_map: &'a HashMap<LitInt, LitName>,
}

#[derive(Debug, Default, PartialEq, Eq)]
/// Structure used to parse log messages informing the subscriber that the
/// guard of a soft constraint has been given a literal.
struct RecordGuardLits {
	/// Whether the log message had the "bind guard" message.
	bind_message: bool,
	/// The `soft` field of the log message, if any.
	soft: Option<usize>,
	/// The `lit` field of the log message, if any.
	lit: Option<LitInt>,
	/// Whether the log message contains any unexpected fields.
	other_values: bool,
}

/// A [`tracing_subscriber::Layer`] that registers the names of the literals of
/// guards for any future log messages.
struct RegisterGuardLits {
	/// A mapping from the literals to a definition of a literal name.
	lit_reverse_map: LitMap,
}

/// Create a [`tracing_subscriber::Subscriber`] specialized for `wcnf-wmaxsat`.
///
/// The given subscriber additionally formats literals using the name mapping
/// provided by `lit_reverse_map`, which is extended with the guards of soft
/// constraints when they are bound during search.
pub(crate) fn create_subscriber<W>(
	verbose: u8,
	make_writer: W,
	ansi: bool,
	lit_reverse_map: LitMap,
) -> impl Subscriber
where
	W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
	let builder = tracing_subscriber::fmt()
		.with_max_level(match verbose {
			0 => Level::INFO,
			1 => Level::DEBUG,
			_ => Level::TRACE, // 2 or more
		})
		.with_writer(make_writer)
		.with_ansi(ansi)
		.with_timer(uptime())
		.map_fmt_fields(|fmt| FmtLitFields::new(fmt, Arc::clone(&lit_reverse_map)));

	builder
		.finish()
		.with(RegisterGuardLits::new(lit_reverse_map))
}

/// Lock the literal mapping, continuing with the data of a poisoned lock.
pub(crate) fn lock_names(map: &LitMap) -> MutexGuard<'_, HashMap<LitInt, LitName>> {
	map.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FmtLitFields {
	/// Create a new [`FmtLitFields`] formatter based on the given `fmt`, using
	/// names for literals based on the given `lit_reverse_map`.
	fn new(fmt: DefaultFields, lit_reverse_map: LitMap) -> Self {
		Self {
			fmt,
			lit_reverse_map,
		}
	}
}

impl<'writer> FormatFields<'writer> for FmtLitFields {
	fn format_fields<R: RecordFields>(&self, writer: Writer<'writer>, fields: R) -> fmt::Result {
		let lit_map = lock_names(&self.lit_reverse_map);
		let mut v = LitNames::new(self.fmt.make_visitor(writer), &lit_map);
		fields.record(&mut v);
		v.finish()
	}
}

impl Display for LitName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let sign = |pos: bool| if pos { "" } else { "¬" };
		match self {
			LitName::Var(i, pos) => write!(f, "{}x{i}", sign(*pos)),
			LitName::Guard(i, pos) => write!(f, "{}soft[{i}]", sign(*pos)),
		}
	}
}

impl<'a, V> LitNames<'a, V> {
	/// Returns a new [`MakeVisitor`] implementation that will wrap `inner` so
	/// that any fields containing literals are renamed to use their WCNF
	/// names.
	///
	/// [`MakeVisitor`]: tracing_subscriber::field::MakeVisitor
	fn new(inner: V, lit_reverse_map: &'a HashMap<LitInt, LitName>) -> Self {
		LitNames {
			inner,
			lit_reverse_map,
		}
	}

	/// Returns the name of the literal represented by `i`.
	fn lit_name(&self, i: i64) -> Option<String> {
		let lit = NonZeroI32::new(i32::try_from(i).ok()?)?;
		self.lit_reverse_map.get(&lit).map(LitName::to_string)
	}
}

impl<V: Visit> LitNames<'_, V> {
	#[inline]
	/// Check if the field should and can be formatted as a clause or a list of
	/// literals.
	fn check_clause(&mut self, field: &Field, value: &dyn fmt::Debug) -> bool {
		if field.name().starts_with("clause") || field.name().starts_with("model") {
			let res: Result<Vec<i64>, _> = serde_json::from_str(&format!("{:?}", value));
			if let Ok(clause) = res {
				let v: Vec<String> = clause
					.into_iter()
					.map(|i| self.lit_name(i).unwrap_or_else(|| format!("Lit({i})")))
					.collect();
				if field.name() == "clause" {
					self.inner.record_debug(field, &format_args!("{}", v.join(" ∨ ")));
				} else {
					self.inner.record_debug(field, &format_args!("{}", v.join(", ")));
				}
				return true;
			}
		}
		false
	}

	#[inline]
	/// Check if the field should and can be formatted as a literal.
	fn check_lit(&mut self, field: &Field, value: i64) -> bool {
		if field.name().starts_with("lit") {
			if let Some(name) = self.lit_name(value) {
				self.inner.record_debug(field, &format_args!("{name}"));
				return true;
			}
		}
		false
	}

	#[inline]
	/// Check if the field should be formatted as the index of a soft constraint.
	fn check_soft(&mut self, field: &Field, value: u64) -> bool {
		if field.name() == "soft" {
			self.inner.record_debug(field, &format_args!("soft[{value}]"));
			return true;
		}
		false
	}

	#[inline]
	/// Check whether the field should and can be formatted as a list of soft
	/// constraints.
	fn check_softs(&mut self, field: &Field, value: &dyn fmt::Debug) -> bool {
		if field.name() == "blocked" {
			let res: Result<Vec<usize>, _> = serde_json::from_str(&format!("{:?}", value));
			if let Ok(softs) = res {
				let v: Vec<String> = softs.iter().map(|i| format!("soft[{i}]")).collect();
				self.inner.record_debug(field, &format_args!("{}", v.join(", ")));
				return true;
			}
		}
		false
	}
}

impl<V: Visit> Visit for LitNames<'_, V> {
	#[inline]
	fn record_bool(&mut self, field: &Field, value: bool) {
		self.inner.record_bool(field, value);
	}

	#[inline]
	fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
		if self.check_clause(field, value) || self.check_softs(field, value) {
			return;
		}
		self.inner.record_debug(field, value);
	}

	#[inline]
	fn record_f64(&mut self, field: &Field, value: f64) {
		self.inner.record_f64(field, value);
	}

	#[inline]
	fn record_i64(&mut self, field: &Field, value: i64) {
		if self.check_lit(field, value) {
			return;
		}
		self.inner.record_i64(field, value);
	}

	fn record_str(&mut self, field: &Field, value: &str) {
		self.inner.record_str(field, value);
	}

	#[inline]
	fn record_u64(&mut self, field: &Field, value: u64) {
		if self.check_soft(field, value) {
			return;
		}
		if let Ok(i) = i64::try_from(value) {
			if self.check_lit(field, i) {
				return;
			}
		}
		self.inner.record_u64(field, value);
	}
}

impl<T, V: VisitOutput<T>> VisitOutput<T> for LitNames<'_, V> {
	fn finish(self) -> T {
		self.inner.finish()
	}
}

impl RecordGuardLits {
	/// This method is called when the [`Visit`] implementation has been called.
	/// If the visited fields match the expected fields of the log message that
	/// binds a guard, then the method will register the literal in the
	/// `lit_reverse_map` and return `true`. Otherwise, it will return `false`.
	fn finish(self, lit_reverse_map: &LitMap) -> bool {
		if self.other_values {
			return false;
		}
		if let (true, Some(soft), Some(lit)) = (self.bind_message, self.soft, self.lit) {
			let mut guard = lock_names(lit_reverse_map);
			let _ = guard.insert(lit, LitName::Guard(soft, true));
			let _ = guard.insert(-lit, LitName::Guard(soft, false));
			true
		} else {
			false
		}
	}
}

impl Visit for RecordGuardLits {
	fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
		match field.name() {
			"message" => self.bind_message = format!("{value:?}") == "bind guard",
			// Display of the guard term
			"guard" => {}
			_ => self.other_values = true,
		}
	}

	fn record_i64(&mut self, field: &Field, value: i64) {
		match field.name() {
			"lit" => {
				self.lit = i32::try_from(value).ok().and_then(NonZeroI32::new);
			}
			_ => self.other_values = true,
		}
	}

	fn record_u64(&mut self, field: &Field, value: u64) {
		match field.name() {
			"lit" => {
				self.lit = i32::try_from(value).ok().and_then(NonZeroI32::new);
			}
			"soft" => self.soft = usize::try_from(value).ok(),
			_ => self.other_values = true,
		}
	}
}

impl RegisterGuardLits {
	/// Create a new instance of the [`RegisterGuardLits`] layer.
	fn new(lit_reverse_map: LitMap) -> Self {
		Self { lit_reverse_map }
	}
}

impl<S: Subscriber> Layer<S> for RegisterGuardLits {
	fn event_enabled(&self, event: &Event<'_>, _: Context<'_, S>) -> bool {
		let mut rec = RecordGuardLits::default();
		event.record(&mut rec);
		let _ = rec.finish(&self.lit_reverse_map);
		true
	}
}
