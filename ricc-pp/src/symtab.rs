//! Component C: symbol storage.
//!
//! A keyed string store with integer handles. Each handle carries an
//! integer payload array (`[arity, body_handle]` for macros) and a
//! per-invocation argument-form arena (`get_args_by_index` /
//! `set_args_by_index`), saved and restored around recursive calls to the
//! same macro so nested self-referential expansion can't clobber an
//! outer call's arguments.
//!
//! Keeps `rpmspec-rs`'s `BTreeMap<String, Entry>` shape (`rpmio/macros.rs`)
//! but keys on `smartstring::alias::String`, matching the teacher's use of
//! `smartstring` for short, frequently-compared identifier text.

use std::collections::HashMap;

use ricc_io::Stream;
use smartstring::alias::String as SmolString;

use crate::mask::ArgForm;

/// A fixed reserved range: every directive/placeholder keyword occupies a
/// low handle assigned once at construction, so `Handle(0..KEYWORDS.len())`
/// is always a keyword and never a user macro.
const KEYWORDS: &[&str] =
	&["line", "include", "define", "set", "undef", "eval", "if", "ifdef", "ifndef", "elif", "else", "endif", "macro", "endm", "while", "endw"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u32);

pub enum AddOutcome {
	Added(Handle),
	Exists(Handle),
}

struct Entry {
	name: SmolString,
	payload: Vec<i32>,
	args: Vec<SmolString>,
}

pub struct SymbolTable {
	handles: HashMap<SmolString, Handle>,
	entries: Vec<Entry>,
	bodies: Vec<String>,
	last_read: String,
}

impl Default for SymbolTable {
	fn default() -> Self {
		Self::new()
	}
}

impl SymbolTable {
	pub fn new() -> Self {
		let mut t = Self { handles: HashMap::new(), entries: Vec::new(), bodies: Vec::new(), last_read: String::new() };
		for kw in KEYWORDS {
			let h = t.intern(kw);
			debug_assert!((h.0 as usize) < KEYWORDS.len());
		}
		t
	}

	fn intern(&mut self, name: &str) -> Handle {
		if let Some(&h) = self.handles.get(name) {
			return h;
		}
		let h = Handle(self.entries.len() as u32);
		self.entries.push(Entry { name: name.into(), payload: Vec::new(), args: Vec::new() });
		self.handles.insert(name.into(), h);
		h
	}

	pub fn keyword_handle(&self, name: &str) -> Option<Handle> {
		KEYWORDS.iter().position(|k| *k == name).map(|i| Handle(i as u32))
	}

	pub fn is_keyword(&self, h: Handle) -> bool {
		(h.0 as usize) < KEYWORDS.len()
	}

	/// Reads an identifier-shaped lexeme directly from `io` and interns
	/// it, reporting whether it already existed.
	pub fn add(&mut self, io: &mut Stream) -> AddOutcome {
		let lexeme = self.scan_lexeme(io);
		if let Some(&h) = self.handles.get(lexeme.as_str()) {
			AddOutcome::Exists(h)
		} else {
			let h = self.intern(&lexeme);
			AddOutcome::Added(h)
		}
	}

	/// Reads a lexeme without adding it, returning the existing handle if
	/// any.
	pub fn search(&mut self, io: &mut Stream) -> Option<Handle> {
		let lexeme = self.scan_lexeme(io);
		self.handles.get(lexeme.as_str()).copied()
	}

	fn scan_lexeme(&mut self, io: &mut Stream) -> String {
		let mut s = String::new();
		let c = io.read_char();
		if c.is_ascii_alphabetic() || c == '_' {
			s.push(c);
			loop {
				let c = io.read_char();
				if c.is_ascii_alphanumeric() || c == '_' {
					s.push(c);
				} else {
					io.unread_char(c);
					break;
				}
			}
		} else if c != ricc_io::EOF {
			io.unread_char(c);
		}
		self.last_read = s.clone();
		s
	}

	pub fn last_read(&self) -> &str {
		&self.last_read
	}

	pub fn name(&self, h: Handle) -> &str {
		&self.entries[h.0 as usize].name
	}

	pub fn get_by_index(&self, h: Handle, idx: usize) -> i32 {
		self.entries[h.0 as usize].payload.get(idx).copied().unwrap_or(0)
	}

	pub fn set_by_index(&mut self, h: Handle, idx: usize, value: i32) {
		let payload = &mut self.entries[h.0 as usize].payload;
		if payload.len() <= idx {
			payload.resize(idx + 1, 0);
		}
		payload[idx] = value;
	}

	pub fn get_args_by_index(&self, h: Handle, idx: usize) -> Option<&str> {
		self.entries[h.0 as usize].args.get(idx).map(std::convert::AsRef::as_ref)
	}

	pub fn set_args_by_index(&mut self, h: Handle, idx: usize, value: String) {
		let args = &mut self.entries[h.0 as usize].args;
		if args.len() <= idx {
			args.resize(idx + 1, SmolString::new());
		}
		args[idx] = value.into();
	}

	/// Snapshot of the current argument arena for `h`, to be restored with
	/// [`SymbolTable::restore_args`] after a (possibly recursive) call
	/// finishes substituting.
	pub fn save_args(&self, h: Handle) -> Vec<SmolString> {
		self.entries[h.0 as usize].args.clone()
	}

	pub fn restore_args(&mut self, h: Handle, saved: Vec<SmolString>) {
		self.entries[h.0 as usize].args = saved;
	}

	pub fn arg_slot(&self, arg_index: usize, form: ArgForm) -> usize {
		arg_index * ArgForm::COUNT + form as usize
	}

	fn alloc_body(&mut self, body: String) -> u32 {
		let idx = self.bodies.len() as u32;
		self.bodies.push(body);
		idx
	}

	pub fn body(&self, body_handle: u32) -> &str {
		&self.bodies[body_handle as usize]
	}

	/// True if `name` already names a live macro (not a keyword).
	pub fn is_macro_defined(&self, name: &str) -> bool {
		self.handles.get(name).is_some_and(|h| !self.is_keyword(*h) && self.get_by_index(*h, 0) >= 0 && self.has_body(*h))
	}

	fn has_body(&self, h: Handle) -> bool {
		!self.entries[h.0 as usize].payload.is_empty()
	}

	pub fn lookup_macro(&self, name: &str) -> Option<Handle> {
		self.handles.get(name).copied().filter(|h| !self.is_keyword(*h) && self.has_body(*h))
	}

	pub fn arity(&self, h: Handle) -> i32 {
		self.get_by_index(h, 0)
	}

	pub fn macro_body(&self, h: Handle) -> &str {
		self.body(self.get_by_index(h, 1) as u32)
	}

	/// `#define`: fails (returns `false`) if `name` already names a macro.
	pub fn define_macro(&mut self, name: &str, arity: i32, body: String) -> bool {
		if self.is_macro_defined(name) {
			return false;
		}
		let h = self.intern(name);
		let body_handle = self.alloc_body(body);
		self.set_by_index(h, 0, arity);
		self.set_by_index(h, 1, body_handle as i32);
		true
	}

	/// `#set`: like `define_macro` but always succeeds, overwriting any
	/// prior definition. Returns `true` if it replaced an existing macro.
	pub fn set_macro(&mut self, name: &str, arity: i32, body: String) -> bool {
		let existed = self.is_macro_defined(name);
		let h = self.intern(name);
		let body_handle = self.alloc_body(body);
		self.set_by_index(h, 0, arity);
		self.set_by_index(h, 1, body_handle as i32);
		existed
	}

	/// `#undef`: returns `true` if a macro with this name existed.
	pub fn undef_macro(&mut self, name: &str) -> bool {
		let Some(&h) = self.handles.get(name) else { return false };
		if !self.has_body(h) {
			return false;
		}
		self.entries[h.0 as usize].payload.clear();
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keywords_occupy_the_reserved_range() {
		let t = SymbolTable::new();
		for (i, kw) in KEYWORDS.iter().enumerate() {
			let h = t.keyword_handle(kw).unwrap();
			assert_eq!(h.0 as usize, i);
			assert!(t.is_keyword(h));
		}
	}

	#[test]
	fn define_then_redefine_is_rejected_until_undef() {
		let mut t = SymbolTable::new();
		assert!(t.define_macro("FOO", 0, "1".into()));
		assert!(!t.define_macro("FOO", 0, "2".into()));
		assert!(t.undef_macro("FOO"));
		assert!(t.define_macro("FOO", 0, "3".into()));
		assert_eq!(t.macro_body(t.lookup_macro("FOO").unwrap()), "3");
	}

	#[test]
	fn set_always_succeeds_and_reports_prior_existence() {
		let mut t = SymbolTable::new();
		assert!(!t.set_macro("BAR", 0, "a".into()));
		assert!(t.set_macro("BAR", 0, "b".into()));
		assert_eq!(t.macro_body(t.lookup_macro("BAR").unwrap()), "b");
	}

	#[test]
	fn args_snapshot_and_restore_support_recursive_calls() {
		let mut t = SymbolTable::new();
		t.define_macro("F", 1, "whatever".into());
		let h = t.lookup_macro("F").unwrap();
		t.set_args_by_index(h, 0, "outer".to_string());
		let saved = t.save_args(h);
		t.set_args_by_index(h, 0, "inner".to_string());
		assert_eq!(t.get_args_by_index(h, 0), Some("inner"));
		t.restore_args(h, saved);
		assert_eq!(t.get_args_by_index(h, 0), Some("outer"));
	}

	#[test]
	fn add_reports_new_vs_existing() {
		let mut t = SymbolTable::new();
		let mut s = Stream::from_memory("hello world");
		match t.add(&mut s) {
			AddOutcome::Added(_) => {}
			AddOutcome::Exists(_) => panic!("expected new handle"),
		}
		s.read_char(); // skip the space
		let mut s2 = Stream::from_memory("hello");
		match t.add(&mut s2) {
			AddOutcome::Exists(_) => {}
			AddOutcome::Added(_) => panic!("expected existing handle"),
		}
	}
}
