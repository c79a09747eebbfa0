//! Component F: the identifier → displacement table. Keyed by
//! `ricc_ast::Ident`; base register is `$sp` for locals and `$gp` for
//! globals, except parameters that fit the 4-register convention, which
//! are left register-resident (`on_stack = false`, base = the physical
//! `$a0..$a3` slot).

use std::collections::HashMap;

use ricc_ast::{Ident, TypeId};

use super::{align8, BaseRegister};

#[derive(Debug, Clone, Copy)]
pub struct DisplacementEntry {
	pub on_stack: bool,
	pub base: BaseRegister,
	pub offset: i32,
	pub ty: TypeId,
}

pub struct DisplacementTable {
	entries: HashMap<Ident, DisplacementEntry>,
	/// Saved snapshots for compound-statement scope entry/exit (H's
	/// "save displacement, emit children, restore").
	scopes: Vec<HashMap<Ident, DisplacementEntry>>,
	next_local_offset: i32,
	max_displ: u32,
}

impl Default for DisplacementTable {
	fn default() -> Self {
		Self::new()
	}
}

impl DisplacementTable {
	pub fn new() -> Self {
		Self { entries: HashMap::new(), scopes: Vec::new(), next_local_offset: 0, max_displ: 0 }
	}

	/// Save the current bindings and push a fresh scope on top of them;
	/// declarations made until the matching `exit_scope` are invisible
	/// afterward.
	pub fn enter_scope(&mut self) {
		self.scopes.push(self.entries.clone());
	}

	pub fn exit_scope(&mut self) {
		if let Some(saved) = self.scopes.pop() {
			self.entries = saved;
		}
	}

	/// A function body is itself an (outermost) scope, with its own
	/// local-offset cursor and `max_displ` accumulator reset to zero —
	/// this keeps one table live for the whole translation unit
	/// (globals survive across functions) while each function's locals
	/// start a fresh frame.
	pub fn begin_function(&mut self) {
		self.enter_scope();
		self.next_local_offset = 0;
		self.max_displ = 0;
	}

	/// Returns the function's locals size (bytes, 8-byte aligned) and
	/// restores the pre-function (global) scope.
	pub fn end_function(&mut self) -> u32 {
		let size = align8(self.max_displ);
		self.exit_scope();
		size
	}

	pub fn declare_local(&mut self, id: Ident, ty: TypeId, size_words: u32) -> DisplacementEntry {
		let size_bytes = size_words.max(1) * 4;
		self.next_local_offset -= size_bytes as i32;
		let entry = DisplacementEntry { on_stack: true, base: BaseRegister::StackPointer, offset: self.next_local_offset, ty };
		self.entries.insert(id, entry);
		self.max_displ = self.max_displ.max(self.next_local_offset.unsigned_abs());
		entry
	}

	pub fn declare_global(&mut self, id: Ident, ty: TypeId, offset: i32) -> DisplacementEntry {
		let entry = DisplacementEntry { on_stack: false, base: BaseRegister::GlobalPointer, offset, ty };
		self.entries.insert(id, entry);
		entry
	}

	pub fn declare_param_in_register(&mut self, id: Ident, ty: TypeId, arg_slot: u8) -> DisplacementEntry {
		let entry = DisplacementEntry { on_stack: false, base: BaseRegister::Arg(arg_slot), offset: 0, ty };
		self.entries.insert(id, entry);
		entry
	}

	pub fn declare_param_on_stack(&mut self, id: Ident, ty: TypeId, size_words: u32) -> DisplacementEntry {
		self.declare_local(id, ty, size_words)
	}

	pub fn lookup(&self, id: Ident) -> Option<DisplacementEntry> {
		self.entries.get(&id).copied()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn locals_grow_downward_and_track_max_displ() {
		let mut t = DisplacementTable::new();
		t.begin_function();
		let a = t.declare_local(Ident(0), TypeId(0), 1);
		let b = t.declare_local(Ident(1), TypeId(0), 2);
		assert_eq!(a.offset, -4);
		assert_eq!(b.offset, -12);
		let size = t.end_function();
		assert_eq!(size, 16); // 12 bytes rounded up to a multiple of 8
	}

	#[test]
	fn scope_exit_hides_inner_declarations_but_keeps_globals() {
		let mut t = DisplacementTable::new();
		t.declare_global(Ident(9), TypeId(0), 0);
		t.begin_function();
		t.enter_scope();
		t.declare_local(Ident(1), TypeId(0), 1);
		assert!(t.lookup(Ident(1)).is_some());
		t.exit_scope();
		assert!(t.lookup(Ident(1)).is_none());
		assert!(t.lookup(Ident(9)).is_some());
		t.end_function();
		assert!(t.lookup(Ident(9)).is_some());
	}

	#[test]
	fn register_resident_parameter_is_not_on_stack() {
		let mut t = DisplacementTable::new();
		t.begin_function();
		let p = t.declare_param_in_register(Ident(2), TypeId(0), 0);
		assert!(!p.on_stack);
		assert_eq!(p.base, BaseRegister::Arg(0));
	}
}
