//! Components G/H/I: the AST-walking emitter. Split across three
//! files the way the lvalue/rvalue calculus splits conceptually —
//! expressions, statements, whole functions — but all three are
//! `impl CodeGenerator` blocks on the one struct defined here, mirroring
//! `ricc-pp::engine::Preprocessor`'s single-struct-many-files shape.

pub mod expr;
pub mod func;
pub mod stmt;

use std::collections::HashMap;

use ricc_ast::{Expr, ExprKind, Function, Literal, Stmt, StmtKind, StringId, StringTable as AstStringTable, TypeTable};

use crate::{
	error::CgError,
	frame::DisplacementTable,
	label::{Label, LabelCounters},
	register::RegisterBank,
	strings::StringTable,
};

pub struct CodeGenerator<'a> {
	pub(crate) types: &'a dyn TypeTable,
	pub(crate) ast_strings: &'a dyn AstStringTable,
	out: String,
	pub(crate) strtab: StringTable,
	/// Memoizes which `ricc_codegen` string-table index a given AST
	/// `StringId` was registered under, so the same literal referenced
	/// twice doesn't get emitted twice.
	string_index: HashMap<StringId, u32>,
	pub(crate) regs: RegisterBank,
	pub(crate) disp: DisplacementTable,
	pub(crate) labels: LabelCounters,
	/// `(continue, break)` targets for the innermost enclosing loop;
	/// pushed on loop entry, popped on exit, so nested loops each see
	/// their own pair (§4.H).
	pub(crate) loop_targets: Vec<(Label, Label)>,
	pub(crate) current_func_end: Option<Label>,
}

/// Fixed preamble emitted ahead of any function, per the code generator
/// output contract: assembler directives, then `main`'s entry sequence
/// initializing `$gp`/`$fp`/`$ra` and the heap-boundary constant.
const HEAP_DISPL: i32 = 8000;
const LOW_DYN_BORDER: u32 = 0x1001_0000;

impl<'a> CodeGenerator<'a> {
	pub fn new(types: &'a dyn TypeTable, ast_strings: &'a dyn AstStringTable) -> Self {
		Self {
			types,
			ast_strings,
			out: String::new(),
			strtab: StringTable::new(),
			string_index: HashMap::new(),
			regs: RegisterBank::new(),
			disp: DisplacementTable::new(),
			labels: LabelCounters::new(),
			loop_targets: Vec::new(),
			current_func_end: None,
		}
	}

	pub(crate) fn emit(&mut self, line: impl AsRef<str>) {
		self.out.push_str(line.as_ref());
		self.out.push('\n');
	}

	pub(crate) fn emit_label(&mut self, label: Label) -> Result<(), CgError> {
		if !self.labels.declare(label) {
			return Err(CgError::DuplicateLabel(label.asm_name()));
		}
		self.out.push_str(&label.asm_name());
		self.out.push_str(":\n");
		Ok(())
	}

	/// Registers a literal's text with the string table the first time
	/// it's seen, reusing the same index on repeat references.
	pub(crate) fn intern_string(&mut self, id: StringId) -> u32 {
		if let Some(&idx) = self.string_index.get(&id) {
			return idx;
		}
		let text = self.ast_strings.get(id).to_string();
		let idx = self.strtab.register(&text);
		self.string_index.insert(id, idx);
		idx
	}

	/// `entry_id` is the `FUNC<id>` of the translation unit's `main`
	/// function (assigned by the out-of-scope ident table, same as any
	/// other function id) — the fixed `main:` entry point is assembler
	/// plumbing ($gp/heap setup) that calls into it, rather than `main`
	/// itself being inlined under the `main:` label.
	fn emit_preamble(&mut self, entry_id: u32) {
		for line in [
			".section .mdebug.abi32",
			".previous",
			".nan legacy",
			".module fp=xx",
			".module nooddspreg",
			".abicalls",
			".option pic0",
			".text",
			".align 2",
			".globl main",
			".ent main",
			".type main,@function",
		] {
			self.emit(line);
		}
		self.emit("main:");
		self.emit("lui $gp, %hi(__gnu_local_gp)");
		self.emit("addiu $gp, $gp, %lo(__gnu_local_gp)");
		self.emit("move $fp, $sp");
		self.emit("addiu $sp, $sp, -8");
		self.emit("sw $ra, 4($sp)");
		self.emit(format!("li $t8, {}", LOW_DYN_BORDER));
		self.emit(format!("sw $t8, -{}($gp)", HEAP_DISPL + 60));
		self.emit(format!("jal {}", LabelCounters::func(entry_id).asm_name()));
		self.emit("lw $ra, 4($sp)");
		self.emit("addiu $sp, $sp, 8");
		self.emit("jr $ra");
	}

	/// Walks every function, then flushes the accumulated string table
	/// into `.rdata`. Returns the complete assembly text. `entry_id` names
	/// which function in `functions` is the translation unit's `main`.
	pub fn generate_program(&mut self, functions: &[Function], entry_id: u32) -> Result<String, CgError> {
		// `StringTable::fragment_label` stripes a fragment's label number
		// by `self.amount()`, the *current* count of registered literals —
		// so every literal must be registered before any instruction that
		// references a fragment label is emitted, or an `lui`/`addiu` pair
		// emitted while walking an early function would compute a
		// different label number than the one `rdata_entries` later
		// assigns the same fragment once every later function's literals
		// have also been registered. Pre-scan the whole translation unit
		// first so `amount` is already final by the time any function body
		// is emitted.
		for f in functions {
			for s in &f.body {
				self.collect_strings_stmt(s);
			}
		}

		self.emit_preamble(entry_id);
		for f in functions {
			self.emit_function(f)?;
		}
		self.emit_rdata()?;
		Ok(std::mem::take(&mut self.out))
	}

	fn collect_strings_stmt(&mut self, s: &Stmt) {
		match &s.kind {
			StmtKind::Expr(e) => self.collect_strings_expr(e),
			StmtKind::Decl(d) => {
				if let Some(init) = &d.init {
					self.collect_strings_expr(init);
				}
			}
			StmtKind::Compound(stmts) => {
				for st in stmts {
					self.collect_strings_stmt(st);
				}
			}
			StmtKind::If { cond, then, otherwise } => {
				self.collect_strings_expr(cond);
				self.collect_strings_stmt(then);
				if let Some(o) = otherwise {
					self.collect_strings_stmt(o);
				}
			}
			StmtKind::While { cond, body } => {
				self.collect_strings_expr(cond);
				self.collect_strings_stmt(body);
			}
			StmtKind::DoWhile { body, cond } => {
				self.collect_strings_stmt(body);
				self.collect_strings_expr(cond);
			}
			StmtKind::For { init, cond, step, body } => {
				if let Some(init) = init {
					self.collect_strings_stmt(init);
				}
				if let Some(cond) = cond {
					self.collect_strings_expr(cond);
				}
				if let Some(step) = step {
					self.collect_strings_expr(step);
				}
				self.collect_strings_stmt(body);
			}
			StmtKind::Continue | StmtKind::Break => {}
			StmtKind::Return(e) => {
				if let Some(e) = e {
					self.collect_strings_expr(e);
				}
			}
		}
	}

	fn collect_strings_expr(&mut self, e: &Expr) {
		match &e.kind {
			ExprKind::Literal(Literal::Str(id)) => {
				self.intern_string(*id);
			}
			ExprKind::Literal(_) | ExprKind::Ident(_) => {}
			ExprKind::Unary { operand, .. } | ExprKind::IncDec { operand, .. } | ExprKind::Cast { inner: operand, .. } => {
				self.collect_strings_expr(operand);
			}
			ExprKind::Binary { lhs, rhs, .. } | ExprKind::Assign { lhs, rhs, .. } | ExprKind::Subscript { base: lhs, index: rhs } => {
				self.collect_strings_expr(lhs);
				self.collect_strings_expr(rhs);
			}
			ExprKind::Member { base, .. } => self.collect_strings_expr(base),
			ExprKind::Call { args, .. } => {
				for a in args {
					self.collect_strings_expr(a);
				}
			}
			ExprKind::Printf { format, args } => {
				self.intern_string(*format);
				for a in args {
					self.collect_strings_expr(a);
				}
			}
			ExprKind::Ternary { cond, then, otherwise } => {
				self.collect_strings_expr(cond);
				self.collect_strings_expr(then);
				self.collect_strings_expr(otherwise);
			}
		}
	}

	fn emit_rdata(&mut self) -> Result<(), CgError> {
		if self.strtab.amount() == 0 {
			return Ok(());
		}
		self.emit(".rdata");
		self.emit(".align 2");
		let entries = self.strtab.rdata_entries();
		for (label, text) in entries {
			self.emit_label(label)?;
			self.emit(format!(".ascii \"{}\"", escape_ascii(&text)));
		}
		Ok(())
	}
}

fn escape_ascii(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	for c in s.chars() {
		match c {
			'"' => out.push_str("\\\""),
			'\\' => out.push_str("\\\\"),
			'\n' => out.push_str("\\n"),
			'\0' => out.push_str("\\000"),
			_ => out.push(c),
		}
	}
	out
}
