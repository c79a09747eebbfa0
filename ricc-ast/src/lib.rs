//! Contractual interfaces for the lexer, parser, AST/ident tables, and
//! the linker's include resolution — all explicitly out of scope per the
//! preprocessor/codegen spec. This crate defines only what the two core
//! subsystems consume from those collaborators: a tagged-sum AST shape
//! (DESIGN NOTES §9, "Polymorphism over AST nodes" — a `class` tag with
//! per-class accessors is modelled here as an exhaustive `enum`/`match`
//! rather than as a trait-object hierarchy) and a couple of lookup
//! traits a real front end would implement.
//!
//! Nothing here parses anything; there is no lexer, no grammar, no
//! recursive-descent machinery. A real compiler front end supplies
//! values of these types; `ricc-pp` and `ricc-codegen` only ever consume
//! them.
//!
//! [`SimpleTypeTable`]/[`SimpleStringTable`]/[`CompilationUnit`] are a
//! minimal, `serde`-backed stand-in for that front end (following the
//! teacher's config-struct derive style, e.g. `anda/src/config.rs`),
//! letting the `ricc` binary's `--emit asm` path load a JSON AST fixture
//! instead of needing a real lexer/parser to exercise the code generator.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Interned identifier handle, as produced by the out-of-scope symbol
/// table (`ricc-pp::symtab::SymbolTable` is its preprocessor-side analog,
/// but the compiler-proper's identifier table is a separate collaborator
/// this crate does not implement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ident(pub u32);

/// Interned string-literal handle, resolved through a [`StringTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StringId(pub u32);

/// A type handle, resolved through a [`TypeTable`]. Opaque to this crate
/// — only `type_size`/`type_is_array`/`members` give it meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeId(pub u32);

/// A struct/union member, as the type table would describe it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
	pub name: Ident,
	pub ty: TypeId,
}

/// The out-of-scope AST type table's contract: enough to compute
/// `lvalue`/`rvalue` sizes and member offsets without this crate knowing
/// how types are actually represented or declared.
///
/// Per DESIGN NOTES' Open Question, `type_size` for a `float` member
/// inside an aggregate returns `2` (words) even though the target passes
/// floats in a single word internally — this is preserved verbatim by
/// callers, not "fixed" here.
pub trait TypeTable {
	/// Size in 32-bit words.
	fn type_size(&self, ty: TypeId) -> u32;
	fn type_is_array(&self, ty: TypeId) -> bool;
	fn type_is_float(&self, ty: TypeId) -> bool;
	fn type_is_struct(&self, ty: TypeId) -> bool;
	/// Members in declaration order, for struct/union types. Empty for
	/// everything else.
	fn members(&self, ty: TypeId) -> &[Member];
	/// The pointee/element type, for pointer and array types.
	fn element_type(&self, ty: TypeId) -> Option<TypeId>;
}

/// Resolves `%{string table}` literals. Populated by the lexer's literal
/// table; this crate never constructs string contents itself.
pub trait StringTable {
	fn get(&self, id: StringId) -> &str;
}

/// The linker's include-path resolution contract (component D's
/// `#include` directive consults this rather than touching the
/// filesystem directly, so tests can supply an in-memory resolver).
pub trait IncludeResolver {
	/// `#include "path"`
	fn resolve_internal(&self, path: &str) -> Option<PathBuf>;
	/// `#include <path>`
	fn resolve_external(&self, path: &str) -> Option<PathBuf>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Literal {
	Int(i64),
	Float(f32),
	Char(char),
	Str(StringId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
	Add,
	Sub,
	Mul,
	Div,
	Mod,
	BitAnd,
	BitOr,
	BitXor,
	Shl,
	Shr,
	Lt,
	Le,
	Gt,
	Ge,
	Eq,
	Ne,
	LogAnd,
	LogOr,
}

impl BinOp {
	/// True for ops with an immediate-operand ISA form (`addi`, `andi`, …).
	/// Exploited by the expression emitter to avoid materializing a
	/// constant operand into a register when it doesn't need to be.
	/// `Sub` has no immediate form at all (no `subi`); `Mul`/`Div`/`Mod`
	/// have no immediate form on this target either and must always
	/// materialize their constant operand into a register first — per the
	/// design notes' `BIN_DIV`-appears-twice observation, the original's
	/// materialize-constant list already carries division down this path.
	pub fn has_immediate_form(self) -> bool {
		matches!(self, BinOp::Add | BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor | BinOp::Shl | BinOp::Shr)
	}

	pub fn is_commutative(self) -> bool {
		matches!(
			self,
			BinOp::Add | BinOp::Mul | BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor | BinOp::Eq | BinOp::Ne
		)
	}

	pub fn is_comparison(self) -> bool {
		matches!(self, BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge | BinOp::Eq | BinOp::Ne)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
	Neg,
	BitNot,
	LogNot,
	Abs,
	AddrOf,
	Deref,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncDecOp {
	Inc,
	Dec,
}

/// An expression node. `ty` is the type the front end already resolved
/// this subexpression to — this crate never infers types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expr {
	pub kind: ExprKind,
	pub ty: TypeId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExprKind {
	Literal(Literal),
	Ident(Ident),
	Unary { op: UnOp, operand: Box<Expr> },
	IncDec { op: IncDecOp, prefix: bool, operand: Box<Expr> },
	Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr> },
	/// `lhs = rhs`, or `lhs op= rhs` when `compound` is `Some(op)`.
	Assign { compound: Option<BinOp>, lhs: Box<Expr>, rhs: Box<Expr> },
	Subscript { base: Box<Expr>, index: Box<Expr> },
	Member { base: Box<Expr>, field: Ident, arrow: bool },
	Call { callee: Ident, args: Vec<Expr> },
	/// The built-in, variadic `printf` — distinguished from a user `Call`
	/// because its argument marshalling is special-cased (component G).
	Printf { format: StringId, args: Vec<Expr> },
	Cast { to: TypeId, inner: Box<Expr> },
	Ternary { cond: Box<Expr>, then: Box<Expr>, otherwise: Box<Expr> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decl {
	pub name: Ident,
	pub ty: TypeId,
	pub init: Option<Expr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stmt {
	pub kind: StmtKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StmtKind {
	Expr(Expr),
	Decl(Decl),
	Compound(Vec<Stmt>),
	If { cond: Expr, then: Box<Stmt>, otherwise: Option<Box<Stmt>> },
	While { cond: Expr, body: Box<Stmt> },
	DoWhile { body: Box<Stmt>, cond: Expr },
	For { init: Option<Box<Stmt>>, cond: Option<Expr>, step: Option<Expr>, body: Box<Stmt> },
	Continue,
	Break,
	Return(Option<Expr>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
	pub name: Ident,
	pub ty: TypeId,
}

/// A function definition, ready for the code generator to walk.
/// `id` is the externally assigned numeric id used for its `FUNC<id>`
/// and `FUNCEND<id>` labels (component I), assigned by the out-of-scope
/// ident table rather than by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
	pub id: u32,
	pub name: Ident,
	pub params: Vec<Param>,
	pub ret: TypeId,
	pub body: Vec<Stmt>,
}

/// A `TypeId`-indexed type table, concrete enough to load from a JSON
/// fixture. `types[i]` describes `TypeId(i)`. Real front ends have their
/// own richer type representation; this is only a stand-in so the
/// `ricc` binary's `--emit asm` path has something to drive
/// [`TypeTable`] with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimpleTypeTable {
	pub types: Vec<TypeInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeInfo {
	pub size_words: u32,
	#[serde(default)]
	pub is_array: bool,
	#[serde(default)]
	pub is_float: bool,
	#[serde(default)]
	pub is_struct: bool,
	#[serde(default)]
	pub members: Vec<Member>,
	#[serde(default)]
	pub element_type: Option<TypeId>,
}

impl TypeTable for SimpleTypeTable {
	fn type_size(&self, ty: TypeId) -> u32 {
		self.types.get(ty.0 as usize).map_or(1, |t| t.size_words)
	}

	fn type_is_array(&self, ty: TypeId) -> bool {
		self.types.get(ty.0 as usize).is_some_and(|t| t.is_array)
	}

	fn type_is_float(&self, ty: TypeId) -> bool {
		self.types.get(ty.0 as usize).is_some_and(|t| t.is_float)
	}

	fn type_is_struct(&self, ty: TypeId) -> bool {
		self.types.get(ty.0 as usize).is_some_and(|t| t.is_struct)
	}

	fn members(&self, ty: TypeId) -> &[Member] {
		self.types.get(ty.0 as usize).map_or(&[], |t| &t.members)
	}

	fn element_type(&self, ty: TypeId) -> Option<TypeId> {
		self.types.get(ty.0 as usize).and_then(|t| t.element_type)
	}
}

/// A `StringId`-indexed literal table, concrete enough to load from a
/// JSON fixture alongside [`SimpleTypeTable`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimpleStringTable {
	pub strings: Vec<String>,
}

impl StringTable for SimpleStringTable {
	fn get(&self, id: StringId) -> &str {
		self.strings.get(id.0 as usize).map_or("", String::as_str)
	}
}

/// The whole of what a real parser would hand the code generator: every
/// function in the translation unit, which one is `main` (by `Function::id`,
/// not by name — this crate never looks identifiers up by spelling), and
/// the type/string tables their bodies reference. This is the unit of
/// serialization the `ricc` binary's `--emit asm` path deserializes from
/// a JSON fixture in place of a real front end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompilationUnit {
	pub functions: Vec<Function>,
	pub entry: u32,
	pub types: SimpleTypeTable,
	pub strings: SimpleStringTable,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sub_has_no_immediate_form() {
		assert!(!BinOp::Sub.has_immediate_form());
		assert!(BinOp::Add.has_immediate_form());
	}

	#[test]
	fn commutativity_matches_arithmetic_identities() {
		assert!(BinOp::Add.is_commutative());
		assert!(!BinOp::Sub.is_commutative());
		assert!(!BinOp::Div.is_commutative());
	}

	#[test]
	fn comparison_ops_are_flagged() {
		for op in [BinOp::Lt, BinOp::Le, BinOp::Gt, BinOp::Ge, BinOp::Eq, BinOp::Ne] {
			assert!(op.is_comparison());
		}
		assert!(!BinOp::Add.is_comparison());
	}

	#[test]
	fn compilation_unit_round_trips_through_json() {
		let unit = CompilationUnit {
			functions: vec![Function {
				id: 0,
				name: Ident(1),
				params: vec![Param { name: Ident(2), ty: TypeId(0) }],
				ret: TypeId(0),
				body: vec![Stmt { kind: StmtKind::Return(Some(Expr { kind: ExprKind::Ident(Ident(2)), ty: TypeId(0) })) }],
			}],
			entry: 0,
			types: SimpleTypeTable { types: vec![TypeInfo { size_words: 1, ..Default::default() }] },
			strings: SimpleStringTable::default(),
		};

		let json = serde_json::to_string(&unit).expect("serializes");
		let back: CompilationUnit = serde_json::from_str(&json).expect("deserializes");
		assert_eq!(back.entry, 0);
		assert_eq!(back.functions.len(), 1);
		assert_eq!(back.types.type_size(TypeId(0)), 1);
	}

	#[test]
	fn type_table_missing_fields_default_sensibly() {
		let json = r#"{"types":[{"size_words":2}]}"#;
		let table: SimpleTypeTable = serde_json::from_str(json).expect("deserializes with defaults");
		assert!(!table.type_is_float(TypeId(0)));
		assert!(table.members(TypeId(0)).is_empty());
		assert_eq!(table.element_type(TypeId(0)), None);
	}
}
