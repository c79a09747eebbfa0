//! Driver surface: not part of either in-scope subsystem, just the glue
//! a runnable binary needs around them (SPEC_FULL §6, "driver surface").
//! Modelled on `examples/FyraLabs-anda/src/cli.rs`'s `clap::Parser` shape.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::InfoLevel;

#[derive(Copy, Clone, ValueEnum, Debug, Default, PartialEq, Eq)]
pub enum EmitKind {
	/// Expand directives and macros; print the resulting source text.
	Preprocessed,
	/// Run the code generator over a `ricc_ast::CompilationUnit` fixture
	/// and print the assembly it produces.
	#[default]
	Asm,
}

/// `ricc` runs the macro preprocessor over a source file, then — for
/// `--emit asm` — hands a `CompilationUnit` fixture (a stand-in for a
/// real parser's output, see `ricc_ast`) to the code generator.
#[derive(Parser, Debug)]
#[clap(about, version)]
pub struct Cli {
	/// Source file to preprocess.
	pub source: PathBuf,

	/// Additional `#include "..."` search path. Repeatable.
	#[clap(short = 'i', long = "iquote")]
	pub quote_dirs: Vec<PathBuf>,

	/// Additional `#include <...>` search path. Repeatable.
	#[clap(short = 'I', long = "include")]
	pub include_dirs: Vec<PathBuf>,

	/// What to emit.
	#[clap(long, value_enum, default_value_t = EmitKind::default())]
	pub emit: EmitKind,

	/// JSON `ricc_ast::CompilationUnit` fixture, required for `--emit asm`.
	#[clap(long)]
	pub ast: Option<PathBuf>,

	#[clap(flatten)]
	pub verbose: clap_verbosity_flag::Verbosity<InfoLevel>,
}
