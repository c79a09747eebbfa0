#![deny(rust_2018_idioms)]

mod cli;
mod resolver;

use clap::Parser;
use cli::{Cli, EmitKind};
use color_eyre::eyre::{eyre, Context, Result};
use ricc_ast::CompilationUnit;
use ricc_codegen::CodeGenerator;
use ricc_pp::Preprocessor;
use resolver::FsResolver;

fn main() -> Result<()> {
	color_eyre::install()?;
	let cli = Cli::parse();

	tracing_subscriber::fmt()
		.with_max_level(cli.verbose.tracing_level_filter())
		.with_target(false)
		.init();

	let source_dir = resolver::parent_dir(&cli.source);
	let resolver = FsResolver::new(source_dir, cli.quote_dirs.clone(), cli.include_dirs.clone());
	let mut pp = Preprocessor::new(&resolver);

	let preprocessed = pp
		.preprocess_path(&cli.source)
		.with_context(|| format!("reading `{}`", cli.source.display()))?;

	for w in pp.warnings() {
		tracing::warn!(at = %w.at, "{}", w.kind);
	}
	for e in pp.errors() {
		tracing::error!(at = %e.at, "{}", e.kind);
	}
	if pp.had_error() {
		return Err(eyre!("preprocessing `{}` failed, see diagnostics above", cli.source.display()));
	}

	match cli.emit {
		EmitKind::Preprocessed => {
			print!("{preprocessed}");
		}
		EmitKind::Asm => {
			let ast_path = cli.ast.ok_or_else(|| eyre!("--emit asm requires --ast <compilation-unit.json>"))?;
			let fixture = std::fs::read_to_string(&ast_path).with_context(|| format!("reading `{}`", ast_path.display()))?;
			let unit: CompilationUnit =
				serde_json::from_str(&fixture).with_context(|| format!("parsing `{}` as a CompilationUnit", ast_path.display()))?;

			let mut gen = CodeGenerator::new(&unit.types, &unit.strings);
			let asm = gen
				.generate_program(&unit.functions, unit.entry)
				.map_err(|e| eyre!("code generation failed: {e}"))?;
			print!("{asm}");
		}
	}

	Ok(())
}
