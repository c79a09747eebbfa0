//! Black-box coverage of the concrete preprocessor scenarios and
//! invariants I1/I3, exercised only through the public `Preprocessor`
//! API (no access to internal modules).

use ricc_ast::IncludeResolver;
use ricc_io::FileId;
use ricc_pp::Preprocessor;

struct NoIncludes;

impl IncludeResolver for NoIncludes {
	fn resolve_internal(&self, _path: &str) -> Option<std::path::PathBuf> {
		None
	}
	fn resolve_external(&self, _path: &str) -> Option<std::path::PathBuf> {
		None
	}
}

fn expand(src: &str) -> String {
	let resolver = NoIncludes;
	let mut pp = Preprocessor::new(&resolver);
	let out = pp.preprocess(src, FileId(0));
	assert!(!pp.had_error(), "unexpected errors: {:?}", pp.errors().iter().map(|d| &d.kind).collect::<Vec<_>>());
	out
}

#[test]
fn scenario_1_sq_macro() {
	let out = expand("#define SQ(x) ((x)*(x))\nSQ(1+2)\n");
	assert!(out.contains("((1+2)*(1+2))"));
}

#[test]
fn scenario_2_stringize() {
	let out = expand("#define S(x) #x\nS(a b)\n");
	assert!(out.contains("\"a b\""));
}

#[test]
fn scenario_3_paste() {
	let out = expand("#define CAT(a,b) a##b\nCAT(foo,1)\n");
	assert!(out.contains("foo1"));
}

#[test]
fn i1_expansion_matches_textual_substitution_modulo_whitespace() {
	let via_macro = expand("#define F(x) (x+1)\nF(2*3)\n");
	let via_manual = expand("(2*3+1)\n");
	assert_eq!(via_macro.split_whitespace().collect::<Vec<_>>(), via_manual.split_whitespace().collect::<Vec<_>>());
}

#[test]
fn i3_stringize_escapes_quotes_and_backslashes_in_argument() {
	let out = expand("#define S(x) #x\nS(\"a\\b\")\n");
	assert!(out.contains(r#""\"a\\b\"""#), "{out:?}");
}

#[test]
fn include_depth_limit_is_enforced() {
	struct SelfIncluding;
	impl IncludeResolver for SelfIncluding {
		fn resolve_internal(&self, _path: &str) -> Option<std::path::PathBuf> {
			Some(std::path::PathBuf::from("/nonexistent/self.h"))
		}
		fn resolve_external(&self, _path: &str) -> Option<std::path::PathBuf> {
			None
		}
	}
	let resolver = SelfIncluding;
	let mut pp = Preprocessor::new(&resolver);
	let out = pp.preprocess("#include \"self.h\"\n", FileId(0));
	assert!(pp.had_error());
	let _ = out;
}
