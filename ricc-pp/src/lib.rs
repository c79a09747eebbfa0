//! Macro preprocessor: directive engine, function-like macros, `#`/`##`,
//! nested re-expansion, and source-location tracking across substitution
//! (component D, on top of `ricc-io`'s components A/B).
//!
//! Grounded on `rpmspec-rs`'s macro engine (`rpmio/macros.rs`) for the
//! overall shape — a symbol table keyed by handle, a directive dispatch
//! loop, and diagnostics accumulated rather than propagated — adapted
//! from RPM spec macros to this target's C-like `#define`/`#include`
//! directive set.

pub mod body;
pub mod engine;
pub mod error;
pub mod mask;
pub mod scan;
pub mod symtab;

pub use engine::Preprocessor;
pub use error::{Diagnostic, PpError, PpWarning};
