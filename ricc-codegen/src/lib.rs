//! Code generator for a MIPS-like 32-bit RISC target: the lvalue/rvalue
//! calculus, register bank allocation, displacement table, and
//! statement/expression/function emitters (components E through I).
//! See `ricc_ast` for the tagged-sum AST this crate walks.

pub mod emit;
pub mod error;
pub mod frame;
pub mod label;
pub mod register;
pub mod strings;
pub mod value;

pub use emit::CodeGenerator;
pub use error::CgError;
